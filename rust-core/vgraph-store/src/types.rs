// SPDX-License-Identifier: MIT OR Apache-2.0
//! The four graph kinds from SPEC_FULL.md §3.

/// Which of the four shapes a named graph was created as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    Plain,
    Directed,
    Multi,
    MultiDirected,
}

impl GraphKind {
    pub fn is_directed(self) -> bool {
        matches!(self, GraphKind::Directed | GraphKind::MultiDirected)
    }

    pub fn is_multi(self) -> bool {
        matches!(self, GraphKind::Multi | GraphKind::MultiDirected)
    }

    pub fn to_byte(self) -> u8 {
        match self {
            GraphKind::Plain => 0,
            GraphKind::Directed => 1,
            GraphKind::Multi => 2,
            GraphKind::MultiDirected => 3,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(GraphKind::Plain),
            1 => Some(GraphKind::Directed),
            2 => Some(GraphKind::Multi),
            3 => Some(GraphKind::MultiDirected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GraphKind::Plain => "plain",
            GraphKind::Directed => "directed",
            GraphKind::Multi => "multi",
            GraphKind::MultiDirected => "multi-directed",
        }
    }
}
