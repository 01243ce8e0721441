// Copyright (C) 2026 the runsheet authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during run-of-show validation and transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A block's moment list is already at its configured capacity.
    BlockAtCapacity {
        /// The block whose list is full.
        block_id: String,
        /// The configured capacity.
        cap: usize,
    },
    /// A moment's responsables list would exceed its configured capacity.
    ResponsablesAtCapacity {
        /// The configured capacity.
        cap: usize,
    },
    /// A moment's suppliers list would exceed its configured capacity.
    SuppliersAtCapacity {
        /// The configured capacity.
        cap: usize,
    },
    /// A baseline timeline block cannot be deleted.
    ProtectedBlock(String),
    /// Moment type string is not recognized.
    InvalidMomentKind(String),
    /// Moment state string is not recognized.
    InvalidMomentState(String),
    /// Timeline block status string is not recognized.
    InvalidBlockStatus(String),
    /// Alert type string is not recognized.
    InvalidAlertKind(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlockAtCapacity { block_id, cap } => {
                write!(f, "Block '{block_id}' already holds {cap} moments")
            }
            Self::ResponsablesAtCapacity { cap } => {
                write!(f, "A moment may hold at most {cap} responsables")
            }
            Self::SuppliersAtCapacity { cap } => {
                write!(f, "A moment may hold at most {cap} suppliers")
            }
            Self::ProtectedBlock(block_id) => {
                write!(f, "Block '{block_id}' is a baseline block and cannot be removed")
            }
            Self::InvalidMomentKind(value) => write!(f, "Unknown moment type: {value}"),
            Self::InvalidMomentState(value) => write!(f, "Unknown moment state: {value}"),
            Self::InvalidBlockStatus(value) => write!(f, "Unknown block status: {value}"),
            Self::InvalidAlertKind(value) => write!(f, "Unknown alert type: {value}"),
        }
    }
}

impl std::error::Error for DomainError {}
