//! Engine use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the clearance workflow operations.
//! - Keep UI/transport layers decoupled from storage details.
//!
//! # Invariants
//! - Every fallible operation returns a typed `EngineError`; nothing in the
//!   engine panics on business rule violations.
//! - Status transitions are validated here or below; callers cannot bypass
//!   the aggregator's verdict.

use crate::model::department::Department;
use crate::model::employee::{EmployeeId, EmployeeStatus, EmployeeValidationError};
use crate::model::item::ItemId;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod authorization;
pub mod completion;
pub mod engine;
pub mod instantiation;
pub mod lifecycle;
pub mod progress;

pub type EngineResult<T> = Result<T, EngineError>;

/// Rejected status transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidTransition {
    /// Completion attempted on an already-completed item.
    ItemAlreadyCompleted(ItemId),
    /// `cleared` requested while pending items remain (or no items exist).
    NotFullyCleared(EmployeeId),
    /// `cleared` is terminal; nothing moves out of it.
    ClearedIsTerminal(EmployeeId),
    /// Status change that must go through a lifecycle operation instead of
    /// a direct field write (e.g. `active -> in_clearance` without
    /// instantiation).
    UnmanagedStatusChange {
        from: EmployeeStatus,
        to: EmployeeStatus,
    },
}

impl Display for InvalidTransition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemAlreadyCompleted(id) => {
                write!(f, "clearance item is already completed: {id}")
            }
            Self::NotFullyCleared(id) => write!(
                f,
                "employee {id} cannot be marked cleared while items are pending"
            ),
            Self::ClearedIsTerminal(id) => {
                write!(f, "employee {id} is cleared; no further transitions")
            }
            Self::UnmanagedStatusChange { from, to } => write!(
                f,
                "status change {from:?} -> {to:?} requires a lifecycle operation"
            ),
        }
    }
}

/// Engine error surface returned to UI/dashboard collaborators.
#[derive(Debug)]
pub enum EngineError {
    EmployeeNotFound(EmployeeId),
    ItemNotFound(ItemId),
    InvalidTransition(InvalidTransition),
    Unauthorized {
        actor_role: Department,
        action: &'static str,
    },
    MissingSignature(ItemId),
    DuplicateInstantiation(EmployeeId),
    Validation(EmployeeValidationError),
    Storage(RepoError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "clearance item not found: {id}"),
            Self::InvalidTransition(violation) => write!(f, "{violation}"),
            Self::Unauthorized { actor_role, action } => {
                write!(f, "role `{actor_role}` is not authorized to {action}")
            }
            Self::MissingSignature(id) => {
                write!(f, "clearance item {id} requires a signature")
            }
            Self::DuplicateInstantiation(id) => {
                write!(f, "employee {id} already has an instantiated task set")
            }
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EmployeeValidationError> for EngineError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Repository errors with a business meaning surface as their engine kind;
/// everything else is a storage fault.
impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::EmployeeNotFound(id) => Self::EmployeeNotFound(id),
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            RepoError::ItemAlreadyCompleted(id) => {
                Self::InvalidTransition(InvalidTransition::ItemAlreadyCompleted(id))
            }
            RepoError::DuplicateItems(id) => Self::DuplicateInstantiation(id),
            RepoError::EmployeeValidation(err) => Self::Validation(err),
            other => Self::Storage(other),
        }
    }
}

/// Current wall-clock time in Unix epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{now_epoch_ms, EngineError, InvalidTransition};
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_errors_map_to_engine_kinds() {
        let id = Uuid::new_v4();

        assert!(matches!(
            EngineError::from(RepoError::DuplicateItems(id)),
            EngineError::DuplicateInstantiation(mapped) if mapped == id
        ));
        assert!(matches!(
            EngineError::from(RepoError::ItemAlreadyCompleted(id)),
            EngineError::InvalidTransition(InvalidTransition::ItemAlreadyCompleted(mapped))
                if mapped == id
        ));
        assert!(matches!(
            EngineError::from(RepoError::InvalidData("bad".to_string())),
            EngineError::Storage(_)
        ));
    }

    #[test]
    fn clock_is_monotonic_enough_for_audit_stamps() {
        let first = now_epoch_ms();
        let second = now_epoch_ms();
        assert!(second >= first);
        assert!(first > 0);
    }
}
