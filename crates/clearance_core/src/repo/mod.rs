//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for employees and
//!   clearance items.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must validate domain records before persistence.
//! - Repository APIs return semantic errors (`EmployeeNotFound`,
//!   `ItemAlreadyCompleted`, ...) in addition to DB transport errors.
//! - Repositories refuse connections whose schema is not fully migrated.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::employee::{EmployeeId, EmployeeValidationError};
use crate::model::item::{ItemId, ItemValidationError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod employee_repo;
pub mod item_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Shared repository error for clearance persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    EmployeeNotFound(EmployeeId),
    ItemNotFound(ItemId),
    /// Completion raced or repeated on an already-completed item.
    ItemAlreadyCompleted(ItemId),
    /// The employee already has an instantiated task set.
    DuplicateItems(EmployeeId),
    EmployeeValidation(EmployeeValidationError),
    ItemValidation(ItemValidationError),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "clearance item not found: {id}"),
            Self::ItemAlreadyCompleted(id) => {
                write!(f, "clearance item is already completed: {id}")
            }
            Self::DuplicateItems(id) => {
                write!(f, "employee already has clearance items: {id}")
            }
            Self::EmployeeValidation(err) => write!(f, "{err}"),
            Self::ItemValidation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted clearance data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::EmployeeValidation(err) => Some(err),
            Self::ItemValidation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<EmployeeValidationError> for RepoError {
    fn from(value: EmployeeValidationError) -> Self {
        Self::EmployeeValidation(value)
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::ItemValidation(value)
    }
}

/// Table/column requirements one repository depends on.
pub(crate) struct TableRequirement {
    pub table: &'static str,
    pub columns: &'static [&'static str],
}

/// Verifies the connection carries a fully migrated schema with the tables
/// and columns a repository needs. Run once at repository construction.
pub(crate) fn ensure_schema_ready(
    conn: &Connection,
    requirements: &[TableRequirement],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for requirement in requirements {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", requirement.table))?;
        let mut rows = stmt.query([])?;
        let mut present = Vec::new();
        while let Some(row) = rows.next()? {
            present.push(row.get::<_, String>(1)?);
        }

        if present.is_empty() {
            return Err(RepoError::MissingRequiredTable(requirement.table));
        }
        for column in requirement.columns {
            if !present.iter().any(|candidate| candidate == column) {
                return Err(RepoError::MissingRequiredColumn {
                    table: requirement.table,
                    column,
                });
            }
        }
    }

    Ok(())
}
