//! Core engine for the employee offboarding clearance workflow.
//! This crate is the single source of truth for business invariants:
//! catalog expansion, sign-off authorization, completion recording, and the
//! derived employee lifecycle.

pub mod catalog;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use catalog::{CatalogError, TaskCatalog, TaskTemplate};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::department::{
    parse_role_tag, Department, RoleTagError, OPERATIONAL_DEPARTMENTS,
};
pub use model::employee::{
    Employee, EmployeeId, EmployeeStatus, EmployeeValidationError, NewEmployee,
};
pub use model::item::{ClearanceItem, ItemId, ItemStatus, ItemValidationError};
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::item_repo::{
    ClearanceItemRepository, CompletionRecord, CompletionUpdate, ProgressCount,
    SqliteClearanceItemRepository,
};
pub use repo::{RepoError, RepoResult};
pub use service::authorization::{can_act, can_manage_employees, can_view, Actor};
pub use service::completion::{CompletionOutcome, CompletionRecorder};
pub use service::engine::{ClearanceEngine, EmployeeWithItems};
pub use service::instantiation::WorkflowInstantiator;
pub use service::lifecycle::{EmployeeLifecycleManager, EmployeeUpdate};
pub use service::progress::{ProgressAggregator, ProgressReport};
pub use service::{EngineError, EngineResult, InvalidTransition};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
