//! Engine facade: the read/write contract consumed by dashboards.
//!
//! # Responsibility
//! - Bind the workflow services to one migrated SQLite connection.
//! - Apply the authorization gate before every privileged operation.
//!
//! # Invariants
//! - UI collaborators are callers of this surface, never direct mutators of
//!   the store.
//! - Role identity enters as an `Actor`; raw role tags never reach the
//!   services.

use crate::catalog::TaskCatalog;
use crate::model::department::Department;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::item::{ClearanceItem, ItemId};
use crate::repo::employee_repo::SqliteEmployeeRepository;
use crate::repo::item_repo::{ClearanceItemRepository, SqliteClearanceItemRepository};
use crate::service::authorization::{can_manage_employees, can_view, Actor};
use crate::service::completion::{CompletionOutcome, CompletionRecorder};
use crate::service::instantiation::WorkflowInstantiator;
use crate::service::lifecycle::{EmployeeLifecycleManager, EmployeeUpdate};
use crate::service::progress::{ProgressAggregator, ProgressReport};
use crate::service::{EngineError, EngineResult};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Employee read model with its embedded task set and counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeWithItems {
    #[serde(flatten)]
    pub employee: Employee,
    pub clearance_items: Vec<ClearanceItem>,
    pub progress: ProgressReport,
}

/// Clearance workflow engine over one storage connection.
pub struct ClearanceEngine<'conn> {
    employees: SqliteEmployeeRepository<'conn>,
    items: SqliteClearanceItemRepository<'conn>,
    catalog: TaskCatalog,
}

impl<'conn> ClearanceEngine<'conn> {
    /// Binds the engine to a migrated connection using the built-in catalog.
    pub fn try_new(conn: &'conn Connection) -> EngineResult<Self> {
        Self::with_catalog(conn, TaskCatalog::default_catalog())
    }

    /// Binds the engine with a custom catalog version.
    pub fn with_catalog(conn: &'conn Connection, catalog: TaskCatalog) -> EngineResult<Self> {
        Ok(Self {
            employees: SqliteEmployeeRepository::try_new(conn)?,
            items: SqliteClearanceItemRepository::try_new(conn)?,
            catalog,
        })
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    fn lifecycle(
        &self,
    ) -> EmployeeLifecycleManager<SqliteEmployeeRepository<'conn>, SqliteClearanceItemRepository<'conn>>
    {
        EmployeeLifecycleManager::new(self.employees, self.items)
    }

    fn aggregator(&self) -> ProgressAggregator<SqliteClearanceItemRepository<'conn>> {
        ProgressAggregator::new(self.items)
    }

    fn with_items(&self, employee: Employee) -> EngineResult<EmployeeWithItems> {
        let clearance_items = self.items.list_items_for_employee(employee.id)?;
        let progress = self.aggregator().overall_progress(employee.id)?;
        Ok(EmployeeWithItems {
            employee,
            clearance_items,
            progress,
        })
    }

    /// All employees with their item summaries, newest first.
    pub fn list_employees(&self) -> EngineResult<Vec<EmployeeWithItems>> {
        self.lifecycle()
            .list_employees()?
            .into_iter()
            .map(|employee| self.with_items(employee))
            .collect()
    }

    /// One employee with its item summary.
    pub fn get_employee(&self, id: EmployeeId) -> EngineResult<EmployeeWithItems> {
        let employee = self.lifecycle().get_employee(id)?;
        self.with_items(employee)
    }

    /// Registers a departing employee; with `enter_clearance` the task set
    /// is instantiated immediately and the employee enters clearance in the
    /// same call.
    pub fn create_employee(
        &self,
        actor: &Actor,
        request: &NewEmployee,
        enter_clearance: bool,
    ) -> EngineResult<EmployeeWithItems> {
        self.require_employee_management(actor)?;

        let employee = self
            .lifecycle()
            .create_employee(request, &actor.display_name)?;
        if enter_clearance {
            WorkflowInstantiator::new(self.items, &self.catalog).instantiate(&employee)?;
        }

        // Re-read so the returned status reflects the clearance flip.
        self.get_employee(employee.id)
    }

    /// Starts clearance for an existing employee: status flip plus task-set
    /// instantiation, observed together.
    pub fn begin_clearance(&self, actor: &Actor, id: EmployeeId) -> EngineResult<EmployeeWithItems> {
        self.require_employee_management(actor)?;

        let employee = self.lifecycle().get_employee(id)?;
        WorkflowInstantiator::new(self.items, &self.catalog).instantiate(&employee)?;
        self.get_employee(id)
    }

    /// Field updates; status overrides are validated against progress.
    pub fn update_employee(
        &self,
        actor: &Actor,
        id: EmployeeId,
        update: &EmployeeUpdate,
    ) -> EngineResult<EmployeeWithItems> {
        self.require_employee_management(actor)?;

        let employee = self.lifecycle().update_employee(id, update)?;
        self.with_items(employee)
    }

    /// Deletes the employee and, atomically, its clearance items.
    pub fn delete_employee(&self, actor: &Actor, id: EmployeeId) -> EngineResult<()> {
        self.require_employee_management(actor)?;
        self.lifecycle().delete_employee(id)
    }

    /// Records a sign-off and runs the derived lifecycle check in the same
    /// logical operation.
    pub fn complete_item(
        &self,
        actor: &Actor,
        item_id: ItemId,
        signature: Option<&str>,
        remarks: Option<&str>,
    ) -> EngineResult<CompletionOutcome> {
        CompletionRecorder::new(self.items).complete(item_id, actor, signature, remarks)
    }

    /// Items visible to the actor: own department for operational roles,
    /// everything for super-admin, the actor's own record for the
    /// `employee` role.
    pub fn items_for_actor(&self, actor: &Actor) -> EngineResult<Vec<ClearanceItem>> {
        match actor.role {
            Department::SuperAdmin => Ok(self.items.list_all_items()?),
            Department::Employee => match actor.linked_employee {
                Some(employee_id) => {
                    let items = self.items.list_items_for_employee(employee_id)?;
                    Ok(items
                        .into_iter()
                        .filter(|item| can_view(actor, item))
                        .collect())
                }
                None => Err(EngineError::Unauthorized {
                    actor_role: actor.role,
                    action: "list clearance items without a linked employee record",
                }),
            },
            department => Ok(self.items.list_items_for_department(department)?),
        }
    }

    pub fn department_progress(
        &self,
        employee_id: EmployeeId,
        department: Department,
    ) -> EngineResult<ProgressReport> {
        self.aggregator().department_progress(employee_id, department)
    }

    pub fn overall_progress(&self, employee_id: EmployeeId) -> EngineResult<ProgressReport> {
        self.aggregator().overall_progress(employee_id)
    }

    pub fn is_fully_cleared(&self, employee_id: EmployeeId) -> EngineResult<bool> {
        self.aggregator().is_fully_cleared(employee_id)
    }

    fn require_employee_management(&self, actor: &Actor) -> EngineResult<()> {
        if !can_manage_employees(actor) {
            return Err(EngineError::Unauthorized {
                actor_role: actor.role,
                action: "manage employee records",
            });
        }
        Ok(())
    }
}
