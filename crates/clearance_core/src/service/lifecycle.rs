//! Employee lifecycle management.
//!
//! # Responsibility
//! - Own employee record creation, field updates, and deletion.
//! - Enforce the status machine: `active -> in_clearance -> cleared`, with
//!   `cleared` terminal.
//!
//! # Invariants
//! - Creation input is validated before any persistence.
//! - A requested `cleared` status is only honored when the aggregate says
//!   every item is complete; there is no unchecked override path.
//! - Deletion cascades to the employee's clearance items atomically.

use crate::model::employee::{Employee, EmployeeId, EmployeeStatus, NewEmployee};
use crate::repo::employee_repo::EmployeeRepository;
use crate::repo::item_repo::ClearanceItemRepository;
use crate::service::{now_epoch_ms, EngineError, EngineResult, InvalidTransition};
use log::info;
use serde::{Deserialize, Serialize};

/// Partial field update for an employee record. `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    #[serde(rename = "employeeId")]
    pub employee_code: Option<String>,
    pub ntlogin: Option<String>,
    pub department: Option<String>,
    pub resignation_date: Option<String>,
    pub status: Option<EmployeeStatus>,
}

/// Owns employee records and derives status from clearance progress.
pub struct EmployeeLifecycleManager<E: EmployeeRepository, I: ClearanceItemRepository> {
    employees: E,
    items: I,
}

impl<E: EmployeeRepository, I: ClearanceItemRepository> EmployeeLifecycleManager<E, I> {
    pub fn new(employees: E, items: I) -> Self {
        Self { employees, items }
    }

    /// Registers a departing employee. New records always start `active`;
    /// entering clearance is the instantiator's transition.
    pub fn create_employee(
        &self,
        request: &NewEmployee,
        created_by: &str,
    ) -> EngineResult<Employee> {
        request.validate()?;

        let employee = Employee::from_request(request, created_by, now_epoch_ms());
        self.employees.create_employee(&employee)?;

        info!(
            "event=employee_create module=service status=ok employee={}",
            employee.id
        );
        Ok(employee)
    }

    pub fn get_employee(&self, id: EmployeeId) -> EngineResult<Employee> {
        self.employees
            .get_employee(id)?
            .ok_or(EngineError::EmployeeNotFound(id))
    }

    pub fn list_employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(self.employees.list_employees()?)
    }

    /// Applies field updates and, when requested, a validated status change.
    ///
    /// # Errors
    /// - `EmployeeNotFound` for an unknown id.
    /// - `InvalidTransition` for a rejected status change: anything out of
    ///   `cleared`, a `cleared` request while items are pending, or a
    ///   transition that belongs to a lifecycle operation.
    /// - `Validation` when the updated fields no longer satisfy creation
    ///   constraints.
    pub fn update_employee(
        &self,
        id: EmployeeId,
        update: &EmployeeUpdate,
    ) -> EngineResult<Employee> {
        let mut employee = self.get_employee(id)?;

        if let Some(target) = update.status {
            self.validate_status_change(&employee, target)?;
            employee.status = target;
        }

        if let Some(name) = &update.name {
            employee.name = name.trim().to_string();
        }
        if let Some(code) = &update.employee_code {
            employee.employee_code = code.trim().to_string();
        }
        if let Some(ntlogin) = &update.ntlogin {
            employee.ntlogin = ntlogin.trim().to_string();
        }
        if let Some(department) = &update.department {
            employee.department = department.trim().to_string();
        }
        if let Some(date) = &update.resignation_date {
            employee.resignation_date = date.trim().to_string();
        }

        // Re-run creation constraints against the updated record.
        NewEmployee {
            name: employee.name.clone(),
            employee_code: employee.employee_code.clone(),
            ntlogin: employee.ntlogin.clone(),
            department: employee.department.clone(),
            resignation_date: employee.resignation_date.clone(),
        }
        .validate()?;

        self.employees.update_employee(&employee)?;

        info!(
            "event=employee_update module=service status=ok employee={id} employee_status={:?}",
            employee.status
        );
        Ok(employee)
    }

    /// Deletes the employee; items go with it in the same atomic operation
    /// (enforced by the cascading schema constraint).
    pub fn delete_employee(&self, id: EmployeeId) -> EngineResult<()> {
        self.employees.delete_employee(id)?;
        info!("event=employee_delete module=service status=ok employee={id}");
        Ok(())
    }

    fn validate_status_change(
        &self,
        employee: &Employee,
        target: EmployeeStatus,
    ) -> EngineResult<()> {
        if target == employee.status {
            return Ok(());
        }
        if employee.status == EmployeeStatus::Cleared {
            return Err(EngineError::InvalidTransition(
                InvalidTransition::ClearedIsTerminal(employee.id),
            ));
        }
        if target == EmployeeStatus::Cleared {
            let count = self.items.count_progress(employee.id, None)?;
            if count.total == 0 || count.completed != count.total {
                return Err(EngineError::InvalidTransition(
                    InvalidTransition::NotFullyCleared(employee.id),
                ));
            }
            return Ok(());
        }
        // active <-> in_clearance moves carry side effects (instantiation)
        // and are owned by the lifecycle operations, not field updates.
        Err(EngineError::InvalidTransition(
            InvalidTransition::UnmanagedStatusChange {
                from: employee.status,
                to: target,
            },
        ))
    }
}
