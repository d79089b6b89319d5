//! Clearance item domain model.
//!
//! # Responsibility
//! - Define one department's sign-off obligation for one employee.
//! - Keep completion metadata consistent with item status.
//!
//! # Invariants
//! - `status` moves one way: `pending -> completed`. Completed items are
//!   immutable.
//! - Completion metadata (`completed_by`, `completed_at`) is present exactly
//!   when the item is completed.
//! - `department` is always an operational department.

use crate::model::department::Department;
use crate::model::employee::EmployeeId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable clearance item identifier.
pub type ItemId = Uuid;

/// Sign-off state of one clearance item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Completed,
}

/// One department's task instance for one departing employee.
///
/// Items carry their own copies of task name/description so later catalog
/// revisions never retroactively change an employee's task set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearanceItem {
    pub id: ItemId,
    pub employee_id: EmployeeId,
    pub department: Department,
    pub task_name: String,
    pub description: String,
    /// Whether completion must carry a non-blank signature.
    pub requires_signature: bool,
    /// Position within the employee's task set, assigned at instantiation.
    /// Listing order is observable to users and must stay deterministic.
    #[serde(default)]
    pub sort_order: u32,
    pub status: ItemStatus,
    pub completed_by: Option<String>,
    /// Unix epoch milliseconds.
    pub completed_at: Option<i64>,
    pub signature: Option<String>,
    #[serde(default)]
    pub remarks: String,
    /// Set when a super-admin completed the item on behalf of the owning
    /// department (administrative correction, audit-distinguished from an
    /// ordinary sign-off).
    #[serde(default)]
    pub overridden: bool,
}

/// Item state violations detected before persistence or after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    NonOperationalDepartment(Department),
    BlankTaskName,
    PendingWithCompletionMetadata(ItemId),
    CompletedWithoutCompletionMetadata(ItemId),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonOperationalDepartment(department) => {
                write!(f, "department `{department}` cannot own clearance items")
            }
            Self::BlankTaskName => write!(f, "task name must not be blank"),
            Self::PendingWithCompletionMetadata(id) => {
                write!(f, "pending item carries completion metadata: {id}")
            }
            Self::CompletedWithoutCompletionMetadata(id) => {
                write!(f, "completed item is missing completion metadata: {id}")
            }
        }
    }
}

impl Error for ItemValidationError {}

impl ClearanceItem {
    /// Builds a pending item from one catalog template slot.
    ///
    /// The id is derived deterministically from
    /// `(employee_id, department, template index)`, so re-expanding the same
    /// catalog for the same employee reproduces identical ids instead of
    /// silently duplicating the task set.
    pub fn from_template(
        employee_id: EmployeeId,
        department: Department,
        template_index: usize,
        task_name: &str,
        description: &str,
        requires_signature: bool,
    ) -> Self {
        Self {
            id: deterministic_item_id(employee_id, department, template_index),
            employee_id,
            department,
            task_name: task_name.to_string(),
            description: description.to_string(),
            requires_signature,
            sort_order: 0,
            status: ItemStatus::Pending,
            completed_by: None,
            completed_at: None,
            signature: None,
            remarks: String::new(),
            overridden: false,
        }
    }

    /// Checks status/metadata consistency.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if !self.department.is_operational() {
            return Err(ItemValidationError::NonOperationalDepartment(
                self.department,
            ));
        }
        if self.task_name.trim().is_empty() {
            return Err(ItemValidationError::BlankTaskName);
        }
        match self.status {
            ItemStatus::Pending => {
                if self.completed_by.is_some()
                    || self.completed_at.is_some()
                    || self.signature.is_some()
                    || self.overridden
                {
                    return Err(ItemValidationError::PendingWithCompletionMetadata(self.id));
                }
            }
            ItemStatus::Completed => {
                if self.completed_by.is_none() || self.completed_at.is_none() {
                    return Err(ItemValidationError::CompletedWithoutCompletionMetadata(
                        self.id,
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }
}

/// Derives the stable item id for one `(employee, department, index)` slot.
pub fn deterministic_item_id(
    employee_id: EmployeeId,
    department: Department,
    template_index: usize,
) -> ItemId {
    let key = format!("{employee_id}:{}:{template_index}", department.as_str());
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::{deterministic_item_id, ClearanceItem, ItemStatus, ItemValidationError};
    use crate::model::department::Department;
    use uuid::Uuid;

    fn pending_item() -> ClearanceItem {
        ClearanceItem::from_template(
            Uuid::new_v4(),
            Department::Hr,
            0,
            "Finalize Payroll",
            "Complete final payroll processing",
            true,
        )
    }

    #[test]
    fn template_expansion_starts_pending_without_metadata() {
        let item = pending_item();
        assert_eq!(item.status, ItemStatus::Pending);
        assert!(item.completed_by.is_none());
        assert!(item.remarks.is_empty());
        assert!(!item.overridden);
        item.validate().expect("fresh item should validate");
    }

    #[test]
    fn item_ids_are_deterministic_per_slot() {
        let employee = Uuid::new_v4();
        let first = deterministic_item_id(employee, Department::It, 1);
        let again = deterministic_item_id(employee, Department::It, 1);
        let other_slot = deterministic_item_id(employee, Department::It, 2);
        let other_dept = deterministic_item_id(employee, Department::Hr, 1);

        assert_eq!(first, again);
        assert_ne!(first, other_slot);
        assert_ne!(first, other_dept);
    }

    #[test]
    fn pending_item_with_completion_metadata_is_invalid() {
        let mut item = pending_item();
        item.completed_by = Some("J. Smith".to_string());
        assert!(matches!(
            item.validate(),
            Err(ItemValidationError::PendingWithCompletionMetadata(_))
        ));
    }

    #[test]
    fn completed_item_requires_actor_and_timestamp() {
        let mut item = pending_item();
        item.status = ItemStatus::Completed;
        assert!(matches!(
            item.validate(),
            Err(ItemValidationError::CompletedWithoutCompletionMetadata(_))
        ));

        item.completed_by = Some("J. Smith".to_string());
        item.completed_at = Some(1_700_000_000_000);
        item.validate().expect("completed item should validate");
    }

    #[test]
    fn non_operational_departments_cannot_own_items() {
        let mut item = pending_item();
        item.department = Department::Employee;
        assert_eq!(
            item.validate(),
            Err(ItemValidationError::NonOperationalDepartment(
                Department::Employee
            ))
        );
    }
}
