//! Progress aggregation over clearance item state.
//!
//! # Responsibility
//! - Compute per-department and overall completion counters.
//! - Derive the fully-cleared verdict the lifecycle manager acts on.
//!
//! # Invariants
//! - Read-only: aggregation never mutates stored state.
//! - Each report is computed from one snapshot read.
//! - An employee with zero items is never considered cleared.

use crate::model::department::Department;
use crate::model::employee::EmployeeId;
use crate::repo::item_repo::{ClearanceItemRepository, ProgressCount};
use crate::service::EngineResult;
use serde::{Deserialize, Serialize};

/// Completion counters for one employee scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub completed: u32,
    pub total: u32,
    /// `round(completed / total * 100)`; 0 when there are no items.
    pub percent: u32,
}

impl ProgressReport {
    fn from_count(count: ProgressCount) -> Self {
        let percent = if count.total == 0 {
            0
        } else {
            ((f64::from(count.completed) / f64::from(count.total)) * 100.0).round() as u32
        };
        Self {
            completed: count.completed,
            total: count.total,
            percent,
        }
    }
}

/// Read-side aggregation over the clearance item store.
pub struct ProgressAggregator<R: ClearanceItemRepository> {
    items: R,
}

impl<R: ClearanceItemRepository> ProgressAggregator<R> {
    pub fn new(items: R) -> Self {
        Self { items }
    }

    /// Counters for one employee within one department.
    pub fn department_progress(
        &self,
        employee_id: EmployeeId,
        department: Department,
    ) -> EngineResult<ProgressReport> {
        let count = self.items.count_progress(employee_id, Some(department))?;
        Ok(ProgressReport::from_count(count))
    }

    /// Counters for one employee over all departments.
    pub fn overall_progress(&self, employee_id: EmployeeId) -> EngineResult<ProgressReport> {
        let count = self.items.count_progress(employee_id, None)?;
        Ok(ProgressReport::from_count(count))
    }

    /// True iff the employee has items and every one is completed.
    pub fn is_fully_cleared(&self, employee_id: EmployeeId) -> EngineResult<bool> {
        let count = self.items.count_progress(employee_id, None)?;
        Ok(count.total > 0 && count.completed == count.total)
    }
}
