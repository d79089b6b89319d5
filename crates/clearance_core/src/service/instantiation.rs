//! Workflow instantiation: catalog expansion into a per-employee task set.
//!
//! # Responsibility
//! - Expand the task catalog into pending clearance items when an employee
//!   enters clearance.
//! - Guarantee idempotence: a second instantiation attempt is rejected and
//!   leaves the existing task set unchanged.
//!
//! # Invariants
//! - Items are generated in catalog order with contiguous `sort_order`.
//! - Item ids derive from `(employee, department, template index)`; the
//!   same employee/catalog pair always produces the same ids.
//! - Persistence and the `in_clearance` status flip are one atomic batch.

use crate::catalog::TaskCatalog;
use crate::model::employee::Employee;
use crate::model::item::ClearanceItem;
use crate::repo::item_repo::ClearanceItemRepository;
use crate::service::EngineResult;
use log::info;

/// Expands the catalog into concrete task sets for departing employees.
pub struct WorkflowInstantiator<'cat, R: ClearanceItemRepository> {
    items: R,
    catalog: &'cat TaskCatalog,
}

impl<'cat, R: ClearanceItemRepository> WorkflowInstantiator<'cat, R> {
    pub fn new(items: R, catalog: &'cat TaskCatalog) -> Self {
        Self { items, catalog }
    }

    /// Builds the pending item set for `employee` without persisting it.
    ///
    /// Exposed separately so callers can preview a catalog expansion.
    pub fn expand(&self, employee: &Employee) -> Vec<ClearanceItem> {
        let mut generated = Vec::with_capacity(self.catalog.task_count());
        for (department, templates) in self.catalog.all_templates() {
            for (template_index, template) in templates.iter().enumerate() {
                let mut item = ClearanceItem::from_template(
                    employee.id,
                    department,
                    template_index,
                    &template.task_name,
                    &template.description,
                    template.requires_signature,
                );
                item.sort_order = generated.len() as u32;
                generated.push(item);
            }
        }
        generated
    }

    /// Generates and persists the task set, flipping the employee to
    /// `in_clearance` in the same transaction.
    ///
    /// # Errors
    /// - `DuplicateInstantiation` when the employee already has items.
    /// - `EmployeeNotFound` when the employee row is missing.
    pub fn instantiate(&self, employee: &Employee) -> EngineResult<Vec<ClearanceItem>> {
        let generated = self.expand(employee);
        self.items
            .insert_items_for_employee(employee.id, &generated)?;

        info!(
            "event=clearance_instantiate module=service status=ok employee={} items={}",
            employee.id,
            generated.len()
        );
        Ok(generated)
    }
}
