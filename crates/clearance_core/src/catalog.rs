//! Department task catalog.
//!
//! # Responsibility
//! - Hold the ordered set of clearance tasks each department must perform.
//! - Serve as the single versioned source of truth for instantiation.
//!
//! # Invariants
//! - Iteration order is fixed: operational department order, then template
//!   declaration order. Repeated calls observe identical ordering.
//! - Catalog changes are never retroactive; instantiated items keep their
//!   own copies of task name/description.

use crate::model::department::Department;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One department-owned task definition. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTemplate {
    pub task_name: String,
    pub description: String,
    pub requires_signature: bool,
}

impl TaskTemplate {
    fn new(task_name: &str, description: &str, requires_signature: bool) -> Self {
        Self {
            task_name: task_name.to_string(),
            description: description.to_string(),
            requires_signature,
        }
    }
}

/// Catalog construction failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NonOperationalDepartment(Department),
    DuplicateDepartment(Department),
    BlankTaskName(Department),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonOperationalDepartment(department) => {
                write!(f, "department `{department}` cannot carry catalog tasks")
            }
            Self::DuplicateDepartment(department) => {
                write!(f, "department `{department}` is declared twice")
            }
            Self::BlankTaskName(department) => {
                write!(f, "department `{department}` declares a blank task name")
            }
        }
    }
}

impl Error for CatalogError {}

/// Ordered mapping from operational departments to their task templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCatalog {
    entries: Vec<(Department, Vec<TaskTemplate>)>,
}

impl TaskCatalog {
    /// Builds a catalog from explicit per-department entries.
    ///
    /// # Errors
    /// - A non-operational department carries tasks.
    /// - A department is declared more than once.
    /// - A task name is blank.
    pub fn from_entries(
        entries: Vec<(Department, Vec<TaskTemplate>)>,
    ) -> Result<Self, CatalogError> {
        for (index, (department, templates)) in entries.iter().enumerate() {
            if !department.is_operational() {
                return Err(CatalogError::NonOperationalDepartment(*department));
            }
            if entries[..index].iter().any(|(seen, _)| seen == department) {
                return Err(CatalogError::DuplicateDepartment(*department));
            }
            if templates
                .iter()
                .any(|template| template.task_name.trim().is_empty())
            {
                return Err(CatalogError::BlankTaskName(*department));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in offboarding catalog.
    pub fn default_catalog() -> Self {
        let entries = vec![
            (
                Department::Hr,
                vec![
                    TaskTemplate::new(
                        "Finalize Payroll",
                        "Complete final payroll processing",
                        true,
                    ),
                    TaskTemplate::new("Settle Benefits", "Process accrued leave and benefits", true),
                    TaskTemplate::new(
                        "Clear Financial Obligations",
                        "Settle cash advances and loans",
                        true,
                    ),
                    TaskTemplate::new(
                        "Document Return",
                        "Ensure all company documents are returned",
                        true,
                    ),
                ],
            ),
            (
                Department::It,
                vec![
                    TaskTemplate::new(
                        "Delete System Access",
                        "Remove computer and payslip access",
                        true,
                    ),
                    TaskTemplate::new("Collect Mobile Phone", "Retrieve company mobile phone", true),
                ],
            ),
            (
                Department::TeamLeader,
                vec![TaskTemplate::new(
                    "Clearance Verification",
                    "Verify and provide signature for clearance",
                    true,
                )],
            ),
            (
                Department::EngineeringAuxiliary,
                vec![
                    TaskTemplate::new(
                        "Return Company ID",
                        "Collect company identification card",
                        true,
                    ),
                    TaskTemplate::new("Return Headset", "Collect company headset", true),
                ],
            ),
            (
                Department::AdminFacilities,
                vec![TaskTemplate::new(
                    "Damage Assessment",
                    "Check for any company property damages",
                    true,
                )],
            ),
            (
                Department::AccountCoordinator,
                vec![TaskTemplate::new(
                    "Account Confirmation",
                    "Confirm and provide signature",
                    true,
                )],
            ),
            (
                Department::OperationsManager,
                vec![TaskTemplate::new(
                    "Operations Confirmation",
                    "Confirm and provide signature",
                    true,
                )],
            ),
        ];

        Self { entries }
    }

    /// Ordered task list for one department. Empty when the department
    /// declares no tasks in this catalog version.
    pub fn templates_for(&self, department: Department) -> &[TaskTemplate] {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == department)
            .map(|(_, templates)| templates.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates all `(department, templates)` entries in fixed order.
    pub fn all_templates(&self) -> impl Iterator<Item = (Department, &[TaskTemplate])> {
        self.entries
            .iter()
            .map(|(department, templates)| (*department, templates.as_slice()))
    }

    /// Total number of tasks one instantiation will generate.
    pub fn task_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, templates)| templates.len())
            .sum()
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, TaskCatalog, TaskTemplate};
    use crate::model::department::{Department, OPERATIONAL_DEPARTMENTS};

    #[test]
    fn default_catalog_covers_every_operational_department() {
        let catalog = TaskCatalog::default_catalog();
        for department in OPERATIONAL_DEPARTMENTS {
            assert!(
                !catalog.templates_for(*department).is_empty(),
                "missing tasks for {department}"
            );
        }
        assert_eq!(catalog.task_count(), 12);
    }

    #[test]
    fn ordering_is_stable_across_calls() {
        let catalog = TaskCatalog::default_catalog();
        let first: Vec<_> = catalog
            .all_templates()
            .map(|(department, templates)| (department, templates.len()))
            .collect();
        let second: Vec<_> = catalog
            .all_templates()
            .map(|(department, templates)| (department, templates.len()))
            .collect();
        assert_eq!(first, second);
        assert_eq!(first[0].0, Department::Hr);
    }

    #[test]
    fn unknown_department_yields_empty_task_list() {
        let catalog = TaskCatalog::from_entries(vec![(
            Department::It,
            vec![TaskTemplate::new("Revoke VPN", "Remove VPN profile", false)],
        )])
        .expect("single entry catalog");
        assert!(catalog.templates_for(Department::Hr).is_empty());
    }

    #[test]
    fn rejects_non_operational_and_duplicate_departments() {
        let err = TaskCatalog::from_entries(vec![(
            Department::SuperAdmin,
            vec![TaskTemplate::new("Anything", "", true)],
        )])
        .expect_err("super_admin tasks must fail");
        assert_eq!(
            err,
            CatalogError::NonOperationalDepartment(Department::SuperAdmin)
        );

        let err = TaskCatalog::from_entries(vec![
            (
                Department::Hr,
                vec![TaskTemplate::new("Payroll", "", true)],
            ),
            (
                Department::Hr,
                vec![TaskTemplate::new("Benefits", "", true)],
            ),
        ])
        .expect_err("duplicate department must fail");
        assert_eq!(err, CatalogError::DuplicateDepartment(Department::Hr));
    }

    #[test]
    fn rejects_blank_task_names() {
        let err = TaskCatalog::from_entries(vec![(
            Department::It,
            vec![TaskTemplate::new("  ", "blank", true)],
        )])
        .expect_err("blank task name must fail");
        assert_eq!(err, CatalogError::BlankTaskName(Department::It));
    }
}
