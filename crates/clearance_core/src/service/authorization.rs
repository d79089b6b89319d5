//! Authorization gate for clearance actions.
//!
//! # Responsibility
//! - Decide whether an actor may transition or view a clearance item.
//! - Translate external role encodings into an `Actor` at the boundary.
//!
//! # Invariants
//! - Mutation requires department match or the super-admin capability.
//! - The `employee` role never mutates; it reads only its own linked items.

use crate::model::department::{parse_role_tag, Department, RoleTagError};
use crate::model::employee::EmployeeId;
use crate::model::item::ClearanceItem;

/// Authenticated caller identity as seen by the engine.
///
/// Built from whatever the authentication collaborator provides; the engine
/// never inspects raw role tags past this point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Name recorded in completion metadata.
    pub display_name: String,
    pub role: Department,
    /// For `employee`-role actors: the employee record they belong to.
    pub linked_employee: Option<EmployeeId>,
}

impl Actor {
    pub fn new(display_name: impl Into<String>, role: Department) -> Self {
        Self {
            display_name: display_name.into(),
            role,
            linked_employee: None,
        }
    }

    /// Builds an actor from an external role tag (name or legacy numeric
    /// code).
    pub fn from_role_tag(
        display_name: impl Into<String>,
        role_tag: &str,
        linked_employee: Option<EmployeeId>,
    ) -> Result<Self, RoleTagError> {
        Ok(Self {
            display_name: display_name.into(),
            role: parse_role_tag(role_tag)?,
            linked_employee,
        })
    }

    pub fn with_linked_employee(mut self, employee_id: EmployeeId) -> Self {
        self.linked_employee = Some(employee_id);
        self
    }

    /// Whether a completion by this actor is an administrative override
    /// rather than an ordinary departmental sign-off.
    pub fn is_override(&self) -> bool {
        self.role == Department::SuperAdmin
    }
}

/// May the actor apply the completion transition to this item?
pub fn can_act(actor: &Actor, item: &ClearanceItem) -> bool {
    match actor.role {
        Department::SuperAdmin => true,
        Department::Employee => false,
        role => role == item.department,
    }
}

/// May the actor read this item?
pub fn can_view(actor: &Actor, item: &ClearanceItem) -> bool {
    match actor.role {
        Department::Employee => actor.linked_employee == Some(item.employee_id),
        _ => true,
    }
}

/// May the actor create/update/delete employee records?
pub fn can_manage_employees(actor: &Actor) -> bool {
    matches!(actor.role, Department::SuperAdmin | Department::Hr)
}

#[cfg(test)]
mod tests {
    use super::{can_act, can_manage_employees, can_view, Actor};
    use crate::model::department::Department;
    use crate::model::item::ClearanceItem;
    use uuid::Uuid;

    fn hr_item(employee_id: Uuid) -> ClearanceItem {
        ClearanceItem::from_template(
            employee_id,
            Department::Hr,
            0,
            "Finalize Payroll",
            "Complete final payroll processing",
            true,
        )
    }

    #[test]
    fn matching_department_may_act() {
        let item = hr_item(Uuid::new_v4());
        assert!(can_act(&Actor::new("HR Manager", Department::Hr), &item));
    }

    #[test]
    fn foreign_department_may_not_act() {
        let item = hr_item(Uuid::new_v4());
        assert!(!can_act(&Actor::new("IT Admin", Department::It), &item));
    }

    #[test]
    fn super_admin_overrides_any_department() {
        let item = hr_item(Uuid::new_v4());
        let admin = Actor::new("Root", Department::SuperAdmin);
        assert!(can_act(&admin, &item));
        assert!(admin.is_override());
    }

    #[test]
    fn employee_role_never_mutates_even_own_items() {
        let employee_id = Uuid::new_v4();
        let item = hr_item(employee_id);
        let subject =
            Actor::new("Jane Doe", Department::Employee).with_linked_employee(employee_id);
        assert!(!can_act(&subject, &item));
        assert!(can_view(&subject, &item));
    }

    #[test]
    fn employee_role_cannot_view_other_employees_items() {
        let item = hr_item(Uuid::new_v4());
        let stranger =
            Actor::new("John Roe", Department::Employee).with_linked_employee(Uuid::new_v4());
        assert!(!can_view(&stranger, &item));

        let unlinked = Actor::new("Ghost", Department::Employee);
        assert!(!can_view(&unlinked, &item));
    }

    #[test]
    fn employee_management_is_hr_or_super_admin() {
        assert!(can_manage_employees(&Actor::new("HR", Department::Hr)));
        assert!(can_manage_employees(&Actor::new(
            "Root",
            Department::SuperAdmin
        )));
        assert!(!can_manage_employees(&Actor::new("IT", Department::It)));
        assert!(!can_manage_employees(&Actor::new(
            "Jane",
            Department::Employee
        )));
    }

    #[test]
    fn boundary_constructor_translates_legacy_codes() {
        let actor = Actor::from_role_tag("Ops", "8", None).expect("legacy code 8");
        assert_eq!(actor.role, Department::OperationsManager);
    }
}
