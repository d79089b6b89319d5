use clearance_core::db::open_db_in_memory;
use clearance_core::{
    Actor, ClearanceEngine, Department, EmployeeStatus, EngineError, ItemStatus, NewEmployee,
};

fn hr_manager() -> Actor {
    Actor::new("HR Manager", Department::Hr)
}

fn jane_doe() -> NewEmployee {
    NewEmployee {
        name: "Jane Doe".to_string(),
        employee_code: "E100".to_string(),
        ntlogin: "jdoe".to_string(),
        department: "Engineering".to_string(),
        resignation_date: "2025-01-15".to_string(),
    }
}

#[test]
fn full_offboarding_flow_from_registration_to_cleared() {
    let conn = open_db_in_memory().unwrap();
    let engine = ClearanceEngine::try_new(&conn).unwrap();

    // Registration enters clearance immediately: items and the status flip
    // are observed together.
    let created = engine
        .create_employee(&hr_manager(), &jane_doe(), true)
        .unwrap();
    assert_eq!(created.employee.status, EmployeeStatus::InClearance);
    assert_eq!(created.clearance_items.len(), engine.catalog().task_count());
    assert!(created
        .clearance_items
        .iter()
        .all(|item| item.status == ItemStatus::Pending));
    assert_eq!(created.progress.percent, 0);

    // HR signs off its first task.
    let hr_item = created
        .clearance_items
        .iter()
        .find(|item| item.department == Department::Hr)
        .unwrap();
    let outcome = engine
        .complete_item(
            &Actor::new("J. Smith", Department::Hr),
            hr_item.id,
            Some("J. Smith"),
            None,
        )
        .unwrap();
    assert_eq!(outcome.item.status, ItemStatus::Completed);
    assert_eq!(outcome.item.completed_by.as_deref(), Some("J. Smith"));
    assert!(!outcome.employee_cleared);

    let after_first = engine.get_employee(created.employee.id).unwrap();
    assert_eq!(after_first.employee.status, EmployeeStatus::InClearance);
    assert_eq!(after_first.progress.completed, 1);
    assert_eq!(after_first.progress.percent, 8);

    // Every other department signs off; the final completion flips the
    // employee within the same operation.
    let mut pending: Vec<_> = after_first
        .clearance_items
        .iter()
        .filter(|item| item.status == ItemStatus::Pending)
        .cloned()
        .collect();
    let last = pending.pop().unwrap();

    for item in &pending {
        let outcome = engine
            .complete_item(
                &Actor::new("Dept Signer", item.department),
                item.id,
                Some("Dept Signer"),
                None,
            )
            .unwrap();
        assert!(!outcome.employee_cleared);
    }

    let final_outcome = engine
        .complete_item(
            &Actor::new("Final Signer", last.department),
            last.id,
            Some("Final Signer"),
            None,
        )
        .unwrap();
    assert!(final_outcome.employee_cleared);

    let done = engine.get_employee(created.employee.id).unwrap();
    assert_eq!(done.employee.status, EmployeeStatus::Cleared);
    assert_eq!(done.progress.percent, 100);
    assert!(engine.is_fully_cleared(created.employee.id).unwrap());
}

#[test]
fn employee_management_requires_hr_or_super_admin() {
    let conn = open_db_in_memory().unwrap();
    let engine = ClearanceEngine::try_new(&conn).unwrap();

    let err = engine
        .create_employee(&Actor::new("IT Admin", Department::It), &jane_doe(), true)
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized { .. }));
    assert!(engine.list_employees().unwrap().is_empty());

    engine
        .create_employee(&Actor::new("Root", Department::SuperAdmin), &jane_doe(), false)
        .unwrap();
    assert_eq!(engine.list_employees().unwrap().len(), 1);
}

#[test]
fn begin_clearance_flips_status_and_generates_items_once() {
    let conn = open_db_in_memory().unwrap();
    let engine = ClearanceEngine::try_new(&conn).unwrap();

    let created = engine
        .create_employee(&hr_manager(), &jane_doe(), false)
        .unwrap();
    assert_eq!(created.employee.status, EmployeeStatus::Active);
    assert!(created.clearance_items.is_empty());

    let started = engine
        .begin_clearance(&hr_manager(), created.employee.id)
        .unwrap();
    assert_eq!(started.employee.status, EmployeeStatus::InClearance);
    assert_eq!(started.clearance_items.len(), engine.catalog().task_count());

    let err = engine
        .begin_clearance(&hr_manager(), created.employee.id)
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateInstantiation(_)));
}

#[test]
fn item_visibility_is_scoped_by_role() {
    let conn = open_db_in_memory().unwrap();
    let engine = ClearanceEngine::try_new(&conn).unwrap();

    let first = engine
        .create_employee(&hr_manager(), &jane_doe(), true)
        .unwrap();
    let mut second_request = jane_doe();
    second_request.name = "John Roe".to_string();
    second_request.employee_code = "E200".to_string();
    let second = engine
        .create_employee(&hr_manager(), &second_request, true)
        .unwrap();

    // Department actors see their own queue across employees.
    let it_actor = Actor::new("IT Admin", Department::It);
    let it_items = engine.items_for_actor(&it_actor).unwrap();
    assert_eq!(it_items.len(), 4);
    assert!(it_items
        .iter()
        .all(|item| item.department == Department::It));

    // Super-admin sees everything.
    let all = engine
        .items_for_actor(&Actor::new("Root", Department::SuperAdmin))
        .unwrap();
    assert_eq!(all.len(), engine.catalog().task_count() * 2);

    // The subject sees only its own record.
    let subject =
        Actor::new("Jane Doe", Department::Employee).with_linked_employee(first.employee.id);
    let own = engine.items_for_actor(&subject).unwrap();
    assert_eq!(own.len(), engine.catalog().task_count());
    assert!(own
        .iter()
        .all(|item| item.employee_id == first.employee.id));
    assert!(!own
        .iter()
        .any(|item| item.employee_id == second.employee.id));

    // An employee actor without a linked record gets nothing.
    let err = engine
        .items_for_actor(&Actor::new("Ghost", Department::Employee))
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized { .. }));
}

#[test]
fn employee_summaries_serialize_with_dashboard_field_names() {
    let conn = open_db_in_memory().unwrap();
    let engine = ClearanceEngine::try_new(&conn).unwrap();

    let created = engine
        .create_employee(&hr_manager(), &jane_doe(), true)
        .unwrap();
    let hr_item = created
        .clearance_items
        .iter()
        .find(|item| item.department == Department::Hr)
        .unwrap();
    engine
        .complete_item(
            &Actor::new("J. Smith", Department::Hr),
            hr_item.id,
            Some("J. Smith"),
            Some("done"),
        )
        .unwrap();

    let summary = engine.get_employee(created.employee.id).unwrap();
    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["name"], "Jane Doe");
    assert_eq!(json["employeeId"], "E100");
    assert_eq!(json["resignationDate"], "2025-01-15");
    assert_eq!(json["status"], "in_clearance");
    assert_eq!(json["progress"]["percent"], 8);

    let items = json["clearanceItems"].as_array().unwrap();
    let completed = items
        .iter()
        .find(|item| item["status"] == "completed")
        .unwrap();
    assert_eq!(completed["taskName"], "Finalize Payroll");
    assert_eq!(completed["completedBy"], "J. Smith");
    assert_eq!(completed["signature"], "J. Smith");
    assert_eq!(completed["remarks"], "done");
    assert_eq!(completed["overridden"], false);
}
