use clearance_core::db::open_db_in_memory;
use clearance_core::{
    Actor, ClearanceItem, CompletionRecorder, Department, EmployeeLifecycleManager, NewEmployee,
    ProgressAggregator, SqliteClearanceItemRepository, SqliteEmployeeRepository, TaskCatalog,
    TaskTemplate, WorkflowInstantiator, OPERATIONAL_DEPARTMENTS,
};
use rusqlite::Connection;
use uuid::Uuid;

fn employee_in_clearance(conn: &Connection) -> (Uuid, Vec<ClearanceItem>) {
    let employees = SqliteEmployeeRepository::try_new(conn).unwrap();
    let items = SqliteClearanceItemRepository::try_new(conn).unwrap();
    let lifecycle = EmployeeLifecycleManager::new(employees, items);

    let employee = lifecycle
        .create_employee(
            &NewEmployee {
                name: "Jane Doe".to_string(),
                employee_code: "E100".to_string(),
                ntlogin: "jdoe".to_string(),
                department: "Engineering".to_string(),
                resignation_date: "2025-01-15".to_string(),
            },
            "HR Manager",
        )
        .unwrap();

    let catalog = TaskCatalog::default_catalog();
    let generated = WorkflowInstantiator::new(items, &catalog)
        .instantiate(&employee)
        .unwrap();
    (employee.id, generated)
}

fn sign_off(conn: &Connection, item: &ClearanceItem) {
    let items = SqliteClearanceItemRepository::try_new(conn).unwrap();
    CompletionRecorder::new(items)
        .complete(
            item.id,
            &Actor::new("Signer", item.department),
            Some("Signer"),
            None,
        )
        .unwrap();
}

#[test]
fn department_and_overall_counters_track_completions() {
    let conn = open_db_in_memory().unwrap();
    let (employee_id, generated) = employee_in_clearance(&conn);
    let items = SqliteClearanceItemRepository::try_new(&conn).unwrap();
    let aggregator = ProgressAggregator::new(items);

    let hr_item = generated
        .iter()
        .find(|item| item.department == Department::Hr)
        .unwrap();
    sign_off(&conn, hr_item);

    let hr = aggregator
        .department_progress(employee_id, Department::Hr)
        .unwrap();
    assert_eq!((hr.completed, hr.total, hr.percent), (1, 4, 25));

    let overall = aggregator.overall_progress(employee_id).unwrap();
    assert_eq!((overall.completed, overall.total), (1, 12));
    assert_eq!(overall.percent, 8);

    let untouched = aggregator
        .department_progress(employee_id, Department::It)
        .unwrap();
    assert_eq!((untouched.completed, untouched.total), (0, 2));
}

#[test]
fn department_sums_equal_overall_counters() {
    let conn = open_db_in_memory().unwrap();
    let (employee_id, generated) = employee_in_clearance(&conn);
    let items = SqliteClearanceItemRepository::try_new(&conn).unwrap();
    let aggregator = ProgressAggregator::new(items);

    for item in generated.iter().take(5) {
        sign_off(&conn, item);
    }

    let mut summed_completed = 0;
    let mut summed_total = 0;
    for department in OPERATIONAL_DEPARTMENTS {
        let report = aggregator
            .department_progress(employee_id, *department)
            .unwrap();
        summed_completed += report.completed;
        summed_total += report.total;
    }

    let overall = aggregator.overall_progress(employee_id).unwrap();
    assert_eq!(summed_completed, overall.completed);
    assert_eq!(summed_total, overall.total);
}

#[test]
fn zero_item_scopes_report_zero_percent_without_errors() {
    let conn = open_db_in_memory().unwrap();
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let items = SqliteClearanceItemRepository::try_new(&conn).unwrap();
    let lifecycle = EmployeeLifecycleManager::new(employees, items);
    let aggregator = ProgressAggregator::new(items);

    // Registered but never instantiated: no items anywhere.
    let employee = lifecycle
        .create_employee(
            &NewEmployee {
                name: "John Roe".to_string(),
                employee_code: "E200".to_string(),
                ntlogin: String::new(),
                department: "Operations".to_string(),
                resignation_date: "2025-02-01".to_string(),
            },
            "HR Manager",
        )
        .unwrap();

    let report = aggregator
        .department_progress(employee.id, Department::Hr)
        .unwrap();
    assert_eq!((report.completed, report.total, report.percent), (0, 0, 0));

    let overall = aggregator.overall_progress(employee.id).unwrap();
    assert_eq!(overall.percent, 0);

    // Zero items never count as cleared.
    assert!(!aggregator.is_fully_cleared(employee.id).unwrap());
}

#[test]
fn catalog_without_a_department_reports_zero_for_it() {
    let conn = open_db_in_memory().unwrap();
    let employees = SqliteEmployeeRepository::try_new(&conn).unwrap();
    let items = SqliteClearanceItemRepository::try_new(&conn).unwrap();
    let lifecycle = EmployeeLifecycleManager::new(employees, items);

    let employee = lifecycle
        .create_employee(
            &NewEmployee {
                name: "Jane Doe".to_string(),
                employee_code: "E100".to_string(),
                ntlogin: "jdoe".to_string(),
                department: "Engineering".to_string(),
                resignation_date: "2025-01-15".to_string(),
            },
            "HR Manager",
        )
        .unwrap();

    let it_only = TaskCatalog::from_entries(vec![(
        Department::It,
        vec![TaskTemplate {
            task_name: "Revoke VPN".to_string(),
            description: String::new(),
            requires_signature: false,
        }],
    )])
    .unwrap();
    WorkflowInstantiator::new(items, &it_only)
        .instantiate(&employee)
        .unwrap();

    let aggregator = ProgressAggregator::new(items);
    let hr = aggregator
        .department_progress(employee.id, Department::Hr)
        .unwrap();
    assert_eq!((hr.completed, hr.total, hr.percent), (0, 0, 0));
}

#[test]
fn fully_cleared_requires_every_item_completed() {
    let conn = open_db_in_memory().unwrap();
    let (employee_id, generated) = employee_in_clearance(&conn);
    let items = SqliteClearanceItemRepository::try_new(&conn).unwrap();
    let aggregator = ProgressAggregator::new(items);

    let (last, rest) = generated.split_last().unwrap();
    for item in rest {
        sign_off(&conn, item);
    }
    assert!(!aggregator.is_fully_cleared(employee_id).unwrap());

    sign_off(&conn, last);
    assert!(aggregator.is_fully_cleared(employee_id).unwrap());
    assert_eq!(
        aggregator.overall_progress(employee_id).unwrap().percent,
        100
    );
}
