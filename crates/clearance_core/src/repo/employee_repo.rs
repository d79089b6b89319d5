//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `employees` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Only the lifecycle manager mutates employees through this repository.
//! - Deleting an employee cascades to its clearance items in one statement
//!   (`ON DELETE CASCADE`, `foreign_keys=ON`).
//! - Listing order is deterministic: `created_at DESC, uuid ASC`.

use crate::model::employee::{Employee, EmployeeId, EmployeeStatus};
use crate::repo::{ensure_schema_ready, RepoError, RepoResult, TableRequirement};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    employee_code,
    ntlogin,
    department,
    resignation_date,
    status,
    created_at,
    created_by
FROM employees";

const EMPLOYEE_REQUIREMENTS: &[TableRequirement] = &[TableRequirement {
    table: "employees",
    columns: &[
        "uuid",
        "name",
        "employee_code",
        "ntlogin",
        "department",
        "resignation_date",
        "status",
        "created_at",
        "created_by",
    ],
}];

/// Repository interface for employee records.
pub trait EmployeeRepository {
    fn create_employee(&self, employee: &Employee) -> RepoResult<EmployeeId>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn list_employees(&self) -> RepoResult<Vec<Employee>>;
    /// Full-record update of the mutable identity fields. Status is written
    /// as carried by `employee`; status transition policy lives above the
    /// repository.
    fn update_employee(&self, employee: &Employee) -> RepoResult<()>;
    fn set_status(&self, id: EmployeeId, status: EmployeeStatus) -> RepoResult<()>;
    /// Hard delete; clearance items go with the employee atomically.
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
}

/// SQLite-backed employee repository. Cheap to copy; it only borrows the
/// connection.
#[derive(Clone, Copy, Debug)]
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Wraps a migrated connection; rejects unmigrated or foreign schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, EMPLOYEE_REQUIREMENTS)?;
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, employee: &Employee) -> RepoResult<EmployeeId> {
        self.conn.execute(
            "INSERT INTO employees (
                uuid,
                name,
                employee_code,
                ntlogin,
                department,
                resignation_date,
                status,
                created_at,
                created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                employee.id.to_string(),
                employee.name.as_str(),
                employee.employee_code.as_str(),
                employee.ntlogin.as_str(),
                employee.department.as_str(),
                employee.resignation_date.as_str(),
                status_to_db(employee.status),
                employee.created_at,
                employee.created_by.as_str(),
            ],
        )?;

        Ok(employee.id)
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }

        Ok(None)
    }

    fn list_employees(&self) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL} ORDER BY created_at DESC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }

    fn update_employee(&self, employee: &Employee) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees
             SET
                name = ?1,
                employee_code = ?2,
                ntlogin = ?3,
                department = ?4,
                resignation_date = ?5,
                status = ?6
             WHERE uuid = ?7;",
            params![
                employee.name.as_str(),
                employee.employee_code.as_str(),
                employee.ntlogin.as_str(),
                employee.department.as_str(),
                employee.resignation_date.as_str(),
                status_to_db(employee.status),
                employee.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::EmployeeNotFound(employee.id));
        }

        Ok(())
    }

    fn set_status(&self, id: EmployeeId, status: EmployeeStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE employees SET status = ?1 WHERE uuid = ?2;",
            params![status_to_db(status), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::EmployeeNotFound(id));
        }

        Ok(())
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::EmployeeNotFound(id));
        }

        Ok(())
    }
}

pub(crate) fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in employees.uuid"))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid employee status `{status_text}` in employees.status"
        ))
    })?;

    Ok(Employee {
        id,
        name: row.get("name")?,
        employee_code: row.get("employee_code")?,
        ntlogin: row.get("ntlogin")?,
        department: row.get("department")?,
        resignation_date: row.get("resignation_date")?,
        status,
        created_at: row.get("created_at")?,
        created_by: row.get("created_by")?,
    })
}

pub(crate) fn status_to_db(status: EmployeeStatus) -> &'static str {
    match status {
        EmployeeStatus::Active => "active",
        EmployeeStatus::InClearance => "in_clearance",
        EmployeeStatus::Cleared => "cleared",
    }
}

pub(crate) fn parse_status(value: &str) -> Option<EmployeeStatus> {
    match value {
        "active" => Some(EmployeeStatus::Active),
        "in_clearance" => Some(EmployeeStatus::InClearance),
        "cleared" => Some(EmployeeStatus::Cleared),
        _ => None,
    }
}
