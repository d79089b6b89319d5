//! Employee domain model and lifecycle status.
//!
//! # Responsibility
//! - Define the departing-employee record owned by the lifecycle manager.
//! - Validate employee creation input before persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another employee.
//! - `status` only moves forward: `active -> in_clearance -> cleared`.
//! - `resignation_date` is an ISO calendar date (`YYYY-MM-DD`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable employee identifier.
pub type EmployeeId = Uuid;

static RESIGNATION_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid resignation date regex"));

/// Employee lifecycle state derived from clearance progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Employed; no clearance process started.
    Active,
    /// Offboarding started; clearance items exist and are being signed off.
    InClearance,
    /// Every clearance item is completed. Terminal.
    Cleared,
}

/// Departing-employee record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Stable global ID used for item linkage and auditing.
    pub id: EmployeeId,
    /// Display name.
    pub name: String,
    /// External employee identifier (badge/payroll number).
    #[serde(rename = "employeeId")]
    pub employee_code: String,
    /// Login identifier used by the authentication collaborator.
    pub ntlogin: String,
    /// Free-form home department name. Distinct from the canonical
    /// clearance `Department` enum; source data holds values like
    /// "Engineering" that are not task-owning roles.
    pub department: String,
    /// Last working day, `YYYY-MM-DD`.
    pub resignation_date: String,
    pub status: EmployeeStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub created_by: String,
}

/// Creation request for a departing employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployee {
    pub name: String,
    #[serde(rename = "employeeId")]
    pub employee_code: String,
    /// Optional at creation; some offboardings are registered before the
    /// account mapping is known.
    #[serde(default)]
    pub ntlogin: String,
    pub department: String,
    pub resignation_date: String,
}

/// Field-level validation failures for employee creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeValidationError {
    BlankName,
    BlankEmployeeCode,
    BlankDepartment,
    MissingResignationDate,
    MalformedResignationDate(String),
}

impl Display for EmployeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "employee name must not be blank"),
            Self::BlankEmployeeCode => write!(f, "employee id must not be blank"),
            Self::BlankDepartment => write!(f, "employee department must not be blank"),
            Self::MissingResignationDate => write!(f, "resignation date is required"),
            Self::MalformedResignationDate(value) => {
                write!(f, "resignation date must be YYYY-MM-DD, got `{value}`")
            }
        }
    }
}

impl Error for EmployeeValidationError {}

impl NewEmployee {
    /// Validates required creation fields.
    ///
    /// # Errors
    /// - Blank name, employee code, or department.
    /// - Missing or malformed resignation date.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        if self.name.trim().is_empty() {
            return Err(EmployeeValidationError::BlankName);
        }
        if self.employee_code.trim().is_empty() {
            return Err(EmployeeValidationError::BlankEmployeeCode);
        }
        if self.department.trim().is_empty() {
            return Err(EmployeeValidationError::BlankDepartment);
        }
        let date = self.resignation_date.trim();
        if date.is_empty() {
            return Err(EmployeeValidationError::MissingResignationDate);
        }
        if !RESIGNATION_DATE_RE.is_match(date) {
            return Err(EmployeeValidationError::MalformedResignationDate(
                date.to_string(),
            ));
        }
        Ok(())
    }
}

impl Employee {
    /// Materializes a validated creation request into a new record.
    ///
    /// # Invariants
    /// - Caller must have run `NewEmployee::validate()` first.
    /// - New employees always start `active`; entering clearance is a
    ///   separate lifecycle transition.
    pub fn from_request(request: &NewEmployee, created_by: &str, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            employee_code: request.employee_code.trim().to_string(),
            ntlogin: request.ntlogin.trim().to_string(),
            department: request.department.trim().to_string(),
            resignation_date: request.resignation_date.trim().to_string(),
            status: EmployeeStatus::Active,
            created_at,
            created_by: created_by.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Employee, EmployeeStatus, EmployeeValidationError, NewEmployee};

    fn request() -> NewEmployee {
        NewEmployee {
            name: "Jane Doe".to_string(),
            employee_code: "E100".to_string(),
            ntlogin: "jdoe".to_string(),
            department: "Engineering".to_string(),
            resignation_date: "2025-01-15".to_string(),
        }
    }

    #[test]
    fn valid_request_passes_and_materializes_active() {
        let req = request();
        req.validate().expect("request should validate");

        let employee = Employee::from_request(&req, "HR Manager", 1_700_000_000_000);
        assert_eq!(employee.status, EmployeeStatus::Active);
        assert_eq!(employee.employee_code, "E100");
        assert_eq!(employee.created_by, "HR Manager");
    }

    #[test]
    fn blank_required_fields_are_rejected() {
        let mut req = request();
        req.name = "   ".to_string();
        assert_eq!(req.validate(), Err(EmployeeValidationError::BlankName));

        let mut req = request();
        req.employee_code = String::new();
        assert_eq!(
            req.validate(),
            Err(EmployeeValidationError::BlankEmployeeCode)
        );

        let mut req = request();
        req.department = String::new();
        assert_eq!(req.validate(), Err(EmployeeValidationError::BlankDepartment));
    }

    #[test]
    fn resignation_date_format_is_enforced() {
        let mut req = request();
        req.resignation_date = String::new();
        assert_eq!(
            req.validate(),
            Err(EmployeeValidationError::MissingResignationDate)
        );

        let mut req = request();
        req.resignation_date = "15/01/2025".to_string();
        assert!(matches!(
            req.validate(),
            Err(EmployeeValidationError::MalformedResignationDate(_))
        ));
    }

    #[test]
    fn ntlogin_is_optional_at_creation() {
        let mut req = request();
        req.ntlogin = String::new();
        req.validate().expect("ntlogin may be empty");
    }
}
