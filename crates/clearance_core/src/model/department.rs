//! Canonical department/role enumeration and boundary role-tag parsing.
//!
//! # Responsibility
//! - Define the closed set of roles known to the clearance engine.
//! - Translate external role encodings (names or legacy numeric codes) into
//!   the canonical enum at the boundary.
//!
//! # Invariants
//! - Core data never stores raw role tags; only `Department` values.
//! - Clearance items belong to operational departments only (never
//!   `SuperAdmin` or `Employee`).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Closed role/department set for the clearance process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    /// Administrative override role; owns no clearance tasks.
    SuperAdmin,
    Hr,
    It,
    TeamLeader,
    EngineeringAuxiliary,
    AdminFacilities,
    AccountCoordinator,
    OperationsManager,
    /// The subject of clearance; read-only on own items.
    Employee,
}

/// Departments that own clearance tasks, in catalog expansion order.
pub const OPERATIONAL_DEPARTMENTS: &[Department] = &[
    Department::Hr,
    Department::It,
    Department::TeamLeader,
    Department::EngineeringAuxiliary,
    Department::AdminFacilities,
    Department::AccountCoordinator,
    Department::OperationsManager,
];

impl Department {
    /// Stable snake_case id used in storage and on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Hr => "hr",
            Self::It => "it",
            Self::TeamLeader => "team_leader",
            Self::EngineeringAuxiliary => "engineering_auxiliary",
            Self::AdminFacilities => "admin_facilities",
            Self::AccountCoordinator => "account_coordinator",
            Self::OperationsManager => "operations_manager",
            Self::Employee => "employee",
        }
    }

    /// User-facing department name.
    pub fn label(self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Administrator",
            Self::Hr => "Human Resources",
            Self::It => "Information Technology",
            Self::TeamLeader => "Team Leader",
            Self::EngineeringAuxiliary => "Engineering & Auxiliary",
            Self::AdminFacilities => "Admin/Facilities",
            Self::AccountCoordinator => "Account Coordinator",
            Self::OperationsManager => "Operations Manager",
            Self::Employee => "Employee",
        }
    }

    /// Returns whether this department owns clearance tasks.
    pub fn is_operational(self) -> bool {
        !matches!(self, Self::SuperAdmin | Self::Employee)
    }
}

impl Display for Department {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy numeric role codes observed in older account exports.
///
/// Positional over the declared enum order; accepted on input only.
const LEGACY_ROLE_CODES: &[(u8, Department)] = &[
    (1, Department::SuperAdmin),
    (2, Department::Hr),
    (3, Department::It),
    (4, Department::TeamLeader),
    (5, Department::EngineeringAuxiliary),
    (6, Department::AdminFacilities),
    (7, Department::AccountCoordinator),
    (8, Department::OperationsManager),
    (9, Department::Employee),
];

/// Role-tag translation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleTagError {
    EmptyTag,
    UnknownTag(String),
    UnknownCode(u8),
}

impl Display for RoleTagError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTag => write!(f, "role tag must not be empty"),
            Self::UnknownTag(tag) => write!(f, "unknown role tag: {tag}"),
            Self::UnknownCode(code) => write!(f, "unknown legacy role code: {code}"),
        }
    }
}

impl Error for RoleTagError {}

/// Parses one external role tag into the canonical department.
///
/// Accepts canonical snake_case names and legacy numeric codes. External
/// encodings are translated here and nowhere else.
pub fn parse_role_tag(tag: &str) -> Result<Department, RoleTagError> {
    let normalized = tag.trim();
    if normalized.is_empty() {
        return Err(RoleTagError::EmptyTag);
    }

    if let Ok(code) = normalized.parse::<u8>() {
        return LEGACY_ROLE_CODES
            .iter()
            .find(|(candidate, _)| *candidate == code)
            .map(|(_, department)| *department)
            .ok_or(RoleTagError::UnknownCode(code));
    }

    match normalized {
        "super_admin" => Ok(Department::SuperAdmin),
        "hr" => Ok(Department::Hr),
        "it" => Ok(Department::It),
        "team_leader" => Ok(Department::TeamLeader),
        "engineering_auxiliary" => Ok(Department::EngineeringAuxiliary),
        "admin_facilities" => Ok(Department::AdminFacilities),
        "account_coordinator" => Ok(Department::AccountCoordinator),
        "operations_manager" => Ok(Department::OperationsManager),
        "employee" => Ok(Department::Employee),
        other => Err(RoleTagError::UnknownTag(other.to_string())),
    }
}

/// Parses a stored department id. Storage is written by this crate, so only
/// canonical names are accepted.
pub fn parse_department(value: &str) -> Option<Department> {
    match value {
        "super_admin" => Some(Department::SuperAdmin),
        "hr" => Some(Department::Hr),
        "it" => Some(Department::It),
        "team_leader" => Some(Department::TeamLeader),
        "engineering_auxiliary" => Some(Department::EngineeringAuxiliary),
        "admin_facilities" => Some(Department::AdminFacilities),
        "account_coordinator" => Some(Department::AccountCoordinator),
        "operations_manager" => Some(Department::OperationsManager),
        "employee" => Some(Department::Employee),
        _ => None,
    }
}
