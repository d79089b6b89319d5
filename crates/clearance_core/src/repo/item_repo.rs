//! Clearance item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist per-employee clearance task sets and their sign-off state.
//! - Run the multi-statement mutations (batch instantiation, completion plus
//!   lifecycle flip) as single IMMEDIATE transactions.
//!
//! # Invariants
//! - An employee's task set is written all-or-nothing, together with the
//!   `in_clearance` status flip.
//! - Completion is guarded (`status = 'pending'`); concurrent attempts on
//!   one item resolve to exactly one winner.
//! - The `in_clearance -> cleared` flip happens in the same transaction as
//!   the completion that finishes the set.
//! - Listing order is deterministic: `sort_order ASC, uuid ASC`.

use crate::model::department::{parse_department, Department};
use crate::model::employee::EmployeeId;
use crate::model::item::{ClearanceItem, ItemId, ItemStatus};
use crate::repo::{ensure_schema_ready, RepoError, RepoResult, TableRequirement};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    employee_uuid,
    department,
    task_name,
    description,
    requires_signature,
    sort_order,
    status,
    completed_by,
    completed_at,
    signature,
    remarks,
    overridden
FROM clearance_items";

const ITEM_REQUIREMENTS: &[TableRequirement] = &[
    TableRequirement {
        table: "clearance_items",
        columns: &[
            "uuid",
            "employee_uuid",
            "department",
            "task_name",
            "requires_signature",
            "sort_order",
            "status",
            "completed_by",
            "completed_at",
            "signature",
            "remarks",
            "overridden",
        ],
    },
    TableRequirement {
        table: "employees",
        columns: &["uuid", "status"],
    },
];

/// Completion metadata applied to one pending item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionUpdate {
    pub completed_by: String,
    /// Unix epoch milliseconds.
    pub completed_at: i64,
    pub signature: Option<String>,
    pub remarks: String,
    /// Super-admin override sign-off, audit-distinguished.
    pub overridden: bool,
}

/// Result of a successfully applied completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub item: ClearanceItem,
    /// Whether this completion finished the set and flipped the employee
    /// to `cleared` within the same transaction.
    pub employee_cleared: bool,
}

/// Progress counters for one snapshot read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressCount {
    pub completed: u32,
    pub total: u32,
}

/// Repository interface for clearance item persistence.
pub trait ClearanceItemRepository {
    /// Persists a freshly instantiated task set and flips the employee to
    /// `in_clearance`, atomically.
    ///
    /// # Errors
    /// - `EmployeeNotFound` when the employee row does not exist.
    /// - `DuplicateItems` when the employee already has any items.
    fn insert_items_for_employee(
        &self,
        employee_id: EmployeeId,
        items: &[ClearanceItem],
    ) -> RepoResult<()>;

    fn get_item(&self, id: ItemId) -> RepoResult<Option<ClearanceItem>>;
    fn list_items_for_employee(&self, employee_id: EmployeeId) -> RepoResult<Vec<ClearanceItem>>;
    fn list_items_for_department(&self, department: Department) -> RepoResult<Vec<ClearanceItem>>;
    fn list_all_items(&self) -> RepoResult<Vec<ClearanceItem>>;

    /// Counts `(completed, total)` for one employee, optionally scoped to a
    /// department, in a single snapshot read.
    fn count_progress(
        &self,
        employee_id: EmployeeId,
        department: Option<Department>,
    ) -> RepoResult<ProgressCount>;

    /// Applies the one-directional completion transition.
    ///
    /// # Errors
    /// - `ItemNotFound` for an unknown id.
    /// - `ItemAlreadyCompleted` when the item was completed before or a
    ///   concurrent completion won the race.
    fn apply_completion(
        &self,
        item_id: ItemId,
        update: &CompletionUpdate,
    ) -> RepoResult<CompletionRecord>;
}

/// SQLite-backed clearance item repository. Cheap to copy; it only borrows
/// the connection.
#[derive(Clone, Copy, Debug)]
pub struct SqliteClearanceItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClearanceItemRepository<'conn> {
    /// Wraps a migrated connection; rejects unmigrated or foreign schemas.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, ITEM_REQUIREMENTS)?;
        Ok(Self { conn })
    }

    fn insert_item(tx: &Transaction<'_>, item: &ClearanceItem) -> RepoResult<()> {
        item.validate()?;

        tx.execute(
            "INSERT INTO clearance_items (
                uuid,
                employee_uuid,
                department,
                task_name,
                description,
                requires_signature,
                sort_order,
                status,
                completed_by,
                completed_at,
                signature,
                remarks,
                overridden
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13);",
            params![
                item.id.to_string(),
                item.employee_id.to_string(),
                item.department.as_str(),
                item.task_name.as_str(),
                item.description.as_str(),
                bool_to_int(item.requires_signature),
                item.sort_order,
                item_status_to_db(item.status),
                item.completed_by.as_deref(),
                item.completed_at,
                item.signature.as_deref(),
                item.remarks.as_str(),
                bool_to_int(item.overridden),
            ],
        )?;

        Ok(())
    }
}

impl ClearanceItemRepository for SqliteClearanceItemRepository<'_> {
    fn insert_items_for_employee(
        &self,
        employee_id: EmployeeId,
        items: &[ClearanceItem],
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let employee_key = employee_id.to_string();
        let status_text: Option<String> = tx
            .query_row(
                "SELECT status FROM employees WHERE uuid = ?1;",
                [employee_key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if status_text.is_none() {
            return Err(RepoError::EmployeeNotFound(employee_id));
        }

        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM clearance_items WHERE employee_uuid = ?1;",
            [employee_key.as_str()],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Err(RepoError::DuplicateItems(employee_id));
        }

        for item in items {
            Self::insert_item(&tx, item)?;
        }

        tx.execute(
            "UPDATE employees SET status = 'in_clearance' WHERE uuid = ?1;",
            [employee_key.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<ClearanceItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn list_items_for_employee(&self, employee_id: EmployeeId) -> RepoResult<Vec<ClearanceItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE employee_uuid = ?1
             ORDER BY sort_order ASC, uuid ASC;"
        ))?;

        let items = collect_items(stmt.query([employee_id.to_string()])?);
        items
    }

    fn list_items_for_department(&self, department: Department) -> RepoResult<Vec<ClearanceItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE department = ?1
             ORDER BY employee_uuid ASC, sort_order ASC, uuid ASC;"
        ))?;

        let items = collect_items(stmt.query([department.as_str()])?);
        items
    }

    fn list_all_items(&self) -> RepoResult<Vec<ClearanceItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL} ORDER BY employee_uuid ASC, sort_order ASC, uuid ASC;"
        ))?;

        let items = collect_items(stmt.query([])?);
        items
    }

    fn count_progress(
        &self,
        employee_id: EmployeeId,
        department: Option<Department>,
    ) -> RepoResult<ProgressCount> {
        let employee_key = employee_id.to_string();

        let (total, completed): (i64, i64) = match department {
            Some(department) => self.conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(status = 'completed'), 0)
                 FROM clearance_items
                 WHERE employee_uuid = ?1 AND department = ?2;",
                params![employee_key.as_str(), department.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(status = 'completed'), 0)
                 FROM clearance_items
                 WHERE employee_uuid = ?1;",
                [employee_key.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?,
        };

        Ok(ProgressCount {
            completed: completed as u32,
            total: total as u32,
        })
    }

    fn apply_completion(
        &self,
        item_id: ItemId,
        update: &CompletionUpdate,
    ) -> RepoResult<CompletionRecord> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let item_key = item_id.to_string();

        let current: Option<(String, String)> = tx
            .query_row(
                "SELECT employee_uuid, status FROM clearance_items WHERE uuid = ?1;",
                [item_key.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (employee_key, status_text) = match current {
            Some(found) => found,
            None => return Err(RepoError::ItemNotFound(item_id)),
        };
        if parse_item_status(&status_text) == Some(ItemStatus::Completed) {
            return Err(RepoError::ItemAlreadyCompleted(item_id));
        }

        let changed = tx.execute(
            "UPDATE clearance_items
             SET
                status = 'completed',
                completed_by = ?1,
                completed_at = ?2,
                signature = ?3,
                remarks = ?4,
                overridden = ?5
             WHERE uuid = ?6 AND status = 'pending';",
            params![
                update.completed_by.as_str(),
                update.completed_at,
                update.signature.as_deref(),
                update.remarks.as_str(),
                bool_to_int(update.overridden),
                item_key.as_str(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::ItemAlreadyCompleted(item_id));
        }

        let pending_left: i64 = tx.query_row(
            "SELECT COUNT(*) FROM clearance_items
             WHERE employee_uuid = ?1 AND status = 'pending';",
            [employee_key.as_str()],
            |row| row.get(0),
        )?;

        let mut employee_cleared = false;
        if pending_left == 0 {
            let flipped = tx.execute(
                "UPDATE employees SET status = 'cleared'
                 WHERE uuid = ?1 AND status = 'in_clearance';",
                [employee_key.as_str()],
            )?;
            employee_cleared = flipped > 0;
        }

        let item = tx.query_row(
            &format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"),
            [item_key.as_str()],
            |row| Ok(parse_item_row(row)),
        )??;

        tx.commit()?;
        Ok(CompletionRecord {
            item,
            employee_cleared,
        })
    }
}

fn collect_items(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<ClearanceItem>> {
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_item_row(row)?);
    }
    Ok(items)
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ClearanceItem> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in clearance_items.uuid"
        ))
    })?;

    let employee_text: String = row.get("employee_uuid")?;
    let employee_id = Uuid::parse_str(&employee_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{employee_text}` in clearance_items.employee_uuid"
        ))
    })?;

    let department_text: String = row.get("department")?;
    let department = parse_department(&department_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid department `{department_text}` in clearance_items.department"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_item_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid item status `{status_text}` in clearance_items.status"
        ))
    })?;

    let item = ClearanceItem {
        id,
        employee_id,
        department,
        task_name: row.get("task_name")?,
        description: row.get("description")?,
        requires_signature: int_to_bool(row.get("requires_signature")?, "requires_signature")?,
        sort_order: row.get("sort_order")?,
        status,
        completed_by: row.get("completed_by")?,
        completed_at: row.get("completed_at")?,
        signature: row.get("signature")?,
        remarks: row.get("remarks")?,
        overridden: int_to_bool(row.get("overridden")?, "overridden")?,
    };
    item.validate()?;
    Ok(item)
}

pub(crate) fn item_status_to_db(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Pending => "pending",
        ItemStatus::Completed => "completed",
    }
}

pub(crate) fn parse_item_status(value: &str) -> Option<ItemStatus> {
    match value {
        "pending" => Some(ItemStatus::Pending),
        "completed" => Some(ItemStatus::Completed),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in clearance_items.{column}"
        ))),
    }
}
