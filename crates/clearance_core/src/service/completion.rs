//! Completion recording: validated, atomic task sign-off.
//!
//! # Responsibility
//! - Validate a completion attempt (existence, transition, authorization,
//!   signature requirement) before touching storage.
//! - Apply the completion and the derived employee-status check as one
//!   logical operation.
//!
//! # Invariants
//! - Precondition order: not-found, invalid-transition, unauthorized,
//!   missing-signature.
//! - A blank or whitespace-only signature counts as missing.
//! - Super-admin completions are marked `overridden` in the stored
//!   metadata.

use crate::model::item::{ClearanceItem, ItemId};
use crate::repo::item_repo::{ClearanceItemRepository, CompletionUpdate};
use crate::service::authorization::{can_act, Actor};
use crate::service::{now_epoch_ms, EngineError, EngineResult, InvalidTransition};
use log::{info, warn};

/// Outcome of one recorded completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub item: ClearanceItem,
    /// True when this sign-off finished the employee's set and the employee
    /// was flipped to `cleared` within the same operation.
    pub employee_cleared: bool,
}

/// Applies the pending -> completed transition for department actors.
pub struct CompletionRecorder<R: ClearanceItemRepository> {
    items: R,
}

impl<R: ClearanceItemRepository> CompletionRecorder<R> {
    pub fn new(items: R) -> Self {
        Self { items }
    }

    /// Records a completion.
    ///
    /// # Errors
    /// - `ItemNotFound` for an unknown item id.
    /// - `InvalidTransition` when the item is already completed (including
    ///   losing a concurrent race).
    /// - `Unauthorized` when the gate refuses the actor.
    /// - `MissingSignature` when the task requires one and none was given.
    pub fn complete(
        &self,
        item_id: ItemId,
        actor: &Actor,
        signature: Option<&str>,
        remarks: Option<&str>,
    ) -> EngineResult<CompletionOutcome> {
        let item = self
            .items
            .get_item(item_id)?
            .ok_or(EngineError::ItemNotFound(item_id))?;

        if item.is_completed() {
            return Err(EngineError::InvalidTransition(
                InvalidTransition::ItemAlreadyCompleted(item_id),
            ));
        }

        if !can_act(actor, &item) {
            warn!(
                "event=item_complete module=service status=denied item={item_id} role={}",
                actor.role
            );
            return Err(EngineError::Unauthorized {
                actor_role: actor.role,
                action: "complete this clearance item",
            });
        }

        let signature = signature
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        if item.requires_signature && signature.is_none() {
            return Err(EngineError::MissingSignature(item_id));
        }

        let update = CompletionUpdate {
            completed_by: actor.display_name.clone(),
            completed_at: now_epoch_ms(),
            signature,
            remarks: remarks.map(str::trim).unwrap_or_default().to_string(),
            overridden: actor.is_override(),
        };

        // The repository runs the guarded update and, when the last pending
        // item falls, the employee flip inside one transaction.
        let record = self.items.apply_completion(item_id, &update)?;

        info!(
            "event=item_complete module=service status=ok item={item_id} employee={} department={} overridden={} cleared={}",
            record.item.employee_id,
            record.item.department,
            record.item.overridden,
            record.employee_cleared
        );

        Ok(CompletionOutcome {
            item: record.item,
            employee_cleared: record.employee_cleared,
        })
    }
}
