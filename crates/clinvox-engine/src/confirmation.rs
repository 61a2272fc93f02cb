//! Single-slot confirmation state machine.
//!
//! At most one order is ever awaiting a yes/no response. A candidate
//! with warnings is held here instead of being queued; "yes" finalizes
//! it as Confirmed, "no" discards it as Cancelled. All transitions take
//! `&mut self`, so the read-modify-write is a single critical section
//! and two transcripts in quick succession can never both confirm the
//! same order.

use tracing::info;

use clinvox_core::types::{Order, OrderStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationState {
    Idle,
    AwaitingResponse,
}

/// Holds the one order pending confirmation, if any.
#[derive(Debug, Default)]
pub struct ConfirmationSlot {
    pending: Option<Order>,
}

impl ConfirmationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ConfirmationState {
        if self.pending.is_some() {
            ConfirmationState::AwaitingResponse
        } else {
            ConfirmationState::Idle
        }
    }

    pub fn is_awaiting(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&Order> {
        self.pending.as_ref()
    }

    /// Hold a candidate for confirmation.
    ///
    /// Refused (returning the candidate) while another order is already
    /// pending; the caller reports that the existing order must be
    /// resolved first.
    pub fn hold(&mut self, order: Order) -> Result<(), Order> {
        if self.pending.is_some() {
            return Err(order);
        }
        info!(order = %order.display_name, "Holding order for confirmation");
        self.pending = Some(order);
        Ok(())
    }

    /// Take the pending order as Confirmed. `None` when idle.
    pub fn confirm(&mut self) -> Option<Order> {
        let mut order = self.pending.take()?;
        order.status = OrderStatus::Confirmed;
        info!(order = %order.display_name, "Pending order confirmed");
        Some(order)
    }

    /// Take the pending order as Cancelled. `None` when idle.
    pub fn reject(&mut self) -> Option<Order> {
        let mut order = self.pending.take()?;
        order.status = OrderStatus::Cancelled;
        info!(order = %order.display_name, "Pending order rejected");
        Some(order)
    }
}
