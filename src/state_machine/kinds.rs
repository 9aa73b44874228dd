//! # Entity Kinds
//!
//! Marker types binding a status enum to its transition table, its backing
//! table name, and the messages shown when a transition lands.
//!
//! The allow-lists here are the only place a transition edge is declared.
//! Everything else ([`TransitionTable`](super::table::TransitionTable),
//! [`TransitionGuard`](super::guards::TransitionGuard), the engine) derives
//! from them.

use super::states::{ConnectionStatus, EntityStatus, OrderStatus, SettingStatus};
use crate::constants::tables;

/// An entity kind whose status is driven by the transition engine
pub trait EntityKind: Send + Sync + 'static {
    /// Closed status enum for this kind
    type Status: EntityStatus;

    /// Lowercase identifier used in logs and event names
    const NAME: &'static str;

    /// Capitalized label used in user-facing messages
    const LABEL: &'static str;

    /// Table holding the entity records
    const TABLE: &'static str;

    /// Statuses reachable in one step from `from`
    fn allowed_transitions(from: Self::Status) -> &'static [Self::Status];

    /// Confirmation shown after a successful move into `to`
    fn notification_message(to: Self::Status) -> String {
        format!("{} {}", Self::LABEL, to)
    }

    /// Whether entering `status` records the reason as the rejection reason
    fn is_rejection(_status: Self::Status) -> bool {
        false
    }
}

/// Patient/provider connection requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection;

impl EntityKind for Connection {
    type Status = ConnectionStatus;

    const NAME: &'static str = "connection";
    const LABEL: &'static str = "Connection";
    const TABLE: &'static str = tables::CONNECTIONS;

    fn allowed_transitions(from: ConnectionStatus) -> &'static [ConnectionStatus] {
        use ConnectionStatus::*;

        match from {
            Pending => &[Approved, Rejected],
            Approved => &[Blocked],
            Rejected => &[],
            Blocked => &[Approved],
        }
    }

    fn is_rejection(status: ConnectionStatus) -> bool {
        status == ConnectionStatus::Rejected
    }
}

/// Marketplace orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Order;

impl EntityKind for Order {
    type Status = OrderStatus;

    const NAME: &'static str = "order";
    const LABEL: &'static str = "Order";
    const TABLE: &'static str = tables::MARKETPLACE_ORDERS;

    fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
        use OrderStatus::*;

        match from {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[Preparing, Cancelled],
            Preparing => &[Ready, Cancelled],
            Ready => &[Delivered],
            Delivered => &[],
            Cancelled => &[],
        }
    }

    fn notification_message(to: OrderStatus) -> String {
        match to {
            OrderStatus::Preparing => "Order is being prepared".to_string(),
            OrderStatus::Ready => "Order is ready".to_string(),
            other => format!("Order {other}"),
        }
    }
}

/// Per-user settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Setting;

impl EntityKind for Setting {
    type Status = SettingStatus;

    const NAME: &'static str = "setting";
    const LABEL: &'static str = "Setting";
    const TABLE: &'static str = tables::USER_SETTINGS;

    fn allowed_transitions(from: SettingStatus) -> &'static [SettingStatus] {
        use SettingStatus::*;

        match from {
            Pending => &[Active, Inactive],
            Active => &[Inactive, Archived],
            Inactive => &[Active, Archived],
            Archived => &[],
        }
    }

    fn notification_message(to: SettingStatus) -> String {
        match to {
            SettingStatus::Active => "Setting activated".to_string(),
            SettingStatus::Inactive => "Setting deactivated".to_string(),
            other => format!("Setting {other}"),
        }
    }
}
