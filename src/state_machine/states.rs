use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Behaviour shared by every closed status enum the engine can drive
pub trait EntityStatus:
    Copy
    + Eq
    + Hash
    + fmt::Debug
    + fmt::Display
    + FromStr<Err = String>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Every member of the enum, in declaration order
    const ALL: &'static [Self];

    /// Stored representation of the status
    fn as_str(&self) -> &'static str;
}

/// Connection request state between a patient and a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Request sent, awaiting the provider's decision
    Pending,
    /// Connection is live
    Approved,
    /// Request was declined
    Rejected,
    /// Connection suspended by one of the parties
    Blocked,
}

impl EntityStatus for ConnectionStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Approved, Self::Rejected, Self::Blocked];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "blocked" => Ok(Self::Blocked),
            _ => Err(format!("Invalid connection status: {s}")),
        }
    }
}

/// Marketplace order fulfilment state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, not yet accepted by the vendor
    Pending,
    /// Vendor accepted the order
    Confirmed,
    /// Vendor is preparing the order
    Preparing,
    /// Order is ready for pickup or dispatch
    Ready,
    /// Order handed over to the buyer
    Delivered,
    /// Order was cancelled before delivery
    Cancelled,
}

impl OrderStatus {
    /// Check if the order is still moving through fulfilment
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Preparing | Self::Ready)
    }
}

impl EntityStatus for OrderStatus {
    const ALL: &'static [Self] = &[
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::Delivered,
        Self::Cancelled,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid order status: {s}")),
        }
    }
}

/// User setting lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingStatus {
    /// Setting saved but not yet applied
    Pending,
    /// Setting is in effect
    Active,
    /// Setting is kept but not applied
    Inactive,
    /// Setting retired permanently
    Archived,
}

impl EntityStatus for SettingStatus {
    const ALL: &'static [Self] = &[Self::Pending, Self::Active, Self::Inactive, Self::Archived];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for SettingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Invalid setting status: {s}")),
        }
    }
}

/// Default state for new connection requests
impl Default for ConnectionStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Default state for new orders
impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}
