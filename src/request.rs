//! Resource request records as served by the backend
use crate::utils::to_paise;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Pending,
    Approved,
    PartiallyApproved,
    Rejected,
    Delivered,
    Refetched,
}

impl RequestStatus {
    /// Parses a raw lifecycle value, ignoring case and surrounding whitespace.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "partially-approved" => Some(Self::PartiallyApproved),
            "rejected" => Some(Self::Rejected),
            "delivered" => Some(Self::Delivered),
            "refetched" => Some(Self::Refetched),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::PartiallyApproved => "partially-approved",
            Self::Rejected => "rejected",
            Self::Delivered => "delivered",
            Self::Refetched => "refetched",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, minicbor::Encode,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[n(0)]
    Low,
    #[default]
    #[n(1)]
    Medium,
    #[n(2)]
    High,
    #[n(3)]
    Urgent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    #[default]
    NotStarted,
    InTransit,
    Delivered,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, minicbor::Encode)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[n(0)]
    pub name: String,
    #[n(1)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[n(2)]
    #[serde(default)]
    pub estimated_cost: f64,
    #[n(3)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[n(4)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[n(5)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_cost: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, minicbor::Encode)]
#[serde(rename_all = "camelCase")]
pub struct Manpower {
    #[n(0)]
    pub workers: u32,
    #[n(1)]
    pub days: u32,
    #[n(2)]
    #[serde(default)]
    pub skill_level: String,
    #[n(3)]
    #[serde(default)]
    pub total_cost: f64,
    #[n(4)]
    #[serde(default)]
    pub approved: bool,
    #[n(5)]
    #[serde(default)]
    pub approved_cost: f64,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeStamp(DateTime<Utc>);

impl From<DateTime<Utc>> for TimeStamp {
    fn from(value: DateTime<Utc>) -> Self {
        TimeStamp(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefetchRecord {
    pub refetched_amount: f64,
    pub refetched_at: TimeStamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequest {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub grievance_id: Option<String>,
    #[serde(default)]
    pub request_type: Option<String>,
    // kept raw: unknown values must still reach the classifier
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub justification: Option<String>,
    #[serde(default)]
    pub materials: Vec<LineItem>,
    #[serde(default)]
    pub equipment: Vec<LineItem>,
    #[serde(default)]
    pub manpower: Option<Manpower>,
    #[serde(default)]
    pub allocated_amount: Option<f64>,
    #[serde(default)]
    pub used_amount: f64,
    #[serde(default)]
    pub remaining_amount: f64,
    #[serde(default)]
    pub total_refetched: f64,
    #[serde(default)]
    pub refetch_history: Vec<RefetchRecord>,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub admin_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<TimeStamp>,
}

/// Allocated / used / remaining / refetched figures of one request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestLedger {
    pub allocated: f64,
    pub used: f64,
    pub remaining: f64,
    pub refetched: f64,
}

impl ResourceRequest {
    pub fn typed_status(&self) -> Option<RequestStatus> {
        self.status.as_deref().and_then(RequestStatus::parse)
    }

    /// `None` until an allocation has been approved.
    pub fn ledger(&self) -> Option<RequestLedger> {
        self.allocated_amount.map(|allocated| RequestLedger {
            allocated,
            used: self.used_amount,
            remaining: self.remaining_amount,
            refetched: self.total_refetched,
        })
    }

    /// used + remaining + refetched == allocated, and nothing negative.
    /// Requests without an allocation are trivially consistent.
    pub fn ledger_is_consistent(&self) -> bool {
        match self.ledger() {
            None => true,
            Some(l) => {
                l.allocated >= 0.0
                    && l.used >= 0.0
                    && l.remaining >= 0.0
                    && l.refetched >= 0.0
                    && to_paise(l.used) + to_paise(l.remaining) + to_paise(l.refetched)
                        == to_paise(l.allocated)
            }
        }
    }

    /// Sum of refetch history entries; matches `total_refetched` on a consistent record.
    pub fn refetched_from_history(&self) -> f64 {
        self.refetch_history.iter().map(|r| r.refetched_amount).sum()
    }

    /// Sum of estimated costs across materials, equipment and manpower.
    pub fn estimated_total(&self) -> f64 {
        self.materials
            .iter()
            .chain(self.equipment.iter())
            .map(|item| item.estimated_cost)
            .sum::<f64>()
            + self.manpower.as_ref().map_or(0.0, |m| m.total_cost)
    }
}
