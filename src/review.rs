//! Admin decisions on resource requests: approve, reject, refetch
use crate::error::ValidationError;
use crate::request::{RequestStatus, ResourceRequest};
use crate::utils::to_paise;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDecision {
    pub approved: bool,
    pub approved_cost: f64,
}

/// Payload of `PUT /resource-request/:id/approve`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDecision {
    pub materials: Vec<ItemDecision>,
    pub equipment: Vec<ItemDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manpower: Option<ItemDecision>,
    pub admin_message: String,
}

impl ApprovalDecision {
    /// Every item approved at its estimated cost; the admin edits from there.
    pub fn approve_all(request: &ResourceRequest) -> Self {
        let approve = |cost: f64| ItemDecision {
            approved: true,
            approved_cost: cost,
        };
        Self {
            materials: request
                .materials
                .iter()
                .map(|m| approve(m.estimated_cost))
                .collect(),
            equipment: request
                .equipment
                .iter()
                .map(|e| approve(e.estimated_cost))
                .collect(),
            manpower: request.manpower.as_ref().map(|m| approve(m.total_cost)),
            admin_message: String::new(),
        }
    }

    fn items(&self) -> impl Iterator<Item = &ItemDecision> {
        self.materials
            .iter()
            .chain(self.equipment.iter())
            .chain(self.manpower.iter())
    }

    /// Sum of approved costs; this becomes the request's allocation.
    pub fn allocated_amount(&self) -> f64 {
        self.items()
            .filter(|d| d.approved)
            .map(|d| d.approved_cost)
            .sum()
    }

    pub fn resulting_status(&self) -> RequestStatus {
        if self.items().all(|d| d.approved) {
            RequestStatus::Approved
        } else {
            RequestStatus::PartiallyApproved
        }
    }

    pub fn validate(&self, request: &ResourceRequest) -> Result<(), ValidationError> {
        let names = request
            .materials
            .iter()
            .chain(request.equipment.iter())
            .map(|i| i.name.as_str())
            .chain(request.manpower.iter().map(|_| "Manpower"));

        for (decision, name) in self.items().zip(names) {
            if decision.approved && !(decision.approved_cost.is_finite() && decision.approved_cost >= 0.0) {
                return Err(ValidationError::InvalidApprovedCost(name.to_string()));
            }
        }
        if !self.items().any(|d| d.approved) {
            return Err(ValidationError::NothingApproved);
        }
        if self.allocated_amount() <= 0.0 {
            return Err(ValidationError::EmptyAllocation);
        }
        Ok(())
    }
}

/// Approval payload as sent, with the derived allocation and status.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalBody {
    #[serde(flatten)]
    pub decision: ApprovalDecision,
    pub allocated_amount: f64,
    pub status: RequestStatus,
}

impl ApprovalBody {
    pub fn new(decision: ApprovalDecision, request: &ResourceRequest) -> Result<Self, ValidationError> {
        decision.validate(request)?;
        Ok(Self {
            allocated_amount: decision.allocated_amount(),
            status: decision.resulting_status(),
            decision,
        })
    }
}

/// Payload of `PUT /resource-request/:id/reject`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub rejection_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_message: Option<String>,
}

impl Rejection {
    pub fn new(reason: &str, admin_message: Option<&str>) -> Result<Self, ValidationError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::MissingRejectionReason);
        }
        Ok(Self {
            rejection_reason: reason.to_string(),
            admin_message: admin_message
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from),
        })
    }
}

/// Payload of `POST /resource-request/:id/refetch`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefetchOrder {
    pub refetch_amount: f64,
    pub admin_message: String,
    pub reason: String,
}

impl RefetchOrder {
    /// Checks the amount against the request's current remaining balance.
    pub fn new(
        request: &ResourceRequest,
        amount: f64,
        admin_message: &str,
        reason: &str,
    ) -> Result<Self, ValidationError> {
        if !amount.is_finite() || to_paise(amount) <= 0 {
            return Err(ValidationError::InvalidRefetchAmount);
        }
        if to_paise(amount) > to_paise(request.remaining_amount) {
            return Err(ValidationError::RefetchExceedsRemaining {
                requested: amount,
                remaining: request.remaining_amount,
            });
        }
        Ok(Self {
            refetch_amount: amount,
            admin_message: admin_message.trim().to_string(),
            reason: reason.trim().to_string(),
        })
    }
}
