use crate::utils::format_inr;

/// Fallback shown when the backend gives no usable message.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Select the grievance these resources are for")]
    MissingGrievance,
    #[error("Add at least one resource with a name")]
    NoNamedResource,
    #[error("Give a reason for '{0}'")]
    MissingReason(String),
    #[error("Requested fund amount must be a positive number")]
    InvalidFundAmount,
    #[error("Describe what the resources are needed for")]
    MissingDescription,
    #[error("Approve at least one item")]
    NothingApproved,
    #[error("Approved cost for '{0}' must be zero or more")]
    InvalidApprovedCost(String),
    #[error("Approved allocation must be greater than zero")]
    EmptyAllocation,
    #[error("A rejection reason is required")]
    MissingRejectionReason,
    #[error("Refetch amount must be a positive number")]
    InvalidRefetchAmount,
    #[error("Refetch amount exceeds the remaining {}", format_inr(.remaining))]
    RefetchExceedsRemaining { requested: f64, remaining: f64 },
    #[error("Amount must be zero or more")]
    NegativeAmount,
    #[error("Total expenses {} would exceed the allocated budget of {}", format_inr(.total), format_inr(.allocated))]
    ExceedsBudget { total: f64, allocated: f64 },
    #[error("No budget has been allocated to this task yet")]
    NoBudgetAllocated,
    #[error("Upload the after-task photo before submitting")]
    AfterImageNotUploaded,
    #[error("Days to complete must be a whole number greater than zero")]
    InvalidDaysToComplete,
    #[error("Add at least one expense with a description and amount")]
    NoCompleteExpense,
    #[error("No expense entry with id {0}")]
    UnknownEntry(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("Not signed in")]
    Unauthenticated,
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Server responded {status}: {}", message.as_deref().unwrap_or(GENERIC_FAILURE))]
    Server { status: u16, message: Option<String> },
    #[error("Request was not accepted: {}", message.as_deref().unwrap_or(GENERIC_FAILURE))]
    Rejected { message: Option<String> },
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response carried no data")]
    MissingData,
    #[error("Invalid API URL {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Message suitable for a transient notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthenticated => "Please sign in again".into(),
            ApiError::Server {
                message: Some(m), ..
            }
            | ApiError::Rejected { message: Some(m) }
                if !m.trim().is_empty() =>
            {
                m.clone()
            }
            _ => GENERIC_FAILURE.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("'{0}' is already in progress")]
    InFlight(String),
    #[error("{0:#}")]
    Internal(anyhow::Error),
}
