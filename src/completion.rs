//! Task completion form
use crate::error::ValidationError;
use crate::ledger::{BudgetState, ExpenseLedger};
use crate::utils::to_paise;
use serde::Serialize;

/// Where the after-task photo is in its upload lifecycle. Only an uploaded
/// photo, represented by its hosted URL, can be submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AfterImage {
    #[default]
    Missing,
    Selected { file_name: String },
    Uploaded { url: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseLine {
    pub description: String,
    pub amount: f64,
}

/// Payload of `PUT /grievances/:id/complete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionBody {
    pub after_image: String,
    pub days_to_complete: u32,
    pub expenses: Vec<ExpenseLine>,
    pub total_expense: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCompletionDraft {
    pub after_image: AfterImage,
    pub days_to_complete: String,
    pub notes: String,
    pub ledger: ExpenseLedger,
}

impl TaskCompletionDraft {
    pub fn new(allocated_budget: f64) -> Self {
        Self {
            ledger: ExpenseLedger::new(allocated_budget),
            ..Default::default()
        }
    }

    pub fn select_image(&mut self, file_name: &str) {
        self.after_image = AfterImage::Selected {
            file_name: file_name.to_string(),
        };
    }

    pub fn image_uploaded(&mut self, url: String) {
        self.after_image = AfterImage::Uploaded { url };
    }

    pub fn validate_and_finalise(&self) -> Result<CompletionBody, ValidationError> {
        // an unallocated task can never be completed, whatever else is filled in
        let summary = match self.ledger.summary() {
            BudgetState::Unallocated => return Err(ValidationError::NoBudgetAllocated),
            BudgetState::Allocated(summary) => summary,
        };

        let url = match &self.after_image {
            AfterImage::Uploaded { url } if !url.trim().is_empty() => url.clone(),
            _ => return Err(ValidationError::AfterImageNotUploaded),
        };

        let days_to_complete = self
            .days_to_complete
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|d| *d > 0)
            .ok_or(ValidationError::InvalidDaysToComplete)?;

        let expenses: Vec<ExpenseLine> = self
            .ledger
            .entries()
            .iter()
            .filter(|e| e.is_complete())
            .map(|e| ExpenseLine {
                description: e.description.trim().to_string(),
                amount: e.value(),
            })
            .collect();
        if expenses.is_empty() {
            return Err(ValidationError::NoCompleteExpense);
        }

        if summary.is_over_budget {
            return Err(ValidationError::ExceedsBudget {
                total: summary.total_used,
                allocated: summary.allocated,
            });
        }

        Ok(CompletionBody {
            after_image: url,
            days_to_complete,
            total_expense: expenses.iter().map(|e| to_paise(e.amount)).sum::<i64>() as f64 / 100.0,
            expenses,
            notes: Some(self.notes.trim().to_string()).filter(|n| !n.is_empty()),
        })
    }
}
