//! Expense ledger for a task's allocated budget
//!
//! The ledger holds the engineer's draft expense entries against the allocation
//! fetched for the task. Derived figures are computed on every read, so any edit
//! to the entries or the allocation is reflected immediately.
use crate::error::ValidationError;
use crate::utils::{new_uuid_to_bech32, parse_amount, to_paise};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseEntry {
    pub id: String,
    pub description: String,
    // raw text as typed; see `value`
    pub amount: String,
}

impl ExpenseEntry {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            id: new_uuid_to_bech32("expense_")?,
            description: String::new(),
            amount: String::new(),
        })
    }

    /// Numeric amount to the paisa; blank or non-numeric text counts as zero.
    pub fn value(&self) -> f64 {
        self.paise() as f64 / 100.0
    }

    pub fn paise(&self) -> i64 {
        to_paise(parse_amount(&self.amount))
    }

    /// Has both a description and a positive amount.
    pub fn is_complete(&self) -> bool {
        !self.description.trim().is_empty() && self.value() > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerSummary {
    pub allocated: f64,
    pub total_used: f64,
    pub remaining: f64,
    pub is_over_budget: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BudgetState {
    /// Nothing allocated yet; completion is blocked.
    Unallocated,
    Allocated(LedgerSummary),
}

impl BudgetState {
    pub fn blocks_completion(&self) -> bool {
        match self {
            BudgetState::Unallocated => true,
            BudgetState::Allocated(summary) => summary.is_over_budget,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseLedger {
    allocated_budget: f64,
    entries: Vec<ExpenseEntry>,
}

impl ExpenseLedger {
    pub fn new(allocated_budget: f64) -> Self {
        Self {
            allocated_budget: sanitise(allocated_budget),
            entries: Vec::new(),
        }
    }

    pub fn allocated_budget(&self) -> f64 {
        self.allocated_budget
    }

    pub fn set_allocated_budget(&mut self, allocated_budget: f64) {
        self.allocated_budget = sanitise(allocated_budget);
    }

    pub fn entries(&self) -> &[ExpenseEntry] {
        &self.entries
    }

    pub fn total_used(&self) -> f64 {
        self.used_paise() as f64 / 100.0
    }

    fn used_paise(&self) -> i64 {
        self.entries.iter().map(ExpenseEntry::paise).sum()
    }

    pub fn summary(&self) -> BudgetState {
        let allocated = to_paise(self.allocated_budget);
        if allocated == 0 {
            return BudgetState::Unallocated;
        }
        let used = self.used_paise();

        BudgetState::Allocated(LedgerSummary {
            allocated: self.allocated_budget,
            total_used: used as f64 / 100.0,
            remaining: (allocated - used) as f64 / 100.0,
            is_over_budget: used > allocated,
        })
    }

    /// Appends an empty entry and returns its id.
    pub fn add_entry(&mut self) -> anyhow::Result<String> {
        let entry = ExpenseEntry::new()?;
        let id = entry.id.clone();
        self.entries.push(entry);
        Ok(id)
    }

    pub fn remove_entry(&mut self, id: &str) -> Result<ExpenseEntry, ValidationError> {
        let index = self.position(id)?;
        Ok(self.entries.remove(index))
    }

    pub fn set_description(&mut self, id: &str, description: &str) -> Result<(), ValidationError> {
        let index = self.position(id)?;
        self.entries[index].description = description.to_string();
        Ok(())
    }

    /// Applies an amount edit unless it raises the entry and takes the running
    /// total past the allocation. Lowering an entry is always allowed, so an
    /// over-budget ledger can be corrected step by step. A refused edit leaves
    /// the entry exactly as it was.
    pub fn set_amount(&mut self, id: &str, raw: &str) -> Result<(), ValidationError> {
        let index = self.position(id)?;
        let value = parse_amount(raw);
        if value < 0.0 {
            return Err(ValidationError::NegativeAmount);
        }

        // the guard only bites once there is an allocation to protect
        let allocated = to_paise(self.allocated_budget);
        if allocated > 0 {
            let old = self.entries[index].paise();
            let new = to_paise(value);
            let total = self.used_paise() - old + new;
            if new > old && total > allocated {
                return Err(ValidationError::ExceedsBudget {
                    total: total as f64 / 100.0,
                    allocated: self.allocated_budget,
                });
            }
        }

        self.entries[index].amount = raw.trim().to_string();
        Ok(())
    }

    /// Drops all entries, e.g. after submit or cancel.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, id: &str) -> Result<usize, ValidationError> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| ValidationError::UnknownEntry(id.to_string()))
    }
}

// anything below one paisa is no allocation at all
fn sanitise(amount: f64) -> f64 {
    if amount.is_finite() && to_paise(amount) > 0 {
        amount
    } else {
        0.0
    }
}
