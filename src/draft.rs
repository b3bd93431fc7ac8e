//! Resource request drafts and their submission checks
use crate::error::ValidationError;
use crate::request::{LineItem, Manpower, Priority};
use crate::utils::new_uuid_to_bech32;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Material,
    Equipment,
}

/// One row of the request form. Rows left without a name are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLine {
    pub id: String,
    pub kind: ResourceKind,
    pub name: String,
    pub quantity: Option<u32>,
    pub estimated_cost: f64,
    pub reason: String,
}

impl ResourceLine {
    pub fn new(kind: ResourceKind) -> anyhow::Result<Self> {
        Ok(Self {
            id: new_uuid_to_bech32("line_")?,
            kind,
            name: String::new(),
            quantity: None,
            estimated_cost: 0.0,
            reason: String::new(),
        })
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reason = reason.to_string();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_estimated_cost(mut self, cost: f64) -> Self {
        self.estimated_cost = cost;
        self
    }

    fn is_named(&self) -> bool {
        !self.name.trim().is_empty()
    }

    fn to_line_item(&self) -> LineItem {
        LineItem {
            name: self.name.trim().to_string(),
            quantity: self.quantity,
            estimated_cost: if self.estimated_cost.is_finite() {
                self.estimated_cost.max(0.0)
            } else {
                0.0
            },
            reason: Some(self.reason.trim().to_string()),
            approved: None,
            approved_cost: None,
        }
    }
}

/// Payload of `POST /resource-request/create`.
#[derive(Debug, Clone, PartialEq, Serialize, minicbor::Encode)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    #[n(0)]
    pub grievance_id: String,
    #[n(1)]
    pub request_type: String,
    #[n(2)]
    pub priority: Priority,
    #[n(3)]
    pub justification: String,
    #[n(4)]
    pub materials: Vec<LineItem>,
    #[n(5)]
    pub equipment: Vec<LineItem>,
    #[n(6)]
    pub manpower: Option<Manpower>,
    #[n(7)]
    pub requested_amount: f64,
}

// Also used by both request entry points (grievance detail and task list)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRequestDraft {
    grievance_id: Option<String>,
    priority: Priority,
    description: String,
    fund_amount: String,
    lines: Vec<ResourceLine>,
    manpower: Option<Manpower>,
}

impl ResourceRequestDraft {
    /// Construct a new builder object, this becomes the basis for a draft
    pub fn new() -> Self {
        Self::default()
    }
    pub fn for_grievance(mut self, grievance_id: &str) -> Self {
        self.grievance_id = Some(grievance_id.to_string());
        self
    }
    pub fn set_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
    pub fn set_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
    /// Raw text of the fund amount field.
    pub fn set_fund_amount(mut self, amount: &str) -> Self {
        self.fund_amount = amount.to_string();
        self
    }
    pub fn add_line(mut self, line: ResourceLine) -> Self {
        self.lines.push(line);
        self
    }
    pub fn set_manpower(mut self, workers: u32, days: u32, skill_level: &str, total_cost: f64) -> Self {
        self.manpower = Some(Manpower {
            workers,
            days,
            skill_level: skill_level.to_string(),
            total_cost,
            approved: false,
            approved_cost: 0.0,
        });
        self
    }
    pub fn remove_line(&mut self, id: &str) -> Option<ResourceLine> {
        let index = self.lines.iter().position(|l| l.id == id)?;
        Some(self.lines.remove(index))
    }
    pub fn lines(&self) -> &[ResourceLine] {
        &self.lines
    }

    /// Parsed fund amount, if the field holds a positive finite number.
    pub fn fund_amount(&self) -> Option<f64> {
        self.fund_amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self
            .grievance_id
            .as_deref()
            .is_none_or(|g| g.trim().is_empty())
        {
            return Err(ValidationError::MissingGrievance);
        }

        let mut named = self.lines.iter().filter(|l| l.is_named()).peekable();
        if named.peek().is_none() {
            return Err(ValidationError::NoNamedResource);
        }
        if let Some(line) = named.find(|l| l.reason.trim().is_empty()) {
            return Err(ValidationError::MissingReason(line.name.trim().to_string()));
        }

        if self.fund_amount().is_none() {
            return Err(ValidationError::InvalidFundAmount);
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingDescription);
        }
        Ok(())
    }

    // Runs the checks then returns a hash of the payload and the payload itself.
    // The hash is taken over the cbor encoding so identical drafts share it.
    pub fn validate_and_finalise(&self) -> anyhow::Result<(String, CreateRequestBody)> {
        self.validate()?;

        let pick = |kind: ResourceKind| -> Vec<LineItem> {
            self.lines
                .iter()
                .filter(|l| l.kind == kind && l.is_named())
                .map(ResourceLine::to_line_item)
                .collect()
        };
        let materials = pick(ResourceKind::Material);
        let equipment = pick(ResourceKind::Equipment);

        let request_type = match (materials.is_empty(), equipment.is_empty(), self.manpower.is_some()) {
            (false, true, false) => "materials",
            (true, false, false) => "equipment",
            _ => "mixed",
        };

        let body = CreateRequestBody {
            grievance_id: self.grievance_id.clone().unwrap_or_default().trim().to_string(),
            request_type: request_type.to_string(),
            priority: self.priority,
            justification: self.description.trim().to_string(),
            materials,
            equipment,
            manpower: self.manpower.clone(),
            requested_amount: self.fund_amount().unwrap_or_default(),
        };

        let contents = minicbor::to_vec(&body)?;
        let hash = sha256::digest(&contents);

        Ok((hash, body))
    }
}
