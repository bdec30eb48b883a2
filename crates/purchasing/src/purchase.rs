use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use packerp_core::{DomainError, DomainResult};

use crate::line::{LineError, PurchaseLine, ValidationOptions};

/// Purchase document lifecycle.
///
/// Mirrored from the host framework only as far as the package fields need
/// it: they stay editable in `Draft` and freeze afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseState {
    Draft,
    Confirmed,
    Done,
}

/// Purchase document owning the lines under edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    state: PurchaseState,
    purchase_date: Option<NaiveDate>,
    lines: Vec<PurchaseLine>,
}

impl Purchase {
    pub fn new(purchase_date: Option<NaiveDate>) -> Self {
        Self {
            state: PurchaseState::Draft,
            purchase_date,
            lines: Vec::new(),
        }
    }

    pub fn state(&self) -> PurchaseState {
        self.state
    }

    pub fn purchase_date(&self) -> Option<NaiveDate> {
        self.purchase_date
    }

    pub fn lines(&self) -> &[PurchaseLine] {
        &self.lines
    }

    pub fn lines_mut(&mut self) -> &mut Vec<PurchaseLine> {
        &mut self.lines
    }

    /// Start a blank line carrying the document date, so delivery-date
    /// scheduling has its anchor from the first edit on.
    pub fn new_line(&self) -> PurchaseLine {
        PurchaseLine {
            purchase_date: self.purchase_date,
            ..PurchaseLine::default()
        }
    }

    pub fn add_line(&mut self, line: PurchaseLine) {
        self.lines.push(line);
    }

    /// Validate every line before the host persists the document. The first
    /// failing line aborts.
    pub fn pre_validate(&self, opts: ValidationOptions) -> Result<(), LineError> {
        for line in &self.lines {
            line.pre_validate(opts)?;
        }
        Ok(())
    }

    pub fn confirm(&mut self) -> DomainResult<()> {
        if self.state != PurchaseState::Draft {
            return Err(DomainError::invariant(
                "only draft purchases can be confirmed",
            ));
        }
        self.state = PurchaseState::Confirmed;
        Ok(())
    }

    pub fn mark_done(&mut self) -> DomainResult<()> {
        if self.state != PurchaseState::Confirmed {
            return Err(DomainError::invariant(
                "only confirmed purchases can be marked done",
            ));
        }
        self.state = PurchaseState::Done;
        Ok(())
    }
}
