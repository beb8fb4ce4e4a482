//! # Error types
//!
//! Two layers of errors are used in the crate:
//! - `PlumbError`: everything that can go wrong with a single chemical, dispense or reaction.
//!   These errors are collected per reaction (wrapped in `ReactionIssue`) and never abort a batch.
//! - `PipelineError`: structural failures that stop the whole run (no input at all, empty
//!   chemical catalog, I/O and (de)serialization failures).
use std::fmt;
use thiserror::Error;

/// errors attached to a chemical, a dispense or a reaction
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlumbError {
    #[error("unresolved chemical '{reference}': {reason}")]
    UnresolvedChemical { reference: String, reason: String },
    #[error("chemical {inchikey} is dispensed neat but has no {constant}")]
    MissingPhysicalConstant {
        inchikey: String,
        constant: &'static str,
    },
    #[error("invalid amount {amount} of {inchikey}: {reason}")]
    InvalidAmount {
        inchikey: String,
        amount: f64,
        reason: String,
    },
    #[error("{vial} vial has non-positive volume {volume} L")]
    ZeroVolume { vial: String, volume: f64 },
    #[error("reaction {reaction_id} has no stable chemical system: {reason}")]
    InconsistentChemicalSystem { reaction_id: String, reason: String },
    #[error("molarity of {inchikey} is {molarity:.4} M, above its pure-form ceiling {ceiling:.4} M")]
    MolarityCeilingViolation {
        inchikey: String,
        molarity: f64,
        ceiling: f64,
    },
    #[error("reaction {reaction_id}: invalid {parameter}: {reason}")]
    InvalidReactionParameter {
        reaction_id: String,
        parameter: &'static str,
        reason: String,
    },
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("unknown vial: {0}")]
    UnknownVial(String),
    #[error("unknown amount unit: {0}")]
    UnknownUnit(String),
    #[error("chemical {0} is listed twice in the inventory")]
    DuplicateChemical(String),
}

/// how bad an issue is: errors drop the reaction from the export, warnings only report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// a `PlumbError` with enough context to be acted upon without re-running the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionIssue {
    pub reaction_id: String,
    pub dispense_index: Option<usize>,
    pub chemical: Option<String>,
    pub severity: Severity,
    pub error: PlumbError,
}

impl ReactionIssue {
    pub fn error(reaction_id: &str, error: PlumbError) -> Self {
        Self {
            reaction_id: reaction_id.to_string(),
            dispense_index: None,
            chemical: None,
            severity: Severity::Error,
            error,
        }
    }

    pub fn warning(reaction_id: &str, error: PlumbError) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(reaction_id, error)
        }
    }

    pub fn at_dispense(mut self, dispense_index: usize) -> Self {
        self.dispense_index = Some(dispense_index);
        self
    }

    pub fn with_chemical(mut self, chemical: &str) -> Self {
        self.chemical = Some(chemical.to_string());
        self
    }

    /// true when the reaction must be skipped because of this issue
    pub fn is_skip_reason(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ReactionIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] reaction {}", self.severity.as_str(), self.reaction_id)?;
        if let Some(index) = self.dispense_index {
            write!(f, ", dispense {}", index)?;
        }
        if let Some(chemical) = &self.chemical {
            write!(f, ", chemical {}", chemical)?;
        }
        write!(f, ": {}", self.error)
    }
}

/// errors fatal to the whole run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input batch contains no records")]
    EmptyBatch,
    #[error("chemical catalog is empty, nothing can be resolved")]
    EmptyCatalog,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Plumb(#[from] PlumbError),
}
