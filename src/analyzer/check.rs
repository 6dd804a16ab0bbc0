//! The `Check` trait and the vocabulary shared by checks and findings

use crate::storage::Page;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Error raised by a check that could not evaluate a page
#[derive(Debug, Error)]
#[error("check {code} failed: {message}")]
pub struct CheckError {
    pub code: String,
    pub message: String,
}

impl CheckError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// Scoring category a check belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Technical,
    OnPage,
    Local,
}

impl Category {
    /// All categories in scoring order
    pub fn all() -> [Self; 3] {
        [Self::Technical, Self::OnPage, Self::Local]
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::OnPage => "onpage",
            Self::Local => "local",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "technical" => Some(Self::Technical),
            "onpage" => Some(Self::OnPage),
            "local" => Some(Self::Local),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}

/// How serious a finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Weight applied to a finding's impact when scoring
    pub fn weight(&self) -> f64 {
        match self {
            Self::Critical => 10.0,
            Self::High => 7.0,
            Self::Medium => 4.0,
            Self::Low => 1.0,
        }
    }

    /// Ordering rank, critical highest
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}

/// Rough amount of work needed to fix a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Small,
    Medium,
    Large,
}

impl Effort {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            _ => None,
        }
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}

/// A finding as emitted by a check, before it is tied to a run and stored
#[derive(Debug, Clone, PartialEq)]
pub struct FindingDraft {
    pub check_key: String,
    pub category: Category,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub evidence: Map<String, Value>,
    pub impact_score: f64,
    pub effort: Effort,
}

impl FindingDraft {
    /// Replaces the check's default description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One SEO rule evaluated against a single page
///
/// Implementations are registered in order by
/// [`default_checks`](crate::analyzer::default_checks); the analyzer only
/// talks to this trait, so adding a check never touches the analyzer.
pub trait Check: Send + Sync {
    /// Stable identifier, e.g. `onpage.title_tag`
    fn code(&self) -> &'static str;

    fn category(&self) -> Category;

    /// Severity of the findings this check emits
    fn severity(&self) -> Severity;

    fn title(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn recommendation(&self) -> &'static str;

    fn effort(&self) -> Effort;

    /// Baseline impact of a finding, 0-10
    fn impact_score(&self) -> f64;

    /// Whether the check has anything to say about this page
    ///
    /// Most checks only look at HTML documents.
    fn is_applicable(&self, page: &Page) -> bool {
        page.is_html()
    }

    /// Evaluates the page, returning a finding when the rule is violated
    fn run(&self, page: &Page) -> Result<Option<FindingDraft>, CheckError>;

    /// Builds a finding from this check's defaults and the given evidence
    fn finding(&self, evidence: Map<String, Value>) -> FindingDraft {
        FindingDraft {
            check_key: self.code().to_string(),
            category: self.category(),
            severity: self.severity(),
            title: self.title().to_string(),
            description: self.description().to_string(),
            recommendation: self.recommendation().to_string(),
            evidence,
            impact_score: self.impact_score(),
            effort: self.effort(),
        }
    }
}
