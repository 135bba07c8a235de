use std::fmt;

use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ────────────────────────────────────────────────────────────────────────────
// Lead input (validated at the HTTP boundary, immutable afterwards)
// ────────────────────────────────────────────────────────────────────────────

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 1000;

/// Channel the lead arrived through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    #[default]
    WebForm,
    Email,
    Phone,
    Referral,
    Other,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::WebForm => "web_form",
            LeadSource::Email => "email",
            LeadSource::Phone => "phone",
            LeadSource::Referral => "referral",
            LeadSource::Other => "other",
        }
    }
}

impl fmt::Display for LeadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prospective customer's self-reported contact and message data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadInput {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    pub message: String,
    #[serde(default)]
    pub source: LeadSource,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LeadValidationError {
    #[error("name must be between {} and {} characters", NAME_MIN_CHARS, NAME_MAX_CHARS)]
    NameLength,
    #[error("message must be between {} and {} characters", MESSAGE_MIN_CHARS, MESSAGE_MAX_CHARS)]
    MessageLength,
    #[error("'{0}' is not a valid email address")]
    Email(String),
    #[error("'{0}' is not a valid http(s) URL")]
    Website(String),
}

impl LeadInput {
    /// Boundary checks. The qualification core assumes these hold.
    pub fn validate(&self) -> Result<(), LeadValidationError> {
        if !within_bounds(&self.name, NAME_MIN_CHARS, NAME_MAX_CHARS) {
            return Err(LeadValidationError::NameLength);
        }

        if !within_bounds(&self.message, MESSAGE_MIN_CHARS, MESSAGE_MAX_CHARS) {
            return Err(LeadValidationError::MessageLength);
        }

        if !is_valid_email(&self.email) {
            return Err(LeadValidationError::Email(self.email.clone()));
        }

        if let Some(website) = self.website.as_deref() {
            let valid = Url::parse(website)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
                .unwrap_or(false);
            if !valid {
                return Err(LeadValidationError::Website(website.to_string()));
            }
        }

        Ok(())
    }
}

/// The minimum counts non-whitespace content; the maximum counts the raw text.
fn within_bounds(text: &str, min: usize, max: usize) -> bool {
    text.trim().chars().count() >= min && text.chars().count() <= max
}

/// Syntactic check only: `local@domain.tld`, no whitespace, single `@`.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis (always fully constructible; every field has a safe default)
// ────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_RECOMMENDED_ACTION: &str = "Follow up within 24 hours";

/// Urgency extracted from the lead's language. Values outside the requested
/// domain are kept verbatim so they can be stored and audited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UrgencyLevel {
    High,
    #[default]
    Medium,
    Low,
    Unrecognized(String),
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &str {
        match self {
            UrgencyLevel::High => "high",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::Low => "low",
            UrgencyLevel::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for UrgencyLevel {
    fn from(raw: &str) -> Self {
        match raw {
            "high" => UrgencyLevel::High,
            "medium" => UrgencyLevel::Medium,
            "low" => UrgencyLevel::Low,
            other => UrgencyLevel::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for UrgencyLevel {
    fn from(raw: String) -> Self {
        UrgencyLevel::from(raw.as_str())
    }
}

impl From<UrgencyLevel> for String {
    fn from(level: UrgencyLevel) -> Self {
        level.as_str().to_string()
    }
}

/// How close the lead is to a purchase decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuyingIntent {
    ReadyToBuy,
    Evaluating,
    #[default]
    Exploring,
    JustBrowsing,
    Unrecognized(String),
}

impl BuyingIntent {
    pub fn as_str(&self) -> &str {
        match self {
            BuyingIntent::ReadyToBuy => "ready_to_buy",
            BuyingIntent::Evaluating => "evaluating",
            BuyingIntent::Exploring => "exploring",
            BuyingIntent::JustBrowsing => "just_browsing",
            BuyingIntent::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for BuyingIntent {
    fn from(raw: &str) -> Self {
        match raw {
            "ready_to_buy" => BuyingIntent::ReadyToBuy,
            "evaluating" => BuyingIntent::Evaluating,
            "exploring" => BuyingIntent::Exploring,
            "just_browsing" => BuyingIntent::JustBrowsing,
            other => BuyingIntent::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for BuyingIntent {
    fn from(raw: String) -> Self {
        BuyingIntent::from(raw.as_str())
    }
}

impl From<BuyingIntent> for String {
    fn from(intent: BuyingIntent) -> Self {
        intent.as_str().to_string()
    }
}

/// Structured, sales-relevant extraction from a lead's free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub industry: Option<String>,
    pub company_size: Option<String>,
    pub budget_signals: Vec<String>,
    pub pain_points: Vec<String>,
    pub urgency_level: UrgencyLevel,
    pub buying_intent: BuyingIntent,
    pub recommended_action: String,
}

impl Analysis {
    /// All fields at their type defaults except the recommended action.
    pub fn with_action(recommended_action: impl Into<String>) -> Self {
        Self {
            industry: None,
            company_size: None,
            budget_signals: Vec::new(),
            pain_points: Vec::new(),
            urgency_level: UrgencyLevel::default(),
            buying_intent: BuyingIntent::default(),
            recommended_action: recommended_action.into(),
        }
    }
}

impl Default for Analysis {
    fn default() -> Self {
        Self::with_action(DEFAULT_RECOMMENDED_ACTION)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Priority + thresholds
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Hot,
    Warm,
    Cold,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Hot => "hot",
            Priority::Warm => "warm",
            Priority::Cold => "cold",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("score thresholds must be finite numbers")]
    NotFinite,
    #[error("high threshold ({high}) must be greater than medium threshold ({medium})")]
    Inverted { high: f64, medium: f64 },
}

/// Score cutoffs for hot / warm. Invariant: `high > medium`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    high: f64,
    medium: f64,
}

impl Thresholds {
    pub fn new(high: f64, medium: f64) -> Result<Self, ThresholdError> {
        if !high.is_finite() || !medium.is_finite() {
            return Err(ThresholdError::NotFinite);
        }
        if high <= medium {
            return Err(ThresholdError::Inverted { high, medium });
        }
        Ok(Self { high, medium })
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn medium(&self) -> f64 {
        self.medium
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: 80.0,
            medium: 60.0,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Qualification result
// ────────────────────────────────────────────────────────────────────────────

/// Which path produced a result. Keeps content-quality failures and
/// backend outages distinguishable downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisSource {
    Model,
    MalformedResponse,
    BackendUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualificationResult {
    /// Clamped to [0, 100].
    pub score: f64,
    pub priority: Priority,
    pub analysis: Analysis,
    pub analysis_source: AnalysisSource,
}

/// Lead plus its qualification, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct QualifiedLead {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub message: String,
    pub source: LeadSource,
    pub score: f64,
    pub priority: Priority,
    pub analysis: Analysis,
    pub analysis_source: AnalysisSource,
    pub created_at: DateTime<Utc>,
    pub assigned_to: Option<String>,
    pub status: String,
}

impl QualifiedLead {
    pub fn new(lead: LeadInput, result: QualificationResult) -> Self {
        Self {
            name: lead.name,
            email: lead.email,
            phone: lead.phone,
            company: lead.company,
            website: lead.website,
            message: lead.message,
            source: lead.source,
            score: result.score,
            priority: result.priority,
            analysis: result.analysis,
            analysis_source: result.analysis_source,
            created_at: Utc::now(),
            assigned_to: None,
            status: "new".to_string(),
        }
    }
}
