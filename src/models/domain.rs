use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// What the consumer wants help with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Property,
    Financial,
    Retirement,
    Tax,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Property => "property",
            Goal::Financial => "financial",
            Goal::Retirement => "retirement",
            Goal::Tax => "tax",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Urgent,
    Soon,
    Flexible,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Urgent => "urgent",
            Urgency::Soon => "soon",
            Urgency::Flexible => "flexible",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    Single,
    Couple,
    Family,
    Retiree,
    Business,
}

impl Situation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Situation::Single => "single",
            Situation::Couple => "couple",
            Situation::Family => "family",
            Situation::Retiree => "retiree",
            Situation::Business => "business",
        }
    }
}

/// A consumer's stated intent, built once per search request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerIntent {
    pub goal: Goal,
    pub urgency: Urgency,
    pub situation: Situation,
    /// Free text, usually "Suburb, STATE"
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "advisor_type", rename_all = "snake_case")]
pub enum AdvisorType {
    FinancialAdviser,
    MortgageBroker,
    BuyersAgent,
    TaxAdviser,
}

impl AdvisorType {
    pub fn label(&self) -> &'static str {
        match self {
            AdvisorType::FinancialAdviser => "Financial adviser",
            AdvisorType::MortgageBroker => "Mortgage broker",
            AdvisorType::BuyersAgent => "Buyer's agent",
            AdvisorType::TaxAdviser => "Tax adviser",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "accepting_status", rename_all = "snake_case")]
pub enum AcceptingStatus {
    TakingClients,
    Waitlist,
    NotAccepting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "verification_level", rename_all = "snake_case")]
pub enum VerificationLevel {
    None,
    Basic,
    LicenceVerified,
    Enhanced,
}

/// Snapshot of an advisor listing as read from the store for scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub listing_id: Uuid,
    pub advisor_type: AdvisorType,
    pub specialty_slugs: Vec<String>,
    pub suburb: String,
    pub state: String,
    pub accepting_status: AcceptingStatus,
    pub response_time_hours: f64,
    pub verification_level: VerificationLevel,
    /// 0..=5
    pub rating: f64,
    /// 0..=100
    pub response_rate: f64,
    /// 0..=100
    pub profile_completeness_score: f64,
}

/// Output of scoring one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: f64,
    pub reasons: Vec<String>,
}

/// A scored listing as returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMatch {
    pub listing_id: Uuid,
    pub score: f64,
    pub reasons: Vec<String>,
}

/// Lead lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Booked,
    Converted,
    Declined,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Booked,
        LeadStatus::Converted,
        LeadStatus::Declined,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Booked => "booked",
            LeadStatus::Converted => "converted",
            LeadStatus::Declined => "declined",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown lead status: {0}")]
pub struct ParseLeadStatusError(pub String);

impl FromStr for LeadStatus {
    type Err = ParseLeadStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLeadStatusError(s.to_string()))
    }
}

/// A consumer's introduction request to an advisor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub advisor_id: Uuid,
    pub consumer_name: String,
    pub consumer_email: String,
    pub consumer_phone: Option<String>,
    pub message: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a consumer submits when creating a lead
#[derive(Debug, Clone)]
pub struct NewLead {
    pub listing_id: Uuid,
    pub consumer_name: String,
    pub consumer_email: String,
    pub consumer_phone: Option<String>,
    pub message: String,
}

pub const DEFAULT_ACCEPTING_WEIGHT: f64 = 20.0;
pub const DEFAULT_SPECIALTY_WEIGHT: f64 = 20.0;
pub const DEFAULT_ADVISOR_TYPE_WEIGHT: f64 = 15.0;
pub const DEFAULT_LOCATION_WEIGHT: f64 = 15.0;
pub const DEFAULT_VERIFICATION_WEIGHT: f64 = 10.0;
pub const DEFAULT_RESPONSE_RATE_WEIGHT: f64 = 6.0;
pub const DEFAULT_RESPONSE_TIME_WEIGHT: f64 = 5.0;
pub const DEFAULT_RATING_WEIGHT: f64 = 6.0;
pub const DEFAULT_COMPLETENESS_WEIGHT: f64 = 3.0;

/// Points each signal can contribute at full strength
///
/// The defaults sum to 100. Ordering guarantees of the scorer hold for any
/// set of strictly positive weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub accepting: f64,
    pub specialty: f64,
    pub advisor_type: f64,
    pub location: f64,
    pub verification: f64,
    pub response_rate: f64,
    pub response_time: f64,
    pub rating: f64,
    pub completeness: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            accepting: DEFAULT_ACCEPTING_WEIGHT,
            specialty: DEFAULT_SPECIALTY_WEIGHT,
            advisor_type: DEFAULT_ADVISOR_TYPE_WEIGHT,
            location: DEFAULT_LOCATION_WEIGHT,
            verification: DEFAULT_VERIFICATION_WEIGHT,
            response_rate: DEFAULT_RESPONSE_RATE_WEIGHT,
            response_time: DEFAULT_RESPONSE_TIME_WEIGHT,
            rating: DEFAULT_RATING_WEIGHT,
            completeness: DEFAULT_COMPLETENESS_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("scoring weight `{name}` must be a finite, non-negative number (got {value})")]
pub struct InvalidWeight {
    pub name: &'static str,
    pub value: f64,
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), InvalidWeight> {
        let named = [
            ("accepting", self.accepting),
            ("specialty", self.specialty),
            ("advisor_type", self.advisor_type),
            ("location", self.location),
            ("verification", self.verification),
            ("response_rate", self.response_rate),
            ("response_time", self.response_time),
            ("rating", self.rating),
            ("completeness", self.completeness),
        ];

        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidWeight { name, value });
            }
        }

        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.accepting
            + self.specialty
            + self.advisor_type
            + self.location
            + self.verification
            + self.response_rate
            + self.response_time
            + self.rating
            + self.completeness
    }
}
