use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{LeadStatus, RankedMatch};

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesResponse {
    pub matches: Vec<RankedMatch>,
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadResponse {
    pub lead_id: Uuid,
    pub status: LeadStatus,
}

/// Current status of a lead and where it can go next
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadStatusResponse {
    pub lead_id: Uuid,
    pub status: LeadStatus,
    pub allowed: Vec<LeadStatus>,
    pub terminal: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortlistResponse {
    pub listing_ids: Vec<Uuid>,
    pub count: usize,
}

impl From<Vec<Uuid>> for ShortlistResponse {
    fn from(listing_ids: Vec<Uuid>) -> Self {
        Self {
            count: listing_ids.len(),
            listing_ids,
        }
    }
}
