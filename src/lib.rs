//! Advyser Match - matching and lead pipeline service for the Advyser marketplace
//!
//! This library ranks advisor listings against a consumer's intent and
//! enforces the lead status lifecycle shared by the API and the dashboard.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    allowed_transitions, is_terminal_state, is_valid_transition, score_match_candidate,
    validate_transition, Matcher, TransitionError,
};
pub use models::{
    ConsumerIntent, FindMatchesRequest, FindMatchesResponse, LeadStatus, MatchCandidate,
    MatchResult, ScoringWeights,
};
