// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AcceptingStatus, AdvisorType, ConsumerIntent, Goal, InvalidWeight, Lead, LeadStatus,
    MatchCandidate, MatchResult, NewLead, RankedMatch, ScoringWeights, Situation, Urgency,
    VerificationLevel,
};
pub use requests::{CreateLeadRequest, FindMatchesRequest, ImportShortlistRequest, UpdateLeadStatusRequest};
pub use responses::{
    CreateLeadResponse, ErrorResponse, FindMatchesResponse, HealthResponse, LeadStatusResponse,
    ShortlistResponse,
};
