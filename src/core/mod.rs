// Core algorithm exports
pub mod lead_status;
pub mod location;
pub mod matcher;
pub mod origin;
pub mod scoring;
pub mod shortlist;
pub mod specialties;

pub use lead_status::{allowed_transitions, is_terminal_state, is_valid_transition, validate_transition, TransitionError};
pub use location::{parse_intent_location, proximity, IntentLocation, Proximity};
pub use matcher::{Matcher, RankResult};
pub use origin::{AllowedOrigins, InvalidOrigin};
pub use scoring::score_match_candidate;
pub use shortlist::{MemoryShortlistStore, Shortlist, ShortlistError, ShortlistStore};
