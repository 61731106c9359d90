use crate::models::LeadStatus;
use thiserror::Error;

const FROM_NEW: &[LeadStatus] = &[LeadStatus::Contacted, LeadStatus::Declined];
const FROM_CONTACTED: &[LeadStatus] = &[LeadStatus::Booked, LeadStatus::Declined];
const FROM_BOOKED: &[LeadStatus] = &[LeadStatus::Converted, LeadStatus::Declined];
const TERMINAL: &[LeadStatus] = &[];

/// Statuses a lead in `current` may move to
///
/// `converted` and `declined` have no outgoing edges.
pub fn allowed_transitions(current: LeadStatus) -> &'static [LeadStatus] {
    match current {
        LeadStatus::New => FROM_NEW,
        LeadStatus::Contacted => FROM_CONTACTED,
        LeadStatus::Booked => FROM_BOOKED,
        LeadStatus::Converted | LeadStatus::Declined => TERMINAL,
    }
}

#[inline]
pub fn is_valid_transition(current: LeadStatus, next: LeadStatus) -> bool {
    allowed_transitions(current).contains(&next)
}

#[inline]
pub fn is_terminal_state(status: LeadStatus) -> bool {
    allowed_transitions(status).is_empty()
}

/// A status change rejected before it reaches the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("lead is already {from} and can no longer change status (requested {to})")]
    Terminal { from: LeadStatus, to: LeadStatus },

    #[error("cannot move lead from {from} to {to}")]
    NotAllowed { from: LeadStatus, to: LeadStatus },
}

/// Gate used by handlers before issuing a status update
pub fn validate_transition(current: LeadStatus, next: LeadStatus) -> Result<(), TransitionError> {
    if is_valid_transition(current, next) {
        return Ok(());
    }

    if is_terminal_state(current) {
        Err(TransitionError::Terminal { from: current, to: next })
    } else {
        Err(TransitionError::NotAllowed { from: current, to: next })
    }
}
