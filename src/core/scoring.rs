use crate::core::location::{parse_intent_location, proximity, Proximity};
use crate::core::specialties::{
    advisor_type_affinity, infer_specialty_slugs, matching_specialties, specialty_factor,
};
use crate::models::{
    AcceptingStatus, ConsumerIntent, MatchCandidate, MatchResult, ScoringWeights, Urgency,
    VerificationLevel,
};

/// Response-time multiplier for consumers who need help now
pub const URGENT_RESPONSE_MULTIPLIER: f64 = 1.5;
pub const SOON_RESPONSE_MULTIPLIER: f64 = 1.0;
pub const FLEXIBLE_RESPONSE_MULTIPLIER: f64 = 0.75;

/// Hours at which the response-time factor halves
pub const RESPONSE_TIME_HALF_LIFE_HOURS: f64 = 24.0;

/// Score one advisor listing against a consumer intent
///
/// Scoring formula (each factor in 0..=1):
/// score = (
///     accepting      * weights.accepting +     # taking > waitlist > not accepting
///     specialty      * weights.specialty +     # 1 - 0.5^overlap
///     type affinity  * weights.advisor_type +  # e.g. property -> mortgage broker
///     proximity      * weights.location +      # suburb > state > none
///     verification   * weights.verification +  # enhanced > licence > basic > none
///     response rate  * weights.response_rate +
///     response time  * weights.response_time * urgency multiplier +
///     rating         * weights.rating +
///     completeness   * weights.completeness
/// )
///
/// `reasons` holds one line per signal that added points, largest first.
pub fn score_match_candidate(
    intent: &ConsumerIntent,
    candidate: &MatchCandidate,
    weights: &ScoringWeights,
) -> MatchResult {
    let mut signals: Vec<(f64, String)> = Vec::with_capacity(9);

    // Accepting status
    let accepting = accepting_factor(candidate.accepting_status) * weights.accepting;
    match candidate.accepting_status {
        AcceptingStatus::TakingClients => signals.push((accepting, "Taking new clients".to_string())),
        AcceptingStatus::Waitlist => signals.push((accepting, "Waitlist open for new clients".to_string())),
        AcceptingStatus::NotAccepting => {}
    }

    // Specialty overlap
    let needed = infer_specialty_slugs(intent);
    let matched = matching_specialties(&needed, &candidate.specialty_slugs);
    if !matched.is_empty() {
        let readable: Vec<String> = matched.iter().map(|slug| slug.replace('-', " ")).collect();
        signals.push((
            specialty_factor(matched.len()) * weights.specialty,
            format!("Specialises in {}", readable.join(", ")),
        ));
    }

    // Advisor type fit for the goal
    let affinity = advisor_type_affinity(intent.goal, candidate.advisor_type);
    signals.push((
        affinity * weights.advisor_type,
        format!(
            "{} suited to {} goals",
            candidate.advisor_type.label(),
            intent.goal.as_str()
        ),
    ));

    // Location
    let location = parse_intent_location(&intent.location);
    match proximity(&location, &candidate.suburb, &candidate.state) {
        Proximity::SameSuburb => signals.push((
            Proximity::SameSuburb.factor() * weights.location,
            format!("Based in {}", candidate.suburb.trim()),
        )),
        Proximity::SameState => signals.push((
            Proximity::SameState.factor() * weights.location,
            format!("Located in {}", candidate.state.trim().to_ascii_uppercase()),
        )),
        Proximity::None => {}
    }

    // Verification
    let verification = verification_factor(candidate.verification_level) * weights.verification;
    match candidate.verification_level {
        VerificationLevel::Enhanced => signals.push((verification, "Enhanced verification completed".to_string())),
        VerificationLevel::LicenceVerified => signals.push((verification, "Licence verified".to_string())),
        VerificationLevel::Basic => signals.push((verification, "Identity checked".to_string())),
        VerificationLevel::None => {}
    }

    // Responsiveness
    let response_rate = unit(candidate.response_rate, 100.0);
    signals.push((
        response_rate * weights.response_rate,
        format!("Responds to {:.0}% of enquiries", response_rate * 100.0),
    ));

    let response_time = response_time_factor(candidate.response_time_hours);
    signals.push((
        response_time * weights.response_time * urgency_multiplier(intent.urgency),
        describe_response_time(candidate.response_time_hours),
    ));

    let rating = unit(candidate.rating, 5.0);
    signals.push((rating * weights.rating, format!("Rated {:.1} out of 5", rating * 5.0)));

    // Profile completeness
    let completeness = unit(candidate.profile_completeness_score, 100.0);
    signals.push((
        completeness * weights.completeness,
        format!("Profile {:.0}% complete", completeness * 100.0),
    ));

    let score: f64 = signals.iter().map(|(points, _)| *points).sum();

    // Stable sort keeps the fixed signal order for equal contributions
    signals.retain(|(points, _)| *points > 0.0);
    signals.sort_by(|a, b| b.0.total_cmp(&a.0));

    MatchResult {
        score,
        reasons: signals.into_iter().map(|(_, reason)| reason).collect(),
    }
}

#[inline]
fn accepting_factor(status: AcceptingStatus) -> f64 {
    match status {
        AcceptingStatus::TakingClients => 1.0,
        AcceptingStatus::Waitlist => 0.4,
        AcceptingStatus::NotAccepting => 0.0,
    }
}

#[inline]
fn verification_factor(level: VerificationLevel) -> f64 {
    match level {
        VerificationLevel::Enhanced => 1.0,
        VerificationLevel::LicenceVerified => 0.7,
        VerificationLevel::Basic => 0.35,
        VerificationLevel::None => 0.0,
    }
}

#[inline]
fn urgency_multiplier(urgency: Urgency) -> f64 {
    match urgency {
        Urgency::Urgent => URGENT_RESPONSE_MULTIPLIER,
        Urgency::Soon => SOON_RESPONSE_MULTIPLIER,
        Urgency::Flexible => FLEXIBLE_RESPONSE_MULTIPLIER,
    }
}

/// Clamp `value` into 0..=max and scale to 0..=1; NaN counts as zero
#[inline]
fn unit(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max) / max
}

/// 1 at zero hours, 0.5 at the half-life, approaching 0
#[inline]
fn response_time_factor(hours: f64) -> f64 {
    if hours.is_nan() {
        return 0.0;
    }
    let hours = hours.max(0.0);
    1.0 / (1.0 + hours / RESPONSE_TIME_HALF_LIFE_HOURS)
}

fn describe_response_time(hours: f64) -> String {
    let hours = if hours.is_nan() { 0.0 } else { hours.max(0.0) };

    if hours <= 1.0 {
        "Typically responds within an hour".to_string()
    } else if hours < 48.0 {
        format!("Typically responds within {:.0} hours", hours.ceil())
    } else {
        format!("Typically responds within {:.0} days", (hours / 24.0).ceil())
    }
}
