// Integration tests for Advyser Match

use advyser_match::config::{BusinessContact, ContactSettings, DEFAULT_CONTACT_EMAIL};
use advyser_match::core::{
    score_match_candidate, AllowedOrigins, Matcher, MemoryShortlistStore, Shortlist,
    ShortlistError, ShortlistStore,
};
use advyser_match::core::shortlist::MAX_SHORTLIST_ITEMS;
use advyser_match::models::{
    AcceptingStatus, AdvisorType, ConsumerIntent, Goal, MatchCandidate, ScoringWeights,
    Situation, Urgency, VerificationLevel,
};
use std::sync::Arc;
use uuid::Uuid;

fn melbourne_intent() -> ConsumerIntent {
    ConsumerIntent {
        goal: Goal::Property,
        urgency: Urgency::Urgent,
        situation: Situation::Couple,
        location: "Melbourne, VIC".to_string(),
    }
}

fn candidate_a() -> MatchCandidate {
    MatchCandidate {
        listing_id: Uuid::from_u128(0xA),
        advisor_type: AdvisorType::MortgageBroker,
        specialty_slugs: vec!["first-home-buyers".to_string(), "refinance".to_string()],
        suburb: "Melbourne".to_string(),
        state: "VIC".to_string(),
        accepting_status: AcceptingStatus::TakingClients,
        response_time_hours: 4.0,
        verification_level: VerificationLevel::LicenceVerified,
        rating: 4.8,
        response_rate: 95.0,
        profile_completeness_score: 92.0,
    }
}

fn candidate_b() -> MatchCandidate {
    MatchCandidate {
        listing_id: Uuid::from_u128(0xB),
        advisor_type: AdvisorType::FinancialAdviser,
        specialty_slugs: vec!["tax-planning".to_string()],
        suburb: "Perth".to_string(),
        state: "WA".to_string(),
        accepting_status: AcceptingStatus::Waitlist,
        response_time_hours: 72.0,
        verification_level: VerificationLevel::None,
        rating: 3.9,
        response_rate: 40.0,
        profile_completeness_score: 55.0,
    }
}

#[test]
fn test_local_specialist_beats_distant_generalist() {
    let weights = ScoringWeights::default();
    let intent = melbourne_intent();

    let a = score_match_candidate(&intent, &candidate_a(), &weights);
    let b = score_match_candidate(&intent, &candidate_b(), &weights);

    assert!(a.score > b.score, "A={} B={}", a.score, b.score);
    assert_eq!(
        a.reasons,
        vec![
            "Taking new clients",
            "Specialises in first home buyers, refinance",
            "Mortgage broker suited to property goals",
            "Based in Melbourne",
            "Licence verified",
            "Typically responds within 4 hours",
            "Rated 4.8 out of 5",
            "Responds to 95% of enquiries",
            "Profile 92% complete",
        ]
    );
    assert!(!b.reasons.iter().any(|r| r.starts_with("Specialises")));
}

#[test]
fn test_integration_end_to_end_ranking() {
    let matcher = Matcher::with_default_weights();
    let intent = melbourne_intent();

    let same_state = MatchCandidate {
        listing_id: Uuid::from_u128(0xC),
        suburb: "Geelong".to_string(),
        ..candidate_a()
    };
    let closed = MatchCandidate {
        listing_id: Uuid::from_u128(0xD),
        accepting_status: AcceptingStatus::NotAccepting,
        ..candidate_a()
    };

    let candidates = vec![candidate_b(), closed, same_state, candidate_a()];
    let result = matcher.rank(&intent, &candidates, 10);

    assert_eq!(result.total_candidates, 4);
    let order: Vec<Uuid> = result.matches.iter().map(|m| m.listing_id).collect();
    assert_eq!(
        order,
        vec![
            Uuid::from_u128(0xA),
            Uuid::from_u128(0xC),
            Uuid::from_u128(0xD),
            Uuid::from_u128(0xB),
        ]
    );
    assert!(result.matches.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_ranking_limit_and_tie_break() {
    let matcher = Matcher::with_default_weights();
    let intent = melbourne_intent();

    let candidates: Vec<MatchCandidate> = (0..20u128)
        .rev()
        .map(|i| MatchCandidate {
            listing_id: Uuid::from_u128(i + 1),
            ..candidate_a()
        })
        .collect();

    let result = matcher.rank(&intent, &candidates, 5);

    assert_eq!(result.total_candidates, 20);
    assert_eq!(result.matches.len(), 5);
    let ids: Vec<Uuid> = result.matches.iter().map(|m| m.listing_id).collect();
    assert_eq!(ids, (1..=5u128).map(Uuid::from_u128).collect::<Vec<_>>());
}

#[test]
fn test_ranking_is_stable_across_input_order() {
    let matcher = Matcher::with_default_weights();
    let intent = melbourne_intent();

    let forward = vec![candidate_a(), candidate_b()];
    let backward = vec![candidate_b(), candidate_a()];

    let first: Vec<Uuid> = matcher
        .rank(&intent, &forward, 10)
        .matches
        .into_iter()
        .map(|m| m.listing_id)
        .collect();
    let second: Vec<Uuid> = matcher
        .rank(&intent, &backward, 10)
        .matches
        .into_iter()
        .map(|m| m.listing_id)
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_empty_candidate_pool() {
    let result = Matcher::with_default_weights().rank(&melbourne_intent(), &[], 10);
    assert!(result.matches.is_empty());
    assert_eq!(result.total_candidates, 0);
}

#[test]
fn test_shortlist_session_flow() {
    let store = Arc::new(MemoryShortlistStore::new());
    let shortlist = Shortlist::new(store.clone());
    let key = "shortlist:session-1234";

    let first = Uuid::from_u128(1);
    let second = Uuid::from_u128(2);

    assert!(shortlist.items(key).is_empty());
    assert_eq!(shortlist.add(key, first).unwrap(), vec![first]);
    assert_eq!(shortlist.add(key, second).unwrap(), vec![first, second]);
    // Adding again is a no-op
    assert_eq!(shortlist.add(key, first).unwrap(), vec![first, second]);

    assert_eq!(shortlist.remove(key, first), vec![second]);
    shortlist.clear(key);
    assert!(shortlist.items(key).is_empty());
    assert!(store.read(key).is_none());
}

#[test]
fn test_shortlist_capacity() {
    let shortlist = Shortlist::new(Arc::new(MemoryShortlistStore::new()));
    let key = "shortlist:capacity";

    for i in 0..MAX_SHORTLIST_ITEMS as u128 {
        shortlist.add(key, Uuid::from_u128(i + 1)).unwrap();
    }

    assert_eq!(
        shortlist.add(key, Uuid::from_u128(999)),
        Err(ShortlistError::Full(MAX_SHORTLIST_ITEMS))
    );
    assert_eq!(shortlist.items(key).len(), MAX_SHORTLIST_ITEMS);
}

#[test]
fn test_shortlist_migrates_legacy_value() {
    let store = Arc::new(MemoryShortlistStore::new());
    let legacy = Uuid::from_u128(42);
    store.write("shortlist:legacy", legacy.to_string());

    let shortlist = Shortlist::new(store.clone());
    assert_eq!(shortlist.items("shortlist:legacy"), vec![legacy]);

    let upgraded = store.read("shortlist:legacy").unwrap();
    assert!(upgraded.starts_with('['));
}

#[test]
fn test_business_contact_fallbacks() {
    let contact = BusinessContact::resolve(&ContactSettings::default());
    assert_eq!(contact.email, DEFAULT_CONTACT_EMAIL);
    assert_eq!(contact.support_email, DEFAULT_CONTACT_EMAIL);
    assert_eq!(contact.phone, None);

    let contact = BusinessContact::resolve(&ContactSettings {
        email: Some("team@example.com".to_string()),
        support_email: Some("  ".to_string()),
        phone: Some("1300 000 000".to_string()),
        address: None,
    });
    assert_eq!(contact.email, "team@example.com");
    assert_eq!(contact.support_email, "team@example.com");
    assert_eq!(contact.phone.as_deref(), Some("1300 000 000"));
}

#[test]
fn test_allowed_origins_gate() {
    let origins = AllowedOrigins::new(&["https://advyser.com.au"]).unwrap();

    assert!(origins.permits(Some("https://advyser.com.au"), None));
    assert!(origins.permits(None, Some("https://advyser.com.au/advisors/123")));
    assert!(!origins.permits(Some("https://evil.example"), Some("https://advyser.com.au/")));
    assert!(!origins.permits(None, None));

    let open = AllowedOrigins::new::<&str>(&[]).unwrap();
    assert!(open.permits(None, None));
}

#[test]
fn test_mistyped_origin_list_is_refused() {
    assert!(AllowedOrigins::new(&["advyser.com.au"]).is_err());
    assert!(AllowedOrigins::new(&["https://advyser.com.au", "www.advyser.com.au"]).is_err());
}
