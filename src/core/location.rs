/// Australian state and territory codes accepted in a location string
pub const STATE_CODES: &[&str] = &["ACT", "NSW", "NT", "QLD", "SA", "TAS", "VIC", "WA"];

/// Full names accepted in place of a state code
const STATE_NAMES: &[(&str, &str)] = &[
    ("AUSTRALIAN CAPITAL TERRITORY", "ACT"),
    ("NEW SOUTH WALES", "NSW"),
    ("NORTHERN TERRITORY", "NT"),
    ("QUEENSLAND", "QLD"),
    ("SOUTH AUSTRALIA", "SA"),
    ("TASMANIA", "TAS"),
    ("VICTORIA", "VIC"),
    ("WESTERN AUSTRALIA", "WA"),
];

/// Longest state name, in words
const MAX_STATE_WORDS: usize = 3;

/// Location the consumer typed, split into comparable parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentLocation {
    /// Lowercased, whitespace-collapsed suburb name
    pub suburb: Option<String>,
    /// Upper-case state code
    pub state: Option<String>,
}

/// How close a listing is to the consumer's location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Proximity {
    None,
    SameState,
    SameSuburb,
}

impl Proximity {
    /// Fraction of the location weight this tier earns
    #[inline]
    pub fn factor(&self) -> f64 {
        match self {
            Proximity::None => 0.0,
            Proximity::SameState => 0.5,
            Proximity::SameSuburb => 1.0,
        }
    }
}

/// Parse a free-text "Suburb, STATE" location
///
/// Accepts "Melbourne, VIC", "Melbourne VIC 3000", "Melbourne, Victoria",
/// "vic" and "Melbourne". A trailing postcode is ignored.
pub fn parse_intent_location(raw: &str) -> IntentLocation {
    let mut words: Vec<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .collect();

    if words.last().is_some_and(|w| w.chars().all(|c| c.is_ascii_digit())) {
        words.pop();
    }

    let mut state = None;
    for take in (1..=MAX_STATE_WORDS.min(words.len())).rev() {
        let tail = words[words.len() - take..].join(" ");
        if let Some(code) = normalize_state(&tail) {
            state = Some(code);
            words.truncate(words.len() - take);
            break;
        }
    }

    let suburb = if words.is_empty() {
        None
    } else {
        Some(normalize_suburb(&words.join(" ")))
    };

    IntentLocation { suburb, state }
}

/// Compare a listing's suburb and state against the parsed intent location
pub fn proximity(intent: &IntentLocation, suburb: &str, state: &str) -> Proximity {
    let listing_state = normalize_state(state);

    let state_matches = match (&intent.state, &listing_state) {
        (Some(wanted), Some(actual)) => wanted == actual,
        _ => false,
    };
    let state_conflicts = intent.state.is_some() && listing_state.is_some() && !state_matches;

    if let Some(wanted) = &intent.suburb {
        if !state_conflicts && *wanted == normalize_suburb(suburb) {
            return Proximity::SameSuburb;
        }
    }

    if state_matches {
        Proximity::SameState
    } else {
        Proximity::None
    }
}

/// Map a state code or full state name to its code
fn normalize_state(raw: &str) -> Option<String> {
    let upper = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_uppercase();

    if let Some(code) = STATE_CODES.iter().find(|code| **code == upper) {
        return Some(code.to_string());
    }

    STATE_NAMES
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, code)| code.to_string())
}

fn normalize_suburb(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suburb_and_state() {
        let loc = parse_intent_location("Melbourne, VIC");
        assert_eq!(loc.suburb.as_deref(), Some("melbourne"));
        assert_eq!(loc.state.as_deref(), Some("VIC"));
    }

    #[test]
    fn test_parse_with_postcode_and_spaces() {
        let loc = parse_intent_location("  Surry   Hills NSW 2010 ");
        assert_eq!(loc.suburb.as_deref(), Some("surry hills"));
        assert_eq!(loc.state.as_deref(), Some("NSW"));
    }

    #[test]
    fn test_parse_state_only() {
        let loc = parse_intent_location("qld");
        assert_eq!(loc.suburb, None);
        assert_eq!(loc.state.as_deref(), Some("QLD"));
    }

    #[test]
    fn test_parse_suburb_only_and_empty() {
        let loc = parse_intent_location("Fremantle");
        assert_eq!(loc.suburb.as_deref(), Some("fremantle"));
        assert_eq!(loc.state, None);

        assert_eq!(parse_intent_location("   "), IntentLocation::default());
    }

    #[test]
    fn test_parse_full_state_names() {
        let loc = parse_intent_location("Melbourne, Victoria");
        assert_eq!(loc.suburb.as_deref(), Some("melbourne"));
        assert_eq!(loc.state.as_deref(), Some("VIC"));

        let loc = parse_intent_location("Surry Hills, New South Wales 2010");
        assert_eq!(loc.suburb.as_deref(), Some("surry hills"));
        assert_eq!(loc.state.as_deref(), Some("NSW"));

        let loc = parse_intent_location("Canberra Australian Capital Territory");
        assert_eq!(loc.suburb.as_deref(), Some("canberra"));
        assert_eq!(loc.state.as_deref(), Some("ACT"));

        let loc = parse_intent_location("western australia");
        assert_eq!(loc.suburb, None);
        assert_eq!(loc.state.as_deref(), Some("WA"));
    }

    #[test]
    fn test_suburb_named_like_a_state_is_kept() {
        let loc = parse_intent_location("Victoria Park, WA");
        assert_eq!(loc.suburb.as_deref(), Some("victoria park"));
        assert_eq!(loc.state.as_deref(), Some("WA"));
    }

    #[test]
    fn test_full_state_name_matches_listing_code() {
        let loc = parse_intent_location("Geelong, Victoria");
        assert_eq!(proximity(&loc, "Melbourne", "VIC"), Proximity::SameState);
        assert_eq!(proximity(&loc, "Geelong", "Victoria"), Proximity::SameSuburb);
        assert_eq!(proximity(&loc, "Geelong", "NSW"), Proximity::None);
    }

    #[test]
    fn test_proximity_tiers() {
        let loc = parse_intent_location("Melbourne, VIC");
        assert_eq!(proximity(&loc, "Melbourne", "VIC"), Proximity::SameSuburb);
        assert_eq!(proximity(&loc, "Geelong", "vic"), Proximity::SameState);
        assert_eq!(proximity(&loc, "Perth", "WA"), Proximity::None);
        assert!(Proximity::SameSuburb > Proximity::SameState);
        assert!(Proximity::SameState > Proximity::None);
    }

    #[test]
    fn test_same_suburb_name_in_other_state_is_not_a_match() {
        let loc = parse_intent_location("Richmond, VIC");
        assert_eq!(proximity(&loc, "Richmond", "NSW"), Proximity::None);
    }

    #[test]
    fn test_suburb_without_state_matches_any_state() {
        let loc = parse_intent_location("Richmond");
        assert_eq!(proximity(&loc, "Richmond", "NSW"), Proximity::SameSuburb);
    }
}
