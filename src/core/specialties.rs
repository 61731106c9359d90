use crate::models::{AdvisorType, ConsumerIntent, Goal, Situation, Urgency};

/// Specialty slugs that serve a consumer's intent, most relevant first
///
/// The list is deterministic and free of duplicates.
pub fn infer_specialty_slugs(intent: &ConsumerIntent) -> Vec<&'static str> {
    let mut slugs: Vec<&'static str> = Vec::new();

    let goal_slugs: &[&'static str] = match intent.goal {
        Goal::Property => &["first-home-buyers", "refinance", "investment-property", "home-loans"],
        Goal::Financial => &["wealth-management", "investment-strategy", "superannuation", "budgeting"],
        Goal::Retirement => &["retirement-planning", "superannuation", "estate-planning", "aged-care"],
        Goal::Tax => &["tax-planning", "investment-tax", "business-tax"],
    };
    slugs.extend_from_slice(goal_slugs);

    let situation_slugs: &[&'static str] = match (intent.goal, intent.situation) {
        (Goal::Property, Situation::Family) => &["upsizing"],
        (Goal::Property, Situation::Retiree) => &["downsizing"],
        (_, Situation::Family) => &["family-finances", "insurance"],
        (_, Situation::Retiree) => &["retirement-planning", "aged-care"],
        (_, Situation::Business) => &["small-business", "business-tax"],
        (_, Situation::Single) | (_, Situation::Couple) => &[],
    };
    for slug in situation_slugs {
        if !slugs.contains(slug) {
            slugs.push(slug);
        }
    }

    if intent.goal == Goal::Property && intent.urgency == Urgency::Urgent {
        slugs.push("pre-approval");
    }

    slugs
}

/// Inferred slugs the listing offers, in inferred order
///
/// Comparison ignores case and surrounding whitespace; a slug offered twice
/// counts once.
pub fn matching_specialties(needed: &[&'static str], offered: &[String]) -> Vec<&'static str> {
    needed
        .iter()
        .copied()
        .filter(|slug| {
            offered
                .iter()
                .any(|offer| offer.trim().eq_ignore_ascii_case(slug))
        })
        .collect()
}

/// Fraction of the specialty weight earned for `matches` overlapping slugs
///
/// Strictly increasing in `matches`, approaching 1.
#[inline]
pub fn specialty_factor(matches: usize) -> f64 {
    if matches == 0 {
        return 0.0;
    }
    1.0 - 0.5_f64.powi(matches.min(i32::MAX as usize) as i32)
}

/// How well an advisor type serves a goal (0, 0.5 or 1)
pub fn advisor_type_affinity(goal: Goal, advisor_type: AdvisorType) -> f64 {
    use AdvisorType::*;

    match (goal, advisor_type) {
        (Goal::Property, MortgageBroker) => 1.0,
        (Goal::Property, BuyersAgent) => 0.5,
        (Goal::Financial, FinancialAdviser) => 1.0,
        (Goal::Financial, TaxAdviser) => 0.5,
        (Goal::Retirement, FinancialAdviser) => 1.0,
        (Goal::Retirement, TaxAdviser) => 0.5,
        (Goal::Tax, TaxAdviser) => 1.0,
        (Goal::Tax, FinancialAdviser) => 0.5,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(goal: Goal, urgency: Urgency, situation: Situation) -> ConsumerIntent {
        ConsumerIntent {
            goal,
            urgency,
            situation,
            location: String::new(),
        }
    }

    #[test]
    fn test_property_intent_slugs() {
        let slugs = infer_specialty_slugs(&intent(Goal::Property, Urgency::Urgent, Situation::Couple));
        assert_eq!(slugs[0], "first-home-buyers");
        assert!(slugs.contains(&"refinance"));
        assert!(slugs.contains(&"pre-approval"));
    }

    #[test]
    fn test_slugs_have_no_duplicates() {
        let slugs = infer_specialty_slugs(&intent(Goal::Retirement, Urgency::Flexible, Situation::Retiree));
        let mut deduped = slugs.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(slugs.len(), deduped.len());
    }

    #[test]
    fn test_matching_specialties_ignores_case_and_duplicates() {
        let needed = ["first-home-buyers", "refinance"];
        let offered = vec![
            "Refinance".to_string(),
            " refinance ".to_string(),
            "tax-planning".to_string(),
        ];
        assert_eq!(matching_specialties(&needed, &offered), vec!["refinance"]);
    }

    #[test]
    fn test_specialty_factor_strictly_increasing() {
        let mut previous = specialty_factor(0);
        assert_eq!(previous, 0.0);
        for n in 1..8 {
            let current = specialty_factor(n);
            assert!(current > previous);
            assert!(current < 1.0);
            previous = current;
        }
    }

    #[test]
    fn test_property_goal_prefers_mortgage_broker() {
        assert!(
            advisor_type_affinity(Goal::Property, AdvisorType::MortgageBroker)
                > advisor_type_affinity(Goal::Property, AdvisorType::FinancialAdviser)
        );
    }
}
