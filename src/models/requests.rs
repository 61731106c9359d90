use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::domain::{ConsumerIntent, Goal, LeadStatus, NewLead, Situation, Urgency};

/// Request to find advisor matches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesRequest {
    pub goal: Goal,
    pub urgency: Urgency,
    pub situation: Situation,
    #[validate(length(max = 120))]
    #[serde(default)]
    pub location: String,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

impl FindMatchesRequest {
    pub fn intent(&self) -> ConsumerIntent {
        ConsumerIntent {
            goal: self.goal,
            urgency: self.urgency,
            situation: self.situation,
            location: self.location.trim().to_string(),
        }
    }
}

/// Public request to contact an advisor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadRequest {
    pub listing_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub consumer_name: String,
    #[validate(email)]
    pub consumer_email: String,
    #[validate(length(min = 6, max = 32))]
    #[serde(default)]
    pub consumer_phone: Option<String>,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
    #[serde(default)]
    pub captcha_token: Option<String>,
}

impl CreateLeadRequest {
    pub fn into_new_lead(self) -> NewLead {
        NewLead {
            listing_id: self.listing_id,
            consumer_name: self.consumer_name.trim().to_string(),
            consumer_email: self.consumer_email.trim().to_lowercase(),
            consumer_phone: self
                .consumer_phone
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            message: self.message.trim().to_string(),
        }
    }
}

/// Advisor request to move a lead to a new status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLeadStatusRequest {
    pub status: LeadStatus,
}

/// Raw shortlist value carried over from a client cookie
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImportShortlistRequest {
    #[validate(length(max = 4096))]
    pub raw: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matches_defaults() {
        let req: FindMatchesRequest = serde_json::from_value(serde_json::json!({
            "goal": "property",
            "urgency": "urgent",
            "situation": "couple"
        }))
        .unwrap();

        assert_eq!(req.limit, None);
        assert_eq!(req.location, "");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_find_matches_rejects_unknown_goal() {
        let parsed = serde_json::from_value::<FindMatchesRequest>(serde_json::json!({
            "goal": "crypto",
            "urgency": "urgent",
            "situation": "couple"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_create_lead_validation() {
        let req = CreateLeadRequest {
            listing_id: Uuid::nil(),
            consumer_name: "Sam".to_string(),
            consumer_email: "not-an-email".to_string(),
            consumer_phone: None,
            message: "Hi".to_string(),
            captcha_token: None,
        };
        assert!(req.validate().is_err());

        let req = CreateLeadRequest {
            consumer_email: "sam@example.com".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_into_new_lead_normalises_fields() {
        let req = CreateLeadRequest {
            listing_id: Uuid::nil(),
            consumer_name: "  Sam Lee ".to_string(),
            consumer_email: " Sam@Example.com ".to_string(),
            consumer_phone: Some("   ".to_string()),
            message: " Looking to refinance ".to_string(),
            captcha_token: None,
        };

        let lead = req.into_new_lead();
        assert_eq!(lead.consumer_name, "Sam Lee");
        assert_eq!(lead.consumer_email, "sam@example.com");
        assert_eq!(lead.consumer_phone, None);
        assert_eq!(lead.message, "Looking to refinance");
    }
}
