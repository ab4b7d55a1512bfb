use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Category, CreatorId, DraftId, MatchStatus, MediaType, UserRole};

/// Free-form name/value pair attached to a draft ("height: over 180",
/// "reference: youtube.com", ...). Order is display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtcField {
    pub name: String,
    pub value: String,
}

/// Draft fields as submitted to create/update endpoints. The backend
/// speaks camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    pub title: String,
    pub content: String,
    pub media_type: MediaType,
    pub category: Category,
    pub etc_fields: Vec<EtcField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDraftResponse {
    pub id: DraftId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryPayload {
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPayload {
    pub comment: String,
}

/// Server-side review of a submitted draft. Exactly one variant per
/// evaluation; the tag decides which authoring branch is legal next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationOutcome {
    Summary(SummaryPayload),
    Feedback(FeedbackPayload),
}

/// One entry in the author's draft listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub id: DraftId,
    pub title: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One entry in the matching-request listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: DraftId,
    pub title: String,
    pub status: MatchStatus,
}

/// Creator profile returned by the recommendation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSummary {
    pub id: CreatorId,
    pub nickname: String,
    pub channel_id: String,
    pub channel_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    pub subscribers: u64,
    pub media_type: MediaType,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorSignup {
    pub nickname: String,
    pub email: String,
    pub channel_id: String,
    pub channel_url: String,
    pub profile_image: String,
    pub subscribers: u64,
    pub media_type: MediaType,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductManagerSignup {
    pub nickname: String,
    pub email: String,
    pub favorite_categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    #[serde(rename = "type")]
    pub role: UserRole,
}
