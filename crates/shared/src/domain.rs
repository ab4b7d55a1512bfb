use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(DraftId);
id_newtype!(CreatorId);

/// Production format of the content a draft proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Video,
    Shortform,
    Live,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Tech,
    Beauty,
    Food,
    Game,
    Education,
    Travel,
    Fashion,
    Music,
    Sports,
    Entertainment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Creator,
    ProductManager,
}

/// Outcome of a matching request between a draft and a creator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Accepted,
    Rejected,
    Pending,
    Canceled,
}

/// Opaque access token plus the role it was issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    pub access_token: String,
    pub role: UserRole,
}

impl SessionCredential {
    pub fn new(access_token: impl Into<String>, role: UserRole) -> Self {
        Self {
            access_token: access_token.into(),
            role,
        }
    }
}
