//! Contracts for the remote planning backend, plus the HTTP
//! implementation used outside of tests.
//!
//! The backend owns every piece of business logic (summarization,
//! matching, evaluation); this side only issues requests and decodes the
//! typed results.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use shared::{
    domain::{DraftId, UserRole},
    error::ApiError,
    protocol::{
        CreateDraftResponse, CreatorSignup, CreatorSummary, DraftPayload, DraftRecord,
        EvaluationOutcome, MatchRecord, ProductManagerSignup, SignupResponse, SummaryPayload,
    },
};
use thiserror::Error;
use tracing::warn;

use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never produced a usable response (connect, read or
    /// protocol failure).
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error("request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    /// A 2xx response whose body did not decode into the expected shape.
    /// No local recovery is possible, so callers report it like a
    /// transport failure.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl GatewayError {
    /// Every variant is presented to the user as a retryable failure;
    /// the split exists for logs.
    pub fn is_retryable(&self) -> bool {
        true
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::UnexpectedShape(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Draft persistence and evaluation operations the lifecycle controller
/// depends on. `update_draft` must be an idempotent overwrite: repeated
/// submissions with the same fields converge to one backend record.
#[async_trait]
pub trait DraftGateway: Send + Sync {
    async fn create_draft(&self, payload: &DraftPayload) -> Result<DraftId, GatewayError>;
    async fn update_draft(
        &self,
        draft_id: DraftId,
        payload: &DraftPayload,
    ) -> Result<(), GatewayError>;
    async fn evaluate_draft(&self, draft_id: DraftId) -> Result<EvaluationOutcome, GatewayError>;
    async fn resummarize(&self, draft_id: DraftId) -> Result<SummaryPayload, GatewayError>;
}

/// Recommendation and matching-status views.
#[async_trait]
pub trait MatchingGateway: Send + Sync {
    /// Creators recommended for an accepted draft.
    async fn recommend_creators(
        &self,
        draft_id: DraftId,
    ) -> Result<Vec<CreatorSummary>, GatewayError>;
    /// Drafts recommended to the signed-in creator.
    async fn recommend_drafts(&self) -> Result<Vec<DraftRecord>, GatewayError>;
    async fn list_matches(&self) -> Result<Vec<MatchRecord>, GatewayError>;
}

/// Account lifecycle operations.
#[async_trait]
pub trait AccountGateway: Send + Sync {
    async fn signup_creator(&self, signup: &CreatorSignup) -> Result<UserRole, GatewayError>;
    async fn signup_product_manager(
        &self,
        signup: &ProductManagerSignup,
    ) -> Result<UserRole, GatewayError>;
    async fn logout(&self, access_token: &str) -> Result<(), GatewayError>;
    /// The signed-in author's own draft records.
    async fn list_drafts(&self) -> Result<Vec<DraftRecord>, GatewayError>;
}

/// Fallback wired where a real backend dependency is not configured;
/// every call fails.
pub struct MissingGateway;

fn unavailable(operation: &str) -> GatewayError {
    GatewayError::Transport(format!("planning backend unavailable for {operation}"))
}

#[async_trait]
impl DraftGateway for MissingGateway {
    async fn create_draft(&self, _payload: &DraftPayload) -> Result<DraftId, GatewayError> {
        Err(unavailable("create_draft"))
    }

    async fn update_draft(
        &self,
        _draft_id: DraftId,
        _payload: &DraftPayload,
    ) -> Result<(), GatewayError> {
        Err(unavailable("update_draft"))
    }

    async fn evaluate_draft(&self, _draft_id: DraftId) -> Result<EvaluationOutcome, GatewayError> {
        Err(unavailable("evaluate_draft"))
    }

    async fn resummarize(&self, _draft_id: DraftId) -> Result<SummaryPayload, GatewayError> {
        Err(unavailable("resummarize"))
    }
}

#[async_trait]
impl MatchingGateway for MissingGateway {
    async fn recommend_creators(
        &self,
        _draft_id: DraftId,
    ) -> Result<Vec<CreatorSummary>, GatewayError> {
        Err(unavailable("recommend_creators"))
    }

    async fn recommend_drafts(&self) -> Result<Vec<DraftRecord>, GatewayError> {
        Err(unavailable("recommend_drafts"))
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, GatewayError> {
        Err(unavailable("list_matches"))
    }
}

#[async_trait]
impl AccountGateway for MissingGateway {
    async fn signup_creator(&self, _signup: &CreatorSignup) -> Result<UserRole, GatewayError> {
        Err(unavailable("signup_creator"))
    }

    async fn signup_product_manager(
        &self,
        _signup: &ProductManagerSignup,
    ) -> Result<UserRole, GatewayError> {
        Err(unavailable("signup_product_manager"))
    }

    async fn logout(&self, _access_token: &str) -> Result<(), GatewayError> {
        Err(unavailable("logout"))
    }

    async fn list_drafts(&self) -> Result<Vec<DraftRecord>, GatewayError> {
        Err(unavailable("list_drafts"))
    }
}

/// Gateway over the real HTTP backend. Requests carry the stored access
/// token as a bearer header when one exists. No client-wide timeout is
/// set; a hung call blocks its authoring session until it completes.
pub struct HttpGateway {
    http: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    async fn access_token(&self) -> Option<String> {
        match self.session.load().await {
            Ok(credential) => credential.map(|c| c.access_token),
            Err(err) => {
                warn!("session store read failed; sending request unauthenticated: {err}");
                None
            }
        }
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{path}", self.base_url));
        if let Some(token) = self.access_token().await {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

async fn accepted(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    // The backend attaches a structured error body to most rejections;
    // fall back to the raw text when it is absent.
    let body = match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => api_error.to_string(),
        Err(_) => body,
    };
    Err(GatewayError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl DraftGateway for HttpGateway {
    async fn create_draft(&self, payload: &DraftPayload) -> Result<DraftId, GatewayError> {
        let response = self
            .request(Method::POST, "/api/v1/items")
            .await
            .json(payload)
            .send()
            .await?;
        let created: CreateDraftResponse = accepted(response).await?.json().await?;
        Ok(created.id)
    }

    async fn update_draft(
        &self,
        draft_id: DraftId,
        payload: &DraftPayload,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(Method::PATCH, &format!("/api/v1/items/{}", draft_id.0))
            .await
            .json(payload)
            .send()
            .await?;
        accepted(response).await?;
        Ok(())
    }

    async fn evaluate_draft(&self, draft_id: DraftId) -> Result<EvaluationOutcome, GatewayError> {
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/items/{}/evaluation", draft_id.0),
            )
            .await
            .send()
            .await?;
        Ok(accepted(response).await?.json().await?)
    }

    async fn resummarize(&self, draft_id: DraftId) -> Result<SummaryPayload, GatewayError> {
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/items/{}/summary", draft_id.0),
            )
            .await
            .send()
            .await?;
        Ok(accepted(response).await?.json().await?)
    }
}

#[async_trait]
impl MatchingGateway for HttpGateway {
    async fn recommend_creators(
        &self,
        draft_id: DraftId,
    ) -> Result<Vec<CreatorSummary>, GatewayError> {
        let response = self
            .request(
                Method::GET,
                &format!("/api/v1/recommendations/items/{}", draft_id.0),
            )
            .await
            .send()
            .await?;
        Ok(accepted(response).await?.json().await?)
    }

    async fn recommend_drafts(&self) -> Result<Vec<DraftRecord>, GatewayError> {
        let response = self
            .request(Method::GET, "/api/v1/recommendations/users")
            .await
            .send()
            .await?;
        Ok(accepted(response).await?.json().await?)
    }

    async fn list_matches(&self) -> Result<Vec<MatchRecord>, GatewayError> {
        let response = self
            .request(Method::GET, "/api/v1/matching")
            .await
            .send()
            .await?;
        Ok(accepted(response).await?.json().await?)
    }
}

#[async_trait]
impl AccountGateway for HttpGateway {
    async fn signup_creator(&self, signup: &CreatorSignup) -> Result<UserRole, GatewayError> {
        let response = self
            .request(Method::POST, "/api/v1/users/signup/creator")
            .await
            .json(signup)
            .send()
            .await?;
        let signed_up: SignupResponse = accepted(response).await?.json().await?;
        Ok(signed_up.role)
    }

    async fn signup_product_manager(
        &self,
        signup: &ProductManagerSignup,
    ) -> Result<UserRole, GatewayError> {
        let response = self
            .request(Method::POST, "/api/v1/users/signup/productmanager")
            .await
            .json(signup)
            .send()
            .await?;
        let signed_up: SignupResponse = accepted(response).await?.json().await?;
        Ok(signed_up.role)
    }

    async fn logout(&self, access_token: &str) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(format!("{}/logout", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await?;
        accepted(response).await?;
        Ok(())
    }

    async fn list_drafts(&self) -> Result<Vec<DraftRecord>, GatewayError> {
        let response = self.request(Method::GET, "/api/v1/items").await.send().await?;
        Ok(accepted(response).await?.json().await?)
    }
}
