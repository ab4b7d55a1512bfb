//! Client core of the content-planning and creator-matching platform.
//!
//! `PlanningClient` owns one draft authoring session at a time and
//! exposes it to a presentation shell: field edits while the draft is
//! editable, the submit/evaluate chain, summary regeneration, revision
//! after feedback, and the handoff of an accepted draft to creator
//! matching. All business logic lives in the remote backend behind the
//! gateway traits.

use std::sync::Arc;

use anyhow::{Context, Result};
use shared::{
    domain::{Category, DraftId, MediaType, UserRole},
    protocol::{
        CreatorSignup, CreatorSummary, DraftRecord, EtcField, MatchRecord, ProductManagerSignup,
        SummaryPayload,
    },
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod draft;
pub mod gateway;
pub mod lifecycle;
pub mod session;

use draft::DraftForm;
use lifecycle::{DraftLifecycle, StateTag, SubmitAction};

pub use gateway::{
    AccountGateway, DraftGateway, GatewayError, HttpGateway, MatchingGateway, MissingGateway,
};
pub use session::{DurableSessionStore, MemorySessionStore, SessionStore};

/// State handed to the presentation shell on every change: the state tag
/// plus whichever data is live in that state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSnapshot {
    pub state: StateTag,
    pub draft_id: Option<DraftId>,
    pub read_only: bool,
    pub title: String,
    pub content: String,
    pub media_type: Option<MediaType>,
    pub category: Option<Category>,
    pub etc_fields: Vec<EtcField>,
    pub summary: Option<SummaryPayload>,
    pub feedback: Option<String>,
}

impl DraftSnapshot {
    fn capture(flow: &DraftLifecycle) -> Self {
        let draft = flow.draft();
        Self {
            state: flow.state().tag(),
            draft_id: flow.draft_id(),
            read_only: flow.read_only(),
            title: draft.title().to_string(),
            content: draft.content().to_string(),
            media_type: draft.media_type(),
            category: draft.category(),
            etc_fields: draft.etc_fields().to_vec(),
            summary: flow.summary().cloned(),
            feedback: flow.feedback().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClientEvent {
    StateChanged(DraftSnapshot),
    /// Reportable failure, emitted exactly once per failed operation.
    Error(String),
}

/// How a submit or resummarize trigger ended. Failures have already
/// been surfaced through the event channel when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The evaluated state was reached (or the summary was replaced).
    Evaluated,
    /// Precondition not met, flow busy, or the session was discarded
    /// while the call was outstanding. Nothing was dispatched or
    /// applied, and nothing is surfaced.
    Ignored,
    /// A gateway call failed; the flow rolled back to its last stable
    /// state and the error was surfaced once.
    Failed,
}

pub struct PlanningClient {
    drafts: Arc<dyn DraftGateway>,
    matching: Arc<dyn MatchingGateway>,
    accounts: Arc<dyn AccountGateway>,
    session: Arc<dyn SessionStore>,
    flow: Mutex<DraftLifecycle>,
    events: broadcast::Sender<ClientEvent>,
}

impl PlanningClient {
    pub fn new() -> Arc<Self> {
        Self::new_with_dependencies(
            Arc::new(MissingGateway),
            Arc::new(MissingGateway),
            Arc::new(MissingGateway),
            Arc::new(MemorySessionStore::new()),
        )
    }

    /// Client wired to a real backend at `base_url`, authenticating with
    /// whatever credential the session store holds.
    pub fn connect(base_url: impl Into<String>, session: Arc<dyn SessionStore>) -> Arc<Self> {
        let http = Arc::new(HttpGateway::new(base_url, Arc::clone(&session)));
        Self::new_with_dependencies(
            Arc::clone(&http) as Arc<dyn DraftGateway>,
            Arc::clone(&http) as Arc<dyn MatchingGateway>,
            http,
            session,
        )
    }

    pub fn new_with_dependencies(
        drafts: Arc<dyn DraftGateway>,
        matching: Arc<dyn MatchingGateway>,
        accounts: Arc<dyn AccountGateway>,
        session: Arc<dyn SessionStore>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(1024);
        Arc::new(Self {
            drafts,
            matching,
            accounts,
            session,
            flow: Mutex::new(DraftLifecycle::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot::capture(&*self.flow.lock().await)
    }

    async fn emit_state(&self) {
        let snapshot = { DraftSnapshot::capture(&*self.flow.lock().await) };
        let _ = self.events.send(ClientEvent::StateChanged(snapshot));
    }

    async fn edit(&self, apply: impl FnOnce(&mut DraftForm)) -> bool {
        let accepted = {
            let mut flow = self.flow.lock().await;
            match flow.draft_mut() {
                Some(draft) => {
                    apply(draft);
                    true
                }
                None => false,
            }
        };
        if accepted {
            self.emit_state().await;
        } else {
            info!("draft edit ignored while the draft is read-only");
        }
        accepted
    }

    pub async fn set_title(&self, title: &str) -> bool {
        self.edit(|draft| draft.set_title(title)).await
    }

    pub async fn set_content(&self, content: &str) -> bool {
        self.edit(|draft| draft.set_content(content)).await
    }

    pub async fn set_media_type(&self, media_type: MediaType) -> bool {
        self.edit(|draft| draft.set_media_type(media_type)).await
    }

    pub async fn set_category(&self, category: Category) -> bool {
        self.edit(|draft| draft.set_category(category)).await
    }

    pub async fn push_etc_field(&self, name: &str, value: &str) -> bool {
        self.edit(|draft| draft.push_etc_field(name, value)).await
    }

    pub async fn update_etc_field(&self, index: usize, name: &str, value: &str) -> bool {
        let mut updated = false;
        let accepted = self
            .edit(|draft| updated = draft.update_etc_field(index, name, value))
            .await;
        accepted && updated
    }

    pub async fn remove_etc_field(&self, index: usize) -> bool {
        let mut removed = false;
        let accepted = self.edit(|draft| removed = draft.remove_etc_field(index)).await;
        accepted && removed
    }

    /// Submits the draft for evaluation: create or update (decided by
    /// identifier presence alone), then the chained evaluate call. A
    /// draft missing required fields is a silent no-op, as is a trigger
    /// while another operation is in flight.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let ticket = {
            let mut flow = self.flow.lock().await;
            match flow.begin_submit() {
                Some(ticket) => ticket,
                None => {
                    info!("draft submit ignored: required fields missing or flow busy");
                    return SubmitOutcome::Ignored;
                }
            }
        };
        self.emit_state().await;

        let draft_id = match &ticket.action {
            SubmitAction::Create(payload) => match self.drafts.create_draft(payload).await {
                Ok(draft_id) => {
                    let recorded = {
                        self.flow
                            .lock()
                            .await
                            .record_created(ticket.generation, draft_id)
                    };
                    if !recorded {
                        info!("draft create completion ignored: authoring session discarded");
                        return SubmitOutcome::Ignored;
                    }
                    info!(draft_id = draft_id.0, "draft created");
                    draft_id
                }
                Err(err) => return self.fail_submit(ticket.generation, "save", err).await,
            },
            SubmitAction::Update(draft_id, payload) => {
                match self.drafts.update_draft(*draft_id, payload).await {
                    Ok(()) => {
                        info!(draft_id = draft_id.0, "draft updated");
                        *draft_id
                    }
                    Err(err) => return self.fail_submit(ticket.generation, "update", err).await,
                }
            }
        };

        match self.drafts.evaluate_draft(draft_id).await {
            Ok(outcome) => {
                let applied = {
                    self.flow
                        .lock()
                        .await
                        .complete_submit(ticket.generation, outcome)
                };
                if !applied {
                    info!("evaluation completion ignored: authoring session discarded");
                    return SubmitOutcome::Ignored;
                }
                self.emit_state().await;
                SubmitOutcome::Evaluated
            }
            Err(err) => self.fail_submit(ticket.generation, "evaluation", err).await,
        }
    }

    async fn fail_submit(&self, generation: u64, stage: &str, err: GatewayError) -> SubmitOutcome {
        let rolled_back = { self.flow.lock().await.fail_submit(generation) };
        if !rolled_back {
            info!("failed {stage} completion ignored: authoring session discarded");
            return SubmitOutcome::Ignored;
        }
        warn!("draft {stage} failed: {err}");
        let _ = self
            .events
            .send(ClientEvent::Error(format!("draft {stage} failed: {err}")));
        self.emit_state().await;
        SubmitOutcome::Failed
    }

    /// Regenerates the summary of an accepted draft. Only legal while
    /// the flow holds a summary; the prior summary is kept when the
    /// call fails.
    pub async fn resummarize(&self) -> SubmitOutcome {
        let ticket = {
            let mut flow = self.flow.lock().await;
            match flow.begin_resummarize() {
                Some(ticket) => ticket,
                None => {
                    info!("resummarize ignored: no accepted summary to regenerate");
                    return SubmitOutcome::Ignored;
                }
            }
        };
        self.emit_state().await;

        match self.drafts.resummarize(ticket.draft_id).await {
            Ok(summary) => {
                let applied = {
                    self.flow
                        .lock()
                        .await
                        .complete_resummarize(ticket.generation, summary)
                };
                if !applied {
                    info!("resummarize completion ignored: authoring session discarded");
                    return SubmitOutcome::Ignored;
                }
                self.emit_state().await;
                SubmitOutcome::Evaluated
            }
            Err(err) => {
                let restored = { self.flow.lock().await.fail_resummarize(ticket.generation) };
                if !restored {
                    info!("failed resummarize completion ignored: authoring session discarded");
                    return SubmitOutcome::Ignored;
                }
                warn!("summary regeneration failed: {err}");
                let _ = self.events.send(ClientEvent::Error(format!(
                    "summary regeneration failed: {err}"
                )));
                self.emit_state().await;
                SubmitOutcome::Failed
            }
        }
    }

    /// Re-opens the draft for editing after feedback, discarding the
    /// evaluation result entirely.
    pub async fn revise_draft(&self) -> bool {
        let revised = { self.flow.lock().await.revise() };
        if revised {
            self.emit_state().await;
        } else {
            info!("revise ignored: no feedback to revise from");
        }
        revised
    }

    /// Abandons the authoring session. A network completion arriving
    /// after this is ignored rather than applied to the fresh draft.
    pub async fn discard_draft(&self) {
        self.flow.lock().await.discard();
        self.emit_state().await;
    }

    /// Draft reference for the creator-matching flow; only an accepted
    /// (summarized) draft may be matched.
    pub async fn matching_reference(&self) -> Option<DraftId> {
        self.flow.lock().await.matching_reference()
    }

    /// Persists the credential carried by a login redirect URL and
    /// returns the sanitized URL for the shell to apply.
    pub async fn bootstrap_from_redirect(&self, raw_url: &str) -> Result<String> {
        let extracted = session::extract_redirect_credential(raw_url)?;
        if let Some(credential) = &extracted.credential {
            self.session.save(credential).await?;
            info!(role = ?credential.role, "session credential stored from login redirect");
        }
        Ok(extracted.sanitized_url)
    }

    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.session.load().await?.is_some())
    }

    pub async fn current_role(&self) -> Result<Option<UserRole>> {
        Ok(self.session.load().await?.map(|credential| credential.role))
    }

    pub async fn signup_creator(&self, signup: &CreatorSignup) -> Result<UserRole, GatewayError> {
        self.accounts.signup_creator(signup).await
    }

    pub async fn signup_product_manager(
        &self,
        signup: &ProductManagerSignup,
    ) -> Result<UserRole, GatewayError> {
        self.accounts.signup_product_manager(signup).await
    }

    /// Ends the remote session, then clears the stored credential and
    /// cached notices. With no stored token this is a local no-op; a
    /// failed remote call leaves the session intact.
    pub async fn logout(&self) -> Result<()> {
        let Some(credential) = self.session.load().await? else {
            warn!("logout requested with no stored access token");
            return Ok(());
        };
        self.accounts
            .logout(&credential.access_token)
            .await
            .context("remote logout failed")?;
        self.session.clear().await?;
        self.session.clear_notices().await?;
        info!("session cleared after logout");
        Ok(())
    }

    pub async fn list_drafts(&self) -> Result<Vec<DraftRecord>, GatewayError> {
        self.accounts.list_drafts().await
    }

    pub async fn recommend_creators(
        &self,
        draft_id: DraftId,
    ) -> Result<Vec<CreatorSummary>, GatewayError> {
        self.matching.recommend_creators(draft_id).await
    }

    pub async fn recommend_drafts(&self) -> Result<Vec<DraftRecord>, GatewayError> {
        self.matching.recommend_drafts().await
    }

    pub async fn list_matches(&self) -> Result<Vec<MatchRecord>, GatewayError> {
        self.matching.list_matches().await
    }

    pub async fn cache_notice(&self, body: &str) -> Result<()> {
        self.session.cache_notice(body).await
    }

    pub async fn notices(&self) -> Result<Vec<String>> {
        self.session.cached_notices().await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
