use super::*;
use shared::protocol::FeedbackPayload;

fn fill_required_fields(flow: &mut DraftLifecycle) {
    let draft = flow.draft_mut().expect("draft should be editable");
    draft.set_title("A");
    draft.set_content("B");
    draft.set_media_type(shared::domain::MediaType::Video);
    draft.set_category(shared::domain::Category::Tech);
}

fn summary(title: &str) -> SummaryPayload {
    SummaryPayload {
        title: title.to_string(),
        content: "derived content".to_string(),
        keywords: vec!["x".to_string(), "y".to_string()],
    }
}

fn feedback(comment: &str) -> EvaluationOutcome {
    EvaluationOutcome::Feedback(FeedbackPayload {
        comment: comment.to_string(),
    })
}

/// Drives a fresh flow through create + summary evaluation.
fn accepted_flow() -> DraftLifecycle {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);
    let ticket = flow.begin_submit().expect("submittable");
    assert!(flow.record_created(ticket.generation, DraftId(42)));
    assert!(flow.complete_submit(ticket.generation, EvaluationOutcome::Summary(summary("A2"))));
    flow
}

#[test]
fn incomplete_draft_cannot_begin_submission() {
    let skip_one_field: [fn(&mut DraftForm); 4] = [
        |draft: &mut DraftForm| {
            draft.set_content("B");
            draft.set_media_type(shared::domain::MediaType::Video);
            draft.set_category(shared::domain::Category::Tech);
        },
        |draft: &mut DraftForm| {
            draft.set_title("A");
            draft.set_media_type(shared::domain::MediaType::Video);
            draft.set_category(shared::domain::Category::Tech);
        },
        |draft: &mut DraftForm| {
            draft.set_title("A");
            draft.set_content("B");
            draft.set_category(shared::domain::Category::Tech);
        },
        |draft: &mut DraftForm| {
            draft.set_title("A");
            draft.set_content("B");
            draft.set_media_type(shared::domain::MediaType::Video);
        },
    ];

    for fill in skip_one_field {
        let mut flow = DraftLifecycle::new();
        fill(flow.draft_mut().expect("editable"));
        assert!(flow.begin_submit().is_none());
        assert_eq!(flow.state().tag(), StateTag::Editing);
        assert!(!flow.read_only());
    }
}

#[test]
fn first_submission_is_a_create() {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);

    let ticket = flow.begin_submit().expect("submittable");
    match &ticket.action {
        SubmitAction::Create(payload) => {
            assert_eq!(payload.title, "A");
            assert_eq!(payload.content, "B");
        }
        other => panic!("expected create, got {other:?}"),
    }
    assert_eq!(flow.state().tag(), StateTag::Submitting);
    assert!(flow.read_only());
}

#[test]
fn reentrant_submit_is_rejected_while_in_flight() {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);

    flow.begin_submit().expect("first trigger");
    assert!(flow.begin_submit().is_none());
    assert_eq!(flow.state().tag(), StateTag::Submitting);
}

#[test]
fn summary_variant_routes_to_evaluated_summary() {
    let flow = accepted_flow();

    assert_eq!(flow.state().tag(), StateTag::EvaluatedSummary);
    assert_eq!(flow.draft_id(), Some(DraftId(42)));
    assert!(flow.read_only());
    let stored = flow.summary().expect("summary stored");
    assert_eq!(stored.title, "A2");
    assert_eq!(stored.keywords, vec!["x", "y"]);
    assert!(flow.feedback().is_none());
}

#[test]
fn feedback_variant_routes_to_evaluated_feedback() {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);
    let ticket = flow.begin_submit().expect("submittable");
    assert!(flow.record_created(ticket.generation, DraftId(42)));
    assert!(flow.complete_submit(ticket.generation, feedback("needs more detail")));

    assert_eq!(flow.state().tag(), StateTag::EvaluatedFeedback);
    assert!(flow.read_only());
    assert_eq!(flow.feedback(), Some("needs more detail"));
    assert!(flow.summary().is_none());
    assert!(flow.matching_reference().is_none());
}

#[test]
fn failed_evaluation_rolls_back_but_keeps_the_assigned_id() {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);
    let ticket = flow.begin_submit().expect("submittable");
    assert!(flow.record_created(ticket.generation, DraftId(42)));

    assert!(flow.fail_submit(ticket.generation));
    assert_eq!(flow.state().tag(), StateTag::Editing);
    assert!(!flow.read_only());
    assert_eq!(flow.draft_id(), Some(DraftId(42)));
    assert!(flow.summary().is_none());
    assert!(flow.feedback().is_none());

    // The retry must address the record that already exists server-side.
    let retry = flow.begin_submit().expect("retry");
    match retry.action {
        SubmitAction::Update(draft_id, _) => assert_eq!(draft_id, DraftId(42)),
        other => panic!("expected update, got {other:?}"),
    }
}

#[test]
fn identifier_is_immutable_once_assigned() {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);
    let ticket = flow.begin_submit().expect("submittable");

    assert!(flow.record_created(ticket.generation, DraftId(42)));
    assert!(flow.record_created(ticket.generation, DraftId(99)));
    assert_eq!(flow.draft_id(), Some(DraftId(42)));
}

#[test]
fn resummarize_is_only_legal_from_an_accepted_summary() {
    let mut editing = DraftLifecycle::new();
    fill_required_fields(&mut editing);
    assert!(editing.begin_resummarize().is_none());

    let mut after_feedback = DraftLifecycle::new();
    fill_required_fields(&mut after_feedback);
    let ticket = after_feedback.begin_submit().expect("submittable");
    assert!(after_feedback.record_created(ticket.generation, DraftId(7)));
    assert!(after_feedback.complete_submit(ticket.generation, feedback("rework")));
    assert!(after_feedback.begin_resummarize().is_none());
    assert_eq!(after_feedback.state().tag(), StateTag::EvaluatedFeedback);

    let mut accepted = accepted_flow();
    let ticket = accepted.begin_resummarize().expect("legal from summary");
    assert_eq!(ticket.draft_id, DraftId(42));
    assert_eq!(accepted.state().tag(), StateTag::Resummarizing);
    // Re-entrant trigger while the call is outstanding.
    assert!(accepted.begin_resummarize().is_none());
}

#[test]
fn resummarize_replaces_the_summary_wholesale() {
    let mut flow = accepted_flow();

    let ticket = flow.begin_resummarize().expect("legal");
    assert!(flow.complete_resummarize(ticket.generation, summary("A3")));
    assert_eq!(flow.state().tag(), StateTag::EvaluatedSummary);
    assert_eq!(flow.summary().expect("summary").title, "A3");
}

#[test]
fn failed_resummarize_restores_the_prior_summary() {
    let mut flow = accepted_flow();

    let ticket = flow.begin_resummarize().expect("legal");
    assert!(flow.fail_resummarize(ticket.generation));
    assert_eq!(flow.state().tag(), StateTag::EvaluatedSummary);
    assert_eq!(flow.summary().expect("summary").title, "A2");
}

#[test]
fn revise_discards_the_evaluation_entirely() {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);
    let ticket = flow.begin_submit().expect("submittable");
    assert!(flow.record_created(ticket.generation, DraftId(42)));
    assert!(flow.complete_submit(ticket.generation, feedback("needs more detail")));

    assert!(flow.revise());
    assert_eq!(flow.state().tag(), StateTag::Editing);
    assert!(!flow.read_only());
    assert!(flow.feedback().is_none());
    assert!(flow.summary().is_none());
    // The draft fields survive the revision.
    assert_eq!(flow.draft().title(), "A");

    // Revise has no meaning outside the feedback state.
    assert!(!flow.revise());
    let mut accepted = accepted_flow();
    assert!(!accepted.revise());
}

#[test]
fn edits_are_rejected_outside_editing() {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);
    flow.begin_submit().expect("submittable");

    assert!(flow.draft_mut().is_none());
    assert!(flow.read_only());
}

#[test]
fn matching_reference_requires_an_accepted_summary() {
    let mut editing = DraftLifecycle::new();
    fill_required_fields(&mut editing);
    assert!(editing.matching_reference().is_none());

    let accepted = accepted_flow();
    assert_eq!(accepted.matching_reference(), Some(DraftId(42)));
}

#[test]
fn stale_submit_completions_are_ignored_after_discard() {
    let mut flow = DraftLifecycle::new();
    fill_required_fields(&mut flow);
    let ticket = flow.begin_submit().expect("submittable");

    flow.discard();
    assert_eq!(flow.state().tag(), StateTag::Editing);
    assert!(flow.draft_id().is_none());
    assert_eq!(flow.draft().title(), "");

    assert!(!flow.record_created(ticket.generation, DraftId(42)));
    assert!(!flow.complete_submit(ticket.generation, EvaluationOutcome::Summary(summary("A2"))));
    assert!(!flow.fail_submit(ticket.generation));
    assert!(flow.draft_id().is_none());
    assert!(flow.summary().is_none());
}

#[test]
fn stale_resummarize_completions_are_ignored_after_discard() {
    let mut flow = accepted_flow();
    let ticket = flow.begin_resummarize().expect("legal");

    flow.discard();
    assert!(!flow.complete_resummarize(ticket.generation, summary("A3")));
    assert!(!flow.fail_resummarize(ticket.generation));
    assert_eq!(flow.state().tag(), StateTag::Editing);
    assert!(flow.summary().is_none());
}
