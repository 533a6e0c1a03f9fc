use std::sync::Once;

use scribe_core::{
    update, ActionKind, AppState, Effect, Field, Msg, NoticeKind, RequestFailure, SessionPhase,
    StatusReport,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(client_logging::initialize_for_tests);
}

fn report(progress: f64, section: &str, content: Option<&str>, in_progress: bool) -> StatusReport {
    StatusReport {
        progress,
        current_section: section.to_string(),
        content: content.map(ToOwned::to_owned),
        in_progress,
    }
}

/// Drafted state with the body request already accepted and polling active.
/// Returns the epoch the poll cycle is tagged with.
fn polling_state() -> (AppState, u64) {
    let state = AppState::new();
    let (state, _) = update(
        state,
        Msg::FieldEdited {
            field: Field::Title,
            text: "AI in Education".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::FieldEdited {
            field: Field::Outline,
            text: "1. Introduction\n2. Methods".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::GenerateClicked(ActionKind::Body));
    let epoch = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::StartGeneration { epoch, .. } => Some(*epoch),
            _ => None,
        })
        .expect("StartGeneration effect");
    let (state, effects) = update(
        state,
        Msg::GenerateFinished {
            epoch,
            action: ActionKind::Body,
            result: Ok(String::new()),
        },
    );
    assert!(effects.contains(&Effect::BeginPolling { epoch }));
    (state, epoch)
}

#[test]
fn body_polls_even_when_server_rejects_the_trigger() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(
        state,
        Msg::FieldEdited {
            field: Field::Title,
            text: "T".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::FieldEdited {
            field: Field::Outline,
            text: "1. A".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::GenerateClicked(ActionKind::Body));
    let epoch = match &effects[0] {
        Effect::StartGeneration { epoch, .. } => *epoch,
        other => panic!("unexpected effect {other:?}"),
    };

    let (state, effects) = update(
        state,
        Msg::GenerateFinished {
            epoch,
            action: ActionKind::Body,
            result: Err(RequestFailure::Rejected { message: None }),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::Notify {
                kind: NoticeKind::Danger,
                message: "Generation failed: unknown error".to_string(),
            },
            Effect::BeginPolling { epoch },
        ]
    );
    assert_eq!(state.view().session, SessionPhase::Polling);
    assert!(state.view().stop_enabled);
}

#[test]
fn body_transport_error_does_not_start_polling() {
    init_logging();
    let state = AppState::new();
    let (state, _) = update(
        state,
        Msg::FieldEdited {
            field: Field::Title,
            text: "T".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::FieldEdited {
            field: Field::Outline,
            text: "1. A".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::GenerateClicked(ActionKind::Body));
    let epoch = match &effects[0] {
        Effect::StartGeneration { epoch, .. } => *epoch,
        other => panic!("unexpected effect {other:?}"),
    };

    let (state, effects) = update(
        state,
        Msg::GenerateFinished {
            epoch,
            action: ActionKind::Body,
            result: Err(RequestFailure::Transport {
                message: "network error".to_string(),
            }),
        },
    );

    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::BeginPolling { .. })));
    assert_eq!(state.view().session, SessionPhase::Idle);
}

#[test]
fn status_sequence_updates_progress_then_fills_empty_slot() {
    init_logging();
    let (state, epoch) = polling_state();
    assert_eq!(state.output(ActionKind::Body), "");

    let (state, effects) = update(
        state,
        Msg::StatusReported {
            epoch,
            report: report(0.3, "2. Methods", None, true),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.progress_percent, 30);
    assert_eq!(view.current_section, "2. Methods");
    assert!(view.progress_visible);
    assert_eq!(view.session, SessionPhase::Polling);

    let (mut state, effects) = update(
        state,
        Msg::StatusReported {
            epoch,
            report: report(1.0, "done", Some("X"), false),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.progress_percent, 100);
    assert_eq!(view.session, SessionPhase::Idle);
    assert!(!view.progress_visible);
    assert_eq!(state.output(ActionKind::Body), "X");
    assert!(state.consume_dirty());
}

#[test]
fn final_content_never_overwrites_existing_body() {
    init_logging();
    let (state, epoch) = polling_state();
    let (state, _) = update(
        state,
        Msg::OutputEdited {
            action: ActionKind::Body,
            text: "already here".to_string(),
        },
    );

    let (state, _) = update(
        state,
        Msg::StatusReported {
            epoch,
            report: report(1.0, "done", Some("late content"), false),
        },
    );

    assert_eq!(state.output(ActionKind::Body), "already here");
    assert_eq!(state.view().session, SessionPhase::Idle);
}

#[test]
fn partial_content_mirrors_into_preview() {
    init_logging();
    let (state, epoch) = polling_state();

    let (state, _) = update(
        state,
        Msg::StatusReported {
            epoch,
            report: report(0.5, "3. Results", Some("draft so far"), true),
        },
    );

    assert_eq!(state.view().preview.as_deref(), Some("draft so far"));
    assert_eq!(state.view().session, SessionPhase::Polling);
}

#[test]
fn poll_abort_notifies_and_resets() {
    init_logging();
    let (state, epoch) = polling_state();

    let (state, effects) = update(
        state,
        Msg::PollAborted {
            epoch,
            message: "connection reset".to_string(),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Notify {
            kind: NoticeKind::Danger,
            message: "Status check failed: connection reset".to_string(),
        }]
    );
    assert_eq!(state.view().session, SessionPhase::Idle);
    assert!(state.view().generate_enabled);
}

#[test]
fn stop_mid_poll_resets_immediately() {
    init_logging();
    let (state, _epoch) = polling_state();

    let (state, effects) = update(state, Msg::StopClicked);

    assert_eq!(effects, vec![Effect::StopGeneration]);
    assert_eq!(state.view().session, SessionPhase::Idle);
    assert!(!state.view().stop_enabled);
}

#[test]
fn stop_when_idle_is_a_noop() {
    init_logging();
    let state = AppState::new();

    let (state, effects) = update(state, Msg::StopClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().session, SessionPhase::Idle);
}

#[test]
fn stop_outcome_only_notifies() {
    init_logging();
    let (state, _epoch) = polling_state();
    let (state, _) = update(state, Msg::StopClicked);

    let (state, effects) = update(state, Msg::StopFinished { result: Ok(()) });
    assert_eq!(
        effects,
        vec![Effect::Notify {
            kind: NoticeKind::Info,
            message: "Generation stopped".to_string(),
        }]
    );
    assert_eq!(state.view().session, SessionPhase::Idle);

    let (state, effects) = update(
        state,
        Msg::StopFinished {
            result: Err(RequestFailure::Rejected { message: None }),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::Notify {
            kind: NoticeKind::Warning,
            message: "Stop failed: unknown error".to_string(),
        }]
    );
    assert_eq!(state.view().session, SessionPhase::Idle);
}

#[test]
fn events_from_before_stop_are_discarded() {
    init_logging();
    let (state, stale_epoch) = polling_state();
    let (mut state, _) = update(state, Msg::StopClicked);
    let _ = state.consume_dirty();
    let before = state.clone();

    // A poll tick that was in flight when stop was clicked.
    let (state, effects) = update(
        state,
        Msg::StatusReported {
            epoch: stale_epoch,
            report: report(0.7, "4. Discussion", Some("late"), true),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);

    // The original trigger response arriving even later.
    let (state, effects) = update(
        state,
        Msg::GenerateFinished {
            epoch: stale_epoch,
            action: ActionKind::Body,
            result: Ok("stale body".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.output(ActionKind::Body), "");

    // Same for a failed tick from the cancelled cycle.
    let (state, effects) = update(
        state,
        Msg::PollAborted {
            epoch: stale_epoch,
            message: "cancelled".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().session, SessionPhase::Idle);
}
