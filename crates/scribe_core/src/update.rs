use crate::{
    ActionKind, AppState, Effect, GenerationPayload, Msg, NoticeKind, RequestFailure, SessionPhase,
};

/// Used when the word-count input is absent or not a number.
pub const WORD_COUNT_DEFAULT: u32 = 3000;
pub const WORD_COUNT_MIN: u32 = 1000;
pub const WORD_COUNT_MAX: u32 = 20000;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FieldEdited { field, text } => {
            state.set_field(field, text);
            Vec::new()
        }
        Msg::CustomPromptEdited { action, text } => {
            state.set_custom_prompt(action, text);
            Vec::new()
        }
        Msg::OutputEdited { action, text } => {
            state.set_output(action, text);
            Vec::new()
        }
        Msg::RestoreOutputs(outputs) => {
            for (action, content) in outputs {
                state.set_output(action, content);
            }
            Vec::new()
        }
        Msg::GenerateClicked(action) => start_generation(&mut state, action),
        Msg::GenerateFinished {
            epoch,
            action,
            result,
        } => {
            // A response from before the last stop (or from a superseded
            // action) must not mutate the session.
            if !state.is_current(epoch) {
                return (state, Vec::new());
            }
            let mut effects = Vec::new();
            let mut transport_failed = false;
            match result {
                Ok(content) => {
                    state.set_output(action, content);
                    effects.push(notify(
                        NoticeKind::Success,
                        format!("{} generated", action.display_name()),
                    ));
                }
                Err(RequestFailure::Rejected { message }) => {
                    let message = message.unwrap_or_else(|| "unknown error".to_string());
                    effects.push(notify(
                        NoticeKind::Danger,
                        format!("Generation failed: {message}"),
                    ));
                }
                Err(RequestFailure::Transport { message }) => {
                    transport_failed = true;
                    effects.push(notify(
                        NoticeKind::Danger,
                        format!("Request failed: {message}"),
                    ));
                }
            }
            // The body response only acknowledges acceptance, so polling
            // follows it whether the server said yes or no. A transport
            // failure means the job may never have started; no poll then.
            if action.is_long_running() && !transport_failed {
                state.begin_polling();
                effects.push(Effect::BeginPolling { epoch });
            } else {
                state.reset_to_idle();
            }
            effects
        }
        Msg::StatusReported { epoch, report } => {
            if !state.is_current(epoch) {
                return (state, Vec::new());
            }
            state.apply_status(&report);
            if !report.in_progress {
                if let Some(content) = report.content {
                    state.fill_body_if_empty(content);
                }
                state.reset_to_idle();
            }
            Vec::new()
        }
        Msg::PollAborted { epoch, message } => {
            if !state.is_current(epoch) {
                return (state, Vec::new());
            }
            state.reset_to_idle();
            vec![notify(
                NoticeKind::Danger,
                format!("Status check failed: {message}"),
            )]
        }
        Msg::StopClicked => {
            if state.phase() == SessionPhase::Idle {
                return (state, Vec::new());
            }
            // Invalidate before resetting: whatever is still in flight now
            // carries a stale epoch and gets discarded on arrival.
            state.invalidate();
            state.reset_to_idle();
            vec![Effect::StopGeneration]
        }
        Msg::StopFinished { result } => {
            // The session went idle when stop was clicked; the backend's
            // answer is informational only.
            let effect = match result {
                Ok(()) => notify(NoticeKind::Info, "Generation stopped".to_string()),
                Err(RequestFailure::Rejected { message }) => notify(
                    NoticeKind::Warning,
                    format!(
                        "Stop failed: {}",
                        message.unwrap_or_else(|| "unknown error".to_string())
                    ),
                ),
                Err(RequestFailure::Transport { message }) => {
                    notify(NoticeKind::Danger, format!("Request failed: {message}"))
                }
            };
            vec![effect]
        }
        Msg::OutlineParseClicked => {
            let outline = state.draft().outline.trim().to_string();
            if outline.is_empty() {
                vec![notify(
                    NoticeKind::Danger,
                    "Enter a paper outline first".to_string(),
                )]
            } else {
                vec![Effect::ParseOutline {
                    outline_text: outline,
                }]
            }
        }
        Msg::OutlineParsed { result } => match result {
            Ok(section_count) => {
                state.set_outline_sections(section_count);
                vec![notify(
                    NoticeKind::Success,
                    format!("Outline parsed: {section_count} leaf sections to generate"),
                )]
            }
            Err(RequestFailure::Rejected { message }) => vec![notify(
                NoticeKind::Danger,
                format!(
                    "Outline parsing failed: {}",
                    message.unwrap_or_else(|| "unknown error".to_string())
                ),
            )],
            Err(RequestFailure::Transport { message }) => vec![notify(
                NoticeKind::Danger,
                format!("Request failed: {message}"),
            )],
        },
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn start_generation(state: &mut AppState, action: ActionKind) -> Vec<Effect> {
    // One job at a time: no queuing, no overlap.
    if state.is_busy() {
        return vec![notify(
            NoticeKind::Warning,
            "A generation task is already running; wait for it or press stop".to_string(),
        )];
    }

    let mut effects = Vec::new();
    let payload = match build_payload(state, action, &mut effects) {
        Some(payload) => payload,
        None => return effects,
    };

    let epoch = state.begin_request(action);
    effects.push(Effect::StartGeneration {
        epoch,
        action,
        payload,
    });
    effects
}

/// Validates the draft for one action and assembles its request payload.
/// Pushes a danger notice and returns `None` when a required field is
/// missing; the session stays idle in that case.
fn build_payload(
    state: &AppState,
    action: ActionKind,
    effects: &mut Vec<Effect>,
) -> Option<GenerationPayload> {
    let draft = state.draft();
    let title = draft.title.trim();
    if title.is_empty() {
        effects.push(notify(
            NoticeKind::Danger,
            "Enter a paper title first".to_string(),
        ));
        return None;
    }

    let mut payload = GenerationPayload {
        title: title.to_string(),
        subject: draft.subject.clone(),
        education_level: draft.education_level.clone(),
        custom_prompt: state.custom_prompt(action).trim().to_string(),
        ..GenerationPayload::default()
    };

    match action {
        ActionKind::AbstractCn | ActionKind::Body => {
            let outline = draft.outline.trim();
            if outline.is_empty() {
                effects.push(notify(
                    NoticeKind::Danger,
                    "Enter a paper outline first".to_string(),
                ));
                return None;
            }
            payload.outline = Some(outline.to_string());
        }
        ActionKind::KeywordsCn | ActionKind::AbstractEn => {
            let abstract_cn = state.output(ActionKind::AbstractCn).trim();
            if abstract_cn.is_empty() {
                effects.push(notify(
                    NoticeKind::Danger,
                    "Generate or enter the Chinese abstract first".to_string(),
                ));
                return None;
            }
            payload.abstract_cn = Some(abstract_cn.to_string());
        }
        ActionKind::KeywordsEn => {
            let keywords_cn = state.output(ActionKind::KeywordsCn).trim();
            if keywords_cn.is_empty() {
                effects.push(notify(
                    NoticeKind::Danger,
                    "Generate or enter the Chinese keywords first".to_string(),
                ));
                return None;
            }
            payload.keywords_cn = Some(keywords_cn.to_string());
        }
        ActionKind::References | ActionKind::Acknowledgement => {}
    }

    if action == ActionKind::Body {
        let (word_count, clamped) = resolve_word_count(&draft.word_count);
        if clamped {
            effects.push(notify(
                NoticeKind::Warning,
                format!(
                    "Word count should be between {WORD_COUNT_MIN} and {WORD_COUNT_MAX}; adjusted automatically"
                ),
            ));
        }
        payload.word_count = Some(word_count);
    }

    Some(payload)
}

/// Absent or non-numeric input falls back to the default without a warning;
/// an out-of-range number is clamped and reported.
fn resolve_word_count(raw: &str) -> (u32, bool) {
    let requested = raw.trim().parse::<u32>().unwrap_or(WORD_COUNT_DEFAULT);
    let clamped = requested.clamp(WORD_COUNT_MIN, WORD_COUNT_MAX);
    (clamped, clamped != requested)
}

fn notify(kind: NoticeKind, message: String) -> Effect {
    Effect::Notify { kind, message }
}
