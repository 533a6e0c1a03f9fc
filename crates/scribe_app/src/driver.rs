use std::time::{Duration, Instant};

use client_logging::client_info;
use scribe_client::{ApiError, ClientHandle, SessionEvent};
use scribe_core::{update, AppState, Effect, GenerationPayload, Msg, RequestFailure, StatusReport};

use crate::render;

/// Runs core effects against the client runtime and feeds its events back
/// into the state machine.
pub struct Driver {
    state: AppState,
    client: ClientHandle,
}

impl Driver {
    pub fn new(state: AppState, client: ClientHandle) -> Self {
        Self { state, client }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Applies a message and runs its effects without rendering. Used while
    /// seeding the state from a manuscript.
    pub fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.run_effects(effects);
    }

    /// Discards the dirty flag accumulated while seeding, so the first
    /// render reflects the first real action instead.
    pub fn consume_seed_render(&mut self) {
        let _ = self.state.consume_dirty();
    }

    /// Applies a message, runs its effects, and re-renders when the view
    /// changed.
    pub fn dispatch(&mut self, msg: Msg) {
        self.apply(msg);
        if self.state.consume_dirty() {
            render::render(&self.state.view());
        }
    }

    /// Pumps client events until the session returns to idle, then drains
    /// any stragglers (such as the stop outcome). Returns false when the
    /// deadline passes first.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.state.is_busy() {
            match self.client.recv_timeout(Duration::from_millis(100)) {
                Some(event) => self.dispatch(map_event(event)),
                None => {
                    if Instant::now() >= deadline {
                        return false;
                    }
                }
            }
        }
        while let Some(event) = self.client.try_recv() {
            self.dispatch(map_event(event));
        }
        true
    }

    /// Waits for a single client event and dispatches it. Used for requests
    /// that never make the session busy, like outline parsing.
    pub fn pump_one(&mut self, timeout: Duration) -> bool {
        match self.client.recv_timeout(timeout) {
            Some(event) => {
                self.dispatch(map_event(event));
                true
            }
            None => false,
        }
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartGeneration {
                    epoch,
                    action,
                    payload,
                } => {
                    let action = map_action(action);
                    client_info!("start {} epoch={}", action.endpoint(), epoch);
                    self.client.generate(epoch, action, map_payload(payload));
                }
                Effect::BeginPolling { epoch } => self.client.begin_polling(epoch),
                Effect::StopGeneration => self.client.stop(),
                Effect::ParseOutline { outline_text } => self.client.parse_outline(outline_text),
                Effect::Notify { kind, message } => render::notice(kind, &message),
            }
        }
    }
}

fn map_action(action: scribe_core::ActionKind) -> scribe_client::ActionKind {
    match action {
        scribe_core::ActionKind::AbstractCn => scribe_client::ActionKind::AbstractCn,
        scribe_core::ActionKind::KeywordsCn => scribe_client::ActionKind::KeywordsCn,
        scribe_core::ActionKind::AbstractEn => scribe_client::ActionKind::AbstractEn,
        scribe_core::ActionKind::KeywordsEn => scribe_client::ActionKind::KeywordsEn,
        scribe_core::ActionKind::Body => scribe_client::ActionKind::Body,
        scribe_core::ActionKind::References => scribe_client::ActionKind::References,
        scribe_core::ActionKind::Acknowledgement => scribe_client::ActionKind::Acknowledgement,
    }
}

fn map_action_back(action: scribe_client::ActionKind) -> scribe_core::ActionKind {
    match action {
        scribe_client::ActionKind::AbstractCn => scribe_core::ActionKind::AbstractCn,
        scribe_client::ActionKind::KeywordsCn => scribe_core::ActionKind::KeywordsCn,
        scribe_client::ActionKind::AbstractEn => scribe_core::ActionKind::AbstractEn,
        scribe_client::ActionKind::KeywordsEn => scribe_core::ActionKind::KeywordsEn,
        scribe_client::ActionKind::Body => scribe_core::ActionKind::Body,
        scribe_client::ActionKind::References => scribe_core::ActionKind::References,
        scribe_client::ActionKind::Acknowledgement => scribe_core::ActionKind::Acknowledgement,
    }
}

fn map_payload(payload: GenerationPayload) -> scribe_client::GenerateRequest {
    scribe_client::GenerateRequest {
        title: payload.title,
        outline: payload.outline,
        abstract_cn: payload.abstract_cn,
        keywords_cn: payload.keywords_cn,
        word_count: payload.word_count,
        subject: payload.subject,
        education_level: payload.education_level,
        custom_prompt: payload.custom_prompt,
    }
}

fn map_failure(error: ApiError) -> RequestFailure {
    match error {
        ApiError::Rejected { message } => RequestFailure::Rejected { message },
        other => RequestFailure::Transport {
            message: other.to_string(),
        },
    }
}

fn map_report(report: scribe_client::StatusReport) -> StatusReport {
    StatusReport {
        progress: report.progress,
        current_section: report.current_section,
        content: report.content,
        in_progress: report.in_progress,
    }
}

fn map_event(event: SessionEvent) -> Msg {
    match event {
        SessionEvent::GenerateFinished {
            epoch,
            action,
            result,
        } => Msg::GenerateFinished {
            epoch,
            action: map_action_back(action),
            result: result.map_err(map_failure),
        },
        SessionEvent::StatusReported { epoch, report } => Msg::StatusReported {
            epoch,
            report: map_report(report),
        },
        SessionEvent::PollFailed { epoch, error } => Msg::PollAborted {
            epoch,
            message: error.to_string(),
        },
        SessionEvent::StopFinished { result } => Msg::StopFinished {
            result: result.map_err(map_failure),
        },
        SessionEvent::OutlineParsed { result } => Msg::OutlineParsed {
            result: result.map_err(map_failure),
        },
    }
}
