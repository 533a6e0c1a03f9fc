use std::collections::BTreeMap;

use crate::view_model::{AppViewModel, OutputSlotView};

pub type Epoch = u64;

/// One generation action the backend knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionKind {
    AbstractCn,
    KeywordsCn,
    AbstractEn,
    KeywordsEn,
    Body,
    References,
    Acknowledgement,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::AbstractCn,
        ActionKind::KeywordsCn,
        ActionKind::AbstractEn,
        ActionKind::KeywordsEn,
        ActionKind::Body,
        ActionKind::References,
        ActionKind::Acknowledgement,
    ];

    /// Label shown while the action is in flight.
    pub fn operation_label(self) -> &'static str {
        match self {
            ActionKind::AbstractCn => "Generating Chinese abstract...",
            ActionKind::KeywordsCn => "Generating Chinese keywords...",
            ActionKind::AbstractEn => "Generating English abstract...",
            ActionKind::KeywordsEn => "Generating English keywords...",
            ActionKind::Body => "Generating paper body...",
            ActionKind::References => "Generating references...",
            ActionKind::Acknowledgement => "Generating acknowledgement...",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ActionKind::AbstractCn => "Chinese abstract",
            ActionKind::KeywordsCn => "Chinese keywords",
            ActionKind::AbstractEn => "English abstract",
            ActionKind::KeywordsEn => "English keywords",
            ActionKind::Body => "Paper body",
            ActionKind::References => "References",
            ActionKind::Acknowledgement => "Acknowledgement",
        }
    }

    /// The body action's immediate response only acknowledges acceptance;
    /// completion is observed through the status poll.
    pub fn is_long_running(self) -> bool {
        matches!(self, ActionKind::Body)
    }
}

/// Draft input fields edited by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Outline,
    Subject,
    EducationLevel,
    WordCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Draft {
    pub title: String,
    pub outline: String,
    pub subject: String,
    pub education_level: String,
    /// Raw word-count input; parsed and clamped when the body action starts.
    pub word_count: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    /// The triggering request for an action is awaiting its response.
    Requesting(ActionKind),
    /// The body status poll loop is active.
    Polling,
}

/// Why a request did not produce content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// The server answered with `success == false`.
    Rejected { message: Option<String> },
    /// The request never produced a usable response.
    Transport { message: String },
}

/// One observation of the backend's generation status.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Completion fraction in `0.0..=1.0`.
    pub progress: f64,
    pub current_section: String,
    pub content: Option<String>,
    pub in_progress: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationProgress {
    pub percent: u8,
    pub current_section: String,
    pub preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    draft: Draft,
    custom_prompts: BTreeMap<ActionKind, String>,
    outputs: BTreeMap<ActionKind, String>,
    phase: SessionPhase,
    epoch: Epoch,
    progress: GenerationProgress,
    outline_sections: Option<u64>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let busy = self.phase != SessionPhase::Idle;
        AppViewModel {
            session: self.phase,
            operation_label: match self.phase {
                SessionPhase::Idle => None,
                SessionPhase::Requesting(action) => Some(action.operation_label()),
                SessionPhase::Polling => Some(ActionKind::Body.operation_label()),
            },
            generate_enabled: !busy,
            stop_enabled: busy,
            progress_visible: self.phase == SessionPhase::Polling,
            progress_percent: self.progress.percent,
            current_section: self.progress.current_section.clone(),
            preview: self.progress.preview.clone(),
            outputs: self
                .outputs
                .iter()
                .map(|(action, content)| OutputSlotView {
                    action: *action,
                    content: content.clone(),
                })
                .collect(),
            outline_sections: self.outline_sections,
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn is_busy(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn custom_prompt(&self, action: ActionKind) -> &str {
        self.custom_prompts
            .get(&action)
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn output(&self, action: ActionKind) -> &str {
        self.outputs.get(&action).map(String::as_str).unwrap_or("")
    }

    /// Returns the dirty flag and clears it. The render loop skips work
    /// when nothing changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn is_current(&self, epoch: Epoch) -> bool {
        self.epoch == epoch
    }

    pub(crate) fn set_field(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Title => &mut self.draft.title,
            Field::Outline => &mut self.draft.outline,
            Field::Subject => &mut self.draft.subject,
            Field::EducationLevel => &mut self.draft.education_level,
            Field::WordCount => &mut self.draft.word_count,
        };
        if *slot != text {
            *slot = text;
            self.dirty = true;
        }
    }

    pub(crate) fn set_custom_prompt(&mut self, action: ActionKind, text: String) {
        self.custom_prompts.insert(action, text);
        self.dirty = true;
    }

    pub(crate) fn set_output(&mut self, action: ActionKind, content: String) {
        self.outputs.insert(action, content);
        self.dirty = true;
    }

    /// Fills the body slot from the final poll content, but never overwrites
    /// content that is already present.
    pub(crate) fn fill_body_if_empty(&mut self, content: String) {
        if self.output(ActionKind::Body).is_empty() && !content.is_empty() {
            self.set_output(ActionKind::Body, content);
        }
    }

    /// Accepts a new action: bumps the epoch and enters `Requesting`.
    pub(crate) fn begin_request(&mut self, action: ActionKind) -> Epoch {
        self.epoch += 1;
        self.phase = SessionPhase::Requesting(action);
        if action.is_long_running() {
            self.progress = GenerationProgress::default();
        }
        self.dirty = true;
        self.epoch
    }

    pub(crate) fn begin_polling(&mut self) {
        self.phase = SessionPhase::Polling;
        self.dirty = true;
    }

    /// Bumps the epoch without starting anything, so every in-flight
    /// response and poll tick becomes stale.
    pub(crate) fn invalidate(&mut self) -> Epoch {
        self.epoch += 1;
        self.epoch
    }

    pub(crate) fn reset_to_idle(&mut self) {
        self.phase = SessionPhase::Idle;
        self.dirty = true;
    }

    pub(crate) fn apply_status(&mut self, report: &StatusReport) {
        let percent = (report.progress * 100.0).round().clamp(0.0, 100.0) as u8;
        self.progress.percent = percent;
        self.progress.current_section = report.current_section.clone();
        if let Some(content) = &report.content {
            self.progress.preview = Some(content.clone());
        }
        self.dirty = true;
    }

    pub(crate) fn set_outline_sections(&mut self, count: u64) {
        self.outline_sections = Some(count);
        self.dirty = true;
    }
}
