//! Scribe core: pure generation-session state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, GenerationPayload, NoticeKind};
pub use msg::Msg;
pub use state::{
    ActionKind, AppState, Draft, Epoch, Field, GenerationProgress, RequestFailure, SessionPhase,
    StatusReport,
};
pub use update::{update, WORD_COUNT_DEFAULT, WORD_COUNT_MAX, WORD_COUNT_MIN};
pub use view_model::{AppViewModel, OutputSlotView};
