use crate::{ActionKind, Epoch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue the triggering request for a generation action.
    StartGeneration {
        epoch: Epoch,
        action: ActionKind,
        payload: GenerationPayload,
    },
    /// Start the status poll loop for the long-running body action.
    BeginPolling { epoch: Epoch },
    /// Cancel any active poll cycle and ask the backend to stop generating.
    StopGeneration,
    /// Ask the backend to parse the outline into sections.
    ParseOutline { outline_text: String },
    /// Surface a notification to the user.
    Notify { kind: NoticeKind, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Info,
    Warning,
    Danger,
}

/// Validated inputs for one generation request. Fields that an action does
/// not use stay `None` and are omitted from the wire request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationPayload {
    pub title: String,
    pub outline: Option<String>,
    pub abstract_cn: Option<String>,
    pub keywords_cn: Option<String>,
    pub word_count: Option<u32>,
    pub subject: String,
    pub education_level: String,
    pub custom_prompt: String,
}
