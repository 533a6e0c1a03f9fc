use crate::{ActionKind, SessionPhase};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionPhase,
    pub operation_label: Option<&'static str>,
    pub generate_enabled: bool,
    pub stop_enabled: bool,
    pub progress_visible: bool,
    pub progress_percent: u8,
    pub current_section: String,
    pub preview: Option<String>,
    pub outputs: Vec<OutputSlotView>,
    pub outline_sections: Option<u64>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSlotView {
    pub action: ActionKind,
    pub content: String,
}
