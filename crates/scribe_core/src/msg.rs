use crate::{ActionKind, Epoch, Field, RequestFailure, StatusReport};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited a draft input field.
    FieldEdited { field: Field, text: String },
    /// User edited the custom prompt for one action.
    CustomPromptEdited { action: ActionKind, text: String },
    /// User edited the content of an output slot directly.
    OutputEdited { action: ActionKind, text: String },
    /// Restore previously generated outputs from a persisted manuscript.
    RestoreOutputs(Vec<(ActionKind, String)>),
    /// User triggered a generation action.
    GenerateClicked(ActionKind),
    /// The triggering request for an action resolved.
    GenerateFinished {
        epoch: Epoch,
        action: ActionKind,
        result: Result<String, RequestFailure>,
    },
    /// One status poll tick resolved.
    StatusReported { epoch: Epoch, report: StatusReport },
    /// A status poll tick failed and the poll loop has stopped.
    PollAborted { epoch: Epoch, message: String },
    /// User clicked Stop.
    StopClicked,
    /// The backend answered the stop request.
    StopFinished {
        result: Result<(), RequestFailure>,
    },
    /// User asked for the outline to be parsed.
    OutlineParseClicked,
    /// The outline parse request resolved with a leaf-section count.
    OutlineParsed {
        result: Result<u64, RequestFailure>,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
