//! Scribe client: HTTP access to the generation backend and effect execution.
mod client;
mod poll;
mod runtime;
mod types;

pub use client::{ClientSettings, GenerationApi, HttpApi, CSRF_HEADER};
pub use poll::{run_poll_loop, ChannelStatusSink, PollSettings, StatusSink};
pub use runtime::ClientHandle;
pub use types::{ActionKind, ApiError, Epoch, GenerateRequest, SessionEvent, StatusReport};
