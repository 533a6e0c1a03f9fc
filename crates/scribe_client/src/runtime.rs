use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use client_logging::client_info;
use tokio_util::sync::CancellationToken;

use crate::poll::{run_poll_loop, ChannelStatusSink, PollSettings};
use crate::{
    ActionKind, ApiError, ClientSettings, Epoch, GenerateRequest, GenerationApi, HttpApi,
    SessionEvent,
};

enum ClientCommand {
    Generate {
        epoch: Epoch,
        action: ActionKind,
        request: GenerateRequest,
    },
    BeginPolling {
        epoch: Epoch,
    },
    Stop,
    ParseOutline {
        outline_text: String,
    },
}

/// Commands in, events out. A dedicated thread owns the tokio runtime, so
/// callers stay synchronous (the driving loop runs on the UI thread).
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: mpsc::Receiver<SessionEvent>,
}

impl ClientHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let api: Arc<dyn GenerationApi> = Arc::new(HttpApi::new(settings)?);
        Ok(Self::with_api(api, PollSettings::default()))
    }

    /// The API seam is injectable so tests can run the runtime against a
    /// mock server with a short poll interval.
    pub fn with_api(api: Arc<dyn GenerationApi>, poll_settings: PollSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel::<SessionEvent>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            // At most one poll token is live; see replace_poll_token.
            let poll_token: Arc<Mutex<Option<CancellationToken>>> = Arc::new(Mutex::new(None));
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                let poll_token = poll_token.clone();
                let poll_settings = poll_settings.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx, &poll_token, &poll_settings)
                        .await;
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn generate(&self, epoch: Epoch, action: ActionKind, request: GenerateRequest) {
        let _ = self.cmd_tx.send(ClientCommand::Generate {
            epoch,
            action,
            request,
        });
    }

    pub fn begin_polling(&self, epoch: Epoch) {
        let _ = self.cmd_tx.send(ClientCommand::BeginPolling { epoch });
    }

    /// Cancels any active poll cycle, then asks the backend to stop.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(ClientCommand::Stop);
    }

    pub fn parse_outline(&self, outline_text: impl Into<String>) {
        let _ = self.cmd_tx.send(ClientCommand::ParseOutline {
            outline_text: outline_text.into(),
        });
    }

    pub fn try_recv(&self) -> Option<SessionEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<SessionEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

/// Cancel-before-replace: the previous poll cycle is cancelled before a new
/// token is handed out, so two loops never run at once.
fn replace_poll_token(slot: &Mutex<Option<CancellationToken>>) -> CancellationToken {
    let token = CancellationToken::new();
    let previous = slot
        .lock()
        .expect("poll token lock")
        .replace(token.clone());
    if let Some(previous) = previous {
        previous.cancel();
    }
    token
}

fn cancel_poll_token(slot: &Mutex<Option<CancellationToken>>) {
    if let Some(token) = slot.lock().expect("poll token lock").take() {
        token.cancel();
    }
}

async fn handle_command(
    api: &dyn GenerationApi,
    command: ClientCommand,
    event_tx: mpsc::Sender<SessionEvent>,
    poll_token: &Mutex<Option<CancellationToken>>,
    poll_settings: &PollSettings,
) {
    match command {
        ClientCommand::Generate {
            epoch,
            action,
            request,
        } => {
            client_info!("generate {} epoch={}", action.endpoint(), epoch);
            let result = api.generate(action, &request).await;
            let _ = event_tx.send(SessionEvent::GenerateFinished {
                epoch,
                action,
                result,
            });
        }
        ClientCommand::BeginPolling { epoch } => {
            client_info!("begin polling epoch={}", epoch);
            let token = replace_poll_token(poll_token);
            let sink = ChannelStatusSink::new(event_tx);
            run_poll_loop(api, epoch, poll_settings, &token, &sink).await;
        }
        ClientCommand::Stop => {
            client_info!("stop requested");
            cancel_poll_token(poll_token);
            let result = api.stop().await;
            let _ = event_tx.send(SessionEvent::StopFinished { result });
        }
        ClientCommand::ParseOutline { outline_text } => {
            let result = api.parse_outline(&outline_text).await;
            let _ = event_tx.send(SessionEvent::OutlineParsed { result });
        }
    }
}
