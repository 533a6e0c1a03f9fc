use std::time::Duration;

use client_logging::{client_debug, client_trace, client_warn};
use tokio_util::sync::CancellationToken;

use crate::{Epoch, GenerationApi, SessionEvent};

#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Pause between a resolved tick and the next status request.
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

pub trait StatusSink: Send + Sync {
    fn emit(&self, event: SessionEvent);
}

pub struct ChannelStatusSink {
    tx: std::sync::mpsc::Sender<SessionEvent>,
}

impl ChannelStatusSink {
    pub fn new(tx: std::sync::mpsc::Sender<SessionEvent>) -> Self {
        Self { tx }
    }
}

impl StatusSink for ChannelStatusSink {
    fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

/// Suspend-resume status poll: the next tick is scheduled only after the
/// previous tick's response resolves, so ticks never overlap and reports
/// arrive in request order. The loop ends when the backend reports
/// completion, on cancellation, or on the first failed tick; a failed tick
/// is not retried.
pub async fn run_poll_loop(
    api: &dyn GenerationApi,
    epoch: Epoch,
    settings: &PollSettings,
    cancel: &CancellationToken,
    sink: &dyn StatusSink,
) {
    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        client_logging::set_poll_cycle(cycle);

        let report = tokio::select! {
            _ = cancel.cancelled() => {
                client_debug!("poll cancelled during tick {cycle}");
                return;
            }
            result = api.status() => match result {
                Ok(report) => report,
                Err(err) => {
                    client_warn!("status tick {cycle} failed: {err}");
                    sink.emit(SessionEvent::PollFailed { epoch, error: err });
                    return;
                }
            }
        };

        let in_progress = report.in_progress;
        client_trace!(
            "status tick {cycle}: progress={:.2} in_progress={}",
            report.progress,
            in_progress
        );
        sink.emit(SessionEvent::StatusReported { epoch, report });
        if !in_progress {
            client_debug!("generation finished after {cycle} status ticks");
            return;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                client_debug!("poll cancelled after tick {cycle}");
                return;
            }
            _ = tokio::time::sleep(settings.interval) => {}
        }
    }
}
