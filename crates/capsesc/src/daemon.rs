//! The event loop.
//!
//! The loop is the only place that mutates Caps Lock state: it pulls one
//! event from the multiplexer, runs it through the use case to completion
//! (including any Escape write), and only then pulls the next one.

use std::future::Future;

use tracing::{info, warn};

use crate::application::remap_caps::RemapCapsUseCase;
use crate::infrastructure::multiplexer::{EventMultiplexer, MuxEvent};

/// Why [`run_event_loop`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The shutdown future resolved.
    Signal,
    /// Every keyboard was retired.
    SourcesExhausted,
}

/// Runs until `shutdown` resolves or no keyboard is left.
///
/// Recoverable errors from the use case are logged and the event is dropped.
pub async fn run_event_loop<F>(
    mux: &mut EventMultiplexer,
    use_case: &mut RemapCapsUseCase,
    shutdown: F,
) -> LoopExit
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => return LoopExit::Signal,

            event = mux.next() => match event {
                Some(MuxEvent::Record { record, .. }) => {
                    if let Err(e) = use_case.handle_record(&record) {
                        warn!(error = %e, "event dropped");
                    }
                }
                Some(MuxEvent::Closed { .. }) if mux.live_sources() > 0 => {}
                Some(MuxEvent::Closed { .. }) | None => {
                    warn!("no keyboards left to read");
                    return LoopExit::SourcesExhausted;
                }
            },
        }
    }
}

/// Resolves on SIGINT or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "cannot listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("SIGINT received"),
        _ = terminate => info!("SIGTERM received"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
