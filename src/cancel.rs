//! Manual stop
//!
//! [`CancelToken`] is a shared flag the recording loop checks once per
//! iteration. [`install_ctrl_c_handler`] flips it from a helper thread when
//! the user presses Ctrl-C, so the interrupt never lands in the middle of a
//! write.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Exit status used when a second Ctrl-C forces the process down
pub const FORCED_EXIT_CODE: i32 = 130;

/// Cloneable cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not yet cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if a stop was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Cancel `token` on Ctrl-C
///
/// The first interrupt cancels the token and lets the session close
/// normally. A second one exits the process with [`FORCED_EXIT_CODE`];
/// records already appended are on disk at that point.
pub fn install_ctrl_c_handler(token: CancelToken) -> std::io::Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("ctrl-c".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::warn!("Ctrl-C handler unavailable: {}", e);
                    return;
                }
                tracing::info!("Interrupt received, stopping after the current read");
                token.cancel();

                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Second interrupt, exiting immediately");
                    std::process::exit(FORCED_EXIT_CODE);
                }
            });
        })
}
