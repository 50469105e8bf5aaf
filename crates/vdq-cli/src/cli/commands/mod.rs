//! CLI command handlers, one per file.

mod job;
mod serve;
mod status;
mod submit;
mod work;

pub use job::run_job;
pub use serve::run_serve;
pub use status::run_status;
pub use submit::run_submit;
pub use work::run_work;

use tokio::sync::watch;

/// Flips the returned receiver to true on Ctrl-C.
fn shutdown_on_ctrl_c() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(false);
    let signal_tx = tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("interrupt received, shutting down");
                signal_tx.send_replace(true);
            }
            Err(e) => tracing::warn!("cannot listen for Ctrl-C: {}", e),
        }
    });
    (tx, rx)
}
