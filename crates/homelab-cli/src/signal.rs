//! Ctrl-C / SIGTERM wiring.
//!
//! The provisioner is synchronous, so signals are awaited on a helper thread
//! running a single-threaded tokio runtime. The first signal sets the run's
//! [`CancellationFlag`]; the run stops at the next service boundary and rolls
//! back. A second signal exits immediately.

use anyhow::Context as _;
use tokio::signal;
use tracing::{error, warn};

use homelab_core::prelude::CancellationFlag;

/// Exit status for a forced second interrupt.
const FORCED_EXIT: i32 = 130;

/// Start listening for shutdown signals on behalf of `flag`.
pub fn spawn_cancel_listener(flag: CancellationFlag) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    std::thread::Builder::new()
        .name("homelab-signals".into())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = shutdown_signal().await {
                    error!(error = %e, "Signal handler unavailable; Ctrl-C will not roll back");
                    return;
                }
                warn!("Interrupt received, stopping after the current step and rolling back");
                flag.cancel();

                if shutdown_signal().await.is_ok() {
                    error!("Second interrupt received, exiting without rollback");
                    std::process::exit(FORCED_EXIT);
                }
            });
        })
        .context("Failed to spawn signal thread")?;

    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())?
            .recv()
            .await;
        Ok::<(), std::io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<()>>();

    tokio::select! {
        result = signal::ctrl_c() => result,
        result = terminate => result,
    }
}
