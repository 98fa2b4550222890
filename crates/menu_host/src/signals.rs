//! Shutdown signal handling.

use tokio::signal;
use tracing::info;

/// Resolves once a termination signal arrives (SIGINT or SIGTERM on Unix, Ctrl+C on
/// Windows).
pub async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
        }
    }

    #[cfg(windows)]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
