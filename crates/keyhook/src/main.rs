//! keyhook command-line entry point.
//!
//! Prints every captured key event to stdout, one per line, as text or JSON.
//! Log output goes to stderr.
//!
//! ```text
//! main()
//!  └─ load_config()                 -- %APPDATA%\keyhook\config.toml, written with defaults on first run
//!  └─ KeyboardCapture::create()     -- hook thread + dispatcher task
//!  └─ event loop
//!       ├─ Ctrl+Break  → pause / resume
//!       ├─ heartbeat   → "still listening" while enabled
//!       ├─ Ctrl+C      → shut down
//!       └─ capture ended on its own (hook failure) → exit with error
//! ```

use tracing::warn;
use tracing_subscriber::EnvFilter;

use keyhook::infrastructure::storage::config::{load_config, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, config_error) = match load_config() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Initialise structured logging.  `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level)),
        )
        .init();

    if let Some(e) = config_error {
        warn!("using default configuration: {e}");
    }

    run(config).await
}

#[cfg(target_os = "windows")]
async fn run(config: AppConfig) -> anyhow::Result<()> {
    use keyhook::infrastructure::hook_thread::windows::WindowsHookPlatform;
    use keyhook::infrastructure::output::{heartbeat_timer, EventPrinter};
    use keyhook::{KeyboardCapture, StopReason};
    use tokio::signal::windows::ctrl_break;
    use tokio::sync::oneshot;
    use tokio::time::Interval;
    use tracing::info;

    async fn next_heartbeat(heartbeat: &mut Option<Interval>) {
        match heartbeat {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }

    let (stop_tx, mut stop_rx) = oneshot::channel();
    let printer = EventPrinter::new(std::io::stdout(), config.output.format).with_stop_notifier(stop_tx);
    let capture = KeyboardCapture::create(
        WindowsHookPlatform::new(),
        printer,
        config.capture.to_options(),
    )?;
    if !config.capture.start_enabled {
        capture.resume();
    }

    let mut toggle = ctrl_break()?;
    let mut heartbeat = config.output.heartbeat_interval().map(heartbeat_timer);

    info!("Press Ctrl+Break to toggle listening, Ctrl+C to exit");

    loop {
        tokio::select! {
            _ = toggle.recv() => {
                if capture.is_enabled() {
                    info!("pausing keyboard events");
                    capture.pause();
                } else {
                    info!("resuming keyboard events");
                    capture.resume();
                }
            }
            _ = next_heartbeat(&mut heartbeat) => {
                if capture.is_enabled() {
                    info!(
                        queued = capture.queued_events(),
                        dropped = capture.dropped_events(),
                        "still listening..."
                    );
                }
            }
            reason = &mut stop_rx => {
                if let Ok(StopReason::HookFailed(e)) = reason {
                    anyhow::bail!("keyboard capture ended: {e}");
                }
                anyhow::bail!("keyboard capture ended unexpectedly");
            }
            result = tokio::signal::ctrl_c() => {
                result?;
                info!("shutdown signal received");
                break;
            }
        }
    }

    capture.shutdown().await;
    Ok(())
}

#[cfg(not(target_os = "windows"))]
async fn run(_config: AppConfig) -> anyhow::Result<()> {
    anyhow::bail!("keyhook captures keyboard input through a Windows low-level hook and only runs on Windows")
}
