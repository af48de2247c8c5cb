use std::path::PathBuf;

use clap::Args;
use focuseye_core::activity::{FixedPointer, SamplerConfig};
use focuseye_core::{ChannelSink, Companion, CompanionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Args)]
pub struct RunArgs {
    /// Settings file (defaults to ~/.config/focuseye/settings.toml)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Pointer sampling period in milliseconds
    #[arg(long, default_value_t = 100)]
    sample_ms: u64,
}

/// Reads JSON actions from stdin, one per line, and prints every
/// notification as a JSON line. The headless pointer never moves.
/// Ends on EOF or a `quit` line.
pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::settings_store(args.settings)?;
    let config = CompanionConfig {
        sampler: SamplerConfig {
            interval_ms: args.sample_ms,
        },
        ..Default::default()
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let (sink, mut events) = ChannelSink::new();
        let (companion, handle) = Companion::new(store, FixedPointer::default(), sink, config);
        let driver = tokio::spawn(companion.run());

        let printer = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "could not encode event"),
                }
            }
        });

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "quit" {
                break;
            }
            match serde_json::from_str(line) {
                Ok(action) => {
                    handle.send_action(&action);
                }
                Err(e) => tracing::debug!(error = %e, "ignoring malformed input line"),
            }
        }

        handle.shutdown();
        // Dropping the finished companion closes the event channel.
        drop(driver.await?);
        printer.await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
