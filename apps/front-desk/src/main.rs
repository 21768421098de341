//! # Front Desk Entry Point
//!
//! ```bash
//! front-desk                         # platform config file, if any
//! front-desk --config ./front-desk.toml
//! INNKEEP_PORT=9000 front-desk
//! ```

use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use innkeep_front_desk::state::FrontDeskConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    innkeep_front_desk::init_tracing();

    let config_path = config_arg(std::env::args().skip(1))?;
    let config = FrontDeskConfig::load(config_path.as_deref()).context("loading configuration")?;

    info!(hotel = %config.hotel_name, "Starting Innkeep front desk");
    innkeep_front_desk::run(config).await
}

/// Reads `--config <path>` (or `-c <path>`).
fn config_arg(mut args: impl Iterator<Item = String>) -> anyhow::Result<Option<PathBuf>> {
    let mut path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args.next().context("--config needs a path")?;
                path = Some(PathBuf::from(value));
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(path)
}
