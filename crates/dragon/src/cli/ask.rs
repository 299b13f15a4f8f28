use anyhow::{Context, Result};
use dragon_core::config::Config;
use dragon_core::mode::Mode;
use dragon_core::relay::{RelayRequest, RelayService};

use crate::cli::chat::THINKING;
use crate::cli::ux::GenerationSpinner;

/// Runs one request through the relay logic in-process and prints the reply.
pub async fn execute(input: Vec<String>, mode: Option<Mode>, config: &Config) -> Result<()> {
    let reply = ask(input.join(" "), mode, config).await?;
    println!("{reply}");
    Ok(())
}

async fn ask(input: String, mode: Option<Mode>, config: &Config) -> Result<String> {
    let relay_config = config
        .relay
        .resolve()
        .context("Invalid relay configuration")?;
    let relay = RelayService::new(relay_config);

    let spinner = GenerationSpinner::new(THINKING.to_string());
    let reply = relay.reply(RelayRequest::new(input, mode, vec![])).await;
    spinner.clear();

    Ok(reply?)
}
