// Entrypoint for the CLI application.
// - Keeps `main` small: load config, build the client, hand over to `ui`.
// - Returns `anyhow::Result` so config and terminal failures surface with
//   context; search failures are reported by `ui` itself.

use anyhow::Context;
use pexels_cli::{api::ApiClient, config::Config, ui, CancelToken};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::load()?;
    let api = match config.timeout {
        Some(timeout) => ApiClient::with_timeout(timeout),
        None => ApiClient::new(),
    }
    .context("Failed to build HTTP client")?;

    let query = ui::read_query(std::env::args().nth(1))?;

    // Installed after the prompt so Ctrl-C there still exits as usual.
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("Failed to install Ctrl-C handler")?;

    ui::run_search(&api, &config, &query, &cancel)?;
    Ok(())
}
