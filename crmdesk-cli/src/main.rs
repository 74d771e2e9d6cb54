//! crmdesk CLI
//!
//! Lists and edits CRM records and prints the sales dashboard, against the
//! backend or the built-in fixtures.

use clap::Parser;
use colored::Colorize;
use crmdesk::{ClientConfig, CrmClient};
use crmdesk_cli::cli::{Cli, Commands};
use crmdesk_cli::commands;
use std::io::{self, Write};
use std::process;

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match run(&cli) {
        Ok(()) => {
            if !cli.quiet {
                eprintln!("{}", "✅ Success".green());
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{} {:#}", "❌ Error:".red(), e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            ClientConfig::default()
        }
    };
    let config = cli.apply_overrides(config);
    log::debug!("Backend: {} ({:?})", config.base_url, config.data_source);

    let mut client = CrmClient::from_config(&config);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // The login command manages its own session.
    if !matches!(cli.command, Commands::Login { .. }) {
        if let Some(user) = &cli.user {
            let password = cli.password.as_deref().unwrap_or_default();
            commands::handle_login(&mut client, user, password, &mut out)?;
        }
    }

    commands::execute(&mut client, &cli.command, cli.format, &mut out)?;
    out.flush()?;
    Ok(())
}
