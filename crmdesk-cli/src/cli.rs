//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use crmdesk::model::ReportKind;
use crmdesk::{ClientConfig, DataSourceKind};

#[derive(Parser, Debug)]
#[command(name = "crmdesk")]
#[command(about = "Browse and manage CRM records and dashboard figures")]
#[command(version)]
pub struct Cli {
    /// Backend base URL (overrides config/config.toml)
    #[arg(long, env = "CRMDESK_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Use built-in fixture records instead of the backend
    #[arg(long)]
    pub fixtures: bool,

    /// Log in as this user before running the command
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password for --user
    #[arg(long, env = "CRMDESK_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntityArg {
    Salespeople,
    Clients,
    Sections,
    Products,
    Invoices,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportArg {
    Clientes,
    Facturas,
    Completo,
}

impl From<ReportArg> for ReportKind {
    fn from(arg: ReportArg) -> Self {
        match arg {
            ReportArg::Clientes => ReportKind::Clients,
            ReportArg::Facturas => ReportKind::Invoices,
            ReportArg::Completo => ReportKind::Full,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Check credentials against the login endpoint
    Login {
        username: String,
        #[arg(long, env = "CRMDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Revenue by month, salesperson ranking and invoice status counts
    Dashboard,

    /// List records of an entity
    List {
        #[arg(value_enum)]
        entity: EntityArg,
        /// Only records owned by this salesperson (clients, invoices)
        #[arg(long)]
        salesperson: Option<i64>,
        /// Only invoices of this client
        #[arg(long)]
        client: Option<i64>,
        /// Only products of this section
        #[arg(long)]
        section: Option<i64>,
    },

    /// Show one record
    Get {
        #[arg(value_enum)]
        entity: EntityArg,
        id: String,
    },

    /// Create a record from a JSON body in local field names
    Create {
        #[arg(value_enum)]
        entity: EntityArg,
        #[arg(long)]
        json: String,
    },

    /// Replace a record with a JSON body in local field names
    Update {
        #[arg(value_enum)]
        entity: EntityArg,
        id: String,
        #[arg(long)]
        json: String,
    },

    /// Delete a record
    Delete {
        #[arg(value_enum)]
        entity: EntityArg,
        id: String,
    },

    /// Ask the backend to generate a report
    Report {
        #[arg(value_enum)]
        kind: ReportArg,
    },

    /// Backend API statistics
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum StatsAction {
    /// Show request and failure counters
    Show,
    /// Have the backend export its counters to a file
    Export {
        #[arg(long)]
        file: Option<String>,
    },
    /// Reset the counters
    Reset,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        if self.fixtures {
            config.data_source = DataSourceKind::Fixture;
        }
        config
    }

    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
