//! Command handlers.
//!
//! Each handler writes its output to `out` so the binary and the tests share
//! the same code path.

use crate::cli::{Commands, EntityArg, OutputFormat, StatsAction};
use crate::render::{self, Tabular};
use anyhow::{bail, Context};
use crmdesk::model::{Client, Entity, Invoice, Product, ReportKind, Salesperson, Section};
use crmdesk::{ClientFilter, CrmClient, InvoiceFilter, LoginOutcome, Payload, ProductFilter};
use std::io::Write;

/// Run `command` against `client`.
pub fn execute(
    client: &mut CrmClient,
    command: &Commands,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => handle_login(client, username, password, out),
        Commands::Dashboard => handle_dashboard(client, format, out),
        Commands::List {
            entity,
            salesperson,
            client: client_id,
            section,
        } => handle_list(
            client,
            *entity,
            ListFilters {
                salesperson: *salesperson,
                client: *client_id,
                section: *section,
            },
            format,
            out,
        ),
        Commands::Get { entity, id } => handle_get(client, *entity, id, format, out),
        Commands::Create { entity, json } => handle_create(client, *entity, json, out),
        Commands::Update { entity, id, json } => handle_update(client, *entity, id, json, out),
        Commands::Delete { entity, id } => handle_delete(client, *entity, id, out),
        Commands::Report { kind } => {
            let kind: ReportKind = (*kind).into();
            log::info!("requesting report {:?}", kind);
            let payload = client.start_report(kind)?;
            write_payload(out, payload, "report requested")
        }
        Commands::Stats { action } => handle_stats(client, action, format, out),
    }
}

/// Log in through the client's session and report the outcome.
pub fn handle_login(
    client: &mut CrmClient,
    username: &str,
    password: &str,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match client.login(username, password) {
        LoginOutcome::Authenticated(session) => {
            writeln!(out, "Logged in as {} ({})", session.display_name, session.role)?;
            Ok(())
        }
        LoginOutcome::InvalidCredentials => bail!("invalid username or password"),
        LoginOutcome::Unreachable(reason) => bail!("backend unreachable: {reason}"),
    }
}

fn handle_dashboard(
    client: &CrmClient,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let dashboard = client.dashboard().context("loading dashboard data")?;
    render::write_dashboard(out, format, &dashboard)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilters {
    pub salesperson: Option<i64>,
    pub client: Option<i64>,
    pub section: Option<i64>,
}

impl ListFilters {
    /// Reject filters the entity's endpoint does not support.
    fn check(&self, entity: EntityArg) -> anyhow::Result<()> {
        let allowed: &[&str] = match entity {
            EntityArg::Clients => &["salesperson"],
            EntityArg::Products => &["section"],
            EntityArg::Invoices => &["salesperson", "client"],
            EntityArg::Salespeople | EntityArg::Sections => &[],
        };
        let given = [
            ("salesperson", self.salesperson.is_some()),
            ("client", self.client.is_some()),
            ("section", self.section.is_some()),
        ];
        for (name, present) in given {
            if present && !allowed.contains(&name) {
                bail!("--{name} does not apply to {}", entity_path(entity));
            }
        }
        Ok(())
    }
}

fn entity_path(entity: EntityArg) -> &'static str {
    match entity {
        EntityArg::Salespeople => Salesperson::PATH,
        EntityArg::Clients => Client::PATH,
        EntityArg::Sections => Section::PATH,
        EntityArg::Products => Product::PATH,
        EntityArg::Invoices => Invoice::PATH,
    }
}

pub fn handle_list(
    client: &CrmClient,
    entity: EntityArg,
    filters: ListFilters,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    filters.check(entity)?;
    match entity {
        EntityArg::Salespeople => render::write_rows(out, format, &client.salespeople()?),
        EntityArg::Clients => {
            let filter = ClientFilter {
                salesperson_id: filters.salesperson,
            };
            render::write_rows(out, format, &client.clients(filter)?)
        }
        EntityArg::Sections => render::write_rows(out, format, &client.sections()?),
        EntityArg::Products => {
            let filter = ProductFilter {
                section_id: filters.section,
            };
            render::write_rows(out, format, &client.products(filter)?)
        }
        EntityArg::Invoices => {
            let filter = InvoiceFilter {
                client_id: filters.client,
                salesperson_id: filters.salesperson,
            };
            render::write_rows(out, format, &client.invoices(filter)?)
        }
    }
}

/// Invoice ids are free-form strings; every other entity uses integers.
fn checked_id(entity: EntityArg, id: &str) -> anyhow::Result<String> {
    let id = id.trim();
    if id.is_empty() {
        bail!("empty id");
    }
    if entity != EntityArg::Invoices {
        id.parse::<i64>()
            .with_context(|| format!("{} ids are integers, got {id:?}", entity_path(entity)))?;
    }
    Ok(id.to_string())
}

fn get_one<E: Entity + Tabular>(
    client: &CrmClient,
    id: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let record: E = client.get(id)?;
    render::write_record(out, format, &record)
}

pub fn handle_get(
    client: &CrmClient,
    entity: EntityArg,
    id: &str,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let id = checked_id(entity, id)?;
    match entity {
        EntityArg::Salespeople => get_one::<Salesperson>(client, &id, format, out),
        EntityArg::Clients => get_one::<Client>(client, &id, format, out),
        EntityArg::Sections => get_one::<Section>(client, &id, format, out),
        EntityArg::Products => get_one::<Product>(client, &id, format, out),
        EntityArg::Invoices => get_one::<Invoice>(client, &id, format, out),
    }
}

fn parse_draft<E: Entity>(json: &str) -> anyhow::Result<E::Draft> {
    serde_json::from_str(json).with_context(|| format!("invalid {} body", E::PATH))
}

fn create_one<E: Entity>(client: &CrmClient, json: &str) -> anyhow::Result<Payload> {
    let draft = parse_draft::<E>(json)?;
    Ok(client.create::<E>(&draft)?)
}

/// Fields missing from `json` keep their stored values.
fn update_one<E: Entity>(client: &CrmClient, id: &str, json: &str) -> anyhow::Result<Payload> {
    let changes: serde_json::Value =
        serde_json::from_str(json).with_context(|| format!("invalid {} body", E::PATH))?;
    Ok(client.update_fields::<E>(id, &changes)?)
}

pub fn handle_create(
    client: &CrmClient,
    entity: EntityArg,
    json: &str,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let payload = match entity {
        EntityArg::Salespeople => create_one::<Salesperson>(client, json)?,
        EntityArg::Clients => create_one::<Client>(client, json)?,
        EntityArg::Sections => create_one::<Section>(client, json)?,
        EntityArg::Products => create_one::<Product>(client, json)?,
        EntityArg::Invoices => create_one::<Invoice>(client, json)?,
    };
    log::info!("created record in {}", entity_path(entity));
    write_payload(out, payload, "created")
}

pub fn handle_update(
    client: &CrmClient,
    entity: EntityArg,
    id: &str,
    json: &str,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let id = checked_id(entity, id)?;
    let payload = match entity {
        EntityArg::Salespeople => update_one::<Salesperson>(client, &id, json)?,
        EntityArg::Clients => update_one::<Client>(client, &id, json)?,
        EntityArg::Sections => update_one::<Section>(client, &id, json)?,
        EntityArg::Products => update_one::<Product>(client, &id, json)?,
        EntityArg::Invoices => update_one::<Invoice>(client, &id, json)?,
    };
    log::info!("updated {}/{}", entity_path(entity), id);
    write_payload(out, payload, "updated")
}

pub fn handle_delete(
    client: &CrmClient,
    entity: EntityArg,
    id: &str,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let id = checked_id(entity, id)?;
    match entity {
        EntityArg::Salespeople => client.delete::<Salesperson>(&id)?,
        EntityArg::Clients => client.delete::<Client>(&id)?,
        EntityArg::Sections => client.delete::<Section>(&id)?,
        EntityArg::Products => client.delete::<Product>(&id)?,
        EntityArg::Invoices => client.delete::<Invoice>(&id)?,
    }
    log::info!("deleted {}/{}", entity_path(entity), id);
    writeln!(out, "deleted {}/{}", entity_path(entity), id)?;
    Ok(())
}

fn handle_stats(
    client: &CrmClient,
    action: &StatsAction,
    format: OutputFormat,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match action {
        StatsAction::Show => {
            let stats = client.api_statistics()?;
            render::write_record(out, format, &stats)
        }
        StatsAction::Export { file } => {
            client.export_statistics(file.as_deref())?;
            match file {
                Some(file) => writeln!(out, "statistics exported to {file}")?,
                None => writeln!(out, "statistics exported")?,
            }
            Ok(())
        }
        StatsAction::Reset => {
            client.reset_statistics()?;
            writeln!(out, "statistics reset")?;
            Ok(())
        }
    }
}

/// Echo a JSON response body, or `fallback` when the call returned none.
fn write_payload(out: &mut dyn Write, payload: Payload, fallback: &str) -> anyhow::Result<()> {
    match payload {
        Payload::Json(value) => {
            serde_json::to_writer_pretty(&mut *out, &value)?;
            writeln!(out)?;
        }
        Payload::Empty => writeln!(out, "{fallback}")?,
    }
    Ok(())
}
