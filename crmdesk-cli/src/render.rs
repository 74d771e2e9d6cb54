//! Rendering of records and aggregates as text tables, CSV or JSON.

use crate::cli::OutputFormat;
use crmdesk::model::{ApiStatistics, Client, Invoice, Product, Salesperson, Section};
use crmdesk::stats::{ClientCountEntry, Dashboard, RankingEntry, RevenueSeries, StatusCounts};
use serde::Serialize;
use std::io::Write;

/// A row type with fixed columns.
///
/// Column names follow the normalized field names so that a CSV export can
/// be read back next to the raw JSON.
pub trait Tabular: Serialize {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

fn opt(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Tabular for Salesperson {
    fn headers() -> &'static [&'static str] {
        &["comercial_id", "nombre", "email", "telefono", "rol", "username"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.role.as_wire().to_string(),
            self.username.clone(),
        ]
    }
}

impl Tabular for Client {
    fn headers() -> &'static [&'static str] {
        &["cliente_id", "nombre", "apellidos", "edad", "email", "telefono", "comercial_id"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.surname.clone(),
            opt(self.age),
            self.email.clone(),
            self.phone.clone(),
            opt(self.salesperson_id),
        ]
    }
}

impl Tabular for Section {
    fn headers() -> &'static [&'static str] {
        &["seccion_id", "nombre"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone()]
    }
}

impl Tabular for Product {
    fn headers() -> &'static [&'static str] {
        &["producto_id", "nombre", "precio_base", "plazas_disponibles", "seccion_id"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.base_price.clone(),
            opt(self.available_slots),
            opt(self.section_id),
        ]
    }
}

impl Tabular for Invoice {
    fn headers() -> &'static [&'static str] {
        &[
            "factura_id",
            "cliente_id",
            "comercial_id",
            "producto_id",
            "fecha_emision",
            "estado",
            "total",
        ]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            opt(self.client_id),
            opt(self.salesperson_id),
            opt(self.product_id),
            self.issue_date.clone(),
            self.status.as_wire().to_string(),
            self.total.clone(),
        ]
    }
}

impl Tabular for ApiStatistics {
    fn headers() -> &'static [&'static str] {
        &["peticiones_totales", "fallos"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.total_requests.to_string(), self.failures.to_string()]
    }
}

/// One bar of the monthly revenue chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRow {
    pub month: String,
    pub revenue: String,
}

impl Tabular for RevenueRow {
    fn headers() -> &'static [&'static str] {
        &["month", "revenue"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.month.clone(), self.revenue.clone()]
    }
}

pub fn revenue_rows(series: &RevenueSeries) -> Vec<RevenueRow> {
    series
        .labels
        .iter()
        .zip(&series.amounts)
        .map(|(label, amount)| RevenueRow {
            month: label.clone(),
            revenue: amount.to_string(),
        })
        .collect()
}

/// One slice of the invoice status pie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusRow {
    pub status: &'static str,
    pub invoices: usize,
}

impl Tabular for StatusRow {
    fn headers() -> &'static [&'static str] {
        &["status", "invoices"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.status.to_string(), self.invoices.to_string()]
    }
}

pub fn status_rows(counts: &StatusCounts) -> Vec<StatusRow> {
    let mut rows = vec![
        StatusRow { status: "pagada", invoices: counts.paid },
        StatusRow { status: "pendiente", invoices: counts.pending },
        StatusRow { status: "cancelada", invoices: counts.cancelled },
    ];
    if counts.unknown > 0 {
        rows.push(StatusRow { status: "desconocido", invoices: counts.unknown });
    }
    rows
}

impl Tabular for RankingEntry {
    fn headers() -> &'static [&'static str] {
        &["comercial_id", "nombre", "total"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.salesperson_id.to_string(), self.name.clone(), self.total.to_string()]
    }
}

impl Tabular for ClientCountEntry {
    fn headers() -> &'static [&'static str] {
        &["comercial_id", "nombre", "clientes"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.salesperson_id.to_string(), self.name.clone(), self.clients.to_string()]
    }
}

/// Write `rows` in the requested format.
pub fn write_rows<T: Tabular>(
    out: &mut dyn Write,
    format: OutputFormat,
    rows: &[T],
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => write_table(out, T::headers(), rows.iter().map(Tabular::row)),
        OutputFormat::Csv => write_csv(out, T::headers(), rows.iter().map(Tabular::row)),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, rows)?;
            writeln!(out)?;
            Ok(())
        }
    }
}

/// Write a single record, as a one-row table or a JSON object.
pub fn write_record<T: Tabular>(
    out: &mut dyn Write,
    format: OutputFormat,
    record: &T,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, record)?;
            writeln!(out)?;
            Ok(())
        }
        _ => write_rows(out, format, std::slice::from_ref(record)),
    }
}

fn write_table(
    out: &mut dyn Write,
    headers: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> anyhow::Result<()> {
    let rows: Vec<Vec<String>> = rows.collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_table_line(out, &widths, headers.iter().copied())?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_table_line(out, &widths, rule.iter().map(String::as_str))?;
    for row in &rows {
        write_table_line(out, &widths, row.iter().map(String::as_str))?;
    }
    Ok(())
}

fn write_table_line<'a>(
    out: &mut dyn Write,
    widths: &[usize],
    cells: impl Iterator<Item = &'a str>,
) -> anyhow::Result<()> {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let fill = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(fill))
        })
        .collect();
    writeln!(out, "{}", padded.join("  ").trim_end())?;
    Ok(())
}

fn write_csv(
    out: &mut dyn Write,
    headers: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Dashboard as consecutive titled sections, or one JSON document.
pub fn write_dashboard(
    out: &mut dyn Write,
    format: OutputFormat,
    dashboard: &Dashboard,
) -> anyhow::Result<()> {
    let revenue = revenue_rows(&dashboard.monthly_revenue);
    let statuses = status_rows(&dashboard.status_counts);

    if format == OutputFormat::Json {
        let document = serde_json::json!({
            "total_revenue": dashboard.total_revenue.to_string(),
            "monthly_revenue": revenue,
            "ranking": dashboard.ranking,
            "status_counts": statuses,
            "clients_per_salesperson": dashboard.clients_per_salesperson,
        });
        serde_json::to_writer_pretty(&mut *out, &document)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "# Total revenue: {}", dashboard.total_revenue)?;
    writeln!(out)?;
    writeln!(out, "# Revenue by month")?;
    if revenue.is_empty() {
        writeln!(out, "(no data)")?;
    } else {
        write_rows(out, format, &revenue)?;
    }
    writeln!(out)?;
    writeln!(out, "# Salesperson ranking")?;
    write_rows(out, format, &dashboard.ranking)?;
    writeln!(out)?;
    writeln!(out, "# Invoices by status")?;
    write_rows(out, format, &statuses)?;
    writeln!(out)?;
    writeln!(out, "# Clients per salesperson")?;
    write_rows(out, format, &dashboard.clients_per_salesperson)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn render<T: Tabular>(format: OutputFormat, rows: &[T]) -> String {
        let mut out = Vec::new();
        write_rows(&mut out, format, rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn sections() -> Vec<Section> {
        vec![
            Section { id: 1, name: "Viajes".to_string() },
            Section { id: 20, name: "Cursos, talleres".to_string() },
        ]
    }

    #[test]
    fn test_table_pads_columns() {
        let text = render(OutputFormat::Table, &sections());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "seccion_id  nombre");
        assert_eq!(lines[1], "----------  ----------------");
        assert_eq!(lines[2], "1           Viajes");
        assert_eq!(lines[3], "20          Cursos, talleres");
    }

    #[test]
    fn test_csv_quotes_commas() {
        let text = render(OutputFormat::Csv, &sections());
        assert_eq!(text, "seccion_id,nombre\n1,Viajes\n20,\"Cursos, talleres\"\n");
    }

    #[test]
    fn test_json_uses_local_names() {
        let text = render(OutputFormat::Json, &sections());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[1]["seccion_id"], 20);
        assert_eq!(value[1]["nombre"], "Cursos, talleres");
    }

    #[test]
    fn test_status_rows_show_unknown_only_when_present() {
        let counts = StatusCounts { paid: 2, pending: 1, cancelled: 0, unknown: 0 };
        assert_eq!(status_rows(&counts).len(), 3);
        let counts = StatusCounts { unknown: 4, ..counts };
        let rows = status_rows(&counts);
        assert_eq!(rows[3], StatusRow { status: "desconocido", invoices: 4 });
    }

    #[test]
    fn test_revenue_rows_pair_labels_and_amounts() {
        let series = RevenueSeries {
            labels: vec!["Jan 2025".to_string(), "Feb 2025".to_string()],
            amounts: vec![Decimal::new(45005, 1), Decimal::new(3000, 0)],
        };
        let rows = revenue_rows(&series);
        assert_eq!(rows[0].revenue, "4500.5");
        assert_eq!(rows[1].month, "Feb 2025");
    }
}
