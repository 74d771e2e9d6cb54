//! Dashboard aggregates.
//!
//! Everything here is a pure function of an in-memory snapshot. Records with
//! an unparseable total or issue date are skipped one by one; they never
//! abort an aggregation.

use crate::model::{Client, Invoice, InvoiceStatus, Salesperson};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatusCounts {
    pub paid: usize,
    pub pending: usize,
    pub cancelled: usize,
    /// Missing or unrecognized statuses.
    pub unknown: usize,
}

/// Monthly revenue as two parallel, chronologically ordered sequences.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RevenueSeries {
    /// `"Jan 2025"`, `"Feb 2025"`, ...
    pub labels: Vec<String>,
    pub amounts: Vec<Decimal>,
}

impl RevenueSeries {
    /// Sum of every month. Saturates instead of overflowing.
    pub fn total(&self) -> Decimal {
        self.amounts
            .iter()
            .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(*amount))
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub salesperson_id: i64,
    pub name: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientCountEntry {
    pub salesperson_id: i64,
    pub name: String,
    pub clients: usize,
}

/// Everything the dashboard shows, computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_revenue: Decimal,
    pub monthly_revenue: RevenueSeries,
    pub ranking: Vec<RankingEntry>,
    pub status_counts: StatusCounts,
    pub clients_per_salesperson: Vec<ClientCountEntry>,
}

impl Dashboard {
    pub fn compute(salespeople: &[Salesperson], clients: &[Client], invoices: &[Invoice]) -> Self {
        let monthly_revenue = monthly_revenue(invoices);
        Self {
            total_revenue: monthly_revenue.total(),
            monthly_revenue,
            ranking: salesperson_ranking(salespeople, invoices),
            status_counts: status_counts(invoices),
            clients_per_salesperson: clients_per_salesperson(salespeople, clients),
        }
    }
}

/// Parsed total if it counts towards revenue (parseable and positive).
fn contributing_amount(invoice: &Invoice) -> Option<Decimal> {
    match invoice.amount() {
        Some(amount) if amount > Decimal::ZERO => Some(amount),
        Some(_) => None,
        None => {
            log::debug!(
                "skipping invoice {}: unparseable total {:?}",
                invoice.id,
                invoice.total
            );
            None
        }
    }
}

/// Add `amount` to `acc`, leaving `acc` untouched on overflow.
fn accumulate(acc: &mut Decimal, amount: Decimal, invoice: &Invoice) {
    match acc.checked_add(amount) {
        Some(sum) => *acc = sum,
        None => log::debug!(
            "skipping invoice {}: total {} overflows the running sum",
            invoice.id,
            amount
        ),
    }
}

fn month_label(year: i32, month: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{month:02}/{year}"))
}

pub fn status_counts(invoices: &[Invoice]) -> StatusCounts {
    invoices
        .iter()
        .fold(StatusCounts::default(), |mut counts, invoice| {
            match invoice.status {
                InvoiceStatus::Paid => counts.paid += 1,
                InvoiceStatus::Pending => counts.pending += 1,
                InvoiceStatus::Cancelled => counts.cancelled += 1,
                InvoiceStatus::Unknown => counts.unknown += 1,
            }
            counts
        })
}

/// Revenue per calendar month, oldest first.
pub fn monthly_revenue(invoices: &[Invoice]) -> RevenueSeries {
    let mut buckets: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();

    for invoice in invoices {
        let Some(amount) = contributing_amount(invoice) else {
            continue;
        };
        let Some(day) = invoice.issue_day() else {
            log::debug!(
                "skipping invoice {}: unparseable issue date {:?}",
                invoice.id,
                invoice.issue_date
            );
            continue;
        };
        accumulate(buckets.entry((day.year(), day.month())).or_default(), amount, invoice);
    }

    let (labels, amounts) = buckets
        .into_iter()
        .map(|((year, month), amount)| (month_label(year, month), amount))
        .unzip();
    RevenueSeries { labels, amounts }
}

/// Revenue across all months; invoices left out of the monthly series
/// (bad date or total) are left out here too.
pub fn total_revenue(invoices: &[Invoice]) -> Decimal {
    monthly_revenue(invoices).total()
}

/// One entry per known salesperson, highest revenue first.
///
/// Ties keep the order of `salespeople`.
pub fn salesperson_ranking(salespeople: &[Salesperson], invoices: &[Invoice]) -> Vec<RankingEntry> {
    let mut totals: HashMap<i64, Decimal> =
        salespeople.iter().map(|s| (s.id, Decimal::ZERO)).collect();

    for invoice in invoices {
        let Some(id) = invoice.salesperson_id else {
            continue;
        };
        if let Some(total) = totals.get_mut(&id) {
            if let Some(amount) = contributing_amount(invoice) {
                accumulate(total, amount, invoice);
            }
        }
    }

    let mut ranking: Vec<RankingEntry> = salespeople
        .iter()
        .map(|s| RankingEntry {
            salesperson_id: s.id,
            name: s.name.clone(),
            total: totals.get(&s.id).copied().unwrap_or_default(),
        })
        .collect();
    ranking.sort_by(|a, b| b.total.cmp(&a.total));
    ranking
}

/// Number of clients owned by each known salesperson, most first.
///
/// Ties keep the order of `salespeople`.
pub fn clients_per_salesperson(salespeople: &[Salesperson], clients: &[Client]) -> Vec<ClientCountEntry> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for id in clients.iter().filter_map(|c| c.salesperson_id) {
        *counts.entry(id).or_default() += 1;
    }

    let mut entries: Vec<ClientCountEntry> = salespeople
        .iter()
        .map(|s| ClientCountEntry {
            salesperson_id: s.id,
            name: s.name.clone(),
            clients: counts.get(&s.id).copied().unwrap_or_default(),
        })
        .collect();
    entries.sort_by(|a, b| b.clients.cmp(&a.clients));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn invoice(id: &str, salesperson: i64, date: &str, status: InvoiceStatus, total: &str) -> Invoice {
        Invoice {
            id: id.to_string(),
            client_id: Some(1),
            salesperson_id: Some(salesperson),
            product_id: None,
            issue_date: date.to_string(),
            status,
            total: total.to_string(),
        }
    }

    fn salesperson(id: i64, name: &str) -> Salesperson {
        Salesperson {
            id,
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
            role: Role::Salesperson,
            username: name.to_lowercase(),
        }
    }

    fn client(id: i64, salesperson: Option<i64>) -> Client {
        Client {
            id,
            name: format!("Cliente {id}"),
            surname: String::new(),
            age: None,
            email: String::new(),
            phone: String::new(),
            salesperson_id: salesperson,
        }
    }

    #[test]
    fn test_status_counts() {
        let invoices = vec![
            invoice("F-1", 1, "2025-01-01", InvoiceStatus::Paid, "100.00€"),
            invoice("F-2", 1, "2025-01-01", InvoiceStatus::Pending, "50€"),
            invoice("F-3", 1, "2025-01-01", InvoiceStatus::Paid, "25€"),
        ];
        let counts = status_counts(&invoices);
        assert_eq!(counts.paid, 2);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.cancelled, 0);
        assert_eq!(counts.unknown, 0);
    }

    #[test]
    fn test_status_counts_surfaces_unknown() {
        let invoices = vec![
            invoice("F-1", 1, "2025-01-01", InvoiceStatus::Unknown, "1€"),
            invoice("F-2", 1, "2025-01-01", InvoiceStatus::Cancelled, "1€"),
        ];
        let counts = status_counts(&invoices);
        assert_eq!(counts.unknown, 1);
        assert_eq!(counts.cancelled, 1);
        assert_eq!(status_counts(&[]), StatusCounts::default());
    }

    #[test]
    fn test_monthly_revenue_is_chronological() {
        // Input order deliberately reversed
        let invoices = vec![
            invoice("F-2", 1, "2025-02-01", InvoiceStatus::Paid, "3000.00€"),
            invoice("F-1", 1, "2025-01-05", InvoiceStatus::Paid, "1500.00€"),
        ];
        let series = monthly_revenue(&invoices);
        assert_eq!(series.labels, vec!["Jan 2025", "Feb 2025"]);
        assert_eq!(
            series.amounts,
            vec![Decimal::new(150000, 2), Decimal::new(300000, 2)]
        );
    }

    #[test]
    fn test_monthly_revenue_orders_across_years() {
        let invoices = vec![
            invoice("F-3", 1, "2025-01-10", InvoiceStatus::Paid, "10€"),
            invoice("F-1", 1, "2024-12-31T23:59:59", InvoiceStatus::Paid, "20€"),
            invoice("F-2", 1, "2024-11-02", InvoiceStatus::Paid, "30€"),
            invoice("F-4", 1, "2024-12-01", InvoiceStatus::Paid, "5€"),
        ];
        let series = monthly_revenue(&invoices);
        assert_eq!(series.labels, vec!["Nov 2024", "Dec 2024", "Jan 2025"]);
        assert_eq!(
            series.amounts,
            vec![Decimal::new(30, 0), Decimal::new(25, 0), Decimal::new(10, 0)]
        );
        assert_eq!(series.total(), Decimal::new(65, 0));
    }

    #[test]
    fn test_monthly_revenue_skips_bad_records() {
        let invoices = vec![
            invoice("F-1", 1, "2025-01-05", InvoiceStatus::Paid, "N/A"),
            invoice("F-2", 1, "not a date", InvoiceStatus::Paid, "10€"),
            invoice("F-3", 1, "2025-01-20", InvoiceStatus::Paid, "1,250.50€"),
            invoice("F-4", 1, "2025-01-21", InvoiceStatus::Paid, "0.00€"),
        ];
        let series = monthly_revenue(&invoices);
        assert_eq!(series.labels, vec!["Jan 2025"]);
        assert_eq!(series.amounts, vec![Decimal::new(125050, 2)]);
        assert!(monthly_revenue(&[]).is_empty());
    }

    #[test]
    fn test_ranking_sorts_descending() {
        let salespeople = vec![salesperson(1, "A"), salesperson(2, "B")];
        let invoices = vec![
            invoice("F-1", 1, "2025-01-01", InvoiceStatus::Paid, "60€"),
            invoice("F-2", 2, "2025-01-01", InvoiceStatus::Paid, "300€"),
            invoice("F-3", 1, "2025-01-01", InvoiceStatus::Pending, "40€"),
        ];
        let ranking = salesperson_ranking(&salespeople, &invoices);
        let summary: Vec<(&str, Decimal)> =
            ranking.iter().map(|e| (e.name.as_str(), e.total)).collect();
        assert_eq!(
            summary,
            vec![("B", Decimal::new(300, 0)), ("A", Decimal::new(100, 0))]
        );
    }

    #[test]
    fn test_ranking_keeps_salespeople_without_invoices() {
        let salespeople = vec![salesperson(1, "A"), salesperson(2, "B"), salesperson(3, "C")];
        let invoices = vec![
            invoice("F-1", 2, "2025-01-01", InvoiceStatus::Paid, "10€"),
            // Unknown salesperson and unparseable total are both ignored
            invoice("F-2", 9, "2025-01-01", InvoiceStatus::Paid, "999€"),
            invoice("F-3", 1, "2025-01-01", InvoiceStatus::Paid, "N/A"),
        ];
        let ranking = salesperson_ranking(&salespeople, &invoices);
        let names: Vec<&str> = ranking.iter().map(|e| e.name.as_str()).collect();
        // A and C tie at zero and keep their listing order
        assert_eq!(names, vec!["B", "A", "C"]);
        assert_eq!(ranking[1].total, Decimal::ZERO);
        assert_eq!(ranking[2].total, Decimal::ZERO);
    }

    #[test]
    fn test_ranking_empty_inputs() {
        assert!(salesperson_ranking(&[], &[]).is_empty());
        let ranking = salesperson_ranking(&[salesperson(1, "A")], &[]);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].total, Decimal::ZERO);
    }

    #[test]
    fn test_clients_per_salesperson() {
        let salespeople = vec![salesperson(1, "A"), salesperson(2, "B"), salesperson(3, "C")];
        let clients = vec![
            client(1, Some(2)),
            client(2, Some(3)),
            client(3, Some(2)),
            client(4, None),
            client(5, Some(7)),
        ];
        let entries = clients_per_salesperson(&salespeople, &clients);
        let summary: Vec<(&str, usize)> =
            entries.iter().map(|e| (e.name.as_str(), e.clients)).collect();
        assert_eq!(summary, vec![("B", 2), ("C", 1), ("A", 0)]);
    }

    #[test]
    fn test_dashboard_compute() {
        let salespeople = vec![salesperson(1, "A"), salesperson(2, "B")];
        let clients = vec![client(1, Some(1))];
        let invoices = vec![
            invoice("F-1", 1, "2025-01-05", InvoiceStatus::Paid, "100€"),
            invoice("F-2", 2, "2025-03-05", InvoiceStatus::Pending, "N/A"),
        ];
        let dashboard = Dashboard::compute(&salespeople, &clients, &invoices);
        assert_eq!(dashboard.total_revenue, Decimal::new(100, 0));
        assert_eq!(dashboard.total_revenue, dashboard.monthly_revenue.total());
        assert_eq!(dashboard.monthly_revenue.labels, vec!["Jan 2025"]);
        assert_eq!(dashboard.status_counts.pending, 1);
        assert_eq!(dashboard.ranking[0].name, "A");
        assert_eq!(dashboard.clients_per_salesperson[0].clients, 1);
    }

    #[test]
    fn test_total_revenue_matches_series_with_bad_dates() {
        let invoices = vec![
            invoice("F-1", 1, "2025-01-05", InvoiceStatus::Paid, "100€"),
            invoice("F-2", 1, "not a date", InvoiceStatus::Paid, "10€"),
        ];
        assert_eq!(total_revenue(&invoices), Decimal::new(100, 0));

        let dashboard = Dashboard::compute(&[salesperson(1, "A")], &[], &invoices);
        assert_eq!(dashboard.total_revenue, Decimal::new(100, 0));
        assert_eq!(dashboard.total_revenue, dashboard.monthly_revenue.total());
    }

    #[test]
    fn test_overflowing_totals_are_skipped() {
        let huge = "79228162514264337593543950335€";
        let invoices = vec![
            invoice("F-1", 1, "2025-01-05", InvoiceStatus::Paid, huge),
            invoice("F-2", 1, "2025-01-06", InvoiceStatus::Paid, huge),
        ];

        let ranking = salesperson_ranking(&[salesperson(1, "A")], &invoices);
        assert_eq!(ranking[0].total, Decimal::MAX);

        let series = monthly_revenue(&invoices);
        assert_eq!(series.amounts, vec![Decimal::MAX]);
        assert_eq!(total_revenue(&invoices), Decimal::MAX);
    }

    #[test]
    fn test_series_total_saturates() {
        let series = RevenueSeries {
            labels: vec!["Jan 2025".to_string(), "Feb 2025".to_string()],
            amounts: vec![Decimal::MAX, Decimal::MAX],
        };
        assert_eq!(series.total(), Decimal::MAX);
    }
}
