//! Backend records in the local naming convention.
//!
//! Every record deserializes from a *normalized* JSON value (see
//! [`crate::normalize`]) and serializes back with the same snake_case names,
//! which the backend also accepts on create and update.

use crate::json_helpers::{
    deserialize_amount, deserialize_issue_date, deserialize_option_id, deserialize_text,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// A record type managed by the backend under a fixed base path.
pub trait Entity: DeserializeOwned {
    /// Entity-relative base path, e.g. `facturas`.
    const PATH: &'static str;
    /// Body sent on create and update.
    type Draft: Serialize + DeserializeOwned;
}

/// Role of a salesperson account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Admin,
    Salesperson,
    #[default]
    Unknown,
}

impl Role {
    pub fn as_wire(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Salesperson => "comercial",
            Role::Unknown => "desconocido",
        }
    }

    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "comercial" => Role::Salesperson,
            _ => Role::Unknown,
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Role::from_wire).unwrap_or_default())
    }
}

/// Invoice status. Anything the backend sends outside the known set,
/// including a missing status, is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InvoiceStatus {
    Paid,
    Pending,
    Cancelled,
    #[default]
    Unknown,
}

impl InvoiceStatus {
    pub fn as_wire(self) -> &'static str {
        match self {
            InvoiceStatus::Paid => "pagada",
            InvoiceStatus::Pending => "pendiente",
            InvoiceStatus::Cancelled => "cancelada",
            InvoiceStatus::Unknown => "desconocido",
        }
    }

    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "pagada" => InvoiceStatus::Paid,
            "pendiente" => InvoiceStatus::Pending,
            "cancelada" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::Unknown,
        }
    }
}

impl Serialize for InvoiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for InvoiceStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(InvoiceStatus::from_wire).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salesperson {
    #[serde(rename = "comercial_id")]
    pub id: i64,
    #[serde(rename = "nombre", default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(rename = "telefono", default, deserialize_with = "deserialize_text")]
    pub phone: String,
    #[serde(rename = "rol", default)]
    pub role: Role,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonDraft {
    #[serde(rename = "nombre", deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(rename = "telefono", default, deserialize_with = "deserialize_text")]
    pub phone: String,
    #[serde(rename = "rol", default)]
    pub role: Role,
    #[serde(deserialize_with = "deserialize_text")]
    pub username: String,
}

impl Entity for Salesperson {
    const PATH: &'static str = "comerciales";
    type Draft = SalespersonDraft;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "cliente_id")]
    pub id: i64,
    #[serde(rename = "nombre", default, deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(rename = "apellidos", default, deserialize_with = "deserialize_text")]
    pub surname: String,
    #[serde(rename = "edad", default, deserialize_with = "deserialize_option_id")]
    pub age: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(rename = "telefono", default, deserialize_with = "deserialize_text")]
    pub phone: String,
    #[serde(rename = "comercial_id", default, deserialize_with = "deserialize_option_id")]
    pub salesperson_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDraft {
    #[serde(rename = "nombre", deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(rename = "apellidos", default, deserialize_with = "deserialize_text")]
    pub surname: String,
    #[serde(rename = "edad", default, deserialize_with = "deserialize_option_id")]
    pub age: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(rename = "telefono", default, deserialize_with = "deserialize_text")]
    pub phone: String,
    #[serde(rename = "comercial_id")]
    pub salesperson_id: i64,
}

impl Entity for Client {
    const PATH: &'static str = "clientes";
    type Draft = ClientDraft;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "seccion_id")]
    pub id: i64,
    #[serde(rename = "nombre", default, deserialize_with = "deserialize_text")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDraft {
    #[serde(rename = "nombre", deserialize_with = "deserialize_text")]
    pub name: String,
}

impl Entity for Section {
    const PATH: &'static str = "secciones";
    type Draft = SectionDraft;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "producto_id")]
    pub id: i64,
    #[serde(rename = "nombre", default, deserialize_with = "deserialize_text")]
    pub name: String,
    /// Decimal string, e.g. `"1200.00"`.
    #[serde(rename = "precio_base", default, deserialize_with = "deserialize_text")]
    pub base_price: String,
    #[serde(rename = "plazas_disponibles", default, deserialize_with = "deserialize_option_id")]
    pub available_slots: Option<i64>,
    #[serde(rename = "seccion_id", default, deserialize_with = "deserialize_option_id")]
    pub section_id: Option<i64>,
}

impl Product {
    pub fn base_price_amount(&self) -> Option<Decimal> {
        parse_amount(&self.base_price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "nombre", deserialize_with = "deserialize_text")]
    pub name: String,
    #[serde(rename = "precio_base", deserialize_with = "deserialize_text")]
    pub base_price: String,
    #[serde(rename = "plazas_disponibles", default)]
    pub available_slots: i64,
    #[serde(rename = "seccion_id")]
    pub section_id: i64,
}

impl Entity for Product {
    const PATH: &'static str = "productos";
    type Draft = ProductDraft;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "factura_id", deserialize_with = "deserialize_text")]
    pub id: String,
    #[serde(rename = "cliente_id", default, deserialize_with = "deserialize_option_id")]
    pub client_id: Option<i64>,
    #[serde(rename = "comercial_id", default, deserialize_with = "deserialize_option_id")]
    pub salesperson_id: Option<i64>,
    #[serde(rename = "producto_id", default, deserialize_with = "deserialize_option_id")]
    pub product_id: Option<i64>,
    /// ISO date, optionally followed by `T` and a time.
    #[serde(rename = "fecha_emision", default, deserialize_with = "deserialize_text")]
    pub issue_date: String,
    #[serde(rename = "estado", default)]
    pub status: InvoiceStatus,
    /// Currency-formatted, e.g. `"1500.00€"`.
    #[serde(default, deserialize_with = "deserialize_text")]
    pub total: String,
}

impl Invoice {
    /// Parsed total, `None` when the backend sent something unparseable.
    pub fn amount(&self) -> Option<Decimal> {
        parse_amount(&self.total)
    }

    /// Calendar day of issue, ignoring any time component.
    pub fn issue_day(&self) -> Option<NaiveDate> {
        parse_issue_date(&self.issue_date)
    }
}

/// Body for creating or replacing an invoice.
///
/// When deserialized without a status or issue date, those default to
/// pending and today, the values the backend requires on insert. To change
/// part of a stored invoice use
/// [`CrmClient::update_fields`](crate::CrmClient::update_fields), which
/// starts from the stored values instead. Totals and dates are also read in
/// the backend's own format (`"1500.00€"`, `"2025-01-05T10:00:00"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    #[serde(rename = "factura_id")]
    pub id: String,
    #[serde(rename = "cliente_id")]
    pub client_id: i64,
    #[serde(rename = "comercial_id")]
    pub salesperson_id: i64,
    #[serde(rename = "producto_id", default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(
        rename = "fecha_emision",
        default = "today",
        deserialize_with = "deserialize_issue_date"
    )]
    pub issue_date: NaiveDate,
    #[serde(rename = "estado", default = "pending")]
    pub status: InvoiceStatus,
    #[serde(deserialize_with = "deserialize_amount")]
    pub total: Decimal,
}

impl InvoiceDraft {
    pub fn new(id: impl Into<String>, client_id: i64, salesperson_id: i64, total: Decimal) -> Self {
        Self {
            id: id.into(),
            client_id,
            salesperson_id,
            product_id: None,
            issue_date: today(),
            status: InvoiceStatus::Pending,
            total,
        }
    }

    pub fn with_product(mut self, product_id: i64) -> Self {
        self.product_id = Some(product_id);
        self
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn pending() -> InvoiceStatus {
    InvoiceStatus::Pending
}

impl Entity for Invoice {
    const PATH: &'static str = "facturas";
    type Draft = InvoiceDraft;
}

/// Counters kept by the backend about its own API traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApiStatistics {
    #[serde(rename = "peticionesTotales", default)]
    pub total_requests: u64,
    #[serde(rename = "fallos", default)]
    pub failures: u64,
}

/// Report families the backend can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Clients,
    Invoices,
    Full,
}

impl ReportKind {
    pub fn as_wire(self) -> &'static str {
        match self {
            ReportKind::Clients => "clientes",
            ReportKind::Invoices => "facturas",
            ReportKind::Full => "completo",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clientes" => Ok(ReportKind::Clients),
            "facturas" => Ok(ReportKind::Invoices),
            "completo" => Ok(ReportKind::Full),
            other => Err(format!("unknown report kind: {other}")),
        }
    }
}

/// Parse a currency-formatted amount such as `"1,500.00€"`.
///
/// The `€` suffix and `,` thousands separators are stripped before parsing.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('€')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    Decimal::from_str(cleaned.trim()).ok()
}

/// Parse an ISO date, discarding anything from the first `T` on.
pub fn parse_issue_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or_default().trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}
