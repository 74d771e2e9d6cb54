//! Typed access to the backend entities.
//!
//! [`CrmClient`] turns raw [`DataSource`] calls into records, applies the
//! foreign-id filters the backend supports, and loads dashboard snapshots.
//! Lists are request-scoped snapshots: re-fetch after every mutation.

use crate::auth::{LoginOutcome, SessionState};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::model::{
    ApiStatistics, Client, Entity, Invoice, Product, ReportKind, Salesperson, Section,
};
use crate::normalize::normalize;
use crate::source::{self, DataSource, Method, Payload, Query};
use crate::stats::{self, ClientCountEntry, Dashboard, RankingEntry, RevenueSeries, StatusCounts};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;

const STATISTICS_PATH: &str = "estadisticas";
const REPORTS_PATH: &str = "informes";

/// Filter for [`CrmClient::clients`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub salesperson_id: Option<i64>,
}

/// Filter for [`CrmClient::products`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub section_id: Option<i64>,
}

/// Filter for [`CrmClient::invoices`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvoiceFilter {
    pub client_id: Option<i64>,
    pub salesperson_id: Option<i64>,
}

impl ClientFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        self.salesperson_id
            .map(|id| ("comercialId", id.to_string()))
            .into_iter()
            .collect()
    }
}

impl ProductFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        self.section_id
            .map(|id| ("seccionId", id.to_string()))
            .into_iter()
            .collect()
    }
}

impl InvoiceFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(id) = self.client_id {
            query.push(("clienteId", id.to_string()));
        }
        if let Some(id) = self.salesperson_id {
            query.push(("comercialId", id.to_string()));
        }
        query
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(value)?)
}

/// Decode a list row by row, dropping rows that do not fit the record type.
fn decode_rows<T: DeserializeOwned>(path: &str, items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("skipping malformed {} row {}: {}", path, index, e);
                None
            }
        })
        .collect()
}

/// `entity/id` with the id percent-encoded as a single path segment.
fn record_path(entity: &str, id: impl Display) -> String {
    format!("{}/{}", entity, urlencoding::encode(&id.to_string()))
}

pub struct CrmClient {
    source: Box<dyn DataSource>,
    session: SessionState,
}

impl CrmClient {
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self {
            source,
            session: SessionState::new(),
        }
    }

    /// Client over the data source selected by `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(source::from_config(config))
    }

    pub fn source(&self) -> &dyn DataSource {
        self.source.as_ref()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        self.session.login(self.source.as_ref(), username, password)
    }

    pub fn logout(&mut self) {
        self.session.logout();
    }

    /// Raw call, for bodies that have no typed counterpart.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        query: &Query,
    ) -> Result<Payload, ApiError> {
        self.source.request(method, path, body, query)
    }

    fn list_where<E: Entity>(&self, query: &Query) -> Result<Vec<E>, ApiError> {
        match self.source.request(Method::Get, E::PATH, None, query)? {
            Payload::Json(Value::Array(items)) => Ok(decode_rows(E::PATH, items)),
            Payload::Json(other) => Err(ApiError::Decode(format!(
                "expected a list from {}, got {}",
                E::PATH,
                other
            ))),
            Payload::Empty => Ok(Vec::new()),
        }
    }

    /// Every record of `E`.
    pub fn list<E: Entity>(&self) -> Result<Vec<E>, ApiError> {
        self.list_where::<E>(&[])
    }

    /// Raw record at `path`.
    ///
    /// Some backend endpoints answer with a one-element list; the first
    /// element is taken.
    fn fetch_record(&self, path: &str) -> Result<Value, ApiError> {
        let not_found = || ApiError::NotFound(path.to_string());
        match self.source.request(Method::Get, path, None, &[])? {
            Payload::Json(Value::Array(items)) => items.into_iter().next().ok_or_else(not_found),
            Payload::Json(Value::Null) | Payload::Empty => Err(not_found()),
            Payload::Json(value) => Ok(value),
        }
    }

    /// One record of `E` by id.
    pub fn get<E: Entity>(&self, id: impl Display) -> Result<E, ApiError> {
        decode(self.fetch_record(&record_path(E::PATH, id))?)
    }

    pub fn create<E: Entity>(&self, draft: &E::Draft) -> Result<Payload, ApiError> {
        let body = serde_json::to_value(draft)?;
        self.source.request(Method::Post, E::PATH, Some(&body), &[])
    }

    pub fn update<E: Entity>(&self, id: impl Display, draft: &E::Draft) -> Result<Payload, ApiError> {
        let body = serde_json::to_value(draft)?;
        let path = record_path(E::PATH, id);
        self.source.request(Method::Put, &path, Some(&body), &[])
    }

    /// Change some fields of a stored record, keeping the rest.
    ///
    /// `changes` is a JSON object in either naming convention. The stored
    /// record is fetched, `changes` is laid over it, and the result must
    /// decode as `E::Draft` before the replacement is sent. Fields the
    /// caller leaves out (an invoice's status, issue date or product) keep
    /// their stored values.
    pub fn update_fields<E: Entity>(
        &self,
        id: impl Display,
        changes: &Value,
    ) -> Result<Payload, ApiError> {
        let Value::Object(changes) = normalize(changes.clone()) else {
            return Err(ApiError::Decode(format!(
                "changes for {} must be a JSON object",
                E::PATH
            )));
        };
        let path = record_path(E::PATH, id);
        let mut merged = match self.fetch_record(&path)? {
            Value::Object(current) => current,
            other => {
                return Err(ApiError::Decode(format!(
                    "expected an object from {}, got {}",
                    path, other
                )))
            }
        };
        merged.extend(changes);
        let draft: E::Draft = decode(Value::Object(merged))?;
        let body = serde_json::to_value(&draft)?;
        self.source.request(Method::Put, &path, Some(&body), &[])
    }

    pub fn delete<E: Entity>(&self, id: impl Display) -> Result<(), ApiError> {
        let path = record_path(E::PATH, id);
        self.source.request(Method::Delete, &path, None, &[])?;
        Ok(())
    }

    pub fn salespeople(&self) -> Result<Vec<Salesperson>, ApiError> {
        self.list::<Salesperson>()
    }

    pub fn clients(&self, filter: ClientFilter) -> Result<Vec<Client>, ApiError> {
        self.list_where::<Client>(&filter.query())
    }

    pub fn sections(&self) -> Result<Vec<Section>, ApiError> {
        self.list::<Section>()
    }

    pub fn products(&self, filter: ProductFilter) -> Result<Vec<Product>, ApiError> {
        self.list_where::<Product>(&filter.query())
    }

    pub fn invoices(&self, filter: InvoiceFilter) -> Result<Vec<Invoice>, ApiError> {
        self.list_where::<Invoice>(&filter.query())
    }

    /// Ask the backend to generate a report.
    pub fn start_report(&self, kind: ReportKind) -> Result<Payload, ApiError> {
        let path = format!("{}/{}", REPORTS_PATH, kind.as_wire());
        self.source.request(Method::Get, &path, None, &[])
    }

    pub fn api_statistics(&self) -> Result<ApiStatistics, ApiError> {
        match self.source.request(Method::Get, STATISTICS_PATH, None, &[])? {
            Payload::Json(value) => decode(value),
            Payload::Empty => Ok(ApiStatistics::default()),
        }
    }

    /// Have the backend write its statistics to `file` (or its default file).
    pub fn export_statistics(&self, file: Option<&str>) -> Result<(), ApiError> {
        let query: Vec<(&'static str, String)> =
            file.map(|f| ("file", f.to_string())).into_iter().collect();
        self.source.request(Method::Post, STATISTICS_PATH, None, &query)?;
        Ok(())
    }

    pub fn reset_statistics(&self) -> Result<(), ApiError> {
        self.source.request(Method::Delete, STATISTICS_PATH, None, &[])?;
        Ok(())
    }

    pub fn invoice_status_counts(&self) -> Result<StatusCounts, ApiError> {
        Ok(stats::status_counts(&self.invoices(InvoiceFilter::default())?))
    }

    pub fn monthly_revenue(&self) -> Result<RevenueSeries, ApiError> {
        Ok(stats::monthly_revenue(&self.invoices(InvoiceFilter::default())?))
    }

    pub fn total_revenue(&self) -> Result<Decimal, ApiError> {
        Ok(stats::total_revenue(&self.invoices(InvoiceFilter::default())?))
    }

    pub fn salesperson_ranking(&self) -> Result<Vec<RankingEntry>, ApiError> {
        let salespeople = self.salespeople()?;
        let invoices = self.invoices(InvoiceFilter::default())?;
        Ok(stats::salesperson_ranking(&salespeople, &invoices))
    }

    pub fn clients_per_salesperson(&self) -> Result<Vec<ClientCountEntry>, ApiError> {
        let salespeople = self.salespeople()?;
        let clients = self.clients(ClientFilter::default())?;
        Ok(stats::clients_per_salesperson(&salespeople, &clients))
    }

    /// Fetch salespeople, clients and invoices in turn and compute every aggregate.
    pub fn dashboard(&self) -> Result<Dashboard, ApiError> {
        let salespeople = self.salespeople()?;
        let clients = self.clients(ClientFilter::default())?;
        let invoices = self.invoices(InvoiceFilter::default())?;
        log::debug!(
            "dashboard snapshot from {}: {} salespeople, {} clients, {} invoices",
            self.source.describe(),
            salespeople.len(),
            clients.len(),
            invoices.len()
        );
        Ok(Dashboard::compute(&salespeople, &clients, &invoices))
    }
}
