//! # crmdesk
//!
//! Blocking access layer for the CRM backend: typed CRUD over salespeople,
//! clients, sections, products and invoices, form-encoded login, field-name
//! normalization of backend JSON, and the dashboard aggregates computed
//! from it.
//!
//! ```no_run
//! use crmdesk::{ClientConfig, CrmClient};
//!
//! let config = ClientConfig::load()?;
//! let client = CrmClient::from_config(&config);
//! let dashboard = client.dashboard()?;
//! println!("{} total", dashboard.total_revenue);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod json_helpers;
pub mod metrics;
pub mod model;
pub mod normalize;
pub mod source;
pub mod stats;

pub use auth::{LoginOutcome, Session, SessionState};
pub use client::{ClientFilter, CrmClient, InvoiceFilter, ProductFilter};
pub use config::{ClientConfig, DataSourceKind};
pub use error::ApiError;
pub use source::{DataSource, FixtureSource, LiveSource, Method, Payload};
