//! In-memory data source for working without a backend.
//!
//! Reads are served from a fixed set of records already in local naming;
//! writes are accepted and discarded.

use super::{DataSource, Method, Payload, Query};
use crate::auth::{LoginOutcome, Session};
use crate::error::ApiError;
use crate::normalize::local_key;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

const FIXTURE_USER: &str = "admin";
const FIXTURE_PASSWORD: &str = "1234";

struct Table {
    path: &'static str,
    key: &'static str,
    rows: Vec<Value>,
}

static TABLES: Lazy<Vec<Table>> = Lazy::new(|| {
    vec![
        Table {
            path: "comerciales",
            key: "comercial_id",
            rows: vec![
                json!({"comercial_id": 1, "nombre": "Ana García", "email": "ana@xtart.com", "telefono": "601", "rol": "admin", "username": "ana"}),
                json!({"comercial_id": 2, "nombre": "Juan Pérez", "email": "juan@xtart.com", "telefono": "602", "rol": "comercial", "username": "juan"}),
                json!({"comercial_id": 3, "nombre": "Laura Soto", "email": "laura@xtart.com", "telefono": "603", "rol": "comercial", "username": "laura"}),
            ],
        },
        Table {
            path: "clientes",
            key: "cliente_id",
            rows: vec![
                json!({"cliente_id": 1, "nombre": "Cliente Uno", "apellidos": "S.L.", "edad": 35, "email": "c1@e.com", "telefono": "911", "comercial_id": 1}),
                json!({"cliente_id": 2, "nombre": "Cliente Dos", "apellidos": "S.A.", "edad": 40, "email": "c2@e.com", "telefono": "912", "comercial_id": 2}),
                json!({"cliente_id": 3, "nombre": "Cliente Tres", "apellidos": "Corp.", "edad": 28, "email": "c3@e.com", "telefono": "913", "comercial_id": 1}),
            ],
        },
        Table {
            path: "secciones",
            key: "seccion_id",
            rows: vec![
                json!({"seccion_id": 1, "nombre": "Electrónica"}),
                json!({"seccion_id": 2, "nombre": "Hogar"}),
            ],
        },
        Table {
            path: "productos",
            key: "producto_id",
            rows: vec![
                json!({"producto_id": 101, "nombre": "Laptop X1", "precio_base": "1200.00", "plazas_disponibles": 50, "seccion_id": 1}),
                json!({"producto_id": 102, "nombre": "Aspiradora V2", "precio_base": "300.00", "plazas_disponibles": 150, "seccion_id": 2}),
            ],
        },
        Table {
            path: "facturas",
            key: "factura_id",
            rows: vec![
                json!({"factura_id": "F-001", "cliente_id": 1, "comercial_id": 1, "fecha_emision": "2025-01-05", "estado": "pagada", "total": "1500.00€"}),
                json!({"factura_id": "F-002", "cliente_id": 2, "comercial_id": 2, "fecha_emision": "2025-01-15", "estado": "pendiente", "total": "500.50€"}),
                json!({"factura_id": "F-003", "cliente_id": 3, "comercial_id": 1, "fecha_emision": "2025-01-25", "estado": "pagada", "total": "2500.00€"}),
                json!({"factura_id": "F-004", "cliente_id": 1, "comercial_id": 1, "fecha_emision": "2025-02-01", "estado": "pagada", "total": "3000.00€"}),
                json!({"factura_id": "F-008", "cliente_id": 2, "comercial_id": 2, "fecha_emision": "2025-03-20", "estado": "pagada", "total": "2500.00€"}),
            ],
        },
    ]
});

/// Render a scalar the way it would appear in a query string.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches_query(row: &Value, query: &Query) -> bool {
    query.iter().all(|(param, expected)| {
        row.get(local_key(param))
            .and_then(scalar_text)
            .is_some_and(|actual| actual == *expected)
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSource;

impl FixtureSource {
    pub fn new() -> Self {
        Self
    }

    fn get(&self, path: &str, query: &Query) -> Result<Payload, ApiError> {
        let mut segments = path.trim_matches('/').splitn(2, '/');
        let entity = segments.next().unwrap_or_default();
        let id = segments.next();

        match entity {
            "estadisticas" => {
                return Ok(Payload::Json(json!({"peticionesTotales": 100, "fallos": 5})))
            }
            "informes" => return Ok(Payload::Empty),
            _ => {}
        }

        let Some(table) = TABLES.iter().find(|t| t.path == entity) else {
            return Ok(Payload::Json(Value::Array(Vec::new())));
        };

        match id {
            Some(id) => table
                .rows
                .iter()
                .find(|row| row.get(table.key).and_then(scalar_text).as_deref() == Some(id))
                .cloned()
                .map(Payload::Json)
                .ok_or_else(|| ApiError::Http {
                    status: 404,
                    body: format!("{} {} not found", entity, id),
                }),
            None => Ok(Payload::Json(Value::Array(
                table
                    .rows
                    .iter()
                    .filter(|row| matches_query(row, query))
                    .cloned()
                    .collect(),
            ))),
        }
    }
}

impl DataSource for FixtureSource {
    fn request(
        &self,
        method: Method,
        path: &str,
        _body: Option<&Value>,
        query: &Query,
    ) -> Result<Payload, ApiError> {
        match method {
            Method::Get => self.get(path, query),
            _ => {
                log::debug!("fixture source accepted {} {} without storing it", method, path);
                Ok(Payload::Empty)
            }
        }
    }

    fn login(&self, username: &str, password: &str) -> LoginOutcome {
        if username.to_lowercase() == FIXTURE_USER && password == FIXTURE_PASSWORD {
            LoginOutcome::Authenticated(Session {
                username: username.to_string(),
                display_name: "Administrador".to_string(),
                role: "admin".to_string(),
            })
        } else {
            LoginOutcome::InvalidCredentials
        }
    }

    fn describe(&self) -> String {
        "fixtures".to_string()
    }
}
