//! Field-name normalization.
//!
//! The backend names fields in camelCase (`clienteId`, `fechaEmision`); the
//! records in this crate use snake_case (`cliente_id`, `fecha_emision`).
//! [`normalize`] rewrites keys found in [`KEY_MAPPING`] and leaves everything
//! else alone, recursing through objects and arrays.

use serde_json::{Map, Value};

/// Backend key → local key. No local key appears on the left-hand side,
/// so normalizing twice is the same as normalizing once.
pub const KEY_MAPPING: &[(&str, &str)] = &[
    ("clienteId", "cliente_id"),
    ("comercialId", "comercial_id"),
    ("productoId", "producto_id"),
    ("seccionId", "seccion_id"),
    ("facturaId", "factura_id"),
    ("passwordHash", "password_hash"),
    ("fechaEmision", "fecha_emision"),
    ("precioBase", "precio_base"),
    ("plazasDisponibles", "plazas_disponibles"),
];

/// Local name for a backend key, or the key itself when it is not mapped.
pub fn local_key(key: &str) -> &str {
    KEY_MAPPING
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| *to)
        .unwrap_or(key)
}

/// Rewrite every mapped key in `value`, recursively.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, inner) in map {
                out.insert(local_key(&key).to_string(), normalize(inner));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        scalar => scalar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rewrites_known_keys() {
        let raw = json!({
            "facturaId": "F-001",
            "clienteId": 1,
            "comercialId": 2,
            "fechaEmision": "2025-01-05T10:00:00",
            "estado": "pagada",
            "total": "1500.00€"
        });
        let normalized = normalize(raw);
        assert_eq!(normalized["factura_id"], "F-001");
        assert_eq!(normalized["cliente_id"], 1);
        assert_eq!(normalized["comercial_id"], 2);
        assert_eq!(normalized["fecha_emision"], "2025-01-05T10:00:00");
        assert_eq!(normalized["estado"], "pagada");
        assert!(normalized.get("clienteId").is_none());
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let raw = json!({"nombre": "Ana", "someOtherKey": true});
        assert_eq!(normalize(raw.clone()), raw);
    }

    #[test]
    fn test_recurses_into_nested_values() {
        let raw = json!({
            "cliente": {"clienteId": 7, "comercialId": 1},
            "lineas": [{"productoId": 101}, {"productoId": 102, "seccionId": 2}]
        });
        let normalized = normalize(raw);
        assert_eq!(normalized["cliente"]["cliente_id"], 7);
        assert_eq!(normalized["cliente"]["comercial_id"], 1);
        assert_eq!(normalized["lineas"][0]["producto_id"], 101);
        assert_eq!(normalized["lineas"][1]["seccion_id"], 2);
    }

    #[test]
    fn test_scalar_leaves_untouched() {
        // String values that look like keys are data, not keys
        assert_eq!(normalize(json!("clienteId")), json!("clienteId"));
        assert_eq!(normalize(json!(42)), json!(42));
        assert_eq!(normalize(Value::Null), Value::Null);
    }

    #[test]
    fn test_idempotent() {
        let raw = json!([
            {"comercialId": 1, "nombre": "Ana", "passwordHash": "x"},
            {"clienteId": 3, "datos": {"fechaEmision": "2025-02-01"}}
        ]);
        let once = normalize(raw);
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sequence_is_normalized_element_wise() {
        let items = vec![
            json!({"clienteId": 1}),
            json!({"nombre": "sin ids"}),
            json!({"productoId": 9, "precioBase": "12.00"}),
        ];
        let normalized = normalize(Value::Array(items.clone()));
        let normalized = normalized.as_array().unwrap();
        assert_eq!(normalized.len(), items.len());
        for (got, original) in normalized.iter().zip(items) {
            assert_eq!(got, &normalize(original));
        }
    }

    #[test]
    fn test_mapping_targets_are_never_sources() {
        for (_, to) in KEY_MAPPING {
            assert_eq!(local_key(to), *to);
        }
    }
}
