//! JSON deserialization helpers for backend records
//!
//! The backend is not consistent about how it encodes amounts: `total` is
//! usually a currency string (`"1500.00€"`) but may arrive as a bare JSON
//! number. These deserializers accept either and keep the value as text so
//! parsing can happen later, one record at a time.

use crate::model::{parse_amount, parse_issue_date};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de;
use serde::Deserializer;

/// Custom deserializer that accepts a string or a number and yields a `String`
///
/// Numbers are rendered with their JSON representation, so `1500.5`
/// becomes `"1500.5"` and `42` becomes `"42"`.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use crmdesk::json_helpers::deserialize_text;
///
/// let val = deserialize_text(&json!("1500.00€")).unwrap();
/// assert_eq!(val, "1500.00€");
///
/// let val = deserialize_text(&json!(300)).unwrap();
/// assert_eq!(val, "300");
/// ```
pub fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a number")
        }

        fn visit_str<E>(self, value: &str) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_i64<E>(self, value: i64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_unit<E>(self) -> Result<String, E>
        where
            E: de::Error,
        {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

/// Custom deserializer for optional ids that accepts numbers, numeric strings, and null
///
/// Anything that is not an integer becomes `None` instead of failing the
/// whole record.
pub fn deserialize_option_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct OptionIdVisitor;

    impl<'de> Visitor<'de> for OptionIdVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer id, a numeric string, or null")
        }

        fn visit_none<E>(self) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Option<i64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(OptionIdVisitor)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(i64::try_from(value).ok())
        }

        fn visit_f64<E>(self, _value: f64) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_str<E>(self, value: &str) -> Result<Option<i64>, E>
        where
            E: de::Error,
        {
            Ok(value.trim().parse().ok())
        }
    }

    deserializer.deserialize_option(OptionIdVisitor)
}

/// Custom deserializer for money written as text or a number, e.g. `"1,500.00€"` or `99.5`
///
/// Accepts the backend's own currency formatting so a stored record can be
/// read back as a draft.
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let text = deserialize_text(deserializer)?;
    parse_amount(&text)
        .ok_or_else(|| de::Error::custom(format!("invalid amount: {:?}", text)))
}

/// Custom deserializer for an issue date, with or without a `T...` time suffix
pub fn deserialize_issue_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = deserialize_text(deserializer)?;
    parse_issue_date(&text)
        .ok_or_else(|| de::Error::custom(format!("invalid issue date: {:?}", text)))
}
