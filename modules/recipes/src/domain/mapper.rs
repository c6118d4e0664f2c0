//! Conversions between the store's wire values and domain values.

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use chrono::{DateTime, Utc};
use query_core::ast::Value;
use query_core::FilterClause;

use crate::contract::error::StoreError;
use crate::contract::model::{Document, Fields};
use crate::domain::store::{RawDocument, RawFields, RawFilter, RawValue};

/// Convert a seconds-based store timestamp into a point in time.
pub fn timestamp_to_datetime(seconds: i64, nanos: u32) -> Result<DateTime<Utc>, StoreError> {
    DateTime::<Utc>::from_timestamp(seconds, nanos).ok_or_else(|| {
        StoreError::malformed(format!("timestamp out of range: {}s {}ns", seconds, nanos))
    })
}

pub fn raw_to_value(raw: RawValue) -> Result<Value, StoreError> {
    Ok(match raw {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(b),
        RawValue::Integer(i) => Value::Number(BigDecimal::from(i)),
        RawValue::Double(f) => Value::Number(
            BigDecimal::from_f64(f)
                .ok_or_else(|| StoreError::malformed(format!("non-finite number: {}", f)))?,
        ),
        RawValue::String(s) => Value::String(s),
        RawValue::Timestamp { seconds, nanos } => {
            Value::DateTime(timestamp_to_datetime(seconds, nanos)?)
        }
    })
}

pub fn value_to_raw(value: &Value) -> Result<RawValue, StoreError> {
    Ok(match value {
        Value::Null => RawValue::Null,
        Value::Bool(b) => RawValue::Bool(*b),
        Value::Number(n) => match n.is_integer().then(|| n.to_i64()).flatten() {
            Some(i) => RawValue::Integer(i),
            None => RawValue::Double(
                n.to_f64()
                    .ok_or_else(|| StoreError::malformed(format!("number out of range: {}", n)))?,
            ),
        },
        Value::String(s) => RawValue::String(s.clone()),
        Value::DateTime(dt) => RawValue::Timestamp {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        },
    })
}

pub fn filter_to_raw(clause: &FilterClause) -> Result<RawFilter, StoreError> {
    Ok(RawFilter {
        field: clause.field.clone(),
        op: clause.op,
        value: value_to_raw(&clause.value)?,
    })
}

/// Convert a store document to a contract model
pub fn document_from_raw(raw: RawDocument) -> Result<Document, StoreError> {
    let fields = raw
        .fields
        .into_iter()
        .map(|(name, value)| raw_to_value(value).map(|v| (name, v)))
        .collect::<Result<Fields, _>>()?;
    Ok(Document::new(raw.id, fields))
}

pub fn fields_to_raw(fields: &Fields) -> Result<RawFields, StoreError> {
    fields
        .iter()
        .map(|(name, value)| value_to_raw(value).map(|v| (name.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_seconds_become_datetime() {
        let value = raw_to_value(RawValue::Timestamp {
            seconds: 1_600_000_000,
            nanos: 500,
        })
        .unwrap();
        let expected = Utc.timestamp_opt(1_600_000_000, 500).unwrap();
        assert_eq!(value, Value::DateTime(expected));
    }

    #[test]
    fn test_out_of_range_timestamp_is_malformed() {
        let result = raw_to_value(RawValue::Timestamp {
            seconds: i64::MAX,
            nanos: 0,
        });
        assert!(matches!(result, Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn test_non_finite_double_is_malformed() {
        let result = raw_to_value(RawValue::Double(f64::NAN));
        assert!(matches!(result, Err(StoreError::Malformed { .. })));
    }

    #[test]
    fn test_datetime_goes_back_to_timestamp() {
        let dt = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(
            value_to_raw(&Value::DateTime(dt)).unwrap(),
            RawValue::Timestamp {
                seconds: dt.timestamp(),
                nanos: 0
            }
        );
    }

    #[test]
    fn test_numbers_keep_integer_kind_when_possible() {
        assert_eq!(
            value_to_raw(&Value::from(7i64)).unwrap(),
            RawValue::Integer(7)
        );
        let half = BigDecimal::from_f64(0.5).unwrap();
        assert_eq!(
            value_to_raw(&Value::Number(half)).unwrap(),
            RawValue::Double(0.5)
        );
    }

    #[test]
    fn test_document_from_raw_keeps_id_and_fields() {
        let mut fields = RawFields::new();
        fields.insert("name".into(), RawValue::String("Pancakes".into()));
        fields.insert("isPublished".into(), RawValue::Bool(true));
        fields.insert(
            "publishDate".into(),
            RawValue::Timestamp {
                seconds: 60,
                nanos: 0,
            },
        );

        let doc = document_from_raw(RawDocument {
            id: "r1".into(),
            fields,
        })
        .unwrap();

        assert_eq!(doc.id, "r1");
        assert_eq!(doc.get_str("name"), Some("Pancakes"));
        assert!(doc.is_published());
        assert_eq!(doc.published_at().map(|d| d.timestamp()), Some(60));
    }
}
