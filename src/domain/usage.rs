// Usage domain models and the validation boundary for raw usage payloads
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("model {model_id}: malformed timestamp {raw:?}")]
    MalformedTimestamp { model_id: String, raw: String },
    #[error("model {model_id}: malformed request count {raw}")]
    MalformedCount { model_id: String, raw: String },
}

/// One timestamped count of requests served by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub request_count: u64,
}

impl UsageRecord {
    pub fn new(timestamp: DateTime<Utc>, request_count: u64) -> Self {
        Self {
            timestamp,
            request_count,
        }
    }

    /// Validate a raw record. This is the only place record text is parsed.
    pub fn parse(model_id: &str, raw: &WireUsageRecord) -> Result<Self, RecordError> {
        let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| {
            RecordError::MalformedTimestamp {
                model_id: model_id.to_string(),
                raw: raw.timestamp.clone(),
            }
        })?;
        let request_count = coerce_count(&raw.requests).ok_or_else(|| RecordError::MalformedCount {
            model_id: model_id.to_string(),
            raw: raw.requests.to_string(),
        })?;

        Ok(Self::new(timestamp, request_count))
    }

    pub fn to_wire(&self) -> WireUsageRecord {
        WireUsageRecord {
            timestamp: format_timestamp(&self.timestamp),
            requests: serde_json::Value::from(self.request_count),
        }
    }
}

/// A model's usage records in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelUsage {
    pub model_id: String,
    pub display_name: String,
    pub records: Vec<UsageRecord>,
}

impl ModelUsage {
    pub fn new(model_id: String, display_name: String, records: Vec<UsageRecord>) -> Self {
        Self {
            model_id,
            display_name,
            records,
        }
    }

    /// All-time total, saturating at `u64::MAX`
    pub fn total_requests(&self) -> u64 {
        saturating_total(&self.records)
    }

    pub fn to_wire(&self) -> WireModelUsage {
        WireModelUsage {
            model_id: self.model_id.clone(),
            name: self.display_name.clone(),
            usage_records: self.records.iter().map(UsageRecord::to_wire).collect(),
        }
    }
}

impl TryFrom<WireModelUsage> for ModelUsage {
    type Error = RecordError;

    fn try_from(wire: WireModelUsage) -> Result<Self, Self::Error> {
        let records = wire
            .usage_records
            .iter()
            .map(|r| UsageRecord::parse(&wire.model_id, r))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(wire.model_id, wire.name, records))
    }
}

/// Validate a whole usage payload; the first malformed record fails it.
pub fn parse_usage(wire: Vec<WireModelUsage>) -> Result<Vec<ModelUsage>, RecordError> {
    wire.into_iter().map(ModelUsage::try_from).collect()
}

/// A single record to append, as sent by producers of usage data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    pub model_id: String,
    pub display_name: String,
    pub record: UsageRecord,
}

impl UsageEntry {
    pub fn to_wire(&self) -> WireUsageEntry {
        let record = self.record.to_wire();
        WireUsageEntry {
            model_id: self.model_id.clone(),
            name: self.display_name.clone(),
            timestamp: record.timestamp,
            requests: record.requests,
        }
    }
}

impl TryFrom<WireUsageEntry> for UsageEntry {
    type Error = RecordError;

    fn try_from(wire: WireUsageEntry) -> Result<Self, Self::Error> {
        let raw = WireUsageRecord {
            timestamp: wire.timestamp,
            requests: wire.requests,
        };
        let record = UsageRecord::parse(&wire.model_id, &raw)?;

        Ok(Self {
            model_id: wire.model_id,
            display_name: wire.name,
            record,
        })
    }
}

// Wire shapes shared by the HTTP surface and the remote data source

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireUsageRecord {
    pub timestamp: String,
    pub requests: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireModelUsage {
    #[serde(rename = "model_uid")]
    pub model_id: String,
    pub name: String,
    #[serde(rename = "usageRecords", default)]
    pub usage_records: Vec<WireUsageRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireUsageEntry {
    #[serde(rename = "model_uid")]
    pub model_id: String,
    pub name: String,
    pub timestamp: String,
    pub requests: serde_json::Value,
}

/// Text acknowledgement returned by the write operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parse RFC 3339, or a naive date-time which is taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}

fn coerce_count(raw: &serde_json::Value) -> Option<u64> {
    match raw {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                s.parse().ok()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Sum request counts without wrapping; a total past `u64::MAX` pins there.
pub fn saturating_total(records: &[UsageRecord]) -> u64 {
    records
        .iter()
        .fold(0u64, |total, r| total.saturating_add(r.request_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(timestamp: &str, requests: serde_json::Value) -> WireUsageRecord {
        WireUsageRecord {
            timestamp: timestamp.to_string(),
            requests,
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = parse_timestamp("2024-05-01T10:00:00Z").unwrap();
        assert_eq!(parse_timestamp("2024-05-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01T10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 10:00:00"), Some(expected));
        assert_eq!(parse_timestamp(" 2024-05-01T10:00:00.000Z "), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_parse_record_coerces_counts() {
        let r = UsageRecord::parse("gpt", &raw("2024-05-01T10:00:00Z", json!(12))).unwrap();
        assert_eq!(r.request_count, 12);

        let r = UsageRecord::parse("gpt", &raw("2024-05-01T10:00:00Z", json!("34"))).unwrap();
        assert_eq!(r.request_count, 34);
    }

    #[test]
    fn test_parse_record_rejects_bad_counts() {
        for bad in [json!(-1), json!(1.5), json!("12a"), json!(""), json!(null), json!(true)] {
            let err = UsageRecord::parse("gpt", &raw("2024-05-01T10:00:00Z", bad)).unwrap_err();
            assert!(matches!(err, RecordError::MalformedCount { ref model_id, .. } if model_id == "gpt"));
        }
    }

    #[test]
    fn test_malformed_timestamp_names_model_and_value() {
        let wire = WireModelUsage {
            model_id: "claude".to_string(),
            name: "Claude".to_string(),
            usage_records: vec![
                raw("2024-05-01T10:00:00Z", json!(1)),
                raw("not a time", json!(2)),
            ],
        };

        let err = ModelUsage::try_from(wire).unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedTimestamp {
                model_id: "claude".to_string(),
                raw: "not a time".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_usage_keeps_insertion_order() {
        let wire: Vec<WireModelUsage> = serde_json::from_value(json!([
            {
                "model_uid": "m1",
                "name": "Model One",
                "usageRecords": [
                    { "timestamp": "2024-05-01T11:00:00Z", "requests": 3 },
                    { "timestamp": "2024-05-01T10:00:00Z", "requests": "5" }
                ]
            },
            { "model_uid": "m2", "name": "Model Two" }
        ]))
        .unwrap();

        let usage = parse_usage(wire).unwrap();
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].records[0].request_count, 3);
        assert_eq!(usage[0].records[1].request_count, 5);
        assert_eq!(usage[0].total_requests(), 8);
        assert!(usage[1].records.is_empty());
    }

    #[test]
    fn test_total_requests_saturates() {
        let t = parse_timestamp("2024-05-01T10:00:00Z").unwrap();
        let usage = ModelUsage::new(
            "m1".to_string(),
            "Model One".to_string(),
            vec![UsageRecord::new(t, u64::MAX), UsageRecord::new(t, 1)],
        );
        assert_eq!(usage.total_requests(), u64::MAX);
    }

    #[test]
    fn test_wire_shape_uses_source_field_names() {
        let usage = ModelUsage::new(
            "m1".to_string(),
            "Model One".to_string(),
            vec![UsageRecord::new(parse_timestamp("2024-05-01T10:00:00Z").unwrap(), 7)],
        );

        let value = serde_json::to_value(usage.to_wire()).unwrap();
        assert_eq!(
            value,
            json!({
                "model_uid": "m1",
                "name": "Model One",
                "usageRecords": [{ "timestamp": "2024-05-01T10:00:00Z", "requests": 7 }]
            })
        );
    }
}
