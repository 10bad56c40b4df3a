use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Skill input/output records
// =============================================================================

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct InputRecordData {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub record_id: Option<String>,
    #[serde(default, deserialize_with = "record_data")]
    pub data: Option<InputRecordData>,
}

impl InputRecord {
    pub fn new(record_id: &str, name: &str) -> InputRecord {
        InputRecord {
            record_id: Some(record_id.to_string()),
            data: Some(InputRecordData {
                name: Some(name.to_string()),
            }),
        }
    }
}

/// One search hit as it appears in the skill output. `url` and
/// `dateLastCrawled` are intentionally not carried over from [`SearchHit`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntity {
    pub name: String,
    pub display_url: String,
    pub snippet: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecordData {
    pub data_entities: Vec<SearchEntity>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutputRecordMessage {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutputRecord {
    pub record_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<OutputRecordData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<OutputRecordMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<OutputRecordMessage>>,
}

impl OutputRecord {
    pub fn enriched(record_id: String, data: OutputRecordData) -> OutputRecord {
        OutputRecord {
            record_id,
            data: Some(data),
            errors: None,
            warnings: None,
        }
    }

    pub fn failed(record_id: String, message: String) -> OutputRecord {
        OutputRecord {
            record_id,
            data: None,
            errors: Some(vec![OutputRecordMessage { message }]),
            warnings: None,
        }
    }
}

// Lenient field decoders. A single odd field must not fail the whole batch
// or the whole search response.

/// Strings pass through and numbers or booleans are stringified (`2` -> `"2"`).
/// Null, arrays and objects decode as `None`.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A `data` value that is not a record data object is treated as missing,
/// which fails only that record.
fn record_data<'de, D>(deserializer: D) -> Result<Option<InputRecordData>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

// =============================================================================
// Custom search response envelope
// =============================================================================

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(rename = "_type")]
    pub kind: Option<String>,
    pub web_pages: Option<WebPages>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebPages {
    pub web_search_url: Option<String>,
    pub total_estimated_matches: Option<u64>,
    pub value: Option<Vec<SearchHit>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub display_url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub snippet: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date_last_crawled: Option<DateTime<Utc>>,
}

/// Crawl dates come back either as RFC 3339 or as a bare local timestamp
/// with seven fractional digits. Bare timestamps are read as UTC and anything
/// else is dropped instead of failing the whole response.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[test]
fn test_parse_timestamp() {
    let with_offset = parse_timestamp("2024-03-01T10:15:00.0000000Z").unwrap();
    assert_eq!(with_offset.to_rfc3339(), "2024-03-01T10:15:00+00:00");

    let bare = parse_timestamp("2024-03-01T10:15:00.0000000").unwrap();
    assert_eq!(bare, with_offset);

    assert!(parse_timestamp("last tuesday").is_none());
}
