//! Upstream wire types: the generic tabular shape every Swiss Unihockey
//! endpoint answers with. These carry no endpoint semantics; the layout
//! resolver in layout.rs turns rows of cells into domain records.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Every response is wrapped as `{"type": ..., "data": {...}}`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Envelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: TabularResponse,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct TabularResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subtitle: String,
    /// Season, league, game class and group as upstream chose them. Often
    /// incomplete and sometimes wrong for the rows that follow.
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Vec<Header>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tabs: Vec<Tab>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub regions: Vec<Region>,
}

impl TabularResponse {
    pub fn context_str(&self, key: &str) -> Option<String> {
        context_value(&self.context, key)
    }

    /// All rows of all regions, paired with the label of their region.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.regions
            .iter()
            .flat_map(|region| region.rows.iter().map(move |row| (region.label.as_str(), row)))
    }

    /// Column index of the first header whose label contains one of `labels`.
    pub fn header_index(&self, labels: &[&str]) -> Option<usize> {
        self.headers.iter().position(|h| {
            let text = h.text.to_lowercase();
            !text.is_empty() && labels.iter().any(|l| text.contains(l))
        })
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Header {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

/// One selectable tab. On `/rankings` each tab stands for one standings
/// table and its context names the league it belongs to.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Tab {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub context: Map<String, Value>,
}

impl Tab {
    pub fn context_str(&self, key: &str) -> Option<String> {
        context_value(&self.context, key)
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Region {
    #[serde(default, rename = "text", deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<Row>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Row {
    #[serde(default, deserialize_with = "opt_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub link: Option<EntityLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cells: Vec<Cell>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Cell {
    #[serde(default, deserialize_with = "text_fragments")]
    pub text: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub link: Option<EntityLink>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<Image>,
    #[serde(default, deserialize_with = "lenient")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct EntityLink {
    #[serde(default, deserialize_with = "ids")]
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Image {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
}

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq)]
pub struct Coordinates {
    #[serde(deserialize_with = "coordinate")]
    pub lat: f64,
    #[serde(deserialize_with = "coordinate")]
    pub lng: f64,
}

// ---------------------------------------------------------------------------
// Lenient scalar decoding, upstream mixes numbers and strings freely
// ---------------------------------------------------------------------------

fn context_value(context: &Map<String, Value>, key: &str) -> Option<String> {
    context.get(key).and_then(scalar_to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Drops a malformed optional part instead of failing the whole payload.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

fn ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_string).collect(),
        Some(other) => scalar_to_string(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

/// `text` is usually a list of fragments but single strings show up too.
fn text_fragments<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let fragment = |v: &Value| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    Ok(match value {
        Some(Value::Array(items)) => items.iter().filter_map(fragment).collect(),
        Some(other) => fragment(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

fn coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("coordinate out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid coordinate {s:?}: {e}"))),
        other => Err(serde::de::Error::custom(format!("invalid coordinate {other}"))),
    }
}
