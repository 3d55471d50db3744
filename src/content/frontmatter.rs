//! Front-matter parsing and serialization
//!
//! A content file is a `---` delimited YAML block followed by a blank line
//! and the Markdown/MDX body. Field values are restricted to a small set of
//! shapes (see [`FieldValue`]) so that every rewrite round-trips.

use indexmap::IndexMap;
use std::fmt::Write as _;

/// Fields written first, in this order, by [`serialize`]
const CANONICAL_ORDER: [&str; 6] = ["title", "publishedAt", "updatedAt", "summary", "image", "tags"];

const DELIMITER: &str = "---";

/// Why a content file has no usable front-matter
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("missing opening `---` front-matter delimiter")]
    MissingDelimiter,

    #[error("front-matter block is never closed with `---`")]
    Unterminated,

    #[error("invalid YAML in front-matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front-matter is not a key-value mapping")]
    NotAMapping,

    #[error("front-matter key must be a string")]
    NonStringKey,

    #[error("unsupported value for front-matter field \"{0}\"")]
    UnsupportedValue(String),
}

/// A single front-matter value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Number(serde_yaml::Number),
    Bool(bool),
    List(Vec<String>),
    Null,
}

impl FieldValue {
    /// Scalar value rendered as text (strings, numbers, booleans)
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::List(_) | FieldValue::Null => None,
        }
    }

    /// List value; a lone scalar is a one-element list
    pub fn as_list(&self) -> Vec<String> {
        match self {
            FieldValue::List(items) => items.clone(),
            value => value.as_text().into_iter().collect(),
        }
    }

    fn from_yaml(key: &str, value: serde_yaml::Value) -> Result<Self, FrontmatterError> {
        use serde_yaml::Value;

        match value {
            Value::String(s) => Ok(FieldValue::String(s)),
            Value::Number(n) => Ok(FieldValue::Number(n)),
            Value::Bool(b) => Ok(FieldValue::Bool(b)),
            Value::Null => Ok(FieldValue::Null),
            Value::Sequence(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    _ => Err(FrontmatterError::UnsupportedValue(key.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            Value::Mapping(_) | Value::Tagged(_) => {
                Err(FrontmatterError::UnsupportedValue(key.to_string()))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

/// Ordered front-matter fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: IndexMap<String, FieldValue>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Text of a scalar field, `None` when absent or blank
    pub fn get_text(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(FieldValue::as_text)
            .filter(|s| !s.trim().is_empty())
    }

    /// A list field; a lone scalar is treated as a one-element list
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key).map(FieldValue::as_list).unwrap_or_default()
    }

    /// Insert or replace a field. A new key goes to the end, an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in serialization order: the canonical fields first, then the rest as they came
    pub fn canonical_fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        let known = CANONICAL_ORDER
            .iter()
            .filter_map(|key| self.fields.get_key_value(*key));
        let rest = self
            .fields
            .iter()
            .filter(|(key, _)| !CANONICAL_ORDER.contains(&key.as_str()));
        known.chain(rest).map(|(key, value)| (key.as_str(), value))
    }
}

/// A content file split into front-matter and body
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub data: FrontMatter,
    pub body: String,
}

/// Split a content file into front-matter and body
pub fn parse(raw: &str) -> Result<Document, FrontmatterError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut lines = raw.split_inclusive('\n');
    let first = lines.next().ok_or(FrontmatterError::MissingDelimiter)?;
    if first.trim_end() != DELIMITER {
        return Err(FrontmatterError::MissingDelimiter);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    let mut block = None;
    for line in lines {
        if line.trim_end() == DELIMITER {
            block = Some((&raw[yaml_start..offset], offset + line.len()));
            break;
        }
        offset += line.len();
    }
    let (yaml, body_start) = block.ok_or(FrontmatterError::Unterminated)?;

    let rest = &raw[body_start..];
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    Ok(Document {
        data: parse_fields(yaml)?,
        body: body.to_string(),
    })
}

fn parse_fields(yaml: &str) -> Result<FrontMatter, FrontmatterError> {
    let mut data = FrontMatter::new();
    if yaml.trim().is_empty() {
        return Ok(data);
    }

    match serde_yaml::from_str::<serde_yaml::Value>(yaml)? {
        serde_yaml::Value::Null => {}
        serde_yaml::Value::Mapping(mapping) => {
            for (key, value) in mapping {
                let key = match key {
                    serde_yaml::Value::String(key) => key,
                    _ => return Err(FrontmatterError::NonStringKey),
                };
                let value = FieldValue::from_yaml(&key, value)?;
                data.insert(key, value);
            }
        }
        _ => return Err(FrontmatterError::NotAMapping),
    }

    Ok(data)
}

/// Build a content file from a body and its front-matter
pub fn serialize(body: &str, data: &FrontMatter) -> String {
    let mut out = String::with_capacity(body.len() + 256);
    out.push_str(DELIMITER);
    out.push('\n');

    for (key, value) in data.canonical_fields() {
        let _ = writeln!(out, "{}: {}", yaml_key(key), yaml_value(value));
    }

    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(body);
    out
}

/// Keys are written bare only when YAML reads them back as the same string
fn yaml_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && matches!(
            serde_yaml::from_str::<serde_yaml::Value>(key),
            Ok(serde_yaml::Value::String(read)) if read == key
        );
    if plain {
        key.to_string()
    } else {
        quote(key)
    }
}

fn yaml_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) => quote(s),
        FieldValue::Number(n) => n.to_string(),
        FieldValue::Bool(b) => b.to_string(),
        FieldValue::List(items) => {
            let items: Vec<String> = items.iter().map(|item| quote(item)).collect();
            format!("[{}]", items.join(", "))
        }
        FieldValue::Null => "null".to_string(),
    }
}

/// YAML double-quoted scalar
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
