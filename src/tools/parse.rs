// Field parsers: turn delimited form strings into maps and lists.
//
// Splitting follows the form's historical behaviour: a pair is split on `=` and only the
// first two segments are kept, so `a=b=c` yields key `a` and value `b`.

use serde::Serialize;
use serde_json::{Map as JsonMap, Value};

/// An ordered `name`/`value` pair as it appears in a container `env` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

fn split_pair(pair: &str) -> (&str, Option<&str>) {
    let mut parts = pair.split('=');
    let key = parts.next().unwrap_or("");
    (key, parts.next())
}

/// `k1=v1,k2=v2` into a key/value map. Later duplicates overwrite earlier ones in place.
/// A pair without `=` maps its key to an empty string; an empty input yields `{"": ""}`.
pub fn parse_labels(s: &str) -> JsonMap<String, Value> {
    let mut labels = JsonMap::new();
    for pair in s.split(',') {
        let (key, value) = split_pair(pair);
        labels.insert(
            key.trim().to_string(),
            Value::String(value.map(str::trim).unwrap_or("").to_string()),
        );
    }
    labels
}

/// `K=V,...` into an ordered list; order and duplicates are preserved.
pub fn parse_env_vars(s: &str) -> Vec<EnvVar> {
    s.split(',')
        .map(|pair| {
            let (name, value) = split_pair(pair);
            EnvVar {
                name: name.trim().to_string(),
                value: value.map(str::trim).unwrap_or("").to_string(),
            }
        })
        .collect()
}

/// One `key=value` per line. Lines with an empty key, no `=` or an empty value are skipped.
pub fn parse_key_value_lines(s: &str) -> JsonMap<String, Value> {
    let mut entries = JsonMap::new();
    for line in s.split('\n') {
        match split_pair(line) {
            (key, Some(value)) if !key.is_empty() && !value.is_empty() => {
                entries.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
            }
            _ => {}
        }
    }
    entries
}

/// Comma-separated `key=value` pairs keeping only pairs with both a key and a value
/// (Secret data, StorageClass parameters).
pub fn parse_pairs(s: &str) -> JsonMap<String, Value> {
    let mut pairs = JsonMap::new();
    for pair in s.split(',') {
        match split_pair(pair) {
            (key, Some(value)) if !key.is_empty() && !value.is_empty() => {
                pairs.insert(key.trim().to_string(), Value::String(value.trim().to_string()));
            }
            _ => {}
        }
    }
    pairs
}

/// Comma-separated list with each item trimmed.
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',').map(|item| item.trim().to_string()).collect()
}

/// Everything after the first `=` of a line, for values that may themselves contain `=`.
pub fn value_after_key(line: &str) -> &str {
    line.split_once('=').map(|(_, value)| value.trim()).unwrap_or("")
}
