//! Lookup of nested values in JSON documents with a slash separated path.
//!
//! `m2m:cnt/rn` descends by key, `m2m:cnt/lbl/{0}` selects an element by
//! index, and `m2m:cnt/m2m:cin/{}/rn` fans the remaining path out over all
//! elements of a collection:
//!
//! ```
//! use serde_json::{json, Value};
//! use onem2m_notebook::xpath::find_xpath;
//!
//! let resource = json!({"m2m:cnt": {"m2m:cin": [{"rn": "a"}, {"rn": "b"}]}});
//! assert_eq!(find_xpath(&resource, "m2m:cnt/m2m:cin/{}/rn", Value::Null), json!(["a", "b"]));
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    static ref INDEX: Regex = Regex::new(r"\{(\d+)\}").unwrap();
}

/// Find the value at `path` in `data`, returning `default` if any segment
/// cannot be resolved.
///
/// An index segment `{n}` on a mapping selects the value of the n-th key in
/// document order.
pub fn find_xpath(data: &Value, path: &str, default: Value) -> Value {
    let segments: Vec<&str> = path.split('/').collect();
    lookup(data, &segments, &default)
}

/// Borrowing variant of [`find_xpath`] for paths without a `{}` wildcard.
/// Returns `None` where [`find_xpath`] would return the default, and also
/// for wildcard paths whose result would have to be assembled.
pub fn find_xpath_ref<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = data;
    let segments: Vec<&str> = path.split('/').collect();
    for (position, segment) in segments.iter().enumerate() {
        if current.is_null() || segment.is_empty() {
            return None;
        }
        if *segment == "{}" {
            return if position == segments.len() - 1 && is_collection(current) {
                Some(current)
            } else {
                None
            };
        }
        current = step(current, segment)?;
    }
    Some(current)
}

fn lookup(data: &Value, segments: &[&str], default: &Value) -> Value {
    let mut current = data;
    for (position, segment) in segments.iter().enumerate() {
        if current.is_null() || segment.is_empty() {
            return default.clone();
        }
        if *segment == "{}" {
            if !is_collection(current) {
                return default.clone();
            }
            let rest = &segments[position + 1..];
            if rest.is_empty() {
                return current.clone();
            }
            let fanned = match current {
                Value::Array(items) => items.iter().map(|item| lookup(item, rest, default)).collect(),
                Value::Object(map) => map.values().map(|item| lookup(item, rest, default)).collect(),
                _ => Vec::new(),
            };
            return Value::Array(fanned);
        }
        match step(current, segment) {
            Some(next) => current = next,
            None => return default.clone(),
        }
    }
    current.clone()
}

fn step<'a>(data: &'a Value, segment: &str) -> Option<&'a Value> {
    if let Some(caps) = INDEX.captures(segment) {
        let index: usize = caps[1].parse().ok()?;
        return match data {
            Value::Array(items) => items.get(index),
            Value::Object(map) => map.values().nth(index),
            _ => None,
        };
    }
    match data {
        Value::Object(map) => map.get(segment),
        _ => None,
    }
}

fn is_collection(data: &Value) -> bool {
    matches!(data, Value::Array(_) | Value::Object(_))
}
