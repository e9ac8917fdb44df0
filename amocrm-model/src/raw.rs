//! Wire-format state of an entity.
//!
//! `RawData` is the JSON object exactly as the API sends and accepts it.
//! Fields address values inside it by a path of object keys, e.g.
//! `["_embedded", "companies"]` or `["params", "text"]`.

use serde_json::{Map, Value};

/// A JSON object in wire format.
pub type RawData = Map<String, Value>;

/// Location of a value inside [`RawData`].
pub type WirePath = Vec<String>;

/// Returns the value at `path`, if every intermediate key is an object.
pub fn lookup<'a, S: AsRef<str>>(raw: &'a RawData, path: &[S]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut current = raw;
    for segment in parents {
        current = current.get(segment.as_ref())?.as_object()?;
    }
    current.get(last.as_ref())
}

/// True when `path` holds a non-null value.
pub fn is_present<S: AsRef<str>>(raw: &RawData, path: &[S]) -> bool {
    lookup(raw, path).is_some_and(|v| !v.is_null())
}

/// Writes `value` at `path`, creating intermediate objects.
///
/// A non-object value sitting on an intermediate key is replaced.
pub fn write<S: AsRef<str>>(raw: &mut RawData, path: &[S], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = raw;
    for segment in parents {
        let slot = current
            .entry(segment.as_ref().to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = match slot {
            Value::Object(map) => map,
            _ => return,
        };
    }
    current.insert(last.as_ref().to_string(), value);
}

/// Removes and returns the value at `path`.
pub fn remove<S: AsRef<str>>(raw: &mut RawData, path: &[S]) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    let mut current = raw;
    for segment in parents {
        current = current.get_mut(segment.as_ref())?.as_object_mut()?;
    }
    current.remove(last.as_ref())
}

/// A new object holding only the value at `path`, nested the same way.
///
/// Used to build partial update payloads.
pub fn subtree<S: AsRef<str>>(raw: &RawData, path: &[S]) -> Option<RawData> {
    let value = lookup(raw, path)?.clone();
    let mut out = RawData::new();
    write(&mut out, path, value);
    Some(out)
}

/// Deep-merges `source` into `target`. Objects merge key by key; anything
/// else (arrays included) is replaced wholesale.
pub fn merge(target: &mut RawData, source: RawData) {
    for (key, value) in source {
        match target.get_mut(&key) {
            Some(Value::Object(existing)) if value.is_object() => {
                if let Value::Object(incoming) = value {
                    merge(existing, incoming);
                }
            }
            _ => {
                target.insert(key, value);
            }
        }
    }
}

/// Joins a path for display and for the public dirty-field set.
pub fn display_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(".")
}

/// Builds an owned [`WirePath`] from static segments.
pub fn wire_path(path: &[&str], key: &str) -> WirePath {
    path.iter()
        .copied()
        .chain(std::iter::once(key))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawData {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn write_creates_intermediate_objects() {
        let mut data = RawData::new();
        write(&mut data, &["params", "text"], json!("hi"));
        assert_eq!(Value::Object(data), json!({"params": {"text": "hi"}}));
    }

    #[test]
    fn write_replaces_scalar_parent() {
        let mut data = raw(json!({"params": 5}));
        write(&mut data, &["params", "text"], json!("hi"));
        assert_eq!(lookup(&data, &["params", "text"]), Some(&json!("hi")));
    }

    #[test]
    fn subtree_keeps_nesting() {
        let data = raw(json!({"a": {"b": 1, "c": 2}, "d": 3}));
        let sub = subtree(&data, &["a", "b"]).unwrap();
        assert_eq!(Value::Object(sub), json!({"a": {"b": 1}}));
    }

    #[test]
    fn merge_is_deep_for_objects_only() {
        let mut target = raw(json!({"a": {"b": 1}, "l": [1, 2]}));
        merge(&mut target, raw(json!({"a": {"c": 2}, "l": [3]})));
        assert_eq!(Value::Object(target), json!({"a": {"b": 1, "c": 2}, "l": [3]}));
    }

    #[test]
    fn remove_nested() {
        let mut data = raw(json!({"a": {"b": 1}}));
        assert_eq!(remove(&mut data, &["a", "b"]), Some(json!(1)));
        assert_eq!(remove(&mut data, &["a", "x"]), None);
    }
}
