//! JSON tree navigation shared by the local backends.

use serde_json::{Map, Value};

/// Node at `segments`, if present and not null.
pub(crate) fn get_node<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    (!current.is_null()).then_some(current)
}

/// Replace the node at `segments`, creating intermediate objects. Writing
/// `null` deletes the node.
pub(crate) fn set_node(root: &mut Value, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *root = if value.is_null() {
            Value::Object(Map::new())
        } else {
            value
        };
        return;
    };
    let mut current = root;
    for segment in parents {
        current = ensure_object(current)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let map = ensure_object(current);
    if value.is_null() {
        map.remove(last);
    } else {
        map.insert(last.clone(), value);
    }
}

/// Turn `value` into an object if it is not one already and return its map.
fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced with an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::{get_node, set_node};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn segs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn set_creates_intermediate_objects() {
        let mut root = json!({});
        set_node(&mut root, &segs(&["a", "b", "c"]), json!(1));
        assert_eq!(root, json!({ "a": { "b": { "c": 1 } } }));
    }

    #[test]
    fn set_overwrites_scalar_parent() {
        let mut root = json!({ "a": "text" });
        set_node(&mut root, &segs(&["a", "b"]), json!(true));
        assert_eq!(root, json!({ "a": { "b": true } }));
    }

    #[test]
    fn null_write_deletes() {
        let mut root = json!({ "a": { "b": 1, "c": 2 } });
        set_node(&mut root, &segs(&["a", "b"]), json!(null));
        assert_eq!(root, json!({ "a": { "c": 2 } }));
    }

    #[test]
    fn get_missing_or_null_is_none() {
        let root = json!({ "a": { "b": null } });
        assert_eq!(get_node(&root, &segs(&["a", "b"])), None);
        assert_eq!(get_node(&root, &segs(&["x"])), None);
        assert_eq!(get_node(&root, &segs(&["a"])), Some(&json!({ "b": null })));
    }
}
