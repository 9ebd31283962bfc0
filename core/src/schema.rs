//! Dot-path payload extraction.

use serde_json::Value;

/// Resolve `path` (`"data"`, `"body.result"`, `"items.0"`) inside `value`.
///
/// `None` or an empty path returns the payload unchanged. A path that does not
/// resolve also returns the payload unchanged, so an error body such as
/// `{"message": ...}` survives the default `data` schema intact.
///
/// # Example
///
/// ```
/// use crud_actions_core::schema::extract;
/// use serde_json::json;
///
/// let body = json!({"data": {"name": "im a channel"}});
/// assert_eq!(extract(body.clone(), Some("data")), json!({"name": "im a channel"}));
/// assert_eq!(extract(body.clone(), None), body);
/// ```
#[must_use]
pub fn extract(value: Value, path: Option<&str>) -> Value {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return value;
    };

    let pointer: String = path.split('.').fold(String::new(), |mut acc, segment| {
        acc.push('/');
        acc.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        acc
    });

    match value.pointer(&pointer) {
        Some(found) => found.clone(),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_path() {
        let body = json!({"body": {"result": [1, 2]}});
        assert_eq!(extract(body, Some("body.result")), json!([1, 2]));
    }

    #[test]
    fn test_array_index() {
        let body = json!({"items": [{"a": 1}, {"a": 2}]});
        assert_eq!(extract(body, Some("items.1.a")), json!(2));
    }

    #[test]
    fn test_unresolved_path_returns_payload() {
        let body = json!({"message": "this is an error"});
        assert_eq!(extract(body.clone(), Some("data")), body);
    }

    #[test]
    fn test_null_leaf_is_resolved() {
        let body = json!({"data": null});
        assert_eq!(extract(body, Some("data")), Value::Null);
    }
}
