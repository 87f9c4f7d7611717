// Artemis envelope -> outward shape

use serde::Serialize;
use serde_json::Value;

/// Outward list shape shared by list operations
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NormalizedList {
    pub status: u16,
    pub items: Vec<Value>,
}

/// Extract `data.list`. A missing or non-array level yields an empty list.
pub fn normalize_list(payload: &Value) -> NormalizedList {
    let items = payload
        .get("data")
        .and_then(|data| data.get("list"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    NormalizedList { status: 200, items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extracts_list() {
        let out = normalize_list(&json!({"code": "0", "data": {"list": [{"id": 1}]}}));
        assert_eq!(out.status, 200);
        assert_eq!(out.items, vec![json!({"id": 1})]);
    }

    #[test]
    fn test_missing_list_is_empty() {
        assert!(normalize_list(&json!({"code": "0", "data": {}})).items.is_empty());
        assert!(normalize_list(&json!({"code": "0"})).items.is_empty());
        assert!(normalize_list(&json!({"code": "0", "data": null})).items.is_empty());
    }

    #[test]
    fn test_non_array_list_is_empty() {
        let out = normalize_list(&json!({"code": "0", "data": {"list": {"id": 1}}}));
        assert!(out.items.is_empty());
    }

    #[test]
    fn test_items_pass_through_unmodified() {
        let door = json!({"doorIndexCode": "7", "doorName": "Lobby", "regionIndexCode": "root"});
        let out = normalize_list(&json!({"code": "0", "data": {"total": 1, "list": [door.clone()]}}));
        assert_eq!(out.items[0], door);
    }
}
