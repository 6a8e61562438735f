//! Stream descriptors.
//!
//! A stream is described by a small configuration record — endpoint path,
//! projection paths, key fields — injected into the generic page walker.
//! Capabilities compose instead of inheriting from a stream base class.

use serde_json::Value;

use crate::window::DEFAULT_PAGE_SIZE;

/// Static description of one extractable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub name: &'static str,
    /// Resource path appended to the versioned API root.
    pub path: &'static str,
    /// Object path to the record list inside the response envelope.
    pub record_path: &'static [&'static str],
    /// Object path to the page indicator inside the response envelope.
    pub page_path: &'static [&'static str],
    pub primary_key: &'static str,
    pub replication_key: &'static str,
    pub page_size: u32,
}

impl StreamDescriptor {
    /// The shipment-tracking stream.
    pub const fn trackings() -> Self {
        Self {
            name: "trackings",
            path: "/trackings",
            record_path: &["data", "trackings"],
            page_path: &["data", "page"],
            primary_key: "id",
            replication_key: "updated_at",
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Record list projected out of a parsed envelope.
    ///
    /// A missing path or a non-array value projects to an empty list, which
    /// the walker treats as the end of pagination — the envelope shape is
    /// the API's only termination signal.
    pub fn project_records(&self, envelope: &Value) -> Vec<Value> {
        match walk(envelope, self.record_path).and_then(Value::as_array) {
            Some(records) => records.clone(),
            None => Vec::new(),
        }
    }

    /// Page indicator reported by the API, when present.
    pub fn page_indicator(&self, envelope: &Value) -> Option<i64> {
        walk(envelope, self.page_path).and_then(Value::as_i64)
    }
}

fn walk<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn projects_records_from_envelope() {
        let descriptor = StreamDescriptor::trackings();
        let envelope = json!({
            "data": {
                "page": 2,
                "trackings": [{"id": "a"}, {"id": "b"}]
            }
        });

        let records = descriptor.project_records(&envelope);
        assert_eq!(records.len(), 2);
        assert_eq!(descriptor.page_indicator(&envelope), Some(2));
    }

    #[test]
    fn missing_record_path_projects_to_empty() {
        let descriptor = StreamDescriptor::trackings();

        assert!(descriptor.project_records(&json!({})).is_empty());
        assert!(descriptor
            .project_records(&json!({"data": {"page": 1}}))
            .is_empty());
        assert!(descriptor
            .project_records(&json!({"data": {"trackings": "not-a-list"}}))
            .is_empty());
    }

    #[test]
    fn trackings_descriptor_matches_api_contract() {
        let descriptor = StreamDescriptor::trackings();

        assert_eq!(descriptor.name, "trackings");
        assert_eq!(descriptor.path, "/trackings");
        assert_eq!(descriptor.primary_key, "id");
        assert_eq!(descriptor.replication_key, "updated_at");
        assert_eq!(descriptor.page_size, 200);
    }
}
