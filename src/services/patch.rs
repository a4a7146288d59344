// Label patch engine: parses a restricted single-operation patch body into a
// typed operation, then dispatches exactly one store call.
//
// This is a deliberately narrow subset of a generic patch protocol - only
// one operation per request, only targeting the labels collection.

use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::store::ProjectStore;
use crate::types::MAX_LABEL_LENGTH;

/// The only patchable path on a project
const LABELS_PATH: &str = "/labels";

/// A fully validated label mutation. Constructed only by `parse_patch`;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOperation {
    Add(String),
    Remove(String),
    Replace(Vec<String>),
}

/// Parse an untrusted patch body into a typed operation.
///
/// Fails fast: the first violated rule decides the error, and nothing is
/// partially applied. All of this runs before any store call.
pub fn parse_patch(body: &Value) -> Result<PatchOperation, ApiError> {
    let requests = body
        .as_array()
        .ok_or_else(|| ApiError::validation("PATCH body should be an array"))?;

    if requests.len() != 1 {
        return Err(ApiError::validation("Only individual PATCH requests are supported"));
    }
    let request = &requests[0];

    if request.get("path").and_then(Value::as_str) != Some(LABELS_PATH) {
        return Err(ApiError::validation("Only modifications to project labels are supported"));
    }

    let op = match request.get("op").and_then(Value::as_str) {
        Some(op @ ("add" | "remove" | "replace")) => op,
        _ => return Err(ApiError::validation("Invalid PATCH op")),
    };

    let value = match request.get("value") {
        None | Some(Value::Null) => {
            return Err(ApiError::validation("PATCH requests must include a value"));
        }
        Some(value) => value,
    };

    match op {
        "add" | "remove" => {
            let label = value.as_str().ok_or_else(|| {
                ApiError::validation("PATCH requests to add or remove a label should specify a string")
            })?;
            let label = label.trim();
            if label.is_empty() {
                return Err(ApiError::validation("Cannot add an empty label"));
            }
            if label.chars().count() > MAX_LABEL_LENGTH {
                return Err(ApiError::validation("Label exceeds max length"));
            }
            if op == "add" {
                Ok(PatchOperation::Add(label.to_string()))
            } else {
                Ok(PatchOperation::Remove(label.to_string()))
            }
        }
        "replace" => {
            let items = value.as_array().ok_or_else(|| {
                ApiError::validation("PATCH requests to replace labels should specify an array")
            })?;

            // Elements that trim to nothing are silently dropped; only the
            // survivors are length-checked.
            let labels: Vec<String> = items
                .iter()
                .map(coerce_label)
                .map(|label| label.trim().to_string())
                .filter(|label| !label.is_empty())
                .collect();

            if labels.iter().any(|label| label.chars().count() > MAX_LABEL_LENGTH) {
                return Err(ApiError::validation("Label exceeds max length"));
            }

            Ok(PatchOperation::Replace(labels))
        }
        _ => unreachable!("op restricted above"),
    }
}

fn coerce_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub struct LabelPatchEngine {
    store: Arc<dyn ProjectStore>,
}

impl LabelPatchEngine {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    /// Apply a validated operation to a project's label set.
    ///
    /// Re-checks resource-level ownership first (mismatch is Forbidden, a
    /// missing project NotFound), then dispatches exactly one store call and
    /// returns the store's post-mutation label list verbatim.
    pub async fn apply(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        operation: PatchOperation,
    ) -> Result<Vec<String>, ApiError> {
        match self.store.get_project(projectid).await? {
            Some(project) if project.classid == classid && project.userid == userid => {}
            Some(_) => {
                tracing::warn!(projectid = %projectid, "Ownership mismatch on label patch");
                return Err(ApiError::invalid_access());
            }
            None => return Err(ApiError::not_found()),
        }

        let labels = match operation {
            PatchOperation::Add(label) => {
                self.store.add_label_to_project(userid, classid, projectid, &label).await?
            }
            PatchOperation::Remove(label) => {
                self.store.remove_label_from_project(userid, classid, projectid, &label).await?
            }
            PatchOperation::Replace(labels) => {
                self.store.replace_labels_for_project(userid, classid, projectid, &labels).await?
            }
        };

        tracing::debug!(projectid = %projectid, count = labels.len(), "Applied label patch");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryProjectStore;
    use crate::types::ProjectType;
    use axum::http::StatusCode;
    use serde_json::json;

    fn parse_err(body: Value) -> String {
        let err = parse_patch(&body).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        err.message().to_string()
    }

    #[test]
    fn body_must_be_an_array() {
        assert_eq!(parse_err(json!({})), "PATCH body should be an array");
        assert_eq!(parse_err(json!("add")), "PATCH body should be an array");
    }

    #[test]
    fn only_single_operation_patches_are_supported() {
        let two_ops = json!([
            { "op": "add", "path": "/labels", "value": "one" },
            { "op": "add", "path": "/labels", "value": "two" }
        ]);
        assert_eq!(parse_err(two_ops), "Only individual PATCH requests are supported");
        assert_eq!(parse_err(json!([])), "Only individual PATCH requests are supported");
    }

    #[test]
    fn only_the_labels_path_is_patchable() {
        let body = json!([{ "op": "add", "path": "/name", "value": "x" }]);
        assert_eq!(parse_err(body), "Only modifications to project labels are supported");

        let body = json!([{ "op": "add", "value": "x" }]);
        assert_eq!(parse_err(body), "Only modifications to project labels are supported");
    }

    #[test]
    fn op_must_be_recognized() {
        let body = json!([{ "op": "move", "path": "/labels", "value": "x" }]);
        assert_eq!(parse_err(body), "Invalid PATCH op");

        let body = json!([{ "path": "/labels", "value": "x" }]);
        assert_eq!(parse_err(body), "Invalid PATCH op");
    }

    #[test]
    fn value_must_be_present() {
        let body = json!([{ "op": "add", "path": "/labels" }]);
        assert_eq!(parse_err(body), "PATCH requests must include a value");

        let body = json!([{ "op": "add", "path": "/labels", "value": null }]);
        assert_eq!(parse_err(body), "PATCH requests must include a value");
    }

    #[test]
    fn add_and_remove_take_a_single_trimmed_string() {
        let body = json!([{ "op": "add", "path": "/labels", "value": ["x"] }]);
        assert_eq!(
            parse_err(body),
            "PATCH requests to add or remove a label should specify a string"
        );

        let body = json!([{ "op": "add", "path": "/labels", "value": "   " }]);
        assert_eq!(parse_err(body), "Cannot add an empty label");

        let body = json!([{ "op": "add", "path": "/labels", "value": "x".repeat(31) }]);
        assert_eq!(parse_err(body), "Label exceeds max length");

        let body = json!([{ "op": "add", "path": "/labels", "value": " fun " }]);
        assert_eq!(parse_patch(&body).unwrap(), PatchOperation::Add("fun".to_string()));

        let body = json!([{ "op": "remove", "path": "/labels", "value": " fun " }]);
        assert_eq!(parse_patch(&body).unwrap(), PatchOperation::Remove("fun".to_string()));
    }

    #[test]
    fn replace_takes_an_array_and_drops_empty_elements() {
        let body = json!([{ "op": "replace", "path": "/labels", "value": "fun" }]);
        assert_eq!(
            parse_err(body),
            "PATCH requests to replace labels should specify an array"
        );

        let body = json!([{ "op": "replace", "path": "/labels", "value": ["", " fun ", "x"] }]);
        assert_eq!(
            parse_patch(&body).unwrap(),
            PatchOperation::Replace(vec!["fun".to_string(), "x".to_string()])
        );

        // non-string scalars are coerced
        let body = json!([{ "op": "replace", "path": "/labels", "value": [1, true, " a "] }]);
        assert_eq!(
            parse_patch(&body).unwrap(),
            PatchOperation::Replace(vec!["1".to_string(), "true".to_string(), "a".to_string()])
        );

        // length check runs after filtering, so only survivors are checked
        let body = json!([{ "op": "replace", "path": "/labels", "value": ["   ", "x".repeat(31)] }]);
        assert_eq!(parse_err(body), "Label exceeds max length");

        let body = json!([{ "op": "replace", "path": "/labels", "value": [] }]);
        assert_eq!(parse_patch(&body).unwrap(), PatchOperation::Replace(Vec::new()));
    }

    async fn engine_with_project() -> (LabelPatchEngine, String) {
        let store = Arc::new(MemoryProjectStore::new());
        let project = store
            .store_project("student", "class", ProjectType::Scratch, "Game", None, None)
            .await
            .unwrap();
        (LabelPatchEngine::new(store), project.id)
    }

    #[tokio::test]
    async fn apply_returns_the_store_label_list() {
        let (engine, projectid) = engine_with_project().await;

        let labels = engine
            .apply("student", "class", &projectid, PatchOperation::Add("old".to_string()))
            .await
            .unwrap();
        assert_eq!(labels, vec!["old"]);

        let labels = engine
            .apply("student", "class", &projectid, PatchOperation::Add("fun".to_string()))
            .await
            .unwrap();
        assert_eq!(labels, vec!["old", "fun"]);

        let labels = engine
            .apply("student", "class", &projectid, PatchOperation::Remove("old".to_string()))
            .await
            .unwrap();
        assert_eq!(labels, vec!["fun"]);

        let labels = engine
            .apply(
                "student",
                "class",
                &projectid,
                PatchOperation::Replace(vec!["a".to_string(), "b".to_string()]),
            )
            .await
            .unwrap();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn apply_gates_on_ownership() {
        let (engine, projectid) = engine_with_project().await;

        let err = engine
            .apply("someone-else", "class", &projectid, PatchOperation::Add("x".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = engine
            .apply("student", "class", "missing", PatchOperation::Add("x".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn capacity_rejections_surface_as_bad_request() {
        let (engine, projectid) = engine_with_project().await;

        let oversized: Vec<String> = (0..20).map(|i| format!("{:0>30}", i)).collect();
        let err = engine
            .apply("student", "class", &projectid, PatchOperation::Replace(oversized))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "No room for the label");
    }
}
