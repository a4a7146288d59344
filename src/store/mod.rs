// Durable storage for projects, tenant policy, numeric field definitions,
// and label sets. The trait is the boundary the core depends on; the
// Postgres implementation is what deployments run, the in-memory one backs
// local development and the test suites.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::{
    NumbersProjectField, NumbersProjectFieldSummary, Project, ProjectType, TenantPolicy,
    MAX_FIELDS_PER_PROJECT, MAX_LABELS_STORED_LENGTH, MAX_PROJECT_NAME_LENGTH,
};

pub use memory::MemoryProjectStore;
pub use postgres::PostgresProjectStore;

/// Errors from project storage.
///
/// `Invalid` is the recognizable validation marker: callers re-map it to a
/// 400. `Capacity` is the label-storage-full rejection, also a 400.
/// Everything else is opaque to clients.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Invalid(String),

    #[error("No room for the label")]
    Capacity,

    #[error("Project not in store: {0}")]
    Missing(String),

    #[error("Stored data is malformed: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn count_projects_by_user(&self, userid: &str, classid: &str) -> Result<usize, StoreError>;

    /// Classes without a stored policy row get the platform default
    async fn get_class_tenant(&self, classid: &str) -> Result<TenantPolicy, StoreError>;

    async fn store_project(
        &self,
        userid: &str,
        classid: &str,
        project_type: ProjectType,
        name: &str,
        language: Option<&str>,
        fields: Option<&Value>,
    ) -> Result<Project, StoreError>;

    async fn get_project(&self, projectid: &str) -> Result<Option<Project>, StoreError>;

    async fn get_projects_by_class(&self, classid: &str) -> Result<Vec<Project>, StoreError>;

    async fn get_projects_by_user(&self, userid: &str, classid: &str) -> Result<Vec<Project>, StoreError>;

    async fn get_number_project_fields(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
    ) -> Result<Vec<NumbersProjectField>, StoreError>;

    /// Cascade-delete the project and all dependent data
    async fn delete_entire_project(
        &self,
        userid: &str,
        classid: &str,
        project: &Project,
    ) -> Result<(), StoreError>;

    async fn add_label_to_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        label: &str,
    ) -> Result<Vec<String>, StoreError>;

    async fn remove_label_from_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        label: &str,
    ) -> Result<Vec<String>, StoreError>;

    async fn replace_labels_for_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        labels: &[String],
    ) -> Result<Vec<String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

// Label lists are persisted joined into a single bounded column. Both
// backends share the joined form so capacity behaves identically.

pub(crate) fn join_labels(labels: &[String]) -> String {
    labels.join(",")
}

pub(crate) fn split_labels(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub(crate) fn check_labels_fit(labels: &[String]) -> Result<(), StoreError> {
    if join_labels(labels).len() > MAX_LABELS_STORED_LENGTH {
        return Err(StoreError::Capacity);
    }
    Ok(())
}

pub(crate) fn validate_project_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() || name.len() > MAX_PROJECT_NAME_LENGTH {
        return Err(StoreError::Invalid("Invalid project name".to_string()));
    }
    Ok(name.to_string())
}

/// Parse and validate the type-specific field definitions submitted with a
/// create request. Only numbers projects carry fields.
pub(crate) fn parse_project_fields(
    project_type: ProjectType,
    fields: Option<&Value>,
) -> Result<Vec<NumbersProjectFieldSummary>, StoreError> {
    match (project_type, fields) {
        (ProjectType::Numbers, Some(value)) => {
            let summaries: Vec<NumbersProjectFieldSummary> = serde_json::from_value(value.clone())
                .map_err(|_| StoreError::Invalid("Invalid project fields".to_string()))?;
            if summaries.is_empty() || summaries.len() > MAX_FIELDS_PER_PROJECT {
                return Err(StoreError::Invalid("Invalid project fields".to_string()));
            }
            if summaries.iter().any(|f| f.name.trim().is_empty()) {
                return Err(StoreError::Invalid("Invalid project fields".to_string()));
            }
            Ok(summaries)
        }
        (ProjectType::Numbers, None) => {
            Err(StoreError::Invalid("Missing required project fields".to_string()))
        }
        (_, Some(_)) => Err(StoreError::Invalid(
            "Fields are only supported for numbers projects".to_string(),
        )),
        (_, None) => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_survive_the_joined_form() {
        let labels = vec!["happy".to_string(), "sad".to_string()];
        assert_eq!(split_labels(&join_labels(&labels)), labels);
        assert!(split_labels("").is_empty());
        assert_eq!(split_labels(" a ,, b "), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn oversized_label_lists_are_rejected() {
        let labels: Vec<String> = (0..20).map(|i| format!("{:0>30}", i)).collect();
        assert!(matches!(check_labels_fit(&labels), Err(StoreError::Capacity)));
        assert!(check_labels_fit(&labels[..2]).is_ok());
    }

    #[test]
    fn blank_project_names_are_invalid() {
        assert!(matches!(validate_project_name("   "), Err(StoreError::Invalid(_))));
        assert!(matches!(validate_project_name(&"x".repeat(101)), Err(StoreError::Invalid(_))));
        assert_eq!(validate_project_name("  My Project  ").unwrap(), "My Project");
    }

    #[test]
    fn fields_are_only_accepted_for_numbers_projects() {
        let fields = json!([{ "name": "age", "type": "int" }]);
        assert_eq!(parse_project_fields(ProjectType::Numbers, Some(&fields)).unwrap().len(), 1);
        assert!(matches!(
            parse_project_fields(ProjectType::Text, Some(&fields)),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            parse_project_fields(ProjectType::Numbers, None),
            Err(StoreError::Invalid(_))
        ));
        assert!(parse_project_fields(ProjectType::Scratch, None).unwrap().is_empty());
    }

    #[test]
    fn malformed_field_definitions_are_invalid() {
        let not_a_list = json!({ "name": "age" });
        assert!(matches!(
            parse_project_fields(ProjectType::Numbers, Some(&not_a_list)),
            Err(StoreError::Invalid(_))
        ));
        let blank_name = json!([{ "name": "  ", "type": "int" }]);
        assert!(matches!(
            parse_project_fields(ProjectType::Numbers, Some(&blank_name)),
            Err(StoreError::Invalid(_))
        ));
    }
}
