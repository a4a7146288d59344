// Project lifecycle: create / read / delete, with quota and type-support
// policy enforcement and resource-level ownership checks.

use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ApiError;
use crate::store::ProjectStore;
use crate::types::{NumbersProjectField, Project, ProjectType};

/// Create-project request body. Every field optional so that validation
/// produces the service's own errors instead of deserialization failures.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProject {
    #[serde(rename = "type")]
    pub project_type: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
    pub fields: Option<Value>,
}

pub struct ProjectLifecycle {
    store: Arc<dyn ProjectStore>,
}

impl ProjectLifecycle {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    /// Create a project for a student. Checks run in order, first failure
    /// wins, and no store mutation happens on any validation failure.
    pub async fn create(
        &self,
        userid: &str,
        classid: &str,
        request: CreateProject,
    ) -> Result<Project, ApiError> {
        let type_raw = match request.project_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(ApiError::validation("Missing required field")),
        };
        let name = match request.name.as_deref().map(str::trim) {
            Some(n) if !n.is_empty() => n,
            _ => return Err(ApiError::validation("Missing required field")),
        };
        let language = request.language.as_deref().map(str::trim).filter(|l| !l.is_empty());
        if type_raw == "text" && language.is_none() {
            return Err(ApiError::validation("Missing required field"));
        }

        let (count, policy) = futures::try_join!(
            self.store.count_projects_by_user(userid, classid),
            self.store.get_class_tenant(classid),
        )?;

        if count >= policy.max_projects_per_user {
            tracing::info!(userid = %userid, classid = %classid, count, "Project quota reached");
            return Err(ApiError::conflict("User already has maximum number of projects"));
        }

        // An unrecognized type value is by definition not in the supported set
        let project_type = match ProjectType::from_str(type_raw) {
            Ok(t) if policy.supports(t) => t,
            _ => {
                return Err(ApiError::forbidden(format!(
                    "Support for {} projects is not enabled for your class",
                    type_raw
                )));
            }
        };

        let project = self
            .store
            .store_project(userid, classid, project_type, name, language, request.fields.as_ref())
            .await?;

        tracing::info!(projectid = %project.id, classid = %classid, "Created project");
        Ok(project)
    }

    /// Fetch one project, enforcing resource-level ownership: a mismatched
    /// owner or class gets Forbidden, a missing project NotFound. Existence
    /// is deliberately not hidden from a wrong-owner caller.
    pub async fn get(&self, userid: &str, classid: &str, projectid: &str) -> Result<Project, ApiError> {
        match self.store.get_project(projectid).await? {
            Some(project) if project.classid == classid && project.userid == userid => Ok(project),
            Some(project) => {
                tracing::warn!(
                    projectid = %project.id,
                    addressed_user = %userid,
                    "Ownership mismatch on project access"
                );
                Err(ApiError::invalid_access())
            }
            None => Err(ApiError::not_found()),
        }
    }

    pub async fn list_by_class(&self, classid: &str) -> Result<Vec<Project>, ApiError> {
        Ok(self.store.get_projects_by_class(classid).await?)
    }

    pub async fn list_by_user(&self, userid: &str, classid: &str) -> Result<Vec<Project>, ApiError> {
        Ok(self.store.get_projects_by_user(userid, classid).await?)
    }

    /// Numeric field definitions for a numbers project. An empty result is
    /// reported as NotFound rather than an empty 200.
    pub async fn fields(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
    ) -> Result<Vec<NumbersProjectField>, ApiError> {
        let fields = self.store.get_number_project_fields(userid, classid, projectid).await?;
        if fields.is_empty() {
            return Err(ApiError::not_found());
        }
        Ok(fields)
    }

    /// Delete a project and everything that depends on it. Not idempotent:
    /// repeating the call returns NotFound.
    pub async fn delete(&self, userid: &str, classid: &str, projectid: &str) -> Result<(), ApiError> {
        let project = self.get(userid, classid, projectid).await?;
        self.store.delete_entire_project(userid, classid, &project).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryProjectStore;
    use crate::types::TenantPolicy;
    use axum::http::StatusCode;
    use serde_json::json;

    fn lifecycle() -> (ProjectLifecycle, Arc<MemoryProjectStore>) {
        let store = Arc::new(MemoryProjectStore::new());
        (ProjectLifecycle::new(store.clone()), store)
    }

    fn scratch_request(name: &str) -> CreateProject {
        CreateProject {
            project_type: Some("scratch".to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_requires_type_and_name() {
        let (lifecycle, _) = lifecycle();

        for request in [
            CreateProject::default(),
            CreateProject { name: Some("My Game".to_string()), ..Default::default() },
            CreateProject { project_type: Some("scratch".to_string()), ..Default::default() },
            CreateProject {
                project_type: Some("scratch".to_string()),
                name: Some("   ".to_string()),
                ..Default::default()
            },
        ] {
            let err = lifecycle.create("student", "class", request).await.unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(err.message(), "Missing required field");
        }
    }

    #[tokio::test]
    async fn text_projects_require_a_language() {
        let (lifecycle, _) = lifecycle();

        let request = CreateProject {
            project_type: Some("text".to_string()),
            name: Some("Sentiment".to_string()),
            ..Default::default()
        };
        let err = lifecycle.create("student", "class", request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Missing required field");

        let request = CreateProject {
            project_type: Some("text".to_string()),
            name: Some("Sentiment".to_string()),
            language: Some("en".to_string()),
            ..Default::default()
        };
        let project = lifecycle.create("student", "class", request).await.unwrap();
        assert_eq!(project.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn quota_is_enforced_before_type_support() {
        let (lifecycle, store) = lifecycle();
        store
            .set_class_tenant(TenantPolicy {
                classid: "class".to_string(),
                max_projects_per_user: 2,
                max_users: 30,
                supported_project_types: vec![ProjectType::Scratch],
            })
            .await;

        lifecycle.create("student", "class", scratch_request("one")).await.unwrap();
        lifecycle.create("student", "class", scratch_request("two")).await.unwrap();

        // at quota, even a request with an unsupported type reports the quota
        let request = CreateProject {
            project_type: Some("python".to_string()),
            name: Some("three".to_string()),
            ..Default::default()
        };
        let err = lifecycle.create("student", "class", request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "User already has maximum number of projects");
    }

    #[tokio::test]
    async fn unsupported_and_unknown_types_are_forbidden() {
        let (lifecycle, store) = lifecycle();
        store
            .set_class_tenant(TenantPolicy {
                classid: "class".to_string(),
                max_projects_per_user: 5,
                max_users: 30,
                supported_project_types: vec![ProjectType::Scratch, ProjectType::Python],
            })
            .await;

        let request = CreateProject {
            project_type: Some("sounds".to_string()),
            name: Some("Claps".to_string()),
            ..Default::default()
        };
        let err = lifecycle.create("student", "class", request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Support for sounds projects is not enabled for your class");

        let request = CreateProject {
            project_type: Some("minecraft".to_string()),
            name: Some("Blocks".to_string()),
            ..Default::default()
        };
        let err = lifecycle.create("student", "class", request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.message(), "Support for minecraft projects is not enabled for your class");
    }

    #[tokio::test]
    async fn store_validation_failures_surface_with_the_store_message() {
        let (lifecycle, store) = lifecycle();
        store
            .set_class_tenant(TenantPolicy {
                classid: "class".to_string(),
                max_projects_per_user: 5,
                max_users: 30,
                supported_project_types: vec![ProjectType::Numbers],
            })
            .await;

        // numbers projects need field definitions; the store rejects their absence
        let request = CreateProject {
            project_type: Some("numbers".to_string()),
            name: Some("Pets".to_string()),
            ..Default::default()
        };
        let err = lifecycle.create("student", "class", request).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Missing required project fields");
    }

    #[tokio::test]
    async fn get_enforces_ownership_without_hiding_existence() {
        let (lifecycle, _) = lifecycle();
        let project = lifecycle.create("student", "class", scratch_request("Mine")).await.unwrap();

        let err = lifecycle.get("someone-else", "class", &project.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = lifecycle.get("student", "other-class", &project.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);

        let err = lifecycle.get("student", "class", "no-such-project").await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let fetched = lifecycle.get("student", "class", &project.id).await.unwrap();
        assert_eq!(fetched.id, project.id);
    }

    #[tokio::test]
    async fn delete_is_not_idempotent() {
        let (lifecycle, _) = lifecycle();
        let project = lifecycle.create("student", "class", scratch_request("Mine")).await.unwrap();

        lifecycle.delete("student", "class", &project.id).await.unwrap();

        let err = lifecycle.delete("student", "class", &project.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_field_lists_are_reported_as_not_found() {
        let (lifecycle, store) = lifecycle();
        let project = lifecycle.create("student", "class", scratch_request("Mine")).await.unwrap();

        // a scratch project exists but has no numeric fields
        let err = lifecycle.fields("student", "class", &project.id).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        store
            .set_class_tenant(TenantPolicy {
                classid: "class".to_string(),
                max_projects_per_user: 5,
                max_users: 30,
                supported_project_types: vec![ProjectType::Numbers],
            })
            .await;
        let request = CreateProject {
            project_type: Some("numbers".to_string()),
            name: Some("Pets".to_string()),
            fields: Some(json!([{ "name": "age", "type": "int" }])),
            ..Default::default()
        };
        let numbers = lifecycle.create("student", "class", request).await.unwrap();
        let fields = lifecycle.fields("student", "class", &numbers.id).await.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "age");
    }
}
