// In-memory project store. Backs local development when no DATABASE_URL is
// configured, and the test suites. Applies the same validation and capacity
// rules as the Postgres store.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{NumbersProjectField, Project, ProjectType, TenantPolicy};

use super::{check_labels_fit, parse_project_fields, validate_project_name, ProjectStore, StoreError};

#[derive(Default)]
struct Inner {
    projects: HashMap<String, Project>,
    // keyed by projectid
    fields: HashMap<String, Vec<NumbersProjectField>>,
    tenants: HashMap<String, TenantPolicy>,
}

#[derive(Default)]
pub struct MemoryProjectStore {
    inner: RwLock<Inner>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a class policy. Tenant policy is owned elsewhere in production;
    /// this is how development and test setups stand one up.
    pub async fn set_class_tenant(&self, policy: TenantPolicy) {
        let mut inner = self.inner.write().await;
        inner.tenants.insert(policy.classid.clone(), policy);
    }
}

fn scoped_project<'a>(
    inner: &'a mut Inner,
    userid: &str,
    classid: &str,
    projectid: &str,
) -> Result<&'a mut Project, StoreError> {
    match inner.projects.get_mut(projectid) {
        Some(project) if project.userid == userid && project.classid == classid => Ok(project),
        _ => Err(StoreError::Missing(projectid.to_string())),
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    async fn count_projects_by_user(&self, userid: &str, classid: &str) -> Result<usize, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .projects
            .values()
            .filter(|p| p.userid == userid && p.classid == classid)
            .count())
    }

    async fn get_class_tenant(&self, classid: &str) -> Result<TenantPolicy, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tenants
            .get(classid)
            .cloned()
            .unwrap_or_else(|| TenantPolicy::default_for_class(classid)))
    }

    async fn store_project(
        &self,
        userid: &str,
        classid: &str,
        project_type: ProjectType,
        name: &str,
        language: Option<&str>,
        fields: Option<&Value>,
    ) -> Result<Project, StoreError> {
        let name = validate_project_name(name)?;
        let fields = parse_project_fields(project_type, fields)?;

        let projectid = Uuid::new_v4().to_string();
        let project = Project {
            id: projectid.clone(),
            userid: userid.to_string(),
            classid: classid.to_string(),
            project_type,
            name,
            language: language.map(String::from),
            labels: Vec::new(),
            numfields: fields.len(),
        };

        let stored_fields: Vec<NumbersProjectField> = fields
            .iter()
            .map(|f| NumbersProjectField {
                id: Uuid::new_v4().to_string(),
                userid: userid.to_string(),
                classid: classid.to_string(),
                projectid: projectid.clone(),
                name: f.name.trim().to_string(),
                field_type: f.field_type,
                choices: f.choices.clone(),
            })
            .collect();

        let mut inner = self.inner.write().await;
        inner.projects.insert(projectid.clone(), project.clone());
        if !stored_fields.is_empty() {
            inner.fields.insert(projectid, stored_fields);
        }

        Ok(project)
    }

    async fn get_project(&self, projectid: &str) -> Result<Option<Project>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.projects.get(projectid).cloned())
    }

    async fn get_projects_by_class(&self, classid: &str) -> Result<Vec<Project>, StoreError> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.classid == classid)
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn get_projects_by_user(&self, userid: &str, classid: &str) -> Result<Vec<Project>, StoreError> {
        let inner = self.inner.read().await;
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.userid == userid && p.classid == classid)
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn get_number_project_fields(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
    ) -> Result<Vec<NumbersProjectField>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .fields
            .get(projectid)
            .map(|fields| {
                fields
                    .iter()
                    .filter(|f| f.userid == userid && f.classid == classid)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_entire_project(
        &self,
        userid: &str,
        classid: &str,
        project: &Project,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        scoped_project(&mut inner, userid, classid, &project.id)?;
        inner.projects.remove(&project.id);
        inner.fields.remove(&project.id);
        Ok(())
    }

    async fn add_label_to_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        label: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.write().await;
        let project = scoped_project(&mut inner, userid, classid, projectid)?;

        // Adding an existing label leaves the list unchanged
        if !project.labels.iter().any(|l| l == label) {
            let mut labels = project.labels.clone();
            labels.push(label.to_string());
            check_labels_fit(&labels)?;
            project.labels = labels;
        }

        Ok(project.labels.clone())
    }

    async fn remove_label_from_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        label: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.write().await;
        let project = scoped_project(&mut inner, userid, classid, projectid)?;
        project.labels.retain(|l| l != label);
        Ok(project.labels.clone())
    }

    async fn replace_labels_for_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        labels: &[String],
    ) -> Result<Vec<String>, StoreError> {
        check_labels_fit(labels)?;

        let mut inner = self.inner.write().await;
        let project = scoped_project(&mut inner, userid, classid, projectid)?;
        project.labels = labels.to_vec();
        Ok(project.labels.clone())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
