/// Shared domain types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest label a project may carry. Labels are trimmed before this is checked.
pub const MAX_LABEL_LENGTH: usize = 30;

/// Longest project name the store accepts, after trimming.
pub const MAX_PROJECT_NAME_LENGTH: usize = 100;

/// Width of the stored label column. The joined label list must fit inside
/// this, which is what produces the "No room for the label" capacity error.
pub const MAX_LABELS_STORED_LENGTH: usize = 500;

/// Upper bound on numeric field definitions per numbers project.
pub const MAX_FIELDS_PER_PROJECT: usize = 10;

/// Kinds of project a student can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Text,
    Numbers,
    Images,
    Sounds,
    Scratch,
    Python,
}

impl ProjectType {
    /// Text projects train on written phrases, so they need a source language
    pub fn requires_language(&self) -> bool {
        matches!(self, ProjectType::Text)
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectType::Text => "text",
            ProjectType::Numbers => "numbers",
            ProjectType::Images => "images",
            ProjectType::Sounds => "sounds",
            ProjectType::Scratch => "scratch",
            ProjectType::Python => "python",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ProjectType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ProjectType::Text),
            "numbers" => Ok(ProjectType::Numbers),
            "images" => Ok(ProjectType::Images),
            "sounds" => Ok(ProjectType::Sounds),
            "scratch" => Ok(ProjectType::Scratch),
            "python" => Ok(ProjectType::Python),
            _ => Err(()),
        }
    }
}

/// A student's coding exercise instance, scoped to one class and one owner.
/// Ownership (classid + userid) is immutable after creation; labels are the
/// only field mutable through this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub userid: String,
    pub classid: String,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub labels: Vec<String>,
    pub numfields: usize,
}

/// Per-class configuration bounding project count and allowed project types.
/// Owned and mutated elsewhere; read-only from this service's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantPolicy {
    pub classid: String,
    #[serde(rename = "maxProjectsPerUser")]
    pub max_projects_per_user: usize,
    #[serde(rename = "maxUsers")]
    pub max_users: usize,
    #[serde(rename = "supportedProjectTypes")]
    pub supported_project_types: Vec<ProjectType>,
}

impl TenantPolicy {
    /// Platform defaults applied to classes without a stored policy row
    pub fn default_for_class(classid: &str) -> Self {
        Self {
            classid: classid.to_string(),
            max_projects_per_user: 3,
            max_users: 30,
            supported_project_types: vec![
                ProjectType::Text,
                ProjectType::Numbers,
                ProjectType::Scratch,
            ],
        }
    }

    pub fn supports(&self, project_type: ProjectType) -> bool {
        self.supported_project_types.contains(&project_type)
    }
}

/// Value kinds a numeric field definition can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Int,
    Multichoice,
}

/// Stored numeric field definition attached to a numbers project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumbersProjectField {
    pub id: String,
    pub userid: String,
    pub classid: String,
    pub projectid: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub choices: Vec<String>,
}

/// Field definition as submitted in a create-project request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumbersProjectFieldSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub choices: Vec<String>,
}

/// Platform roles carried in token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Supervisor,
}
