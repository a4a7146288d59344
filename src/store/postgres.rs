// Postgres-backed project store.
//
// Expected schema:
//   projects(id TEXT PRIMARY KEY, userid TEXT, classid TEXT,
//            projecttype TEXT, name TEXT, language TEXT,
//            labels VARCHAR(500) NOT NULL DEFAULT '', numfields INT)
//   numbersprojectsfields(id TEXT PRIMARY KEY, userid TEXT, classid TEXT,
//            projectid TEXT, name TEXT, fieldtype TEXT, choices TEXT)
//   tenants(id TEXT PRIMARY KEY, projecttypes TEXT,
//            maxusers INT, maxprojectsperuser INT)

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::types::{
    FieldType, NumbersProjectField, Project, ProjectType, TenantPolicy,
};

use super::{
    check_labels_fit, join_labels, parse_project_fields, split_labels, validate_project_name,
    ProjectStore, StoreError,
};

pub struct PostgresProjectStore {
    pool: PgPool,
}

impl PostgresProjectStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Corrupt("DATABASE_URL is not configured".to_string()))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect(url)
            .await?;

        tracing::info!("Connected project store to Postgres");
        Ok(Self { pool })
    }

    /// Scoped label read. Label mutations are read-modify-write inside the
    /// store; callers treat each mutation as a single atomic unit.
    async fn load_labels(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
    ) -> Result<Vec<String>, StoreError> {
        let row = sqlx::query(
            "SELECT labels FROM projects WHERE id = $1 AND userid = $2 AND classid = $3",
        )
        .bind(projectid)
        .bind(userid)
        .bind(classid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::Missing(projectid.to_string()))?;

        let joined: String = row.get("labels");
        Ok(split_labels(&joined))
    }

    async fn save_labels(&self, projectid: &str, labels: &[String]) -> Result<(), StoreError> {
        sqlx::query("UPDATE projects SET labels = $1 WHERE id = $2")
            .bind(join_labels(labels))
            .bind(projectid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn project_from_row(row: &PgRow) -> Result<Project, StoreError> {
    let type_name: String = row.get("projecttype");
    let project_type: ProjectType = type_name
        .parse()
        .map_err(|_| StoreError::Corrupt(format!("unrecognized project type '{}'", type_name)))?;

    let labels: String = row.get("labels");
    let numfields: i32 = row.get("numfields");

    Ok(Project {
        id: row.get("id"),
        userid: row.get("userid"),
        classid: row.get("classid"),
        project_type,
        name: row.get("name"),
        language: row.get("language"),
        labels: split_labels(&labels),
        numfields: numfields as usize,
    })
}

fn field_from_row(row: &PgRow) -> Result<NumbersProjectField, StoreError> {
    let type_name: String = row.get("fieldtype");
    let field_type = match type_name.as_str() {
        "int" => FieldType::Int,
        "multichoice" => FieldType::Multichoice,
        other => {
            return Err(StoreError::Corrupt(format!("unrecognized field type '{}'", other)));
        }
    };

    let choices: String = row.get("choices");

    Ok(NumbersProjectField {
        id: row.get("id"),
        userid: row.get("userid"),
        classid: row.get("classid"),
        projectid: row.get("projectid"),
        name: row.get("name"),
        field_type,
        choices: split_labels(&choices),
    })
}

#[async_trait]
impl ProjectStore for PostgresProjectStore {
    async fn count_projects_by_user(&self, userid: &str, classid: &str) -> Result<usize, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM projects WHERE userid = $1 AND classid = $2",
        )
        .bind(userid)
        .bind(classid)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as usize)
    }

    async fn get_class_tenant(&self, classid: &str) -> Result<TenantPolicy, StoreError> {
        let row = sqlx::query(
            "SELECT projecttypes, maxusers, maxprojectsperuser FROM tenants WHERE id = $1",
        )
        .bind(classid)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(TenantPolicy::default_for_class(classid));
        };

        let type_names: String = row.get("projecttypes");
        let mut supported = Vec::new();
        for name in type_names.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let project_type = name.parse().map_err(|_| {
                StoreError::Corrupt(format!("unrecognized project type '{}' in tenant policy", name))
            })?;
            supported.push(project_type);
        }

        let max_users: i32 = row.get("maxusers");
        let max_projects: i32 = row.get("maxprojectsperuser");

        Ok(TenantPolicy {
            classid: classid.to_string(),
            max_projects_per_user: max_projects.max(0) as usize,
            max_users: max_users.max(0) as usize,
            supported_project_types: supported,
        })
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
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO projects (id, userid, classid, projecttype, name, language, labels, numfields) \
             VALUES ($1, $2, $3, $4, $5, $6, '', $7)",
        )
        .bind(&projectid)
        .bind(userid)
        .bind(classid)
        .bind(project_type.to_string())
        .bind(&name)
        .bind(language)
        .bind(fields.len() as i32)
        .execute(&mut *tx)
        .await?;

        for field in &fields {
            let field_type = match field.field_type {
                FieldType::Int => "int",
                FieldType::Multichoice => "multichoice",
            };
            sqlx::query(
                "INSERT INTO numbersprojectsfields (id, userid, classid, projectid, name, fieldtype, choices) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(userid)
            .bind(classid)
            .bind(&projectid)
            .bind(field.name.trim())
            .bind(field_type)
            .bind(field.choices.join(","))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(projectid = %projectid, classid = %classid, "Stored new project");

        Ok(Project {
            id: projectid,
            userid: userid.to_string(),
            classid: classid.to_string(),
            project_type,
            name,
            language: language.map(String::from),
            labels: Vec::new(),
            numfields: fields.len(),
        })
    }

    async fn get_project(&self, projectid: &str) -> Result<Option<Project>, StoreError> {
        let row = sqlx::query("SELECT * FROM projects WHERE id = $1")
            .bind(projectid)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(project_from_row).transpose()
    }

    async fn get_projects_by_class(&self, classid: &str) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query("SELECT * FROM projects WHERE classid = $1 ORDER BY name")
            .bind(classid)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(project_from_row).collect()
    }

    async fn get_projects_by_user(&self, userid: &str, classid: &str) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM projects WHERE userid = $1 AND classid = $2 ORDER BY name",
        )
        .bind(userid)
        .bind(classid)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(project_from_row).collect()
    }

    async fn get_number_project_fields(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
    ) -> Result<Vec<NumbersProjectField>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM numbersprojectsfields \
             WHERE userid = $1 AND classid = $2 AND projectid = $3 ORDER BY name",
        )
        .bind(userid)
        .bind(classid)
        .bind(projectid)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(field_from_row).collect()
    }

    async fn delete_entire_project(
        &self,
        userid: &str,
        classid: &str,
        project: &Project,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM numbersprojectsfields WHERE projectid = $1")
            .bind(&project.id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM projects WHERE id = $1 AND userid = $2 AND classid = $3")
            .bind(&project.id)
            .bind(userid)
            .bind(classid)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::Missing(project.id.clone()));
        }

        tx.commit().await?;

        tracing::info!(projectid = %project.id, classid = %classid, "Deleted project");
        Ok(())
    }

    async fn add_label_to_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        label: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mut labels = self.load_labels(userid, classid, projectid).await?;

        // Adding an existing label leaves the list unchanged
        if !labels.iter().any(|l| l == label) {
            labels.push(label.to_string());
            check_labels_fit(&labels)?;
            self.save_labels(projectid, &labels).await?;
        }

        Ok(labels)
    }

    async fn remove_label_from_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        label: &str,
    ) -> Result<Vec<String>, StoreError> {
        let mut labels = self.load_labels(userid, classid, projectid).await?;
        labels.retain(|l| l != label);
        self.save_labels(projectid, &labels).await?;
        Ok(labels)
    }

    async fn replace_labels_for_project(
        &self,
        userid: &str,
        classid: &str,
        projectid: &str,
        labels: &[String],
    ) -> Result<Vec<String>, StoreError> {
        // Confirms the project is there before writing
        self.load_labels(userid, classid, projectid).await?;

        check_labels_fit(labels)?;
        self.save_labels(projectid, labels).await?;
        Ok(labels.to_vec())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
