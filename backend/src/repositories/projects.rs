use chrono::Utc;
use rand::Rng;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::project::Project;
use crate::repositories::transaction::{begin_transaction, commit_transaction};
use crate::types::{DeploymentId, ProjectId, UserId};

const SELECT_COLUMNS: &str = "id, owner_id, name, language, status, subdomain_suffix, \
                              prod_deployment_id, deployment_counter, created_at, updated_at";

pub async fn insert_project(pool: &PgPool, project: &Project) -> Result<Project, sqlx::Error> {
    let query = format!(
        "INSERT INTO projects \
            (id, owner_id, name, language, status, subdomain_suffix, prod_deployment_id, \
             deployment_counter, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {}",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, Project>(&query)
        .bind(project.id)
        .bind(project.owner_id)
        .bind(&project.name)
        .bind(project.language)
        .bind(project.status)
        .bind(&project.subdomain_suffix)
        .bind(project.prod_deployment_id)
        .bind(project.deployment_counter)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(pool)
        .await
}

pub async fn find_project_by_id(
    pool: &PgPool,
    id: ProjectId,
) -> Result<Option<Project>, sqlx::Error> {
    let query = format!("SELECT {} FROM projects WHERE id = $1", SELECT_COLUMNS);
    sqlx::query_as::<_, Project>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Finds a project by name, optionally scoped to an owner.
pub async fn find_project_by_name(
    pool: &PgPool,
    name: &str,
    owner_id: Option<UserId>,
) -> Result<Option<Project>, sqlx::Error> {
    match owner_id {
        Some(owner_id) => {
            let query = format!(
                "SELECT {} FROM projects WHERE name = $1 AND owner_id = $2",
                SELECT_COLUMNS
            );
            sqlx::query_as::<_, Project>(&query)
                .bind(name)
                .bind(owner_id)
                .fetch_optional(pool)
                .await
        }
        None => {
            let query = format!("SELECT {} FROM projects WHERE name = $1", SELECT_COLUMNS);
            sqlx::query_as::<_, Project>(&query)
                .bind(name)
                .fetch_optional(pool)
                .await
        }
    }
}

pub async fn list_projects_for_owner(
    pool: &PgPool,
    owner_id: UserId,
) -> Result<Vec<Project>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM projects WHERE owner_id = $1 ORDER BY updated_at DESC",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, Project>(&query)
        .bind(owner_id)
        .fetch_all(pool)
        .await
}

/// Platform-wide listing for admin aggregates.
pub async fn list_all_projects(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<Project>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM projects ORDER BY updated_at DESC LIMIT $1 OFFSET $2",
        SELECT_COLUMNS
    );
    sqlx::query_as::<_, Project>(&query)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_projects(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(pool)
        .await
}

pub async fn is_unique_name(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
    let existing: Option<ProjectId> = sqlx::query_scalar("SELECT id FROM projects WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(existing.is_none())
}

/// Renames a project, guarded against a racing promotion: the caller passes
/// the `prod_deployment_id` it read, and a mismatch at write time means the
/// pointer moved underneath it.
pub async fn rename_project_guarded(
    pool: &PgPool,
    id: ProjectId,
    name: &str,
    expected_prod: Option<DeploymentId>,
) -> Result<Project, AppError> {
    let query = format!(
        "UPDATE projects SET name = $2, updated_at = $3 \
         WHERE id = $1 AND prod_deployment_id IS NOT DISTINCT FROM $4 \
         RETURNING {}",
        SELECT_COLUMNS
    );
    let project = sqlx::query_as::<_, Project>(&query)
        .bind(id)
        .bind(name)
        .bind(Utc::now())
        .bind(expected_prod)
        .fetch_optional(pool)
        .await?;
    project.ok_or(AppError::ConcurrentModification)
}

/// Deletes a project and all of its deployments, with the same promotion
/// guard as [`rename_project_guarded`].
pub async fn delete_project_guarded(
    pool: &PgPool,
    id: ProjectId,
    expected_prod: Option<DeploymentId>,
) -> Result<(), AppError> {
    let mut tx = begin_transaction(pool).await?;
    let result =
        sqlx::query("DELETE FROM projects WHERE id = $1 AND prod_deployment_id IS NOT DISTINCT FROM $2")
            .bind(id)
            .bind(expected_prod)
            .execute(&mut *tx)
            .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::ConcurrentModification);
    }
    // deployments go with the project via ON DELETE CASCADE
    commit_transaction(tx).await?;
    Ok(())
}

const NAME_WORDS: &[&str] = &[
    "amber", "birch", "cedar", "coral", "dusty", "ember", "fable", "gleam", "hazel", "ivory",
    "jolly", "kite", "lunar", "maple", "misty", "noble", "ocean", "pearl", "quiet", "ridge",
    "sable", "tidal", "umber", "valley", "willow", "zephyr",
];

/// Generates a random two-word project name with a numeric suffix.
fn random_name() -> String {
    let mut rng = rand::thread_rng();
    let word1 = NAME_WORDS[rng.gen_range(0..NAME_WORDS.len())];
    let word2 = NAME_WORDS[rng.gen_range(0..NAME_WORDS.len())];
    let number: u32 = rng.gen_range(10..100);
    format!("{}-{}-{}", word1, word2, number)
}

/// Generates a random project name not yet taken.
pub async fn random_unique_name(pool: &PgPool) -> Result<String, sqlx::Error> {
    let mut name = random_name();
    loop {
        if is_unique_name(pool, &name).await? {
            break;
        }
        name = random_name();
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::validate_project_name;

    #[test]
    fn random_names_are_valid_dns_labels() {
        for _ in 0..50 {
            let name = random_name();
            assert!(validate_project_name(&name).is_ok(), "bad name: {}", name);
        }
    }
}
