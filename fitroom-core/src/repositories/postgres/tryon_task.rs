// src/repositories/postgres/tryon_task.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use fitroom_common::models::tryon::{GarmentSnapshotEntry, TaskStatus, TryOnTask};
use fitroom_common::traits::repository_traits::TryOnTaskRepository;
use crate::Error;

pub struct PostgresTryOnTaskRepository {
    pool: Pool<Postgres>,
}

impl PostgresTryOnTaskRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn row_to_task(r: &PgRow) -> Result<TryOnTask, Error> {
        let garments: Json<Vec<GarmentSnapshotEntry>> = r.try_get("garments")?;
        let status_text: String = r.try_get("status")?;
        let status = TaskStatus::parse(&status_text)
            .ok_or_else(|| Error::Parse(format!("unknown task status '{}'", status_text)))?;

        Ok(TryOnTask {
            task_id: r.try_get("task_id")?,
            user_id: r.try_get("user_id")?,
            person_image_url: r.try_get("person_image_url")?,
            garments: garments.0,
            status,
            output_image_url: r.try_get("output_image_url")?,
            model_id: r.try_get("model_id")?,
            prompt: r.try_get("prompt")?,
            request_id: r.try_get("request_id")?,
            submit_time: r.try_get::<DateTime<Utc>, _>("submit_time")?,
            end_time: r.try_get("end_time")?,
            error_code: r.try_get("error_code")?,
            error_message: r.try_get("error_message")?,
            created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

const TASK_COLUMNS: &str = r#"
    task_id, user_id, person_image_url, garments, status, output_image_url,
    model_id, prompt, request_id, submit_time, end_time, error_code,
    error_message, created_at
"#;

#[async_trait]
impl TryOnTaskRepository for PostgresTryOnTaskRepository {
    async fn insert(&self, task: &TryOnTask) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO tryon_tasks (
                task_id, user_id, person_image_url, garments, status, output_image_url,
                model_id, prompt, request_id, submit_time, end_time, error_code,
                error_message, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&task.task_id)
        .bind(task.user_id)
        .bind(&task.person_image_url)
        .bind(Json(&task.garments))
        .bind(task.status.as_str())
        .bind(&task.output_image_url)
        .bind(&task.model_id)
        .bind(&task.prompt)
        .bind(&task.request_id)
        .bind(task.submit_time)
        .bind(task.end_time)
        .bind(&task.error_code)
        .bind(&task.error_message)
        .bind(task.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, user_id: Uuid, task_id: &str) -> Result<Option<TryOnTask>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tryon_tasks WHERE task_id = $1 AND user_id = $2"
        ))
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_task(&r)?)),
            None => Ok(None),
        }
    }

    async fn update_output_url(
        &self,
        user_id: Uuid,
        task_id: &str,
        url: &str,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE tryon_tasks
            SET output_image_url = $1
            WHERE task_id = $2 AND user_id = $3
            "#,
        )
        .bind(url)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TryOnTask>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tryon_tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }

    async fn list_succeeded(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TryOnTask>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tryon_tasks
            WHERE user_id = $1
              AND status = 'SUCCEEDED'
              AND output_image_url IS NOT NULL
            ORDER BY end_time DESC NULLS LAST
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_task).collect()
    }
}
