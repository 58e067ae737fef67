// src/repositories/postgres/garment.rs

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use fitroom_common::models::garment::Garment;
use fitroom_common::traits::repository_traits::GarmentRepository;
use crate::Error;

pub struct PostgresGarmentRepository {
    pool: Pool<Postgres>,
}

impl PostgresGarmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GarmentRepository for PostgresGarmentRepository {
    async fn find_by_id(&self, garment_id: &str) -> Result<Option<Garment>, Error> {
        // `Garment` derives sqlx::FromRow, so query_as works directly.
        let garment = sqlx::query_as::<_, Garment>(
            r#"
            SELECT garment_id, shop_id, shop_name, name, category, image_url,
                   shop_qr_image_url, enabled, created_at, updated_at
            FROM garments
            WHERE garment_id = $1
            "#,
        )
        .bind(garment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(garment)
    }
}
