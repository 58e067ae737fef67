// src/repositories/postgres/profile.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use fitroom_common::models::profile::{AvatarImage, GarmentSlots, ModelProfile, SlotEntry};
use fitroom_common::traits::repository_traits::ProfileRepository;
use crate::Error;

pub struct PostgresProfileRepository {
    pool: Pool<Postgres>,
}

impl PostgresProfileRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn row_to_profile(r: &PgRow) -> Result<ModelProfile, Error> {
        let avatar_images: Json<Vec<AvatarImage>> = r.try_get("avatar_images")?;
        let slots = GarmentSlots {
            top: SlotEntry {
                url: r.try_get("top_url")?,
                garment_id: r.try_get("top_garment_id")?,
            },
            bottom: SlotEntry {
                url: r.try_get("bottom_url")?,
                garment_id: r.try_get("bottom_garment_id")?,
            },
            outerwear: SlotEntry {
                url: r.try_get("outerwear_url")?,
                garment_id: r.try_get("outerwear_garment_id")?,
            },
            headwear: SlotEntry {
                url: r.try_get("headwear_url")?,
                garment_id: r.try_get("headwear_garment_id")?,
            },
            shoes: SlotEntry {
                url: r.try_get("shoes_url")?,
                garment_id: r.try_get("shoes_garment_id")?,
            },
            bag: SlotEntry {
                url: r.try_get("bag_url")?,
                garment_id: r.try_get("bag_garment_id")?,
            },
            accessories: SlotEntry {
                url: r.try_get("accessories_url")?,
                garment_id: r.try_get("accessories_garment_id")?,
            },
            other: SlotEntry {
                url: r.try_get("other_url")?,
                garment_id: r.try_get("other_garment_id")?,
            },
        };

        Ok(ModelProfile {
            user_id: r.try_get("user_id")?,
            model_name: r.try_get("model_name")?,
            avatar_images: avatar_images.0,
            current_avatar_url: r.try_get("current_avatar_url")?,
            current_tryon_image_url: r.try_get("current_tryon_image_url")?,
            gender: r.try_get("gender")?,
            age_stage: r.try_get("age_stage")?,
            height_cm: r.try_get("height_cm")?,
            weight_kg: r.try_get("weight_kg")?,
            body_feature: r.try_get("body_feature")?,
            suitable_weather: r.try_get("suitable_weather")?,
            shooting_style: r.try_get("shooting_style")?,
            mood: r.try_get("mood")?,
            style_preference: r.try_get("style_preference")?,
            description: r.try_get("description")?,
            enabled: r.try_get("enabled")?,
            slots,
            created_at: r.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: r.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }
}

const PROFILE_COLUMNS: &str = r#"
    user_id, model_name, avatar_images, current_avatar_url, current_tryon_image_url,
    gender, age_stage, height_cm, weight_kg, body_feature, suitable_weather,
    shooting_style, mood, style_preference, description, enabled,
    top_url, top_garment_id, bottom_url, bottom_garment_id,
    outerwear_url, outerwear_garment_id, headwear_url, headwear_garment_id,
    shoes_url, shoes_garment_id, bag_url, bag_garment_id,
    accessories_url, accessories_garment_id, other_url, other_garment_id,
    created_at, updated_at
"#;

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn get_by_user(&self, user_id: Uuid) -> Result<Option<ModelProfile>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM model_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Self::row_to_profile(&r)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, profile: &ModelProfile) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO model_profiles (
                user_id, model_name, avatar_images, current_avatar_url, current_tryon_image_url,
                gender, age_stage, height_cm, weight_kg, body_feature, suitable_weather,
                shooting_style, mood, style_preference, description, enabled,
                top_url, top_garment_id, bottom_url, bottom_garment_id,
                outerwear_url, outerwear_garment_id, headwear_url, headwear_garment_id,
                shoes_url, shoes_garment_id, bag_url, bag_garment_id,
                accessories_url, accessories_garment_id, other_url, other_garment_id,
                created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30,
                $31, $32, $33, $34
            )
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.model_name)
        .bind(Json(&profile.avatar_images))
        .bind(&profile.current_avatar_url)
        .bind(&profile.current_tryon_image_url)
        .bind(&profile.gender)
        .bind(&profile.age_stage)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(&profile.body_feature)
        .bind(&profile.suitable_weather)
        .bind(&profile.shooting_style)
        .bind(&profile.mood)
        .bind(&profile.style_preference)
        .bind(&profile.description)
        .bind(profile.enabled)
        .bind(&profile.slots.top.url)
        .bind(&profile.slots.top.garment_id)
        .bind(&profile.slots.bottom.url)
        .bind(&profile.slots.bottom.garment_id)
        .bind(&profile.slots.outerwear.url)
        .bind(&profile.slots.outerwear.garment_id)
        .bind(&profile.slots.headwear.url)
        .bind(&profile.slots.headwear.garment_id)
        .bind(&profile.slots.shoes.url)
        .bind(&profile.slots.shoes.garment_id)
        .bind(&profile.slots.bag.url)
        .bind(&profile.slots.bag.garment_id)
        .bind(&profile.slots.accessories.url)
        .bind(&profile.slots.accessories.garment_id)
        .bind(&profile.slots.other.url)
        .bind(&profile.slots.other.garment_id)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, profile: &ModelProfile) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE model_profiles
            SET model_name = $1,
                avatar_images = $2,
                current_avatar_url = $3,
                current_tryon_image_url = $4,
                gender = $5,
                age_stage = $6,
                height_cm = $7,
                weight_kg = $8,
                body_feature = $9,
                suitable_weather = $10,
                shooting_style = $11,
                mood = $12,
                style_preference = $13,
                description = $14,
                enabled = $15,
                top_url = $16, top_garment_id = $17,
                bottom_url = $18, bottom_garment_id = $19,
                outerwear_url = $20, outerwear_garment_id = $21,
                headwear_url = $22, headwear_garment_id = $23,
                shoes_url = $24, shoes_garment_id = $25,
                bag_url = $26, bag_garment_id = $27,
                accessories_url = $28, accessories_garment_id = $29,
                other_url = $30, other_garment_id = $31,
                updated_at = now()
            WHERE user_id = $32
            "#,
        )
        .bind(&profile.model_name)
        .bind(Json(&profile.avatar_images))
        .bind(&profile.current_avatar_url)
        .bind(&profile.current_tryon_image_url)
        .bind(&profile.gender)
        .bind(&profile.age_stage)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(&profile.body_feature)
        .bind(&profile.suitable_weather)
        .bind(&profile.shooting_style)
        .bind(&profile.mood)
        .bind(&profile.style_preference)
        .bind(&profile.description)
        .bind(profile.enabled)
        .bind(&profile.slots.top.url)
        .bind(&profile.slots.top.garment_id)
        .bind(&profile.slots.bottom.url)
        .bind(&profile.slots.bottom.garment_id)
        .bind(&profile.slots.outerwear.url)
        .bind(&profile.slots.outerwear.garment_id)
        .bind(&profile.slots.headwear.url)
        .bind(&profile.slots.headwear.garment_id)
        .bind(&profile.slots.shoes.url)
        .bind(&profile.slots.shoes.garment_id)
        .bind(&profile.slots.bag.url)
        .bind(&profile.slots.bag.garment_id)
        .bind(&profile.slots.accessories.url)
        .bind(&profile.slots.accessories.garment_id)
        .bind(&profile.slots.other.url)
        .bind(&profile.slots.other.garment_id)
        .bind(profile.user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_garment_slots(&self, user_id: Uuid) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE model_profiles
            SET top_url = NULL, top_garment_id = NULL,
                bottom_url = NULL, bottom_garment_id = NULL,
                outerwear_url = NULL, outerwear_garment_id = NULL,
                headwear_url = NULL, headwear_garment_id = NULL,
                shoes_url = NULL, shoes_garment_id = NULL,
                bag_url = NULL, bag_garment_id = NULL,
                accessories_url = NULL, accessories_garment_id = NULL,
                other_url = NULL, other_garment_id = NULL,
                updated_at = now()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_current_tryon_image(&self, user_id: Uuid, url: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE model_profiles
            SET current_tryon_image_url = $1,
                updated_at = now()
            WHERE user_id = $2
            "#,
        )
        .bind(url)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_current_avatar(&self, user_id: Uuid, url: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE model_profiles
            SET current_avatar_url = $1,
                updated_at = now()
            WHERE user_id = $2
            "#,
        )
        .bind(url)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save_avatar_gallery(
        &self,
        user_id: Uuid,
        gallery: &[AvatarImage],
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE model_profiles
            SET avatar_images = $1,
                updated_at = now()
            WHERE user_id = $2
            "#,
        )
        .bind(Json(gallery))
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
