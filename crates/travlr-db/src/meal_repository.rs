use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use travlr_core::error::AppError;
use travlr_core::meal::{Meal, MealDraft, MealFilter};
use travlr_core::pagination::Window;
use travlr_core::resource::ResourceStore;

use crate::query::{db_error, push_search, push_window};

const COLUMNS: &str = "id, code, name, cuisine, meal_type, price, image, description, \
                       ingredients, allergens, vegetarian, vegan, gluten_free, available, \
                       trip_id, schema_version, created_at, updated_at";

#[derive(Clone)]
pub struct MealRepository {
    pool: Pool<Postgres>,
}

impl MealRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MealRow {
    id: Uuid,
    code: String,
    name: String,
    cuisine: String,
    meal_type: String,
    price: f64,
    image: String,
    description: String,
    ingredients: Vec<String>,
    allergens: Vec<String>,
    vegetarian: bool,
    vegan: bool,
    gluten_free: bool,
    available: bool,
    trip_id: Option<Uuid>,
    schema_version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MealRow> for Meal {
    type Error = AppError;

    fn try_from(row: MealRow) -> Result<Self, Self::Error> {
        Ok(Meal {
            id: row.id,
            code: row.code,
            name: row.name,
            cuisine: row.cuisine,
            meal_type: row.meal_type.parse().map_err(AppError::DatabaseError)?,
            price: row.price,
            image: row.image,
            description: row.description,
            ingredients: row.ingredients,
            allergens: row.allergens,
            vegetarian: row.vegetarian,
            vegan: row.vegan,
            gluten_free: row.gluten_free,
            available: row.available,
            trip_id: row.trip_id,
            schema_version: row.schema_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl ResourceStore<Meal> for MealRepository {
    async fn fetch_window(&self, filter: &MealFilter, window: &Window) -> Result<Vec<Meal>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM meals WHERE TRUE"));
        if filter.only_available {
            qb.push(" AND available");
        }
        if let Some(meal_type) = filter.meal_type {
            qb.push(" AND meal_type = ").push_bind(meal_type.as_str());
        }
        if let Some(cuisine) = &filter.cuisine {
            qb.push(" AND cuisine = ").push_bind(cuisine.clone());
        }
        push_search(&mut qb, filter.search.as_deref());
        push_window(&mut qb, window);

        let rows = qb
            .build_query_as::<MealRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(Meal::try_from).collect()
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Meal>, AppError> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            "SELECT {COLUMNS} FROM meals WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Meal::try_from).transpose()
    }

    async fn insert(&self, draft: &MealDraft) -> Result<Meal, AppError> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            r#"
            INSERT INTO meals (code, name, cuisine, meal_type, price, image, description,
                               ingredients, allergens, vegetarian, vegan, gluten_free,
                               available, trip_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&draft.code)
        .bind(&draft.name)
        .bind(&draft.cuisine)
        .bind(draft.meal_type.as_str())
        .bind(draft.price)
        .bind(&draft.image)
        .bind(&draft.description)
        .bind(&draft.ingredients)
        .bind(&draft.allergens)
        .bind(draft.vegetarian)
        .bind(draft.vegan)
        .bind(draft.gluten_free)
        .bind(draft.available)
        .bind(draft.trip_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Meal::try_from(row)
    }

    async fn update(&self, code: &str, draft: &MealDraft) -> Result<Option<Meal>, AppError> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            r#"
            UPDATE meals
            SET name = $2, cuisine = $3, meal_type = $4, price = $5, image = $6,
                description = $7, ingredients = $8, allergens = $9, vegetarian = $10,
                vegan = $11, gluten_free = $12, available = $13, trip_id = $14,
                updated_at = NOW()
            WHERE code = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(code)
        .bind(&draft.name)
        .bind(&draft.cuisine)
        .bind(draft.meal_type.as_str())
        .bind(draft.price)
        .bind(&draft.image)
        .bind(&draft.description)
        .bind(&draft.ingredients)
        .bind(&draft.allergens)
        .bind(draft.vegetarian)
        .bind(draft.vegan)
        .bind(draft.gluten_free)
        .bind(draft.available)
        .bind(draft.trip_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Meal::try_from).transpose()
    }

    async fn delete(&self, code: &str) -> Result<Option<Meal>, AppError> {
        let row = sqlx::query_as::<_, MealRow>(&format!(
            "DELETE FROM meals WHERE code = $1 RETURNING {COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Meal::try_from).transpose()
    }
}
