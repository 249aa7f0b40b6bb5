//! # Ingredient Repository
//!
//! Database operations for ingredients.
//!
//! ## Key Operations
//! - CRUD by id, lookup by unique name
//! - Filters: category, below-minimum stock
//! - Case-insensitive substring search on name
//! - Batch load by id set (recipe snapshots)
//!
//! ## Row Mapping
//! ```text
//! ingredients row (TEXT id, TEXT unit, REAL quantity)
//!      │
//!      ▼
//! IngredientRow (sqlx::FromRow)
//!      │  Uuid::parse_str, UnitOfMeasure::parse, Quantity::new
//!      ▼
//! Ingredient ── any failure → DbError::CorruptRow
//! ```
//!
//! Point reads and writes are also exposed as free functions over a
//! `SqliteConnection` so that [`crate::UnitOfWork`] can run them inside its
//! transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pantry_core::{Ingredient, Quantity, UnitOfMeasure};

const TABLE: &str = "ingredients";

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, quantity, unit_of_measure, category, minimum_stock,
           created_at, updated_at
    FROM ingredients
"#;

// =============================================================================
// Row Type
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct IngredientRow {
    id: String,
    name: String,
    quantity: f64,
    unit_of_measure: String,
    category: String,
    minimum_stock: f64,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<IngredientRow> for Ingredient {
    type Error = DbError;

    fn try_from(row: IngredientRow) -> DbResult<Self> {
        Ok(Ingredient {
            id: Uuid::parse_str(&row.id).map_err(|e| DbError::corrupt(TABLE, e))?,
            name: row.name,
            quantity: Quantity::new(row.quantity).map_err(|e| DbError::corrupt(TABLE, e))?,
            unit_of_measure: UnitOfMeasure::parse(&row.unit_of_measure)
                .map_err(|e| DbError::corrupt(TABLE, e))?,
            category: row.category,
            minimum_stock: Quantity::new(row.minimum_stock)
                .map_err(|e| DbError::corrupt(TABLE, e))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn into_ingredients(rows: Vec<IngredientRow>) -> DbResult<Vec<Ingredient>> {
    rows.into_iter().map(Ingredient::try_from).collect()
}

// =============================================================================
// Connection-Level Reads
// =============================================================================

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> DbResult<Option<Ingredient>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    let row = sqlx::query_as::<_, IngredientRow>(&sql)
        .bind(id.to_string())
        .fetch_optional(conn)
        .await?;

    row.map(Ingredient::try_from).transpose()
}

/// Loads every ingredient whose id is in `ids`, keyed by id.
pub(crate) async fn find_by_ids(
    conn: &mut SqliteConnection,
    ids: &[Uuid],
) -> DbResult<HashMap<Uuid, Ingredient>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_COLUMNS);
    builder.push(" WHERE id IN (");
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(")");

    let rows = builder
        .build_query_as::<IngredientRow>()
        .fetch_all(conn)
        .await?;

    let ingredients = into_ingredients(rows)?;
    debug!(
        requested = ids.len(),
        found = ingredients.len(),
        "Loaded ingredient snapshot"
    );

    Ok(ingredients.into_iter().map(|i| (i.id, i)).collect())
}

pub(crate) async fn find_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<Ingredient>> {
    let sql = format!("{SELECT_COLUMNS} WHERE name = ?1");
    let row = sqlx::query_as::<_, IngredientRow>(&sql)
        .bind(name)
        .fetch_optional(conn)
        .await?;

    row.map(Ingredient::try_from).transpose()
}

// =============================================================================
// Connection-Level Writes
// =============================================================================

/// Inserts a new ingredient row.
pub(crate) async fn insert(conn: &mut SqliteConnection, ingredient: &Ingredient) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO ingredients (
            id, name, quantity, unit_of_measure, category, minimum_stock,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(ingredient.id.to_string())
    .bind(&ingredient.name)
    .bind(ingredient.quantity.value())
    .bind(ingredient.unit_of_measure.code())
    .bind(&ingredient.category)
    .bind(ingredient.minimum_stock.value())
    .bind(ingredient.created_at)
    .bind(ingredient.updated_at)
    .execute(conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
            field,
            value: ingredient.name.clone(),
        },
        other => other,
    })?;

    Ok(())
}

/// Overwrites every mutable column of an existing row.
///
/// ## Errors
/// `NotFound` if no row has the ingredient's id.
pub(crate) async fn update(conn: &mut SqliteConnection, ingredient: &Ingredient) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE ingredients SET
            name = ?2,
            quantity = ?3,
            unit_of_measure = ?4,
            category = ?5,
            minimum_stock = ?6,
            updated_at = ?7
        WHERE id = ?1
        "#,
    )
    .bind(ingredient.id.to_string())
    .bind(&ingredient.name)
    .bind(ingredient.quantity.value())
    .bind(ingredient.unit_of_measure.code())
    .bind(&ingredient.category)
    .bind(ingredient.minimum_stock.value())
    .bind(ingredient.updated_at)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Ingredient", ingredient.id.to_string()));
    }

    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for ingredient database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = IngredientRepository::new(pool);
///
/// let flour = repo.find_by_name("Flour").await?;
/// let low = repo.find_below_minimum_stock().await?;
/// ```
#[derive(Debug, Clone)]
pub struct IngredientRepository {
    pool: SqlitePool,
}

impl IngredientRepository {
    /// Creates a new IngredientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        IngredientRepository { pool }
    }

    /// Inserts a new ingredient.
    ///
    /// ## Errors
    /// `UniqueViolation` if the name is taken.
    pub async fn insert(&self, ingredient: &Ingredient) -> DbResult<()> {
        debug!(id = %ingredient.id, name = %ingredient.name, "Inserting ingredient");
        let mut conn = self.pool.acquire().await?;
        insert(&mut conn, ingredient).await
    }

    /// Persists the current state of an existing ingredient.
    pub async fn update(&self, ingredient: &Ingredient) -> DbResult<()> {
        debug!(id = %ingredient.id, "Updating ingredient");
        let mut conn = self.pool.acquire().await?;
        update(&mut conn, ingredient).await
    }

    /// Gets an ingredient by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Ingredient))` - Ingredient found
    /// * `Ok(None)` - Ingredient not found
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<Ingredient>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Loads every ingredient whose id is in `ids`, keyed by id.
    ///
    /// Ids with no row are simply absent from the map.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> DbResult<HashMap<Uuid, Ingredient>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.acquire().await?;
        find_by_ids(&mut conn, ids).await
    }

    /// Gets an ingredient by exact name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Ingredient>> {
        let mut conn = self.pool.acquire().await?;
        find_by_name(&mut conn, name).await
    }

    /// Lists ingredients in a category, sorted by name.
    pub async fn find_by_category(&self, category: &str) -> DbResult<Vec<Ingredient>> {
        let sql = format!("{SELECT_COLUMNS} WHERE category = ?1 ORDER BY name");
        let rows = sqlx::query_as::<_, IngredientRow>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await?;

        into_ingredients(rows)
    }

    /// Lists ingredients whose stock is strictly below their minimum.
    pub async fn find_below_minimum_stock(&self) -> DbResult<Vec<Ingredient>> {
        let sql = format!("{SELECT_COLUMNS} WHERE quantity < minimum_stock ORDER BY name");
        let rows = sqlx::query_as::<_, IngredientRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        into_ingredients(rows)
    }

    /// Lists ingredients page by page, sorted by name.
    pub async fn find_all(&self, skip: u32, limit: u32) -> DbResult<Vec<Ingredient>> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY name LIMIT ?1 OFFSET ?2");
        let rows = sqlx::query_as::<_, IngredientRow>(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(skip))
            .fetch_all(&self.pool)
            .await?;

        into_ingredients(rows)
    }

    /// Case-insensitive substring search on name.
    ///
    /// An empty query matches everything (up to `limit`).
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Ingredient>> {
        let query = query.trim();
        debug!(query = %query, limit = %limit, "Searching ingredients");

        let sql = format!(
            "{SELECT_COLUMNS} WHERE instr(lower(name), lower(?1)) > 0 ORDER BY name LIMIT ?2"
        );
        let rows = sqlx::query_as::<_, IngredientRow>(&sql)
            .bind(query)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Search returned ingredients");
        into_ingredients(rows)
    }

    /// Deletes an ingredient.
    ///
    /// Recipe lines that reference it are kept; availability checks report
    /// them as unavailable.
    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Ingredient", id.to_string()));
        }

        debug!(id = %id, "Deleted ingredient");
        Ok(())
    }

    /// Counts all ingredients.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ingredients")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
