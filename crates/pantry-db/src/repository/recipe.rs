//! # Recipe Repository
//!
//! Database operations for recipes and their ingredient lines.
//!
//! ## Storage Layout
//! ```text
//! recipes                      recipe_ingredients
//! ┌──────────┬────────┐        ┌───────────┬──────────┬───────────────┬──────┐
//! │ id       │ name   │ ◄───── │ recipe_id │ position │ ingredient_id │ name │
//! │ 7d1e...  │ Bread  │        │ 7d1e...   │ 0        │ a0c4...       │ Flour│
//! └──────────┴────────┘        │ 7d1e...   │ 1        │ 51bb...       │ Salt │
//!                              └───────────┴──────────┴───────────────┴──────┘
//! ```
//!
//! Lines are rewritten wholesale on update and come back ordered by
//! `position`. `ingredient_id` carries no foreign key: a recipe keeps its
//! lines when an ingredient is deleted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pantry_core::{Quantity, Recipe, RecipeLine, UnitOfMeasure};

const TABLE: &str = "recipes";
const LINES_TABLE: &str = "recipe_ingredients";

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, preparation_time, instructions, created_at, updated_at
    FROM recipes
"#;

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: String,
    name: String,
    preparation_time: i64,
    instructions: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    recipe_id: String,
    ingredient_id: String,
    name: String,
    quantity: f64,
    unit_of_measure: String,
}

impl TryFrom<LineRow> for RecipeLine {
    type Error = DbError;

    fn try_from(row: LineRow) -> DbResult<Self> {
        Ok(RecipeLine {
            ingredient_id: Uuid::parse_str(&row.ingredient_id)
                .map_err(|e| DbError::corrupt(LINES_TABLE, e))?,
            name: row.name,
            quantity: Quantity::new(row.quantity).map_err(|e| DbError::corrupt(LINES_TABLE, e))?,
            unit_of_measure: UnitOfMeasure::parse(&row.unit_of_measure)
                .map_err(|e| DbError::corrupt(LINES_TABLE, e))?,
        })
    }
}

fn assemble(row: RecipeRow, lines: Vec<RecipeLine>) -> DbResult<Recipe> {
    Ok(Recipe {
        id: Uuid::parse_str(&row.id).map_err(|e| DbError::corrupt(TABLE, e))?,
        name: row.name,
        ingredients: lines,
        preparation_time: u32::try_from(row.preparation_time)
            .map_err(|e| DbError::corrupt(TABLE, e))?,
        instructions: row.instructions,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

// =============================================================================
// Connection-Level Reads
// =============================================================================

/// Loads the lines for `rows` in one query and assembles recipes,
/// preserving the order of `rows`.
async fn with_lines(conn: &mut SqliteConnection, rows: Vec<RecipeRow>) -> DbResult<Vec<Recipe>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT recipe_id, ingredient_id, name, quantity, unit_of_measure \
         FROM recipe_ingredients WHERE recipe_id IN (",
    );
    let mut separated = builder.separated(", ");
    for row in &rows {
        separated.push_bind(row.id.clone());
    }
    separated.push_unseparated(") ORDER BY recipe_id, position");

    let line_rows = builder.build_query_as::<LineRow>().fetch_all(conn).await?;

    let mut lines: HashMap<String, Vec<RecipeLine>> = HashMap::new();
    for line in line_rows {
        let recipe_id = line.recipe_id.clone();
        lines
            .entry(recipe_id)
            .or_default()
            .push(RecipeLine::try_from(line)?);
    }

    rows.into_iter()
        .map(|row| {
            let recipe_lines = lines.remove(&row.id).unwrap_or_default();
            assemble(row, recipe_lines)
        })
        .collect()
}

async fn find_one(
    conn: &mut SqliteConnection,
    filter: &str,
    value: String,
) -> DbResult<Option<Recipe>> {
    let sql = format!("{SELECT_COLUMNS} WHERE {filter} = ?1");
    let row = sqlx::query_as::<_, RecipeRow>(&sql)
        .bind(value)
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => Ok(with_lines(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

pub(crate) async fn find_by_id(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> DbResult<Option<Recipe>> {
    find_one(conn, "id", id.to_string()).await
}

pub(crate) async fn find_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<Recipe>> {
    find_one(conn, "name", name.to_string()).await
}

// =============================================================================
// Connection-Level Writes
// =============================================================================

async fn insert_lines(conn: &mut SqliteConnection, recipe: &Recipe) -> DbResult<()> {
    let recipe_id = recipe.id.to_string();

    for (position, line) in recipe.ingredients.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO recipe_ingredients (
                recipe_id, position, ingredient_id, name, quantity, unit_of_measure
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&recipe_id)
        .bind(position as i64)
        .bind(line.ingredient_id.to_string())
        .bind(&line.name)
        .bind(line.quantity.value())
        .bind(line.unit_of_measure.code())
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Inserts a recipe row and its lines.
pub(crate) async fn insert(conn: &mut SqliteConnection, recipe: &Recipe) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO recipes (
            id, name, preparation_time, instructions, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(recipe.id.to_string())
    .bind(&recipe.name)
    .bind(i64::from(recipe.preparation_time))
    .bind(&recipe.instructions)
    .bind(recipe.created_at)
    .bind(recipe.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
            field,
            value: recipe.name.clone(),
        },
        other => other,
    })?;

    insert_lines(conn, recipe).await
}

/// Updates a recipe row and replaces all of its lines.
///
/// ## Errors
/// `NotFound` if no row has the recipe's id.
pub(crate) async fn update(conn: &mut SqliteConnection, recipe: &Recipe) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE recipes SET
            name = ?2,
            preparation_time = ?3,
            instructions = ?4,
            updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(recipe.id.to_string())
    .bind(&recipe.name)
    .bind(i64::from(recipe.preparation_time))
    .bind(&recipe.instructions)
    .bind(recipe.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
            field,
            value: recipe.name.clone(),
        },
        other => other,
    })?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Recipe", recipe.id.to_string()));
    }

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?1")
        .bind(recipe.id.to_string())
        .execute(&mut *conn)
        .await?;

    insert_lines(conn, recipe).await
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for recipe database operations.
#[derive(Debug, Clone)]
pub struct RecipeRepository {
    pool: SqlitePool,
}

impl RecipeRepository {
    /// Creates a new RecipeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RecipeRepository { pool }
    }

    /// Inserts a recipe and its lines atomically.
    pub async fn insert(&self, recipe: &Recipe) -> DbResult<()> {
        debug!(id = %recipe.id, name = %recipe.name, lines = recipe.ingredients.len(), "Inserting recipe");
        let mut tx = self.pool.begin().await?;
        insert(&mut tx, recipe).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Persists the current state of an existing recipe.
    pub async fn update(&self, recipe: &Recipe) -> DbResult<()> {
        debug!(id = %recipe.id, "Updating recipe");
        let mut tx = self.pool.begin().await?;
        update(&mut tx, recipe).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Gets a recipe with its lines.
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        find_by_id(&mut conn, id).await
    }

    /// Gets a recipe by exact name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        find_by_name(&mut conn, name).await
    }

    /// Lists recipes page by page, sorted by name.
    pub async fn find_all(&self, skip: u32, limit: u32) -> DbResult<Vec<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        let sql = format!("{SELECT_COLUMNS} ORDER BY name LIMIT ?1 OFFSET ?2");
        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(skip))
            .fetch_all(&mut *conn)
            .await?;

        with_lines(&mut conn, rows).await
    }

    /// Case-insensitive substring search on name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Recipe>> {
        let query = query.trim();
        let mut conn = self.pool.acquire().await?;
        debug!(query = %query, limit = %limit, "Searching recipes");

        let sql = format!(
            "{SELECT_COLUMNS} WHERE instr(lower(name), lower(?1)) > 0 ORDER BY name LIMIT ?2"
        );
        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(query)
            .bind(i64::from(limit))
            .fetch_all(&mut *conn)
            .await?;

        with_lines(&mut conn, rows).await
    }

    /// Lists recipes with at least one line referencing `ingredient_id`.
    pub async fn find_by_ingredient(&self, ingredient_id: Uuid) -> DbResult<Vec<Recipe>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, name, preparation_time, instructions, created_at, updated_at
            FROM recipes
            WHERE id IN (
                SELECT recipe_id FROM recipe_ingredients WHERE ingredient_id = ?1
            )
            ORDER BY name
            "#,
        )
        .bind(ingredient_id.to_string())
        .fetch_all(&mut *conn)
        .await?;

        with_lines(&mut conn, rows).await
    }

    /// Deletes a recipe; its lines go with it.
    pub async fn delete(&self, id: Uuid) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Recipe", id.to_string()));
        }

        debug!(id = %id, "Deleted recipe");
        Ok(())
    }

    /// Counts all recipes.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

