//! Read-side operations plus deletes.

use tracing::{debug, info};
use uuid::Uuid;

use pantry_core::validation::{clamp_page_limit, validate_search_query};
use pantry_core::{CoreError, Ingredient, Recipe};
use pantry_db::{Database, DbError};

use crate::error::{ServiceError, ServiceResult};

/// Lookups and listings over ingredients and recipes.
#[derive(Debug, Clone)]
pub struct InventoryQueryService {
    db: Database,
}

impl InventoryQueryService {
    pub fn new(db: Database) -> Self {
        InventoryQueryService { db }
    }

    pub async fn get_ingredient_by_id(&self, id: Uuid) -> ServiceResult<Ingredient> {
        self.db
            .ingredients()
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::IngredientNotFound(id.to_string()).into())
    }

    pub async fn get_ingredients_by_category(&self, category: &str) -> ServiceResult<Vec<Ingredient>> {
        Ok(self.db.ingredients().find_by_category(category.trim()).await?)
    }

    pub async fn get_ingredients_below_minimum_stock(&self) -> ServiceResult<Vec<Ingredient>> {
        let low = self.db.ingredients().find_below_minimum_stock().await?;
        debug!(count = low.len(), "Ingredients below minimum stock");
        Ok(low)
    }

    /// One page of ingredients ordered by name.
    ///
    /// `limit` defaults to 100 and is capped at 1000.
    pub async fn get_all_ingredients(
        &self,
        skip: u32,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<Ingredient>> {
        Ok(self
            .db
            .ingredients()
            .find_all(skip, clamp_page_limit(limit))
            .await?)
    }

    /// Case-insensitive substring search on ingredient names.
    pub async fn search_ingredients(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> ServiceResult<Vec<Ingredient>> {
        let query = validate_search_query(query)?;
        Ok(self
            .db
            .ingredients()
            .search(&query, clamp_page_limit(limit))
            .await?)
    }

    pub async fn get_recipe_by_id(&self, id: Uuid) -> ServiceResult<Recipe> {
        self.db
            .recipes()
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::RecipeNotFound(id.to_string()).into())
    }

    pub async fn get_all_recipes(&self, skip: u32, limit: Option<u32>) -> ServiceResult<Vec<Recipe>> {
        Ok(self
            .db
            .recipes()
            .find_all(skip, clamp_page_limit(limit))
            .await?)
    }

    pub async fn search_recipes(&self, query: &str, limit: Option<u32>) -> ServiceResult<Vec<Recipe>> {
        let query = validate_search_query(query)?;
        Ok(self
            .db
            .recipes()
            .search(&query, clamp_page_limit(limit))
            .await?)
    }

    /// Recipes with at least one line referencing `ingredient_id`.
    pub async fn get_recipes_by_ingredient(&self, ingredient_id: Uuid) -> ServiceResult<Vec<Recipe>> {
        Ok(self.db.recipes().find_by_ingredient(ingredient_id).await?)
    }

    /// Deletes an ingredient.
    ///
    /// Recipe lines that reference it are kept; they report the ingredient
    /// as unavailable from then on.
    pub async fn delete_ingredient(&self, id: Uuid) -> ServiceResult<()> {
        self.db
            .ingredients()
            .delete(id)
            .await
            .map_err(|e| not_found_as(e, CoreError::IngredientNotFound(id.to_string())))?;
        info!(ingredient_id = %id, "Ingredient deleted");
        Ok(())
    }

    /// Deletes a recipe and its lines.
    pub async fn delete_recipe(&self, id: Uuid) -> ServiceResult<()> {
        self.db
            .recipes()
            .delete(id)
            .await
            .map_err(|e| not_found_as(e, CoreError::RecipeNotFound(id.to_string())))?;
        info!(recipe_id = %id, "Recipe deleted");
        Ok(())
    }
}

fn not_found_as(err: DbError, domain: CoreError) -> ServiceError {
    if err.is_not_found() {
        domain.into()
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CreateIngredientRequest, CreateRecipeRequest, RecipeLineRequest};
    use crate::InventoryService;
    use pantry_db::DbConfig;

    async fn seeded() -> (InventoryQueryService, Ingredient, Ingredient, Recipe) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let commands = InventoryService::new(db.clone());

        let mut created = Vec::new();
        for (name, quantity, unit, category, minimum) in [
            ("Basil", 30.0, "g", "produce", 50.0),
            ("Tomatoes", 40.0, "whole", "produce", 10.0),
        ] {
            created.push(
                commands
                    .create_ingredient(CreateIngredientRequest {
                        name: name.to_string(),
                        quantity,
                        unit_of_measure: unit.to_string(),
                        category: category.to_string(),
                        minimum_stock: minimum,
                    })
                    .await
                    .unwrap(),
            );
        }
        let tomatoes = created.pop().unwrap();
        let basil = created.pop().unwrap();

        let recipe = commands
            .create_recipe(CreateRecipeRequest {
                name: "Tomato Salad".to_string(),
                ingredients: vec![
                    RecipeLineRequest::new(tomatoes.id, 3.0, None),
                    RecipeLineRequest::new(basil.id, 5.0, None),
                ],
                preparation_time: 10,
                instructions: "Slice and season.".to_string(),
            })
            .await
            .unwrap();

        (InventoryQueryService::new(db), basil, tomatoes, recipe)
    }

    #[tokio::test]
    async fn test_ingredient_queries() {
        let (queries, basil, tomatoes, _) = seeded().await;

        assert_eq!(queries.get_ingredient_by_id(basil.id).await.unwrap().name, "Basil");
        assert!(queries
            .get_ingredient_by_id(Uuid::new_v4())
            .await
            .unwrap_err()
            .is_not_found());

        let produce = queries.get_ingredients_by_category("produce").await.unwrap();
        assert_eq!(produce.len(), 2);

        let low = queries.get_ingredients_below_minimum_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, basil.id);

        let page = queries.get_all_ingredients(1, Some(10)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, tomatoes.id);

        let found = queries.search_ingredients("  TOMA ", None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, tomatoes.id);

        assert!(queries.search_ingredients(&"x".repeat(101), None).await.is_err());
    }

    #[tokio::test]
    async fn test_recipe_queries() {
        let (queries, basil, _, recipe) = seeded().await;

        assert_eq!(queries.get_recipe_by_id(recipe.id).await.unwrap().name, "Tomato Salad");
        assert_eq!(queries.get_all_recipes(0, None).await.unwrap().len(), 1);
        assert_eq!(queries.search_recipes("salad", Some(5)).await.unwrap().len(), 1);

        let using_basil = queries.get_recipes_by_ingredient(basil.id).await.unwrap();
        assert_eq!(using_basil.len(), 1);
        assert_eq!(using_basil[0].id, recipe.id);

        assert!(queries
            .get_recipes_by_ingredient(Uuid::new_v4())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_deletes() {
        let (queries, basil, _, recipe) = seeded().await;

        queries.delete_ingredient(basil.id).await.unwrap();
        let err = queries.delete_ingredient(basil.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::IngredientNotFound(_))));

        queries.delete_recipe(recipe.id).await.unwrap();
        let err = queries.delete_recipe(recipe.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::RecipeNotFound(_))));
        assert!(queries.get_all_recipes(0, None).await.unwrap().is_empty());
    }
}
