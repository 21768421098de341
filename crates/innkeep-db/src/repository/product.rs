//! # Product Repository
//!
//! Minibar catalog and stock levels.
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read, compute, write back                                   │
//! │     SELECT stock ... → 5                                               │
//! │     UPDATE products SET stock = 2 WHERE id = ?                         │
//! │     (two desks both read 5, both write 2, one sale is lost)            │
//! │                                                                         │
//! │  ✅ CORRECT: delta update, guarded in the same statement               │
//! │     UPDATE products SET stock = stock - 3                              │
//! │     WHERE id = ? AND stock >= 3                                        │
//! │                                                                         │
//! │  The consumption ledger uses the guarded form; restock() uses the      │
//! │  delta form with CHECK (stock >= 0) as the floor.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use innkeep_core::validation::{validate_optional, validate_price, validate_required};
use innkeep_core::{Product, ValidationError};

/// Input for adding a product to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub stock: i64,
    #[serde(default)]
    pub photo: Option<String>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Adds a product to the catalog, active.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already exists
    pub async fn insert(&self, input: &NewProduct) -> DbResult<Product> {
        validate_required("name", &input.name, 120)?;
        validate_price("price", input.price)?;
        validate_optional("photo", input.photo.as_deref(), 255)?;
        if input.stock < 0 {
            return Err(ValidationError::OutOfRange {
                field: "stock".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        debug!(name = %input.name, "Inserting product");

        let now = Utc::now();
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (id, name, price, stock, is_active, photo, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(input.name.trim())
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.photo)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists products available for consumption, sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Adds (or with a negative delta, removes) units. Returns the new stock.
    ///
    /// A delta that would take stock below zero fails the CHECK constraint.
    pub async fn restock(&self, id: &str, delta: i64) -> DbResult<i64> {
        debug!(id = %id, delta = %delta, "Updating stock");

        let stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = ?3
            WHERE id = ?1
            RETURNING stock
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        let stock = stock.ok_or_else(|| DbError::not_found("Product", id))?;
        info!(id = %id, stock = stock, "Stock updated");
        Ok(stock)
    }

    /// Activates or retires a product. Retired products keep their history
    /// but can no longer be consumed.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        debug!(id = %id, active = active, "Setting product availability");

        let result = sqlx::query("UPDATE products SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{db, product};

    #[tokio::test]
    async fn test_insert_and_list() {
        let db = db().await;
        product(&db, "Vino tinto", 45_000, 4).await;
        let water = product(&db, "Agua 600ml", 3_500, 10).await;

        assert!(water.is_active);
        let listed = db.products().list_active(10).await.unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Agua 600ml", "Vino tinto"]);

        db.products().set_active(&water.id, false).await.unwrap();
        assert_eq!(db.products().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_name() {
        let db = db().await;
        product(&db, "Agua 600ml", 3_500, 10).await;

        let err = db
            .products()
            .insert(&NewProduct {
                name: "Agua 600ml".to_string(),
                price: 4_000,
                stock: 1,
                photo: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_restock_floor() {
        let db = db().await;
        let water = product(&db, "Agua 600ml", 3_500, 2).await;

        assert_eq!(db.products().restock(&water.id, 5).await.unwrap(), 7);
        let err = db.products().restock(&water.id, -8).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));

        let stored = db.products().get_by_id(&water.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 7);

        let err = db.products().restock("missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
