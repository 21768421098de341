//! # Consumption Repository
//!
//! Minibar purchases charged to a reservation.
//!
//! ## Recording a Consumption
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record() - one transaction                           │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  UPDATE products SET stock = stock - qty                               │
//! │  WHERE id = ? AND is_active = 1 AND stock >= qty                       │
//! │  RETURNING name, price, stock                                          │
//! │    │                                                                    │
//! │    ├── no row ──► look at the product: missing / inactive / short     │
//! │    │              → ROLLBACK                                            │
//! │    ▼                                                                    │
//! │  reservation exists? ── no ──► ROLLBACK (stock restored)              │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  INSERT consumption (name + price snapshot, settled = settle_now)      │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  settle_now? ── yes ──► INSERT receipt (price × qty)                   │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The check and the decrement are the same statement, so two desks selling
//! the last units cannot both succeed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use innkeep_core::validation::validate_quantity;
use innkeep_core::{Consumption, CoreError, Receipt};

/// Input for recording a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConsumption {
    pub product_id: String,
    pub reservation_id: String,
    pub quantity: i64,
    /// Pay on the spot: the item gets a receipt and stays off the invoice.
    #[serde(default)]
    pub settle_now: bool,
}

/// Result of a recorded purchase.
#[derive(Debug, Clone, Serialize)]
pub struct ConsumptionRecorded {
    pub consumption: Consumption,
    /// Stock left after the decrement.
    pub stock_left: i64,
    pub receipt: Option<Receipt>,
}

#[derive(Debug, FromRow)]
struct Decremented {
    name: String,
    price: i64,
    stock: i64,
}

#[derive(Debug, FromRow)]
struct StockState {
    name: String,
    stock: i64,
    is_active: bool,
}

/// Repository for the consumption ledger.
#[derive(Debug, Clone)]
pub struct ConsumptionRepository {
    pool: SqlitePool,
}

impl ConsumptionRepository {
    /// Creates a new ConsumptionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ConsumptionRepository { pool }
    }

    /// Records a purchase, decrementing stock atomically.
    ///
    /// ## Errors
    /// - `Validation` - quantity not in 1..=999
    /// - `NotFound` - unknown product or reservation
    /// - `ProductInactive`, `InsufficientStock`
    pub async fn record(&self, input: &NewConsumption) -> DbResult<ConsumptionRecorded> {
        validate_quantity(input.quantity)?;

        debug!(
            product_id = %input.product_id,
            reservation_id = %input.reservation_id,
            quantity = input.quantity,
            settle_now = input.settle_now,
            "Recording consumption"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let decremented = sqlx::query_as::<_, Decremented>(
            r#"
            UPDATE products
            SET stock = stock - ?1, updated_at = ?3
            WHERE id = ?2 AND is_active = 1 AND stock >= ?1
            RETURNING name, price, stock
            "#,
        )
        .bind(input.quantity)
        .bind(&input.product_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let decremented = match decremented {
            Some(row) => row,
            None => return Err(explain_rejection(&mut *tx, input).await),
        };

        let reservation_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reservations WHERE id = ?1)")
                .bind(&input.reservation_id)
                .fetch_one(&mut *tx)
                .await?;
        if !reservation_exists {
            return Err(DbError::not_found("Reservation", &input.reservation_id));
        }

        let consumption = sqlx::query_as::<_, Consumption>(
            r#"
            INSERT INTO consumptions (
                id, reservation_id, product_id, product_name,
                quantity, unit_price, settled, consumed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&input.reservation_id)
        .bind(&input.product_id)
        .bind(&decremented.name)
        .bind(input.quantity)
        .bind(decremented.price)
        .bind(input.settle_now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let receipt = if input.settle_now {
            let receipt = sqlx::query_as::<_, Receipt>(
                r#"
                INSERT INTO receipts (id, consumption_id, reservation_id, amount, issued_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&consumption.id)
            .bind(&consumption.reservation_id)
            .bind(consumption.line_total()?.amount())
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
            Some(receipt)
        } else {
            None
        };

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %consumption.id,
            product = %consumption.product_name,
            quantity = consumption.quantity,
            stock_left = decremented.stock,
            settled = consumption.settled,
            "Consumption recorded"
        );

        Ok(ConsumptionRecorded {
            consumption,
            stock_left: decremented.stock,
            receipt,
        })
    }

    /// Lists every consumption of a reservation, oldest first.
    pub async fn list_for_reservation(&self, reservation_id: &str) -> DbResult<Vec<Consumption>> {
        let items = sqlx::query_as::<_, Consumption>(
            "SELECT * FROM consumptions WHERE reservation_id = ?1 ORDER BY consumed_at",
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Gets the receipt issued for a consumption, if it was settled on the spot.
    pub async fn receipt_for(&self, consumption_id: &str) -> DbResult<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>("SELECT * FROM receipts WHERE consumption_id = ?1")
            .bind(consumption_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(receipt)
    }
}

/// Works out why the guarded decrement matched no row.
async fn explain_rejection(conn: &mut SqliteConnection, input: &NewConsumption) -> DbError {
    let state = sqlx::query_as::<_, StockState>("SELECT name, stock, is_active FROM products WHERE id = ?1")
        .bind(&input.product_id)
        .fetch_optional(&mut *conn)
        .await;

    match state {
        Ok(None) => DbError::not_found("Product", &input.product_id),
        Ok(Some(product)) if !product.is_active => CoreError::ProductInactive(product.name).into(),
        Ok(Some(product)) => CoreError::InsufficientStock {
            product: product.name,
            available: product.stock,
            requested: input.quantity,
        }
        .into(),
        Err(e) => e.into(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::fixtures::{at, db, file_db, product, reservation};
    use innkeep_core::ValidationError;

    fn purchase(product_id: &str, reservation_id: &str, quantity: i64) -> NewConsumption {
        NewConsumption {
            product_id: product_id.to_string(),
            reservation_id: reservation_id.to_string(),
            quantity,
            settle_now: false,
        }
    }

    #[tokio::test]
    async fn test_record_snapshots_price() {
        let db = db().await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;
        let water = product(&db, "Agua 600ml", 3_500, 10).await;

        let recorded = db
            .consumptions()
            .record(&purchase(&water.id, &res.id, 2))
            .await
            .unwrap();
        assert_eq!(recorded.stock_left, 8);
        assert_eq!(recorded.consumption.unit_price, 3_500);
        assert_eq!(recorded.consumption.product_name, "Agua 600ml");
        assert!(!recorded.consumption.settled);
        assert!(recorded.receipt.is_none());

        sqlx::query("UPDATE products SET price = 5000 WHERE id = ?1")
            .bind(&water.id)
            .execute(db.pool())
            .await
            .unwrap();

        let listed = db.consumptions().list_for_reservation(&res.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].unit_price, 3_500);
    }

    #[tokio::test]
    async fn test_settle_now_issues_receipt() {
        let db = db().await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;
        let wine = product(&db, "Vino tinto", 45_000, 3).await;

        let recorded = db
            .consumptions()
            .record(&NewConsumption {
                settle_now: true,
                ..purchase(&wine.id, &res.id, 2)
            })
            .await
            .unwrap();

        assert!(recorded.consumption.settled);
        let receipt = recorded.receipt.unwrap();
        assert_eq!(receipt.amount, 90_000);
        assert_eq!(receipt.consumption_id, recorded.consumption.id);

        let stored = db
            .consumptions()
            .receipt_for(&recorded.consumption.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, receipt.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_purchases_never_oversell() {
        let (db, _dir) = file_db().await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;
        let water = product(&db, "Agua 600ml", 3_500, 5).await;

        // two desks, separate connections, same last units
        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let ledger = db.consumptions();
                let input = purchase(&water.id, &res.id, 3);
                tokio::spawn(async move { ledger.record(&input).await })
            })
            .collect();

        let mut outcomes = Vec::new();
        for task in tasks {
            outcomes.push(task.await.unwrap());
        }

        let ok = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 1);

        let rejected = outcomes.into_iter().find_map(|r| r.err()).unwrap();
        assert!(matches!(
            rejected,
            DbError::Rule(CoreError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            })
        ));

        let stored = db.products().get_by_id(&water.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 2);
    }

    #[tokio::test]
    async fn test_settle_now_overflow_rolls_back() {
        let db = db().await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;
        let caviar = product(&db, "Caviar", i64::MAX / 2, 5).await;

        let err = db
            .consumptions()
            .record(&NewConsumption {
                settle_now: true,
                ..purchase(&caviar.id, &res.id, 3)
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::AmountOverflow(_))));

        let stored = db.products().get_by_id(&caviar.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 5);
        assert!(db.consumptions().list_for_reservation(&res.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejections() {
        let db = db().await;
        let res = reservation(&db, at(2024, 1, 1, 14), at(2024, 1, 3, 12), None, None).await;
        let water = product(&db, "Agua 600ml", 3_500, 5).await;

        let err = db.consumptions().record(&purchase(&water.id, &res.id, 0)).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        let err = db.consumptions().record(&purchase("missing", &res.id, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        db.products().set_active(&water.id, false).await.unwrap();
        let err = db.consumptions().record(&purchase(&water.id, &res.id, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::Rule(CoreError::ProductInactive(_))));
    }

    #[tokio::test]
    async fn test_unknown_reservation_restores_stock() {
        let db = db().await;
        let water = product(&db, "Agua 600ml", 3_500, 5).await;

        let err = db
            .consumptions()
            .record(&purchase(&water.id, "missing", 2))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let stored = db.products().get_by_id(&water.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 5);
    }
}
