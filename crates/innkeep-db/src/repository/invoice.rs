//! # Invoice Repository
//!
//! Invoice generation, payment, voiding, and display.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  generate() ──► Pending ──mark_paid()──► Paid   (gates check-out,      │
//! │                    │                             delete-protected)      │
//! │                    └──void()──► Voided ──mark_paid()──► Paid            │
//! │                                                                         │
//! │  One invoice per reservation, ever: a voided invoice still blocks      │
//! │  generate(). Totals are written once and never recomputed.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    assigned_rates, fetch_reservation, invoice_for_reservation, touch_reservation,
    unsettled_consumptions,
};
use crate::error::{DbError, DbResult};
use innkeep_core::billing::{self, InvoiceTotals, InvoiceView};
use innkeep_core::lifecycle;
use innkeep_core::{CoreError, Invoice, InvoiceStatus};

/// Repository for invoices.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Issues the reservation's invoice with frozen totals.
    ///
    /// ## What This Does
    /// 1. Locks the reservation row
    /// 2. Rejects if an invoice exists, no room is assigned, or no primary
    ///    guest is set
    /// 3. Sums nightly rates × nights plus unsettled consumptions, adds 19% tax
    /// 4. Inserts the invoice as Pending
    ///
    /// `issued_at` is the caller's clock.
    pub async fn generate(&self, reservation_id: &str, issued_at: DateTime<Utc>) -> DbResult<Invoice> {
        debug!(reservation_id = %reservation_id, "Generating invoice");

        let mut tx = self.pool.begin().await?;

        touch_reservation(&mut *tx, reservation_id, issued_at).await?;
        let reservation = fetch_reservation(&mut *tx, reservation_id).await?;
        let existing = invoice_for_reservation(&mut *tx, reservation_id).await?;
        let rooms = assigned_rates(&mut *tx, reservation_id).await?;

        let guest_id = billing::ensure_can_invoice(&reservation, existing.as_ref(), rooms.len())?;
        let billed_to = billed_name(&mut *tx, &reservation.id, guest_id).await?;

        let consumptions = unsettled_consumptions(&mut *tx, reservation_id).await?;
        let totals = InvoiceTotals::compute(&reservation.period(), &rooms, &consumptions)?;

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            INSERT INTO invoices (
                id, reservation_id, guest_id, billed_to, issued_at, nights,
                lodging_subtotal, consumption_subtotal, tax, total, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(reservation_id)
        .bind(guest_id)
        .bind(&billed_to)
        .bind(issued_at)
        .bind(totals.nights)
        .bind(totals.lodging_subtotal.amount())
        .bind(totals.consumption_subtotal.amount())
        .bind(totals.tax.amount())
        .bind(totals.total.amount())
        .bind(InvoiceStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %invoice.id,
            reservation_id = %reservation_id,
            nights = totals.nights,
            total = %totals.total,
            "Invoice generated"
        );
        Ok(invoice)
    }

    /// Gets an invoice by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(invoice)
    }

    /// Gets the invoice of a reservation, if one was issued.
    pub async fn for_reservation(&self, reservation_id: &str) -> DbResult<Option<Invoice>> {
        let mut conn = self.pool.acquire().await?;
        invoice_for_reservation(&mut conn, reservation_id).await
    }

    /// Records payment. Fails if the invoice is already paid.
    pub async fn mark_paid(&self, id: &str) -> DbResult<InvoiceStatus> {
        self.transition(id, lifecycle::mark_paid).await
    }

    /// Voids a pending invoice.
    pub async fn void(&self, id: &str) -> DbResult<InvoiceStatus> {
        self.transition(id, lifecycle::void).await
    }

    async fn transition(
        &self,
        id: &str,
        rule: fn(&Invoice) -> Result<InvoiceStatus, CoreError>,
    ) -> DbResult<InvoiceStatus> {
        let mut tx = self.pool.begin().await?;

        // no-op write takes the lock before the status is read
        let touched = sqlx::query("UPDATE invoices SET status = status WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        let status = rule(&invoice)?;

        sqlx::query("UPDATE invoices SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, from = %invoice.status, to = %status, "Invoice status changed");
        Ok(status)
    }

    /// Builds the display model: live line items next to frozen totals.
    ///
    /// Room lines use today's prices, so after a price change their sum can
    /// differ from `invoice.lodging_subtotal`. The frozen total is the one
    /// that was billed.
    pub async fn view(&self, id: &str) -> DbResult<InvoiceView> {
        let mut conn = self.pool.acquire().await?;

        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))?;

        let (rooms, consumptions) = match invoice.reservation_id.as_deref() {
            Some(reservation_id) => (
                assigned_rates(&mut conn, reservation_id).await?,
                unsettled_consumptions(&mut conn, reservation_id).await?,
            ),
            None => (Vec::new(), Vec::new()),
        };

        Ok(InvoiceView::build(invoice, &rooms, &consumptions)?)
    }
}

async fn billed_name(conn: &mut SqliteConnection, reservation_id: &str, guest_id: &str) -> DbResult<String> {
    let name: Option<String> =
        sqlx::query_scalar("SELECT first_name || ' ' || last_name FROM guests WHERE id = ?1")
            .bind(guest_id)
            .fetch_optional(&mut *conn)
            .await?;

    name.ok_or_else(|| CoreError::NoPrimaryGuest(reservation_id.to_string()).into())
}

// =============================================================================
// Unit Tests
// =============================================================================
