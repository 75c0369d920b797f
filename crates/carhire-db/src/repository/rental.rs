//! # Rental Repository
//!
//! Booking, cancellation and completion as single transactions, plus the
//! rental listings.
//!
//! ## Rental Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rental Lifecycle                                  │
//! │                                                                         │
//! │  1. BOOK                                                               │
//! │     └── create_active() → Rental { status: Active }                    │
//! │         (model.is_available = false, same transaction)                 │
//! │                                                                         │
//! │  2a. CANCEL (owner)                                                    │
//! │     └── cancel() → Rental { status: Cancelled }                        │
//! │                                                                         │
//! │  2b. COMPLETE (hook; nothing calls it on a schedule)                   │
//! │     └── complete() → Rental { status: Completed }                      │
//! │                                                                         │
//! │  2a/2b set model.is_available = true in the same transaction.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Double-Booking Guard
//! ```text
//! BEGIN
//!   UPDATE car_models (no-op)      ← takes the write lock; others wait
//!   SELECT active rentals of model
//!   find_conflict(range, rentals)  ← Conflict → rollback
//!   INSERT rental (active)
//!   UPDATE car_models is_available = 0
//! COMMIT
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::{generate_id, lock_row, release_model};
use crate::error::{DbError, DbResult};
use carhire_core::authz::{require_owner, Principal};
use carhire_core::booking::{self, DateRange};
use carhire_core::{CarModel, Rental, RentalListing, RentalStatus};

const LISTING_SELECT: &str = r#"
    SELECT r.*, m.name AS model_name, c.brand AS brand, u.username AS username
    FROM rentals r
    JOIN car_models m ON m.id = r.car_model_id
    JOIN cars c ON c.id = m.car_id
    JOIN users u ON u.id = r.user_id
"#;

/// Repository for rental database operations.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

impl RentalRepository {
    /// Creates a new RentalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    /// Gets a rental by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    /// A user's rentals, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DbResult<Vec<RentalListing>> {
        let sql = format!(
            "{LISTING_SELECT} WHERE r.user_id = ?1 ORDER BY r.created_at DESC, r.rowid DESC"
        );
        let rentals = sqlx::query_as::<_, RentalListing>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rentals)
    }

    /// All active rentals, by start date.
    pub async fn list_active(&self) -> DbResult<Vec<RentalListing>> {
        let sql = format!("{LISTING_SELECT} WHERE r.status = 'active' ORDER BY r.start_date");
        let rentals = sqlx::query_as::<_, RentalListing>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rentals)
    }

    /// Counts active rentals.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals WHERE status = 'active'")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Books `car_model_id` for `range` on behalf of `user_id`.
    ///
    /// The price is read from the locked model row, so the frozen total uses
    /// the price in force at commit time.
    ///
    /// ## Returns
    /// * `Ok(Rental)` - Active rental with its frozen total
    /// * `Err(DbError::NotFound)` - Model doesn't exist
    /// * `Err(DbError::Core(Conflict))` - Range overlaps an active rental
    pub async fn create_active(
        &self,
        user_id: &str,
        car_model_id: &str,
        range: DateRange,
    ) -> DbResult<Rental> {
        debug!(
            user_id = %user_id,
            car_model_id = %car_model_id,
            start = %range.start(),
            end = %range.end(),
            "Booking car model"
        );

        let mut tx = self.pool.begin().await?;

        lock_row(&mut tx, "car_models", "CarModel", car_model_id).await?;

        let model = sqlx::query_as::<_, CarModel>("SELECT * FROM car_models WHERE id = ?1")
            .bind(car_model_id)
            .fetch_one(&mut *tx)
            .await?;
        let quote = booking::quote(range, model.price_per_day())?;

        let existing = active_for_model(&mut tx, car_model_id).await?;
        if let Some(conflict) = booking::find_conflict(&range, &existing) {
            debug!(
                car_model_id = %car_model_id,
                conflicting = %conflict.id,
                "Booking rejected: overlapping active rental"
            );
            return Err(booking::overlap_conflict().into());
        }

        let now = Utc::now();
        let rental = Rental {
            id: generate_id(),
            user_id: user_id.to_string(),
            car_model_id: car_model_id.to_string(),
            start_date: range.start(),
            end_date: range.end(),
            total_price_cents: quote.total.cents(),
            status: RentalStatus::Active,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO rentals (
                id, user_id, car_model_id, start_date, end_date,
                total_price_cents, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&rental.id)
        .bind(&rental.user_id)
        .bind(&rental.car_model_id)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(rental.total_price_cents)
        .bind(rental.status)
        .bind(rental.created_at)
        .bind(rental.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE car_models SET is_available = 0, updated_at = ?2 WHERE id = ?1")
            .bind(car_model_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %rental.id,
            car_model_id = %car_model_id,
            days = quote.days,
            total = %quote.total,
            "Rental created"
        );
        Ok(rental)
    }

    /// Cancels a pending or active rental owned by `principal`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Rental doesn't exist
    /// * `Err(DbError::Core(Forbidden))` - Someone else's rental
    /// * `Err(DbError::Core(InvalidState))` - Already cancelled or completed
    pub async fn cancel(&self, rental_id: &str, principal: &Principal) -> DbResult<Rental> {
        debug!(id = %rental_id, user_id = %principal.user_id, "Cancelling rental");

        let mut tx = self.pool.begin().await?;

        lock_row(&mut tx, "rentals", "Rental", rental_id).await?;
        let rental = fetch(&mut tx, rental_id).await?;

        require_owner(principal, &rental.user_id)?;
        booking::ensure_cancellable(&rental)?;

        let updated = transition(
            &mut tx,
            &rental,
            RentalStatus::Cancelled,
            "status IN ('pending', 'active')",
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %rental_id, car_model_id = %rental.car_model_id, "Rental cancelled");
        Ok(updated)
    }

    /// Marks an active rental completed and frees its model.
    ///
    /// Authorization is the caller's concern.
    pub async fn complete(&self, rental_id: &str) -> DbResult<Rental> {
        debug!(id = %rental_id, "Completing rental");

        let mut tx = self.pool.begin().await?;

        lock_row(&mut tx, "rentals", "Rental", rental_id).await?;
        let rental = fetch(&mut tx, rental_id).await?;

        booking::ensure_completable(&rental)?;

        let updated = transition(&mut tx, &rental, RentalStatus::Completed, "status = 'active'").await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %rental_id, "Rental completed");
        Ok(updated)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

async fn fetch(conn: &mut SqliteConnection, id: &str) -> DbResult<Rental> {
    sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = ?1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Rental", id))
}

async fn active_for_model(conn: &mut SqliteConnection, car_model_id: &str) -> DbResult<Vec<Rental>> {
    let rentals = sqlx::query_as::<_, Rental>(
        "SELECT * FROM rentals WHERE car_model_id = ?1 AND status = 'active'",
    )
    .bind(car_model_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rentals)
}

/// Moves `rental` to `to` when its stored status still satisfies `guard`,
/// then releases the model.
async fn transition(
    conn: &mut SqliteConnection,
    rental: &Rental,
    to: RentalStatus,
    guard: &'static str,
) -> DbResult<Rental> {
    let now = Utc::now();
    let sql = format!("UPDATE rentals SET status = ?2, updated_at = ?3 WHERE id = ?1 AND {guard}");
    let result = sqlx::query(&sql)
        .bind(&rental.id)
        .bind(to)
        .bind(now)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::TransactionFailed(format!(
            "rental {} changed status concurrently",
            rental.id
        )));
    }

    release_model(conn, &rental.car_model_id).await?;

    Ok(Rental {
        status: to,
        updated_at: now,
        ..rental.clone()
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{car, memory_db, model, user};
    use crate::{Database, DbConfig};
    use carhire_core::{CoreError, Role};
    use chrono::NaiveDate;

    fn range(s: u32, e: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 6, s).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, e).unwrap(),
        )
        .unwrap()
    }

    fn principal(user: &carhire_core::User) -> Principal {
        Principal::from(user)
    }

    #[tokio::test]
    async fn test_book_prices_and_marks_unavailable() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;

        let rental = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(1, 3))
            .await
            .unwrap();

        assert_eq!(rental.status, RentalStatus::Active);
        assert_eq!(rental.total_price_cents, 15000);

        let stored = db.rentals().get_by_id(&rental.id).await.unwrap().unwrap();
        assert_eq!(stored.start_date, range(1, 3).start());
        assert_eq!(stored.total_price_cents, 15000);

        let m = db.car_models().get_by_id(&corolla.id).await.unwrap().unwrap();
        assert!(!m.is_available);
    }

    #[tokio::test]
    async fn test_overlap_rejected_adjacent_allowed() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;

        db.rentals()
            .create_active(&alice.id, &corolla.id, range(1, 3))
            .await
            .unwrap();

        // Inclusive ends: sharing 3 June conflicts.
        let err = db
            .rentals()
            .create_active(&bob.id, &corolla.id, range(3, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Conflict(_))));

        db.rentals()
            .create_active(&bob.id, &corolla.id, range(4, 6))
            .await
            .unwrap();
        assert_eq!(db.rentals().count_active().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_book_missing_model_is_not_found() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let err = db
            .rentals()
            .create_active(&alice.id, "missing", range(1, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cancel_frees_model_and_is_not_repeatable() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;
        let rental = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(1, 3))
            .await
            .unwrap();

        let cancelled = db.rentals().cancel(&rental.id, &principal(&alice)).await.unwrap();
        assert_eq!(cancelled.status, RentalStatus::Cancelled);
        assert!(db.car_models().get_by_id(&corolla.id).await.unwrap().unwrap().is_available);

        let err = db.rentals().cancel(&rental.id, &principal(&alice)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidState { .. })));

        // Cancelled rentals no longer block the dates.
        db.rentals()
            .create_active(&alice.id, &corolla.id, range(2, 2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_repeat_cancel_leaves_availability_alone() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;
        let first = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(1, 3))
            .await
            .unwrap();
        db.rentals().cancel(&first.id, &principal(&alice)).await.unwrap();

        let second = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(10, 12))
            .await
            .unwrap();
        assert!(!db.car_models().get_by_id(&corolla.id).await.unwrap().unwrap().is_available);

        let err = db.rentals().cancel(&first.id, &principal(&alice)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidState { .. })));
        assert!(!db.car_models().get_by_id(&corolla.id).await.unwrap().unwrap().is_available);

        let second = db.rentals().get_by_id(&second.id).await.unwrap().unwrap();
        assert_eq!(second.status, RentalStatus::Active);
    }

    #[tokio::test]
    async fn test_cancel_by_other_user_is_forbidden() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;
        let rental = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(1, 3))
            .await
            .unwrap();

        let err = db.rentals().cancel(&rental.id, &principal(&bob)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Forbidden(_))));

        let stored = db.rentals().get_by_id(&rental.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RentalStatus::Active);
        assert!(!db.car_models().get_by_id(&corolla.id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn test_cancel_always_frees_model() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;
        let first = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(1, 3))
            .await
            .unwrap();
        db.rentals()
            .create_active(&alice.id, &corolla.id, range(10, 12))
            .await
            .unwrap();

        db.rentals().cancel(&first.id, &principal(&alice)).await.unwrap();
        assert!(db.car_models().get_by_id(&corolla.id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn test_complete_hook() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;
        let rental = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(1, 3))
            .await
            .unwrap();

        let done = db.rentals().complete(&rental.id).await.unwrap();
        assert_eq!(done.status, RentalStatus::Completed);
        assert!(db.car_models().get_by_id(&corolla.id).await.unwrap().unwrap().is_available);

        assert!(db.rentals().complete(&rental.id).await.is_err());
        let err = db.rentals().cancel(&rental.id, &principal(&alice)).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidState { .. })));
    }

    #[tokio::test]
    async fn test_listings() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let bob = user(&db, "bob").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;

        let first = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(1, 2))
            .await
            .unwrap();
        let second = db
            .rentals()
            .create_active(&alice.id, &corolla.id, range(5, 6))
            .await
            .unwrap();
        db.rentals()
            .create_active(&bob.id, &corolla.id, range(9, 9))
            .await
            .unwrap();
        db.rentals().cancel(&first.id, &principal(&alice)).await.unwrap();

        let mine = db.rentals().list_for_user(&alice.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].rental.id, second.id);
        assert_eq!(mine[0].model_name, "Corolla");
        assert_eq!(mine[0].brand, "Toyota");
        assert_eq!(mine[0].username, "alice");

        let active = db.rentals().list_active().await.unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(db.rentals().count_active().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_bookings_admit_exactly_one() {
        let path = std::env::temp_dir().join(format!("carhire-test-{}.db", generate_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(8))
            .await
            .unwrap();

        let owner = db
            .users()
            .insert("racer", "racer@example.com", "hash", Role::Customer)
            .await
            .unwrap();
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let db = db.clone();
            let user_id = owner.id.clone();
            let model_id = corolla.id.clone();
            handles.push(tokio::spawn(async move {
                db.rentals().create_active(&user_id, &model_id, range(1, 3)).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DbError::Core(CoreError::Conflict(_))) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(db.rentals().count_active().await.unwrap(), 1);

        db.close().await;
        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(path.with_extension("db-wal"));
        let _ = std::fs::remove_file(path.with_extension("db-shm"));
    }
}
