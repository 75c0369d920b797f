//! # Car Repository
//!
//! Cars (brand/year records) and their guarded deletion.
//!
//! ## Deleting a Car
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    lock car row ............................ missing → NotFound         │
//! │    any active rental on any of its models? . yes → Conflict (rollback) │
//! │    DELETE car  (cascades to models and their historic rentals)         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{generate_id, lock_row};
use crate::error::{DbError, DbResult};
use carhire_core::types::CarDraft;
use carhire_core::{Car, CoreError};

/// Repository for car database operations.
#[derive(Debug, Clone)]
pub struct CarRepository {
    pool: SqlitePool,
}

impl CarRepository {
    /// Creates a new CarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarRepository { pool }
    }

    /// Gets a car by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Car>> {
        let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(car)
    }

    /// Whether a car with this ID exists.
    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cars WHERE id = ?1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Lists every car, by brand then year.
    pub async fn list_all(&self) -> DbResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>("SELECT * FROM cars ORDER BY brand, year")
            .fetch_all(&self.pool)
            .await?;

        Ok(cars)
    }

    /// Distinct brands, alphabetically.
    pub async fn brands(&self) -> DbResult<Vec<String>> {
        let brands: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT brand FROM cars ORDER BY brand")
                .fetch_all(&self.pool)
                .await?;

        Ok(brands)
    }

    /// Inserts a new car from a validated draft.
    pub async fn insert(&self, draft: &CarDraft) -> DbResult<Car> {
        let now = Utc::now();
        let car = Car {
            id: generate_id(),
            brand: draft.brand.clone(),
            year: draft.year,
            description: draft.description.clone(),
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %car.id, brand = %car.brand, year = car.year, "Inserting car");

        sqlx::query(
            r#"
            INSERT INTO cars (id, brand, year, description, is_available, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&car.id)
        .bind(&car.brand)
        .bind(car.year)
        .bind(&car.description)
        .bind(car.is_available)
        .bind(car.created_at)
        .bind(car.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(car)
    }

    /// Updates an existing car's fields.
    ///
    /// ## Returns
    /// * `Ok(Car)` - The updated car
    /// * `Err(DbError::NotFound)` - Car doesn't exist
    pub async fn update(&self, id: &str, draft: &CarDraft) -> DbResult<Car> {
        debug!(id = %id, "Updating car");

        let result = sqlx::query(
            r#"
            UPDATE cars SET
                brand = ?2,
                year = ?3,
                description = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.brand)
        .bind(draft.year)
        .bind(&draft.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Car", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Car", id))
    }

    /// Deletes a car and its models unless any model is currently rented.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        lock_row(&mut tx, "cars", "Car", id).await?;

        let active: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM rentals r
            JOIN car_models m ON m.id = r.car_model_id
            WHERE m.car_id = ?1 AND r.status = 'active'
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if active > 0 {
            debug!(id = %id, active, "Refusing to delete rented car");
            return Err(CoreError::conflict(
                "Cannot delete a car whose models have active rentals.",
            )
            .into());
        }

        sqlx::query("DELETE FROM cars WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, "Car deleted");
        Ok(())
    }

    /// Counts all cars.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
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
    use crate::repository::test_support::{car, memory_db, model, user};
    use carhire_core::{DateRange, RentalStatus};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_insert_update_list() {
        let db = memory_db().await;
        let toyota = car(&db, "Toyota").await;
        car(&db, "Honda").await;

        let updated = db
            .cars()
            .update(
                &toyota.id,
                &CarDraft {
                    brand: "Toyota".to_string(),
                    year: 2023,
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.year, 2023);
        assert_eq!(updated.description, None);

        let all = db.cars().list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].brand, "Honda");
        assert_eq!(db.cars().brands().await.unwrap(), vec!["Honda", "Toyota"]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = memory_db().await;
        let draft = CarDraft {
            brand: "Ghost".to_string(),
            year: 2000,
            description: None,
        };
        let err = db.cars().update("missing", &draft).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_cascades_models() {
        let db = memory_db().await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;

        db.cars().delete(&toyota.id).await.unwrap();

        assert!(db.cars().get_by_id(&toyota.id).await.unwrap().is_none());
        assert!(db.car_models().get_by_id(&corolla.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_blocked_by_active_rental() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;

        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let rental = db
            .rentals()
            .create_active(&alice.id, &corolla.id, DateRange::new(d, d).unwrap())
            .await
            .unwrap();

        let err = db.cars().delete(&toyota.id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Conflict(_))));
        assert!(db.cars().get_by_id(&toyota.id).await.unwrap().is_some());
        assert!(db.car_models().get_by_id(&corolla.id).await.unwrap().is_some());

        let rental = db.rentals().get_by_id(&rental.id).await.unwrap().unwrap();
        assert_eq!(rental.status, RentalStatus::Active);
        assert_eq!(db.rentals().count_active().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let db = memory_db().await;
        let err = db.cars().delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
