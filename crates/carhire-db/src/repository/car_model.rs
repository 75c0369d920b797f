//! # Car Model Repository
//!
//! Rentable models, the listings the browse pages show, and search.
//!
//! ## Listings
//! A listing row is the model joined with its car's brand and year. The join
//! is by id only; entities never hold references to each other.
//!
//! ```text
//! car_models m ──JOIN── cars c ON c.id = m.car_id
//!      │                    │
//!      ▼                    ▼
//!   m.*               c.brand, c.year AS car_year   ──► CarModelListing
//! ```
//!
//! ## Search
//! Case-insensitive substring match (SQLite `LIKE`) over car brand, car
//! description, model name, fuel type and transmission. `%` and `_` typed by
//! the user are escaped so they match literally.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{generate_id, lock_row};
use crate::error::{DbError, DbResult};
use carhire_core::types::CarModelDraft;
use carhire_core::validation::like_pattern;
use carhire_core::{CarModel, CarModelListing, CoreError};

const LISTING_SELECT: &str = r#"
    SELECT m.*, c.brand AS brand, c.year AS car_year
    FROM car_models m
    JOIN cars c ON c.id = m.car_id
"#;

/// Repository for car model database operations.
#[derive(Debug, Clone)]
pub struct CarModelRepository {
    pool: SqlitePool,
}

impl CarModelRepository {
    /// Creates a new CarModelRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarModelRepository { pool }
    }

    /// Gets a model by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CarModel>> {
        let model = sqlx::query_as::<_, CarModel>("SELECT * FROM car_models WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(model)
    }

    /// Gets a model joined with its car.
    pub async fn get_listing(&self, id: &str) -> DbResult<Option<CarModelListing>> {
        let sql = format!("{LISTING_SELECT} WHERE m.id = ?1");
        let listing = sqlx::query_as::<_, CarModelListing>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(listing)
    }

    /// Lists every model, by brand then model name.
    pub async fn list_all(&self) -> DbResult<Vec<CarModelListing>> {
        let sql = format!("{LISTING_SELECT} ORDER BY c.brand, m.name");
        let listings = sqlx::query_as::<_, CarModelListing>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Lists available models (the default browse list).
    pub async fn available(&self) -> DbResult<Vec<CarModelListing>> {
        let sql = format!("{LISTING_SELECT} WHERE m.is_available = 1");
        let listings = sqlx::query_as::<_, CarModelListing>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Up to `limit` available models for the home page.
    pub async fn featured(&self, limit: u32) -> DbResult<Vec<CarModelListing>> {
        let sql = format!("{LISTING_SELECT} WHERE m.is_available = 1 LIMIT ?1");
        let listings = sqlx::query_as::<_, CarModelListing>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(listings)
    }

    /// Searches models by a trimmed, non-empty query.
    ///
    /// Callers route an empty query to [`available`](Self::available).
    pub async fn search(&self, query: &str) -> DbResult<Vec<CarModelListing>> {
        debug!(query = %query, "Searching car models");

        let pattern = like_pattern(query);
        let sql = format!(
            r#"{LISTING_SELECT}
            WHERE c.brand LIKE ?1 ESCAPE '\'
               OR c.description LIKE ?1 ESCAPE '\'
               OR m.name LIKE ?1 ESCAPE '\'
               OR m.fuel_type LIKE ?1 ESCAPE '\'
               OR m.transmission LIKE ?1 ESCAPE '\'
            "#
        );

        let listings = sqlx::query_as::<_, CarModelListing>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(query = %query, results = listings.len(), "Search complete");
        Ok(listings)
    }

    /// Inserts a model from a validated draft.
    ///
    /// ## Returns
    /// * `Ok(CarModel)` - The stored model, available
    /// * `Err(DbError::NotFound)` - `draft.car_id` names no car
    pub async fn insert(&self, draft: &CarModelDraft) -> DbResult<CarModel> {
        self.ensure_car_exists(&draft.car_id).await?;

        let now = Utc::now();
        let model = CarModel {
            id: generate_id(),
            car_id: draft.car_id.clone(),
            name: draft.name.clone(),
            price_per_day_cents: draft.price_per_day.cents(),
            mileage: draft.mileage,
            fuel_type: draft.fuel_type,
            transmission: draft.transmission,
            seats: draft.seats,
            air_conditioning: draft.air_conditioning,
            image_url: draft.image_url.clone(),
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %model.id, car_id = %model.car_id, name = %model.name, "Inserting car model");

        sqlx::query(
            r#"
            INSERT INTO car_models (
                id, car_id, name, price_per_day_cents, mileage,
                fuel_type, transmission, seats, air_conditioning, image_url,
                is_available, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13
            )
            "#,
        )
        .bind(&model.id)
        .bind(&model.car_id)
        .bind(&model.name)
        .bind(model.price_per_day_cents)
        .bind(model.mileage)
        .bind(model.fuel_type)
        .bind(model.transmission)
        .bind(model.seats)
        .bind(model.air_conditioning)
        .bind(&model.image_url)
        .bind(model.is_available)
        .bind(model.created_at)
        .bind(model.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(model)
    }

    /// Updates a model's catalog fields. Availability is left alone.
    pub async fn update(&self, id: &str, draft: &CarModelDraft) -> DbResult<CarModel> {
        debug!(id = %id, "Updating car model");

        self.ensure_car_exists(&draft.car_id).await?;

        let result = sqlx::query(
            r#"
            UPDATE car_models SET
                car_id = ?2,
                name = ?3,
                price_per_day_cents = ?4,
                mileage = ?5,
                fuel_type = ?6,
                transmission = ?7,
                seats = ?8,
                air_conditioning = ?9,
                image_url = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&draft.car_id)
        .bind(&draft.name)
        .bind(draft.price_per_day.cents())
        .bind(draft.mileage)
        .bind(draft.fuel_type)
        .bind(draft.transmission)
        .bind(draft.seats)
        .bind(draft.air_conditioning)
        .bind(&draft.image_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("CarModel", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("CarModel", id))
    }

    /// Deletes a model unless it is currently rented.
    ///
    /// Its non-active rentals are removed with it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        lock_row(&mut tx, "car_models", "CarModel", id).await?;

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rentals WHERE car_model_id = ?1 AND status = 'active'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if active > 0 {
            debug!(id = %id, active, "Refusing to delete rented car model");
            return Err(CoreError::conflict("Cannot delete a car model with active rentals.").into());
        }

        sqlx::query("DELETE FROM car_models WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(id = %id, "Car model deleted");
        Ok(())
    }

    /// Counts all models.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM car_models")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn ensure_car_exists(&self, car_id: &str) -> DbResult<()> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cars WHERE id = ?1)")
            .bind(car_id)
            .fetch_one(&self.pool)
            .await?;

        if !exists {
            return Err(DbError::not_found("Car", car_id));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{car, memory_db, model, model_draft, user};
    use carhire_core::types::FuelType;
    use carhire_core::DateRange;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_insert_and_listing() {
        let db = memory_db().await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;

        assert!(corolla.is_available);
        let listing = db.car_models().get_listing(&corolla.id).await.unwrap().unwrap();
        assert_eq!(listing.brand, "Toyota");
        assert_eq!(listing.car_year, 2022);
        assert_eq!(listing.model.price_per_day_cents, 5000);
        assert_eq!(listing.model.fuel_type, FuelType::Petrol);
    }

    #[tokio::test]
    async fn test_insert_for_missing_car_is_not_found() {
        let db = memory_db().await;
        let err = db
            .car_models()
            .insert(&model_draft("missing", "Ghost", 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "Car"));
    }

    #[tokio::test]
    async fn test_update_keeps_availability() {
        let db = memory_db().await;
        let alice = user(&db, "alice").await;
        let toyota = car(&db, "Toyota").await;
        let corolla = model(&db, &toyota.id, "Corolla", 5000).await;

        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        db.rentals()
            .create_active(&alice.id, &corolla.id, DateRange::new(d, d).unwrap())
            .await
            .unwrap();

        let updated = db
            .car_models()
            .update(&corolla.id, &model_draft(&toyota.id, "Corolla GR", 7000))
            .await
            .unwrap();
        assert_eq!(updated.name, "Corolla GR");
        assert_eq!(updated.price_per_day_cents, 7000);
        assert!(!updated.is_available);
    }

    #[tokio::test]
    async fn test_search_fields_and_case() {
        let db = memory_db().await;
        let toyota = car(&db, "Toyota").await;
        let honda = car(&db, "Honda").await;
        model(&db, &toyota.id, "Corolla", 5000).await;
        model(&db, &honda.id, "Civic", 4500).await;

        let repo = db.car_models();
        assert_eq!(repo.search("toy").await.unwrap().len(), 1);
        assert_eq!(repo.search("CIVIC").await.unwrap().len(), 1);
        assert_eq!(repo.search("family").await.unwrap().len(), 2);
        assert_eq!(repo.search("automatic").await.unwrap().len(), 2);
        assert!(repo.search("tesla").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let db = memory_db().await;
        let toyota = car(&db, "Toyota").await;
        model(&db, &toyota.id, "Corolla", 5000).await;
        model(&db, &toyota.id, "Yaris_GR", 6000).await;

        let repo = db.car_models();
        assert!(repo.search("%").await.unwrap().is_empty());
        let hits = repo.search("s_g").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].model.name, "Yaris_GR");
    }

    #[tokio::test]
    async fn test_featured_and_available() {
        let db = memory_db().await;
        let toyota = car(&db, "Toyota").await;
        for i in 0..8 {
            model(&db, &toyota.id, &format!("Model {i}"), 1000).await;
        }

        assert_eq!(db.car_models().featured(6).await.unwrap().len(), 6);
        assert_eq!(db.car_models().available().await.unwrap().len(), 8);
        assert_eq!(db.car_models().count().await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_delete_rules() {
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

        let err = db.car_models().delete(&corolla.id).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::Conflict(_))));

        db.rentals().complete(&rental.id).await.unwrap();
        db.car_models().delete(&corolla.id).await.unwrap();

        assert!(db.car_models().get_by_id(&corolla.id).await.unwrap().is_none());
        assert!(db.rentals().get_by_id(&rental.id).await.unwrap().is_none());
    }
}
