//! # Repository Module
//!
//! Database repository implementations for Car Hire.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Web service layer                                                     │
//! │       │                                                                 │
//! │       │  db.rentals().create_active(user_id, model_id, range)          │
//! │       ▼                                                                 │
//! │  RentalRepository                                                      │
//! │  ├── create_active  ─┐                                                 │
//! │  ├── cancel          ├── one transaction each, row lock first          │
//! │  ├── complete       ─┘                                                 │
//! │  └── list_for_user / list_active / count_active                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Units of Work
//! Every transaction that reads before it writes starts with [`lock_row`], a
//! no-op UPDATE on the row it is about to reason about. That takes SQLite's
//! write lock up front, so the reads that follow cannot go stale before the
//! commit and concurrent units of work on the same database run one after
//! another.
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Accounts and credentials lookup
//! - [`CarRepository`](car::CarRepository) - Cars, brands, guarded deletion
//! - [`CarModelRepository`](car_model::CarModelRepository) - Models, listings, search
//! - [`RentalRepository`](rental::RentalRepository) - Booking, cancellation, listings

pub mod car;
pub mod car_model;
pub mod rental;
pub mod user;

use sqlx::SqliteConnection;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Generates a new entity ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Takes the database write lock inside a transaction by touching one row.
///
/// Fails with `NotFound` when the row does not exist.
pub(crate) async fn lock_row(
    conn: &mut SqliteConnection,
    table: &'static str,
    entity: &'static str,
    id: &str,
) -> DbResult<()> {
    debug!(table, id = %id, "Locking row");

    let sql = format!("UPDATE {table} SET updated_at = updated_at WHERE id = ?1");
    let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(entity, id));
    }
    Ok(())
}

/// Marks a model available again after its rental ends.
///
/// Unconditional, even when a later non-overlapping rental is still active.
pub(crate) async fn release_model(
    conn: &mut SqliteConnection,
    car_model_id: &str,
) -> DbResult<()> {
    sqlx::query("UPDATE car_models SET is_available = 1, updated_at = ?2 WHERE id = ?1")
        .bind(car_model_id)
        .bind(chrono::Utc::now())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

// =============================================================================
// Test Support
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use carhire_core::types::{CarDraft, CarModelDraft, FuelType, Transmission};
    use carhire_core::{Car, CarModel, Money, Role, User};

    use crate::{Database, DbConfig};

    pub async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn user(db: &Database, username: &str) -> User {
        db.users()
            .insert(
                username,
                &format!("{username}@example.com"),
                "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA",
                Role::Customer,
            )
            .await
            .unwrap()
    }

    pub async fn car(db: &Database, brand: &str) -> Car {
        db.cars()
            .insert(&CarDraft {
                brand: brand.to_string(),
                year: 2022,
                description: Some(format!("{brand} family car")),
            })
            .await
            .unwrap()
    }

    pub fn model_draft(car_id: &str, name: &str, price_cents: i64) -> CarModelDraft {
        CarModelDraft {
            car_id: car_id.to_string(),
            name: name.to_string(),
            price_per_day: Money::from_cents(price_cents),
            mileage: Some(15000.0),
            fuel_type: FuelType::Petrol,
            transmission: Transmission::Automatic,
            seats: Some(5),
            air_conditioning: true,
            image_url: None,
        }
    }

    pub async fn model(db: &Database, car_id: &str, name: &str, price_cents: i64) -> CarModel {
        db.car_models()
            .insert(&model_draft(car_id, name, price_cents))
            .await
            .unwrap()
    }
}
