//! # Booking Service
//!
//! Renting, cancelling and listing rentals on behalf of a principal.
//!
//! ## Rental Lifecycle
//! ```text
//!   create_rental ──► active ──► cancel_rental ──► cancelled
//!                       │
//!                       └──────► complete_rental ──► completed
//!
//!   pending: valid and cancellable, never assigned
//! ```
//!
//! The overlap check and both writes run in one transaction inside
//! [`RentalRepository::create_active`](carhire_db::RentalRepository::create_active).

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use carhire_core::authz::{require_capability, require_role, Capability};
use carhire_core::{CarModelListing, CoreError, DateRange, Principal, Rental, RentalListing, Role};
use carhire_db::Database;

use crate::error::ApiResult;

/// Booking request body for `POST /user/car/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RentalRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// The car detail page: the model plus the earliest bookable date.
#[derive(Debug, Clone, Serialize)]
pub struct CarDetail {
    pub model: CarModelListing,
    pub today: NaiveDate,
}

pub async fn car_detail(db: &Database, car_model_id: &str) -> ApiResult<CarDetail> {
    let model = db
        .car_models()
        .get_listing(car_model_id)
        .await?
        .ok_or_else(|| CoreError::not_found("CarModel", car_model_id))?;

    Ok(CarDetail {
        model,
        today: Utc::now().date_naive(),
    })
}

/// Books a model for an inclusive date range.
///
/// ## Returns
/// * `Ok(Rental)` - Active rental with its frozen total
/// * `Err` 400 - End date before start date
/// * `Err` 404 - Model doesn't exist
/// * `Err` 409 - Dates overlap an active rental of the model
pub async fn create_rental(
    db: &Database,
    principal: &Principal,
    car_model_id: &str,
    request: &RentalRequest,
) -> ApiResult<Rental> {
    require_capability(principal, Capability::RentCars)?;
    let range = DateRange::new(request.start_date, request.end_date)?;

    debug!(user_id = %principal.user_id, car_model_id = %car_model_id, days = range.days(), "Rental requested");

    Ok(db
        .rentals()
        .create_active(&principal.user_id, car_model_id, range)
        .await?)
}

/// Cancels one of the principal's own pending or active rentals.
pub async fn cancel_rental(
    db: &Database,
    principal: &Principal,
    rental_id: &str,
) -> ApiResult<Rental> {
    require_capability(principal, Capability::ManageOwnRentals)?;
    Ok(db.rentals().cancel(rental_id, principal).await?)
}

/// Marks an active rental completed and frees its model.
///
/// Admin-only entry point for a future end-of-rental job; no route calls it.
pub async fn complete_rental(
    db: &Database,
    principal: &Principal,
    rental_id: &str,
) -> ApiResult<Rental> {
    require_role(principal, Role::Admin)?;
    Ok(db.rentals().complete(rental_id).await?)
}

/// The principal's rentals, newest first.
pub async fn my_rentals(db: &Database, principal: &Principal) -> ApiResult<Vec<RentalListing>> {
    require_capability(principal, Capability::ManageOwnRentals)?;
    Ok(db.rentals().list_for_user(&principal.user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use carhire_core::types::{CarDraft, CarModelDraft, FuelType, Transmission};
    use carhire_core::{Money, RentalStatus};
    use carhire_db::DbConfig;

    struct Fixture {
        db: Database,
        alice: Principal,
        bob: Principal,
        model_id: String,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(start: NaiveDate, end: NaiveDate) -> RentalRequest {
        RentalRequest {
            start_date: start,
            end_date: end,
        }
    }

    async fn customer(db: &Database, name: &str) -> Principal {
        let user = db
            .users()
            .insert(name, &format!("{name}@example.com"), "hash", Role::Customer)
            .await
            .unwrap();
        Principal::from(&user)
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let alice = customer(&db, "alice").await;
        let bob = customer(&db, "bob").await;

        let car = db
            .cars()
            .insert(&CarDraft {
                brand: "Toyota".to_string(),
                year: 2022,
                description: None,
            })
            .await
            .unwrap();
        let model = db
            .car_models()
            .insert(&CarModelDraft {
                car_id: car.id,
                name: "Corolla".to_string(),
                price_per_day: Money::from_major_minor(50, 0),
                mileage: None,
                fuel_type: FuelType::Petrol,
                transmission: Transmission::Automatic,
                seats: Some(5),
                air_conditioning: true,
                image_url: None,
            })
            .await
            .unwrap();

        Fixture {
            db,
            alice,
            bob,
            model_id: model.id,
        }
    }

    async fn is_available(f: &Fixture) -> bool {
        f.db.car_models()
            .get_by_id(&f.model_id)
            .await
            .unwrap()
            .unwrap()
            .is_available
    }

    #[tokio::test]
    async fn test_book_conflict_cancel_rebook() {
        let f = fixture().await;

        let a = create_rental(&f.db, &f.alice, &f.model_id, &request(date(2024, 6, 1), date(2024, 6, 3)))
            .await
            .unwrap();
        assert_eq!(a.total_price_cents, 15_000);
        assert_eq!(a.status, RentalStatus::Active);
        assert!(!is_available(&f).await);

        let b = request(date(2024, 6, 2), date(2024, 6, 2));
        let err = create_rental(&f.db, &f.bob, &f.model_id, &b).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);

        let cancelled = cancel_rental(&f.db, &f.alice, &a.id).await.unwrap();
        assert_eq!(cancelled.status, RentalStatus::Cancelled);
        assert!(is_available(&f).await);

        let rebooked = create_rental(&f.db, &f.bob, &f.model_id, &b).await.unwrap();
        assert_eq!(rebooked.total_price_cents, 5_000);
    }

    #[tokio::test]
    async fn test_end_before_start_is_field_error() {
        let f = fixture().await;
        let err = create_rental(&f.db, &f.alice, &f.model_id, &request(date(2024, 6, 3), date(2024, 6, 1)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("end_date"));
    }

    #[tokio::test]
    async fn test_admin_cannot_rent() {
        let f = fixture().await;
        let admin = Principal {
            role: Role::Admin,
            ..f.alice.clone()
        };
        let err = create_rental(&f.db, &admin, &f.model_id, &request(date(2024, 6, 1), date(2024, 6, 1)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn test_cancel_rules() {
        let f = fixture().await;
        let rental = create_rental(&f.db, &f.alice, &f.model_id, &request(date(2024, 6, 1), date(2024, 6, 3)))
            .await
            .unwrap();

        let err = cancel_rental(&f.db, &f.bob, &rental.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = cancel_rental(&f.db, &f.alice, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        cancel_rental(&f.db, &f.alice, &rental.id).await.unwrap();
        create_rental(&f.db, &f.alice, &f.model_id, &request(date(2024, 6, 10), date(2024, 6, 12)))
            .await
            .unwrap();
        assert!(!is_available(&f).await);

        let err = cancel_rental(&f.db, &f.alice, &rental.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);
        assert!(!is_available(&f).await);
    }

    #[tokio::test]
    async fn test_complete_is_admin_only() {
        let f = fixture().await;
        let rental = create_rental(&f.db, &f.alice, &f.model_id, &request(date(2024, 6, 1), date(2024, 6, 3)))
            .await
            .unwrap();

        let err = complete_rental(&f.db, &f.alice, &rental.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let admin = Principal {
            user_id: "admin-1".to_string(),
            username: "admin".to_string(),
            role: Role::Admin,
        };
        let done = complete_rental(&f.db, &admin, &rental.id).await.unwrap();
        assert_eq!(done.status, RentalStatus::Completed);
        assert!(is_available(&f).await);
    }

    #[tokio::test]
    async fn test_my_rentals_only_shows_own() {
        let f = fixture().await;
        create_rental(&f.db, &f.alice, &f.model_id, &request(date(2024, 6, 1), date(2024, 6, 1)))
            .await
            .unwrap();
        create_rental(&f.db, &f.bob, &f.model_id, &request(date(2024, 7, 1), date(2024, 7, 1)))
            .await
            .unwrap();

        let mine = my_rentals(&f.db, &f.alice).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].model_name, "Corolla");
        assert_eq!(mine[0].brand, "Toyota");
    }

    #[tokio::test]
    async fn test_car_detail() {
        let f = fixture().await;
        let detail = car_detail(&f.db, &f.model_id).await.unwrap();
        assert_eq!(detail.model.brand, "Toyota");

        let err = car_detail(&f.db, "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
