//! # Catalog Service
//!
//! Admin management of cars and car models.
//!
//! Every operation takes the acting [`Principal`] explicitly and checks
//! `ManageCatalog` before touching the store. Model availability is never
//! written here; only booking flips it.

use serde::Serialize;
use tracing::info;

use carhire_core::authz::{require_capability, Capability};
use carhire_core::validation::{validate_car_form, validate_car_model_form, CarForm, CarModelForm};
use carhire_core::{
    Car, CarModel, CoreError, FuelType, Principal, Transmission, MAX_CAR_YEAR, MAX_SEATS,
    MIN_CAR_YEAR,
};
use carhire_db::Database;

use crate::error::ApiResult;

// =============================================================================
// Form Contexts
// =============================================================================

/// What the car add/edit form needs to render.
#[derive(Debug, Clone, Serialize)]
pub struct CarFormContext {
    pub min_year: i64,
    pub max_year: i64,
    /// Current values when editing.
    pub car: Option<Car>,
}

/// One entry of the car select box.
#[derive(Debug, Clone, Serialize)]
pub struct CarChoice {
    pub id: String,
    pub label: String,
}

/// What the car model add/edit form needs to render.
#[derive(Debug, Clone, Serialize)]
pub struct CarModelFormContext {
    pub cars: Vec<CarChoice>,
    pub fuel_types: Vec<&'static str>,
    pub transmissions: Vec<&'static str>,
    pub max_seats: i64,
    /// Current values when editing.
    pub model: Option<CarModel>,
}

pub async fn car_form(
    db: &Database,
    principal: &Principal,
    car_id: Option<&str>,
) -> ApiResult<CarFormContext> {
    require_capability(principal, Capability::ManageCatalog)?;

    let car = match car_id {
        Some(id) => Some(
            db.cars()
                .get_by_id(id)
                .await?
                .ok_or_else(|| CoreError::not_found("Car", id))?,
        ),
        None => None,
    };

    Ok(CarFormContext {
        min_year: MIN_CAR_YEAR,
        max_year: MAX_CAR_YEAR,
        car,
    })
}

pub async fn car_model_form(
    db: &Database,
    principal: &Principal,
    model_id: Option<&str>,
) -> ApiResult<CarModelFormContext> {
    require_capability(principal, Capability::ManageCatalog)?;

    let model = match model_id {
        Some(id) => Some(
            db.car_models()
                .get_by_id(id)
                .await?
                .ok_or_else(|| CoreError::not_found("CarModel", id))?,
        ),
        None => None,
    };

    let cars = db
        .cars()
        .list_all()
        .await?
        .into_iter()
        .map(|car| CarChoice {
            label: car.label(),
            id: car.id,
        })
        .collect();

    Ok(CarModelFormContext {
        cars,
        fuel_types: FuelType::ALL.iter().map(FuelType::as_str).collect(),
        transmissions: Transmission::ALL.iter().map(Transmission::as_str).collect(),
        max_seats: MAX_SEATS,
        model,
    })
}

// =============================================================================
// Cars
// =============================================================================

pub async fn add_car(db: &Database, principal: &Principal, form: &CarForm) -> ApiResult<Car> {
    require_capability(principal, Capability::ManageCatalog)?;
    let draft = validate_car_form(form)?;

    let car = db.cars().insert(&draft).await?;
    info!(id = %car.id, brand = %car.brand, year = car.year, by = %principal.username, "Car added");
    Ok(car)
}

pub async fn edit_car(
    db: &Database,
    principal: &Principal,
    car_id: &str,
    form: &CarForm,
) -> ApiResult<Car> {
    require_capability(principal, Capability::ManageCatalog)?;
    let draft = validate_car_form(form)?;

    let car = db.cars().update(car_id, &draft).await?;
    info!(id = %car.id, by = %principal.username, "Car updated");
    Ok(car)
}

/// Deletes a car with its models. Refused while any model is rented.
pub async fn delete_car(db: &Database, principal: &Principal, car_id: &str) -> ApiResult<()> {
    require_capability(principal, Capability::ManageCatalog)?;

    db.cars().delete(car_id).await?;
    info!(id = %car_id, by = %principal.username, "Car deleted");
    Ok(())
}

// =============================================================================
// Car Models
// =============================================================================

pub async fn add_car_model(
    db: &Database,
    principal: &Principal,
    form: &CarModelForm,
) -> ApiResult<CarModel> {
    require_capability(principal, Capability::ManageCatalog)?;
    let draft = validate_car_model_form(form)?;

    let model = db.car_models().insert(&draft).await?;
    info!(
        id = %model.id,
        car_id = %model.car_id,
        name = %model.name,
        price = %model.price_per_day(),
        by = %principal.username,
        "Car model added"
    );
    Ok(model)
}

pub async fn edit_car_model(
    db: &Database,
    principal: &Principal,
    model_id: &str,
    form: &CarModelForm,
) -> ApiResult<CarModel> {
    require_capability(principal, Capability::ManageCatalog)?;
    let draft = validate_car_model_form(form)?;

    let model = db.car_models().update(model_id, &draft).await?;
    info!(id = %model.id, by = %principal.username, "Car model updated");
    Ok(model)
}

/// Deletes a car model. Refused while it has an active rental.
pub async fn delete_car_model(
    db: &Database,
    principal: &Principal,
    model_id: &str,
) -> ApiResult<()> {
    require_capability(principal, Capability::ManageCatalog)?;

    db.car_models().delete(model_id).await?;
    info!(id = %model_id, by = %principal.username, "Car model deleted");
    Ok(())
}
