//! Admin dashboard.

use serde::Serialize;

use carhire_core::authz::{require_capability, Capability};
use carhire_core::{Car, CarModelListing, Principal, RentalListing};
use carhire_db::Database;

use crate::error::ApiResult;

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_cars: i64,
    pub total_models: i64,
    pub active_rentals: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub stats: DashboardStats,
    pub cars: Vec<Car>,
    pub car_models: Vec<CarModelListing>,
    pub active_rentals: Vec<RentalListing>,
}

pub async fn dashboard(db: &Database, principal: &Principal) -> ApiResult<AdminDashboard> {
    require_capability(principal, Capability::ViewAdminDashboard)?;

    Ok(AdminDashboard {
        stats: DashboardStats {
            total_cars: db.cars().count().await?,
            total_models: db.car_models().count().await?,
            active_rentals: db.rentals().count_active().await?,
        },
        cars: db.cars().list_all().await?,
        car_models: db.car_models().list_all().await?,
        active_rentals: db.rentals().list_active().await?,
    })
}
