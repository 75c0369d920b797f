//! Search and browse views.

use serde::Serialize;
use tracing::debug;

use carhire_core::validation::normalize_search_query;
use carhire_core::{CarModelListing, FEATURED_MODELS_LIMIT};
use carhire_db::Database;

use crate::error::ApiResult;

/// Result page of `/user/search`, also the shape of the user dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct BrowseView {
    /// The trimmed query, absent for the default browse view.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    pub car_models: Vec<CarModelListing>,
    pub brands: Vec<String>,
}

/// Models matching `query`; an empty query lists every available model.
pub async fn search(db: &Database, query: Option<&str>) -> ApiResult<BrowseView> {
    let query = normalize_search_query(query.unwrap_or_default());

    let car_models = if query.is_empty() {
        db.car_models().available().await?
    } else {
        db.car_models().search(&query).await?
    };
    debug!(query = %query, results = car_models.len(), "Search complete");

    Ok(BrowseView {
        search_query: (!query.is_empty()).then_some(query),
        car_models,
        brands: db.cars().brands().await?,
    })
}

/// Available models and the brand list.
pub async fn user_dashboard(db: &Database) -> ApiResult<BrowseView> {
    search(db, None).await
}

/// Home page models.
pub async fn featured(db: &Database) -> ApiResult<Vec<CarModelListing>> {
    Ok(db.car_models().featured(FEATURED_MODELS_LIMIT).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carhire_core::types::{CarDraft, CarModelDraft, FuelType, Transmission};
    use carhire_core::Money;
    use carhire_db::DbConfig;

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for (brand, name, fuel) in [
            ("Toyota", "Prius", FuelType::Hybrid),
            ("Tesla", "Model 3", FuelType::Electric),
            ("Toyota", "Hilux", FuelType::Diesel),
        ] {
            let car = db
                .cars()
                .insert(&CarDraft {
                    brand: brand.to_string(),
                    year: 2023,
                    description: None,
                })
                .await
                .unwrap();
            db.car_models()
                .insert(&CarModelDraft {
                    car_id: car.id,
                    name: name.to_string(),
                    price_per_day: Money::from_cents(6000),
                    mileage: None,
                    fuel_type: fuel,
                    transmission: Transmission::Automatic,
                    seats: Some(5),
                    air_conditioning: true,
                    image_url: None,
                })
                .await
                .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_empty_query_browses_available() {
        let db = seeded().await;
        let view = search(&db, Some("   ")).await.unwrap();
        assert!(view.search_query.is_none());
        assert_eq!(view.car_models.len(), 3);
        assert_eq!(view.brands.len(), 2);
    }

    #[tokio::test]
    async fn test_query_matches_brand_and_fuel() {
        let db = seeded().await;

        let view = search(&db, Some("toyota")).await.unwrap();
        assert_eq!(view.search_query.as_deref(), Some("toyota"));
        assert_eq!(view.car_models.len(), 2);

        let view = search(&db, Some("ELECTRIC")).await.unwrap();
        assert_eq!(view.car_models.len(), 1);
        assert_eq!(view.car_models[0].model.name, "Model 3");
    }

    #[tokio::test]
    async fn test_long_query_is_truncated() {
        let db = seeded().await;
        let long = format!("toyota{}", "x".repeat(200));
        let view = search(&db, Some(&long)).await.unwrap();
        assert_eq!(view.search_query.map(|q| q.chars().count()), Some(100));
        assert!(view.car_models.is_empty());
    }

    #[tokio::test]
    async fn test_featured() {
        let db = seeded().await;
        assert_eq!(featured(&db).await.unwrap().len(), 3);
    }
}
