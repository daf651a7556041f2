//! Location service

use crate::db::repositories::LocationRepository;
use crate::models::{Location, LocationInput};
use anyhow::Context;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum LocationServiceError {
    #[error("Location not found: {0}")]
    NotFound(i64),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
}

impl LocationService {
    pub fn new(repo: Arc<dyn LocationRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Location>, LocationServiceError> {
        Ok(self.repo.list().await.context("Failed to list locations")?)
    }

    pub async fn get(&self, id: i64) -> Result<Location, LocationServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get location")?
            .ok_or(LocationServiceError::NotFound(id))
    }

    pub async fn create(&self, input: LocationInput) -> Result<Location, LocationServiceError> {
        let created = self
            .repo
            .create(&Location::new(input.name, input.is_published))
            .await
            .context("Failed to create location")?;
        tracing::info!("Created location {} ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update(
        &self,
        id: i64,
        input: LocationInput,
    ) -> Result<Location, LocationServiceError> {
        let updated = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update location")?
            .ok_or(LocationServiceError::NotFound(id))?;
        tracing::info!("Updated location {} ({})", updated.name, id);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxLocationRepository;
    use crate::db::{create_test_pool, migrations};

    #[tokio::test]
    async fn test_location_service() {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        let service = LocationService::new(SqlxLocationRepository::boxed(pool));

        let oslo = service
            .create(LocationInput {
                name: "Oslo".into(),
                is_published: true,
            })
            .await
            .unwrap();
        assert_eq!(service.get(oslo.id).await.unwrap().name, "Oslo");

        let hidden = service
            .update(
                oslo.id,
                LocationInput {
                    name: "Oslo".into(),
                    is_published: false,
                },
            )
            .await
            .unwrap();
        assert!(!hidden.is_published);

        assert!(matches!(service.get(5).await, Err(LocationServiceError::NotFound(5))));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
