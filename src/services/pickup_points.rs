use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::pickup_point::{self, City};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Service for registering and reading pickup points.
#[derive(Clone)]
pub struct PickupPointService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl PickupPointService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Registers a new pickup point in one of the supported cities.
    #[instrument(skip(self))]
    pub async fn create_pickup_point(
        &self,
        city: City,
    ) -> Result<pickup_point::Model, ServiceError> {
        let created = pickup_point::ActiveModel {
            id: Set(Uuid::new_v4()),
            city: Set(city),
            registration_date: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        counter!("pvz_created_total", 1);
        info!(pvz_id = %created.id, "pickup point created");
        self.event_sender
            .send(Event::PickupPointCreated(created.id))
            .await;

        Ok(created)
    }

    /// Looks up a pickup point by id.
    #[instrument(skip(self))]
    pub async fn get_pickup_point(
        &self,
        pvz_id: Uuid,
    ) -> Result<Option<pickup_point::Model>, ServiceError> {
        let found = pickup_point::Entity::find_by_id(pvz_id)
            .one(&*self.db)
            .await?;
        Ok(found)
    }
}
