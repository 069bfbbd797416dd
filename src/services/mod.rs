pub mod listing;
pub mod pickup_points;
pub mod products;
pub mod receptions;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

/// Aggregates the domain services shared by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub pickup_points: pickup_points::PickupPointService,
    pub receptions: receptions::ReceptionService,
    pub products: products::ProductService,
    pub listing: listing::ListingService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        let receptions = receptions::ReceptionService::new(db.clone(), event_sender.clone());
        Self {
            pickup_points: pickup_points::PickupPointService::new(
                db.clone(),
                event_sender.clone(),
            ),
            products: products::ProductService::new(db.clone(), receptions.clone(), event_sender),
            receptions,
            listing: listing::ListingService::new(db),
        }
    }
}
