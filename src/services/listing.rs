use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::product;
use crate::entities::reception::{self, ReceptionStatus};
use crate::errors::ServiceError;

/// Inclusive page size bounds for the listing endpoint.
pub const MIN_PAGE_SIZE: u64 = 1;
pub const MAX_PAGE_SIZE: u64 = 30;

/// One (reception, product) pair inside a pickup point group.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReceptionProductPair {
    pub reception_id: Uuid,
    pub product_id: Uuid,
}

/// All (reception, product) pairs of one pickup point on the current page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PickupPointGroup {
    pub pvz_id: Uuid,
    pub receptions: Vec<ReceptionProductPair>,
}

/// Read-only reporting over in-progress receptions. Never mutates.
#[derive(Clone)]
pub struct ListingService {
    db: Arc<DbPool>,
}

impl ListingService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Lists open receptions whose open timestamp falls within
    /// [start_date, end_date] (inclusive), newest first, paginated with
    /// offset (page-1)*limit, grouped by pickup point in first-appearance
    /// order.
    ///
    /// Receptions with zero products are omitted from the output. That is
    /// the documented behavior of this report, not an oversight; pagination
    /// still counts the omitted receptions.
    #[instrument(skip(self))]
    pub async fn list_active_receptions(
        &self,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        page: u64,
        limit: u64,
    ) -> Result<Vec<PickupPointGroup>, ServiceError> {
        if start_date > end_date {
            return Err(ServiceError::ValidationError(
                "start date must not be after end date".to_string(),
            ));
        }
        if page < 1 {
            return Err(ServiceError::ValidationError(
                "page must be at least 1".to_string(),
            ));
        }
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(ServiceError::ValidationError(format!(
                "limit must be between {} and {}",
                MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }

        let receptions = reception::Entity::find()
            .filter(reception::Column::Status.eq(ReceptionStatus::Open))
            .filter(reception::Column::DateTime.gte(start_date))
            .filter(reception::Column::DateTime.lte(end_date))
            .order_by_desc(reception::Column::DateTime)
            .offset((page - 1) * limit)
            .limit(limit)
            .all(&*self.db)
            .await?;

        if receptions.is_empty() {
            return Ok(Vec::new());
        }

        let reception_ids: Vec<Uuid> = receptions.iter().map(|r| r.id).collect();
        let products = product::Entity::find()
            .filter(product::Column::ReceptionId.is_in(reception_ids))
            .order_by_asc(product::Column::DateTime)
            .order_by_asc(product::Column::Seq)
            .all(&*self.db)
            .await?;

        let mut by_reception: HashMap<Uuid, Vec<product::Model>> = HashMap::new();
        for p in products {
            by_reception.entry(p.reception_id).or_default().push(p);
        }

        let mut groups: Vec<PickupPointGroup> = Vec::new();
        let mut group_index: HashMap<Uuid, usize> = HashMap::new();
        for r in &receptions {
            let Some(items) = by_reception.remove(&r.id) else {
                continue;
            };
            let slot = *group_index.entry(r.pvz_id).or_insert_with(|| {
                groups.push(PickupPointGroup {
                    pvz_id: r.pvz_id,
                    receptions: Vec::new(),
                });
                groups.len() - 1
            });
            for p in items {
                groups[slot].receptions.push(ReceptionProductPair {
                    reception_id: r.id,
                    product_id: p.id,
                });
            }
        }

        Ok(groups)
    }
}
