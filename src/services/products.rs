use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::product::{self, ProductType};
use crate::entities::reception::{self, ReceptionStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::receptions::ReceptionService;

/// Product ledger: append-only intake with strict LIFO removal, scoped to
/// the pickup point's currently open reception.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
    receptions: ReceptionService,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>, receptions: ReceptionService, event_sender: EventSender) -> Self {
        Self {
            db,
            receptions,
            event_sender,
        }
    }

    /// Records a product in the pickup point's open reception.
    ///
    /// The per-reception `seq` counter is assigned inside the insert
    /// transaction so insertion order stays total even when timestamps
    /// collide at clock granularity.
    #[instrument(skip(self))]
    pub async fn add_product(
        &self,
        pvz_id: Uuid,
        product_type: ProductType,
    ) -> Result<product::Model, ServiceError> {
        let reception = self.receptions.current_open_reception(pvz_id).await?;

        let txn = self.db.begin().await?;
        // The open check above ran outside this transaction; a concurrent
        // close can commit in between. Re-read the status here so the insert
        // never lands in a reception that just closed.
        reception::Entity::find_by_id(reception.id)
            .one(&txn)
            .await?
            .filter(|r| r.status == ReceptionStatus::Open)
            .ok_or_else(|| ServiceError::Conflict("no open reception".to_string()))?;
        let last = product::Entity::find()
            .filter(product::Column::ReceptionId.eq(reception.id))
            .order_by_desc(product::Column::Seq)
            .one(&txn)
            .await?;
        let seq = last.map_or(1, |p| p.seq + 1);

        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            reception_id: Set(reception.id),
            product_type: Set(product_type),
            date_time: Set(Utc::now()),
            seq: Set(seq),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        counter!("products_added_total", 1);
        info!(reception_id = %reception.id, product_id = %created.id, "product added");
        self.event_sender
            .send(Event::ProductAdded {
                reception_id: reception.id,
                product_id: created.id,
            })
            .await;

        Ok(created)
    }

    /// Removes the most recently added product from the open reception.
    ///
    /// An empty ledger is a normal outcome and returns `Ok(None)`; only a
    /// missing or closed reception is a conflict.
    #[instrument(skip(self))]
    pub async fn remove_last_product(
        &self,
        pvz_id: Uuid,
    ) -> Result<Option<product::Model>, ServiceError> {
        let reception = self.receptions.current_open_reception(pvz_id).await?;

        let last = product::Entity::find()
            .filter(product::Column::ReceptionId.eq(reception.id))
            .order_by_desc(product::Column::DateTime)
            .order_by_desc(product::Column::Seq)
            .one(&*self.db)
            .await?;

        let Some(victim) = last else {
            return Ok(None);
        };

        product::Entity::delete_by_id(victim.id)
            .exec(&*self.db)
            .await?;

        info!(reception_id = %reception.id, product_id = %victim.id, "product removed");
        self.event_sender
            .send(Event::ProductRemoved {
                reception_id: reception.id,
                product_id: victim.id,
            })
            .await;

        Ok(Some(victim))
    }
}
