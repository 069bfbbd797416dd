use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::pickup_point;
use crate::entities::reception::{self, ReceptionStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Reception lifecycle engine.
///
/// Per pickup point the state machine has two states: no open reception, or
/// exactly one open reception. The current state is always derived from a
/// fresh status-filtered read; nothing is cached across calls. The partial
/// unique index on (pvz_id) where status = 'open' guarantees at most one
/// matching row, so the lookup stays exact even when open and closed
/// receptions share a timestamp. The same index closes the check-then-act
/// window between read and insert: the loser of a concurrent open/open race
/// gets a conflict, not a second open row.
#[derive(Clone)]
pub struct ReceptionService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl ReceptionService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Returns the pickup point's open reception, if any. This is the sole
    /// lookup used to determine "the current reception"; the partial unique
    /// index guarantees at most one row matches, so the result is exact
    /// regardless of timestamp collisions.
    #[instrument(skip(self))]
    pub async fn find_open_reception(
        &self,
        pvz_id: Uuid,
    ) -> Result<Option<reception::Model>, ServiceError> {
        let found = reception::Entity::find()
            .filter(reception::Column::PvzId.eq(pvz_id))
            .filter(reception::Column::Status.eq(ReceptionStatus::Open))
            .one(&*self.db)
            .await?;
        Ok(found)
    }

    /// Resolves the pickup point's open reception, or rejects with a
    /// conflict when none is open.
    #[instrument(skip(self))]
    pub async fn current_open_reception(
        &self,
        pvz_id: Uuid,
    ) -> Result<reception::Model, ServiceError> {
        self.find_open_reception(pvz_id)
            .await?
            .ok_or_else(|| ServiceError::Conflict("no open reception".to_string()))
    }

    /// Opens a new reception for the pickup point.
    #[instrument(skip(self))]
    pub async fn open_reception(&self, pvz_id: Uuid) -> Result<reception::Model, ServiceError> {
        let pvz = pickup_point::Entity::find_by_id(pvz_id)
            .one(&*self.db)
            .await?;
        if pvz.is_none() {
            return Err(ServiceError::NotFound(format!(
                "pickup point {} not found",
                pvz_id
            )));
        }

        if self.find_open_reception(pvz_id).await?.is_some() {
            return Err(ServiceError::Conflict(
                "open reception already exists".to_string(),
            ));
        }

        let insert = reception::ActiveModel {
            id: Set(Uuid::new_v4()),
            pvz_id: Set(pvz_id),
            date_time: Set(Utc::now()),
            status: Set(ReceptionStatus::Open),
        }
        .insert(&*self.db)
        .await;

        let created = match insert {
            Ok(model) => model,
            // Lost the open/open race: the partial unique index rejected a
            // second open row for this pickup point.
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    return Err(ServiceError::Conflict(
                        "open reception already exists".to_string(),
                    ));
                }
                _ => return Err(err.into()),
            },
        };

        counter!("receptions_created_total", 1);
        info!(pvz_id = %pvz_id, reception_id = %created.id, "reception opened");
        self.event_sender
            .send(Event::ReceptionOpened {
                pvz_id,
                reception_id: created.id,
            })
            .await;

        Ok(created)
    }

    /// Closes the pickup point's open reception. One-way: a closed
    /// reception is never reopened; a later `open_reception` creates a new
    /// row.
    #[instrument(skip(self))]
    pub async fn close_reception(&self, pvz_id: Uuid) -> Result<reception::Model, ServiceError> {
        let open = self.find_open_reception(pvz_id).await?.ok_or_else(|| {
            ServiceError::Conflict("no open reception to close".to_string())
        })?;

        let reception_id = open.id;
        let mut active: reception::ActiveModel = open.into();
        active.status = Set(ReceptionStatus::Closed);
        let updated = active.update(&*self.db).await?;

        info!(pvz_id = %pvz_id, reception_id = %reception_id, "reception closed");
        self.event_sender
            .send(Event::ReceptionClosed {
                pvz_id,
                reception_id,
            })
            .await;

        Ok(updated)
    }
}
