mod common;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use common::TestApp;
use pvz_api::entities::{product, reception, City, ProductType, ReceptionStatus};
use pvz_api::errors::ServiceError;

#[tokio::test]
async fn open_requires_an_existing_pickup_point() {
    let app = TestApp::new().await;
    let result = app
        .state
        .services
        .receptions
        .open_reception(Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn at_most_one_open_reception_per_pickup_point() {
    let app = TestApp::new().await;
    let pvz = app
        .state
        .services
        .pickup_points
        .create_pickup_point(City::Moscow)
        .await
        .unwrap();

    app.state
        .services
        .receptions
        .open_reception(pvz.id)
        .await
        .unwrap();

    let second = app.state.services.receptions.open_reception(pvz.id).await;
    match second {
        Err(ServiceError::Conflict(msg)) => assert_eq!(msg, "open reception already exists"),
        other => panic!("expected conflict, got {:?}", other.map(|r| r.id)),
    }
}

#[tokio::test]
async fn close_without_open_reception_is_a_conflict() {
    let app = TestApp::new().await;
    let pvz = app
        .state
        .services
        .pickup_points
        .create_pickup_point(City::Kazan)
        .await
        .unwrap();

    let result = app.state.services.receptions.close_reception(pvz.id).await;
    match result {
        Err(ServiceError::Conflict(msg)) => assert_eq!(msg, "no open reception to close"),
        other => panic!("expected conflict, got {:?}", other.map(|r| r.id)),
    }
}

#[tokio::test]
async fn close_is_one_way_and_reopening_creates_a_new_row() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::SaintPetersburg)
        .await
        .unwrap();

    let first = services.receptions.open_reception(pvz.id).await.unwrap();
    let closed = services.receptions.close_reception(pvz.id).await.unwrap();
    assert_eq!(closed.id, first.id);
    assert_eq!(closed.status, ReceptionStatus::Closed);

    // The closed reception stays closed; products cannot be added to it.
    let add = services
        .products
        .add_product(pvz.id, ProductType::Shoes)
        .await;
    assert!(matches!(add, Err(ServiceError::Conflict(_))));

    // Closing again is also a conflict.
    let reclose = services.receptions.close_reception(pvz.id).await;
    assert!(matches!(reclose, Err(ServiceError::Conflict(_))));

    // A new open creates a distinct reception; the old row is untouched.
    let second = services.receptions.open_reception(pvz.id).await.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(second.status, ReceptionStatus::Open);

    let first_row = reception::Entity::find_by_id(first.id)
        .one(&*app.state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first_row.status, ReceptionStatus::Closed);
}

#[tokio::test]
async fn shared_timestamps_never_shadow_the_open_reception() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::Moscow)
        .await
        .unwrap();

    // A closed and an open reception sharing one timestamp. The current
    // reception must resolve to the open row, not whichever the store
    // happens to return first.
    let shared_instant = Utc::now();
    let closed = reception::ActiveModel {
        id: Set(Uuid::new_v4()),
        pvz_id: Set(pvz.id),
        date_time: Set(shared_instant),
        status: Set(ReceptionStatus::Closed),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
    let open = reception::ActiveModel {
        id: Set(Uuid::new_v4()),
        pvz_id: Set(pvz.id),
        date_time: Set(shared_instant),
        status: Set(ReceptionStatus::Open),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();

    let current = services
        .receptions
        .current_open_reception(pvz.id)
        .await
        .unwrap();
    assert_eq!(current.id, open.id);
    assert_ne!(current.id, closed.id);

    // The ledger and the close path resolve the same reception.
    let added = services
        .products
        .add_product(pvz.id, ProductType::Shoes)
        .await
        .unwrap();
    assert_eq!(added.reception_id, open.id);

    let now_closed = services.receptions.close_reception(pvz.id).await.unwrap();
    assert_eq!(now_closed.id, open.id);
    assert_eq!(now_closed.status, ReceptionStatus::Closed);
}

#[tokio::test]
async fn deleting_a_pickup_point_cascades_to_receptions_and_products() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::Moscow)
        .await
        .unwrap();
    let reception = services.receptions.open_reception(pvz.id).await.unwrap();
    services
        .products
        .add_product(pvz.id, ProductType::Electronics)
        .await
        .unwrap();

    pvz_api::entities::pickup_point::Entity::delete_by_id(pvz.id)
        .exec(&*app.state.db)
        .await
        .unwrap();

    let receptions_left = reception::Entity::find()
        .filter(reception::Column::PvzId.eq(pvz.id))
        .count(&*app.state.db)
        .await
        .unwrap();
    let products_left = product::Entity::find()
        .filter(product::Column::ReceptionId.eq(reception.id))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(receptions_left, 0);
    assert_eq!(products_left, 0);
}
