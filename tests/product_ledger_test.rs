mod common;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use common::TestApp;
use pvz_api::entities::{product, City, ProductType};
use pvz_api::errors::ServiceError;

#[tokio::test]
async fn removal_is_strictly_last_in_first_out() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::Moscow)
        .await
        .unwrap();
    services.receptions.open_reception(pvz.id).await.unwrap();

    let a = services
        .products
        .add_product(pvz.id, ProductType::Electronics)
        .await
        .unwrap();
    let b = services
        .products
        .add_product(pvz.id, ProductType::Clothes)
        .await
        .unwrap();
    let c = services
        .products
        .add_product(pvz.id, ProductType::Shoes)
        .await
        .unwrap();

    let removed: Vec<Uuid> = [
        services.products.remove_last_product(pvz.id).await.unwrap(),
        services.products.remove_last_product(pvz.id).await.unwrap(),
        services.products.remove_last_product(pvz.id).await.unwrap(),
    ]
    .into_iter()
    .map(|p| p.expect("product to remove").id)
    .collect();
    assert_eq!(removed, vec![c.id, b.id, a.id]);

    // Fourth removal finds an empty ledger: a normal outcome, not an error.
    let fourth = services.products.remove_last_product(pvz.id).await.unwrap();
    assert!(fourth.is_none());
}

#[tokio::test]
async fn empty_ledger_removal_is_idempotent() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::Kazan)
        .await
        .unwrap();
    services.receptions.open_reception(pvz.id).await.unwrap();

    for _ in 0..3 {
        let outcome = services.products.remove_last_product(pvz.id).await.unwrap();
        assert!(outcome.is_none());
    }
}

#[tokio::test]
async fn ledger_operations_require_an_open_reception() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::SaintPetersburg)
        .await
        .unwrap();

    // No reception at all.
    let add = services.products.add_product(pvz.id, ProductType::Shoes).await;
    match add {
        Err(ServiceError::Conflict(msg)) => assert_eq!(msg, "no open reception"),
        other => panic!("expected conflict, got {:?}", other.map(|p| p.id)),
    }
    let remove = services.products.remove_last_product(pvz.id).await;
    assert!(matches!(remove, Err(ServiceError::Conflict(_))));

    // Latest reception exists but is closed.
    services.receptions.open_reception(pvz.id).await.unwrap();
    services.receptions.close_reception(pvz.id).await.unwrap();
    let add = services.products.add_product(pvz.id, ProductType::Shoes).await;
    assert!(matches!(add, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn sequence_numbers_are_monotonic_per_reception() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::Moscow)
        .await
        .unwrap();
    services.receptions.open_reception(pvz.id).await.unwrap();

    // Rapid inserts land within clock granularity; seq must still be total.
    let mut seqs = Vec::new();
    for _ in 0..5 {
        let p = services
            .products
            .add_product(pvz.id, ProductType::Clothes)
            .await
            .unwrap();
        seqs.push(p.seq);
    }
    assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn timestamp_ties_are_broken_by_sequence() {
    let app = TestApp::new().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::Kazan)
        .await
        .unwrap();
    let reception = services.receptions.open_reception(pvz.id).await.unwrap();

    // Two products sharing one insertion timestamp, distinguished only by seq.
    let shared_instant = Utc::now();
    let older = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        reception_id: Set(reception.id),
        product_type: Set(ProductType::Electronics),
        date_time: Set(shared_instant),
        seq: Set(1),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();
    let newer = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        reception_id: Set(reception.id),
        product_type: Set(ProductType::Shoes),
        date_time: Set(shared_instant),
        seq: Set(2),
    }
    .insert(&*app.state.db)
    .await
    .unwrap();

    let first_removed = services
        .products
        .remove_last_product(pvz.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first_removed.id, newer.id);

    let second_removed = services
        .products
        .remove_last_product(pvz.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second_removed.id, older.id);
}
