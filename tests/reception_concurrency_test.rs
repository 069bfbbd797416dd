mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::TestApp;
use pvz_api::entities::{reception, City, ReceptionStatus};
use pvz_api::errors::ServiceError;

/// Two tasks race to open the first reception for the same pickup point on
/// separate pooled connections. Exactly one insert may win; the partial
/// unique index turns the loser into a conflict.
#[tokio::test]
async fn concurrent_opens_admit_exactly_one_reception() {
    let app = TestApp::new_with_pool().await;
    let pvz = app
        .state
        .services
        .pickup_points
        .create_pickup_point(City::Moscow)
        .await
        .unwrap();

    let left = app.state.services.receptions.clone();
    let right = app.state.services.receptions.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { left.open_reception(pvz.id).await }),
        tokio::spawn(async move { right.open_reception(pvz.id).await }),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let wins = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one open must succeed");
    let loser = outcomes
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one open must lose");
    assert!(
        matches!(loser, ServiceError::Conflict(_)),
        "loser must see a conflict, got {}",
        loser
    );

    let open_rows = reception::Entity::find()
        .filter(reception::Column::PvzId.eq(pvz.id))
        .filter(reception::Column::Status.eq(ReceptionStatus::Open))
        .count(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(open_rows, 1);
}

/// The invariant holds under repeated racing across full open/close cycles.
#[tokio::test]
async fn open_close_cycles_never_leave_two_open_rows() {
    let app = TestApp::new_with_pool().await;
    let services = &app.state.services;
    let pvz = services
        .pickup_points
        .create_pickup_point(City::Kazan)
        .await
        .unwrap();

    for _ in 0..3 {
        let left = services.receptions.clone();
        let right = services.receptions.clone();
        let (a, b) = tokio::join!(
            tokio::spawn(async move { left.open_reception(pvz.id).await }),
            tokio::spawn(async move { right.open_reception(pvz.id).await }),
        );
        let wins = [a.unwrap(), b.unwrap()]
            .iter()
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(wins, 1);

        let open_rows = reception::Entity::find()
            .filter(reception::Column::PvzId.eq(pvz.id))
            .filter(reception::Column::Status.eq(ReceptionStatus::Open))
            .count(&*app.state.db)
            .await
            .unwrap();
        assert_eq!(open_rows, 1);

        services.receptions.close_reception(pvz.id).await.unwrap();
    }
}
