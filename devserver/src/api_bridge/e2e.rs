//! Client crate against the live fixture routes on an ephemeral port.

use super::ApiBridge;
use crate::config::Latency;
use crate::generator::{generate, FixtureConfig};
use chrono::Utc;
use hankkicore::api::{ApiClient, ApiConfig, ApiError, RecommendationRequest, RestaurantQuery};
use hankkicore::map::{
    HomeCommand, HomeController, HomeRuntime, HomeSettings, RuntimeOptions, StaticLocation,
};
use hankkicore::model::{BoundingBox, Category, RankingPeriod, ReviewDraft, VisitOutcome};
use hankkicore::session::{Session, UserStore};
use std::net::SocketAddr;
use std::time::Duration;

fn start(latency: Latency) -> (ApiBridge, ApiClient) {
    let bridge = ApiBridge::new(generate(&FixtureConfig::default(), Utc::now()), latency);
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let (bound, server) = bridge.bind(addr, std::future::pending()).unwrap();
    tokio::spawn(server);
    let client = ApiClient::new(&ApiConfig::new(format!("http://{bound}"))).unwrap();
    (bridge, client)
}

fn campus() -> BoundingBox {
    BoundingBox::new(37.2880, 127.0500, 37.2780, 127.0400).unwrap()
}

#[tokio::test]
async fn viewport_listing_matches_bounds_and_category() {
    let (bridge, client) = start(Latency::default());

    let all = client
        .restaurants_in(&RestaurantQuery::new(campus(), None))
        .await
        .unwrap();
    assert!(!all.is_empty());
    assert!(all
        .iter()
        .all(|r| r.position().is_some_and(|p| campus().contains(p))));
    let expected = bridge.with_data(|data| data.list(Some(campus()), None, 1).total_count);
    assert_eq!(all.len() as u32, expected);

    let cafes = client
        .restaurants_in(&RestaurantQuery::new(campus(), Some(Category::Cafe)))
        .await
        .unwrap();
    assert!(cafes.iter().all(|r| r.category == "카페"));
    assert!(cafes.len() < all.len());
}

#[tokio::test]
async fn signed_in_user_reviews_and_visits() {
    let (_bridge, client) = start(Latency::default());
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::restore(UserStore::new(dir.path().join("user.json")));

    let draft = ReviewDraft {
        score: 5,
        comment: "정말 맛있어요 또 올게요".into(),
    };
    let refused = client.submit_review(1, &draft, &session).await.unwrap_err();
    assert!(matches!(refused, ApiError::Validation(_)));

    session.login_with_code(&client, "e2e").await.unwrap();
    assert_eq!(session.user().unwrap().user_login_id, "google-e2e");
    assert!(UserStore::new(dir.path().join("user.json")).load().is_some());

    client.submit_review(1, &draft, &session).await.unwrap();
    let reviews = client.reviews(1).await.unwrap();
    assert_eq!(reviews[0].comment, "정말 맛있어요 또 올게요");

    assert_eq!(client.record_visit(1).await.unwrap(), VisitOutcome::Recorded);
    assert_eq!(
        client.record_visit(1).await.unwrap(),
        VisitOutcome::AlreadyVisitedToday
    );
    let visits = client.my_visits(1).await.unwrap();
    assert_eq!(visits.visits[0].restaurant_id, 1);
    let mine = client.my_reviews(1).await.unwrap();
    assert_eq!(mine.total_count, 1);

    session.logout(&client).await.unwrap();
    assert!(!session.is_logged_in());
    let err = client.current_user().await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
}

#[tokio::test]
async fn rankings_guide_and_recommendation() {
    let (_bridge, client) = start(Latency::default());

    let monthly = client
        .visit_rankings(RankingPeriod::Monthly, None)
        .await
        .unwrap();
    assert!(!monthly.is_empty());
    assert!(monthly
        .windows(2)
        .all(|pair| pair[0].period_visit_count >= pair[1].period_visit_count));

    let guide = client.restaurants(Some(Category::Korean)).await.unwrap();
    assert!(guide.restaurants.iter().all(|r| r.category == "한식"));
    assert_eq!(guide.current_page, 1);

    let request = RecommendationRequest::new("술 한잔하면서 안주를 먹고 싶어요", None).unwrap();
    let picks = client.recommend(&request).await.unwrap();
    assert!(!picks.is_empty());
    assert!(picks.iter().all(|p| p.summary.category == "주점"));

    let err = client.restaurant(9_999).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn map_runtime_settles_on_latest_viewport() {
    let latency = Latency {
        base: Duration::from_millis(20),
        jitter: Duration::from_millis(60),
    };
    let (_bridge, client) = start(latency);
    let settings = HomeSettings {
        debounce_ms: 50,
        ..Default::default()
    };
    let (handle, task) = HomeRuntime::spawn(
        HomeController::new(&settings),
        client,
        StaticLocation::Unavailable,
        RuntimeOptions::default(),
    );

    let wide = BoundingBox::new(37.30, 127.07, 37.26, 127.02).unwrap();
    handle.send(HomeCommand::BoundsChanged(wide));
    handle.send(HomeCommand::BoundsChanged(campus()));

    let mut snapshots = handle.subscribe();
    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let snapshot = snapshots.borrow_and_update();
                if snapshot.metrics.applied == 1 && !snapshot.loading {
                    return snapshot.clone();
                }
            }
            if snapshots.changed().await.is_err() {
                panic!("runtime stopped");
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(settled.metrics.issued, 1);
    assert_eq!(settled.viewport.bounds, Some(campus()));
    assert!(settled
        .restaurants
        .iter()
        .all(|r| r.position().is_some_and(|p| campus().contains(p))));

    handle.send(HomeCommand::Shutdown);
    task.await.unwrap();
}
