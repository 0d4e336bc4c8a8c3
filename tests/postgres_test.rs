mod integration_db;

use integration_db::IntegrationTestDb;
use plateful_server::{
    db::RestaurantStore,
    managers::{
        filter::{build_query, FilterCriteria},
        page::PageRequest,
        restaurant::RestaurantId,
        vote::{UserId, VoteDirection},
    },
};

#[actix_rt::test]
async fn test_pg_filter_query() {
    let db = match IntegrationTestDb::new().await {
        Some(db) => db,
        None => return,
    };
    let store = db.store();

    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[2].hours.get("friday"), Some(&Some("18:00-03:00".to_owned())));

    let query = build_query(&FilterCriteria {
        cuisine: Some("AN".to_owned()),
        price_min: Some(5),
        price_max: Some(2),
        cities: vec!["auckland".to_owned(), "christchurch".to_owned()],
        ..FilterCriteria::default()
    });
    let found = store.find(&query).await.unwrap();
    let ids: Vec<&str> = found.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["r-001", "r-004"]);

    assert!(store
        .find_by_id(&RestaurantId("missing".to_owned()))
        .await
        .unwrap()
        .is_none());

    db.cleanup().await;
}

#[actix_rt::test]
async fn test_pg_conditional_vote_writes() {
    let db = match IntegrationTestDb::new().await {
        Some(db) => db,
        None => return,
    };
    let store = db.store();
    let id = RestaurantId("r-002".to_owned());
    let alice = UserId("alice".to_owned());

    let loaded = store.load_votes(&id).await.unwrap().unwrap();
    let mut votes = loaded.value.clone();
    votes.upvote(&alice);
    assert!(store.save_votes(&id, loaded.version, &votes).await.unwrap());
    assert!(!store.save_votes(&id, loaded.version, &votes).await.unwrap());

    let reloaded = store.load_votes(&id).await.unwrap().unwrap();
    assert_eq!(reloaded.version, loaded.version + 1);
    assert_eq!(reloaded.value.counts().upvotes, 1);

    let page = store
        .find_voted_by(&alice, VoteDirection::Up, PageRequest::clamped(Some(0), Some(1)))
        .await
        .unwrap();
    assert_eq!(page.total_elements, 1);
    assert_eq!(page.content[0].id, id);
    assert_eq!(page.content[0].votes.counts().upvotes, 1);

    db.cleanup().await;
}
