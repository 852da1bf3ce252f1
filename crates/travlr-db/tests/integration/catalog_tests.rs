use chrono::{Duration, Utc};
use travlr_core::AppError;
use travlr_core::meal::{Meal, MealDraft, MealFilter, MealType};
use travlr_core::news::{News, NewsCategory, NewsDraft, NewsFilter};
use travlr_core::pagination::paginate;
use travlr_core::resource::{Resource, ResourceStore};
use travlr_core::room::{Room, RoomDraft, RoomFilter, RoomType};
use travlr_core::user::{NewUser, Role, UserStore};
use uuid::Uuid;

use crate::integration::common::{setup_test_db, tick};

fn room(code: &str, available: bool) -> RoomDraft {
    RoomDraft {
        code: code.into(),
        name: "Deluxe Ocean View".into(),
        room_type: RoomType::Deluxe,
        beds: 2,
        max_occupancy: 4,
        price_per_night: 299.0,
        image: "deluxe-room.jpg".into(),
        description: "Spacious room with ocean view.".into(),
        amenities: vec!["WiFi".into(), "Mini Bar".into()],
        available,
        trip_id: None,
    }
}

fn meal(code: &str, meal_type: MealType, cuisine: &str) -> MealDraft {
    MealDraft {
        code: code.into(),
        name: "Chef's Plate".into(),
        cuisine: cuisine.into(),
        meal_type,
        price: 45.0,
        image: "meal.jpg".into(),
        description: "Fresh local produce.".into(),
        ingredients: vec!["Seafood".into()],
        allergens: vec!["Shellfish".into()],
        vegetarian: false,
        vegan: false,
        gluten_free: false,
        available: true,
        trip_id: None,
    }
}

fn article(code: &str, author: Uuid, published: bool, days_ago: i64) -> NewsDraft {
    NewsDraft {
        code: code.into(),
        title: format!("Article {code}"),
        category: NewsCategory::TravelTips,
        author_id: author,
        author_name: Some("Admin User".into()),
        publish_date: Utc::now() - Duration::days(days_ago),
        image: "news.jpg".into(),
        summary: "Short summary.".into(),
        content: "Longer content body.".into(),
        tags: vec!["tips".into()],
        featured: false,
        published,
        trip_id: None,
    }
}

#[tokio::test]
async fn rooms_round_trip_and_filter_available() {
    let (db, _container) = setup_test_db().await;
    let repo = db.rooms();

    let created = repo.insert(&room("DLX01", true)).await.unwrap();
    assert_eq!(created.room_type, RoomType::Deluxe);
    assert_eq!(created.amenities, vec!["WiFi", "Mini Bar"]);
    tick().await;
    repo.insert(&room("DLX02", false)).await.unwrap();

    let filter = RoomFilter {
        only_available: true,
        ..RoomFilter::default()
    };
    let page = paginate::<Room, _>(&repo, &filter, Room::SORT, 10, None).await.unwrap();
    let codes: Vec<&str> = page.items.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["DLX01"]);

    let all = paginate::<Room, _>(&repo, &RoomFilter::default(), Room::SORT, 10, None)
        .await
        .unwrap();
    assert_eq!(all.items.len(), 2);
}

#[tokio::test]
async fn room_with_unknown_trip_is_rejected() {
    let (db, _container) = setup_test_db().await;
    let mut draft = room("DLX01", true);
    draft.trip_id = Some(Uuid::new_v4());

    let err = db.rooms().insert(&draft).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn meals_filter_by_type_and_cuisine() {
    let (db, _container) = setup_test_db().await;
    let repo = db.meals();

    repo.insert(&meal("MLT01", MealType::Lunch, "Mediterranean"))
        .await
        .unwrap();
    repo.insert(&meal("BRK01", MealType::Breakfast, "International"))
        .await
        .unwrap();
    repo.insert(&meal("MLT02", MealType::Lunch, "Thai")).await.unwrap();

    let filter = MealFilter {
        meal_type: Some(MealType::Lunch),
        cuisine: Some("Mediterranean".into()),
        ..MealFilter::default()
    };
    let page = paginate::<Meal, _>(&repo, &filter, Meal::SORT, 10, None).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].code, "MLT01");
    assert_eq!(page.items[0].allergens, vec!["Shellfish"]);
}

#[tokio::test]
async fn news_sorted_by_publish_date_and_filtered() {
    let (db, _container) = setup_test_db().await;
    let author = db
        .users()
        .insert(&NewUser {
            email: "admin@travlr.com".into(),
            name: "Admin User".into(),
            role: Role::Admin,
            password_hash: "$argon2id$placeholder".into(),
        })
        .await
        .unwrap();

    let repo = db.news();
    // Inserted newest-publish first so creation order and publish order differ.
    repo.insert(&article("NEWS01", author.id, true, 1)).await.unwrap();
    repo.insert(&article("NEWS02", author.id, true, 3)).await.unwrap();
    repo.insert(&article("NEWS03", author.id, true, 2)).await.unwrap();
    repo.insert(&article("DRAFT01", author.id, false, 0)).await.unwrap();

    let published = NewsFilter {
        published: Some(true),
        ..NewsFilter::default()
    };
    let first = paginate::<News, _>(&repo, &published, News::SORT, 2, None).await.unwrap();
    let codes: Vec<&str> = first.items.iter().map(|n| n.code.as_str()).collect();
    assert_eq!(codes, vec!["NEWS01", "NEWS03"]);
    assert!(first.has_more);

    let second = paginate::<News, _>(&repo, &published, News::SORT, 2, first.next_cursor)
        .await
        .unwrap();
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].code, "NEWS02");
    assert!(!second.has_more);

    let everything = paginate::<News, _>(&repo, &NewsFilter::default(), News::SORT, 10, None)
        .await
        .unwrap();
    assert_eq!(everything.items.len(), 4);
    assert_eq!(everything.items[0].code, "DRAFT01");

    let by_category = NewsFilter {
        category: Some(NewsCategory::Events),
        ..NewsFilter::default()
    };
    let none = paginate::<News, _>(&repo, &by_category, News::SORT, 10, None).await.unwrap();
    assert!(none.items.is_empty());
}
