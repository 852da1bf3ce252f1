use chrono::{Duration, TimeZone, Utc};
use travlr_core::AppError;
use travlr_core::analytics::{self, AnalyticsStore, DateRange};
use travlr_core::audit::AuditAction;
use travlr_core::meal::{MealDraft, MealType};
use travlr_core::resource::{ResourceService, ResourceStore};
use travlr_core::room::{RoomDraft, RoomType};
use travlr_core::trip::{Trip, TripDraft, TripPatch};
use travlr_core::user::{NewUser, Role, UserStore};
use travlr_db::{AuditRepository, TripRepository};
use uuid::Uuid;

use crate::integration::common::setup_test_db;

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.into(),
        name: "Test User".into(),
        role: Role::User,
        password_hash: "$argon2id$placeholder".into(),
    }
}

fn trip(code: &str, resort: &str, start: chrono::DateTime<Utc>) -> TripDraft {
    TripDraft {
        code: code.into(),
        name: "Sample Trip".into(),
        length: 4,
        start,
        resort: resort.into(),
        per_person: 799.0,
        image: "reef1.jpg".into(),
        description: "Sed et augue lorem.".into(),
    }
}

#[tokio::test]
async fn users_unique_email_and_lookup() {
    let (db, _container) = setup_test_db().await;
    let users = db.users();

    let created = users.insert(&new_user("user@travlr.com")).await.unwrap();
    assert_eq!(created.role, Role::User);

    let by_email = users.find_by_email("user@travlr.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);
    assert_eq!(by_email.password_hash, "$argon2id$placeholder");

    let by_id = users.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "user@travlr.com");
    assert!(users.find_by_id(Uuid::new_v4()).await.unwrap().is_none());

    let err = users.insert(&new_user("user@travlr.com")).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict { ref field } if field == "email"));
}

#[tokio::test]
async fn service_writes_audit_trail() {
    let (db, _container) = setup_test_db().await;
    let actor = db.users().insert(&new_user("admin@travlr.com")).await.unwrap();
    let service =
        ResourceService::<Trip, TripRepository, AuditRepository>::new(db.trips(), db.audit());

    let start = Utc::now() + Duration::days(10);
    let created = service
        .create(trip("GALR210214", "Emerald Bay", start), Some(actor.id))
        .await
        .unwrap();
    service
        .update(
            "GALR210214",
            TripPatch {
                length: Some(6),
                ..TripPatch::default()
            },
            Some(actor.id),
        )
        .await
        .unwrap();
    service.delete("GALR210214", Some(actor.id)).await.unwrap();

    let history = db.audit().history("trips", created.id).await.unwrap();
    let mut actions: Vec<AuditAction> = history.iter().map(|e| e.action).collect();
    actions.sort_by_key(|a| a.as_str());
    assert_eq!(
        actions,
        vec![AuditAction::Create, AuditAction::Delete, AuditAction::Update]
    );
    assert!(history.iter().all(|e| e.user_id == Some(actor.id)));
}

#[tokio::test]
async fn analytics_match_in_memory_reports() {
    let (db, _container) = setup_test_db().await;

    let trips = db.trips();
    let starts = [
        ("T1", "Blue Lagoon", Utc.with_ymd_and_hms(2030, 3, 2, 0, 0, 0).unwrap()),
        ("T2", "Blue Lagoon", Utc.with_ymd_and_hms(2030, 3, 20, 0, 0, 0).unwrap()),
        ("T3", "Anchor Key", Utc.with_ymd_and_hms(2030, 5, 1, 0, 0, 0).unwrap()),
    ];
    let mut stored_trips = Vec::new();
    for (code, resort, start) in starts {
        let code = format!("{code}AA");
        stored_trips.push(trips.insert(&trip(&code, resort, start)).await.unwrap());
    }

    let rooms = db.rooms();
    let mut stored_rooms = Vec::new();
    for (i, (room_type, available)) in [
        (RoomType::Suite, true),
        (RoomType::Deluxe, false),
        (RoomType::Deluxe, true),
    ]
    .into_iter()
    .enumerate()
    {
        let draft = RoomDraft {
            code: format!("ROOM{i:02}"),
            name: "Sample Room".into(),
            room_type,
            beds: 1,
            max_occupancy: 2,
            price_per_night: 100.0,
            image: "room.jpg".into(),
            description: "A room.".into(),
            amenities: Vec::new(),
            available,
            trip_id: None,
        };
        stored_rooms.push(rooms.insert(&draft).await.unwrap());
    }

    let meals = db.meals();
    let mut stored_meals = Vec::new();
    for (i, (cuisine, price)) in [("Italian", 10.0), ("Italian", 30.0), ("French", 45.0)]
        .into_iter()
        .enumerate()
    {
        let draft = MealDraft {
            code: format!("MEAL{i:02}"),
            name: "Sample Meal".into(),
            cuisine: cuisine.into(),
            meal_type: MealType::Dinner,
            price,
            image: "meal.jpg".into(),
            description: "A meal.".into(),
            ingredients: Vec::new(),
            allergens: Vec::new(),
            vegetarian: false,
            vegan: false,
            gluten_free: false,
            available: true,
            trip_id: None,
        };
        stored_meals.push(meals.insert(&draft).await.unwrap());
    }

    let store = db.analytics();

    let by_resort = store
        .trips_by_resort_month(DateRange::default())
        .await
        .unwrap();
    assert_eq!(
        by_resort,
        analytics::trips_by_resort_month(&stored_trips, DateRange::default())
    );
    assert_eq!(by_resort[0].resort, "Anchor Key");

    let march = DateRange {
        start_date: Some(Utc.with_ymd_and_hms(2030, 3, 1, 0, 0, 0).unwrap()),
        end_date: Some(Utc.with_ymd_and_hms(2030, 3, 31, 0, 0, 0).unwrap()),
    };
    let in_march = store.trips_by_resort_month(march).await.unwrap();
    assert_eq!(in_march.len(), 1);
    assert_eq!(in_march[0].trip_count, 2);

    assert_eq!(
        store.meal_price_stats().await.unwrap(),
        analytics::meal_price_stats(&stored_meals)
    );
    assert_eq!(
        store.room_availability().await.unwrap(),
        analytics::room_availability(&stored_rooms)
    );
}
