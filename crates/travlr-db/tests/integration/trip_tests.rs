use chrono::{Duration, Utc};
use travlr_core::AppError;
use travlr_core::audit::NullAudit;
use travlr_core::pagination::PageRequest;
use travlr_core::resource::{ResourceService, ResourceStore};
use travlr_core::trip::{Trip, TripDraft, TripFilter, TripPatch};
use travlr_db::TripRepository;

use crate::integration::common::{setup_test_db, tick};

fn draft(code: &str, name: &str) -> TripDraft {
    TripDraft {
        code: code.into(),
        name: name.into(),
        length: 4,
        start: Utc::now() + Duration::days(30),
        resort: "Emerald Bay, 3 stars".into(),
        per_person: 799.0,
        image: "reef1.jpg".into(),
        description: "Sed et augue lorem. In sit amet placerat arcu.".into(),
    }
}

#[tokio::test]
async fn insert_find_update_delete() {
    let (db, _container) = setup_test_db().await;
    let repo = db.trips();

    let created = repo.insert(&draft("GALR210214", "Gale Reef")).await.unwrap();
    assert_eq!(created.code, "GALR210214");
    assert_eq!(created.schema_version, 1);

    let found = repo.find_by_code("GALR210214").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.per_person, 799.0);

    let mut changed = draft("GALR210214", "Gale Reef Deluxe");
    changed.per_person = 999.5;
    let updated = repo.update("GALR210214", &changed).await.unwrap().unwrap();
    assert_eq!(updated.name, "Gale Reef Deluxe");
    assert_eq!(updated.per_person, 999.5);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.created_at, created.created_at);

    let deleted = repo.delete("GALR210214").await.unwrap().unwrap();
    assert_eq!(deleted.id, created.id);
    assert!(repo.find_by_code("GALR210214").await.unwrap().is_none());
    assert!(repo.delete("GALR210214").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_code_is_conflict() {
    let (db, _container) = setup_test_db().await;
    let repo = db.trips();

    repo.insert(&draft("GALR210214", "Gale Reef")).await.unwrap();
    let err = repo
        .insert(&draft("GALR210214", "Another Reef"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict { ref field } if field == "code"));
}

#[tokio::test]
async fn pages_through_25_trips() {
    let (db, _container) = setup_test_db().await;
    let service = ResourceService::<Trip, TripRepository, NullAudit>::new(db.trips(), NullAudit);

    for i in 0..25 {
        service
            .create(draft(&format!("TRIP{i:03}"), &format!("Trip number {i}")), None)
            .await
            .unwrap();
        tick().await;
    }

    let filter = TripFilter::default();
    let mut seen = Vec::new();
    let mut sizes = Vec::new();
    let mut cursor = None;
    loop {
        let page = service
            .list(&filter, PageRequest::new(Some(10), cursor))
            .await
            .unwrap();
        sizes.push(page.items.len());
        seen.extend(page.items.into_iter().map(|t| t.code));
        if !page.has_more {
            assert!(page.next_cursor.is_none());
            break;
        }
        cursor = page.next_cursor;
    }

    assert_eq!(sizes, vec![10, 10, 5]);
    let expected: Vec<String> = (0..25).rev().map(|i| format!("TRIP{i:03}")).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn cursor_round_trips_through_text() {
    let (db, _container) = setup_test_db().await;
    let service = ResourceService::<Trip, TripRepository, NullAudit>::new(db.trips(), NullAudit);

    for i in 0..3 {
        service
            .create(draft(&format!("TRIP{i:03}"), "Round Trip"), None)
            .await
            .unwrap();
        tick().await;
    }

    let first = service
        .list(&TripFilter::default(), PageRequest::new(Some(1), None))
        .await
        .unwrap();
    let text = first.next_cursor.unwrap().to_string();

    let second = service
        .list(
            &TripFilter::default(),
            PageRequest::new(Some(1), Some(text.parse().unwrap())),
        )
        .await
        .unwrap();
    assert_eq!(second.items[0].code, "TRIP001");
}

#[tokio::test]
async fn full_text_search() {
    let (db, _container) = setup_test_db().await;
    let repo = db.trips();

    repo.insert(&draft("REEF01", "Gale Reef")).await.unwrap();
    let mut bay = draft("BAY01", "Dawson's Bay");
    bay.resort = "Blue Lagoon, 4 stars".into();
    bay.description = "Sunsets over the lagoon.".into();
    repo.insert(&bay).await.unwrap();

    let service = ResourceService::<Trip, TripRepository, NullAudit>::new(repo, NullAudit);
    let filter = TripFilter {
        search: Some("lagoon".into()),
    };
    let page = service.list(&filter, PageRequest::default()).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].code, "BAY01");
}

#[tokio::test]
async fn update_through_service_keeps_code() {
    let (db, _container) = setup_test_db().await;
    let service = ResourceService::<Trip, TripRepository, NullAudit>::new(db.trips(), NullAudit);

    service.create(draft("galr210214", "Gale Reef"), None).await.unwrap();
    let patch = TripPatch {
        resort: Some("Coral Sands".into()),
        ..TripPatch::default()
    };
    let updated = service.update("GALR210214", patch, None).await.unwrap();
    assert_eq!(updated.code, "GALR210214");
    assert_eq!(updated.resort, "Coral Sands");
}
