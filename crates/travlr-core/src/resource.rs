//! Generic CRUD + list service shared by trips, rooms, meals, and news.

use std::future::Future;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::audit::{AuditAction, AuditSink, NewAuditEntry};
use crate::error::AppError;
use crate::pagination::{Cursor, CursorField, Page, PageRequest, Sort, Window, paginate};
use crate::validation::{Mode, Validate, normalize_code};

/// A catalog entity addressed by a unique, upper-cased `code`.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Full payload for creation; also the merged shape validated on update.
    type Draft: Validate + Clone + Send + Sync;
    /// Partial payload for update. Absent fields keep their current value.
    type Patch: Send + Sync;
    type Filter: Filter<Self>;

    /// Human-readable name used in "not found" messages.
    const NAME: &'static str;
    /// Collection/table name recorded in the audit log.
    const COLLECTION: &'static str;
    /// Default list order; its field is the cursor field.
    const SORT: Sort;

    fn id(&self) -> Uuid;

    fn code(&self) -> &str;

    /// Value of `field` for this item, used as a page cursor.
    fn cursor(&self, field: CursorField) -> Cursor;

    /// Current state as a draft, the starting point for applying a patch.
    fn to_draft(&self) -> Self::Draft;

    fn merge(draft: &mut Self::Draft, patch: Self::Patch);

    /// Materialize a validated draft into a new record.
    fn build(id: Uuid, draft: &Self::Draft, now: DateTime<Utc>) -> Self;

    /// Overwrite every mutable field with `draft` (code and id are kept).
    fn overwrite(&mut self, draft: &Self::Draft, now: DateTime<Utc>);
}

/// List filter evaluated by the store. `matches` is the in-memory
/// definition the SQL implementations mirror.
pub trait Filter<R>: Default + Send + Sync {
    fn matches(&self, item: &R) -> bool;
}

/// Persistence for one resource type.
pub trait ResourceStore<R: Resource>: Send + Sync + Clone {
    /// Rows matching `filter` and `window.predicate`, ordered by
    /// `window.sort`, at most `window.fetch_limit` of them.
    fn fetch_window(
        &self,
        filter: &R::Filter,
        window: &Window,
    ) -> impl Future<Output = Result<Vec<R>, AppError>> + Send;

    fn find_by_code(&self, code: &str) -> impl Future<Output = Result<Option<R>, AppError>> + Send;

    /// Insert a new record. A duplicate code is `AppError::Conflict`.
    fn insert(&self, draft: &R::Draft) -> impl Future<Output = Result<R, AppError>> + Send;

    fn update(
        &self,
        code: &str,
        draft: &R::Draft,
    ) -> impl Future<Output = Result<Option<R>, AppError>> + Send;

    fn delete(&self, code: &str) -> impl Future<Output = Result<Option<R>, AppError>> + Send;
}

/// Business operations over a [`ResourceStore`], with validation before
/// every write and an audit entry after it.
pub struct ResourceService<R, S, A> {
    store: S,
    audit: A,
    _resource: PhantomData<fn() -> R>,
}

impl<R, S, A> Clone for ResourceService<R, S, A>
where
    S: Clone,
    A: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            audit: self.audit.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R, S, A> ResourceService<R, S, A>
where
    R: Resource,
    S: ResourceStore<R>,
    A: AuditSink,
{
    pub fn new(store: S, audit: A) -> Self {
        Self {
            store,
            audit,
            _resource: PhantomData,
        }
    }

    pub async fn list(&self, filter: &R::Filter, request: PageRequest) -> Result<Page<R>, AppError> {
        paginate(&self.store, filter, R::SORT, request.limit(), request.cursor).await
    }

    pub async fn get_by_code(&self, code: &str) -> Result<R, AppError> {
        self.store
            .find_by_code(&normalize_code(code))
            .await?
            .ok_or(AppError::NotFound(R::NAME))
    }

    pub async fn create(&self, mut draft: R::Draft, actor: Option<Uuid>) -> Result<R, AppError> {
        draft.normalize();
        draft.validate(Mode::Create)?;

        let created = self.store.insert(&draft).await?;
        tracing::info!(resource = R::COLLECTION, code = created.code(), "Created");

        self.record(AuditAction::Create, &created, actor).await;
        Ok(created)
    }

    pub async fn update(
        &self,
        code: &str,
        patch: R::Patch,
        actor: Option<Uuid>,
    ) -> Result<R, AppError> {
        let current = self.get_by_code(code).await?;

        let mut draft = current.to_draft();
        R::merge(&mut draft, patch);
        draft.normalize();
        draft.validate(Mode::Update)?;

        let updated = self
            .store
            .update(current.code(), &draft)
            .await?
            .ok_or(AppError::NotFound(R::NAME))?;
        tracing::info!(resource = R::COLLECTION, code = updated.code(), "Updated");

        self.record(AuditAction::Update, &updated, actor).await;
        Ok(updated)
    }

    pub async fn delete(&self, code: &str, actor: Option<Uuid>) -> Result<R, AppError> {
        let deleted = self
            .store
            .delete(&normalize_code(code))
            .await?
            .ok_or(AppError::NotFound(R::NAME))?;
        tracing::info!(resource = R::COLLECTION, code = deleted.code(), "Deleted");

        self.record(AuditAction::Delete, &deleted, actor).await;
        Ok(deleted)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Audit failures never fail the operation that triggered them.
    async fn record(&self, action: AuditAction, item: &R, actor: Option<Uuid>) {
        let entry = NewAuditEntry {
            collection: R::COLLECTION,
            document_id: item.id(),
            action,
            user_id: actor,
        };
        if let Err(e) = self.audit.record(&entry).await {
            tracing::warn!(error = %e, resource = R::COLLECTION, "Failed to write audit entry");
        }
    }
}

/// Every whitespace-separated term of `query` occurs (case-insensitively) in
/// at least one of `fields`. Empty queries match everything.
pub fn text_matches(query: &str, fields: &[&str]) -> bool {
    let haystacks: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .all(|term| haystacks.iter().any(|h| h.contains(&term)))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::testutil::{MemoryAudit, MemoryStore, sample_trip};
    use crate::trip::{Trip, TripDraft, TripFilter, TripPatch};

    fn draft(code: &str) -> TripDraft {
        TripDraft {
            code: code.to_string(),
            name: "Gale Reef".into(),
            length: 4,
            start: Utc::now() + Duration::days(30),
            resort: "Emerald Bay, 3 stars".into(),
            per_person: 799.0,
            image: "reef1.jpg".into(),
            description: "Sed et augue lorem. In sit amet placerat arcu.".into(),
        }
    }

    fn service(
        store: MemoryStore<Trip>,
        audit: MemoryAudit,
    ) -> ResourceService<Trip, MemoryStore<Trip>, MemoryAudit> {
        ResourceService::new(store, audit)
    }

    #[tokio::test]
    async fn test_paging_25_trips_in_pages_of_10() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let trips: Vec<Trip> = (0..25)
            .map(|i| sample_trip(i, base + Duration::minutes(i as i64)))
            .collect();
        let svc = service(MemoryStore::with_items(trips), MemoryAudit::default());
        let filter = TripFilter::default();

        let first = svc
            .list(&filter, PageRequest::new(Some(10), None))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 10);
        assert!(first.has_more);
        // newest first
        assert_eq!(first.items[0].code, "TRIP024");

        let second = svc
            .list(&filter, PageRequest::new(Some(10), first.next_cursor))
            .await
            .unwrap();
        assert_eq!(second.items.len(), 10);
        assert!(second.has_more);

        let third = svc
            .list(&filter, PageRequest::new(Some(10), second.next_cursor))
            .await
            .unwrap();
        assert_eq!(third.items.len(), 5);
        assert!(!third.has_more);
        assert_eq!(third.next_cursor, None);

        let mut codes: Vec<String> = first
            .items
            .iter()
            .chain(&second.items)
            .chain(&third.items)
            .map(|t| t.code.clone())
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 25);
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let svc = service(MemoryStore::empty(), MemoryAudit::default());
        let page = svc
            .list(&TripFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page, Page::empty());
    }

    #[tokio::test]
    async fn test_list_applies_search_filter() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut reef = sample_trip(1, base);
        reef.name = "Gale Reef".into();
        let mut bay = sample_trip(2, base + Duration::minutes(1));
        bay.name = "Dawson's Bay".into();
        let svc = service(
            MemoryStore::with_items(vec![reef, bay]),
            MemoryAudit::default(),
        );

        let filter = TripFilter {
            search: Some("reef".into()),
        };
        let page = svc.list(&filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "Gale Reef");
    }

    #[tokio::test]
    async fn test_create_normalizes_code_and_audits() {
        let audit = MemoryAudit::default();
        let svc = service(MemoryStore::empty(), audit.clone());
        let actor = Uuid::new_v4();

        let trip = svc.create(draft(" galr210214 "), Some(actor)).await.unwrap();
        assert_eq!(trip.code, "GALR210214");

        let entries = audit.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].collection, "trips");
        assert_eq!(entries[0].action, AuditAction::Create);
        assert_eq!(entries[0].document_id, trip.id);
        assert_eq!(entries[0].user_id, Some(actor));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft_before_store() {
        let store = MemoryStore::empty();
        let svc = service(store.clone(), MemoryAudit::default());

        let mut bad = draft("GALR210214");
        bad.name = String::new();
        bad.per_person = -5.0;

        match svc.create(bad, None).await {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.has("name"));
                assert!(errors.has("perPerson"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_code_conflicts() {
        let svc = service(MemoryStore::empty(), MemoryAudit::default());
        svc.create(draft("GALR210214"), None).await.unwrap();

        let err = svc.create(draft("galr210214"), None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { ref field } if field == "code"));
    }

    #[tokio::test]
    async fn test_get_by_code_is_case_insensitive_and_reports_missing() {
        let svc = service(MemoryStore::empty(), MemoryAudit::default());
        svc.create(draft("GALR210214"), None).await.unwrap();

        assert!(svc.get_by_code("galr210214").await.is_ok());
        let err = svc.get_by_code("NOPE").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Trip")));
    }

    #[tokio::test]
    async fn test_update_merges_patch_and_revalidates() {
        let audit = MemoryAudit::default();
        let svc = service(MemoryStore::empty(), audit.clone());
        let created = svc.create(draft("GALR210214"), None).await.unwrap();

        let patch = TripPatch {
            per_person: Some(899.0),
            ..TripPatch::default()
        };
        let updated = svc.update("GALR210214", patch, None).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.per_person, 899.0);
        assert_eq!(updated.name, created.name);

        let bad = TripPatch {
            length: Some(0),
            ..TripPatch::default()
        };
        let err = svc.update("GALR210214", bad, None).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let actions: Vec<AuditAction> = audit.entries().iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![AuditAction::Create, AuditAction::Update]);
    }

    #[tokio::test]
    async fn test_update_allows_past_start_on_existing_trip() {
        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let svc = service(
            MemoryStore::with_items(vec![sample_trip(1, base)]),
            MemoryAudit::default(),
        );

        let patch = TripPatch {
            name: Some("Renamed Trip".into()),
            ..TripPatch::default()
        };
        let updated = svc.update("TRIP001", patch, None).await.unwrap();
        assert_eq!(updated.name, "Renamed Trip");
    }

    #[tokio::test]
    async fn test_delete_returns_removed_item() {
        let svc = service(MemoryStore::empty(), MemoryAudit::default());
        svc.create(draft("GALR210214"), None).await.unwrap();

        let deleted = svc.delete("GALR210214", None).await.unwrap();
        assert_eq!(deleted.code, "GALR210214");
        assert!(matches!(
            svc.delete("GALR210214", None).await,
            Err(AppError::NotFound("Trip"))
        ));
    }

    #[tokio::test]
    async fn test_audit_failure_does_not_fail_write() {
        let svc = service(MemoryStore::empty(), MemoryAudit::failing());
        assert!(svc.create(draft("GALR210214"), None).await.is_ok());
    }

    #[test]
    fn test_text_matches_all_terms() {
        assert!(text_matches("gale reef", &["Gale Reef", "Emerald Bay"]));
        assert!(text_matches("reef emerald", &["Gale Reef", "Emerald Bay"]));
        assert!(!text_matches("reef claire", &["Gale Reef", "Emerald Bay"]));
        assert!(text_matches("", &["anything"]));
    }
}
