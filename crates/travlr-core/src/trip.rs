use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::{Cursor, CursorField, Sort};
use crate::resource::{Filter, Resource, text_matches};
use crate::validation::{Mode, Validate, ValidationErrors, Validator, lenient, normalize_code};

/// A bookable trip package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    /// Duration in days.
    pub length: i32,
    pub start: DateTime<Utc>,
    pub resort: String,
    pub per_person: f64,
    pub image: String,
    pub description: String,
    pub schema_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDraft {
    pub code: String,
    pub name: String,
    #[serde(deserialize_with = "lenient::days")]
    pub length: i32,
    pub start: DateTime<Utc>,
    pub resort: String,
    #[serde(deserialize_with = "lenient::price")]
    pub per_person: f64,
    pub image: String,
    pub description: String,
}

/// Fields a caller may change. The code is immutable once created.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_days")]
    pub length: Option<i32>,
    pub start: Option<DateTime<Utc>>,
    pub resort: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_price")]
    pub per_person: Option<f64>,
    pub image: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    /// Full-text query over name, description and resort.
    pub search: Option<String>,
}

impl Filter<Trip> for TripFilter {
    fn matches(&self, trip: &Trip) -> bool {
        self.search.as_deref().is_none_or(|q| {
            text_matches(q, &[&trip.name, &trip.description, &trip.resort])
        })
    }
}

impl Validate for TripDraft {
    fn normalize(&mut self) {
        self.code = normalize_code(&self.code);
        self.name = self.name.trim().to_string();
        self.resort = self.resort.trim().to_string();
        self.image = self.image.trim().to_string();
    }

    fn validate(&self, mode: Mode) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.code("code", &self.code)
            .required("name", &self.name, "Trip name is required")
            .length("name", &self.name, 3, 200)
            .at_least("length", self.length, 1)
            .required("resort", &self.resort, "Resort name is required")
            .length("resort", &self.resort, 2, 200)
            .non_negative("perPerson", self.per_person)
            .required("image", &self.image, "Trip image is required")
            .required("description", &self.description, "Trip description is required");

        if mode == Mode::Create {
            let today = Utc::now().date_naive();
            v.check(
                self.start.date_naive() >= today,
                "start",
                "Trip start date must not be in the past",
            );
        }
        v.finish()
    }
}

impl Resource for Trip {
    type Draft = TripDraft;
    type Patch = TripPatch;
    type Filter = TripFilter;

    const NAME: &'static str = "Trip";
    const COLLECTION: &'static str = "trips";
    const SORT: Sort = Sort::desc(CursorField::CreatedAt);

    fn id(&self) -> Uuid {
        self.id
    }

    fn code(&self) -> &str {
        &self.code
    }

    fn cursor(&self, _field: CursorField) -> Cursor {
        Cursor::new(self.created_at)
    }

    fn to_draft(&self) -> TripDraft {
        TripDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            length: self.length,
            start: self.start,
            resort: self.resort.clone(),
            per_person: self.per_person,
            image: self.image.clone(),
            description: self.description.clone(),
        }
    }

    fn merge(draft: &mut TripDraft, patch: TripPatch) {
        if let Some(name) = patch.name {
            draft.name = name;
        }
        if let Some(length) = patch.length {
            draft.length = length;
        }
        if let Some(start) = patch.start {
            draft.start = start;
        }
        if let Some(resort) = patch.resort {
            draft.resort = resort;
        }
        if let Some(per_person) = patch.per_person {
            draft.per_person = per_person;
        }
        if let Some(image) = patch.image {
            draft.image = image;
        }
        if let Some(description) = patch.description {
            draft.description = description;
        }
    }

    fn build(id: Uuid, draft: &TripDraft, now: DateTime<Utc>) -> Self {
        let mut trip = Trip {
            id,
            code: draft.code.clone(),
            name: String::new(),
            length: 0,
            start: draft.start,
            resort: String::new(),
            per_person: 0.0,
            image: String::new(),
            description: String::new(),
            schema_version: 1,
            created_at: now,
            updated_at: now,
        };
        trip.overwrite(draft, now);
        trip
    }

    fn overwrite(&mut self, draft: &TripDraft, now: DateTime<Utc>) {
        self.name = draft.name.clone();
        self.length = draft.length;
        self.start = draft.start;
        self.resort = draft.resort.clone();
        self.per_person = draft.per_person;
        self.image = draft.image.clone();
        self.description = draft.description.clone();
        self.updated_at = now;
    }
}
