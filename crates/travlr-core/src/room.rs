use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::{Cursor, CursorField, Sort};
use crate::resource::{Filter, Resource, text_matches};
use crate::validation::{Mode, Validate, ValidationErrors, Validator, lenient, normalize_code};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Single,
    Double,
    Twin,
    Suite,
    Deluxe,
    Family,
}

impl RoomType {
    pub const ALL: [RoomType; 6] = [
        RoomType::Single,
        RoomType::Double,
        RoomType::Twin,
        RoomType::Suite,
        RoomType::Deluxe,
        RoomType::Family,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "Single",
            RoomType::Double => "Double",
            RoomType::Twin => "Twin",
            RoomType::Suite => "Suite",
            RoomType::Deluxe => "Deluxe",
            RoomType::Family => "Family",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown room type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub beds: i32,
    pub max_occupancy: i32,
    pub price_per_night: f64,
    pub image: String,
    pub description: String,
    pub amenities: Vec<String>,
    pub available: bool,
    pub trip_id: Option<Uuid>,
    pub schema_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDraft {
    pub code: String,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub beds: i32,
    pub max_occupancy: i32,
    #[serde(deserialize_with = "lenient::price")]
    pub price_per_night: f64,
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub trip_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
    pub beds: Option<i32>,
    pub max_occupancy: Option<i32>,
    #[serde(default, deserialize_with = "lenient::optional_price")]
    pub price_per_night: Option<f64>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub available: Option<bool>,
    pub trip_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    /// Full-text query over name, description and amenities.
    pub search: Option<String>,
    pub only_available: bool,
}

impl Filter<Room> for RoomFilter {
    fn matches(&self, room: &Room) -> bool {
        if self.only_available && !room.available {
            return false;
        }
        self.search.as_deref().is_none_or(|q| {
            let amenities = room.amenities.join(" ");
            text_matches(q, &[&room.name, &room.description, &amenities])
        })
    }
}

impl Validate for RoomDraft {
    fn normalize(&mut self) {
        self.code = normalize_code(&self.code);
        self.name = self.name.trim().to_string();
        self.image = self.image.trim().to_string();
        self.amenities = self
            .amenities
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
    }

    fn validate(&self, _mode: Mode) -> Result<(), ValidationErrors> {
        Validator::new()
            .code("code", &self.code)
            .required("name", &self.name, "Room name is required")
            .length("name", &self.name, 3, 200)
            .at_least("beds", self.beds, 1)
            .at_least("maxOccupancy", self.max_occupancy, 1)
            .check(
                self.max_occupancy >= self.beds,
                "maxOccupancy",
                "Max occupancy must be greater than or equal to number of beds",
            )
            .non_negative("pricePerNight", self.price_per_night)
            .required("image", &self.image, "Room image is required")
            .required("description", &self.description, "Room description is required")
            .finish()
    }
}

impl Resource for Room {
    type Draft = RoomDraft;
    type Patch = RoomPatch;
    type Filter = RoomFilter;

    const NAME: &'static str = "Room";
    const COLLECTION: &'static str = "rooms";
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

    fn to_draft(&self) -> RoomDraft {
        RoomDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            room_type: self.room_type,
            beds: self.beds,
            max_occupancy: self.max_occupancy,
            price_per_night: self.price_per_night,
            image: self.image.clone(),
            description: self.description.clone(),
            amenities: self.amenities.clone(),
            available: self.available,
            trip_id: self.trip_id,
        }
    }

    fn merge(draft: &mut RoomDraft, patch: RoomPatch) {
        if let Some(name) = patch.name {
            draft.name = name;
        }
        if let Some(room_type) = patch.room_type {
            draft.room_type = room_type;
        }
        if let Some(beds) = patch.beds {
            draft.beds = beds;
        }
        if let Some(max_occupancy) = patch.max_occupancy {
            draft.max_occupancy = max_occupancy;
        }
        if let Some(price) = patch.price_per_night {
            draft.price_per_night = price;
        }
        if let Some(image) = patch.image {
            draft.image = image;
        }
        if let Some(description) = patch.description {
            draft.description = description;
        }
        if let Some(amenities) = patch.amenities {
            draft.amenities = amenities;
        }
        if let Some(available) = patch.available {
            draft.available = available;
        }
        if patch.trip_id.is_some() {
            draft.trip_id = patch.trip_id;
        }
    }

    fn build(id: Uuid, draft: &RoomDraft, now: DateTime<Utc>) -> Self {
        let mut room = Room {
            id,
            code: draft.code.clone(),
            name: String::new(),
            room_type: draft.room_type,
            beds: 0,
            max_occupancy: 0,
            price_per_night: 0.0,
            image: String::new(),
            description: String::new(),
            amenities: Vec::new(),
            available: true,
            trip_id: None,
            schema_version: 1,
            created_at: now,
            updated_at: now,
        };
        room.overwrite(draft, now);
        room
    }

    fn overwrite(&mut self, draft: &RoomDraft, now: DateTime<Utc>) {
        self.name = draft.name.clone();
        self.room_type = draft.room_type;
        self.beds = draft.beds;
        self.max_occupancy = draft.max_occupancy;
        self.price_per_night = draft.price_per_night;
        self.image = draft.image.clone();
        self.description = draft.description.clone();
        self.amenities = draft.amenities.clone();
        self.available = draft.available;
        self.trip_id = draft.trip_id;
        self.updated_at = now;
    }
}
