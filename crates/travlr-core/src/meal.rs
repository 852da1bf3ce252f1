use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pagination::{Cursor, CursorField, Sort};
use crate::resource::{Filter, Resource, text_matches};
use crate::validation::{Mode, Validate, ValidationErrors, Validator, lenient, normalize_code};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Dessert,
}

impl MealType {
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::Dessert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
            MealType::Dessert => "Dessert",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown meal type: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub cuisine: String,
    pub meal_type: MealType,
    pub price: f64,
    pub image: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub allergens: Vec<String>,
    pub vegetarian: bool,
    pub vegan: bool,
    pub gluten_free: bool,
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
pub struct MealDraft {
    pub code: String,
    pub name: String,
    pub cuisine: String,
    pub meal_type: MealType,
    #[serde(deserialize_with = "lenient::price")]
    pub price: f64,
    pub image: String,
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default)]
    pub vegan: bool,
    #[serde(default)]
    pub gluten_free: bool,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub trip_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPatch {
    pub name: Option<String>,
    pub cuisine: Option<String>,
    pub meal_type: Option<MealType>,
    #[serde(default, deserialize_with = "lenient::optional_price")]
    pub price: Option<f64>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub allergens: Option<Vec<String>>,
    pub vegetarian: Option<bool>,
    pub vegan: Option<bool>,
    pub gluten_free: Option<bool>,
    pub available: Option<bool>,
    pub trip_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct MealFilter {
    /// Full-text query over name, description and ingredients.
    pub search: Option<String>,
    pub only_available: bool,
    pub meal_type: Option<MealType>,
    /// Exact cuisine name.
    pub cuisine: Option<String>,
}

impl Filter<Meal> for MealFilter {
    fn matches(&self, meal: &Meal) -> bool {
        if self.only_available && !meal.available {
            return false;
        }
        if self.meal_type.is_some_and(|t| t != meal.meal_type) {
            return false;
        }
        if self.cuisine.as_deref().is_some_and(|c| c != meal.cuisine) {
            return false;
        }
        self.search.as_deref().is_none_or(|q| {
            let ingredients = meal.ingredients.join(" ");
            text_matches(q, &[&meal.name, &meal.description, &ingredients])
        })
    }
}

fn trimmed_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Validate for MealDraft {
    fn normalize(&mut self) {
        self.code = normalize_code(&self.code);
        self.name = self.name.trim().to_string();
        self.cuisine = self.cuisine.trim().to_string();
        self.image = self.image.trim().to_string();
        self.ingredients = trimmed_list(&self.ingredients);
        self.allergens = trimmed_list(&self.allergens);
    }

    fn validate(&self, _mode: Mode) -> Result<(), ValidationErrors> {
        Validator::new()
            .code("code", &self.code)
            .required("name", &self.name, "Meal name is required")
            .length("name", &self.name, 3, 200)
            .required("cuisine", &self.cuisine, "Cuisine type is required")
            .non_negative("price", self.price)
            .required("image", &self.image, "Meal image is required")
            .required("description", &self.description, "Meal description is required")
            .check(
                !self.vegan || self.vegetarian,
                "vegan",
                "Vegan meals must also be marked as vegetarian",
            )
            .finish()
    }
}

impl Resource for Meal {
    type Draft = MealDraft;
    type Patch = MealPatch;
    type Filter = MealFilter;

    const NAME: &'static str = "Meal";
    const COLLECTION: &'static str = "meals";
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

    fn to_draft(&self) -> MealDraft {
        MealDraft {
            code: self.code.clone(),
            name: self.name.clone(),
            cuisine: self.cuisine.clone(),
            meal_type: self.meal_type,
            price: self.price,
            image: self.image.clone(),
            description: self.description.clone(),
            ingredients: self.ingredients.clone(),
            allergens: self.allergens.clone(),
            vegetarian: self.vegetarian,
            vegan: self.vegan,
            gluten_free: self.gluten_free,
            available: self.available,
            trip_id: self.trip_id,
        }
    }

    fn merge(draft: &mut MealDraft, patch: MealPatch) {
        if let Some(name) = patch.name {
            draft.name = name;
        }
        if let Some(cuisine) = patch.cuisine {
            draft.cuisine = cuisine;
        }
        if let Some(meal_type) = patch.meal_type {
            draft.meal_type = meal_type;
        }
        if let Some(price) = patch.price {
            draft.price = price;
        }
        if let Some(image) = patch.image {
            draft.image = image;
        }
        if let Some(description) = patch.description {
            draft.description = description;
        }
        if let Some(ingredients) = patch.ingredients {
            draft.ingredients = ingredients;
        }
        if let Some(allergens) = patch.allergens {
            draft.allergens = allergens;
        }
        if let Some(vegetarian) = patch.vegetarian {
            draft.vegetarian = vegetarian;
        }
        if let Some(vegan) = patch.vegan {
            draft.vegan = vegan;
        }
        if let Some(gluten_free) = patch.gluten_free {
            draft.gluten_free = gluten_free;
        }
        if let Some(available) = patch.available {
            draft.available = available;
        }
        if patch.trip_id.is_some() {
            draft.trip_id = patch.trip_id;
        }
    }

    fn build(id: Uuid, draft: &MealDraft, now: DateTime<Utc>) -> Self {
        let mut meal = Meal {
            id,
            code: draft.code.clone(),
            name: String::new(),
            cuisine: String::new(),
            meal_type: draft.meal_type,
            price: 0.0,
            image: String::new(),
            description: String::new(),
            ingredients: Vec::new(),
            allergens: Vec::new(),
            vegetarian: false,
            vegan: false,
            gluten_free: false,
            available: true,
            trip_id: None,
            schema_version: 1,
            created_at: now,
            updated_at: now,
        };
        meal.overwrite(draft, now);
        meal
    }

    fn overwrite(&mut self, draft: &MealDraft, now: DateTime<Utc>) {
        self.name = draft.name.clone();
        self.cuisine = draft.cuisine.clone();
        self.meal_type = draft.meal_type;
        self.price = draft.price;
        self.image = draft.image.clone();
        self.description = draft.description.clone();
        self.ingredients = draft.ingredients.clone();
        self.allergens = draft.allergens.clone();
        self.vegetarian = draft.vegetarian;
        self.vegan = draft.vegan;
        self.gluten_free = draft.gluten_free;
        self.available = draft.available;
        self.trip_id = draft.trip_id;
        self.updated_at = now;
    }
}
