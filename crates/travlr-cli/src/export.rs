//! Dump a whole collection as JSON or CSV by walking every page.

use std::io::Write;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use travlr_core::meal::Meal;
use travlr_core::news::News;
use travlr_core::pagination::MAX_LIMIT;
use travlr_core::room::Room;
use travlr_core::trip::Trip;
use travlr_core::{Resource, ResourceStore, paginate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Trips,
    Rooms,
    Meals,
    News,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Csv,
}

/// Flat rendering for CSV output. List fields are joined with `;`.
pub trait CsvRow {
    const HEADERS: &'static [&'static str];

    fn row(&self) -> Vec<String>;
}

/// Every item in `store`, in the collection's default order.
pub async fn collect_all<R, S>(store: &S) -> Result<Vec<R>>
where
    R: Resource,
    S: ResourceStore<R>,
{
    let filter = R::Filter::default();
    let mut items = Vec::new();
    let mut cursor = None;

    loop {
        let page = paginate::<R, S>(store, &filter, R::SORT, MAX_LIMIT, cursor).await?;
        tracing::debug!(resource = R::COLLECTION, count = page.items.len(), "Fetched page");
        items.extend(page.items);
        match page.next_cursor {
            Some(next) if page.has_more => cursor = Some(next),
            _ => break,
        }
    }

    Ok(items)
}

pub fn write_items<T, W>(items: &[T], format: Format, out: W) -> Result<()>
where
    T: Serialize + CsvRow,
    W: Write,
{
    match format {
        Format::Json => {
            let mut out = out;
            serde_json::to_writer_pretty(&mut out, items)?;
            writeln!(out)?;
        }
        Format::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            writer.write_record(T::HEADERS)?;
            for item in items {
                writer.write_record(item.row())?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn list(values: &[String]) -> String {
    values.join(";")
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl CsvRow for Trip {
    const HEADERS: &'static [&'static str] = &[
        "code",
        "name",
        "length",
        "start",
        "resort",
        "perPerson",
        "image",
        "description",
        "createdAt",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.length.to_string(),
            self.start.to_rfc3339(),
            self.resort.clone(),
            format!("{:.2}", self.per_person),
            self.image.clone(),
            self.description.clone(),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for Room {
    const HEADERS: &'static [&'static str] = &[
        "code",
        "name",
        "type",
        "beds",
        "maxOccupancy",
        "pricePerNight",
        "amenities",
        "available",
        "tripId",
        "createdAt",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.room_type.to_string(),
            self.beds.to_string(),
            self.max_occupancy.to_string(),
            format!("{:.2}", self.price_per_night),
            list(&self.amenities),
            self.available.to_string(),
            optional(self.trip_id),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for Meal {
    const HEADERS: &'static [&'static str] = &[
        "code",
        "name",
        "cuisine",
        "mealType",
        "price",
        "ingredients",
        "allergens",
        "vegetarian",
        "vegan",
        "glutenFree",
        "available",
        "tripId",
        "createdAt",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.name.clone(),
            self.cuisine.clone(),
            self.meal_type.to_string(),
            format!("{:.2}", self.price),
            list(&self.ingredients),
            list(&self.allergens),
            self.vegetarian.to_string(),
            self.vegan.to_string(),
            self.gluten_free.to_string(),
            self.available.to_string(),
            optional(self.trip_id),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRow for News {
    const HEADERS: &'static [&'static str] = &[
        "code",
        "title",
        "category",
        "authorId",
        "authorName",
        "publishDate",
        "tags",
        "featured",
        "published",
        "summary",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.code.clone(),
            self.title.clone(),
            self.category.to_string(),
            self.author_id.to_string(),
            self.author_name.clone().unwrap_or_default(),
            self.publish_date.to_rfc3339(),
            list(&self.tags),
            self.featured.to_string(),
            self.published.to_string(),
            self.summary.clone(),
        ]
    }
}
