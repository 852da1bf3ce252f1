//! Read-only aggregate reports over the catalog.
//!
//! The SQL store computes these in the database; the functions here are the
//! in-memory definitions of the same reports.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::meal::Meal;
use crate::room::{Room, RoomType};
use crate::trip::Trip;

/// Inclusive bounds on a trip's start date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, value: DateTime<Utc>) -> bool {
        self.start_date.is_none_or(|s| value >= s) && self.end_date.is_none_or(|e| value <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResortMonthCount {
    pub resort: String,
    pub year: i32,
    pub month: u32,
    pub trip_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CuisinePriceStats {
    pub cuisine: String,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAvailability {
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub available: bool,
    pub count: i64,
}

pub trait AnalyticsStore: Send + Sync + Clone {
    /// Ordered by resort, year, month.
    fn trips_by_resort_month(
        &self,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<ResortMonthCount>, AppError>> + Send;

    /// Ordered by average price, most expensive first.
    fn meal_price_stats(
        &self,
    ) -> impl Future<Output = Result<Vec<CuisinePriceStats>, AppError>> + Send;

    /// Ordered by type name, available rows first.
    fn room_availability(
        &self,
    ) -> impl Future<Output = Result<Vec<RoomAvailability>, AppError>> + Send;
}

pub fn trips_by_resort_month(trips: &[Trip], range: DateRange) -> Vec<ResortMonthCount> {
    let mut groups: BTreeMap<(String, i32, u32), i64> = BTreeMap::new();
    for trip in trips.iter().filter(|t| range.contains(t.start)) {
        *groups
            .entry((trip.resort.clone(), trip.start.year(), trip.start.month()))
            .or_default() += 1;
    }
    groups
        .into_iter()
        .map(|((resort, year, month), trip_count)| ResortMonthCount {
            resort,
            year,
            month,
            trip_count,
        })
        .collect()
}

pub fn meal_price_stats(meals: &[Meal]) -> Vec<CuisinePriceStats> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for meal in meals {
        groups.entry(&meal.cuisine).or_default().push(meal.price);
    }

    let mut stats: Vec<CuisinePriceStats> = groups
        .into_iter()
        .map(|(cuisine, prices)| {
            let count = prices.len();
            CuisinePriceStats {
                cuisine: cuisine.to_string(),
                avg_price: prices.iter().sum::<f64>() / count as f64,
                min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
                max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                count: count as i64,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.avg_price.total_cmp(&a.avg_price));
    stats
}

pub fn room_availability(rooms: &[Room]) -> Vec<RoomAvailability> {
    let mut groups: BTreeMap<(&'static str, bool), (RoomType, i64)> = BTreeMap::new();
    for room in rooms {
        groups
            .entry((room.room_type.as_str(), !room.available))
            .or_insert((room.room_type, 0))
            .1 += 1;
    }
    groups
        .into_iter()
        .map(|((_, unavailable), (room_type, count))| RoomAvailability {
            room_type,
            available: !unavailable,
            count,
        })
        .collect()
}
