//! Cursor-based pagination.
//!
//! A page is fetched by asking the store for `limit + 1` rows past the cursor
//! in sort order. The extra row only signals that more data exists; it is
//! dropped before the page is returned and the last *retained* row's sort
//! value becomes the next cursor.
//!
//! Ties on the cursor field are not broken by a secondary key. When rows
//! sharing a cursor value straddle a page boundary, the ones that did not
//! fit on the earlier page are skipped by the strict predicate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AppError;
use crate::resource::{Resource, ResourceStore};

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Fields a list can be ordered and paged by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorField {
    CreatedAt,
    PublishDate,
}

impl CursorField {
    /// Column name in the relational schema.
    pub fn column(&self) -> &'static str {
        match self {
            CursorField::CreatedAt => "created_at",
            CursorField::PublishDate => "publish_date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: CursorField,
    pub direction: SortDirection,
}

impl Sort {
    pub const fn asc(field: CursorField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(field: CursorField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Sort-field value of the last item on a page.
///
/// Rendered as RFC 3339 with as many fractional digits as needed, so the
/// value parsed back from a client is bit-identical to the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor(DateTime<Utc>);

impl Cursor {
    pub fn new(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for Cursor {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl FromStr for Cursor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|_| AppError::BadRequest(format!("Invalid cursor: {s}")))
    }
}

impl Serialize for Cursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Strict comparison against the cursor, derived from the sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPredicate {
    /// `field > cursor` (ascending sort)
    After(Cursor),
    /// `field < cursor` (descending sort)
    Before(Cursor),
}

impl CursorPredicate {
    pub fn matches(&self, value: Cursor) -> bool {
        match self {
            CursorPredicate::After(c) => value > *c,
            CursorPredicate::Before(c) => value < *c,
        }
    }

    pub fn cursor(&self) -> Cursor {
        match self {
            CursorPredicate::After(c) | CursorPredicate::Before(c) => *c,
        }
    }
}

/// What a store must return for one page: rows matching the caller's filter
/// and `predicate`, ordered by `sort`, at most `fetch_limit` of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub sort: Sort,
    pub predicate: Option<CursorPredicate>,
    pub fetch_limit: usize,
}

impl Window {
    /// `limit` is clamped to `1..=MAX_LIMIT`.
    pub fn new(sort: Sort, limit: usize, cursor: Option<Cursor>) -> Self {
        let predicate = cursor.map(|c| match sort.direction {
            SortDirection::Asc => CursorPredicate::After(c),
            SortDirection::Desc => CursorPredicate::Before(c),
        });
        Self {
            sort,
            predicate,
            fetch_limit: limit.clamp(1, MAX_LIMIT) + 1,
        }
    }

    /// Page size requested by the caller.
    pub fn limit(&self) -> usize {
        self.fetch_limit - 1
    }
}

/// Caller-facing page parameters, straight from the query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Option<usize>,
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    pub fn new(limit: Option<usize>, cursor: Option<Cursor>) -> Self {
        Self { limit, cursor }
    }

    /// Requested limit with defaults and bounds applied.
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            next_cursor: None,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
            next_cursor: self.next_cursor,
        }
    }
}

/// Turn the `limit + 1` rows fetched for `window` into a page.
pub fn into_page<T>(mut rows: Vec<T>, window: &Window, cursor_of: impl Fn(&T) -> Cursor) -> Page<T> {
    let limit = window.limit();
    let has_more = rows.len() > limit;
    rows.truncate(limit);

    let next_cursor = if has_more {
        rows.last().map(&cursor_of)
    } else {
        None
    };

    Page {
        items: rows,
        has_more,
        next_cursor,
    }
}

/// Reference implementation of the store side of the contract for data that
/// already lives in memory: apply the predicate, sort, cap at `fetch_limit`.
pub fn select_window<T>(
    items: impl IntoIterator<Item = T>,
    window: &Window,
    cursor_of: impl Fn(&T) -> Cursor,
) -> Vec<T> {
    let mut selected: Vec<T> = items
        .into_iter()
        .filter(|item| {
            window
                .predicate
                .is_none_or(|predicate| predicate.matches(cursor_of(item)))
        })
        .collect();

    selected.sort_by_key(|item| cursor_of(item));
    if window.sort.direction == SortDirection::Desc {
        selected.reverse();
    }
    selected.truncate(window.fetch_limit);
    selected
}

/// Fetch one page of `R` matching `filter`, ordered by `sort`, starting
/// strictly after `cursor`. `limit` is clamped like [`PageRequest::limit`].
pub async fn paginate<R, S>(
    store: &S,
    filter: &R::Filter,
    sort: Sort,
    limit: usize,
    cursor: Option<Cursor>,
) -> Result<Page<R>, AppError>
where
    R: Resource,
    S: ResourceStore<R>,
{
    let window = Window::new(sort, limit, cursor);
    let rows = store.fetch_window(filter, &window).await?;
    Ok(into_page(rows, &window, |item: &R| item.cursor(sort.field)))
}
