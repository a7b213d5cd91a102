//! Common API types and utilities

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Page size when the client does not ask for one.
pub const DEFAULT_LIMIT: usize = 30;
/// Largest page a client may request.
pub const MAX_LIMIT: usize = 500;

mod string_or_number {
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize_usize_opt<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNum {
            Num(usize),
            Str(String),
        }

        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Offset based paging (`?offset=0&limit=30`)
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Index of the first item to return
    #[serde(default, deserialize_with = "string_or_number::deserialize_usize_opt")]
    offset: Option<usize>,
    /// Maximum number of items to return
    #[serde(default, deserialize_with = "string_or_number::deserialize_usize_opt")]
    limit: Option<usize>,
}

impl ListParams {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self {
            offset: Some(offset),
            limit: Some(limit),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// Requested limit clamped to `1..=MAX_LIMIT`.
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// One page of a repository listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    /// Slice `all` by offset and limit, keeping the unpaged total.
    pub fn slice(all: Vec<T>, offset: usize, limit: usize) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(offset).take(limit).collect();
        Self { items, total, offset }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            offset: self.offset,
        }
    }
}

/// Location header value for a newly created resource.
pub fn location(base: &str, id: impl std::fmt::Display) -> String {
    format!("{}/{}", base.trim_end_matches('/'), id)
}
