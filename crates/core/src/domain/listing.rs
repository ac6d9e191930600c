use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary key of a persisted listing. Stable for the lifetime of the store and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListingId(pub i64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A real-estate record available for sale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub title: String,
    /// Surface in square meters.
    pub area: f64,
    pub price: f64,
    pub url: String,
    /// Stored in the `department` column.
    pub city: String,
    pub real_estate_type: String,
    /// Only meaningful for apartments.
    pub room_count: u32,
}
