//! Typed filter criteria parsed from dialogue slots.
//!
//! Slot values arrive untyped (`null`, strings, numbers). Each criterion is parsed and
//! validated exactly once into a typed value; everything downstream consumes
//! [`ListingFilter`] and never sees raw slot data again.

use serde_json::Value;
use thiserror::Error;

use crate::domain::listing::Listing;

/// The only property type the room-count filter ever returns.
pub const APARTMENT_TYPE: &str = "appartement";

/// Case-folding applied to every text criterion before it reaches the store.
pub fn fold_case(value: &str) -> String {
    value.trim().to_lowercase()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    City,
    Budget,
    Area,
    RoomCount,
    HouseType,
}

impl CriterionKind {
    /// Dialogue slot the criterion is read from.
    pub fn slot(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Budget => "budget",
            Self::Area => "area",
            Self::RoomCount => "num_rooms",
            Self::HouseType => "house_type",
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CriterionError {
    #[error("missing `{}` criterion", .0.slot())]
    Missing(CriterionKind),
    #[error("invalid value for `{}`: `{}`", .kind.slot(), .raw)]
    Invalid { kind: CriterionKind, raw: String },
}

impl CriterionError {
    pub fn kind(&self) -> CriterionKind {
        match self {
            Self::Missing(kind) | Self::Invalid { kind, .. } => *kind,
        }
    }
}

/// City name, case-folded. Matched by exact equality against `department`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct City(String);

impl City {
    pub fn parse(raw: Option<&Value>) -> Result<Self, CriterionError> {
        parse_text(CriterionKind::City, raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title-cased form used in user-facing messages (`saint-étienne` -> `Saint-Étienne`).
    pub fn display_name(&self) -> String {
        title_case(&self.0)
    }
}

/// Inclusive price ceiling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Budget(f64);

impl Budget {
    pub fn parse(raw: Option<&Value>) -> Result<Self, CriterionError> {
        let kind = CriterionKind::Budget;
        let value = present(kind, raw)?;
        parse_number(value)
            .filter(|amount| *amount >= 0.0)
            .map(Self)
            .ok_or_else(|| invalid(kind, value))
    }

    pub fn amount(self) -> f64 {
        self.0
    }
}

/// Inclusive surface floor in square meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaThreshold(f64);

impl AreaThreshold {
    pub fn parse(raw: Option<&Value>) -> Result<Self, CriterionError> {
        let kind = CriterionKind::Area;
        let value = present(kind, raw)?;
        parse_number(value).map(Self).ok_or_else(|| invalid(kind, value))
    }

    pub fn square_meters(self) -> f64 {
        self.0
    }
}

/// Minimum room count for apartments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomCount(u32);

impl RoomCount {
    pub fn parse(raw: Option<&Value>) -> Result<Self, CriterionError> {
        let kind = CriterionKind::RoomCount;
        let value = present(kind, raw)?;
        let count = match value {
            Value::Number(number) => number.as_u64().or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.is_finite() && *float >= 0.0 && float.fract() == 0.0)
                    .map(|float| float as u64)
            }),
            Value::String(text) => text.trim().parse::<u64>().ok(),
            _ => None,
        };

        count
            .and_then(|count| u32::try_from(count).ok())
            .map(Self)
            .ok_or_else(|| invalid(kind, value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Property type, case-folded. Matched by exact equality against `real_estate_type`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HouseType(String);

impl HouseType {
    pub fn parse(raw: Option<&Value>) -> Result<Self, CriterionError> {
        parse_text(CriterionKind::HouseType, raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The query kinds exposed to the dialogue layer, one per action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Catalog,
    City,
    Budget,
    Area,
    RoomCount,
    HouseType,
}

impl QueryKind {
    pub const ALL: [QueryKind; 6] =
        [Self::Catalog, Self::City, Self::Budget, Self::Area, Self::RoomCount, Self::HouseType];

    /// Criterion required by this query, `None` for the unconditional catalog listing.
    pub fn criterion(self) -> Option<CriterionKind> {
        match self {
            Self::Catalog => None,
            Self::City => Some(CriterionKind::City),
            Self::Budget => Some(CriterionKind::Budget),
            Self::Area => Some(CriterionKind::Area),
            Self::RoomCount => Some(CriterionKind::RoomCount),
            Self::HouseType => Some(CriterionKind::HouseType),
        }
    }

    /// Builds the filter for this query from the raw value of its criterion slot.
    /// The raw value is ignored for [`QueryKind::Catalog`].
    pub fn filter_from_slot(self, raw: Option<&Value>) -> Result<ListingFilter, CriterionError> {
        Ok(match self {
            Self::Catalog => ListingFilter::All,
            Self::City => ListingFilter::City(City::parse(raw)?),
            Self::Budget => ListingFilter::MaxPrice(Budget::parse(raw)?),
            Self::Area => ListingFilter::MinArea(AreaThreshold::parse(raw)?),
            Self::RoomCount => ListingFilter::MinRooms(RoomCount::parse(raw)?),
            Self::HouseType => ListingFilter::HouseType(HouseType::parse(raw)?),
        })
    }
}

/// A validated predicate over listings. Exactly one criterion per filter.
#[derive(Clone, Debug, PartialEq)]
pub enum ListingFilter {
    All,
    City(City),
    MaxPrice(Budget),
    MinArea(AreaThreshold),
    /// Hard-wired to [`APARTMENT_TYPE`].
    MinRooms(RoomCount),
    HouseType(HouseType),
}

impl ListingFilter {
    pub fn kind(&self) -> QueryKind {
        match self {
            Self::All => QueryKind::Catalog,
            Self::City(_) => QueryKind::City,
            Self::MaxPrice(_) => QueryKind::Budget,
            Self::MinArea(_) => QueryKind::Area,
            Self::MinRooms(_) => QueryKind::RoomCount,
            Self::HouseType(_) => QueryKind::HouseType,
        }
    }

    /// Reference evaluation of the predicate, identical to what the SQL adapter issues.
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Self::All => true,
            Self::City(city) => fold_case(&listing.city) == city.as_str(),
            Self::MaxPrice(budget) => listing.price <= budget.amount(),
            Self::MinArea(threshold) => listing.area >= threshold.square_meters(),
            Self::MinRooms(rooms) => {
                listing.room_count >= rooms.get()
                    && fold_case(&listing.real_estate_type) == APARTMENT_TYPE
            }
            Self::HouseType(house_type) => {
                fold_case(&listing.real_estate_type) == house_type.as_str()
            }
        }
    }
}

fn present(kind: CriterionKind, raw: Option<&Value>) -> Result<&Value, CriterionError> {
    match raw {
        None | Some(Value::Null) => Err(CriterionError::Missing(kind)),
        Some(Value::String(text)) if text.trim().is_empty() => Err(CriterionError::Missing(kind)),
        Some(value) => Ok(value),
    }
}

fn invalid(kind: CriterionKind, value: &Value) -> CriterionError {
    let raw = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    CriterionError::Invalid { kind, raw }
}

fn parse_text(kind: CriterionKind, raw: Option<&Value>) -> Result<String, CriterionError> {
    match present(kind, raw)? {
        Value::String(text) => Ok(fold_case(text)),
        other => Err(invalid(kind, other)),
    }
}

fn parse_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

/// Uppercases the first letter of every word and lowercases the rest.
pub fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                output.extend(ch.to_lowercase());
            } else {
                output.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            output.push(ch);
            previous_is_letter = false;
        }
    }

    output
}
