use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::listing::{Listing, ListingId};
use crate::format::format_number;

/// Slot holding the user's pick.
pub const HOUSE_CHOICE_SLOT: &str = "house_choice";

/// Slot holding the ids of the last rendered result set, in rendered order.
/// Only written when [`SelectionMode::Ordinal`] is active.
pub const RESULT_IDS_SLOT: &str = "listing_result_ids";

pub const SELECTED_ID_SLOT: &str = "selected_house_id";
pub const SELECTED_TITLE_SLOT: &str = "selected_house";
pub const SELECTED_AREA_SLOT: &str = "selected_house_area";
pub const SELECTED_PRICE_SLOT: &str = "selected_house_price";
pub const SELECTED_URL_SLOT: &str = "selected_house_url";

/// How a numeric pick is mapped to a listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// The number is a 1-based position in the last rendered result set.
    #[default]
    Ordinal,
    /// The number is the listing's primary key.
    PrimaryKey,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no listing number was provided")]
    Missing,
    #[error("`{raw}` is not a listing number")]
    Invalid { raw: String },
    #[error("no listing matches selection {choice}")]
    NotFound { choice: i64 },
}

impl SelectionError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Missing => {
                "Veuillez spécifier le numéro de la maison que vous souhaitez sélectionner."
            }
            Self::Invalid { .. } => "Veuillez fournir un numéro valide.",
            Self::NotFound { .. } => {
                "Désolé, je n'ai pas trouvé la maison que vous avez sélectionnée."
            }
        }
    }
}

/// Apology for any store failure during selection.
pub const SELECTION_STORE_ERROR_MESSAGE: &str = "Une erreur est survenue lors de la récupération des informations de la maison. Veuillez réessayer plus tard.";

/// Parses the raw `house_choice` slot into an integer.
pub fn parse_choice(raw: Option<&Value>) -> Result<i64, SelectionError> {
    let value = match raw {
        None | Some(Value::Null) => return Err(SelectionError::Missing),
        Some(Value::String(text)) if text.trim().is_empty() => return Err(SelectionError::Missing),
        Some(value) => value,
    };

    let parsed = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite() && float.fract() == 0.0)
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| SelectionError::Invalid {
        raw: match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    })
}

/// Reads the rendered id list back from the session. `None` if no result set was rendered.
pub fn parse_result_ids(raw: Option<&Value>) -> Option<Vec<ListingId>> {
    let entries = raw?.as_array()?;
    entries.iter().map(|entry| entry.as_i64().map(ListingId)).collect()
}

/// Serialized form of the rendered id list for the session.
pub fn result_ids_value(ids: &[ListingId]) -> Value {
    Value::Array(ids.iter().map(|id| Value::from(id.0)).collect())
}

/// Maps a 1-based ordinal onto the rendered id list.
pub fn resolve_ordinal(choice: i64, ids: &[ListingId]) -> Option<ListingId> {
    let index = usize::try_from(choice).ok()?.checked_sub(1)?;
    ids.get(index).copied()
}

/// The listing the user picked, as persisted in the session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectedListing {
    pub id: ListingId,
    pub title: String,
    pub area: f64,
    pub price: f64,
    pub url: String,
}

impl From<&Listing> for SelectedListing {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.clone(),
            area: listing.area,
            price: listing.price,
            url: listing.url.clone(),
        }
    }
}

impl SelectedListing {
    pub fn confirmation(&self) -> String {
        format!(
            "Vous avez sélectionné : {}, {} m², {}€. Plus d'infos : {}",
            self.title,
            format_number(self.area),
            format_number(self.price),
            self.url
        )
    }

    /// The five session slots, always written together.
    pub fn slot_values(&self) -> [(&'static str, Value); 5] {
        [
            (SELECTED_ID_SLOT, Value::from(self.id.0)),
            (SELECTED_TITLE_SLOT, Value::from(self.title.clone())),
            (SELECTED_AREA_SLOT, Value::from(self.area)),
            (SELECTED_PRICE_SLOT, Value::from(self.price)),
            (SELECTED_URL_SLOT, Value::from(self.url.clone())),
        ]
    }
}
