//! Listing filter and selection engine for a conversational real-estate assistant.
//!
//! - `criteria` - typed, validated filter criteria and the [`ListingFilter`] predicate
//! - `format` - numbered rendering of a [`ResultSet`] per query kind
//! - `selection` - parsing of a user's pick and the [`SelectedListing`] session record
//! - `config` - layered configuration (defaults, `immo.toml`, `IMMO_*` env, overrides)

pub mod config;
pub mod criteria;
pub mod domain;
pub mod errors;
pub mod format;
pub mod selection;

pub use criteria::{CriterionError, CriterionKind, ListingFilter, QueryKind};
pub use domain::listing::{Listing, ListingId};
pub use errors::{ApplicationError, InterfaceError};
pub use format::{format_result_set, ResultSet};
pub use selection::{SelectedListing, SelectionError, SelectionMode};
