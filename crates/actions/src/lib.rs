//! Custom actions called by the dialogue framework.
//!
//! Each listing action reads one criterion slot, runs the matching [`ListingFilter`] against
//! the store and sends the numbered result message. `action_select_house` maps the user's
//! pick back to a listing and writes the selected-listing slots.
//!
//! [`ListingFilter`]: immo_core::criteria::ListingFilter

pub mod dialogue;
pub mod filter;
pub mod registry;
pub mod selection;

pub use dialogue::{BotMessage, CollectingDispatcher, Event, Tracker};
pub use filter::{action_name, FilterListingsAction};
pub use registry::{default_registry, Action, ActionRegistry, ActionResponse, DispatchError};
pub use selection::{ResolveError, SelectListingAction, SelectionResolver, SELECT_ACTION_NAME};
