use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info};

use immo_core::domain::listing::ListingId;
use immo_core::selection::{
    parse_choice, parse_result_ids, resolve_ordinal, SelectedListing, SelectionError,
    SelectionMode, HOUSE_CHOICE_SLOT, RESULT_IDS_SLOT, SELECTION_STORE_ERROR_MESSAGE,
};
use immo_db::{ListingRepository, RepositoryError};

use crate::dialogue::{CollectingDispatcher, Event, Tracker};
use crate::registry::Action;

pub const SELECT_ACTION_NAME: &str = "action_select_house";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error("listing store failure: {0}")]
    Store(#[from] RepositoryError),
}

impl ResolveError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Selection(selection) => selection.user_message(),
            Self::Store(_) => SELECTION_STORE_ERROR_MESSAGE,
        }
    }
}

/// Maps the user's pick to a persisted listing.
pub struct SelectionResolver {
    repository: Arc<dyn ListingRepository>,
    mode: SelectionMode,
}

impl SelectionResolver {
    pub fn new(repository: Arc<dyn ListingRepository>, mode: SelectionMode) -> Self {
        Self { repository, mode }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Reads `house_choice` (and, in ordinal mode, the last rendered ids) from the tracker
    /// and fetches the chosen listing by primary key.
    pub async fn resolve(&self, tracker: &Tracker) -> Result<SelectedListing, ResolveError> {
        let choice = parse_choice(tracker.get_slot(HOUSE_CHOICE_SLOT))?;

        let id = match self.mode {
            SelectionMode::PrimaryKey => ListingId(choice),
            SelectionMode::Ordinal => parse_result_ids(tracker.get_slot(RESULT_IDS_SLOT))
                .and_then(|ids| resolve_ordinal(choice, &ids))
                .ok_or(SelectionError::NotFound { choice })?,
        };

        let listing =
            self.repository.find_by_id(id).await?.ok_or(SelectionError::NotFound { choice })?;

        Ok(SelectedListing::from(&listing))
    }
}

pub struct SelectListingAction {
    resolver: SelectionResolver,
}

impl SelectListingAction {
    pub fn new(repository: Arc<dyn ListingRepository>, mode: SelectionMode) -> Self {
        Self { resolver: SelectionResolver::new(repository, mode) }
    }
}

#[async_trait]
impl Action for SelectListingAction {
    fn name(&self) -> &'static str {
        SELECT_ACTION_NAME
    }

    async fn run(&self, dispatcher: &mut CollectingDispatcher, tracker: &Tracker) -> Vec<Event> {
        match self.resolver.resolve(tracker).await {
            Ok(selected) => {
                info!(
                    event_name = "action.select.completed",
                    correlation_id = %tracker.sender_id,
                    listing_id = selected.id.0,
                    mode = ?self.resolver.mode(),
                    "listing selected"
                );
                dispatcher.utter_message(selected.confirmation());
                selected
                    .slot_values()
                    .into_iter()
                    .map(|(name, value)| Event::slot(name, value))
                    .collect()
            }
            Err(failure) => {
                match &failure {
                    ResolveError::Store(store_error) => error!(
                        event_name = "action.select.store_failed",
                        correlation_id = %tracker.sender_id,
                        unavailable = store_error.is_unavailable(),
                        error = %store_error,
                        "listing lookup failed"
                    ),
                    ResolveError::Selection(selection_error) => debug!(
                        event_name = "action.select.rejected",
                        correlation_id = %tracker.sender_id,
                        reason = %selection_error,
                        "selection not resolved"
                    ),
                }
                dispatcher.utter_message(failure.user_message());
                Vec::new()
            }
        }
    }
}
