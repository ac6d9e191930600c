use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info};

use immo_core::criteria::{CriterionError, CriterionKind, QueryKind};
use immo_core::format::{format_result_set, ResultSet};
use immo_core::selection::{result_ids_value, SelectionMode, RESULT_IDS_SLOT};
use immo_db::ListingRepository;

use crate::dialogue::{CollectingDispatcher, Event, Tracker};
use crate::registry::Action;

/// Action name the dialogue framework uses for each listing query.
pub fn action_name(kind: QueryKind) -> &'static str {
    match kind {
        QueryKind::Catalog => "action_list_houses_for_sale",
        QueryKind::City => "action_filter_houses_by_city",
        QueryKind::Budget => "action_list_houses_by_budget",
        QueryKind::Area => "action_list_houses_by_area",
        QueryKind::RoomCount => "action_filter_by_house_size",
        QueryKind::HouseType => "action_filter_by_house_type",
    }
}

/// Runs one listing query: criterion slot, filter, store, formatter, message.
pub struct FilterListingsAction {
    kind: QueryKind,
    repository: Arc<dyn ListingRepository>,
    mode: SelectionMode,
}

impl FilterListingsAction {
    pub fn new(
        kind: QueryKind,
        repository: Arc<dyn ListingRepository>,
        mode: SelectionMode,
    ) -> Self {
        Self { kind, repository, mode }
    }

    /// One action per query kind, sharing the store.
    pub fn all(repository: Arc<dyn ListingRepository>, mode: SelectionMode) -> Vec<Self> {
        QueryKind::ALL.into_iter().map(|kind| Self::new(kind, repository.clone(), mode)).collect()
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    fn reject(&self, dispatcher: &mut CollectingDispatcher, error: &CriterionError) -> Vec<Event> {
        match error {
            CriterionError::Missing(kind) => {
                dispatcher.utter_message(kind.missing_prompt());
                Vec::new()
            }
            CriterionError::Invalid { kind, .. } => {
                dispatcher.utter_message(kind.invalid_prompt());
                // An unusable room count is cleared so the next turn asks again.
                if *kind == CriterionKind::RoomCount {
                    vec![Event::slot(kind.slot(), Value::Null)]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

#[async_trait]
impl Action for FilterListingsAction {
    fn name(&self) -> &'static str {
        action_name(self.kind)
    }

    async fn run(&self, dispatcher: &mut CollectingDispatcher, tracker: &Tracker) -> Vec<Event> {
        let raw = self.kind.criterion().and_then(|criterion| tracker.get_slot(criterion.slot()));

        let filter = match self.kind.filter_from_slot(raw) {
            Ok(filter) => filter,
            Err(rejection) => {
                debug!(
                    event_name = "action.filter.rejected",
                    correlation_id = %tracker.sender_id,
                    action_name = self.name(),
                    reason = %rejection,
                    "criterion rejected, prompting user"
                );
                return self.reject(dispatcher, &rejection);
            }
        };

        let listings = match self.repository.find(&filter).await {
            Ok(listings) => listings,
            Err(store_error) => {
                error!(
                    event_name = "action.filter.store_failed",
                    correlation_id = %tracker.sender_id,
                    action_name = self.name(),
                    unavailable = store_error.is_unavailable(),
                    error = %store_error,
                    "listing query failed"
                );
                let message = if store_error.is_unavailable() {
                    self.kind.unavailable_message()
                } else {
                    self.kind.store_error_message()
                };
                dispatcher.utter_message(message);
                return Vec::new();
            }
        };

        let results = ResultSet::new(listings);
        dispatcher.utter_message(format_result_set(&filter, &results));

        info!(
            event_name = "action.filter.completed",
            correlation_id = %tracker.sender_id,
            action_name = self.name(),
            results = results.len(),
            "listing query answered"
        );

        match self.mode {
            SelectionMode::Ordinal => {
                vec![Event::slot(RESULT_IDS_SLOT, result_ids_value(&results.ids()))]
            }
            SelectionMode::PrimaryKey => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use immo_core::criteria::QueryKind;
    use immo_core::domain::listing::{Listing, ListingId};
    use immo_core::selection::SelectionMode;
    use immo_db::InMemoryListingRepository;

    use super::FilterListingsAction;
    use crate::dialogue::{CollectingDispatcher, Event, Tracker};
    use crate::registry::Action;

    fn villa() -> Listing {
        Listing {
            id: ListingId(1),
            title: "Villa A".to_string(),
            area: 120.0,
            price: 250_000.0,
            url: "https://example.test/villa-a".to_string(),
            city: "Lyon".to_string(),
            real_estate_type: "maison".to_string(),
            room_count: 5,
        }
    }

    fn action(
        kind: QueryKind,
        repo: InMemoryListingRepository,
        mode: SelectionMode,
    ) -> FilterListingsAction {
        FilterListingsAction::new(kind, Arc::new(repo), mode)
    }

    async fn run(action: &FilterListingsAction, tracker: &Tracker) -> (Vec<String>, Vec<Event>) {
        let mut dispatcher = CollectingDispatcher::new();
        let events = action.run(&mut dispatcher, tracker).await;
        (dispatcher.into_messages().into_iter().map(|m| m.text).collect(), events)
    }

    #[tokio::test]
    async fn missing_criterion_prompts_without_querying() {
        let repo = InMemoryListingRepository::with_listings(vec![villa()]);
        repo.set_unavailable(true);
        let action = action(QueryKind::City, repo, SelectionMode::Ordinal);

        let (messages, events) = run(&action, &Tracker::new("u1").with_slot("city", "  ")).await;

        assert_eq!(messages, vec!["Veuillez spécifier la ville qui vous intéresse."]);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn invalid_budget_prompts_for_valid_value() {
        let action =
            action(QueryKind::Budget, InMemoryListingRepository::new(), SelectionMode::Ordinal);

        let (messages, events) =
            run(&action, &Tracker::new("u1").with_slot("budget", "cheap")).await;

        assert_eq!(messages, vec!["Please provide a valid budget."]);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn invalid_room_count_clears_the_slot() {
        let action =
            action(QueryKind::RoomCount, InMemoryListingRepository::new(), SelectionMode::Ordinal);

        let (messages, events) =
            run(&action, &Tracker::new("u1").with_slot("num_rooms", "plusieurs")).await;

        assert_eq!(messages, vec!["Veuillez spécifier un nombre valide de chambres."]);
        assert_eq!(events, vec![Event::slot("num_rooms", Value::Null)]);
    }

    #[tokio::test]
    async fn ordinal_mode_records_rendered_ids() {
        let action = action(
            QueryKind::City,
            InMemoryListingRepository::with_listings(vec![villa()]),
            SelectionMode::Ordinal,
        );

        let (messages, events) = run(&action, &Tracker::new("u1").with_slot("city", "lyon")).await;

        assert_eq!(
            messages,
            vec![
                "Maisons disponibles à Lyon :\n1- Villa A : 120 m² pour 250000€. Plus d'infos : https://example.test/villa-a\n"
            ]
        );
        assert_eq!(events, vec![Event::slot("listing_result_ids", json!([1]))]);
    }

    #[tokio::test]
    async fn primary_key_mode_writes_no_slots() {
        let action = action(
            QueryKind::Catalog,
            InMemoryListingRepository::with_listings(vec![villa()]),
            SelectionMode::PrimaryKey,
        );

        let (messages, events) = run(&action, &Tracker::new("u1")).await;

        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Voici quelques maisons à vendre :\n1- Villa A"));
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn unavailable_store_sends_connection_apology() {
        let repo = InMemoryListingRepository::with_listings(vec![villa()]);
        repo.set_unavailable(true);
        let action = action(QueryKind::RoomCount, repo, SelectionMode::Ordinal);

        let (messages, events) = run(&action, &Tracker::new("u1").with_slot("num_rooms", 2)).await;

        assert_eq!(messages, vec!["Échec de la connexion à la base de données."]);
        assert!(events.is_empty());
    }

    #[test]
    fn every_query_kind_has_a_distinct_action() {
        let actions = FilterListingsAction::all(
            Arc::new(InMemoryListingRepository::new()),
            SelectionMode::Ordinal,
        );
        let mut names = actions.iter().map(|action| action.name()).collect::<Vec<_>>();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), QueryKind::ALL.len());
    }
}
