use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use immo_core::errors::ApplicationError;
use immo_core::selection::SelectionMode;
use immo_db::ListingRepository;

use crate::dialogue::{BotMessage, CollectingDispatcher, Event, Tracker};
use crate::filter::FilterListingsAction;
use crate::selection::SelectListingAction;

/// A custom action callable by the dialogue framework.
///
/// Actions recover every user-input and store failure locally with a message, so `run`
/// has no error channel. The returned events are the only session writes of the turn.
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, dispatcher: &mut CollectingDispatcher, tracker: &Tracker) -> Vec<Event>;
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ActionResponse {
    pub events: Vec<Event>,
    pub responses: Vec<BotMessage>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No registered action found for name '{0}'.")]
    UnknownAction(String),
}

impl From<DispatchError> for ApplicationError {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::UnknownAction(name) => ApplicationError::UnknownAction(name),
        }
    }
}

#[derive(Default)]
pub struct ActionRegistry {
    actions: BTreeMap<&'static str, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<A>(&mut self, action: A)
    where
        A: Action + 'static,
    {
        self.actions.insert(action.name(), Arc::new(action));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    /// Registered action names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.actions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub async fn execute(
        &self,
        name: &str,
        tracker: &Tracker,
    ) -> Result<ActionResponse, DispatchError> {
        let Some(action) = self.get(name) else {
            warn!(
                event_name = "action.dispatch.unknown",
                correlation_id = %tracker.sender_id,
                action_name = name,
                "no action registered under this name"
            );
            return Err(DispatchError::UnknownAction(name.to_owned()));
        };

        let mut dispatcher = CollectingDispatcher::new();
        let events = action.run(&mut dispatcher, tracker).await;

        info!(
            event_name = "action.dispatch.completed",
            correlation_id = %tracker.sender_id,
            action_name = name,
            events = events.len(),
            responses = dispatcher.messages().len(),
            "action executed"
        );

        Ok(ActionResponse { events, responses: dispatcher.into_messages() })
    }
}

/// Registry with every listing action and the selection action wired to one store.
pub fn default_registry(
    repository: Arc<dyn ListingRepository>,
    mode: SelectionMode,
) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for action in FilterListingsAction::all(repository.clone(), mode) {
        registry.register(action);
    }
    registry.register(SelectListingAction::new(repository, mode));
    registry
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use immo_core::selection::SelectionMode;
    use immo_db::InMemoryListingRepository;

    use super::{default_registry, Action, ActionRegistry, DispatchError};
    use crate::dialogue::{CollectingDispatcher, Event, Tracker};

    struct Greet;

    #[async_trait]
    impl Action for Greet {
        fn name(&self) -> &'static str {
            "action_greet"
        }

        async fn run(
            &self,
            dispatcher: &mut CollectingDispatcher,
            tracker: &Tracker,
        ) -> Vec<Event> {
            dispatcher.utter_message(format!("bonjour {}", tracker.sender_id));
            vec![Event::slot("greeted", true)]
        }
    }

    #[tokio::test]
    async fn executes_registered_action() {
        let mut registry = ActionRegistry::new();
        registry.register(Greet);

        let response =
            registry.execute("action_greet", &Tracker::new("ana")).await.expect("registered");

        assert_eq!(response.responses[0].text, "bonjour ana");
        assert_eq!(response.events, vec![Event::slot("greeted", true)]);
    }

    #[tokio::test]
    async fn unknown_action_is_a_dispatch_error() {
        let registry = ActionRegistry::new();

        let error =
            registry.execute("action_nope", &Tracker::default()).await.expect_err("unknown");

        assert_eq!(error, DispatchError::UnknownAction("action_nope".to_owned()));
        assert_eq!(error.to_string(), "No registered action found for name 'action_nope'.");
    }

    #[test]
    fn default_registry_exposes_every_action() {
        let registry = default_registry(
            Arc::new(InMemoryListingRepository::new()),
            SelectionMode::default(),
        );

        assert_eq!(
            registry.names(),
            vec![
                "action_filter_by_house_size",
                "action_filter_by_house_type",
                "action_filter_houses_by_city",
                "action_list_houses_by_area",
                "action_list_houses_by_budget",
                "action_list_houses_for_sale",
                "action_select_house",
            ]
        );
    }
}
