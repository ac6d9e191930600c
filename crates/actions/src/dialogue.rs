//! The dialogue framework's view of a turn: the tracker snapshot an action reads, the
//! messages it sends back, and the session events it emits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Snapshot of one conversation's slots at the time an action runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tracker {
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub slots: BTreeMap<String, Value>,
}

impl Tracker {
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self { sender_id: sender_id.into(), slots: BTreeMap::new() }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.slots.insert(name.into(), value.into());
        self
    }

    pub fn get_slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    /// Applies emitted events, as the dialogue framework does between turns.
    pub fn apply(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::SlotSet { name, value, .. } => {
                    self.slots.insert(name.clone(), value.clone());
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMessage {
    pub text: String,
}

/// Collects the text messages an action sends during its turn.
#[derive(Clone, Debug, Default)]
pub struct CollectingDispatcher {
    messages: Vec<BotMessage>,
}

impl CollectingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utter_message(&mut self, text: impl Into<String>) {
        self.messages.push(BotMessage { text: text.into() });
    }

    pub fn messages(&self) -> &[BotMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<BotMessage> {
        self.messages
    }
}

/// Session event returned to the dialogue framework.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    #[serde(rename = "slot")]
    SlotSet { timestamp: Option<f64>, name: String, value: Value },
}

impl Event {
    pub fn slot(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::SlotSet { timestamp: None, name: name.into(), value: value.into() }
    }

    pub fn slot_name(&self) -> &str {
        match self {
            Self::SlotSet { name, .. } => name,
        }
    }
}
