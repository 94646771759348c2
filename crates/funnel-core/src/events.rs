use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Event names
// =============================================================================

/// A link matching the affiliate rules was clicked.
pub const AFFILIATE_CLICK: &str = "affiliate_click";
/// A form was submitted.
pub const FORM_SUBMIT: &str = "form_submit";
/// The pointer left the viewport through the top edge.
pub const EXIT_INTENT_TRIGGERED: &str = "exit_intent_triggered";
/// Time spent on the page, emitted on unload.
pub const PAGE_TIME: &str = "page_time";
/// The page finished loading.
pub const PAGE_VIEW: &str = "page_view";
/// A scroll-depth milestone was reached for the first time.
pub const SCROLL_DEPTH: &str = "scroll_depth";

// =============================================================================
// Payload
// =============================================================================

/// Key/value data attached to a tracked event.
///
/// Always a mapping: an event tracked without data carries an empty payload.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the payload as a JSON object value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// =============================================================================
// TrackedEvent
// =============================================================================

/// A single tracked occurrence, handed to a recording sink.
///
/// Immutable once built. Ordering between events is their recording order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackedEvent {
    name: String,
    payload: Payload,
    timestamp: DateTime<Utc>,
}

impl TrackedEvent {
    /// Create an event stamped with the current time.
    pub fn new(name: &str, payload: Payload) -> Self {
        Self {
            name: name.to_string(),
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Capture time of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
