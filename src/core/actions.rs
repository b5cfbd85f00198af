// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/actions.rs
//!
//! Actions and key outputs
//!
//! A key either produces text directly or fires an action. Actions are what
//! make dead keys possible: an action can move the keyboard into another
//! state, and every state can override what an action outputs.
//!
//! Some action ids cannot be written literally into a keylayout (arrow keys,
//! quote marks), so they are normalised through a fixed table of numeric
//! character references before they are stored anywhere.

use serde_yaml::Value;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::core::error::KeylayoutError;

/// Action ids that must be written as numeric character references
///
/// Keep this table in sync with every place action ids are normalised; it
/// is the only source of truth for the escapes.
pub const ACTION_TO_UNICODE: &[(&str, &str)] = &[
    ("left", "&#x001C;"),
    ("right", "&#x001D;"),
    ("up", "&#x001E;"),
    ("down", "&#x001F;"),
    ("'", "&#x0027;"),
    ("\"", "&#x0022;"),
];

/// Normalises an action id through `ACTION_TO_UNICODE`
///
/// Ids missing from the table are returned unchanged.
///
/// # Example
/// ```
/// use symboard::core::actions::to_unicode;
///
/// assert_eq!(to_unicode("left"), "&#x001C;");
/// assert_eq!(to_unicode("a"), "a");
/// ```
pub fn to_unicode(action: &str) -> &str {
    ACTION_TO_UNICODE
        .iter()
        .find(|(name, _)| *name == action)
        .map(|(_, escaped)| *escaped)
        .unwrap_or(action)
}

/// A keystroke event that may move the keyboard into another state
///
/// Equality, hashing and ordering only look at the id, so a set of actions
/// holds one entry per id and iterates in a stable order.
#[derive(Clone, Debug)]
pub struct Action {
    /// Identifier written to the `action` attribute of a key
    pub id: String,

    /// Name of the state entered when the action fires with no state active
    pub next: Option<String>,
}

impl Action {
    /// Creates an action without a state transition
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            next: None,
        }
    }

    /// Creates a dead-key action which enters `next`
    pub fn transition(id: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            next: Some(next.into()),
        }
    }

    /// Creates an action identified by its position in a key map
    ///
    /// The id has the form `(index,code,name)`.
    pub fn keyed(index: u32, code: u32, name: &str) -> Self {
        Self::new(format!("({},{},{})", index, code, name))
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Action {}

impl Hash for Action {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Action {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Action {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.next {
            Some(next) => write!(f, "{} -> {}", self.id, next),
            None => write!(f, "{}", self.id),
        }
    }
}

/// What a key (or an action inside a state) produces
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyOutput {
    /// Text typed directly
    Literal(String),

    /// An action, possibly entering another state
    Action(Action),
}

impl KeyOutput {
    /// Shorthand for `KeyOutput::Literal`
    pub fn literal(output: impl Into<String>) -> Self {
        KeyOutput::Literal(output.into())
    }

    /// Returns the action, if this output is one
    pub fn as_action(&self) -> Option<&Action> {
        match self {
            KeyOutput::Action(action) => Some(action),
            KeyOutput::Literal(_) => None,
        }
    }

    /// Converts a YAML value into an output
    ///
    /// Accepted shapes:
    /// - a scalar (string, number, boolean): literal output
    /// - a mapping with `action` and/or `next`: an action. The id is
    ///   normalised with [`to_unicode`]; when only `next` is given the id
    ///   comes from `fallback_id(next)`.
    ///
    /// # Arguments
    /// * `value` - The YAML value to convert
    /// * `location` - Where the value came from, for error messages
    /// * `fallback_id` - Builds an id for actions declared without one
    ///
    /// # Errors
    /// Returns `KeylayoutError::UnresolvedOutput` for anything else.
    pub fn from_yaml(
        value: &Value,
        location: &str,
        fallback_id: impl FnOnce(&str) -> String,
    ) -> Result<Self, KeylayoutError> {
        if let Some(literal) = scalar_to_string(value) {
            return Ok(KeyOutput::Literal(literal));
        }

        let unresolved = |found: &str| KeylayoutError::UnresolvedOutput {
            location: location.to_string(),
            found: found.to_string(),
        };

        let Value::Mapping(mapping) = value else {
            return Err(unresolved(describe(value)));
        };

        let id = mapping.get("action").and_then(scalar_to_string);
        let next = mapping.get("next").and_then(scalar_to_string);

        let action = match (id, next) {
            (Some(id), next) => Action {
                id: to_unicode(&id).to_string(),
                next,
            },
            (None, Some(next)) => Action::transition(fallback_id(&next), next),
            (None, None) => {
                return Err(unresolved("a mapping without 'action' or 'next'"));
            }
        };

        Ok(KeyOutput::Action(action))
    }
}

impl fmt::Display for KeyOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyOutput::Literal(output) => write!(f, "{}", output),
            KeyOutput::Action(action) => write!(f, "[{}]", action),
        }
    }
}

/// Renders a YAML scalar (string, number or boolean) as a string
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "nothing",
        Value::Sequence(_) => "a list",
        Value::Tagged(_) => "a tagged value",
        _ => "an unsupported value",
    }
}
