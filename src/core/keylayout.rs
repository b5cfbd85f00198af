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

//! src/core/keylayout.rs
//!
//! The keylayout aggregate
//!
//! A `Keylayout` holds everything needed to write one `.keylayout` file:
//! keyboard metadata, the physical layouts it applies to, which modifier
//! combinations select which key map, the key maps themselves, and the
//! dead-key states its actions can enter.
//!
//! # Lifecycle
//! 1. `KeylayoutBuilder` fills in metadata, key maps and `states_list`
//! 2. `resolve_used_states` copies the referenced states out of the
//!    `StateRepository`
//! 3. The renderer reads the finished aggregate

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use crate::core::actions::{Action, KeyOutput};
use crate::core::error::KeylayoutError;
use crate::core::repository::StateRepository;
use crate::core::state::State;

pub const DEFAULT_GROUP: i32 = 126;
pub const DEFAULT_ID: i32 = -19341;
pub const DEFAULT_NAME: &str = "Untitled";
pub const DEFAULT_MAXOUT: u32 = 1;
pub const DEFAULT_INDEX: u32 = 0;

/// Modifier map id used when the first layout does not name one
pub const DEFAULT_MODIFIERS_ID: &str = "Modifiers";

/// Key code → output for one modifier index
pub type KeyMap = BTreeMap<u32, KeyOutput>;

/// Attributes of one `<layout>` element, in declaration order
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LayoutAttributes(Vec<(String, String)>);

impl LayoutAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an attribute, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets an attribute, keeping the original position when it exists
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LayoutAttributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attributes = LayoutAttributes::new();
        for (key, value) in iter {
            attributes.set(key, value);
        }
        attributes
    }
}

/// A complete keyboard description
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Keylayout {
    /// Script group number (126 is Unicode)
    pub group: i32,

    /// Keyboard id; negative for custom layouts
    pub id: i32,

    /// Name shown in the input menu
    pub name: String,

    /// Most characters a single keystroke can produce
    pub maxout: u32,

    /// Key map used when no `keyMapSelect` matches
    pub default_index: u32,

    /// Physical layouts (first/last keyboard type, mapSet, modifiers)
    pub layouts: Vec<LayoutAttributes>,

    /// Modifier index → key combinations selecting it
    pub key_map_select: BTreeMap<u32, Vec<String>>,

    /// Modifier index → key map
    pub key_map: BTreeMap<u32, KeyMap>,

    /// Names of the states this keylayout uses
    pub states_list: Vec<String>,

    used_states: Vec<State>,
}

impl Default for Keylayout {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP,
            id: DEFAULT_ID,
            name: DEFAULT_NAME.to_string(),
            maxout: DEFAULT_MAXOUT,
            default_index: DEFAULT_INDEX,
            layouts: Vec::new(),
            key_map_select: BTreeMap::new(),
            key_map: BTreeMap::new(),
            states_list: Vec::new(),
            used_states: Vec::new(),
        }
    }
}

impl Keylayout {
    /// Creates an empty keylayout with the given group and id
    pub fn new(group: i32, id: i32) -> Self {
        Self {
            group,
            id,
            ..Self::default()
        }
    }

    /// Attributes of the root `<keyboard>` element, in output order
    pub fn keyboard_attributes(&self) -> [(&'static str, String); 4] {
        [
            ("group", self.group.to_string()),
            ("id", self.id.to_string()),
            ("name", self.name.clone()),
            ("maxout", self.maxout.to_string()),
        ]
    }

    /// Id of the modifier map, taken from the first layout
    pub fn modifiers_id(&self) -> &str {
        self.layouts
            .first()
            .and_then(|layout| layout.get("modifiers"))
            .unwrap_or(DEFAULT_MODIFIERS_ID)
    }

    /// Every distinct action fired by any key, in id order
    ///
    /// When two keys fire actions with the same id, the first one found
    /// (lowest modifier index, then lowest key code) is kept.
    pub fn actions(&self) -> BTreeSet<&Action> {
        self.key_map
            .values()
            .flat_map(|key_map| key_map.values())
            .filter_map(KeyOutput::as_action)
            .collect()
    }

    /// Declared states plus every state a key's action transitions into
    ///
    /// Order is first appearance; duplicates are dropped.
    pub fn referenced_states(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let transitions = self
            .key_map
            .values()
            .flat_map(|key_map| key_map.values())
            .filter_map(KeyOutput::as_action)
            .filter_map(|action| action.next.as_deref());

        for name in self.states_list.iter().map(String::as_str).chain(transitions) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Copies every state in `states_list` out of the repository
    ///
    /// States reached only through another state's actions (chained dead
    /// keys) are followed and included as well.
    ///
    /// # Errors
    /// `KeylayoutError::MissingState` for the first name the repository
    /// does not know; `used_states` is left untouched in that case.
    pub fn resolve_used_states(&mut self, states: &StateRepository) -> Result<(), KeylayoutError> {
        let mut pending: Vec<String> = self.states_list.clone();
        let mut resolved: Vec<State> = Vec::new();
        let mut cursor = 0;

        while cursor < pending.len() {
            let state = states.resolve(&pending[cursor])?;
            cursor += 1;

            let chained = state
                .action_to_output_map
                .values()
                .filter_map(KeyOutput::as_action)
                .filter_map(|action| action.next.as_deref());
            for next in chained {
                if !pending.iter().any(|name| name == next) {
                    pending.push(next.to_string());
                }
            }

            debug!(state = %state.name, "Using state");
            resolved.push(state.clone());
        }

        self.used_states = resolved;
        Ok(())
    }

    /// States resolved by `resolve_used_states`
    pub fn used_states(&self) -> &[State] {
        &self.used_states
    }
}

impl fmt::Display for Keylayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keylayout({}, (id: {}))", self.name, self.id)
    }
}
