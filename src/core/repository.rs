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

//! src/core/repository.rs
//!
//! Immutable snapshot of every known state
//!
//! The repository is filled once when state files are loaded and is only
//! read afterwards, so it can be shared by reference between the builder
//! and the renderer (or across several compilations).

use std::collections::BTreeMap;

use crate::core::error::KeylayoutError;
use crate::core::state::State;

/// All states available to keylayouts, keyed by name
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StateRepository {
    states: BTreeMap<String, State>,
}

impl StateRepository {
    /// Creates an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository from states; a later state replaces an earlier
    /// one with the same name
    pub fn from_states(states: impl IntoIterator<Item = State>) -> Self {
        states.into_iter().collect()
    }

    /// Adds a state, replacing any state with the same name
    pub fn insert(&mut self, state: State) -> Option<State> {
        self.states.insert(state.name.clone(), state)
    }

    /// Looks up a state by name
    pub fn get(&self, name: &str) -> Option<&State> {
        self.states.get(name)
    }

    /// Looks up a state that must exist
    ///
    /// # Errors
    /// `KeylayoutError::MissingState` if no state is called `name`.
    pub fn resolve(&self, name: &str) -> Result<&State, KeylayoutError> {
        self.get(name)
            .ok_or_else(|| KeylayoutError::MissingState(name.to_string()))
    }

    /// Whether a state called `name` exists
    pub fn contains(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    /// Iterates over all states in name order
    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl FromIterator<State> for StateRepository {
    fn from_iter<T: IntoIterator<Item = State>>(iter: T) -> Self {
        Self {
            states: iter
                .into_iter()
                .map(|state| (state.name.clone(), state))
                .collect(),
        }
    }
}
