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

//! src/core/state.rs
//!
//! Dead-key states
//!
//! A state is entered by a dead key. While it is active, every action may
//! produce a different output (`a` becomes `á` in the acute state), and any
//! action the state does not override produces the state's terminator
//! followed by the action's normal output.
//!
//! # Building a state
//! A state's action map is composed from three sources, always applied in
//! the same order so later sources win:
//! 1. `lower` - one output per lower-case letter of a script
//! 2. `upper` - one output per upper-case letter of a script
//! 3. `map`   - explicit action → output overrides
//!
//! The order is fixed by `STATE_ATTRIBUTE_PRECEDENCE`.

use serde::Deserialize;
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use tracing::debug;

use crate::core::actions::{scalar_to_string, to_unicode, KeyOutput};
use crate::core::error::KeylayoutError;
use crate::core::script::{resolve_script, Case};

/// Separator between outputs in a `lower`/`upper` list
pub const OUTPUT_DELIMITER: &str = ",";

/// Terminator used when a state does not declare one
pub const DEFAULT_STATE_TERMINATOR: &str = " ";

/// One way of filling a state's action map
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StateAttribute {
    /// Outputs aligned with the lower row of a script
    Lower,
    /// Outputs aligned with the upper row of a script
    Upper,
    /// Explicit per-action overrides
    Map,
}

/// Order in which state attributes are applied; later entries win
pub const STATE_ATTRIBUTE_PRECEDENCE: [StateAttribute; 3] = [
    StateAttribute::Lower,
    StateAttribute::Upper,
    StateAttribute::Map,
];

/// A named keyboard state entered through a dead key
///
/// # Example
/// ```
/// use symboard::core::State;
///
/// let acute = State::new("acute", "´")
///     .with_lower("á,b́,ć,d́,é,f́,ǵ,h́,í,ȷ́,ḱ,ĺ,ḿ,ń,ó,ṕ,q́,ŕ,ś,t́,ú,v́,ẃ,x́,ý,ź")?;
///
/// assert_eq!(acute.action_to_output_map.len(), 26);
/// # Ok::<(), symboard::core::KeylayoutError>(())
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct State {
    /// Unique name of the state
    pub name: String,

    /// Output when a key without an override is pressed in this state
    pub terminator: String,

    /// Normalised action id → output while the state is active
    pub action_to_output_map: BTreeMap<String, KeyOutput>,
}

impl State {
    /// Creates an empty state
    pub fn new(name: impl Into<String>, terminator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terminator: terminator.into(),
            action_to_output_map: BTreeMap::new(),
        }
    }

    /// Creates an empty state terminated by `DEFAULT_STATE_TERMINATOR`
    pub fn with_default_terminator(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_STATE_TERMINATOR)
    }

    /// Maps the lower row of the matching script to `output_list`
    ///
    /// `output_list` is split on `OUTPUT_DELIMITER`.
    ///
    /// # Errors
    /// `KeylayoutError::AlphabetLength` if no script has as many keys as
    /// the list has outputs.
    pub fn with_lower(self, output_list: &str) -> Result<Self, KeylayoutError> {
        self.with_case(output_list, Case::Lower, OUTPUT_DELIMITER)
    }

    /// Maps the upper row of the matching script to `output_list`
    ///
    /// # Errors
    /// Same as [`State::with_lower`].
    pub fn with_upper(self, output_list: &str) -> Result<Self, KeylayoutError> {
        self.with_case(output_list, Case::Upper, OUTPUT_DELIMITER)
    }

    /// Maps one row of the matching script to a delimited output list
    ///
    /// The outputs are aligned with the script row by position. Each key
    /// of the row is normalised through the unicode-escape table before it
    /// is stored, overwriting any output already mapped to it.
    ///
    /// # Arguments
    /// * `output_list` - Outputs, in script order
    /// * `case` - Which row of the script the outputs belong to
    /// * `delimiter` - Separator between outputs
    ///
    /// # Errors
    /// `KeylayoutError::AlphabetLength` if the number of outputs matches
    /// no script, or the script has no row for `case`.
    pub fn with_case(
        mut self,
        output_list: &str,
        case: Case,
        delimiter: &str,
    ) -> Result<Self, KeylayoutError> {
        let outputs: Vec<String> = output_list.split(delimiter).map(str::to_string).collect();
        let script = resolve_script(&outputs)?;

        debug!(
            state = %self.name,
            script = script.name,
            ?case,
            "Aligning {} outputs",
            outputs.len()
        );

        let row = script.row(case).ok_or_else(|| KeylayoutError::AlphabetLength {
            length: outputs.len(),
            outputs: outputs.clone(),
        })?;

        for (key, output) in row.chars().zip(outputs) {
            let mut buffer = [0u8; 4];
            let action = to_unicode(key.encode_utf8(&mut buffer)).to_string();

            debug!(state = %self.name, %action, %output, "Mapping action");
            self.action_to_output_map
                .insert(action, KeyOutput::Literal(output));
        }

        Ok(self)
    }

    /// Overrides individual actions
    ///
    /// Every action id is normalised through the unicode-escape table, then
    /// written over whatever was mapped before.
    pub fn with_map<I, K>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, KeyOutput)>,
        K: AsRef<str>,
    {
        for (action, output) in overrides {
            let action = to_unicode(action.as_ref()).to_string();
            self.action_to_output_map.insert(action, output);
        }
        self
    }

    /// Output for an already-normalised action id, if overridden here
    pub fn output_for(&self, action_id: &str) -> Option<&KeyOutput> {
        self.action_to_output_map.get(action_id)
    }
}

/// A state as written in a state definition file
///
/// ```yaml
/// acute:
///   terminator: ´
///   lower: á,b́,ć,...
///   upper: Á,B́,Ć,...
///   map: {"'": ´}
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StateDefinition {
    #[serde(default)]
    pub terminator: Option<String>,

    #[serde(default)]
    pub lower: Option<String>,

    #[serde(default)]
    pub upper: Option<String>,

    #[serde(default)]
    pub map: Option<Mapping>,
}

impl StateDefinition {
    /// Builds the state, applying attributes in `STATE_ATTRIBUTE_PRECEDENCE`
    ///
    /// Empty attributes are skipped, and an empty or missing terminator
    /// falls back to `default_terminator`.
    ///
    /// # Errors
    /// - `KeylayoutError::AlphabetLength` for a `lower`/`upper` list of the
    ///   wrong length
    /// - `KeylayoutError::UnresolvedOutput` for a `map` entry that is
    ///   neither text nor an action
    pub fn build(
        &self,
        name: &str,
        delimiter: &str,
        default_terminator: &str,
    ) -> Result<State, KeylayoutError> {
        let terminator = self
            .terminator
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(default_terminator);

        let mut state = State::new(name, terminator);

        for attribute in STATE_ATTRIBUTE_PRECEDENCE {
            state = match attribute {
                StateAttribute::Lower => match non_empty(&self.lower) {
                    Some(list) => state.with_case(list, Case::Lower, delimiter)?,
                    None => state,
                },
                StateAttribute::Upper => match non_empty(&self.upper) {
                    Some(list) => state.with_case(list, Case::Upper, delimiter)?,
                    None => state,
                },
                StateAttribute::Map => match &self.map {
                    Some(map) if !map.is_empty() => state.with_map(map_overrides(name, map)?),
                    _ => state,
                },
            };
        }

        Ok(state)
    }
}

fn non_empty(attribute: &Option<String>) -> Option<&str> {
    attribute.as_deref().filter(|value| !value.is_empty())
}

/// Converts the `map` attribute of a state file into typed overrides
fn map_overrides(state: &str, map: &Mapping) -> Result<Vec<(String, KeyOutput)>, KeylayoutError> {
    map.iter()
        .map(|(key, value)| {
            let action = scalar_to_string(key).ok_or_else(|| KeylayoutError::UnresolvedOutput {
                location: format!("state '{}'", state),
                found: "an action id that is not text".to_string(),
            })?;
            let location = format!("state '{}', action '{}'", state, action);
            let output = KeyOutput::from_yaml(value, &location, |next| next.to_string())?;
            Ok((action, output))
        })
        .collect()
}

/// Parses a whole state definition document (`name: definition` pairs)
///
/// # Errors
/// Returns the YAML error message when the document is not a mapping of
/// state definitions.
pub fn parse_state_definitions(content: &str) -> Result<BTreeMap<String, StateDefinition>, String> {
    let document: Option<BTreeMap<String, StateDefinition>> =
        serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    Ok(document.unwrap_or_default())
}
