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

//! src/core/builder.rs
//!
//! Building keylayouts from specifications
//!
//! A specification is the YAML dictionary a user writes. There are two ways
//! to turn one into a `Keylayout`:
//!
//! - [`KeylayoutBuilder::build`] reads a complete description (key maps,
//!   modifier selection, layouts). Base layouts are written this way.
//! - [`KeylayoutBuilder::from_spec`] starts from a named base layout and
//!   applies the user's id, group and any optional overrides on top. This
//!   is what the command-line compiler uses.
//!
//! Base layouts are looked up by name in a [`BaseLayouts`] table, so adding
//! a layout is a matter of adding data, not code.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::core::actions::{scalar_to_string, Action, KeyOutput};
use crate::core::error::KeylayoutError;
use crate::core::keylayout::{KeyMap, Keylayout, LayoutAttributes, DEFAULT_GROUP, DEFAULT_ID};

/// One modifier combination or a list of them
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum ModifierCombinations {
    One(String),
    Many(Vec<String>),
}

impl ModifierCombinations {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            ModifierCombinations::One(keys) => vec![keys],
            ModifierCombinations::Many(keys) => keys,
        }
    }
}

/// A parsed specification dictionary
///
/// Every field is optional at this level; which ones are mandatory depends
/// on how the specification is built.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeylayoutSpec {
    /// Name of the base layout to start from
    #[serde(default)]
    pub base_layout: Option<String>,

    #[serde(default)]
    pub id: Option<i32>,

    #[serde(default)]
    pub group: Option<i32>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub maxout: Option<u32>,

    #[serde(default)]
    pub default_index: Option<u32>,

    /// Attributes of the single `<layout>` element
    #[serde(default)]
    pub layouts: Option<Mapping>,

    #[serde(default)]
    pub key_map_select: Option<BTreeMap<u32, ModifierCombinations>>,

    /// Modifier index → key code → output (text or `{action, next}`)
    #[serde(default)]
    pub key_map: Option<BTreeMap<u32, BTreeMap<u32, Value>>>,

    /// States to include even when no key enters them
    #[serde(default)]
    pub states: Vec<String>,
}

impl KeylayoutSpec {
    /// Reads a specification out of an already-parsed YAML document
    ///
    /// # Errors
    /// `KeylayoutError::Specification` if a field has the wrong shape or
    /// a key is unknown.
    pub fn from_value(value: Value) -> Result<Self, KeylayoutError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_yaml::from_value(value).map_err(|e| KeylayoutError::Specification(e.to_string()))
    }
}

/// Named base layouts available to `from_spec`
#[derive(Clone, Debug, Default)]
pub struct BaseLayouts {
    layouts: BTreeMap<String, KeylayoutSpec>,
}

impl BaseLayouts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a base layout, builder style
    pub fn with(mut self, name: impl Into<String>, spec: KeylayoutSpec) -> Self {
        self.insert(name, spec);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: KeylayoutSpec) {
        self.layouts.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&KeylayoutSpec> {
        self.layouts.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

/// Turns specifications into keylayouts
#[derive(Clone, Copy, Debug)]
pub struct KeylayoutBuilder<'a> {
    base_layouts: &'a BaseLayouts,
}

impl<'a> KeylayoutBuilder<'a> {
    pub fn new(base_layouts: &'a BaseLayouts) -> Self {
        Self { base_layouts }
    }

    /// Builds a keylayout from a complete description
    ///
    /// `key_map`, `key_map_select` and `layouts` are mandatory. `id` and
    /// `group` fall back to the keylayout defaults; `maxout`, `name` and
    /// `default_index` are applied only when present.
    ///
    /// # Errors
    /// - `KeylayoutError::Specification` when a mandatory key is missing or
    ///   a layout attribute is not a scalar
    /// - `KeylayoutError::UnresolvedOutput` when a key's value is neither
    ///   text nor an action
    pub fn build(spec: &KeylayoutSpec) -> Result<Keylayout, KeylayoutError> {
        let layouts = spec.layouts.as_ref().ok_or_else(|| missing("layouts"))?;
        let key_map_select = spec
            .key_map_select
            .as_ref()
            .ok_or_else(|| missing("key_map_select"))?;
        let key_map = spec.key_map.as_ref().ok_or_else(|| missing("key_map"))?;

        let mut keylayout = Keylayout::new(
            spec.group.unwrap_or(DEFAULT_GROUP),
            spec.id.unwrap_or(DEFAULT_ID),
        );

        // A spec describes one layout, but the aggregate supports several
        keylayout.layouts = vec![convert_layout(layouts)?];
        keylayout.key_map_select = convert_key_map_select(key_map_select);
        keylayout.key_map = convert_key_map(key_map)?;
        apply_optional(&mut keylayout, spec);

        keylayout.states_list = spec.states.clone();
        keylayout.states_list = keylayout.referenced_states();

        debug!(keylayout = %keylayout, states = ?keylayout.states_list, "Built keylayout");
        Ok(keylayout)
    }

    /// Builds a keylayout from a base layout plus the user's overrides
    ///
    /// `base_layout`, `id` and `group` are mandatory. Optional fields that
    /// are absent never clobber the base layout's values. Present
    /// `key_map` entries are merged key by key, `key_map_select` entries
    /// index by index, and `layouts` replaces the base layout's layout.
    /// The used states are the base layout's and the spec's declared
    /// `states` plus whatever the merged key map transitions into.
    ///
    /// # Errors
    /// `KeylayoutError::Specification` if a mandatory key is missing or the
    /// base layout is unknown, plus anything [`KeylayoutBuilder::build`]
    /// returns for the base layout or the overrides.
    ///
    /// # Example
    /// ```
    /// use symboard::core::{BaseLayouts, KeylayoutBuilder, KeylayoutSpec};
    ///
    /// let base: KeylayoutSpec = serde_yaml::from_str(
    ///     "layouts: {first: 0, last: 17, mapSet: ANSI, modifiers: Modifiers}\n\
    ///      key_map_select: {0: ''}\n\
    ///      key_map: {0: {0: a}}",
    /// )?;
    /// let spec: KeylayoutSpec = serde_yaml::from_str("base_layout: tiny\nid: -1\ngroup: 126")?;
    ///
    /// let bases = BaseLayouts::new().with("tiny", base);
    /// let keylayout = KeylayoutBuilder::new(&bases).from_spec(&spec)?;
    /// assert_eq!(keylayout.id, -1);
    /// assert_eq!(keylayout.name, "Untitled");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_spec(&self, spec: &KeylayoutSpec) -> Result<Keylayout, KeylayoutError> {
        let base_name = spec
            .base_layout
            .as_deref()
            .ok_or_else(|| missing("base_layout"))?;
        let id = spec.id.ok_or_else(|| missing("id"))?;
        let group = spec.group.ok_or_else(|| missing("group"))?;

        info!("Creating base keylayout from '{}'", base_name);
        let base = self.base_layouts.get(base_name).ok_or_else(|| {
            KeylayoutError::Specification(format!("unknown base layout '{}'", base_name))
        })?;
        let mut keylayout = Self::build(base)?;

        info!("Adding mandatory properties from spec");
        keylayout.id = id;
        keylayout.group = group;

        info!("Adding optional properties from spec");
        apply_optional(&mut keylayout, spec);

        if let Some(layouts) = &spec.layouts {
            keylayout.layouts = vec![convert_layout(layouts)?];
        }
        if let Some(key_map_select) = &spec.key_map_select {
            keylayout.key_map_select.extend(convert_key_map_select(key_map_select));
        }
        if let Some(key_map) = &spec.key_map {
            for (index, overrides) in convert_key_map(key_map)? {
                keylayout.key_map.entry(index).or_default().extend(overrides);
            }
        }

        // Transitions are taken from the merged key map only, so a state
        // whose dead keys were all overridden is no longer used
        keylayout.states_list = base.states.iter().chain(&spec.states).cloned().collect();
        keylayout.states_list = keylayout.referenced_states();

        Ok(keylayout)
    }
}

fn missing(key: &str) -> KeylayoutError {
    KeylayoutError::Specification(format!("missing mandatory key '{}'", key))
}

/// Applies `maxout`, `name` and `default_index` when they are present
fn apply_optional(keylayout: &mut Keylayout, spec: &KeylayoutSpec) {
    if let Some(maxout) = spec.maxout {
        keylayout.maxout = maxout;
    }
    if let Some(name) = &spec.name {
        keylayout.name = name.clone();
    }
    if let Some(default_index) = spec.default_index {
        keylayout.default_index = default_index;
    }
}

/// Converts layout attributes to strings, keeping their order
fn convert_layout(layout: &Mapping) -> Result<LayoutAttributes, KeylayoutError> {
    layout
        .iter()
        .map(|(key, value)| {
            match (scalar_to_string(key), scalar_to_string(value)) {
                (Some(key), Some(value)) => Ok((key, value)),
                _ => Err(KeylayoutError::Specification(
                    "layout attributes must be plain values".to_string(),
                )),
            }
        })
        .collect()
}

fn convert_key_map_select(
    key_map_select: &BTreeMap<u32, ModifierCombinations>,
) -> BTreeMap<u32, Vec<String>> {
    key_map_select
        .iter()
        .map(|(index, keys)| (*index, keys.clone().into_vec()))
        .collect()
}

fn convert_key_map(
    key_map: &BTreeMap<u32, BTreeMap<u32, Value>>,
) -> Result<BTreeMap<u32, KeyMap>, KeylayoutError> {
    let mut converted = BTreeMap::new();

    for (&index, keys) in key_map {
        let mut outputs = KeyMap::new();
        for (&code, value) in keys {
            let location = format!("key_map[{}][{}]", index, code);
            let output =
                KeyOutput::from_yaml(value, &location, |next| Action::keyed(index, code, next).id)?;
            outputs.insert(code, output);
        }
        converted.insert(index, outputs);
    }

    Ok(converted)
}
