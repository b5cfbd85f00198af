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

//! src/compiler.rs
//!
//! The compile pipeline: specification → keylayout → XML → file
//!
//! Each stage logs its progress. Content problems surface as
//! `CompileError::Keylayout`, file problems as `CompileError::Config`, so a
//! caller can tell "fix the specification" apart from "pick another path".

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::{
    load_base_layouts, load_states, parse_yaml_file, ConfigError, KeylayoutFileWriter, Settings,
};
use crate::core::{BaseLayouts, KeylayoutBuilder, KeylayoutError, KeylayoutSpec, StateRepository};
use crate::render::KeylayoutRenderer;

/// Errors from a compile run
#[derive(Debug, Error)]
pub enum CompileError {
    /// Reading inputs or writing the output failed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The specification does not describe a valid keylayout
    #[error(transparent)]
    Keylayout(#[from] KeylayoutError),
}

/// Compiles specification files into `.keylayout` files
#[derive(Clone, Debug)]
pub struct Compiler {
    settings: Settings,
    timestamp: Option<DateTime<Utc>>,
}

impl Compiler {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            timestamp: None,
        }
    }

    /// Stamps generated files with a fixed time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Compiles `spec_path` and writes the result
    ///
    /// Without an `output`, the configured default output path is used.
    /// Returns the path actually written, after extension correction.
    ///
    /// # Errors
    /// Any error from loading, building, rendering or writing. Nothing is
    /// written unless rendering succeeded.
    pub fn run(&self, spec_path: &Path, output: Option<&Path>) -> Result<PathBuf, CompileError> {
        let contents = self.render(spec_path)?;
        let target = output.unwrap_or(self.settings.default_output_path.as_path());

        let written = KeylayoutFileWriter::new(target).write(&contents)?;
        info!("Wrote {}", written.display());
        Ok(written)
    }

    /// Compiles `spec_path` to XML without writing anything
    ///
    /// # Errors
    /// Same as [`Compiler::run`], minus the write errors.
    pub fn render(&self, spec_path: &Path) -> Result<String, CompileError> {
        info!("Loading specification from {}", spec_path.display());
        let spec = KeylayoutSpec::from_value(parse_yaml_file(spec_path)?)?;

        let base_layouts = load_base_layouts(&self.settings)?;
        let states = load_states(&self.settings)?;

        Ok(self.render_spec(&spec, &base_layouts, &states)?)
    }

    /// Builds, resolves and renders an already-loaded specification
    ///
    /// # Errors
    /// Any `KeylayoutError` from building, state resolution or rendering.
    pub fn render_spec(
        &self,
        spec: &KeylayoutSpec,
        base_layouts: &BaseLayouts,
        states: &StateRepository,
    ) -> Result<String, KeylayoutError> {
        info!("Building keylayout");
        let mut keylayout = KeylayoutBuilder::new(base_layouts).from_spec(spec)?;

        info!("Resolving {} states", keylayout.states_list.len());
        keylayout.resolve_used_states(states)?;

        let renderer = KeylayoutRenderer::new(self.settings.version.as_str());
        let renderer = match self.timestamp {
            Some(timestamp) => renderer.with_timestamp(timestamp),
            None => renderer,
        };
        renderer.render(Some(&keylayout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    /// Settings pointing at the layouts and states shipped with the crate
    fn shipped_settings() -> Settings {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        Settings {
            states_dir: root.join("states"),
            keylayouts_dir: root.join("keylayouts"),
            ..Settings::default()
        }
    }

    fn compiler() -> Compiler {
        Compiler::new(shipped_settings())
            .with_timestamp(Utc.with_ymd_and_hms(2019, 12, 7, 21, 54, 51).unwrap())
    }

    fn write_spec(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("spec.yaml");
        fs::write(&path, content).unwrap();
        path
    }

    /// Returns the text between `<terminators>` and `</terminators>`
    fn terminators(xml: &str) -> &str {
        let start = xml.find("<terminators>").expect("terminators element");
        let end = xml.find("</terminators>").expect("closing terminators element");
        &xml[start..end]
    }

    #[test]
    fn test_minimal_iso_spec() {
        let temp_dir = TempDir::new().unwrap();
        let spec = write_spec(
            &temp_dir,
            "base_layout: iso\nid: -19341\ngroup: 126\ndefault_index: 6\n",
        );

        let xml = compiler().render(&spec).unwrap();

        assert!(xml.contains(r#"<keyboard group="126" id="-19341" name="Untitled" maxout="1">"#));
        assert!(xml.contains(r#"defaultIndex="6""#));

        let terminators = terminators(&xml);
        let whens = terminators.matches("<when ").count();
        assert_eq!(whens, 5, "One terminator per dead-key state:\n{}", terminators);
        assert!(terminators.contains(r#"<when state="acute" output="´"/>"#));
    }

    #[test]
    fn test_acute_outputs_reach_actions() {
        let temp_dir = TempDir::new().unwrap();
        let spec = write_spec(&temp_dir, "base_layout: iso\nid: -19341\ngroup: 126\n");

        let xml = compiler().render(&spec).unwrap();
        assert!(xml.contains(r#"<when state="acute" output="á"/>"#));
        assert!(xml.contains(r#"<when state="acute" output="É"/>"#));
    }

    #[test]
    fn test_overridden_dead_keys_leave_no_states() {
        let temp_dir = TempDir::new().unwrap();
        let spec = write_spec(
            &temp_dir,
            "base_layout: iso\nid: 1\ngroup: 126\nkey_map:\n  3: {14: x, 32: x, 34: x, 45: x, 50: x}\n  5: {14: x, 32: x, 34: x, 45: x, 50: x}\n",
        );

        let xml = compiler().render(&spec).unwrap();
        assert!(!xml.contains("next="), "No key enters a state any more");
        assert!(!xml.contains("<terminators"), "Unreachable states must not be written");
        assert!(!xml.contains(r#"<when state="acute""#));
    }

    #[test]
    fn test_run_writes_once() {
        let temp_dir = TempDir::new().unwrap();
        let spec = write_spec(&temp_dir, "base_layout: ansi\nid: 1\ngroup: 126\nname: Test\n");
        let output = temp_dir.path().join("test");

        let written = compiler().run(&spec, Some(&output)).unwrap();
        assert_eq!(written, temp_dir.path().join("test.keylayout"));

        let contents = fs::read_to_string(&written).unwrap();
        assert!(contents.contains(r#"name="Test""#));

        let again = compiler().run(&spec, Some(&output));
        assert!(matches!(
            again,
            Err(CompileError::Config(ConfigError::FileExists(_)))
        ));
    }

    #[test]
    fn test_specification_errors_write_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let spec = write_spec(&temp_dir, "base_layout: qwertz\nid: 1\ngroup: 126\n");
        let output = temp_dir.path().join("out.keylayout");

        let result = compiler().run(&spec, Some(&output));
        assert!(matches!(
            result,
            Err(CompileError::Keylayout(KeylayoutError::Specification(_)))
        ));
        assert!(!output.exists(), "No file may be written on failure");
    }

    #[test]
    fn test_missing_state_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let spec = write_spec(
            &temp_dir,
            "base_layout: iso\nid: 1\ngroup: 126\nstates: [cedilla_hook]\n",
        );

        let result = compiler().render(&spec);
        assert!(matches!(
            result,
            Err(CompileError::Keylayout(KeylayoutError::MissingState(name))) if name == "cedilla_hook"
        ));
    }

    #[test]
    fn test_render_is_reproducible() {
        let temp_dir = TempDir::new().unwrap();
        let spec = write_spec(&temp_dir, "base_layout: iso\nid: 1\ngroup: 126\n");

        assert_eq!(compiler().render(&spec).unwrap(), compiler().render(&spec).unwrap());
    }
}
