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

//! src/render/keylayout_xml.rs
//!
//! XML generation for resolved keylayouts
//!
//! The document layout is fixed and its order matters, because generated
//! files are compared byte for byte:
//!
//! ```text
//! <?xml ...?>, <!DOCTYPE ...>, created/updated comments
//! <keyboard group id name maxout>
//!   <layouts>        one <layout> per layout
//!   <modifierMap>    one <keyMapSelect> per modifier index
//!   <keyMapSet>      one <keyMap> per modifier index, one <key> per code
//!   <actions>        only when a key fires an action
//!   <terminators>    only when the keylayout uses states
//! </keyboard>
//! ```
//!
//! # Numeric character references
//!
//! Action ids such as `&#x0027;` must reach the file unescaped, but the
//! writer escapes every `&`. After serialisation a final pass turns
//! `&amp;#x...;` back into `&#x...;`. A bare `&` stays `&amp;`.

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use tracing::{debug, info};

use crate::core::actions::KeyOutput;
use crate::core::error::KeylayoutError;
use crate::core::keylayout::Keylayout;

const XML_VERSION: &str = "1.1";
const XML_ENCODING: &str = "UTF-8";
const DOCTYPE: &str =
    r#"keyboard SYSTEM "file://localhost/System/Library/DTDs/KeyboardLayout.dtd""#;

/// Id of the only `keyMapSet` element
const KEY_MAP_SET_ID: &str = "ANSI";

/// State name for actions fired while no dead key is active
const NO_STATE: &str = "none";

/// Format of the timestamps embedded in the header comments
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S (UTC)";

type Attributes<'a> = Vec<(&'a str, &'a str)>;

/// Renders keylayouts as `.keylayout` documents
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use symboard::core::Keylayout;
/// use symboard::render::KeylayoutRenderer;
///
/// let renderer = KeylayoutRenderer::new("0.2.0")
///     .with_timestamp(Utc.with_ymd_and_hms(2019, 12, 7, 21, 54, 51).unwrap());
/// let xml = renderer.render(Some(&Keylayout::default()))?;
///
/// assert!(xml.contains("<!-- Created by Symboard version 0.2.0 at 2019-12-07 21:54:51 (UTC) -->"));
/// # Ok::<(), symboard::core::KeylayoutError>(())
/// ```
#[derive(Clone, Debug)]
pub struct KeylayoutRenderer {
    version: String,
    timestamp: Option<DateTime<Utc>>,
    escaped_reference: Regex,
}

impl KeylayoutRenderer {
    /// Creates a renderer that stamps documents with `version` and the
    /// current time
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            timestamp: None,
            // Only well-formed `&#x<hex>;` references are restored; anything
            // else stays escaped
            escaped_reference: Regex::new(r"&amp;(#x[0-9A-Fa-f]+;)")
                .expect("escaped numeric reference pattern should be valid regex"),
        }
    }

    /// Uses a fixed timestamp instead of the current time
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Renders a resolved keylayout
    ///
    /// The keylayout's used states must already be resolved; states that
    /// were not resolved are simply not written.
    ///
    /// # Errors
    /// - `KeylayoutError::NilKeylayout` when `keylayout` is `None`
    /// - `KeylayoutError::Serialization` if the XML writer fails
    pub fn render(&self, keylayout: Option<&Keylayout>) -> Result<String, KeylayoutError> {
        let keylayout = keylayout.ok_or(KeylayoutError::NilKeylayout)?;
        info!("Rendering {}", keylayout);

        let mut document = XmlDocument::new();
        self.write_preamble(&mut document)?;

        let keyboard = keylayout.keyboard_attributes();
        let keyboard: Attributes = keyboard.iter().map(|(k, v)| (*k, v.as_str())).collect();

        document.start("keyboard", &keyboard)?;
        write_layouts(&mut document, keylayout)?;
        write_modifier_map(&mut document, keylayout)?;
        write_key_map_set(&mut document, keylayout)?;
        write_actions(&mut document, keylayout)?;
        write_terminators(&mut document, keylayout)?;
        document.end("keyboard")?;

        let xml = document.finish()?;
        Ok(self.restore_numeric_references(&xml))
    }

    fn write_preamble(&self, document: &mut XmlDocument) -> Result<(), KeylayoutError> {
        let timestamp = self
            .timestamp
            .unwrap_or_else(Utc::now)
            .format(TIMESTAMP_FORMAT)
            .to_string();

        document.write(Event::Decl(BytesDecl::new(XML_VERSION, Some(XML_ENCODING), None)))?;
        document.write(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;
        document.comment(&format!(
            " Created by Symboard version {} at {} ",
            self.version, timestamp
        ))?;
        document.comment(&format!(
            " Last updated by Symboard version {} at {} ",
            self.version, timestamp
        ))
    }

    /// Un-escapes `&amp;#x...;` so numeric references reach the file intact
    fn restore_numeric_references(&self, xml: &str) -> String {
        self.escaped_reference.replace_all(xml, "&$1").into_owned()
    }
}

fn write_layouts(document: &mut XmlDocument, keylayout: &Keylayout) -> Result<(), KeylayoutError> {
    document.container("layouts", &[], keylayout.layouts.is_empty(), |document| {
        for layout in &keylayout.layouts {
            let attributes: Attributes = layout.iter().collect();
            document.empty("layout", &attributes)?;
        }
        Ok(())
    })
}

fn write_modifier_map(
    document: &mut XmlDocument,
    keylayout: &Keylayout,
) -> Result<(), KeylayoutError> {
    let default_index = keylayout.default_index.to_string();
    let attributes = [("id", keylayout.modifiers_id()), ("defaultIndex", default_index.as_str())];

    document.container(
        "modifierMap",
        &attributes,
        keylayout.key_map_select.is_empty(),
        |document| {
            for (index, combinations) in &keylayout.key_map_select {
                let index = index.to_string();
                document.container(
                    "keyMapSelect",
                    &[("mapIndex", index.as_str())],
                    combinations.is_empty(),
                    |document| {
                        for keys in combinations {
                            document.empty("modifier", &[("keys", keys.as_str())])?;
                        }
                        Ok(())
                    },
                )?;
            }
            Ok(())
        },
    )
}

fn write_key_map_set(
    document: &mut XmlDocument,
    keylayout: &Keylayout,
) -> Result<(), KeylayoutError> {
    document.container(
        "keyMapSet",
        &[("id", KEY_MAP_SET_ID)],
        keylayout.key_map.is_empty(),
        |document| {
            for (index, key_map) in &keylayout.key_map {
                let index = index.to_string();
                document.container(
                    "keyMap",
                    &[("index", index.as_str())],
                    key_map.is_empty(),
                    |document| {
                        for (code, output) in key_map {
                            let code = code.to_string();
                            let attribute = match output {
                                KeyOutput::Literal(text) => ("output", text.as_str()),
                                KeyOutput::Action(action) => ("action", action.id.as_str()),
                            };
                            document.empty("key", &[("code", code.as_str()), attribute])?;
                        }
                        Ok(())
                    },
                )?;
            }
            Ok(())
        },
    )
}

fn write_actions(document: &mut XmlDocument, keylayout: &Keylayout) -> Result<(), KeylayoutError> {
    let actions = keylayout.actions();
    if actions.is_empty() {
        return Ok(());
    }

    document.start("actions", &[])?;
    for action in actions {
        debug!(action = %action, "Writing action");
        document.start("action", &[("id", action.id.as_str())])?;

        let entered = match &action.next {
            Some(next) => ("next", next.as_str()),
            None => ("output", action.id.as_str()),
        };
        document.empty("when", &[("state", NO_STATE), entered])?;

        for state in keylayout.used_states() {
            if let Some(output) = state.output_for(&action.id) {
                document.empty("when", &when_in_state(&state.name, output))?;
            }
        }

        document.end("action")?;
    }
    document.end("actions")
}

fn write_terminators(
    document: &mut XmlDocument,
    keylayout: &Keylayout,
) -> Result<(), KeylayoutError> {
    let states = keylayout.used_states();
    if states.is_empty() {
        return Ok(());
    }

    document.start("terminators", &[])?;
    for state in states {
        document.empty(
            "when",
            &[("state", state.name.as_str()), ("output", state.terminator.as_str())],
        )?;
    }
    document.end("terminators")
}

/// Attributes of a `when` element for an action pressed inside `state`
fn when_in_state<'a>(state: &'a str, output: &'a KeyOutput) -> [(&'static str, &'a str); 2] {
    let result = match output {
        KeyOutput::Literal(text) => ("output", text.as_str()),
        KeyOutput::Action(action) => match &action.next {
            Some(next) => ("next", next.as_str()),
            None => ("output", action.id.as_str()),
        },
    };
    [("state", state), result]
}

/// Escapes an attribute value: `&`, `<`, `>`, `"` and control whitespace
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Indented XML output with a few element helpers
struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), KeylayoutError> {
        self.writer
            .write_event(event)
            .map_err(|e| KeylayoutError::Serialization(e.to_string()))
    }

    fn comment(&mut self, text: &str) -> Result<(), KeylayoutError> {
        self.write(Event::Comment(BytesText::from_escaped(text)))
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), KeylayoutError> {
        self.write(Event::Start(element(name, attributes)))
    }

    fn end(&mut self, name: &str) -> Result<(), KeylayoutError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), KeylayoutError> {
        self.write(Event::Empty(element(name, attributes)))
    }

    /// Writes an element whose children come from `children`, or an empty
    /// element when `is_empty` is set
    fn container<F>(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
        is_empty: bool,
        children: F,
    ) -> Result<(), KeylayoutError>
    where
        F: FnOnce(&mut Self) -> Result<(), KeylayoutError>,
    {
        if is_empty {
            return self.empty(name, attributes);
        }
        self.start(name, attributes)?;
        children(self)?;
        self.end(name)
    }

    /// Returns the document text, ending with a newline
    fn finish(self) -> Result<String, KeylayoutError> {
        let mut xml = String::from_utf8(self.writer.into_inner())
            .map_err(|e| KeylayoutError::Serialization(e.to_string()))?;
        xml.push('\n');
        Ok(xml)
    }
}

fn element<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
    let mut element = BytesStart::new(name);
    for (key, value) in attributes {
        let value = escape_attribute(value);
        element.push_attribute((key.as_bytes(), value.as_bytes()));
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attribute() {
        assert_eq!(escape_attribute("a&b"), "a&amp;b");
        assert_eq!(escape_attribute("<\">"), "&lt;&quot;&gt;");
        assert_eq!(escape_attribute("'"), "'", "Apostrophes are left alone");
        assert_eq!(escape_attribute("´"), "´");
    }

    #[test]
    fn test_restore_numeric_references() {
        let renderer = KeylayoutRenderer::new("test");
        assert_eq!(
            renderer.restore_numeric_references(r#"id="&amp;#x0027;" x="&amp;" y="&amp;#xZZ;""#),
            r#"id="&#x0027;" x="&amp;" y="&amp;#xZZ;""#
        );
    }

    #[test]
    fn test_unterminated_reference_stays_escaped() {
        let renderer = KeylayoutRenderer::new("test");
        assert_eq!(
            renderer.restore_numeric_references(r#"a="&amp;#x41" b="&amp;#x41;""#),
            r#"a="&amp;#x41" b="&#x41;""#
        );
    }
}
