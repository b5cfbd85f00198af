use chrono::{DateTime, TimeZone, Utc};

use crate::core::actions::{Action, KeyOutput};
use crate::core::error::KeylayoutError;
use crate::core::keylayout::{KeyMap, Keylayout, LayoutAttributes};
use crate::core::repository::StateRepository;
use crate::core::state::State;
use crate::render::KeylayoutRenderer;

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2019, 12, 7, 21, 54, 51).unwrap()
}

fn renderer() -> KeylayoutRenderer {
    KeylayoutRenderer::new("0.2.0").with_timestamp(fixed_time())
}

/// Helper: a small keylayout with one dead key and a resolved acute state
fn acute_layout() -> Keylayout {
    let mut keylayout = Keylayout::default();
    keylayout.default_index = 6;
    keylayout.layouts.push(
        LayoutAttributes::new()
            .with("first", "0")
            .with("last", "17")
            .with("mapSet", "ANSI")
            .with("modifiers", "f4"),
    );
    keylayout.key_map_select.insert(0, vec!["".to_string()]);
    keylayout
        .key_map_select
        .insert(3, vec!["anyOption".to_string(), "anyOption caps".to_string()]);

    let mut plain = KeyMap::new();
    plain.insert(0, KeyOutput::Action(Action::new("a")));
    plain.insert(39, KeyOutput::Action(Action::new("&#x0027;")));
    plain.insert(49, KeyOutput::literal(" "));
    keylayout.key_map.insert(0, plain);

    let mut option = KeyMap::new();
    option.insert(14, KeyOutput::Action(Action::transition("acute", "acute")));
    option.insert(43, KeyOutput::literal("&"));
    keylayout.key_map.insert(3, option);

    keylayout.states_list = keylayout.referenced_states();

    let acute = State::new("acute", "´")
        .with_map([("a", KeyOutput::literal("á")), ("'", KeyOutput::literal("´"))]);
    let repository = StateRepository::from_states([acute]);
    keylayout.resolve_used_states(&repository).unwrap();

    keylayout
}

// ============================================================================
// Guards
// ============================================================================

#[test]
fn test_render_without_keylayout_fails() {
    assert_eq!(renderer().render(None), Err(KeylayoutError::NilKeylayout));
}

// ============================================================================
// Header
// ============================================================================

#[test]
fn test_header_lines() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();
    let lines: Vec<&str> = xml.lines().take(4).collect();

    assert_eq!(
        lines,
        vec![
            r#"<?xml version="1.1" encoding="UTF-8"?>"#,
            r#"<!DOCTYPE keyboard SYSTEM "file://localhost/System/Library/DTDs/KeyboardLayout.dtd">"#,
            "<!-- Created by Symboard version 0.2.0 at 2019-12-07 21:54:51 (UTC) -->",
            "<!-- Last updated by Symboard version 0.2.0 at 2019-12-07 21:54:51 (UTC) -->",
        ]
    );
}

#[test]
fn test_render_is_reproducible() {
    let keylayout = acute_layout();
    let first = renderer().render(Some(&keylayout)).unwrap();
    let second = renderer().render(Some(&keylayout)).unwrap();
    assert_eq!(first, second, "Same input and timestamp should give identical bytes");
}

#[test]
fn test_single_trailing_newline() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();
    assert!(xml.ends_with("</keyboard>\n"));
    assert!(!xml.ends_with("\n\n"));
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_keyboard_and_layouts() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();

    assert!(xml.contains(r#"<keyboard group="126" id="-19341" name="Untitled" maxout="1">"#));
    assert!(xml.contains(
        "\n  <layouts>\n    <layout first=\"0\" last=\"17\" mapSet=\"ANSI\" modifiers=\"f4\"/>\n  </layouts>"
    ));
}

#[test]
fn test_modifier_map() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();

    assert!(xml.contains(r#"<modifierMap id="f4" defaultIndex="6">"#));
    assert!(xml.contains("<keyMapSelect mapIndex=\"0\">\n      <modifier keys=\"\"/>"));
    assert!(xml.contains(
        "<keyMapSelect mapIndex=\"3\">\n      <modifier keys=\"anyOption\"/>\n      <modifier keys=\"anyOption caps\"/>"
    ));
}

#[test]
fn test_key_map_set() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();

    assert!(xml.contains(r#"<keyMapSet id="ANSI">"#));
    assert!(xml.contains(r#"<keyMap index="0">"#));
    assert!(xml.contains(r#"<key code="0" action="a"/>"#));
    assert!(xml.contains(r#"<key code="49" output=" "/>"#));
    assert!(xml.contains(r#"<key code="14" action="acute"/>"#));
}

#[test]
fn test_actions() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();

    assert!(xml.contains(
        "<action id=\"a\">\n      <when state=\"none\" output=\"a\"/>\n      <when state=\"acute\" output=\"á\"/>\n    </action>"
    ));
    assert!(xml.contains(
        "<action id=\"acute\">\n      <when state=\"none\" next=\"acute\"/>\n    </action>"
    ));
}

#[test]
fn test_terminators() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();
    assert!(xml.contains("<terminators>\n    <when state=\"acute\" output=\"´\"/>\n  </terminators>"));
}

#[test]
fn test_section_order() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();
    let position = |tag: &str| xml.find(tag).unwrap_or_else(|| panic!("{} missing", tag));

    assert!(position("<layouts>") < position("<modifierMap"));
    assert!(position("<modifierMap") < position("<keyMapSet"));
    assert!(position("<keyMapSet") < position("<actions>"));
    assert!(position("<actions>") < position("<terminators>"));
}

#[test]
fn test_actions_sorted_by_id() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();
    let quote = xml.find(r#"<action id="&#x0027;">"#).unwrap();
    let a = xml.find(r#"<action id="a">"#).unwrap();
    let acute = xml.find(r#"<action id="acute">"#).unwrap();

    assert!(quote < a && a < acute, "Actions should be written in id order");
}

#[test]
fn test_without_actions_or_states() {
    let mut keylayout = Keylayout::default();
    let mut plain = KeyMap::new();
    plain.insert(0, KeyOutput::literal("a"));
    keylayout.key_map.insert(0, plain);

    let xml = renderer().render(Some(&keylayout)).unwrap();
    assert!(!xml.contains("<actions"), "No actions element without actions");
    assert!(!xml.contains("<terminators"), "No terminators element without states");
    assert!(xml.contains("<layouts/>"), "Childless elements are written empty");
    assert!(xml.contains(r#"<modifierMap id="Modifiers" defaultIndex="0"/>"#));
}

#[test]
fn test_state_action_renders_next() {
    let mut keylayout = Keylayout::default();
    let mut plain = KeyMap::new();
    plain.insert(46, KeyOutput::Action(Action::transition("greek", "greek")));
    keylayout.key_map.insert(0, plain);
    keylayout.states_list = keylayout.referenced_states();

    let greek = State::new("greek", "µ").with_map([(
        "greek",
        KeyOutput::Action(Action::transition("greek", "greek_acute")),
    )]);
    let repository = StateRepository::from_states([greek, State::new("greek_acute", "΄")]);
    keylayout.resolve_used_states(&repository).unwrap();

    let xml = renderer().render(Some(&keylayout)).unwrap();
    assert!(xml.contains(r#"<when state="greek" next="greek_acute"/>"#));
    assert!(xml.contains(r#"<when state="greek_acute" output="΄"/>"#));
}

// ============================================================================
// Escaping
// ============================================================================

#[test]
fn test_numeric_references_survive() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();

    assert!(xml.contains(r#"<key code="39" action="&#x0027;"/>"#));
    assert!(xml.contains(r#"<when state="acute" output="´"/>"#));
    assert!(!xml.contains("&amp;#x"), "No escaped numeric references may remain");
}

#[test]
fn test_literal_numeric_reference_output_survives() {
    let mut keylayout = Keylayout::default();
    let mut plain = KeyMap::new();
    plain.insert(39, KeyOutput::literal("&#x0027;"));
    keylayout.key_map.insert(0, plain);

    let xml = renderer().render(Some(&keylayout)).unwrap();
    assert!(xml.contains(r#"<key code="39" output="&#x0027;"/>"#));
}

#[test]
fn test_bare_ampersand_stays_escaped() {
    let xml = renderer().render(Some(&acute_layout())).unwrap();
    assert!(xml.contains(r#"<key code="43" output="&amp;"/>"#));
}

#[test]
fn test_quotes_in_attributes() {
    let mut keylayout = Keylayout::default();
    keylayout.name = "My \"Layout\" <1>".to_string();

    let xml = renderer().render(Some(&keylayout)).unwrap();
    assert!(xml.contains(r#"name="My &quot;Layout&quot; &lt;1&gt;""#));
}
