
use test_utils::{open_fixture, setup_test_env};

use spicekit_asc::{
    parse, AscEditor, EditorError, HorAlign, ParseError, Point, Rotation, VerAlign,
};
use std::fs;

#[test]
fn test_fixtures_roundtrip_byte_identical() {
    let env = setup_test_env();
    for name in ["rc_filter.asc", "opamp_amplifier.asc"] {
        let original = fs::read_to_string(env.path().join(name)).unwrap();
        let editor = open_fixture(&env, name);
        assert_eq!(editor.to_string(), original, "{name} did not round trip");
        assert_eq!(parse(&editor.to_string()).unwrap(), *editor.schematic());
    }
}

#[test]
fn test_rc_filter_model() {
    let env = setup_test_env();
    let editor = open_fixture(&env, "rc_filter.asc");

    assert_eq!(editor.version, 4);
    assert_eq!(editor.sheet, "1 880 680");
    assert_eq!(editor.wires.len(), 5);
    assert_eq!(editor.labels.len(), 3);
    assert_eq!(editor.get_components("*"), vec!["V1", "R1", "C1", "Rload"]);

    let r1 = editor.get_component("R1").unwrap();
    assert_eq!(r1.symbol, "res");
    assert_eq!(r1.position, Point::new(176, 48));
    assert_eq!(r1.rotation, Rotation::R90);
    let value_window = r1.attributes["WINDOW 3"].as_window().unwrap();
    assert_eq!(value_window.coord, Point::new(32, 56));
    assert_eq!(value_window.h_align, HorAlign::Center);
    assert_eq!(value_window.v_align, VerAlign::Top);

    assert_eq!(
        editor.get_component_value("V1").unwrap(),
        "PULSE(0 5 0 1n 1n 5m 10m)"
    );
    assert_eq!(editor.instructions().count(), 2);
    assert_eq!(editor.comments().next().unwrap().text, "First order low pass");
}

#[test]
fn test_rc_filter_edit_and_save() {
    let env = setup_test_env();
    let mut editor = open_fixture(&env, "rc_filter.asc");

    editor.set_component_value("R1", 11000).unwrap();
    editor.set_component_value("C1", 4.7e-9).unwrap();
    editor.set_parameter("Rl", 2.2e6).unwrap();
    editor.add_instruction(".tran 0 50m 0 10u").unwrap();
    editor.add_instruction(".meas TRAN vmax MAX V(out)").unwrap();

    let saved = editor.save(env.path().join("rc_edited")).unwrap();
    assert_eq!(saved, env.path().join("rc_edited.asc"));

    let reopened = AscEditor::open(&saved).unwrap();
    assert_eq!(reopened.get_component_value("R1").unwrap(), "11k");
    assert_eq!(reopened.get_component_value("C1").unwrap(), "4.7n");
    assert_eq!(reopened.get_parameter("Rl").unwrap(), "2.2Meg");

    let directives: String = reopened
        .directives
        .iter()
        .map(|d| format!("{} {} {}\n", d.coord.x, d.coord.y, d.text))
        .collect();
    insta::assert_snapshot!(directives, @r"
    64 264 .tran 0 50m 0 10u
    64 288 .param Rl=2.2Meg
    64 312 First order low pass
    64 336 .meas TRAN vmax MAX V(out)
    ");
}

#[test]
fn test_opamp_parameters() {
    let env = setup_test_env();
    let mut editor = open_fixture(&env, "opamp_amplifier.asc");

    assert_eq!(editor.get_parameter("gain").unwrap(), "10");
    assert_eq!(editor.get_parameter("RIN").unwrap(), "10k");

    editor.set_parameter("gain", 20).unwrap();
    assert_eq!(editor.directives[1].text, ".PARAM gain = 20 Rin=10k");

    editor.set_parameters([("Rin", "4.7k"), ("Cf", "10p")]).unwrap();
    assert_eq!(editor.directives[1].text, ".PARAM gain = 20 Rin=4.7k");
    let added = editor.directives.last().unwrap();
    assert_eq!(added.text, ".param Cf=10p");
    assert_eq!(added.coord, Point::new(-160, 320));
}

#[test]
fn test_opamp_instructions() {
    let env = setup_test_env();
    let mut editor = open_fixture(&env, "opamp_amplifier.asc");

    // The commented .tran does not count as an existing analysis
    editor.add_instruction(".tran 1m").unwrap();
    assert_eq!(editor.directives.len(), 6);

    editor.add_instruction(".ac oct 10 1 1Meg").unwrap();
    assert_eq!(editor.directives[0].text, ".ac oct 10 1 1Meg");
    assert_eq!(editor.directives.len(), 6);

    assert_eq!(editor.remove_instruction_matching(r"\.step").unwrap(), 1);
    // Comments are matched by text too
    assert_eq!(editor.remove_instruction(".tran 1m").unwrap(), 2);
    assert_eq!(editor.directives.len(), 3);
}

#[test]
fn test_opamp_components() {
    let env = setup_test_env();
    let mut editor = open_fixture(&env, "opamp_amplifier.asc");

    assert_eq!(editor.get_components("R"), vec!["Rf", "Rin"]);
    assert_eq!(
        editor.get_component("U1").unwrap().symbol,
        r"OpAmps\\UniversalOpAmp2"
    );
    assert_eq!(editor.get_component_attribute("Rin", "Tolerance").unwrap(), "1");
    assert!(matches!(
        editor.get_component_value("U1"),
        Err(EditorError::MissingValue(_))
    ));

    editor.set_element_model("U1", r"OpAmps\\opamp2").unwrap();
    editor.remove_component("Vin").unwrap();
    assert_eq!(editor.get_components("*"), vec!["U1", "Rf", "Rin"]);
    assert!(!editor.to_string().contains("Vin"));
}

#[test]
fn test_reset_restores_file_state() {
    let env = setup_test_env();
    let mut editor = open_fixture(&env, "rc_filter.asc");
    editor.clear();
    assert!(editor.components.is_empty());

    editor.reset().unwrap();
    assert_eq!(editor.components.len(), 4);
    assert_eq!(editor.circuit_file(), env.path().join("rc_filter.asc"));
}

#[test]
fn test_structural_errors() {
    let env = setup_test_env();

    let err = AscEditor::open(env.path().join("legacy_version.asc")).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Parse(ParseError::UnsupportedVersion { line: 1, ref version }) if version == "3"
    ));

    let err = AscEditor::open(env.path().join("orphan_symattr.asc")).unwrap_err();
    assert!(matches!(
        err,
        EditorError::Parse(ParseError::OutsideSymbol { line: 4, keyword: "SYMATTR" })
    ));
    assert_eq!(err.to_string(), "line 4: SYMATTR clause without SYMBOL");
}

#[test]
fn test_json_export() {
    let env = setup_test_env();
    let editor = open_fixture(&env, "rc_filter.asc");

    let json = serde_json::to_value(editor.schematic()).unwrap();
    assert_eq!(json["components"]["R1"]["attributes"]["Value"]["Value"], "1k");
    assert_eq!(json["components"]["R1"]["rotation"], "R90");
    assert_eq!(json["directives"][0]["text"], ".tran 20m");
}
