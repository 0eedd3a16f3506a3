use super::*;
use serde_json::json;

fn fallbacks() -> Fallbacks {
    Fallbacks {
        title: "Fallback title".into(),
        summary: "Fallback summary.".into(),
        steps: vec!["one".into(), "two".into(), "three".into()],
    }
}

#[test]
fn missing_override_uses_fallbacks_and_empty_cues() {
    let out = sanitize_definition(" sn2 ", None, &fallbacks());
    let def = out.value;
    assert_eq!(def.id, "sn2");
    assert_eq!(def.title, "Fallback title");
    assert_eq!(def.path, DEFAULT_HEADLINE_PATH);
    assert_eq!(def.duration_ms, DEFAULT_DURATION_MS);
    assert_eq!(def.steps.len(), 3);
    assert!(!def.has_visual_cues());
    assert_eq!(out.dropped, 0);
    assert!(out.warnings.is_empty());
}

#[test]
fn atoms_default_coordinates_and_drop_missing_ids() {
    let raw = json!({
        "atoms": [
            {"id": " c1 ", "label": "C", "x": "12", "y": null, "charge": "x"},
            {"id": "", "label": "O"},
            "junk",
            {"id": "o1"}
        ]
    });
    let out = sanitize_definition("m", Some(&raw), &fallbacks());
    let atoms = &out.value.atoms;
    assert_eq!(atoms.len(), 2);
    assert_eq!(atoms[0].id, "c1");
    assert_eq!(atoms[0].x, 12.0);
    assert_eq!(atoms[0].y, DEFAULT_ATOM_Y);
    assert_eq!(atoms[0].charge, 0.0);
    assert_eq!(atoms[1].x, DEFAULT_ATOM_X);
    assert_eq!(atoms[1].label, "");
    assert_eq!(out.dropped, 2);
    assert!(
        out.warnings
            .iter()
            .any(|w| w.to_string() == "$.atoms[1]: dropped: atom id is required")
    );
}

#[test]
fn malformed_steps_become_unset_with_a_warning() {
    let raw = json!({
        "dipoles": [
            {"text": "delta+", "step": -1},
            {"text": "delta-", "step": 1.5, "endStep": "2"},
            {"text": "x", "step": "3"}
        ]
    });
    let out = sanitize_definition("m", Some(&raw), &fallbacks());
    let d = &out.value.dipoles;
    assert_eq!(d[0].lifetime.step, None);
    assert_eq!(d[1].lifetime.step, None);
    assert_eq!(d[1].lifetime.end_step, Some(2));
    assert_eq!(d[2].lifetime.step, Some(3));
    assert_eq!(out.dropped, 0);
    assert_eq!(out.warnings.len(), 2);
    assert_eq!(out.warnings[0].location(), "$.dipoles[0].step");
}

#[test]
fn bond_order_is_floored_and_clamped() {
    let raw = json!({
        "bonds": [
            {"from": "a", "to": "b", "order": 2.9},
            {"from": "a", "to": "c", "order": 7},
            {"from": "a", "to": "d", "order": -3},
            {"from": "a", "to": "e"},
            {"from": "a"}
        ]
    });
    let out = sanitize_definition("m", Some(&raw), &fallbacks());
    let orders: Vec<u8> = out.value.bonds.iter().map(|b| b.order).collect();
    assert_eq!(orders, vec![2, 3, 1, 1]);
    assert_eq!(out.dropped, 1);
}

#[test]
fn arrows_require_path_and_clamp_bend() {
    let raw = json!({
        "electronMovement": [
            {"path": "M 0 0 C 1 1, 2 2, 3 3", "bend": 9, "label": " C-X -> X- ", "step": 1},
            {"path": "  ", "label": "lost"},
            {"path": "M 0 0 C 1 1, 2 2, 3 3", "bend": "wide", "fromAtomId": "c1"}
        ]
    });
    let out = sanitize_definition("m", Some(&raw), &fallbacks());
    let arrows = &out.value.electron_movement;
    assert_eq!(arrows.len(), 2);
    assert_eq!(arrows[0].bend, 4.0);
    assert_eq!(arrows[0].label, "C-X -> X-");
    assert_eq!(arrows[1].bend, 1.0);
    assert_eq!(arrows[1].from_atom_id.as_deref(), Some("c1"));
    assert_eq!(out.dropped, 1);
}

#[test]
fn lone_pairs_default_to_their_own_anchor() {
    let raw = json!({"lonePairs": [{}]});
    let out = sanitize_definition("m", Some(&raw), &fallbacks());
    assert_eq!(out.value.lone_pairs[0].x, DEFAULT_LONE_PAIR_X);
    assert_eq!(out.value.lone_pairs[0].y, DEFAULT_LONE_PAIR_Y);
}

#[test]
fn override_fields_win_and_duration_is_floored() {
    let raw = json!({
        "title": "SN2", "summary": "Backside attack.", "path": "M 1 2 C 3 4, 5 6, 7 8",
        "durationMs": 4200.7, "steps": ["a", "", 3, "b"]
    });
    let out = sanitize_definition("m", Some(&raw), &fallbacks());
    let def = out.value;
    assert_eq!(def.title, "SN2");
    assert_eq!(def.duration_ms, 4200);
    assert_eq!(def.steps, vec!["a".to_owned(), "b".to_owned()]);
    assert_eq!(out.dropped, 2);

    let bad = json!({"durationMs": -5});
    assert_eq!(
        sanitize_definition("m", Some(&bad), &fallbacks()).value.duration_ms,
        DEFAULT_DURATION_MS
    );
    let text = json!({"durationMs": "5000"});
    assert_eq!(
        sanitize_definition("m", Some(&text), &fallbacks()).value.duration_ms,
        DEFAULT_DURATION_MS
    );
}

#[test]
fn cue_registry_accepts_objects_arrays_and_alias() {
    let obj = json!({"b": {"kind": "arrow"}, " a ": {"kind": "atom"}, "": {}, "c": 3});
    let out = cue_registry(Some(&obj));
    let reg = out.value.unwrap();
    assert_eq!(reg.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(out.dropped, 2);

    let arr = json!([{"id": " x "}, {"id": ""}, 4, {"id": "x", "v": 2}]);
    let out = cue_registry(Some(&arr));
    let reg = out.value.unwrap();
    assert_eq!(reg.len(), 1);
    assert_eq!(reg["x"], json!({"id": "x", "v": 2}));
    assert_eq!(out.dropped, 2);

    let raw = json!({"cues": {"k": {}}});
    let def = sanitize_definition("m", Some(&raw), &fallbacks()).value;
    assert!(def.cue_registry.unwrap().contains_key("k"));
}

#[test]
fn step_semantics_are_normalized_and_padded() {
    let raw = json!({
        "steps": ["a", "b", "c"],
        "stepSemantics": [
            {"events": [{"type": "bondBreak", "from": "c", "to": "x"}, 7], "invariants": [" keep ", "", 1]},
            "junk"
        ]
    });
    let out = sanitize_definition("m", Some(&raw), &fallbacks());
    let sem = out.value.step_semantics.unwrap();
    assert_eq!(sem.len(), 3);
    let first = sem[0].as_ref().unwrap();
    assert_eq!(first.events.len(), 1);
    assert_eq!(first.invariants, vec!["keep".to_owned()]);
    assert!(sem[1].is_none());
    assert!(sem[2].is_none());
    assert_eq!(out.dropped, 1);
}

#[test]
fn step_cue_ids_keep_rows() {
    let raw = json!({"stepCueIds": [["a", " b "], "oops", ["", "c"]]});
    let out = sanitize_definition("m", Some(&raw), &fallbacks());
    let rows = out.value.step_cue_ids.unwrap();
    assert_eq!(rows, vec![vec!["a".to_owned(), "b".to_owned()], vec![], vec!["c".to_owned()]]);
}

#[test]
fn sanitizing_twice_is_idempotent() {
    let raw = json!({
        "id": "alkene-hx-addition",
        "steps": ["Protonation", "Attack"],
        "atoms": [
            {"id": "c1", "x": 100, "y": 90, "label": "C", "step": 0},
            {"id": "c1", "x": 100, "y": 90, "label": "C+", "charge": 1, "step": 1, "endStep": "bad"}
        ],
        "bonds": [{"from": "c1", "to": "h", "order": 1.2}],
        "dipoles": [{"text": "delta+", "x": 40}],
        "lonePairs": [{"label": ":Br-"}],
        "electronMovement": [{"path": "M 0 0 C 1 1, 2 2, 3 3", "bend": 1.35, "step": 1, "arrowType": "attack"}],
        "cueRegistry": [{"id": "k", "kind": "arrow"}],
        "stepCueIds": [["k"], []],
        "stepSemantics": [
            {"events": [{"type": "chargeSet", "atomId": "c1", "charge": 1}, {"type": "mystery"}]},
            null
        ]
    });
    let first = sanitize_standalone(&raw).value;
    let again = sanitize_standalone(&serde_json::to_value(&first).unwrap());
    assert_eq!(again.value, first);
    assert_eq!(again.dropped, 0);
    assert!(again.warnings.is_empty());
    assert_eq!(
        serde_json::to_string(&again.value).unwrap(),
        serde_json::to_string(&first).unwrap()
    );
}

#[test]
fn title_case_splits_on_separators() {
    assert_eq!(title_case("alkene-hx_ADDITION"), "Alkene Hx Addition");
    assert_eq!(title_case("--"), "Mechanism animation");
}
