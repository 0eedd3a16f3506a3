use super::*;
use serde_json::json;

fn link(v: serde_json::Value) -> ReactionLink {
    serde_json::from_value(v).unwrap()
}

fn names() -> CompoundNames {
    [
        ("alkene".to_owned(), "Alkene".to_owned()),
        ("haloalkane".to_owned(), "Haloalkane".to_owned()),
    ]
    .into_iter()
    .collect()
}

#[test]
fn endpoints_resolve_through_names() {
    let n = names();
    assert_eq!(n.endpoint_name(Some(&Endpoint::Id("alkene".into()))), "Alkene");
    assert_eq!(n.endpoint_name(Some(&Endpoint::Id("ketone".into()))), "ketone");
    assert_eq!(
        n.endpoint_name(Some(&Endpoint::Node {
            id: Some("alkene".into()),
            name: Some("Ethene".into())
        })),
        "Ethene"
    );
    assert_eq!(
        n.endpoint_name(Some(&Endpoint::Node {
            id: Some("haloalkane".into()),
            name: None
        })),
        "Haloalkane"
    );
    assert_eq!(n.endpoint_name(None), "Compound");
    assert_eq!(n.endpoint_name(Some(&Endpoint::Id("  ".into()))), "Compound");
}

#[test]
fn fallbacks_follow_templates() {
    let l = link(json!({
        "animationId": "alkene-hx-addition",
        "label": "Hydrohalogenation",
        "source": "alkene",
        "target": {"id": "haloalkane"}
    }));
    let fb = link_fallbacks(&l, "alkene-hx-addition", &names());
    assert_eq!(fb.title, "Hydrohalogenation mechanism");
    assert_eq!(fb.summary, "Alkene to Haloalkane reaction pathway.");
    assert_eq!(fb.steps[0], "Alkene: reactants orient for hydrohalogenation.");
    assert_eq!(
        fb.steps[1],
        "Electron flow follows hydrohalogenation with stated reagents."
    );
    assert_eq!(
        fb.steps[2],
        "Haloalkane: product stabilizes and route is complete."
    );

    let bare = link(json!({
        "animationId": "ketone-reduction",
        "type": "Reduction",
        "mechanismSummary": "Hydride adds."
    }));
    let fb = link_fallbacks(&bare, "ketone-reduction", &names());
    assert_eq!(fb.title, "Ketone Reduction");
    assert_eq!(fb.summary, "Hydride adds.");
    assert!(fb.steps[1].contains("follows reduction"));

    let none = link(json!({}));
    assert!(link_fallbacks(&none, "", &names()).steps[1].contains("follows pathway"));
}

#[test]
fn build_skips_links_without_ids_and_uses_overrides() {
    let overrides = OverrideTable::from_value(json!({
        "sn2": {
            "id": "sn2", "title": "SN2", "steps": ["a", "b"],
            "atoms": [{"id": "c", "label": "C"}, {"label": "orphan"}]
        }
    }))
    .unwrap();
    let links = vec![
        link(json!({"animationId": " sn2 ", "source": "alkene", "target": "haloalkane"})),
        link(json!({"animationId": "", "source": "x"})),
        link(json!({"label": "No id"})),
        link(json!({"animationId": "e2", "label": "Elimination"})),
    ];
    let built = MechanismRegistry::build(&links, &overrides, &names());
    let reg = built.value;
    assert_eq!(reg.len(), 2);
    assert_eq!(reg.ids().collect::<Vec<_>>(), vec!["e2", "sn2"]);
    assert_eq!(reg.get("sn2").unwrap().title, "SN2");
    assert_eq!(reg.get("e2").unwrap().steps.len(), 3);
    assert_eq!(built.dropped, 1);
    assert_eq!(built.warnings[0].location(), "$[\"sn2\"].atoms[1]");
}

#[test]
fn availability_distinguishes_states() {
    let overrides = OverrideTable::from_value(json!({
        "sn2": {"atoms": [{"id": "c", "label": "C"}]}
    }))
    .unwrap();
    let links = vec![
        link(json!({"animationId": "sn2"})),
        link(json!({"animationId": "e2"})),
    ];
    let reg = MechanismRegistry::build(&links, &overrides, &CompoundNames::default()).value;

    assert_eq!(reg.availability(None), Availability::NoAnimationId);
    assert_eq!(reg.availability(Some("  ")), Availability::NoAnimationId);
    let missing = reg.availability(Some("sn1"));
    assert_eq!(missing, Availability::NotRegistered("sn1".into()));
    assert_eq!(
        missing.message(),
        Some("No animation asset is registered for this pathway yet.")
    );
    assert!(matches!(reg.availability(Some("e2")), Availability::NoCues(_)));
    let ready = reg.availability(Some("sn2"));
    assert!(matches!(ready, Availability::Ready(_)));
    assert!(ready.message().is_none());
    assert_eq!(ready.definition().unwrap().id, "sn2");
}

#[test]
fn dataset_collects_compound_names() {
    let ds = LinkDataset::from_json_str(
        r#"{"nodes": [{"id": "a", "name": "Alkane"}, {"id": "b"}],
            "links": [{"animationId": "x", "source": "a", "target": "b"}]}"#,
    )
    .unwrap();
    let n = ds.compound_names();
    assert_eq!(n.get("a"), Some("Alkane"));
    assert_eq!(n.get("b"), None);
    assert_eq!(ds.links.len(), 1);
}
