use blueprint_studio::blueprint::Resource;
use blueprint_studio::dsl::builder::StepListBuilder;
use blueprint_studio::dsl::{
    BuilderPayload, LandingMode, MenuItemType, PageSelectionMode, Step, StepKind,
};
use serde_json::json;

#[test]
fn test_step_wire_shape() {
    let steps = StepListBuilder::new()
        .page("p1", "About").content("<p>Hi</p>").status("publish").build()
        .build();

    assert_eq!(
        serde_json::to_value(&steps).unwrap(),
        json!([
            {"id": "p1", "type": "addPage", "data": {"postTitle": "About", "postContent": "<p>Hi</p>", "postStatus": "publish"}}
        ])
    );
}

#[test]
fn test_unknown_kind_survives_round_trip() {
    let raw = json!({"id": "x", "type": "enableMultisite", "data": {"network": true}});
    let step: Step = serde_json::from_value(raw.clone()).unwrap();

    match &step.kind {
        StepKind::Unknown { kind, data } => {
            assert_eq!(kind, "enableMultisite");
            assert_eq!(data, &json!({"network": true}));
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(step.kind.kind_name(), "enableMultisite");
    assert_eq!(serde_json::to_value(&step).unwrap(), raw);
}

#[test]
fn test_ill_typed_payload_becomes_unknown() {
    let step: Step = serde_json::from_value(json!({"id": "p", "type": "addPage", "data": {"postTitle": 5}})).unwrap();
    assert!(matches!(step.kind, StepKind::Unknown { ref kind, .. } if kind == "addPage"));
}

#[test]
fn test_missing_data_uses_defaults() {
    let step: Step = serde_json::from_value(json!({"id": "l", "type": "login"})).unwrap();
    match step.kind {
        StepKind::Login(data) => {
            assert_eq!(data.username, None);
            assert_eq!(data.password, None);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_builder_shapes() {
    let steps = StepListBuilder::new()
        .install_plugin_url("pl", "https://example.com/p.zip")
        .homepage_existing("home", "p1")
        .menu("m", "Main").page_item("p1").custom_item("Docs", "/docs").location("primary").build()
        .landing("l", LandingMode::FrontPage, None)
        .build();

    assert_eq!(steps.len(), 4);
    match &steps[0].kind {
        StepKind::InstallPlugin(data) => {
            assert_eq!(data.plugin_zip_file, Some(Resource::Url { url: "https://example.com/p.zip".into() }));
        }
        other => panic!("unexpected {:?}", other),
    }
    match &steps[1].kind {
        StepKind::SetHomepage(sel) => {
            assert_eq!(sel.option, PageSelectionMode::Existing);
            assert_eq!(sel.page_id.as_deref(), Some("p1"));
        }
        other => panic!("unexpected {:?}", other),
    }
    match &steps[2].kind {
        StepKind::CreateNavigationMenu(menu) => {
            assert_eq!(menu.items.len(), 2);
            assert_eq!(menu.items[0].item_type, MenuItemType::Page);
            assert_eq!(menu.items[1].item_type, MenuItemType::Custom);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_created_content_predicate() {
    let steps = StepListBuilder::new()
        .page("p", " Title ").build()
        .post("empty", "\u{7}").build()
        .homepage_create("h", "Home", "")
        .homepage_existing("e", "p")
        .build();

    let created: Vec<Option<(&str, String)>> = steps
        .iter()
        .map(|s| s.kind.created_content().map(|c| (c.post_type, c.title)))
        .collect();
    assert_eq!(
        created,
        vec![Some(("page", "Title".to_string())), None, Some(("page", "Home".to_string())), None]
    );
}

#[test]
fn test_payload_defaults() {
    let payload: BuilderPayload = serde_json::from_value(json!({"steps": []})).unwrap();
    assert_eq!(payload.landing_page_type, LandingMode::Admin);
    assert_eq!(payload.blueprint_title, "");
    assert!("sideways".parse::<LandingMode>().is_err());
    assert_eq!("front-page".parse::<LandingMode>(), Ok(LandingMode::FrontPage));
}
