use blueprint_studio::blueprint::{Resource, ScriptDocument};
use blueprint_studio::compiler::loader::parse_document;
use blueprint_studio::compiler::{Compiler, decompile, decompile_with_report};
use blueprint_studio::dsl::builder::StepListBuilder;
use blueprint_studio::dsl::{ContentData, LandingMode, MenuData, MenuItemType, Step, StepKind};
use serde_json::json;

fn compile_steps(steps: &[Step]) -> ScriptDocument {
    Compiler::new().compile(steps, "My WordPress Website", LandingMode::Admin, None)
}

fn pages(steps: &[Step]) -> Vec<&ContentData> {
    steps
        .iter()
        .filter_map(|s| match &s.kind {
            StepKind::AddPage(data) => Some(data),
            _ => None,
        })
        .collect()
}

fn document(value: serde_json::Value) -> ScriptDocument {
    serde_json::from_value(value).expect("valid document")
}

#[test]
fn test_round_trip_single_page() {
    let steps = StepListBuilder::new()
        .page("p1", "About").content("<p>Hi</p>").status("publish").build()
        .build();
    let decompiled = decompile(&compile_steps(&steps));

    let pages = pages(&decompiled);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].post_title, "About");
    assert_eq!(pages[0].post_content, "<p>Hi</p>");
    assert_eq!(pages[0].post_status, "publish");
}

#[test]
fn test_round_trip_through_json_text() {
    let steps = StepListBuilder::new()
        .post("p1", "Bob's \"Place\"").content("back\\slash 'quoted'").build()
        .build();
    let json = serde_json::to_string(&compile_steps(&steps)).unwrap();
    let decompiled = decompile(&parse_document(&json).unwrap());

    let post = decompiled
        .iter()
        .find_map(|s| match &s.kind {
            StepKind::AddPost(data) => Some(data),
            _ => None,
        })
        .expect("post step");
    assert_eq!(post.post_title, "Bob's \"Place\"");
    assert_eq!(post.post_content, "back\\slash 'quoted'");
}

#[test]
fn test_round_trip_block_markup() {
    let markup = "<!-- wp:paragraph --><p>Ünïcødé 🎉</p><!-- /wp:paragraph -->";
    let steps = StepListBuilder::new().page("p1", "Blocks").content(markup).build().build();
    let decompiled = decompile(&compile_steps(&steps));

    let pages = pages(&decompiled);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].post_title, "Blocks");
    assert_eq!(pages[0].post_content, markup);
}

#[test]
fn test_featured_image_attaches_to_page() {
    let steps = StepListBuilder::new()
        .page("p1", "Gallery").featured_image("https://example.com/a.png").build()
        .build();
    let report = decompile_with_report(&compile_steps(&steps));

    assert!(report.dropped.is_empty(), "{:?}", report.dropped);
    let pages = pages(&report.steps);
    assert_eq!(pages[0].featured_image_url.as_deref(), Some("https://example.com/a.png"));
}

#[test]
fn test_menu_round_trip() {
    let steps = StepListBuilder::new()
        .page("about", "About").build()
        .menu("m", "Main Menu")
            .page_item("about")
            .custom_item("Docs", "https://example.com/docs")
            .location("primary")
            .build()
        .build();
    let report = decompile_with_report(&compile_steps(&steps));
    assert!(report.dropped.is_empty(), "{:?}", report.dropped);

    let page_id = report
        .steps
        .iter()
        .find(|s| matches!(s.kind, StepKind::AddPage(_)))
        .map(|s| s.id.clone())
        .unwrap();
    let menu: &MenuData = report
        .steps
        .iter()
        .find_map(|s| match &s.kind {
            StepKind::CreateNavigationMenu(menu) => Some(menu),
            _ => None,
        })
        .expect("menu step");

    assert_eq!(menu.menu_name, "Main Menu");
    assert_eq!(menu.location.as_deref(), Some("primary"));
    assert_eq!(menu.items.len(), 2);
    assert_eq!(menu.items[0].item_type, MenuItemType::Page);
    assert_eq!(menu.items[0].page_id.as_deref(), Some(page_id.as_str()));
    assert_eq!(menu.items[1].item_type, MenuItemType::Custom);
    assert_eq!(menu.items[1].title, "Docs");
    assert_eq!(menu.items[1].url, "https://example.com/docs");
}

#[test]
fn test_structural_instructions() {
    let doc = document(json!({
        "landingPage": "/wp-admin/",
        "steps": [
            {"step": "login", "username": "editor", "password": "secret"},
            {"step": "installPlugin", "pluginZipFile": {"resource": "wordpress.org/plugins", "slug": "akismet"}, "options": {"activate": false}},
            {"step": "installTheme", "themeZipFile": {"resource": "url", "url": "https://example.com/t.zip"}},
            {"step": "defineWpConfigConsts", "consts": {"WP_DEBUG": true}},
            {"step": "importWxr", "file": {"resource": "url", "url": "https://example.com/export.xml"}}
        ]
    }));
    let steps = decompile(&doc);

    assert_eq!(steps.len(), 5);
    match &steps[0].kind {
        StepKind::Login(data) => {
            assert_eq!(data.username.as_deref(), Some("editor"));
            assert_eq!(data.password.as_deref(), Some("secret"));
        }
        other => panic!("unexpected {:?}", other),
    }
    match &steps[1].kind {
        StepKind::InstallPlugin(data) => {
            assert_eq!(data.plugin_zip_file, Some(Resource::PluginRegistry { slug: "akismet".into() }));
            assert_eq!(data.activate, Some(false));
        }
        other => panic!("unexpected {:?}", other),
    }
    match &steps[2].kind {
        StepKind::InstallTheme(data) => assert_eq!(data.activate, Some(true)),
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(&steps[3].kind, StepKind::DefineWpConfigConst(c) if c.consts["WP_DEBUG"] == json!(true)));
    assert!(matches!(&steps[4].kind, StepKind::ImportWxr(i) if i.url == "https://example.com/export.xml"));
}

#[test]
fn test_site_options_fan_out_in_document_order() {
    let doc = document(json!({
        "steps": [
            {"step": "setSiteOptions", "options": {"zeta": 1, "alpha": "two", "mid": false}},
            {"step": "setOptions", "options": {"blogname": "Aliased"}}
        ]
    }));
    let names: Vec<String> = decompile(&doc)
        .into_iter()
        .map(|s| match s.kind {
            StepKind::SetSiteOption(data) => data.option_name,
            other => panic!("unexpected {:?}", other),
        })
        .collect();

    assert_eq!(names, vec!["zeta", "alpha", "mid", "blogname"]);
}

#[test]
fn test_run_php_insert_post_with_literals() {
    let doc = document(json!({
        "steps": [
            {"step": "runPHP", "code": "<?php require 'wp-load.php'; wp_insert_post(array('post_title' => 'Hello \\'World\\'', 'post_content' => 'Body', 'post_type' => 'page', 'post_status' => 'draft')); ?>"}
        ]
    }));
    let steps = decompile(&doc);
    let pages = pages(&steps);

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].post_title, "Hello 'World'");
    assert_eq!(pages[0].post_content, "Body");
    assert_eq!(pages[0].post_status, "draft");
}

#[test]
fn test_unmatched_instructions_are_dropped() {
    let doc = document(json!({
        "steps": [
            {"step": "enableMultisite"},
            {"step": "runPHP", "code": "<?php echo 1; ?>"},
            {"step": "wp-cli", "command": "wp plugin list"},
            {"step": "wp-cli", "command": "wp media import 'https://example.com/orphan.png'"},
            {"step": "wp-cli", "command": "wp menu item add-custom 'Ghost' 'A' 'https://a.b'"},
            {"step": "installPlugin"},
            {"step": "wp-cli", "command": "wp post create --post_type=page --post_title='Kept'"}
        ]
    }));
    let report = decompile_with_report(&doc);

    assert_eq!(report.steps.len(), 1);
    assert_eq!(pages(&report.steps)[0].post_title, "Kept");
    let indexes: Vec<usize> = report.dropped.iter().map(|e| e.index).collect();
    assert_eq!(indexes, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(report.dropped[0].kind, "enableMultisite");
    assert_eq!(report.dropped[5].kind, "installPlugin");
}

#[test]
fn test_empty_document_yields_empty_list() {
    assert!(decompile(&ScriptDocument::default()).is_empty());
}

#[test]
fn test_decompiled_ids_are_unique() {
    let steps = StepListBuilder::new()
        .page("a", "One").build()
        .page("b", "Two").build()
        .site_option("o", "blogdescription", "x")
        .build();
    let decompiled = decompile(&compile_steps(&steps));
    let mut ids: Vec<&str> = decompiled.iter().map(|s| s.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), decompiled.len());
}
