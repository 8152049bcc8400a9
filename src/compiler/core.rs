use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::blueprint::{InstallOptions, Instruction, PreferredVersions, Resource, ScriptDocument};
use crate::codec::{clean, deep_clean, encode};
use crate::compiler::resolver::created_id_at;
use crate::compiler::shell::quote;
use crate::config::StudioConfig;
use crate::dsl::{
    BuilderPayload, ConfigConstData, ContentData, LandingMode, LoginData, MenuData, MenuItemType,
    PageSelectionData, PageSelectionMode, PluginData, RoleData, SiteOptionData, Step, StepKind,
    ThemeData,
};

/// Content containing this marker is block markup and is shipped encoded
/// instead of inlined on the command line.
pub const BLOCK_MARKUP_MARKER: &str = "<!-- wp:";

/// Which reading option a page selection step pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageRole {
    Front,
    Posts,
}

/// Turns a step list into a provisioning script.
///
/// Compilation never fails: steps missing required fields compile to
/// nothing, so a half-edited list is always exportable.
pub struct Compiler {
    config: StudioConfig,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_config(StudioConfig::default())
    }

    pub fn with_config(config: StudioConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn compile_payload(&self, payload: &BuilderPayload) -> ScriptDocument {
        self.compile(
            &payload.steps,
            &payload.blueprint_title,
            payload.landing_page_type,
            payload.custom_landing_url.as_deref(),
        )
    }

    pub fn compile(
        &self,
        steps: &[Step],
        title: &str,
        landing: LandingMode,
        custom_url: Option<&str>,
    ) -> ScriptDocument {
        // 1. Landing target
        let landing_page = self.landing_path(steps, landing, custom_url);

        // 2. Fixed runtime pins
        let mut document = ScriptDocument {
            landing_page,
            preferred_versions: PreferredVersions {
                php: self.config.php_version.clone(),
                wp: self.config.wp_version.clone(),
            },
            php_extension_bundles: self.config.extension_bundles.clone(),
            steps: Vec::new(),
        };

        // 3. Preamble: title option, then login
        let title = clean(title);
        if !title.is_empty() && title != self.config.default_site_title {
            document.push(Instruction::options([("blogname".to_string(), json!(title))]));
        }
        document.push(Instruction::Login {
            username: self.config.admin_username.clone(),
            password: self.config.admin_password.clone(),
        });

        // 4. Single forward pass
        for (index, step) in steps.iter().enumerate() {
            for instruction in self.transform_step(index, step, steps) {
                document.push(instruction);
            }
        }

        document
    }

    fn landing_path(&self, steps: &[Step], landing: LandingMode, custom_url: Option<&str>) -> String {
        let (mode, url) = steps
            .iter()
            .find_map(|s| match &s.kind {
                StepKind::SetLandingPage(data) => Some((data.landing_page_type, data.custom_url.as_deref())),
                _ => None,
            })
            .unwrap_or((landing, custom_url));

        match mode {
            LandingMode::Admin => self.config.admin_path.clone(),
            LandingMode::FrontPage => "/".to_string(),
            LandingMode::Custom => match url {
                Some(url) if !url.is_empty() => url.to_string(),
                _ => "/".to_string(),
            },
        }
    }

    fn transform_step(&self, index: usize, step: &Step, steps: &[Step]) -> Vec<Instruction> {
        match &step.kind {
            StepKind::AddPage(data) => self.content(&step.kind, data),
            StepKind::AddPost(data) => self.content(&step.kind, data),
            StepKind::InstallPlugin(data) => plugin(data),
            StepKind::InstallTheme(data) => theme(data),
            StepKind::SetSiteOption(data) => site_option(data),
            StepKind::DefineWpConfigConst(data) => config_consts(data),
            StepKind::Login(data) => self.login(data),
            StepKind::ImportWxr(data) => {
                let url = clean(&data.url);
                if url.is_empty() {
                    return Vec::new();
                }
                vec![Instruction::ImportWxr { file: Resource::Url { url } }]
            }
            StepKind::AddCustomRole(data) => custom_role(data),
            StepKind::SetHomepage(data) => page_selection(index, step, data, steps, PageRole::Front),
            StepKind::SetPostsPage(data) => page_selection(index, step, data, steps, PageRole::Posts),
            StepKind::CreateNavigationMenu(data) => navigation_menu(data, steps),
            StepKind::SetLandingPage(_) => Vec::new(),
            StepKind::Unknown { kind, .. } => {
                debug!(step = %step.id, kind = %kind, "ignoring unknown step kind");
                Vec::new()
            }
        }
    }

    fn content(&self, kind: &StepKind, data: &ContentData) -> Vec<Instruction> {
        let Some(created) = kind.created_content() else {
            return Vec::new();
        };

        let mut out = vec![create_content(
            created.post_type,
            &created.title,
            &data.post_content,
            &data.post_status,
        )];

        let image = data.featured_image_url.as_deref().map(clean).unwrap_or_default();
        if !image.is_empty() {
            out.push(Instruction::command(format!("wp media import {}", quote(&image))));
            out.push(Instruction::command(eval(&format!(
                "$posts = {}; $media = get_posts(array(\"post_type\" => \"attachment\", \"post_status\" => \"any\", \"numberposts\" => 1, \"orderby\" => \"ID\", \"order\" => \"DESC\")); if ($posts && $media) {{ set_post_thumbnail($posts[0]->ID, $media[0]->ID); }}",
                find_posts(created.post_type, &created.title),
            ))));
        }

        out
    }

    fn login(&self, data: &LoginData) -> Vec<Instruction> {
        let pick = |value: &Option<String>, fallback: &str| {
            let value = value.as_deref().map(clean).unwrap_or_default();
            if value.is_empty() { fallback.to_string() } else { value }
        };

        vec![Instruction::Login {
            username: pick(&data.username, &self.config.admin_username),
            password: pick(&data.password, &self.config.admin_password),
        }]
    }
}

/// Creation instruction for one post or page. `title` must already be clean.
fn create_content(post_type: &str, title: &str, content: &str, status: &str) -> Instruction {
    let content = clean(content);
    let status = match clean(status) {
        s if s.is_empty() => "publish".to_string(),
        s => s,
    };

    if content.contains(BLOCK_MARKUP_MARKER) {
        return Instruction::command(eval(&format!(
            "wp_insert_post(array(\"post_type\" => \"{}\", \"post_status\" => {}, \"post_title\" => {}, \"post_content\" => {}));",
            post_type,
            php_string(&status),
            php_string(title),
            php_string(&content),
        )));
    }

    Instruction::command(format!(
        "wp post create --post_type={} --post_status={} --post_title={} --post_content={}",
        post_type,
        quote(&status),
        quote(title),
        quote(&content),
    ))
}

fn plugin(data: &PluginData) -> Vec<Instruction> {
    match &data.plugin_zip_file {
        // A source from the other registry is dropped, not reinterpreted.
        Some(source @ (Resource::PluginRegistry { .. } | Resource::Url { .. })) if source.is_configured() => {
            vec![Instruction::InstallPlugin {
                plugin_zip_file: source.cleaned(),
                options: InstallOptions { activate: data.activate.unwrap_or(true) },
            }]
        }
        _ => Vec::new(),
    }
}

fn theme(data: &ThemeData) -> Vec<Instruction> {
    match &data.theme_zip_file {
        // A source from the other registry is dropped, not reinterpreted.
        Some(source @ (Resource::ThemeRegistry { .. } | Resource::Url { .. })) if source.is_configured() => {
            vec![Instruction::InstallTheme {
                theme_zip_file: source.cleaned(),
                options: InstallOptions { activate: data.activate.unwrap_or(true) },
            }]
        }
        _ => Vec::new(),
    }
}

fn site_option(data: &SiteOptionData) -> Vec<Instruction> {
    let name = clean(&data.option_name);
    if name.is_empty() {
        return Vec::new();
    }
    vec![Instruction::options([(name, deep_clean(&data.option_value))])]
}

fn config_consts(data: &ConfigConstData) -> Vec<Instruction> {
    let consts: Map<String, Value> = data
        .consts
        .iter()
        .map(|(k, v)| (clean(k), deep_clean(v)))
        .filter(|(k, _)| !k.is_empty())
        .collect();

    if consts.is_empty() {
        return Vec::new();
    }
    vec![Instruction::DefineWpConfigConsts { consts }]
}

fn custom_role(data: &RoleData) -> Vec<Instruction> {
    let name = clean(&data.name);
    let capabilities: Vec<String> = data
        .capabilities
        .iter()
        .map(|c| clean(c))
        .filter(|c| !c.is_empty())
        .collect();

    if name.is_empty() || capabilities.is_empty() {
        return Vec::new();
    }

    vec![Instruction::command(eval(&format!(
        "add_role(\"{}\", {}, array_fill_keys(explode(\",\", {}), true));",
        role_slug(&name),
        php_string(&name),
        php_string(&capabilities.join(",")),
    )))]
}

fn page_selection(
    index: usize,
    step: &Step,
    data: &PageSelectionData,
    steps: &[Step],
    role: PageRole,
) -> Vec<Instruction> {
    match data.option {
        PageSelectionMode::Create => {
            let Some(created) = step.kind.created_content() else {
                return Vec::new();
            };
            // By position: ids are not guaranteed unique in imported payloads.
            let page_id = created_id_at(index, steps);

            let pin = match role {
                PageRole::Front => Instruction::options([
                    ("show_on_front".to_string(), json!("page")),
                    ("page_on_front".to_string(), json!(page_id)),
                ]),
                PageRole::Posts => Instruction::options([("page_for_posts".to_string(), json!(page_id))]),
            };

            vec![
                create_content(created.post_type, &created.title, &data.content, "publish"),
                pin,
            ]
        }
        PageSelectionMode::Existing => {
            let Some(target) = data
                .page_id
                .as_deref()
                .and_then(|id| steps.iter().find(|s| s.id == id))
                .and_then(|s| s.kind.created_content())
            else {
                return Vec::new();
            };

            let update = match role {
                PageRole::Front => {
                    "update_option(\"show_on_front\", \"page\"); update_option(\"page_on_front\", $pages[0]->ID);"
                }
                PageRole::Posts => "update_option(\"page_for_posts\", $pages[0]->ID);",
            };

            vec![Instruction::command(eval(&format!(
                "$pages = {}; if ($pages) {{ {} }}",
                find_posts(target.post_type, &target.title),
                update,
            )))]
        }
    }
}

fn navigation_menu(data: &MenuData, steps: &[Step]) -> Vec<Instruction> {
    let name = clean(&data.menu_name);
    if name.is_empty() || data.items.is_empty() {
        return Vec::new();
    }

    let mut out = vec![Instruction::command(format!("wp menu create {}", quote(&name)))];

    for item in &data.items {
        match item.item_type {
            MenuItemType::Page => {
                let target = item
                    .page_id
                    .as_deref()
                    .and_then(|id| steps.iter().find(|s| s.id == id))
                    .and_then(|s| s.kind.created_content());
                if let Some(target) = target {
                    out.push(Instruction::command(eval(&format!(
                        "$menu = wp_get_nav_menu_object({}); $posts = {}; if ($menu && $posts) {{ wp_update_nav_menu_item($menu->term_id, 0, array(\"menu-item-title\" => $posts[0]->post_title, \"menu-item-object-id\" => $posts[0]->ID, \"menu-item-object\" => $posts[0]->post_type, \"menu-item-type\" => \"post_type\", \"menu-item-status\" => \"publish\")); }}",
                        php_string(&name),
                        find_posts(target.post_type, &target.title),
                    ))));
                }
            }
            MenuItemType::Custom => {
                let title = clean(&item.title);
                let url = clean(&item.url);
                if !title.is_empty() && !url.is_empty() {
                    out.push(Instruction::command(format!(
                        "wp menu item add-custom {} {} {}",
                        quote(&name),
                        quote(&title),
                        quote(&url),
                    )));
                }
            }
        }
    }

    let location = data.location.as_deref().map(clean).unwrap_or_default();
    if !location.is_empty() {
        out.push(Instruction::command(format!(
            "wp menu location assign {} {}",
            quote(&name),
            quote(&location),
        )));
    }

    out
}

fn eval(code: &str) -> String {
    format!("wp eval {}", quote(code))
}

/// PHP expression yielding `text`, shipped base64 so no quoting is needed.
fn php_string(text: &str) -> String {
    match encode(text) {
        Ok(encoded) => format!("base64_decode(\"{}\")", encoded),
        Err(err) => {
            warn!(error = %err, "could not encode string for embedding");
            "\"\"".to_string()
        }
    }
}

/// PHP expression looking posts up by exact title. Ambiguous when titles
/// repeat; the first match wins.
fn find_posts(post_type: &str, title: &str) -> String {
    format!(
        "get_posts(array(\"post_type\" => \"{}\", \"title\" => {}, \"post_status\" => \"any\", \"numberposts\" => 1))",
        post_type,
        php_string(title),
    )
}

fn role_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() { "custom_role".to_string() } else { slug.to_string() }
}
