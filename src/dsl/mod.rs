pub mod builder;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::blueprint::Resource;
use crate::codec::clean;

/// Ordered steps, insertion order = execution order.
pub type StepList = Vec<Step>;

/// One user-authored configuration action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStep", into = "RawStep")]
pub struct Step {
    pub id: String,
    pub kind: StepKind,
}

impl Step {
    pub fn new(id: impl Into<String>, kind: StepKind) -> Self {
        Self { id: id.into(), kind }
    }
}

/// Step kinds known to the compiler. The wire shape is
/// `{ "id": .., "type": "addPage", "data": { .. } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum StepKind {
    AddPage(ContentData),
    AddPost(ContentData),
    InstallPlugin(PluginData),
    InstallTheme(ThemeData),
    SetSiteOption(SiteOptionData),
    DefineWpConfigConst(ConfigConstData),
    Login(LoginData),
    ImportWxr(ImportData),
    AddCustomRole(RoleData),
    SetHomepage(PageSelectionData),
    SetPostsPage(PageSelectionData),
    CreateNavigationMenu(MenuData),
    SetLandingPage(LandingPageData),
    /// Unrecognized `type`, or a payload that does not fit its kind.
    /// Kept verbatim so it survives a save/load cycle.
    #[serde(skip)]
    Unknown { kind: String, data: Value },
}

/// A post or page that a step will create once the script runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedContent {
    pub post_type: &'static str,
    pub title: String,
}

impl StepKind {
    pub fn kind_name(&self) -> &str {
        match self {
            StepKind::AddPage(_) => "addPage",
            StepKind::AddPost(_) => "addPost",
            StepKind::InstallPlugin(_) => "installPlugin",
            StepKind::InstallTheme(_) => "installTheme",
            StepKind::SetSiteOption(_) => "setSiteOption",
            StepKind::DefineWpConfigConst(_) => "defineWpConfigConst",
            StepKind::Login(_) => "login",
            StepKind::ImportWxr(_) => "importWxr",
            StepKind::AddCustomRole(_) => "addCustomRole",
            StepKind::SetHomepage(_) => "setHomepage",
            StepKind::SetPostsPage(_) => "setPostsPage",
            StepKind::CreateNavigationMenu(_) => "createNavigationMenu",
            StepKind::SetLandingPage(_) => "setLandingPage",
            StepKind::Unknown { kind, .. } => kind.as_str(),
        }
    }

    /// The post/page this step creates, if it is complete enough to create one.
    ///
    /// The resolver counts exactly the steps for which this returns `Some`, and
    /// the compiler emits exactly one creation instruction for each of them.
    pub fn created_content(&self) -> Option<CreatedContent> {
        let (post_type, raw_title) = match self {
            StepKind::AddPage(data) => ("page", &data.post_title),
            StepKind::AddPost(data) => ("post", &data.post_title),
            StepKind::SetHomepage(sel) | StepKind::SetPostsPage(sel)
                if sel.option == PageSelectionMode::Create =>
            {
                ("page", &sel.title)
            }
            _ => return None,
        };

        let title = clean(raw_title);
        if title.is_empty() {
            None
        } else {
            Some(CreatedContent { post_type, title })
        }
    }

    pub fn creates_content(&self) -> bool {
        self.created_content().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentData {
    pub post_title: String,
    pub post_content: String,
    /// Empty means `publish`.
    pub post_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginData {
    pub plugin_zip_file: Option<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activate: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeData {
    pub theme_zip_file: Option<Resource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activate: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteOptionData {
    pub option_name: String,
    pub option_value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigConstData {
    pub consts: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportData {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleData {
    pub name: String,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSelectionMode {
    #[default]
    Create,
    Existing,
}

/// Payload of `setHomepage` / `setPostsPage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageSelectionData {
    pub option: PageSelectionMode,
    pub title: String,
    pub content: String,
    /// Step id of an existing page, used in `existing` mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemType {
    #[default]
    Page,
    Custom,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "type")]
    pub item_type: MenuItemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_id: Option<String>,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MenuData {
    pub menu_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandingMode {
    #[default]
    Admin,
    FrontPage,
    Custom,
}

impl std::str::FromStr for LandingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(LandingMode::Admin),
            "front-page" => Ok(LandingMode::FrontPage),
            "custom" => Ok(LandingMode::Custom),
            other => Err(format!("unknown landing mode `{}` (expected admin, front-page or custom)", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LandingPageData {
    pub landing_page_type: LandingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
}

/// The builder's saved state: what the gallery persists and what the
/// compiler is fed on export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuilderPayload {
    pub blueprint_title: String,
    pub landing_page_type: LandingMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_landing_url: Option<String>,
    pub steps: StepList,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawStep {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl From<RawStep> for Step {
    fn from(raw: RawStep) -> Self {
        let data = if raw.data.is_null() {
            Value::Object(Map::new())
        } else {
            raw.data
        };
        let tagged = serde_json::json!({ "type": raw.kind.clone(), "data": data.clone() });

        let kind = match serde_json::from_value::<StepKind>(tagged) {
            Ok(kind) => kind,
            Err(err) => {
                debug!(step = %raw.id, kind = %raw.kind, error = %err, "keeping step as unknown");
                StepKind::Unknown { kind: raw.kind, data }
            }
        };

        Step { id: raw.id, kind }
    }
}

impl From<Step> for RawStep {
    fn from(step: Step) -> Self {
        let kind_name = step.kind.kind_name().to_string();
        let data = match step.kind {
            StepKind::Unknown { data, .. } => data,
            known => match serde_json::to_value(&known) {
                Ok(Value::Object(mut tagged)) => tagged.remove("data").unwrap_or(Value::Null),
                _ => Value::Null,
            },
        };

        RawStep {
            id: step.id,
            kind: kind_name,
            data,
        }
    }
}
