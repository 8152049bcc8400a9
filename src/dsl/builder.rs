use serde_json::{Map, Value};

use crate::blueprint::Resource;
use crate::dsl::{
    ConfigConstData, ContentData, ImportData, LandingMode, LandingPageData, LoginData, MenuData, MenuItem,
    MenuItemType, PageSelectionData, PageSelectionMode, PluginData, RoleData, SiteOptionData, Step, StepKind,
    StepList, ThemeData,
};

pub struct StepListBuilder {
    steps: StepList,
}

impl Default for StepListBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StepListBuilder {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn step(mut self, id: &str, kind: StepKind) -> Self {
        self.steps.push(Step::new(id, kind));
        self
    }

    pub fn page(self, id: &str, title: &str) -> ContentBuilder {
        ContentBuilder::new(self, id, title, false)
    }

    pub fn post(self, id: &str, title: &str) -> ContentBuilder {
        ContentBuilder::new(self, id, title, true)
    }

    pub fn install_plugin(self, id: &str, slug: &str) -> Self {
        self.plugin(id, Resource::PluginRegistry { slug: slug.to_string() })
    }

    pub fn install_plugin_url(self, id: &str, url: &str) -> Self {
        self.plugin(id, Resource::Url { url: url.to_string() })
    }

    fn plugin(self, id: &str, source: Resource) -> Self {
        self.step(
            id,
            StepKind::InstallPlugin(PluginData {
                plugin_zip_file: Some(source),
                activate: None,
            }),
        )
    }

    pub fn install_theme(self, id: &str, slug: &str) -> Self {
        self.step(
            id,
            StepKind::InstallTheme(ThemeData {
                theme_zip_file: Some(Resource::ThemeRegistry { slug: slug.to_string() }),
                activate: None,
            }),
        )
    }

    pub fn site_option(self, id: &str, name: &str, value: impl Into<Value>) -> Self {
        self.step(
            id,
            StepKind::SetSiteOption(SiteOptionData {
                option_name: name.to_string(),
                option_value: value.into(),
            }),
        )
    }

    pub fn config_const(self, id: &str, name: &str, value: impl Into<Value>) -> Self {
        let mut consts = Map::new();
        consts.insert(name.to_string(), value.into());
        self.step(id, StepKind::DefineWpConfigConst(ConfigConstData { consts }))
    }

    pub fn login(self, id: &str, username: &str, password: &str) -> Self {
        self.step(
            id,
            StepKind::Login(LoginData {
                username: Some(username.to_string()),
                password: Some(password.to_string()),
            }),
        )
    }

    pub fn import_wxr(self, id: &str, url: &str) -> Self {
        self.step(id, StepKind::ImportWxr(ImportData { url: url.to_string() }))
    }

    pub fn custom_role(self, id: &str, name: &str, capabilities: &[&str]) -> Self {
        self.step(
            id,
            StepKind::AddCustomRole(RoleData {
                name: name.to_string(),
                capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            }),
        )
    }

    pub fn homepage_create(self, id: &str, title: &str, content: &str) -> Self {
        self.step(id, StepKind::SetHomepage(create_selection(title, content)))
    }

    pub fn homepage_existing(self, id: &str, page_id: &str) -> Self {
        self.step(id, StepKind::SetHomepage(existing_selection(page_id)))
    }

    pub fn posts_page_create(self, id: &str, title: &str) -> Self {
        self.step(id, StepKind::SetPostsPage(create_selection(title, "")))
    }

    pub fn posts_page_existing(self, id: &str, page_id: &str) -> Self {
        self.step(id, StepKind::SetPostsPage(existing_selection(page_id)))
    }

    pub fn menu(self, id: &str, name: &str) -> MenuBuilder {
        MenuBuilder {
            list_builder: self,
            id: id.to_string(),
            menu: MenuData {
                menu_name: name.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn landing(self, id: &str, mode: LandingMode, custom_url: Option<&str>) -> Self {
        self.step(
            id,
            StepKind::SetLandingPage(LandingPageData {
                landing_page_type: mode,
                custom_url: custom_url.map(str::to_string),
            }),
        )
    }

    pub fn build(self) -> StepList {
        self.steps
    }
}

fn create_selection(title: &str, content: &str) -> PageSelectionData {
    PageSelectionData {
        option: PageSelectionMode::Create,
        title: title.to_string(),
        content: content.to_string(),
        page_id: None,
    }
}

fn existing_selection(page_id: &str) -> PageSelectionData {
    PageSelectionData {
        option: PageSelectionMode::Existing,
        page_id: Some(page_id.to_string()),
        ..Default::default()
    }
}

pub struct ContentBuilder {
    list_builder: StepListBuilder,
    id: String,
    is_post: bool,
    data: ContentData,
}

impl ContentBuilder {
    fn new(list_builder: StepListBuilder, id: &str, title: &str, is_post: bool) -> Self {
        Self {
            list_builder,
            id: id.to_string(),
            is_post,
            data: ContentData {
                post_title: title.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn content(mut self, content: &str) -> Self {
        self.data.post_content = content.to_string();
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.data.post_status = status.to_string();
        self
    }

    pub fn featured_image(mut self, url: &str) -> Self {
        self.data.featured_image_url = Some(url.to_string());
        self
    }

    pub fn build(self) -> StepListBuilder {
        let kind = if self.is_post {
            StepKind::AddPost(self.data)
        } else {
            StepKind::AddPage(self.data)
        };
        self.list_builder.step(&self.id, kind)
    }
}

pub struct MenuBuilder {
    list_builder: StepListBuilder,
    id: String,
    menu: MenuData,
}

impl MenuBuilder {
    pub fn page_item(mut self, page_id: &str) -> Self {
        self.menu.items.push(MenuItem {
            item_type: MenuItemType::Page,
            page_id: Some(page_id.to_string()),
            ..Default::default()
        });
        self
    }

    pub fn custom_item(mut self, title: &str, url: &str) -> Self {
        self.menu.items.push(MenuItem {
            item_type: MenuItemType::Custom,
            page_id: None,
            title: title.to_string(),
            url: url.to_string(),
        });
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.menu.location = Some(location.to_string());
        self
    }

    pub fn build(self) -> StepListBuilder {
        self.list_builder.step(&self.id, StepKind::CreateNavigationMenu(self.menu))
    }
}
