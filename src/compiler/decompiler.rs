use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::blueprint::{Instruction, Resource, ScriptDocument, ScriptStep};
use crate::codec::{clean, decode};
use crate::compiler::shell::split_args;
use crate::dsl::{
    ConfigConstData, ContentData, ImportData, LoginData, MenuData, MenuItem, MenuItemType, PluginData,
    SiteOptionData, Step, StepKind, StepList, ThemeData,
};

/// An instruction that matched no known shape. Dropping it does not stop
/// the rest of the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("instruction #{index} ({kind}) dropped: {reason}")]
pub struct MalformedStepError {
    pub index: usize,
    pub kind: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecompileReport {
    pub steps: StepList,
    pub dropped: Vec<MalformedStepError>,
}

static PHP_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"["'](post_type|post_status|post_title|post_content)["']\s*=>\s*(?:base64_decode\(\s*["']([A-Za-z0-9+/=]*)["']\s*\)|"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#,
    )
    .expect("post field pattern")
});

static MENU_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"wp_get_nav_menu_object\(\s*base64_decode\(\s*"([A-Za-z0-9+/=]*)"\s*\)\s*\)"#)
        .expect("menu lookup pattern")
});

static TITLE_LOOKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""title"\s*=>\s*base64_decode\(\s*"([A-Za-z0-9+/=]*)"\s*\)"#).expect("title lookup pattern")
});

/// Reads a script document back into builder steps. Unrecognized
/// instructions are dropped; an empty list is a valid result.
pub fn decompile(document: &ScriptDocument) -> StepList {
    decompile_with_report(document).steps
}

pub fn decompile_with_report(document: &ScriptDocument) -> DecompileReport {
    let mut decompiler = Decompiler::default();
    let mut dropped = Vec::new();

    for (index, script_step) in document.steps.iter().enumerate() {
        if let Err(reason) = decompiler.convert(script_step) {
            let err = MalformedStepError {
                index,
                kind: script_step.kind_name().to_string(),
                reason,
            };
            warn!("{}", err);
            dropped.push(err);
        }
    }

    DecompileReport {
        steps: decompiler.steps,
        dropped,
    }
}

#[derive(Default)]
struct Decompiler {
    steps: StepList,
}

impl Decompiler {
    fn push(&mut self, kind: StepKind) {
        self.steps.push(Step::new(Uuid::new_v4().to_string(), kind));
    }

    fn convert(&mut self, script_step: &ScriptStep) -> Result<(), String> {
        let instruction = match script_step {
            ScriptStep::Known(instruction) => instruction,
            ScriptStep::Opaque(_) => return Err("unrecognized or malformed instruction".to_string()),
        };

        match instruction {
            Instruction::Login { username, password } => {
                self.push(StepKind::Login(LoginData {
                    username: Some(username.clone()),
                    password: Some(password.clone()),
                }));
            }
            Instruction::SetSiteOptions { options } => {
                if options.is_empty() {
                    return Err("no options".to_string());
                }
                for (name, value) in options {
                    self.push(StepKind::SetSiteOption(SiteOptionData {
                        option_name: name.clone(),
                        option_value: value.clone(),
                    }));
                }
            }
            Instruction::InstallPlugin { plugin_zip_file, options } => {
                self.push(StepKind::InstallPlugin(PluginData {
                    plugin_zip_file: Some(plugin_zip_file.clone()),
                    activate: Some(options.activate),
                }));
            }
            Instruction::InstallTheme { theme_zip_file, options } => {
                self.push(StepKind::InstallTheme(ThemeData {
                    theme_zip_file: Some(theme_zip_file.clone()),
                    activate: Some(options.activate),
                }));
            }
            Instruction::DefineWpConfigConsts { consts } => {
                if consts.is_empty() {
                    return Err("no constants".to_string());
                }
                self.push(StepKind::DefineWpConfigConst(ConfigConstData { consts: consts.clone() }));
            }
            Instruction::ImportWxr { file } => match file {
                Resource::Url { url } if !url.is_empty() => {
                    self.push(StepKind::ImportWxr(ImportData { url: url.clone() }));
                }
                _ => return Err("import source is not a url".to_string()),
            },
            Instruction::WpCli { command } => self.command(command)?,
            Instruction::RunPhp { code } => {
                if !code.contains("wp_insert_post") {
                    return Err("php code does not create content".to_string());
                }
                self.php_content(code)?;
            }
        }

        Ok(())
    }

    fn command(&mut self, command: &str) -> Result<(), String> {
        let args = split_args(command);
        let words: Vec<&str> = args.iter().map(String::as_str).collect();

        match words.as_slice() {
            ["wp", "post", "create", flags @ ..] => self.post_create(flags),
            ["wp", "media", "import", url, ..] => self.media_import(url),
            ["wp", "menu", "create", name, ..] => {
                let name = clean(name);
                if name.is_empty() {
                    return Err("menu without a name".to_string());
                }
                self.push(StepKind::CreateNavigationMenu(MenuData {
                    menu_name: name,
                    ..Default::default()
                }));
                Ok(())
            }
            ["wp", "menu", "item", "add-custom", menu, title, url, ..] => {
                let item = MenuItem {
                    item_type: MenuItemType::Custom,
                    page_id: None,
                    title: title.to_string(),
                    url: url.to_string(),
                };
                self.menu_mut(menu)?.items.push(item);
                Ok(())
            }
            ["wp", "menu", "location", "assign", menu, location, ..] => {
                self.menu_mut(menu)?.location = Some(location.to_string());
                Ok(())
            }
            ["wp", "eval", code] if code.contains("wp_insert_post") => self.php_content(code),
            ["wp", "eval", code] if code.contains("wp_update_nav_menu_item") => self.menu_page_item(code),
            ["wp", "eval", code] if code.contains("set_post_thumbnail") => {
                // Second half of a media import; the image is already attached.
                debug!("skipping featured image attach command");
                Ok(())
            }
            _ => Err(format!("unrecognized command: {}", truncate(command, 60))),
        }
    }

    fn post_create(&mut self, flags: &[&str]) -> Result<(), String> {
        let mut post_type = "post";
        let mut data = ContentData::default();

        for flag in flags {
            let Some((key, value)) = flag.strip_prefix("--").and_then(|f| f.split_once('=')) else {
                continue;
            };
            match key {
                "post_type" => post_type = if value == "page" { "page" } else { "post" },
                "post_title" => data.post_title = value.to_string(),
                "post_content" => data.post_content = value.to_string(),
                "post_status" => data.post_status = value.to_string(),
                _ => {}
            }
        }

        self.push_content(post_type, data)
    }

    fn php_content(&mut self, code: &str) -> Result<(), String> {
        let mut post_type = "post";
        let mut data = ContentData::default();

        for caps in PHP_FIELD.captures_iter(code) {
            let value = if let Some(encoded) = caps.get(2) {
                decode(encoded.as_str()).map_err(|e| e.to_string())?
            } else if let Some(literal) = caps.get(3).or_else(|| caps.get(4)) {
                unescape_php(literal.as_str())
            } else {
                String::new()
            };

            match &caps[1] {
                "post_type" => post_type = if value == "page" { "page" } else { "post" },
                "post_title" => data.post_title = value,
                "post_content" => data.post_content = value,
                "post_status" => data.post_status = value,
                _ => {}
            }
        }

        self.push_content(post_type, data)
    }

    fn push_content(&mut self, post_type: &str, data: ContentData) -> Result<(), String> {
        if data.post_title.trim().is_empty() {
            return Err("content without a title".to_string());
        }
        if post_type == "page" {
            self.push(StepKind::AddPage(data));
        } else {
            self.push(StepKind::AddPost(data));
        }
        Ok(())
    }

    fn media_import(&mut self, url: &str) -> Result<(), String> {
        let content = self.steps.iter_mut().rev().find_map(|s| match &mut s.kind {
            StepKind::AddPage(data) | StepKind::AddPost(data) => Some(data),
            _ => None,
        });

        match content {
            Some(data) if data.featured_image_url.is_none() => {
                data.featured_image_url = Some(url.to_string());
                Ok(())
            }
            _ => Err("media import without a preceding post to attach to".to_string()),
        }
    }

    fn menu_page_item(&mut self, code: &str) -> Result<(), String> {
        let menu = MENU_OBJECT
            .captures(code)
            .ok_or("menu lookup not found")?
            .get(1)
            .map(|m| decode(m.as_str()))
            .transpose()
            .map_err(|e| e.to_string())?
            .unwrap_or_default();
        let title = TITLE_LOOKUP
            .captures(code)
            .ok_or("page lookup not found")?
            .get(1)
            .map(|m| decode(m.as_str()))
            .transpose()
            .map_err(|e| e.to_string())?
            .unwrap_or_default();

        let page_id = self
            .steps
            .iter()
            .find(|s| s.kind.created_content().is_some_and(|c| c.title == clean(&title)))
            .map(|s| s.id.clone())
            .ok_or_else(|| format!("no page titled {:?} precedes the menu item", title))?;

        self.menu_mut(&menu)?.items.push(MenuItem {
            item_type: MenuItemType::Page,
            page_id: Some(page_id),
            title: String::new(),
            url: String::new(),
        });
        Ok(())
    }

    fn menu_mut(&mut self, name: &str) -> Result<&mut MenuData, String> {
        let name = clean(name);
        self.steps
            .iter_mut()
            .rev()
            .find_map(|s| match &mut s.kind {
                StepKind::CreateNavigationMenu(menu) if menu.menu_name == name => Some(menu),
                _ => None,
            })
            .ok_or_else(|| format!("menu {:?} was never created", name))
    }
}

fn unescape_php(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(next @ ('\\' | '\'' | '"')) => out.push(next),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_php_handles_quotes() {
        assert_eq!(unescape_php(r#"Bob\'s \"x\" \\ \n \t"#), "Bob's \"x\" \\ \n \\t");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé...");
        assert_eq!(truncate("short", 10), "short");
    }
}
