use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::clean;

/// Compiled provisioning script, in the shape the hosted runtime consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDocument {
    #[serde(default)]
    pub landing_page: String,
    #[serde(default)]
    pub preferred_versions: PreferredVersions,
    #[serde(default)]
    pub php_extension_bundles: Vec<String>,
    /// Executed in order by the runtime.
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl ScriptDocument {
    pub fn push(&mut self, instruction: Instruction) {
        self.steps.push(instruction.into());
    }

    /// Recognized instructions only, in order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.steps.iter().filter_map(|s| match s {
            ScriptStep::Known(instruction) => Some(instruction),
            ScriptStep::Opaque(_) => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredVersions {
    pub php: String,
    pub wp: String,
}

/// One entry of `steps`. Kinds this crate does not model are kept as raw
/// JSON so externally authored documents still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptStep {
    Known(Instruction),
    Opaque(Value),
}

impl ScriptStep {
    pub fn kind_name(&self) -> &str {
        match self {
            ScriptStep::Known(instruction) => instruction.kind_name(),
            ScriptStep::Opaque(value) => value.get("step").and_then(Value::as_str).unwrap_or("<untagged>"),
        }
    }
}

impl From<Instruction> for ScriptStep {
    fn from(instruction: Instruction) -> Self {
        ScriptStep::Known(instruction)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step")]
pub enum Instruction {
    #[serde(rename = "login")]
    Login {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },

    #[serde(rename = "setSiteOptions", alias = "setOptions")]
    SetSiteOptions { options: Map<String, Value> },

    #[serde(rename = "installPlugin", rename_all = "camelCase")]
    InstallPlugin {
        plugin_zip_file: Resource,
        #[serde(default)]
        options: InstallOptions,
    },

    #[serde(rename = "installTheme", rename_all = "camelCase")]
    InstallTheme {
        theme_zip_file: Resource,
        #[serde(default)]
        options: InstallOptions,
    },

    #[serde(rename = "defineWpConfigConsts")]
    DefineWpConfigConsts { consts: Map<String, Value> },

    #[serde(rename = "importWxr")]
    ImportWxr { file: Resource },

    /// Generic command, the escape hatch for anything without its own kind.
    #[serde(rename = "wp-cli")]
    WpCli { command: String },

    #[serde(rename = "runPHP")]
    RunPhp { code: String },
}

impl Instruction {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instruction::Login { .. } => "login",
            Instruction::SetSiteOptions { .. } => "setSiteOptions",
            Instruction::InstallPlugin { .. } => "installPlugin",
            Instruction::InstallTheme { .. } => "installTheme",
            Instruction::DefineWpConfigConsts { .. } => "defineWpConfigConsts",
            Instruction::ImportWxr { .. } => "importWxr",
            Instruction::WpCli { .. } => "wp-cli",
            Instruction::RunPhp { .. } => "runPHP",
        }
    }

    pub fn command(text: impl Into<String>) -> Self {
        Instruction::WpCli { command: text.into() }
    }

    pub fn options(pairs: impl IntoIterator<Item = (String, Value)>) -> Self {
        Instruction::SetSiteOptions { options: pairs.into_iter().collect() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOptions {
    pub activate: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self { activate: true }
    }
}

/// Where the runtime fetches a zip or archive from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resource")]
pub enum Resource {
    #[serde(rename = "wordpress.org/plugins")]
    PluginRegistry {
        #[serde(default)]
        slug: String,
    },
    #[serde(rename = "wordpress.org/themes")]
    ThemeRegistry {
        #[serde(default)]
        slug: String,
    },
    #[serde(rename = "url")]
    Url {
        #[serde(default)]
        url: String,
    },
}

impl Resource {
    /// Slug or URL, whichever this source carries.
    pub fn locator(&self) -> &str {
        match self {
            Resource::PluginRegistry { slug } | Resource::ThemeRegistry { slug } => slug,
            Resource::Url { url } => url,
        }
    }

    pub fn is_configured(&self) -> bool {
        !clean(self.locator()).is_empty()
    }

    pub fn cleaned(&self) -> Resource {
        match self {
            Resource::PluginRegistry { slug } => Resource::PluginRegistry { slug: clean(slug) },
            Resource::ThemeRegistry { slug } => Resource::ThemeRegistry { slug: clean(slug) },
            Resource::Url { url } => Resource::Url { url: clean(url) },
        }
    }
}
