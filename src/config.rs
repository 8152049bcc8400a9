use serde::{Deserialize, Serialize};

/// Fixed values baked into every compiled blueprint. None of these are
/// user-editable from the builder; a deployment may override them from a
/// YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Site title a fresh install starts with. A `blogname` option is only
    /// emitted when the requested title differs from this.
    pub default_site_title: String,
    pub admin_username: String,
    pub admin_password: String,
    pub php_version: String,
    pub wp_version: String,
    pub extension_bundles: Vec<String>,
    pub admin_path: String,
    pub share_host: String,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            default_site_title: "My WordPress Website".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "password".to_string(),
            php_version: "8.0".to_string(),
            wp_version: "latest".to_string(),
            extension_bundles: vec!["kitchen-sink".to_string()],
            admin_path: "/wp-admin/".to_string(),
            share_host: "https://playground.wordpress.net".to_string(),
        }
    }
}
