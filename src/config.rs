use serde::Deserialize;
use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use crate::types::{ServerId, validate_server_id};

/// Key of this plugin under `plugins.entries` in the host configuration.
pub const PLUGIN_ID: &str = "mcp-bridge";

/// Top-level host configuration file. Only the parts the bridge reads are modelled.
#[derive(Debug, Deserialize)]
pub struct HostConfigFile {
    #[serde(default)]
    pub plugins: PluginsSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct PluginsSection {
    #[serde(default)]
    pub entries: BTreeMap<String, PluginEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PluginEntry {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub config: BridgeConfig,
}

/// Configuration of the bridge plugin itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,
}

/// One remote MCP server reachable over streamable HTTP.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            enabled: true,
        }
    }
}

impl BridgeConfig {
    /// Parse a full host configuration and extract this plugin's section.
    ///
    /// A missing or disabled plugin entry yields an empty server set.
    pub fn from_host_json(raw: &str) -> anyhow::Result<Self> {
        let file: HostConfigFile = serde_json::from_str(raw)?;

        let cfg = match file.plugins.entries.get(PLUGIN_ID) {
            Some(entry) if entry.enabled => entry.config.clone(),
            Some(_) => {
                tracing::info!("Plugin `{PLUGIN_ID}` is disabled in configuration");
                BridgeConfig::default()
            }
            None => {
                tracing::warn!("No `plugins.entries.{PLUGIN_ID}` section found in configuration");
                BridgeConfig::default()
            }
        };

        let cfg = cfg.expanded();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every server identifier and URL.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (id, server) in &self.servers {
            validate_server_id(id)
                .map_err(|reason| anyhow::anyhow!("Invalid MCP server identifier `{id}`: {reason}"))?;

            let parsed = url::Url::parse(&server.url)
                .map_err(|e| anyhow::anyhow!("Server `{id}` has an invalid url: {e}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(anyhow::anyhow!(
                    "Server `{}` url must use http or https, got `{}`",
                    id,
                    parsed.scheme()
                ));
            }
        }
        Ok(())
    }

    /// Enabled servers in identifier order.
    pub fn enabled_servers(&self) -> impl Iterator<Item = (ServerId, &ServerConfig)> {
        self.servers
            .iter()
            .filter(|(_, cfg)| cfg.enabled)
            .map(|(id, cfg)| (ServerId::new(id.as_str()), cfg))
    }

    fn expanded(mut self) -> Self {
        for server in self.servers.values_mut() {
            server.url = expand_env_vars(&server.url);
        }
        self
    }
}

pub fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(p) = explicit {
        return Ok(p.to_path_buf());
    }

    if let Ok(p) = env::var("MCP_BRIDGE_CONFIG") {
        return Ok(PathBuf::from(p));
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let candidate = PathBuf::from(xdg).join("mcp-bridge").join("config.json");
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let candidate = PathBuf::from("mcp-bridge.json");
    if candidate.exists() {
        return Ok(candidate);
    }

    Err(anyhow::anyhow!(
        "Could not find bridge configuration (pass --config, set MCP_BRIDGE_CONFIG or create ./mcp-bridge.json)"
    ))
}

pub fn load_bridge_config(explicit: Option<&Path>) -> anyhow::Result<BridgeConfig> {
    let path = resolve_config_path(explicit)?;
    let raw = fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    BridgeConfig::from_host_json(&raw)
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(val) = env::var(&name) {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}
