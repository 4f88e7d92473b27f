//! TOML configuration parser for commands.toml.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Loader command every global tier must contain.
pub const GLOBAL_LOADER: &str = "vkGetInstanceProcAddr";

/// Loader command every device tier must contain.
pub const DEVICE_LOADER: &str = "vkGetDeviceProcAddr";

/// The scope a command is compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandTier {
    Global,
    Instance,
    Device,
}

impl CommandTier {
    pub const ALL: [CommandTier; 3] = [Self::Global, Self::Instance, Self::Device];

    /// Module name in the generated code.
    pub fn module_name(self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Instance => "instance",
            Self::Device => "device",
        }
    }

    /// Tier name as spelled in `#[tier = ...]`.
    pub fn macro_name(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Instance => "Instance",
            Self::Device => "Device",
        }
    }
}

impl fmt::Display for CommandTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.module_name())
    }
}

/// Parsed and validated command configuration.
#[derive(Debug, Clone)]
pub struct CommandsConfig {
    global: Vec<String>,
    instance: Vec<String>,
    device: Vec<String>,
    extensions: Vec<Extension>,
}

/// An optional extension, compiled in when its cargo feature is enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// API extension name (e.g., "VK_KHR_swapchain")
    pub name: String,
    /// Cargo feature that enables it (e.g., "khr_swapchain")
    pub feature: String,
    /// Extensions that must be enabled alongside this one
    pub requires: Vec<String>,
    pub global: Vec<String>,
    pub instance: Vec<String>,
    pub device: Vec<String>,
}

impl Extension {
    /// Commands this extension adds to `tier`.
    pub fn commands(&self, tier: CommandTier) -> &[String] {
        match tier {
            CommandTier::Global => &self.global,
            CommandTier::Instance => &self.instance,
            CommandTier::Device => &self.device,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCommandsConfig {
    global: RawTier,
    instance: RawTier,
    device: RawTier,
    #[serde(default)]
    extensions: Vec<RawExtension>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTier {
    commands: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExtension {
    name: String,
    feature: String,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    global: Vec<String>,
    #[serde(default)]
    instance: Vec<String>,
    #[serde(default)]
    device: Vec<String>,
}

impl CommandsConfig {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawCommandsConfig = toml::from_str(content)?;

        let extensions = raw
            .extensions
            .into_iter()
            .map(|ext| Extension {
                name: ext.name,
                feature: ext.feature,
                requires: ext.requires,
                global: ext.global,
                instance: ext.instance,
                device: ext.device,
            })
            .collect();

        let config = Self {
            global: raw.global.commands,
            instance: raw.instance.commands,
            device: raw.device.commands,
            extensions,
        };
        config.validate()?;
        Ok(config)
    }

    /// Core commands of `tier`, always compiled in.
    pub fn core(&self, tier: CommandTier) -> &[String] {
        match tier {
            CommandTier::Global => &self.global,
            CommandTier::Instance => &self.instance,
            CommandTier::Device => &self.device,
        }
    }

    /// All declared extensions, in file order.
    pub fn extensions(&self) -> impl Iterator<Item = &Extension> {
        self.extensions.iter()
    }

    /// Look up an extension by API name.
    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.name == name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for tier in CommandTier::ALL {
            if self.core(tier).is_empty() {
                return Err(ConfigError::Validation(format!(
                    "the {tier} tier must declare at least one core command"
                )));
            }

            // A name may be declared once per tier, across core and extensions.
            let mut seen: HashSet<&str> = HashSet::new();
            let declared = self
                .core(tier)
                .iter()
                .chain(self.extensions.iter().flat_map(|ext| ext.commands(tier)));
            for name in declared {
                validate_identifier(name)?;
                if !seen.insert(name) {
                    return Err(ConfigError::Validation(format!(
                        "command '{name}' is declared more than once in the {tier} tier"
                    )));
                }
            }
        }

        if !self.global.iter().any(|c| c == GLOBAL_LOADER) {
            return Err(ConfigError::Validation(format!(
                "the global tier must contain the loader command '{GLOBAL_LOADER}'"
            )));
        }
        if !self.device.iter().any(|c| c == DEVICE_LOADER) {
            return Err(ConfigError::Validation(format!(
                "the device tier must contain the loader command '{DEVICE_LOADER}'"
            )));
        }

        let mut names: HashSet<&str> = HashSet::new();
        let mut features: HashSet<&str> = HashSet::new();
        for ext in &self.extensions {
            validate_identifier(&ext.name)?;
            validate_feature(&ext.feature)?;
            if !names.insert(&ext.name) {
                return Err(ConfigError::Validation(format!(
                    "extension '{}' is declared more than once",
                    ext.name
                )));
            }
            if !features.insert(&ext.feature) {
                return Err(ConfigError::Validation(format!(
                    "feature '{}' is used by more than one extension",
                    ext.feature
                )));
            }
        }

        for ext in &self.extensions {
            for required in &ext.requires {
                if required == &ext.name {
                    return Err(ConfigError::Validation(format!(
                        "extension '{}' cannot require itself",
                        ext.name
                    )));
                }
                if !names.contains(required.as_str()) {
                    return Err(ConfigError::Validation(format!(
                        "extension '{}' requires unknown extension '{}'",
                        ext.name, required
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Command and extension names must be C identifiers.
fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::Validation(format!(
            "invalid name '{name}': expected a C identifier"
        )));
    }
    Ok(())
}

fn validate_feature(feature: &str) -> Result<(), ConfigError> {
    let valid = !feature.is_empty()
        && feature
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        return Err(ConfigError::Validation(format!(
            "invalid feature '{feature}': expected lowercase letters, digits, '_' or '-'"
        )));
    }
    Ok(())
}

/// Errors during config parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("validation error: {0}")]
    Validation(String),
}
