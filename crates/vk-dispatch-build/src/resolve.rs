//! Extension selection: turn a config plus a set of enabled features into the
//! ordered per-tier command lists that get compiled in.

use std::collections::HashMap;

use crate::toml_parser::{CommandTier, CommandsConfig, ConfigError};

/// The commands compiled into one build, per tier, in ordinal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommands {
    global: Vec<String>,
    instance: Vec<String>,
    device: Vec<String>,
    extensions: Vec<String>,
}

impl ResolvedCommands {
    /// Select commands for the features `enabled` reports as on.
    ///
    /// Core commands come first in file order, followed by the commands of
    /// each enabled extension in file order.
    pub fn resolve(
        config: &CommandsConfig,
        enabled: impl Fn(&str) -> bool,
    ) -> Result<Self, ConfigError> {
        let active: Vec<_> = config
            .extensions()
            .filter(|ext| enabled(&ext.feature))
            .collect();

        for ext in &active {
            for required in &ext.requires {
                if !active.iter().any(|other| &other.name == required) {
                    let feature = config
                        .extension(required)
                        .map(|r| r.feature.as_str())
                        .unwrap_or(required.as_str());
                    return Err(ConfigError::Validation(format!(
                        "extension '{}' requires '{}', enable the '{}' feature",
                        ext.name, required, feature
                    )));
                }
            }
        }

        let collect = |tier: CommandTier| -> Result<Vec<String>, ConfigError> {
            let commands: Vec<String> = config
                .core(tier)
                .iter()
                .chain(active.iter().flat_map(|ext| ext.commands(tier)))
                .cloned()
                .collect();
            check_digests(tier, &commands)?;
            Ok(commands)
        };

        Ok(Self {
            global: collect(CommandTier::Global)?,
            instance: collect(CommandTier::Instance)?,
            device: collect(CommandTier::Device)?,
            extensions: active.iter().map(|ext| ext.name.clone()).collect(),
        })
    }

    /// Commands compiled into `tier`, in ordinal order.
    pub fn commands(&self, tier: CommandTier) -> &[String] {
        match tier {
            CommandTier::Global => &self.global,
            CommandTier::Instance => &self.instance,
            CommandTier::Device => &self.device,
        }
    }

    /// Names of the enabled extensions.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

/// FNV-1a 64, the digest the generated code matches on.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn check_digests(tier: CommandTier, commands: &[String]) -> Result<(), ConfigError> {
    let mut seen: HashMap<u64, &str> = HashMap::new();
    for name in commands {
        let hash = fnv1a_64(name.as_bytes());
        if let Some(existing) = seen.insert(hash, name) {
            return Err(ConfigError::Validation(format!(
                "hash collision in the {tier} tier: '{existing}' and '{name}' both hash to {hash:#018x}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[global]
commands = ["vkGetInstanceProcAddr", "vkCreateInstance"]

[instance]
commands = ["vkDestroyInstance", "vkEnumeratePhysicalDevices"]

[device]
commands = ["vkGetDeviceProcAddr", "vkDestroyDevice"]

[[extensions]]
name = "VK_KHR_surface"
feature = "khr_surface"
instance = ["vkDestroySurfaceKHR"]

[[extensions]]
name = "VK_KHR_swapchain"
feature = "khr_swapchain"
requires = ["VK_KHR_surface"]
device = ["vkCreateSwapchainKHR", "vkDestroySwapchainKHR"]
"#;

    fn config() -> CommandsConfig {
        CommandsConfig::from_str(CONFIG).unwrap()
    }

    #[test]
    fn no_features_selects_core_only() {
        let resolved = ResolvedCommands::resolve(&config(), |_| false).unwrap();

        assert_eq!(resolved.commands(CommandTier::Global).len(), 2);
        assert_eq!(
            resolved.commands(CommandTier::Instance),
            ["vkDestroyInstance", "vkEnumeratePhysicalDevices"]
        );
        assert_eq!(
            resolved.commands(CommandTier::Device),
            ["vkGetDeviceProcAddr", "vkDestroyDevice"]
        );
        assert!(resolved.extensions().is_empty());
    }

    #[test]
    fn extensions_append_after_core() {
        let resolved = ResolvedCommands::resolve(&config(), |_| true).unwrap();

        assert_eq!(
            resolved.commands(CommandTier::Instance),
            ["vkDestroyInstance", "vkEnumeratePhysicalDevices", "vkDestroySurfaceKHR"]
        );
        assert_eq!(
            resolved.commands(CommandTier::Device),
            [
                "vkGetDeviceProcAddr",
                "vkDestroyDevice",
                "vkCreateSwapchainKHR",
                "vkDestroySwapchainKHR"
            ]
        );
        assert_eq!(resolved.extensions(), ["VK_KHR_surface", "VK_KHR_swapchain"]);
    }

    #[test]
    fn single_extension_selection() {
        let resolved = ResolvedCommands::resolve(&config(), |f| f == "khr_surface").unwrap();
        assert_eq!(resolved.commands(CommandTier::Instance).len(), 3);
        assert_eq!(resolved.commands(CommandTier::Device).len(), 2);
    }

    #[test]
    fn missing_requirement_is_an_error() {
        let err = ResolvedCommands::resolve(&config(), |f| f == "khr_swapchain").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("VK_KHR_surface"));
        assert!(msg.contains("khr_surface"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = ResolvedCommands::resolve(&config(), |_| true).unwrap();
        let b = ResolvedCommands::resolve(&config(), |_| true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn digests_match_reference_vectors() {
        assert_eq!(fnv1a_64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_64(b"foobar"), 0x85944171f73967e8);
        assert!(check_digests(CommandTier::Device, &["a".into(), "b".into()]).is_ok());
    }
}
