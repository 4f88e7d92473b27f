//! Rust code emission for resolved command lists.

use std::fmt::Write;

use crate::resolve::ResolvedCommands;
use crate::toml_parser::CommandTier;

/// Render a `dispatch_commands!` invocation for `resolved`.
///
/// The output is meant to be `include!`d from inside the `vk-dispatch` crate.
pub fn generate_dispatch_code(resolved: &ResolvedCommands) -> String {
    let mut code = String::new();
    code.push_str("// @generated by vk-dispatch-build. Do not edit.\n");
    if resolved.extensions().is_empty() {
        code.push_str("// Enabled extensions: none\n");
    } else {
        let _ = writeln!(
            code,
            "// Enabled extensions: {}",
            resolved.extensions().join(", ")
        );
    }
    code.push('\n');
    code.push_str("::vk_dispatch_macro::dispatch_commands! {\n");

    for (i, tier) in CommandTier::ALL.into_iter().enumerate() {
        if i > 0 {
            code.push('\n');
        }
        let _ = writeln!(code, "    #[tier = {}]", tier.macro_name());
        let _ = writeln!(code, "    pub mod {} {{", tier.module_name());
        for command in resolved.commands(tier) {
            let _ = writeln!(code, "        {command};");
        }
        code.push_str("    }\n");
    }

    code.push_str("}\n");
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toml_parser::CommandsConfig;

    #[test]
    fn renders_all_tiers_in_order() {
        let config = CommandsConfig::from_str(
            r#"
[global]
commands = ["vkGetInstanceProcAddr"]
[instance]
commands = ["vkDestroyInstance"]
[device]
commands = ["vkGetDeviceProcAddr"]
"#,
        )
        .unwrap();
        let resolved = ResolvedCommands::resolve(&config, |_| false).unwrap();
        let code = generate_dispatch_code(&resolved);

        let expected = "\
// @generated by vk-dispatch-build. Do not edit.
// Enabled extensions: none

::vk_dispatch_macro::dispatch_commands! {
    #[tier = Global]
    pub mod global {
        vkGetInstanceProcAddr;
    }

    #[tier = Instance]
    pub mod instance {
        vkDestroyInstance;
    }

    #[tier = Device]
    pub mod device {
        vkGetDeviceProcAddr;
    }
}
";
        assert_eq!(code, expected);
    }
}
