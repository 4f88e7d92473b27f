use std::collections::HashMap;
use std::ffi::CString;

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{braced, Error, Ident, Result, Token, Visibility};

use proc_macro_crate::{crate_name, FoundCrate};

/// The three command scopes, as spelled in `#[tier = ...]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tier {
    Global,
    Instance,
    Device,
}

impl Tier {
    fn from_ident(ident: &Ident) -> Result<Self> {
        match ident.to_string().as_str() {
            "Global" => Ok(Self::Global),
            "Instance" => Ok(Self::Instance),
            "Device" => Ok(Self::Device),
            other => Err(Error::new(
                ident.span(),
                format!("unknown tier `{other}`: expected `Global`, `Instance` or `Device`"),
            )),
        }
    }

    fn tokens(self, ns_crate: &TokenStream2) -> TokenStream2 {
        match self {
            Self::Global => quote!(#ns_crate::Tier::Global),
            Self::Instance => quote!(#ns_crate::Tier::Instance),
            Self::Device => quote!(#ns_crate::Tier::Device),
        }
    }
}

/// One `#[tier = X] pub mod name { cmd; cmd; }` block.
struct TierBlock {
    tier: Tier,
    vis: Visibility,
    module: Ident,
    commands: Vec<Ident>,
}

struct CommandsInput {
    tiers: Vec<TierBlock>,
}

impl Parse for CommandsInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut tiers = Vec::new();
        while !input.is_empty() {
            tiers.push(input.parse()?);
        }
        Ok(Self { tiers })
    }
}

impl Parse for TierBlock {
    fn parse(input: ParseStream) -> Result<Self> {
        let tier = parse_tier_attr(input)?;
        let vis: Visibility = input.parse()?;
        input.parse::<Token![mod]>()?;
        let module: Ident = input.parse()?;
        let content;
        braced!(content in input);
        let commands = parse_commands(&content)?;
        if commands.is_empty() {
            return Err(Error::new(
                module.span(),
                format!("command tier `{module}` cannot be empty"),
            ));
        }
        Ok(Self {
            tier,
            vis,
            module,
            commands,
        })
    }
}

/// Parse the mandatory `#[tier = Global]` attribute.
fn parse_tier_attr(input: ParseStream) -> Result<Tier> {
    input.parse::<Token![#]>()?;
    let content;
    syn::bracketed!(content in input);
    let key: Ident = content.parse()?;
    if key != "tier" {
        return Err(Error::new(key.span(), "expected `#[tier = ...]`"));
    }
    content.parse::<Token![=]>()?;
    let value: Ident = content.parse()?;
    Tier::from_ident(&value)
}

fn parse_commands(input: ParseStream) -> Result<Vec<Ident>> {
    let mut commands: Vec<Ident> = Vec::new();
    while !input.is_empty() {
        let name: Ident = input.parse()?;
        input.parse::<Token![;]>()?;
        if let Some(existing) = commands.iter().find(|c| **c == name) {
            let mut err = Error::new(name.span(), format!("duplicate command `{name}`"));
            err.combine(Error::new(existing.span(), "first declared here"));
            return Err(err);
        }
        commands.push(name);
    }
    Ok(commands)
}

// =============================================================================
// Expansion-time checks
// =============================================================================

/// FNV-1a 64, identical to `vk_dispatch::fnv1a_64`.
fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Reject two names in one tier that share a digest, naming both.
fn check_collisions(block: &TierBlock) -> Result<()> {
    let mut seen: HashMap<u64, &Ident> = HashMap::new();
    for name in &block.commands {
        let hash = fnv1a_64(name.to_string().as_bytes());
        if let Some(existing) = seen.insert(hash, name) {
            return Err(Error::new(
                name.span(),
                format!(
                    "hash collision detected: `{existing}` and `{name}` both hash to {hash:#018x} in tier `{}`",
                    block.module
                ),
            ));
        }
    }
    Ok(())
}

// =============================================================================
// Crate path resolution
// =============================================================================

fn dispatch_crate_path() -> TokenStream2 {
    match crate_name("vk-dispatch") {
        Ok(FoundCrate::Itself) => quote!(::vk_dispatch),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Err(_) => quote!(::vk_dispatch),
    }
}

// =============================================================================
// Code generation
// =============================================================================

/// Generate one tier module.
///
/// ```ignore
/// dispatch_commands! {
///     #[tier = Global]
///     pub mod global {
///         vkGetInstanceProcAddr;
///         vkCreateInstance;
///     }
/// }
///
/// // Generates:
/// pub mod global {
///     pub const COUNT: usize = 2;
///     pub mod hashes {
///         pub const vkGetInstanceProcAddr: Digest = fnv1a_64(b"vkGetInstanceProcAddr");
///         pub const vkCreateInstance: Digest = fnv1a_64(b"vkCreateInstance");
///     }
///     #[repr(usize)]
///     pub enum Command { vkGetInstanceProcAddr = 0, vkCreateInstance = 1 }
///     impl Command { /* ALL, index, name, hash, from_hash, ... */ }
///     pub fn to_command(hash: Digest) -> Result<Command>;
///     pub const fn to_hash(command: Command) -> Digest;
/// }
/// ```
fn generate_tier(block: &TierBlock, ns_crate: &TokenStream2) -> Result<TokenStream2> {
    check_collisions(block)?;

    let vis = &block.vis;
    let module = &block.module;
    let tier = block.tier.tokens(ns_crate);
    let commands = &block.commands;
    let count = commands.len();
    let ordinals = 0..count;

    let name_lits = commands
        .iter()
        .map(|c| syn::LitStr::new(&c.to_string(), c.span()))
        .collect::<Vec<_>>();
    let byte_lits = commands
        .iter()
        .map(|c| syn::LitByteStr::new(c.to_string().as_bytes(), c.span()));
    let cstr_lits = commands
        .iter()
        .map(|c| {
            CString::new(c.to_string())
                .map(|s| syn::LitCStr::new(&s, c.span()))
                .map_err(|_| Error::new(c.span(), "command names cannot contain NUL"))
        })
        .collect::<Result<Vec<_>>>()?;

    let doc = format!("Commands compiled into the {module} tier.");

    Ok(quote! {
        #[doc = #doc]
        #[allow(non_snake_case, non_camel_case_types, non_upper_case_globals)]
        #vis mod #module {
            /// Number of compiled-in commands.
            pub const COUNT: usize = #count;

            /// Name digests, usable as match patterns.
            pub mod hashes {
                #(
                    pub const #commands: #ns_crate::Digest = #ns_crate::fnv1a_64(#byte_lits);
                )*
            }

            /// A command compiled into this tier.
            ///
            /// Ordinals are only stable within one build configuration.
            #[repr(usize)]
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub enum Command {
                #( #commands = #ordinals, )*
            }

            impl Command {
                /// Every command, in ordinal order.
                pub const ALL: [Command; COUNT] = [#( Command::#commands ),*];

                #[inline]
                pub const fn index(self) -> usize {
                    self as usize
                }

                /// NUL-terminated entry-point name.
                #[inline]
                pub const fn name(self) -> &'static ::core::ffi::CStr {
                    match self {
                        #( Command::#commands => #cstr_lits, )*
                    }
                }

                #[inline]
                pub const fn as_str(self) -> &'static str {
                    match self {
                        #( Command::#commands => #name_lits, )*
                    }
                }

                /// Stable FNV-1a digest of the entry-point name.
                #[inline]
                pub const fn hash(self) -> #ns_crate::Digest {
                    match self {
                        #( Command::#commands => hashes::#commands, )*
                    }
                }

                /// Exhaustive digest match; `None` outside the compiled-in set.
                #[inline]
                pub const fn from_hash(hash: #ns_crate::Digest) -> ::core::option::Option<Self> {
                    match hash {
                        #( hashes::#commands => ::core::option::Option::Some(Command::#commands), )*
                        _ => ::core::option::Option::None,
                    }
                }

                #[inline]
                pub const fn from_index(index: usize) -> ::core::option::Option<Self> {
                    if index < COUNT {
                        ::core::option::Option::Some(Self::ALL[index])
                    } else {
                        ::core::option::Option::None
                    }
                }
            }

            impl #ns_crate::DispatchCommand for Command {
                const TIER: #ns_crate::Tier = #tier;
                const COUNT: usize = COUNT;
                const ALL: &'static [Self] = &Command::ALL;

                #[inline]
                fn index(self) -> usize {
                    Command::index(self)
                }

                #[inline]
                fn name(self) -> &'static ::core::ffi::CStr {
                    Command::name(self)
                }

                #[inline]
                fn as_str(self) -> &'static str {
                    Command::as_str(self)
                }

                #[inline]
                fn hash(self) -> #ns_crate::Digest {
                    Command::hash(self)
                }

                #[inline]
                fn from_hash(hash: #ns_crate::Digest) -> ::core::option::Option<Self> {
                    Command::from_hash(hash)
                }
            }

            /// Convert a digest into a command of this tier.
            ///
            /// Fails with `Error::UnknownHash` if no compiled-in command has
            /// that digest.
            pub fn to_command(hash: #ns_crate::Digest) -> #ns_crate::Result<Command> {
                <Command as #ns_crate::DispatchCommand>::try_from_hash(hash)
            }

            /// Convert a command into its digest.
            #[inline]
            pub const fn to_hash(command: Command) -> #ns_crate::Digest {
                command.hash()
            }

            impl ::core::convert::TryFrom<usize> for Command {
                type Error = #ns_crate::Error;

                fn try_from(ordinal: usize) -> #ns_crate::Result<Self> {
                    <Command as #ns_crate::DispatchCommand>::try_from_index(ordinal)
                }
            }

            impl ::core::convert::From<Command> for #ns_crate::Digest {
                #[inline]
                fn from(command: Command) -> Self {
                    command.hash()
                }
            }

            impl ::core::str::FromStr for Command {
                type Err = #ns_crate::Error;

                fn from_str(name: &str) -> #ns_crate::Result<Self> {
                    #ns_crate::__private::command_from_str(name)
                }
            }

            impl ::core::fmt::Display for Command {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl #ns_crate::__private::serde::Serialize for Command {
                fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
                where
                    S: #ns_crate::__private::serde::Serializer,
                {
                    serializer.serialize_str(self.as_str())
                }
            }

            impl<'de> #ns_crate::__private::serde::Deserialize<'de> for Command {
                fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
                where
                    D: #ns_crate::__private::serde::Deserializer<'de>,
                {
                    #ns_crate::__private::deserialize_command(deserializer)
                }
            }
        }
    })
}

// =============================================================================
// Entry point
// =============================================================================

/// Declare the commands compiled into each dispatch tier.
///
/// Each block becomes a module holding a closed `Command` enumeration, its
/// name digests, and the conversions between the two. Command order is the
/// ordinal order.
#[proc_macro]
pub fn dispatch_commands(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as CommandsInput);
    let ns_crate = dispatch_crate_path();

    let mut modules = Vec::with_capacity(input.tiers.len());
    for block in &input.tiers {
        match generate_tier(block, &ns_crate) {
            Ok(tokens) => modules.push(tokens),
            Err(err) => return err.to_compile_error().into(),
        }
    }

    quote! { #(#modules)* }.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tier: Tier, module: &str, commands: &[&str]) -> TierBlock {
        TierBlock {
            tier,
            vis: syn::parse_quote!(pub),
            module: Ident::new(module, Span::call_site()),
            commands: commands
                .iter()
                .map(|c| Ident::new(c, Span::call_site()))
                .collect(),
        }
    }

    #[test]
    fn fnv_matches_reference_vectors() {
        assert_eq!(fnv1a_64(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a_64(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn generates_enum_in_declaration_order() {
        let ns_crate = quote!(::vk_dispatch);
        let tokens = generate_tier(
            &block(Tier::Global, "global", &["vkGetInstanceProcAddr", "vkCreateInstance"]),
            &ns_crate,
        )
        .unwrap();
        let code = tokens.to_string();

        assert!(code.contains("pub mod global"));
        assert!(code.contains("pub const COUNT : usize = 2usize"));
        assert!(code.contains("vkGetInstanceProcAddr = 0usize"));
        assert!(code.contains("vkCreateInstance = 1usize"));
        assert!(code.contains("c\"vkCreateInstance\""));
        assert!(code.contains(":: vk_dispatch :: Tier :: Global"));
    }

    #[test]
    fn tier_attr_is_required() {
        let parsed: Result<CommandsInput> = syn::parse_str("pub mod global { vkA; }");
        assert!(parsed.is_err());

        let parsed: Result<CommandsInput> = syn::parse_str("#[tier = Queue] pub mod q { vkA; }");
        let err = parsed.err().unwrap();
        assert!(err.to_string().contains("unknown tier"));
    }

    #[test]
    fn rejects_duplicates_and_empty_tiers() {
        let parsed: Result<CommandsInput> =
            syn::parse_str("#[tier = Device] pub mod device { vkA; vkB; vkA; }");
        assert!(parsed.err().unwrap().to_string().contains("duplicate command `vkA`"));

        let parsed: Result<CommandsInput> = syn::parse_str("#[tier = Device] pub mod device { }");
        assert!(parsed.err().unwrap().to_string().contains("cannot be empty"));
    }

    #[test]
    fn parses_multiple_tiers() {
        let parsed: CommandsInput = syn::parse_str(
            "#[tier = Global] pub mod global { vkA; }
             #[tier = Instance] pub(crate) mod instance { vkB; vkC; }",
        )
        .unwrap();
        assert_eq!(parsed.tiers.len(), 2);
        assert_eq!(parsed.tiers[0].tier, Tier::Global);
        assert_eq!(parsed.tiers[1].tier, Tier::Instance);
        assert_eq!(parsed.tiers[1].commands.len(), 2);
    }

    #[test]
    fn distinct_names_do_not_collide() {
        let b = block(
            Tier::Device,
            "device",
            &["vkCreateBuffer", "vkDestroyBuffer", "vkCreateImage", "vkDestroyImage"],
        );
        assert!(check_collisions(&b).is_ok());
    }
}
