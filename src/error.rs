//! Construction and resolution errors.

use thiserror::Error;

use crate::ffi::HandleKind;
use crate::hash::Digest;
use crate::traits::Tier;

/// The single error type for table construction and command identity lookups.
///
/// Every variant is a local, synchronous failure caused by bad input. Retrying
/// with the same arguments fails the same way; the caller has to supply
/// corrected inputs and construct again.
///
/// Hash-based table lookups never produce an error. They return `None` for an
/// unknown digest, see [`DispatchTable::get_by_hash`](crate::DispatchTable::get_by_hash).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A global table was constructed without a loader entry point.
    #[error("the global loader command \"vkGetInstanceProcAddr\" cannot be null")]
    NullLoader,

    /// A required `VkInstance` or `VkDevice` handle was null.
    #[error("the \"{handle}\" handle cannot be null")]
    NullHandle {
        /// Which handle was missing.
        handle: HandleKind,
    },

    /// A device table was extended with a device handle but already has one.
    #[error("the base table cannot have a \"VkDevice\" handle loaded")]
    ConfigurationConflict,

    /// A checked lookup received an ordinal past the end of the table.
    #[error("ordinal {ordinal} is outside the valid range of {count} {tier} commands")]
    OrdinalOutOfRange {
        tier: Tier,
        ordinal: usize,
        count: usize,
    },

    /// An ordinal does not name any compiled-in command.
    #[error("ordinal {ordinal} does not map to any {tier} command")]
    UnknownOrdinal { tier: Tier, ordinal: usize },

    /// A digest does not map to any compiled-in command.
    #[error("hash value {hash:#018x} does not map to any {tier} command")]
    UnknownHash { tier: Tier, hash: Digest },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        assert!(Error::NullLoader.to_string().contains("vkGetInstanceProcAddr"));
        assert_eq!(
            Error::NullHandle {
                handle: HandleKind::Device
            }
            .to_string(),
            "the \"VkDevice\" handle cannot be null"
        );
        let err = Error::UnknownHash {
            tier: Tier::Device,
            hash: 0xcbf29ce484222325,
        };
        assert_eq!(
            err.to_string(),
            "hash value 0xcbf29ce484222325 does not map to any device-level command"
        );
    }
}
