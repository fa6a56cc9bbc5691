//! Operation support matrix.
//!
//! A chat is an append-only log of messages, so most filesystem operations
//! have no counterpart. Each operation the host storage client may issue is
//! an [`Operation`]; [`Operation::is_supported`] is the single table that
//! says which ones this backend implements. Unsupported operations fail with
//! [`StoreError::Unsupported`] before any network call.

use std::fmt;

use crate::error::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Authenticate and resolve the destination chat.
    Connect,
    Put,
    PutStream,
    /// Resolve a remote path to an object (stat).
    NewObject,
    Open,
    Remove,
    List,
    Mkdir,
    Rmdir,
    SetModTime,
    Update,
    Hash,
    Move,
    Copy,
}

impl Operation {
    pub const ALL: [Operation; 14] = [
        Self::Connect,
        Self::Put,
        Self::PutStream,
        Self::NewObject,
        Self::Open,
        Self::Remove,
        Self::List,
        Self::Mkdir,
        Self::Rmdir,
        Self::SetModTime,
        Self::Update,
        Self::Hash,
        Self::Move,
        Self::Copy,
    ];

    pub const fn is_supported(self) -> bool {
        match self {
            Self::Connect
            | Self::Put
            | Self::PutStream
            | Self::NewObject
            | Self::Open
            | Self::Remove => true,
            // No directories in a chat.
            Self::List | Self::Mkdir | Self::Rmdir => false,
            // A sent attachment cannot be re-stamped or re-written.
            Self::SetModTime | Self::Update => false,
            // The platform exposes no checksum.
            Self::Hash => false,
            Self::Move | Self::Copy => false,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Put => "put",
            Self::PutStream => "put_stream",
            Self::NewObject => "stat",
            Self::Open => "open",
            Self::Remove => "remove",
            Self::List => "list",
            Self::Mkdir => "mkdir",
            Self::Rmdir => "rmdir",
            Self::SetModTime => "set_mod_time",
            Self::Update => "update",
            Self::Hash => "hash",
            Self::Move => "move",
            Self::Copy => "copy",
        }
    }

    /// Operations this backend implements.
    pub fn supported() -> impl Iterator<Item = Operation> {
        Self::ALL.into_iter().filter(|op| op.is_supported())
    }

    /// The error returned when this operation is attempted but unsupported.
    pub(crate) fn reject(self) -> StoreError {
        debug_assert!(!self.is_supported(), "{self} is supported");
        StoreError::Unsupported(self)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checksum kinds a storage client may ask for. None are available from
/// this backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashKind {
    Md5,
    Sha1,
    Sha256,
    Crc32,
    Blake3,
}

impl fmt::Display for HashKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Crc32 => "crc32",
            Self::Blake3 => "blake3",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_object_lifecycle_is_supported() {
        let supported: Vec<_> = Operation::supported().collect();
        assert_eq!(
            supported,
            vec![
                Operation::Connect,
                Operation::Put,
                Operation::PutStream,
                Operation::NewObject,
                Operation::Open,
                Operation::Remove,
            ]
        );
    }

    #[test]
    fn all_lists_every_operation_once() {
        let mut ops = Operation::ALL.to_vec();
        ops.sort();
        ops.dedup();
        assert_eq!(ops.len(), Operation::ALL.len());
    }

    #[test]
    fn rejection_message_names_the_operation() {
        let err = Operation::Mkdir.reject();
        assert_eq!(
            err.to_string(),
            "mkdir is not supported by the telegram backend"
        );
        assert!(err.is_unsupported());
    }
}
