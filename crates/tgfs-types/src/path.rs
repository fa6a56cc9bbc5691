use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attachment::AttachmentId;
use crate::error::TypeError;

const SEPARATOR: char = '/';

/// Address of a stored file as seen by storage clients.
///
/// Always `"/" + attachment id`. The chat has no namespace of its own, so the
/// platform identifier *is* the address: uploading the same file twice yields
/// two different paths. This type is the only place the convention lives.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemotePath {
    id: AttachmentId,
}

impl RemotePath {
    /// Encode an attachment identifier as a remote path.
    pub fn from_attachment(id: AttachmentId) -> Self {
        Self { id }
    }

    /// Decode a remote path string.
    ///
    /// Exactly one leading separator followed by a non-empty identifier that
    /// itself contains no separator.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let rest = s
            .strip_prefix(SEPARATOR)
            .ok_or_else(|| TypeError::MissingSeparator(s.to_string()))?;
        if rest.is_empty() {
            return Err(TypeError::EmptyIdentifier(s.to_string()));
        }
        if rest.contains(SEPARATOR) {
            return Err(TypeError::Nested(s.to_string()));
        }
        Ok(Self {
            id: AttachmentId::new(rest),
        })
    }

    /// The attachment identifier this path addresses.
    pub fn attachment_id(&self) -> &AttachmentId {
        &self.id
    }

    pub fn into_attachment_id(self) -> AttachmentId {
        self.id
    }
}

impl fmt::Debug for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RemotePath({self})")
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SEPARATOR}{}", self.id)
    }
}

impl FromStr for RemotePath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RemotePath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<RemotePath> for String {
    fn from(p: RemotePath) -> Self {
        p.to_string()
    }
}

/// Turn a caller-supplied remote name into the caption sent with an upload.
///
/// The chat has no paths, only captions, so a single leading separator is
/// dropped and the rest is kept verbatim.
pub fn caption_for(remote_name: &str) -> &str {
    remote_name.strip_prefix(SEPARATOR).unwrap_or(remote_name)
}
