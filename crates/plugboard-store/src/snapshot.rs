//! Versioned snapshots of a coordination store node.

use std::fmt;

/// Store-assigned generation counter for a node.
///
/// [`Version::Absent`] stands for "the node does not exist". Supplying it as
/// the expected version of a compare-and-set asks the store to create the node
/// only if nobody else has created it in the meantime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Version {
    /// The node does not exist.
    #[default]
    Absent,
    /// The node exists at the given generation.
    Stamp(u64),
}

impl Version {
    /// Returns `true` for [`Version::Absent`].
    #[must_use]
    pub const fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::Stamp(stamp) => write!(f, "v{stamp}"),
        }
    }
}

/// The bytes of a node together with the version they were read at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    data: Option<Vec<u8>>,
    version: Version,
}

impl Snapshot {
    /// Snapshot of a node that does not exist.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            data: None,
            version: Version::Absent,
        }
    }

    /// Snapshot of an existing node.
    #[must_use]
    pub fn present(data: impl Into<Vec<u8>>, stamp: u64) -> Self {
        Self {
            data: Some(data.into()),
            version: Version::Stamp(stamp),
        }
    }

    /// Returns the node bytes, or `None` when the node is absent.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Returns the version the snapshot was read at.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns `true` when the node does not exist.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        self.data.is_none()
    }

    /// Splits the snapshot into its bytes and version.
    #[must_use]
    pub fn into_parts(self) -> (Option<Vec<u8>>, Version) {
        (self.data, self.version)
    }
}
