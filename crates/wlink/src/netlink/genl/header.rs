//! Generic netlink message sub-header.
//!
//! GENL messages carry an additional 4-byte header after the standard
//! netlink header: command code, interface version, and two reserved
//! bytes, followed by the attribute region.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::netlink::error::{Error, Result};

/// Generic netlink message header (mirrors struct genlmsghdr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct GenlMsgHdr {
    /// Command identifier (family-specific).
    pub cmd: u8,
    /// Interface version.
    pub version: u8,
    /// Reserved for future use.
    pub reserved: u16,
}

impl GenlMsgHdr {
    /// Size of the GENL header in bytes.
    pub const LEN: usize = std::mem::size_of::<GenlMsgHdr>();

    /// Create a new GENL header with the given command and version.
    #[inline]
    pub const fn new(cmd: u8, version: u8) -> Self {
        Self {
            cmd,
            version,
            reserved: 0,
        }
    }

    /// Get the header as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse a header from a byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: Self::LEN,
                actual: data.len(),
            })
    }
}
