//! Error types for netlink operations.

use std::io;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during netlink operations.
///
/// The two failure sides of an exchange stay distinct: [`Error::Io`] means
/// the local transport broke (possibly worth retrying with a fresh session),
/// while [`Error::Kernel`] means the kernel looked at the request and
/// rejected it (final).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Local I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned an error code on the response side channel.
    #[error("kernel error: {message} (errno {errno})")]
    Kernel {
        /// The errno value from the kernel.
        errno: i32,
        /// Human-readable error message.
        message: String,
    },

    /// Fewer bytes were transmitted than the message declares.
    #[error("short send: message is {expected} bytes, wrote {sent}")]
    ShortSend {
        /// Declared message length.
        expected: usize,
        /// Bytes actually written.
        sent: usize,
    },

    /// A request outgrew the fixed transmit buffer.
    #[error("message too large: {needed} bytes exceed the {capacity}-byte buffer")]
    MessageTooLarge {
        /// Bytes the message would need.
        needed: usize,
        /// Fixed buffer capacity.
        capacity: usize,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// An attribute's declared length does not cover the value read from it.
    #[error("malformed attribute: {0}")]
    MalformedAttribute(String),

    /// Generic netlink family name could not be resolved.
    #[error("generic netlink family not found: {name}")]
    FamilyNotFound {
        /// The family name that was looked up.
        name: String,
    },

    /// An attribute the operation requires is absent from the response.
    #[error("expected attribute {attr} missing from response")]
    MissingAttribute {
        /// The absent attribute type.
        attr: u16,
    },

    /// A supported-channels query produced no usable channels.
    #[error("no usable channels reported")]
    NoChannels,

    /// Interface not found.
    #[error("interface not found: {name}")]
    InterfaceNotFound {
        /// The interface name that was not found.
        name: String,
    },

    /// A caller-supplied parameter is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The peer closed the socket.
    #[error("netlink peer closed the connection")]
    Disconnected,
}

impl Error {
    /// Create a kernel error from a (negative) errno value.
    pub fn from_errno(errno: i32) -> Self {
        let message = io::Error::from_raw_os_error(-errno).to_string();
        Self::Kernel {
            errno: -errno,
            message,
        }
    }

    /// Check if this is a "not found" error (ENOENT, ENODEV, etc.).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, 2 | 19), // ENOENT=2, ENODEV=19
            Self::InterfaceNotFound { .. } | Self::FamilyNotFound { .. } => true,
            _ => false,
        }
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        match self {
            Self::Kernel { errno, .. } => matches!(*errno, 1 | 13), // EPERM=1, EACCES=13
            _ => false,
        }
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Kernel { errno, .. } => Some(*errno),
            _ => None,
        }
    }
}
