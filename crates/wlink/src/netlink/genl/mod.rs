//! Generic netlink: sub-header, control family, session.
//!
//! Generic netlink families are numbered dynamically; only the control
//! family has a fixed id. A session therefore starts with one bootstrap
//! exchange against the control family to translate a symbolic family
//! name into its numeric id, after which every request is addressed to
//! that id.

pub mod header;
mod session;

#[cfg(test)]
pub(crate) mod mock;

pub use header::GenlMsgHdr;
pub use session::GenlSession;

/// Fixed id of the generic netlink control family.
pub const GENL_ID_CTRL: u16 = 0x10;

/// Version carried in control family requests.
pub const GENL_CTRL_VERSION: u8 = 1;

/// Control family commands.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlCmd {
    Unspec = 0,
    NewFamily = 1,
    DelFamily = 2,
    GetFamily = 3,
}

/// Control family attributes.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtrlAttr {
    Unspec = 0,
    FamilyId = 1,
    FamilyName = 2,
    Version = 3,
    HdrSize = 4,
    MaxAttr = 5,
}

impl CtrlAttr {
    /// Highest control attribute indexed when parsing responses.
    pub const MAX: u16 = 10;
}
