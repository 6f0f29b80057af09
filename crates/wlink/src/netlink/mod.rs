//! Netlink protocol core: transport, framing, attribute codec, and the
//! generic netlink session.
//!
//! Everything a family-specific layer needs is expressed through this
//! module's contract: open a [`genl::GenlSession`], build a request with
//! the session's [`builder::MessageBuilder`], run [`genl::GenlSession::exchange`],
//! and read the response through [`attr::AttrTable`] and [`attr::get`].

pub mod attr;
pub mod builder;
mod error;
pub mod genl;
pub mod message;
pub mod socket;

pub use error::{Error, Result};
pub use genl::GenlSession;
pub use socket::{GenlSocket, MSG_BUF_SIZE, Transport};
