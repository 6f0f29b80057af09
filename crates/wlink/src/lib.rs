//! Async generic netlink library for wireless radio control on Linux.
//!
//! This crate speaks the nl80211 generic netlink family: it resolves the
//! family id at session open, frames requests with the netlink and genl
//! headers, encodes attributes with proper alignment and nesting, and
//! runs strict request/response exchanges that match replies by sequence
//! number.
//!
//! # Example
//!
//! ```ignore
//! use wlink::nl80211::WifiSession;
//!
//! #[tokio::main]
//! async fn main() -> wlink::Result<()> {
//!     let mut wifi = WifiSession::open().await?;
//!
//!     wifi.set_regdomain("ua").await?;
//!     wifi.set_channel("wlan0", 11).await?;
//!
//!     let channels = wifi.supported_channels("wlan0", false, 64).await?;
//!     for channel in channels {
//!         println!("channel {}", channel);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod netlink;
pub mod nl80211;
pub mod util;

pub use netlink::{Error, GenlSession, Result};
pub use nl80211::WifiSession;
