//! nl80211 protocol constants and the wireless command layer.
//!
//! Ids mirror `<linux/nl80211.h>`; only the subset this crate speaks is
//! spelled out.

pub mod channel;
mod wifi;

pub use wifi::WifiSession;

/// Symbolic name the family id is resolved from.
pub const NL80211_GENL_NAME: &str = "nl80211";

/// nl80211 interface version carried in the genl sub-header.
pub const NL80211_VERSION: u8 = 1;

/// nl80211 commands used by this crate.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiCmd {
    GetWiphy = 1,
    SetWiphy = 2,
    GetInterface = 5,
    SetInterface = 6,
    ReqSetReg = 27,
    SetTxBitrateMask = 57,
    SetChannel = 65,
    ReloadRegdb = 118,
}

/// Top-level nl80211 attributes.
pub struct Attr;

impl Attr {
    pub const IFINDEX: u16 = 3;
    pub const IFTYPE: u16 = 5;
    pub const WIPHY_BANDS: u16 = 22;
    pub const REG_ALPHA2: u16 = 33;
    pub const WIPHY_FREQ: u16 = 38;
    pub const TX_RATES: u16 = 90;
    pub const WIPHY_TX_POWER_SETTING: u16 = 97;
    pub const WIPHY_TX_POWER_LEVEL: u16 = 98;

    /// Highest attribute id indexed from responses. The kernel keeps
    /// adding attributes past this; anything newer is dropped while
    /// indexing, which is forward-compatible for the ids read here.
    pub const MAX: u16 = 255;
}

/// Attributes nested inside one band of `Attr::WIPHY_BANDS`.
pub struct BandAttr;

impl BandAttr {
    pub const FREQS: u16 = 1;
    pub const RATES: u16 = 2;

    pub const MAX: u16 = 32;
}

/// Attributes nested inside one entry of `BandAttr::FREQS`.
pub struct FreqAttr;

impl FreqAttr {
    pub const FREQ: u16 = 1;
    pub const DISABLED: u16 = 2;

    pub const MAX: u16 = 32;
}

/// Attributes nested inside a per-band `Attr::TX_RATES` set.
pub struct TxRateAttr;

impl TxRateAttr {
    /// Legacy (non-HT) rate list, units of 0.5 Mbps.
    pub const LEGACY: u16 = 1;
}

/// Radio bands, used as nest types under `Attr::TX_RATES`.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Band2GHz = 0,
    Band5GHz = 1,
}

/// Interface operating modes (enum nl80211_iftype).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceMode {
    Unspecified = 0,
    Adhoc = 1,
    Station = 2,
    Ap = 3,
    ApVlan = 4,
    Wds = 5,
    Monitor = 6,
    MeshPoint = 7,
    P2pClient = 8,
    P2pGo = 9,
    P2pDevice = 10,
    Ocb = 11,
}

/// Transmit power configuration (enum nl80211_tx_power_setting plus the
/// level in mBm where one applies).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPower {
    /// Driver decides.
    Automatic,
    /// Cap at the given level, in mBm (100 * dBm).
    Limited(u32),
    /// Pin to the given level, in mBm.
    Fixed(u32),
}

impl TxPower {
    /// Wire value for `Attr::WIPHY_TX_POWER_SETTING`.
    pub fn setting(self) -> u32 {
        match self {
            TxPower::Automatic => 0,
            TxPower::Limited(_) => 1,
            TxPower::Fixed(_) => 2,
        }
    }

    /// Level attribute payload, absent for automatic.
    pub fn level(self) -> Option<u32> {
        match self {
            TxPower::Automatic => None,
            TxPower::Limited(mbm) | TxPower::Fixed(mbm) => Some(mbm),
        }
    }
}
