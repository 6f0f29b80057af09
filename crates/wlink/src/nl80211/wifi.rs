//! Wireless command helpers layered on the generic netlink session.
//!
//! Each operation assembles its attributes with the session's builder,
//! runs one exchange, and (where there is one) reads the answer out of
//! the response table. Nothing here touches the wire directly.

use tracing::debug;

use super::channel::{channel_to_frequency, frequency_to_channel};
use super::{
    Attr, Band, BandAttr, FreqAttr, InterfaceMode, NL80211_GENL_NAME, NL80211_VERSION, TxPower,
    TxRateAttr, WifiCmd,
};
use crate::netlink::attr::{AttrIter, AttrTable, get};
use crate::netlink::{Error, GenlSession, GenlSocket, Result, Transport};
use crate::util::ifname;

/// Per-band legacy bitrate lists are capped by the kernel at 32 entries.
const MAX_LEGACY_RATES: usize = 32;

/// A session with the nl80211 family.
///
/// Thin wrapper over [`GenlSession`]: one socket, one request at a time,
/// dropped to close. Operations that target an interface take its name
/// and resolve the index themselves.
pub struct WifiSession<T: Transport = GenlSocket> {
    genl: GenlSession<T>,
}

impl WifiSession<GenlSocket> {
    /// Open a socket and resolve the nl80211 family.
    pub async fn open() -> Result<Self> {
        Ok(Self {
            genl: GenlSession::open(NL80211_GENL_NAME).await?,
        })
    }
}

impl<T: Transport> WifiSession<T> {
    /// Build a session over an arbitrary transport (tests).
    pub async fn with_transport(transport: T) -> Result<Self> {
        Ok(Self {
            genl: GenlSession::with_transport(transport, NL80211_GENL_NAME).await?,
        })
    }

    /// The resolved nl80211 family id.
    pub fn family_id(&self) -> u16 {
        self.genl.family_id()
    }

    /// Current operating frequency of `iface` in MHz.
    pub async fn frequency(&mut self, iface: &str) -> Result<u32> {
        self.begin(WifiCmd::GetInterface);
        self.put_ifindex(iface)?;
        self.genl.exchange().await?;

        let table = self.genl.response_table(Attr::MAX)?;
        let mhz = match table.get(Attr::WIPHY_FREQ) {
            Some(payload) => get::u32_ne(payload)?,
            None => {
                return Err(Error::MissingAttribute {
                    attr: Attr::WIPHY_FREQ,
                });
            }
        };

        debug!(iface, mhz, "current frequency");
        Ok(mhz)
    }

    /// Tune `iface` to the given center frequency in MHz.
    pub async fn set_frequency(&mut self, iface: &str, mhz: u32) -> Result<()> {
        self.begin(WifiCmd::SetChannel);
        self.genl.builder().append_attr_u32(Attr::WIPHY_FREQ, mhz)?;
        self.put_ifindex(iface)?;

        debug!(iface, mhz, "set frequency");
        self.genl.exchange().await
    }

    /// Tune `iface` to a channel number.
    pub async fn set_channel(&mut self, iface: &str, channel: u8) -> Result<()> {
        let mhz = channel_to_frequency(channel)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown channel {}", channel)))?;
        self.set_frequency(iface, mhz).await
    }

    /// Request a regulatory domain change to the given ISO alpha-2 code.
    pub async fn set_regdomain(&mut self, domain: &str) -> Result<()> {
        let bytes = domain.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(Error::InvalidArgument(format!(
                "regulatory domain must be two letters, got {:?}",
                domain
            )));
        }

        let alpha2 = [bytes[0].to_ascii_uppercase(), bytes[1].to_ascii_uppercase()];

        self.begin(WifiCmd::ReqSetReg);
        self.genl.builder().append_attr(Attr::REG_ALPHA2, &alpha2)?;

        debug!(domain = %domain.to_ascii_uppercase(), "set regulatory domain");
        self.genl.exchange().await
    }

    /// Ask the kernel to reload the regulatory database.
    pub async fn reload_regdb(&mut self) -> Result<()> {
        self.begin(WifiCmd::ReloadRegdb);
        self.genl.exchange().await
    }

    /// Switch `iface` to the given operating mode.
    pub async fn set_mode(&mut self, iface: &str, mode: InterfaceMode) -> Result<()> {
        self.begin(WifiCmd::SetInterface);
        self.put_ifindex(iface)?;
        self.genl
            .builder()
            .append_attr_u32(Attr::IFTYPE, mode as u32)?;

        debug!(iface, ?mode, "set interface mode");
        self.genl.exchange().await
    }

    /// Configure transmit power for the radio behind `iface`.
    pub async fn set_tx_power(&mut self, iface: &str, power: TxPower) -> Result<()> {
        self.begin(WifiCmd::SetWiphy);
        self.put_ifindex(iface)?;
        self.genl
            .builder()
            .append_attr_u32(Attr::WIPHY_TX_POWER_SETTING, power.setting())?;
        if let Some(mbm) = power.level() {
            self.genl
                .builder()
                .append_attr_u32(Attr::WIPHY_TX_POWER_LEVEL, mbm)?;
        }

        debug!(iface, ?power, "set tx power");
        self.genl.exchange().await
    }

    /// Restrict the legacy transmit bitrate mask per band.
    ///
    /// Rates are in units of 0.5 Mbps, at most 32 per band; an empty
    /// slice leaves that band out of the request.
    pub async fn set_bitrate_mask(
        &mut self,
        iface: &str,
        rates_2ghz: &[u8],
        rates_5ghz: &[u8],
    ) -> Result<()> {
        if rates_2ghz.len() > MAX_LEGACY_RATES || rates_5ghz.len() > MAX_LEGACY_RATES {
            return Err(Error::InvalidArgument(format!(
                "at most {} legacy rates per band",
                MAX_LEGACY_RATES
            )));
        }

        self.begin(WifiCmd::SetTxBitrateMask);
        self.put_ifindex(iface)?;

        let rates = self.genl.builder().nest_start(Attr::TX_RATES)?;
        for (band, list) in [(Band::Band2GHz, rates_2ghz), (Band::Band5GHz, rates_5ghz)] {
            if list.is_empty() {
                continue;
            }
            let b = self.genl.builder().nest_start(band as u16)?;
            self.genl.builder().append_attr(TxRateAttr::LEGACY, list)?;
            self.genl.builder().nest_end(b);
        }
        self.genl.builder().nest_end(rates);

        debug!(
            iface,
            rates_2ghz = rates_2ghz.len(),
            rates_5ghz = rates_5ghz.len(),
            "set bitrate mask"
        );
        self.genl.exchange().await
    }

    /// Enumerate the usable channels of the radio behind `iface`.
    ///
    /// Walks the band tree of a wiphy dump: each band's frequency list is
    /// visited, entries that are disabled or carry no frequency are
    /// skipped, and the rest are converted to channel numbers. With
    /// `only_2ghz`, channels 15 and up are filtered out. At most `max`
    /// channels are returned; collecting none at all is an error, not an
    /// empty success.
    pub async fn supported_channels(
        &mut self,
        iface: &str,
        only_2ghz: bool,
        max: usize,
    ) -> Result<Vec<u8>> {
        if max == 0 {
            return Err(Error::InvalidArgument("zero channel capacity".into()));
        }

        self.begin(WifiCmd::GetWiphy);
        self.put_ifindex(iface)?;
        self.genl.exchange().await?;

        let table = self.genl.response_table(Attr::MAX)?;
        let bands = table.get(Attr::WIPHY_BANDS).ok_or(Error::MissingAttribute {
            attr: Attr::WIPHY_BANDS,
        })?;

        let mut channels = Vec::new();
        'bands: for (_band_index, band) in AttrIter::new(bands) {
            let band_table = AttrTable::parse(band, BandAttr::MAX);
            let Some(freqs) = band_table.get(BandAttr::FREQS) else {
                continue;
            };

            for (_entry_index, entry) in AttrIter::new(freqs) {
                let freq_table = AttrTable::parse(entry, FreqAttr::MAX);
                let Some(payload) = freq_table.get(FreqAttr::FREQ) else {
                    continue;
                };
                let mhz = get::u32_ne(payload)?;

                if freq_table.contains(FreqAttr::DISABLED) {
                    debug!(iface, mhz, "channel disabled");
                    continue;
                }

                let Some(channel) = frequency_to_channel(mhz) else {
                    continue;
                };

                if only_2ghz && channel >= 15 {
                    continue;
                }

                channels.push(channel);
                if channels.len() == max {
                    break 'bands;
                }
            }
        }

        if channels.is_empty() {
            return Err(Error::NoChannels);
        }

        debug!(iface, count = channels.len(), "supported channels");
        Ok(channels)
    }

    /// Start a request with the nl80211 command and interface version.
    fn begin(&mut self, cmd: WifiCmd) {
        self.genl.request(cmd as u8, NL80211_VERSION);
    }

    /// Resolve an interface name and append its index attribute.
    fn put_ifindex(&mut self, iface: &str) -> Result<()> {
        let index = ifname::name_to_index(iface)?;
        debug!(iface, index, "interface resolved");
        self.genl.builder().append_attr_u32(Attr::IFINDEX, index)
    }
}
