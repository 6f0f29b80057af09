//! IEEE 802.11 channel number / center frequency conversion.
//!
//! 2.4 GHz channels 1-13 sit 5 MHz apart from 2412 MHz, with channel 14
//! off the grid at 2484 MHz (Japan). 5 GHz channels follow
//! `5000 + 5 * channel`.

/// Convert a channel number to its center frequency in MHz.
///
/// Returns `None` for channel numbers outside the 2.4 and 5 GHz plans.
pub fn channel_to_frequency(channel: u8) -> Option<u32> {
    match channel {
        1..=13 => Some(2407 + 5 * channel as u32),
        14 => Some(2484),
        32..=177 => Some(5000 + 5 * channel as u32),
        _ => None,
    }
}

/// Convert a center frequency in MHz to its channel number.
///
/// Returns `None` for frequencies off both band plans.
pub fn frequency_to_channel(mhz: u32) -> Option<u8> {
    match mhz {
        2412..=2472 if (mhz - 2407) % 5 == 0 => Some(((mhz - 2407) / 5) as u8),
        2484 => Some(14),
        5160..=5885 if mhz % 5 == 0 => Some(((mhz - 5000) / 5) as u8),
        _ => None,
    }
}
