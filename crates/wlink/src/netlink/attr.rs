//! Netlink attribute (nlattr) codec: iteration, type indexing, typed reads.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::{Error, Result};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4; // nla_align(size_of::<NlAttr>())

/// Netlink attribute header (mirrors struct nlattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Create a new attribute header.
    pub fn new(attr_type: u16, data_len: usize) -> Self {
        Self {
            nla_len: (NLA_HDRLEN + data_len) as u16,
            nla_type: attr_type,
        }
    }

    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Get the payload length (total length minus header).
    pub fn payload_len(&self) -> usize {
        (self.nla_len as usize).saturating_sub(NLA_HDRLEN)
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

/// Iterator over a back-to-back, 4-byte-aligned attribute sequence.
///
/// Works on a top-level attribute region or on a nested attribute's
/// payload; iteration stops at the end of the slice and never reads past
/// it, even when the tail is not a whole attribute.
pub struct AttrIter<'a> {
    data: &'a [u8],
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Check if there are no more attributes.
    pub fn is_empty(&self) -> bool {
        self.data.len() < NLA_HDRLEN
    }
}

impl<'a> Iterator for AttrIter<'a> {
    /// Returns (attribute type, payload data).
    type Item = (u16, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < NLA_HDRLEN {
            return None;
        }

        let attr = match NlAttr::from_bytes(self.data) {
            Ok(a) => a,
            Err(_) => return None,
        };

        let len = attr.nla_len as usize;
        if len < NLA_HDRLEN || len > self.data.len() {
            return None;
        }

        let payload = &self.data[NLA_HDRLEN..len];
        let aligned_len = nla_align(len);

        // Move to next attribute
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some((attr.kind(), payload))
    }
}

/// Ephemeral index of one attribute region, keyed by attribute type.
///
/// Built in a single linear pass. Duplicate types keep the last
/// occurrence; types beyond `max` are dropped silently so unknown
/// attributes from newer kernels cannot write outside the table. The
/// table borrows the parsed buffer and is dropped before the buffer can
/// be overwritten by the next receive.
pub struct AttrTable<'a> {
    slots: Vec<Option<&'a [u8]>>,
}

impl<'a> AttrTable<'a> {
    /// Index `data` as an attribute sequence, keeping types `0..=max`.
    pub fn parse(data: &'a [u8], max: u16) -> Self {
        let mut slots = vec![None; max as usize + 1];
        for (attr_type, payload) in AttrIter::new(data) {
            if let Some(slot) = slots.get_mut(attr_type as usize) {
                *slot = Some(payload);
            }
        }
        Self { slots }
    }

    /// Get an attribute payload by type.
    pub fn get(&self, attr_type: u16) -> Option<&'a [u8]> {
        self.slots.get(attr_type as usize).copied().flatten()
    }

    /// Check whether the attribute is present (flag attributes carry an
    /// empty payload).
    pub fn contains(&self, attr_type: u16) -> bool {
        self.get(attr_type).is_some()
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True when no attribute was indexed.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }
}

/// Helper functions for extracting typed values from attribute payloads.
///
/// Unlike raw pointer casts, every reader validates the payload length
/// and reports a malformed attribute instead of reading out of bounds.
pub mod get {
    use super::*;

    /// Extract a u8 value.
    pub fn u8(data: &[u8]) -> Result<u8> {
        if data.is_empty() {
            return Err(Error::MalformedAttribute("empty u8 attribute".into()));
        }
        Ok(data[0])
    }

    /// Extract a u16 value (native endian).
    pub fn u16_ne(data: &[u8]) -> Result<u16> {
        if data.len() < 2 {
            return Err(Error::MalformedAttribute("truncated u16 attribute".into()));
        }
        Ok(u16::from_ne_bytes([data[0], data[1]]))
    }

    /// Extract a u32 value (native endian).
    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        if data.len() < 4 {
            return Err(Error::MalformedAttribute("truncated u32 attribute".into()));
        }
        Ok(u32::from_ne_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Extract a null-terminated string.
    pub fn string(data: &[u8]) -> Result<&str> {
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len])
            .map_err(|e| Error::MalformedAttribute(format!("invalid UTF-8: {}", e)))
    }

    /// Extract bytes (no interpretation).
    pub fn bytes(data: &[u8]) -> &[u8] {
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_attr(attr_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut buf = NlAttr::new(attr_type, payload.len()).as_bytes().to_vec();
        buf.extend_from_slice(payload);
        buf.resize(nla_align(buf.len()), 0);
        buf
    }

    #[test]
    fn test_table_indexes_by_type() {
        let mut data = encode_attr(1, &5u32.to_ne_bytes());
        data.extend(encode_attr(3, b"wlan0\0"));

        let table = AttrTable::parse(&data, 8);
        assert_eq!(table.len(), 2);
        assert_eq!(get::u32_ne(table.get(1).unwrap()).unwrap(), 5);
        assert_eq!(get::string(table.get(3).unwrap()).unwrap(), "wlan0");
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_table_last_occurrence_wins() {
        let mut data = encode_attr(4, &1u32.to_ne_bytes());
        data.extend(encode_attr(4, &2u32.to_ne_bytes()));

        let table = AttrTable::parse(&data, 8);
        assert_eq!(get::u32_ne(table.get(4).unwrap()).unwrap(), 2);
    }

    #[test]
    fn test_table_drops_types_beyond_max() {
        // An attribute type far past the table bound must be ignored, not
        // written out of bounds.
        let mut data = encode_attr(200, &9u32.to_ne_bytes());
        data.extend(encode_attr(2, &7u32.to_ne_bytes()));

        let table = AttrTable::parse(&data, 8);
        assert_eq!(table.len(), 1);
        assert!(table.get(2).is_some());
    }

    #[test]
    fn test_iter_empty_nest() {
        // A nested attribute of declared length 0 yields nothing.
        let mut iter = AttrIter::new(&[]);
        assert!(iter.is_empty());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_iter_stops_at_ragged_tail() {
        // Payload shorter than a minimum attribute after a valid one.
        let mut data = encode_attr(1, &[0xAA]);
        data.extend_from_slice(&[0x08, 0x00]); // 2 stray bytes, not a header

        let attrs: Vec<_> = AttrIter::new(&data).collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].0, 1);
    }

    #[test]
    fn test_iter_rejects_overlong_attr() {
        // Declared length runs past the buffer.
        let attr = NlAttr::new(1, 64);
        let mut data = attr.as_bytes().to_vec();
        data.extend_from_slice(&[0u8; 4]);

        assert!(AttrIter::new(&data).next().is_none());
    }

    #[test]
    fn test_iter_masks_nested_flag() {
        let data = encode_attr(6 | NLA_F_NESTED, &[]);
        let (kind, payload) = AttrIter::new(&data).next().unwrap();
        assert_eq!(kind, 6);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_get_validates_length() {
        assert!(get::u8(&[]).is_err());
        assert!(get::u16_ne(&[1]).is_err());
        assert!(get::u32_ne(&[1, 2, 3]).is_err());
        assert!(matches!(
            get::u32_ne(&[1, 2]),
            Err(Error::MalformedAttribute(_))
        ));
        assert_eq!(get::u16_ne(&[0x2B, 0x01]).unwrap(), 0x012B);
    }
}
