//! Request builder writing into a fixed-capacity, reusable buffer.

use super::attr::{NLA_F_NESTED, NLA_HDRLEN, NlAttr, nla_align};
use super::error::{Error, Result};
use super::message::{NLM_F_ACK, NLM_F_REQUEST, NLMSG_HDRLEN, NlMsgHdr};
use crate::netlink::genl::header::GenlMsgHdr;

/// Token returned when starting a nested attribute.
/// Used to back-patch the nested attribute length at close time.
#[derive(Debug, Clone, Copy)]
#[must_use = "a nest left open produces a zero-length attribute"]
pub struct NestToken {
    /// Offset of the nested attribute header in the buffer.
    offset: usize,
}

/// Builder for generic netlink requests.
///
/// One builder is owned per session and reused for every request: a
/// message never heap-allocates, and exceeding the fixed capacity is a
/// [`Error::MessageTooLarge`] failure rather than a reallocation. The
/// declared length in the message header is kept current as attributes
/// are appended, so the serialized bytes are valid at any point.
#[derive(Debug)]
pub struct MessageBuilder {
    buf: Vec<u8>,
    capacity: usize,
}

impl MessageBuilder {
    /// Create a builder with a fixed capacity in bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Start a fresh request, discarding any previous content.
    ///
    /// Writes the netlink header (type = `family`, flags
    /// `NLM_F_REQUEST | NLM_F_ACK`, sequence 0) followed by the 4-byte
    /// generic netlink sub-header. The sequence number is assigned by the
    /// exchange engine immediately before transmission, not here.
    ///
    /// Must not be called while a nested attribute is open.
    pub fn start_request(&mut self, family: u16, cmd: u8, version: u8, pid: u32) {
        self.buf.clear();

        let mut header = NlMsgHdr::new(family, NLM_F_REQUEST | NLM_F_ACK);
        header.nlmsg_pid = pid;
        self.buf.extend_from_slice(header.as_bytes());

        let genl = GenlMsgHdr::new(cmd, version);
        self.buf.extend_from_slice(genl.as_bytes());

        self.patch_len();
    }

    /// Get the current message length.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if the message carries no attributes yet.
    pub fn is_empty(&self) -> bool {
        self.buf.len() <= NLMSG_HDRLEN + GenlMsgHdr::LEN
    }

    /// Append an attribute with the given type and payload.
    pub fn append_attr(&mut self, attr_type: u16, data: &[u8]) -> Result<()> {
        let needed = self.buf.len() + nla_align(NLA_HDRLEN + data.len());
        if needed > self.capacity {
            return Err(Error::MessageTooLarge {
                needed,
                capacity: self.capacity,
            });
        }

        let attr = NlAttr::new(attr_type, data.len());
        self.buf.extend_from_slice(attr.as_bytes());
        self.buf.extend_from_slice(data);
        self.pad();
        self.patch_len();
        Ok(())
    }

    /// Append a u8 attribute.
    pub fn append_attr_u8(&mut self, attr_type: u16, value: u8) -> Result<()> {
        self.append_attr(attr_type, &[value])
    }

    /// Append a u16 attribute (native endian).
    pub fn append_attr_u16(&mut self, attr_type: u16, value: u16) -> Result<()> {
        self.append_attr(attr_type, &value.to_ne_bytes())
    }

    /// Append a u32 attribute (native endian).
    pub fn append_attr_u32(&mut self, attr_type: u16, value: u32) -> Result<()> {
        self.append_attr(attr_type, &value.to_ne_bytes())
    }

    /// Append a null-terminated string attribute.
    pub fn append_attr_str(&mut self, attr_type: u16, value: &str) -> Result<()> {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        self.append_attr(attr_type, &data)
    }

    /// Start a nested attribute. Returns a token to finalize it.
    ///
    /// Children are appended through the normal `append_attr*` calls;
    /// [`nest_end`](Self::nest_end) back-patches the nested length to
    /// cover everything written in between. Exactly one `nest_end` per
    /// `nest_start`.
    pub fn nest_start(&mut self, attr_type: u16) -> Result<NestToken> {
        let offset = self.buf.len();
        if offset + NLA_HDRLEN > self.capacity {
            return Err(Error::MessageTooLarge {
                needed: offset + NLA_HDRLEN,
                capacity: self.capacity,
            });
        }

        let attr = NlAttr::new(attr_type | NLA_F_NESTED, 0);
        self.buf.extend_from_slice(attr.as_bytes());
        self.patch_len();
        Ok(NestToken { offset })
    }

    /// End a nested attribute started with `nest_start`.
    pub fn nest_end(&mut self, token: NestToken) {
        let len = (self.buf.len() - token.offset) as u16;
        self.buf[token.offset..token.offset + 2].copy_from_slice(&len.to_ne_bytes());
    }

    /// Stamp the sequence number into the header.
    pub fn set_seq(&mut self, seq: u32) {
        self.buf[8..12].copy_from_slice(&seq.to_ne_bytes());
    }

    /// The serialized message.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn pad(&mut self) {
        let aligned = nla_align(self.buf.len());
        self.buf.resize(aligned, 0);
    }

    fn patch_len(&mut self) {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_ne_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::{AttrIter, nla_align};
    use crate::netlink::message::NlMsgHdr;

    const REQ_HDRLEN: usize = NLMSG_HDRLEN + GenlMsgHdr::LEN;

    fn builder() -> MessageBuilder {
        let mut b = MessageBuilder::with_capacity(8192);
        b.start_request(0x1C, 1, 1, 42);
        b
    }

    fn attr_region(b: &MessageBuilder) -> &[u8] {
        &b.as_bytes()[REQ_HDRLEN..]
    }

    #[test]
    fn test_start_request_header() {
        let b = builder();
        let msg = b.as_bytes();
        assert_eq!(msg.len(), REQ_HDRLEN);

        let header = NlMsgHdr::from_bytes(msg).unwrap();
        assert_eq!(header.nlmsg_len as usize, REQ_HDRLEN);
        assert_eq!(header.nlmsg_type, 0x1C);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST | NLM_F_ACK);
        assert_eq!(header.nlmsg_seq, 0);
        assert_eq!(header.nlmsg_pid, 42);

        let genl = GenlMsgHdr::from_bytes(&msg[NLMSG_HDRLEN..]).unwrap();
        assert_eq!(genl.cmd, 1);
        assert_eq!(genl.version, 1);
        assert_eq!(genl.reserved, 0);
    }

    #[test]
    fn test_attr_roundtrip_all_lengths() {
        // Every payload length 0..32 must decode back byte-identical and
        // serialize to a multiple of 4.
        for len in 0..32usize {
            let payload: Vec<u8> = (0..len as u8).collect();
            let mut b = builder();
            b.append_attr(7, &payload).unwrap();

            let total = b.len() - REQ_HDRLEN;
            assert_eq!(total % 4, 0, "len {} not aligned", len);
            assert_eq!(total, nla_align(NLA_HDRLEN + len));

            let decoded: Vec<_> = AttrIter::new(attr_region(&b)).collect();
            assert_eq!(decoded.len(), 1);
            assert_eq!(decoded[0].0, 7);
            assert_eq!(decoded[0].1, &payload[..]);
        }
    }

    #[test]
    fn test_declared_length_tracks_appends() {
        let mut b = builder();
        b.append_attr_u32(3, 9).unwrap();
        b.append_attr_str(4, "wlan0").unwrap();

        let header = NlMsgHdr::from_bytes(b.as_bytes()).unwrap();
        assert_eq!(header.nlmsg_len as usize, b.len());
    }

    #[test]
    fn test_nested_backpatch() {
        let mut b = builder();
        let outer = b.nest_start(90).unwrap();
        let inner = b.nest_start(0).unwrap();
        b.append_attr(1, &[2, 4, 11]).unwrap();
        b.nest_end(inner);
        b.nest_end(outer);

        let (kind, payload) = AttrIter::new(attr_region(&b)).next().unwrap();
        assert_eq!(kind, 90);

        let (inner_kind, inner_payload) = AttrIter::new(payload).next().unwrap();
        assert_eq!(inner_kind, 0);

        let (rate_kind, rates) = AttrIter::new(inner_payload).next().unwrap();
        assert_eq!(rate_kind, 1);
        assert_eq!(rates, &[2, 4, 11]);
    }

    #[test]
    fn test_reuse_clears_previous_request() {
        let mut b = builder();
        b.append_attr_u32(3, 1).unwrap();
        let first_len = b.len();

        b.start_request(0x1C, 2, 1, 42);
        assert!(b.is_empty());
        assert!(b.len() < first_len);
        assert_eq!(
            NlMsgHdr::from_bytes(b.as_bytes()).unwrap().nlmsg_len as usize,
            REQ_HDRLEN
        );
    }

    #[test]
    fn test_capacity_overflow() {
        let mut b = MessageBuilder::with_capacity(64);
        b.start_request(0x1C, 1, 1, 0);
        b.append_attr(1, &[0u8; 32]).unwrap();
        let err = b.append_attr(2, &[0u8; 32]).unwrap_err();
        assert!(matches!(err, Error::MessageTooLarge { .. }));
    }

    #[test]
    fn test_set_seq() {
        let mut b = builder();
        b.set_seq(0xABCD);
        assert_eq!(NlMsgHdr::from_bytes(b.as_bytes()).unwrap().nlmsg_seq, 0xABCD);
    }
}
