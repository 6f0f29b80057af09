//! Scripted transport and datagram builders for exchange-engine tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::{BufMut, BytesMut};

use super::{CtrlAttr, CtrlCmd, GENL_ID_CTRL, GenlMsgHdr};
use crate::netlink::attr::{NLA_F_NESTED, NlAttr, nla_align};
use crate::netlink::error::Result;
use crate::netlink::message::{NLM_F_ACK, NlMsgHdr, NlMsgType};
use crate::netlink::socket::Transport;

const SEQ_OFFSET: usize = 8;

#[derive(Debug)]
struct Reply {
    data: Vec<u8>,
    /// Patch the sequence number from the most recent request before
    /// delivery, simulating a peer that answers what it was asked.
    echo_seq: bool,
}

#[derive(Debug, Default)]
struct State {
    replies: VecDeque<Reply>,
    sent: Vec<Vec<u8>>,
    short_send: Option<usize>,
}

/// Transport double replaying queued datagrams and recording requests.
#[derive(Clone, Debug)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Queue a datagram delivered byte-for-byte.
    pub fn push_raw(&self, data: Vec<u8>) {
        self.state.lock().unwrap().replies.push_back(Reply {
            data,
            echo_seq: false,
        });
    }

    /// Queue a datagram whose sequence number is copied from the request
    /// preceding its delivery.
    pub fn push_echo(&self, data: Vec<u8>) {
        self.state.lock().unwrap().replies.push_back(Reply {
            data,
            echo_seq: true,
        });
    }

    /// Make the next send report `n` bytes written.
    pub fn short_send(&self, n: usize) {
        self.state.lock().unwrap().short_send = Some(n);
    }

    /// Datagrams sent so far.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().sent.clone()
    }

    /// Queued replies not yet consumed.
    pub fn replies_remaining(&self) -> usize {
        self.state.lock().unwrap().replies.len()
    }
}

impl Transport for MockTransport {
    fn port_id(&self) -> u32 {
        4242
    }

    async fn send(&self, msg: &[u8]) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        state.sent.push(msg.to_vec());
        Ok(state.short_send.take().unwrap_or(msg.len()))
    }

    async fn recv(&self, buf: &mut BytesMut) -> Result<usize> {
        let mut state = self.state.lock().unwrap();
        let reply = state
            .replies
            .pop_front()
            .expect("mock transport: no reply queued");

        let mut data = reply.data;
        if reply.echo_seq {
            let last = state.sent.last().expect("mock transport: nothing sent");
            data[SEQ_OFFSET..SEQ_OFFSET + 4].copy_from_slice(&last[SEQ_OFFSET..SEQ_OFFSET + 4]);
        }

        buf.put_slice(&data);
        Ok(data.len())
    }
}

/// Encode one attribute with padding.
pub fn attr(attr_type: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = NlAttr::new(attr_type, payload.len()).as_bytes().to_vec();
    buf.extend_from_slice(payload);
    buf.resize(nla_align(buf.len()), 0);
    buf
}

/// Encode a u16 attribute.
pub fn attr_u16(attr_type: u16, value: u16) -> Vec<u8> {
    attr(attr_type, &value.to_ne_bytes())
}

/// Encode a u32 attribute.
pub fn attr_u32(attr_type: u16, value: u32) -> Vec<u8> {
    attr(attr_type, &value.to_ne_bytes())
}

/// Encode a zero-length flag attribute.
pub fn attr_flag(attr_type: u16) -> Vec<u8> {
    attr(attr_type, &[])
}

/// Encode a nested attribute from pre-encoded children.
pub fn nest(attr_type: u16, children: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = children.iter().flatten().copied().collect();
    attr(attr_type | NLA_F_NESTED, &payload)
}

/// A full genl response datagram: nlmsghdr + genlmsghdr + attributes.
/// The sequence number is left at 0 for `push_echo` to patch.
pub fn genl_reply(family: u16, cmd: u8, attrs: &[u8]) -> Vec<u8> {
    let mut buf = NlMsgHdr::new(family, 0).as_bytes().to_vec();
    buf.extend_from_slice(GenlMsgHdr::new(cmd, 1).as_bytes());
    buf.extend_from_slice(attrs);

    let len = buf.len() as u32;
    buf[0..4].copy_from_slice(&len.to_ne_bytes());
    buf
}

/// An NLMSG_ERROR datagram; `errno` 0 is an ACK.
pub fn error_reply(errno: i32) -> Vec<u8> {
    let mut buf = NlMsgHdr::new(NlMsgType::ERROR, NLM_F_ACK).as_bytes().to_vec();
    buf.extend_from_slice(&errno.to_ne_bytes());
    // Echo of the offending request header; contents are irrelevant here.
    buf.extend_from_slice(NlMsgHdr::new(0, 0).as_bytes());

    let len = buf.len() as u32;
    buf[0..4].copy_from_slice(&len.to_ne_bytes());
    buf
}

/// Control-family answer resolving a lookup to `id`.
pub fn family_reply(id: u16) -> Vec<u8> {
    genl_reply(
        GENL_ID_CTRL,
        CtrlCmd::NewFamily as u8,
        &attr_u16(CtrlAttr::FamilyId as u16, id),
    )
}
