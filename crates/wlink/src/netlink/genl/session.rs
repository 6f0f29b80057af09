//! Generic netlink session: family resolution and the request/response
//! exchange engine.

use bytes::BytesMut;
use tracing::{debug, trace};

use super::{CtrlAttr, CtrlCmd, GENL_CTRL_VERSION, GENL_ID_CTRL, GenlMsgHdr};
use crate::netlink::attr::{AttrTable, get};
use crate::netlink::builder::MessageBuilder;
use crate::netlink::error::{Error, Result};
use crate::netlink::message::{MessageIter, NlMsgError, NlMsgHdr};
use crate::netlink::socket::{GenlSocket, MSG_BUF_SIZE, Transport};

/// One synchronous conversation with a generic netlink family.
///
/// A session bundles the transport, a reusable fixed-capacity transmit
/// builder, a fixed-capacity receive buffer, the sequence counter, and
/// the resolved family id. All operations take `&mut self`: building a
/// new request overwrites the shared transmit buffer, so the borrow
/// checker rules out two in-flight exchanges on one session. Independent
/// sessions (separate sockets and port ids) do not interfere.
///
/// Dropping the session closes the socket; there is no other way to
/// abandon an exchange once issued.
#[derive(Debug)]
pub struct GenlSession<T: Transport = GenlSocket> {
    transport: T,
    tx: MessageBuilder,
    rx: BytesMut,
    seq: u32,
    family_id: u16,
}

impl GenlSession<GenlSocket> {
    /// Open a socket and resolve `family` to its numeric id.
    ///
    /// Fails without leaking resources if the socket cannot be set up or
    /// the family is unknown; no partially initialized session escapes.
    pub async fn open(family: &str) -> Result<Self> {
        let socket = GenlSocket::open()?;
        Self::with_transport(socket, family).await
    }
}

impl<T: Transport> GenlSession<T> {
    /// Build a session over an arbitrary transport and resolve `family`.
    pub async fn with_transport(transport: T, family: &str) -> Result<Self> {
        let mut session = Self {
            transport,
            tx: MessageBuilder::with_capacity(MSG_BUF_SIZE),
            rx: BytesMut::with_capacity(MSG_BUF_SIZE),
            seq: 0,
            family_id: GENL_ID_CTRL,
        };
        session.resolve_family(family).await?;
        Ok(session)
    }

    /// The resolved numeric family id.
    pub fn family_id(&self) -> u16 {
        self.family_id
    }

    /// The local port id of the underlying transport.
    pub fn port_id(&self) -> u32 {
        self.transport.port_id()
    }

    /// Start a request to the resolved family, returning the builder so
    /// the caller can append attributes.
    pub fn request(&mut self, cmd: u8, version: u8) -> &mut MessageBuilder {
        self.tx
            .start_request(self.family_id, cmd, version, self.transport.port_id());
        &mut self.tx
    }

    /// The in-progress request builder.
    pub fn builder(&mut self) -> &mut MessageBuilder {
        &mut self.tx
    }

    /// Run one request/response exchange.
    ///
    /// Assigns the next sequence number at send time, so issued numbers
    /// equal the count of exchanges attempted. Datagrams whose sequence
    /// number does not match are discarded (a previous exchange's
    /// trailing ACK, unrelated notifications) until the matching one
    /// arrives. On success the receive buffer holds the matched
    /// response; a matching NLMSG_ERROR with a nonzero code becomes
    /// [`Error::Kernel`], local I/O failure stays [`Error::Io`].
    pub async fn exchange(&mut self) -> Result<()> {
        self.seq += 1;
        self.tx.set_seq(self.seq);
        let seq = self.seq;

        let expected = self.tx.len();
        let sent = self.transport.send(self.tx.as_bytes()).await?;
        if sent != expected {
            return Err(Error::ShortSend { expected, sent });
        }
        debug!(seq, bytes = sent, "request sent");

        loop {
            self.rx.clear();
            let n = self.transport.recv(&mut self.rx).await?;
            if n == 0 {
                return Err(Error::Disconnected);
            }

            let (header, payload) = match MessageIter::new(&self.rx).next() {
                Some(result) => result?,
                None => {
                    return Err(Error::Truncated {
                        expected: std::mem::size_of::<NlMsgHdr>(),
                        actual: n,
                    });
                }
            };

            if header.nlmsg_seq != seq {
                trace!(
                    got = header.nlmsg_seq,
                    want = seq,
                    "discarding unrelated datagram"
                );
                continue;
            }

            if header.is_error() {
                let err = NlMsgError::from_bytes(payload)?;
                if !err.is_ack() {
                    debug!(seq, errno = -err.error, "kernel rejected request");
                    return Err(Error::from_errno(err.error));
                }
            }

            debug!(seq, bytes = n, "response matched");
            return Ok(());
        }
    }

    /// Index the attribute region of the matched response.
    ///
    /// The table borrows the receive buffer, so it must be dropped (and
    /// every needed value extracted) before the next request is issued.
    pub fn response_table(&self, max: u16) -> Result<AttrTable<'_>> {
        let (header, payload) = match MessageIter::new(&self.rx).next() {
            Some(result) => result?,
            None => return Err(Error::InvalidMessage("empty response buffer".into())),
        };

        if header.is_error() {
            return Err(Error::InvalidMessage(
                "response carries no attributes".into(),
            ));
        }

        if payload.len() < GenlMsgHdr::LEN {
            return Err(Error::Truncated {
                expected: GenlMsgHdr::LEN,
                actual: payload.len(),
            });
        }

        Ok(AttrTable::parse(&payload[GenlMsgHdr::LEN..], max))
    }

    /// Bootstrap exchange: translate the family name via the control
    /// family and store the numeric id.
    async fn resolve_family(&mut self, family: &str) -> Result<()> {
        let pid = self.transport.port_id();
        self.tx
            .start_request(GENL_ID_CTRL, CtrlCmd::GetFamily as u8, GENL_CTRL_VERSION, pid);
        self.tx
            .append_attr_str(CtrlAttr::FamilyName as u16, family)?;

        match self.exchange().await {
            Ok(()) => {}
            // ENOENT from the control family means the name is unknown.
            Err(Error::Kernel { errno, .. }) if errno == libc::ENOENT => {
                return Err(Error::FamilyNotFound {
                    name: family.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        let table = self.response_table(CtrlAttr::MAX)?;
        let id = match table.get(CtrlAttr::FamilyId as u16) {
            Some(payload) => get::u16_ne(payload)?,
            None => {
                return Err(Error::FamilyNotFound {
                    name: family.to_string(),
                });
            }
        };

        debug!(family, id, "family resolved");
        self.family_id = id;
        Ok(())
    }
}
