//! Generic netlink socket transport.

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;
use tracing::{debug, trace};

use super::error::Result;

/// Fixed size of the per-session message buffers (NLMSG_GOODSIZE). The
/// kernel socket buffers are configured to match, and no message may
/// exceed it in either direction.
pub const MSG_BUF_SIZE: usize = 8192;

/// Datagram transport the exchange engine runs on.
///
/// The one production implementation is [`GenlSocket`]; tests substitute
/// a scripted peer. `send` returns the byte count actually written so the
/// caller can detect short writes; `recv` reads at most one datagram and
/// returns 0 on peer close.
pub trait Transport {
    /// Local port id this transport is bound to.
    fn port_id(&self) -> u32;

    /// Send one datagram to the kernel.
    fn send(&self, msg: &[u8]) -> impl Future<Output = Result<usize>>;

    /// Receive one datagram into `buf`, returning its length.
    fn recv(&self, buf: &mut BytesMut) -> impl Future<Output = Result<usize>>;
}

/// Non-blocking NETLINK_GENERIC socket.
///
/// The socket is bound with port 0 and the kernel-assigned id is read
/// back: the first netlink socket of a process gets the process id, and
/// further sessions get distinct ids so independent sessions can run
/// concurrently. Rather than busy-polling the non-blocking fd the way
/// the classic C implementations do, "nothing queued yet" suspends on
/// [`AsyncFd`] readiness and is never confused with an I/O failure.
pub struct GenlSocket {
    fd: AsyncFd<Socket>,
    port: u32,
}

impl GenlSocket {
    /// Open a generic netlink socket sized for [`MSG_BUF_SIZE`] messages.
    pub fn open() -> Result<Self> {
        let mut socket = Socket::new(protocols::NETLINK_GENERIC)?;
        socket.set_non_blocking(true)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let port = addr.port_number();

        // Kernel buffers match the fixed message buffers.
        set_buffer_sizes(socket.as_raw_fd(), MSG_BUF_SIZE as i32)?;

        let fd = AsyncFd::new(socket)?;
        debug!(port, "generic netlink socket open");

        Ok(Self { fd, port })
    }
}

impl Transport for GenlSocket {
    fn port_id(&self) -> u32 {
        self.port
    }

    async fn send(&self, msg: &[u8]) -> Result<usize> {
        loop {
            let mut guard = self.fd.ready(Interest::WRITABLE).await?;

            match guard.try_io(|inner| inner.get_ref().send(msg, 0)) {
                Ok(result) => {
                    let n = result?;
                    trace!(bytes = n, "datagram sent");
                    return Ok(n);
                }
                Err(_would_block) => continue,
            }
        }
    }

    async fn recv(&self, buf: &mut BytesMut) -> Result<usize> {
        loop {
            let mut guard = self.fd.ready(Interest::READABLE).await?;

            match guard.try_io(|inner| inner.get_ref().recv(buf, 0)) {
                Ok(result) => {
                    let n = result?;
                    trace!(bytes = n, "datagram received");
                    return Ok(n);
                }
                Err(_would_block) => continue,
            }
        }
    }
}

impl AsRawFd for GenlSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.get_ref().as_raw_fd()
    }
}

/// Set SO_SNDBUF and SO_RCVBUF to the fixed message buffer size.
fn set_buffer_sizes(fd: RawFd, bytes: i32) -> io::Result<()> {
    for opt in [libc::SO_SNDBUF, libc::SO_RCVBUF] {
        // SAFETY: fd is a valid open socket and the option value is a
        // plain int of the advertised length.
        let rc = unsafe {
            libc::setsockopt(
                fd,
                libc::SOL_SOCKET,
                opt,
                &bytes as *const i32 as *const libc::c_void,
                std::mem::size_of::<i32>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}
