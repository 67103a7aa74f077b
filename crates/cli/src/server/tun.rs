use async_trait::async_trait;
use dnstrap_application::ports::VirtualInterfacePort;
use dnstrap_domain::DomainError;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use tokio::io::unix::AsyncFd;
use tracing::info;

const TUN_DEVICE: &str = "/dev/net/tun";
const TUNSETIFF: libc::c_ulong = 0x4004_54ca;

#[repr(C)]
struct IfReq {
    name: [libc::c_char; libc::IFNAMSIZ],
    flags: libc::c_short,
    _pad: [u8; 22],
}

/// Layer-3 TUN device without packet info: every read is one raw IPv4 or
/// IPv6 frame. Address assignment and link state are left to the host.
pub struct TunInterface {
    fd: AsyncFd<File>,
    name: String,
    mtu: usize,
}

impl TunInterface {
    pub fn open(name: &str, mtu: usize) -> io::Result<Self> {
        if name.is_empty() || name.len() >= libc::IFNAMSIZ {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("interface name {:?} must be 1..{} bytes", name, libc::IFNAMSIZ),
            ));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NONBLOCK | libc::O_CLOEXEC)
            .open(TUN_DEVICE)?;

        let mut req = IfReq {
            name: [0; libc::IFNAMSIZ],
            flags: (libc::IFF_TUN | libc::IFF_NO_PI) as libc::c_short,
            _pad: [0; 22],
        };
        for (dst, src) in req.name.iter_mut().zip(name.bytes()) {
            *dst = src as libc::c_char;
        }

        // SAFETY: `req` is a properly sized ifreq and the fd is open.
        let rc = unsafe { libc::ioctl(file.as_raw_fd(), TUNSETIFF as _, &mut req) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        info!(interface = name, mtu, "TUN interface attached");
        Ok(Self {
            fd: AsyncFd::new(file)?,
            name: name.to_string(),
            mtu,
        })
    }
}

fn io_error(name: &str, e: io::Error) -> DomainError {
    DomainError::IoError(format!("{}: {}", name, e))
}

#[async_trait]
impl VirtualInterfacePort for TunInterface {
    async fn read_frame(&self) -> Result<Option<Vec<u8>>, DomainError> {
        let mut buf = vec![0u8; self.mtu];
        loop {
            let mut guard = self
                .fd
                .readable()
                .await
                .map_err(|e| io_error(&self.name, e))?;

            match guard.try_io(|inner| {
                let mut file = inner.get_ref();
                file.read(&mut buf)
            }) {
                Ok(Ok(0)) => return Ok(None),
                Ok(Ok(n)) => {
                    buf.truncate(n);
                    return Ok(Some(buf));
                }
                Ok(Err(e)) if e.raw_os_error() == Some(libc::EBADFD) => return Ok(None),
                Ok(Err(e)) => return Err(io_error(&self.name, e)),
                Err(_would_block) => continue,
            }
        }
    }

    async fn write_frame(&self, frame: &[u8]) -> Result<(), DomainError> {
        loop {
            let mut guard = self
                .fd
                .writable()
                .await
                .map_err(|e| io_error(&self.name, e))?;

            match guard.try_io(|inner| {
                let mut file = inner.get_ref();
                file.write(frame)
            }) {
                Ok(Ok(_)) => return Ok(()),
                Ok(Err(e)) => return Err(io_error(&self.name, e)),
                Err(_would_block) => continue,
            }
        }
    }
}
