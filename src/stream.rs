/* src/stream.rs */

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, warn};

use crate::fragment::{ZoneWriter, split_at_server_name};
use crate::{FragmentationPolicy, PartialWrite, read_client_hello};

/// Connection controls a [`FragmentingStream`] forwards to its transport.
///
/// Reading and writing go through `Read`/`Write` on `&Self`, the way
/// [`TcpStream`] allows one thread to read while another writes.
pub trait Transport {
	/// Shut down both directions of the connection.
	///
	/// # Errors
	///
	/// Returns the transport's error, or [`io::ErrorKind::Unsupported`].
	fn close(&self) -> io::Result<()> {
		Err(io::ErrorKind::Unsupported.into())
	}

	/// Bound how long a read may block. `None` blocks forever.
	///
	/// # Errors
	///
	/// Returns the transport's error, or [`io::ErrorKind::Unsupported`].
	fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		let _ = timeout;
		Err(io::ErrorKind::Unsupported.into())
	}

	/// Bound how long a write may block. `None` blocks forever.
	///
	/// # Errors
	///
	/// Returns the transport's error, or [`io::ErrorKind::Unsupported`].
	fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		let _ = timeout;
		Err(io::ErrorKind::Unsupported.into())
	}
}

impl Transport for TcpStream {
	fn close(&self) -> io::Result<()> {
		self.shutdown(Shutdown::Both)
	}

	fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		Self::set_read_timeout(self, timeout)
	}

	fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		Self::set_write_timeout(self, timeout)
	}
}

#[cfg(unix)]
impl Transport for UnixStream {
	fn close(&self) -> io::Result<()> {
		self.shutdown(Shutdown::Both)
	}

	fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		Self::set_read_timeout(self, timeout)
	}

	fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		Self::set_write_timeout(self, timeout)
	}
}

/// Transport wrapper that fragments the first ClientHello written to it.
///
/// The first write is parsed as a TLS ClientHello. When that works and the
/// SNI hostname is found in the buffer, the buffer is sent in three zones
/// (before, inside and after the hostname), each chopped into fragments
/// sized by the [`FragmentationPolicy`], with a blocking pause after every
/// fragment. If the first write is anything else it is sent unmodified.
/// Every later write, and every read, goes straight to the transport.
///
/// Reads and writes hold separate locks, so a reader never waits on a
/// fragmented write. Writers are serialized, so fragments of two writes
/// never interleave.
///
/// The pauses ignore any cancellation; bound them with transport timeouts.
#[derive(Debug)]
pub struct FragmentingStream<S, R = StdRng> {
	inner: S,
	policy: FragmentationPolicy,
	started: AtomicBool,
	read_lock: Mutex<()>,
	/// Serializes writers and owns the random source.
	write_lock: Mutex<R>,
}

impl<S> FragmentingStream<S> {
	/// Wrap `inner`, drawing fragment sizes and pauses from an OS-seeded
	/// generator.
	#[must_use]
	pub fn new(inner: S, policy: FragmentationPolicy) -> Self {
		Self::with_rng(inner, policy, StdRng::from_os_rng())
	}
}

impl<S, R> FragmentingStream<S, R> {
	/// Wrap `inner` with a caller supplied random source.
	///
	/// A seeded generator makes fragment boundaries reproducible.
	#[must_use]
	pub fn with_rng(inner: S, policy: FragmentationPolicy, rng: R) -> Self {
		debug!(?policy, "creating fragmenting stream");
		Self {
			inner,
			policy,
			started: AtomicBool::new(false),
			read_lock: Mutex::new(()),
			write_lock: Mutex::new(rng),
		}
	}

	/// The policy fixed at construction.
	#[must_use]
	pub fn policy(&self) -> &FragmentationPolicy {
		&self.policy
	}

	/// Whether the first write has begun. Never blocks on a write in
	/// progress.
	#[must_use]
	pub fn is_started(&self) -> bool {
		self.started.load(Ordering::Acquire)
	}

	/// The wrapped transport.
	#[must_use]
	pub fn get_ref(&self) -> &S {
		&self.inner
	}

	/// Unwrap the transport.
	#[must_use]
	pub fn into_inner(self) -> S {
		self.inner
	}
}

impl<S: Transport, R> FragmentingStream<S, R> {
	/// Apply the same timeout to reads and writes.
	///
	/// # Errors
	///
	/// Returns the first error the transport reports.
	pub fn set_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		self.inner.set_read_timeout(timeout)?;
		self.inner.set_write_timeout(timeout)
	}
}

impl<S, R> FragmentingStream<S, R>
where
	for<'a> &'a S: Write,
	R: Rng,
{
	/// Write `buf`, fragmenting it if this is the first write.
	///
	/// Returns the number of bytes accepted. A fragmented write only
	/// returns after every fragment has been sent. Pass-through writes make
	/// a single call on the transport and may be short.
	///
	/// # Errors
	///
	/// Returns [`PartialWrite`] with the bytes already sent when the
	/// transport fails. Sent fragments are not retried.
	pub fn send(&self, buf: &[u8]) -> Result<usize, PartialWrite> {
		let mut rng = lock(&self.write_lock);
		let first = !self.started.swap(true, Ordering::AcqRel);
		debug!(len = buf.len(), first, "write");

		if !first {
			return forward::<S>(&self.inner, buf);
		}
		self.write_first(&mut rng, buf)
	}

	fn write_first(&self, rng: &mut R, buf: &[u8]) -> Result<usize, PartialWrite> {
		let hello = match read_client_hello(&mut &buf[..]) {
			Ok(hello) => hello,
			Err(e) => {
				warn!(error = %e, "first write is not a ClientHello, sending it unmodified");
				return forward::<S>(&self.inner, buf);
			}
		};
		let Some(zones) = hello
			.sni
			.as_deref()
			.and_then(|name| split_at_server_name(buf, name))
		else {
			warn!(
				server_name = ?hello.server_name(),
				"server name missing from first write, sending it unmodified"
			);
			return forward::<S>(&self.inner, buf);
		};
		debug!(
			server_name = ?hello.server_name(),
			offset = zones.offset(),
			before = zones.before.len(),
			after = zones.after.len(),
			"splitting ClientHello around server name"
		);

		let mut sink = &self.inner;
		let mut writer = ZoneWriter::new(&mut sink, rng, self.policy.delay_ms(), thread::sleep);
		for (zone, data, sizes) in [
			("before_sni", zones.before, self.policy.before_sni()),
			("sni", zones.server_name, self.policy.sni()),
			("after_sni", zones.after, self.policy.after_sni()),
		] {
			if let Err(source) = writer.write_zone(zone, data, sizes) {
				let written = writer.written();
				error!(zone, written, error = %source, "fragment write failed");
				return Err(PartialWrite { written, source });
			}
		}
		Ok(writer.written())
	}
}

fn forward<S>(inner: &S, buf: &[u8]) -> Result<usize, PartialWrite>
where
	for<'a> &'a S: Write,
{
	let mut sink = inner;
	sink.write(buf).map_err(|source| {
		error!(error = %source, "transport write failed");
		PartialWrite { written: 0, source }
	})
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
	m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<S, R> Read for &FragmentingStream<S, R>
where
	for<'a> &'a S: Read,
{
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let _guard = lock(&self.read_lock);
		let mut inner = &self.inner;
		inner.read(buf)
	}
}

impl<S, R> Write for &FragmentingStream<S, R>
where
	for<'a> &'a S: Write,
	R: Rng,
{
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.send(buf).map_err(PartialWrite::into_source)
	}

	fn flush(&mut self) -> io::Result<()> {
		let _guard = lock(&self.write_lock);
		let mut inner = &self.inner;
		inner.flush()
	}
}

impl<S, R> Read for FragmentingStream<S, R>
where
	for<'a> &'a S: Read,
{
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		Read::read(&mut &*self, buf)
	}
}

impl<S, R> Write for FragmentingStream<S, R>
where
	for<'a> &'a S: Write,
	R: Rng,
{
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		Write::write(&mut &*self, buf)
	}

	fn flush(&mut self) -> io::Result<()> {
		Write::flush(&mut &*self)
	}
}

impl<S: Transport, R> Transport for FragmentingStream<S, R> {
	fn close(&self) -> io::Result<()> {
		self.inner.close()
	}

	fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		self.inner.set_read_timeout(timeout)
	}

	fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
		self.inner.set_write_timeout(timeout)
	}
}
