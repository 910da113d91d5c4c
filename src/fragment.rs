/* src/fragment.rs */

use std::io::{self, Write};
use std::time::Duration;

use rand::Rng;

use crate::Interval;

/// A buffer cut around the first occurrence of a server name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zones<'a> {
	/// Bytes ahead of the server name.
	pub before: &'a [u8],
	/// The server name bytes.
	pub server_name: &'a [u8],
	/// Bytes after the server name.
	pub after: &'a [u8],
}

impl Zones<'_> {
	/// Offset of the server name inside the original buffer.
	#[must_use]
	pub fn offset(&self) -> usize {
		self.before.len()
	}
}

/// Split `buf` at the first exact occurrence of `name`.
///
/// Returns `None` when `name` is empty or does not occur in `buf`.
///
/// ```
/// let z = tlsfrag::split_at_server_name(b"..example.com!", b"example.com").unwrap();
/// assert_eq!(z.offset(), 2);
/// assert_eq!(z.after, b"!");
/// ```
#[must_use]
pub fn split_at_server_name<'a>(buf: &'a [u8], name: &[u8]) -> Option<Zones<'a>> {
	if name.is_empty() || name.len() > buf.len() {
		return None;
	}
	let offset = buf.windows(name.len()).position(|w| w == name)?;
	let (before, rest) = buf.split_at(offset);
	let (server_name, after) = rest.split_at(name.len());
	Some(Zones {
		before,
		server_name,
		after,
	})
}

/// Writes zones to a sink as randomly sized fragments with a pause after
/// each one.
///
/// `written` counts every byte the sink accepted, across zones, so a failed
/// write can report how far it got.
pub(crate) struct ZoneWriter<'a, W: ?Sized, G: ?Sized, P> {
	sink: &'a mut W,
	rng: &'a mut G,
	delay_ms: Interval,
	pause: P,
	written: usize,
}

impl<'a, W, G, P> ZoneWriter<'a, W, G, P>
where
	W: Write + ?Sized,
	G: Rng + ?Sized,
	P: FnMut(Duration),
{
	pub(crate) fn new(sink: &'a mut W, rng: &'a mut G, delay_ms: Interval, pause: P) -> Self {
		Self {
			sink,
			rng,
			delay_ms,
			pause,
			written: 0,
		}
	}

	pub(crate) fn written(&self) -> usize {
		self.written
	}

	/// Send `data` as fragments sized from `sizes`.
	///
	/// Each fragment reaches the sink completely before the next size is
	/// drawn. The pause follows every fragment, the last one included.
	pub(crate) fn write_zone(
		&mut self,
		zone: &'static str,
		data: &[u8],
		sizes: Interval,
	) -> io::Result<()> {
		let mut pos = 0;
		let mut count = 0usize;
		while pos < data.len() {
			let drawn = usize::try_from(sizes.sample(&mut *self.rng)).unwrap_or(usize::MAX);
			let len = drawn.clamp(1, data.len() - pos);
			let delay = Duration::from_millis(self.delay_ms.sample(&mut *self.rng));
			count += 1;
			tracing::debug!(zone, fragment = count, pos, len, ?delay, "writing fragment");

			self.write_fragment(&data[pos..pos + len])?;
			pos += len;

			if !delay.is_zero() {
				(self.pause)(delay);
			}
		}
		tracing::debug!(zone, fragments = count, bytes = data.len(), "zone written");
		Ok(())
	}

	/// `write_all` that keeps `written` exact even when it fails.
	fn write_fragment(&mut self, mut frag: &[u8]) -> io::Result<()> {
		while !frag.is_empty() {
			match self.sink.write(frag) {
				Ok(0) => {
					return Err(io::Error::new(
						io::ErrorKind::WriteZero,
						"transport accepted no bytes",
					));
				}
				Ok(n) => {
					self.written += n;
					frag = &frag[n..];
				}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
				Err(e) => return Err(e),
			}
		}
		Ok(())
	}
}
