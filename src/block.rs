/* src/block.rs */

use std::io::{self, Read};

/// Capacity of a block's first allocation.
const BASE_CAPACITY: usize = 1024;

/// Growable byte buffer with a read cursor.
///
/// `buf` is always fully initialised up to its capacity so that reads from a
/// source can land in the spare tail without `unsafe`. `len` is the logical
/// length and `off` the read position, with `off <= len <= buf.len()`.
#[derive(Debug, Default)]
pub(crate) struct ByteBlock {
	buf: Vec<u8>,
	len: usize,
	off: usize,
}

impl ByteBlock {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn len(&self) -> usize {
		self.len
	}

	pub(crate) fn capacity(&self) -> usize {
		self.buf.len()
	}

	/// Bytes between the start of the block and its logical length.
	pub(crate) fn as_slice(&self) -> &[u8] {
		&self.buf[..self.len]
	}

	/// Bytes between the read offset and the logical length.
	pub(crate) fn unread(&self) -> &[u8] {
		&self.buf[self.off..self.len]
	}

	pub(crate) fn set_offset(&mut self, off: usize) {
		self.off = off.min(self.len);
	}

	/// Set the logical length to `n`, growing capacity when needed.
	pub(crate) fn resize(&mut self, n: usize) {
		self.reserve(n);
		self.len = n;
		self.off = self.off.min(n);
	}

	/// Make sure capacity is at least `n`, doubling from [`BASE_CAPACITY`].
	fn reserve(&mut self, n: usize) {
		if self.capacity() >= n {
			return;
		}
		let mut cap = match self.capacity() {
			0 => BASE_CAPACITY,
			cap => cap,
		};
		while cap < n {
			cap *= 2;
		}
		self.buf.resize(cap, 0);
	}

	/// Read from `source` until the block holds at least `n` bytes.
	///
	/// Bytes past `n` that arrive in the same read are kept. End of input
	/// before `n` bytes is reported as [`io::ErrorKind::UnexpectedEof`];
	/// other source errors are returned as-is.
	pub(crate) fn append_from_until<R: Read + ?Sized>(
		&mut self,
		source: &mut R,
		n: usize,
	) -> io::Result<()> {
		if self.len >= n {
			return Ok(());
		}
		self.reserve(n);
		loop {
			match source.read(&mut self.buf[self.len..]) {
				Ok(0) => {
					return Err(io::Error::new(
						io::ErrorKind::UnexpectedEof,
						"source ended before the record was complete",
					));
				}
				Ok(m) => {
					self.len += m;
					if self.len >= n {
						return Ok(());
					}
				}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
				Err(e) => return Err(e),
			}
		}
	}

	/// Keep the first `n` bytes and return the rest as a new block.
	pub(crate) fn split_off(&mut self, n: usize) -> Option<Self> {
		if self.len <= n {
			return None;
		}
		let mut rest = Self::new();
		rest.resize(self.len - n);
		rest.buf[..self.len - n].copy_from_slice(&self.buf[n..self.len]);
		self.len = n;
		self.off = self.off.min(n);
		Some(rest)
	}
}

impl Read for ByteBlock {
	fn read(&mut self, dest: &mut [u8]) -> io::Result<usize> {
		let src = self.unread();
		let n = src.len().min(dest.len());
		dest[..n].copy_from_slice(&src[..n]);
		self.off += n;
		Ok(n)
	}
}
