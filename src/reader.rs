/* src/reader.rs */

use crate::Error;

/// Bounds-checked cursor over a borrowed message.
///
/// Each read names the field it decodes so a short buffer reports which
/// part of the message was cut off.
pub(crate) struct Reader<'a> {
	data: &'a [u8],
	pos: usize,
}

impl<'a> Reader<'a> {
	pub(crate) fn new(data: &'a [u8]) -> Self {
		Self { data, pos: 0 }
	}

	pub(crate) fn remaining(&self) -> usize {
		self.data.len() - self.pos
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.remaining() == 0
	}

	pub(crate) fn read_u8(&mut self, field: &'static str) -> Result<u8, Error> {
		let [val] = self.read_array(field)?;
		Ok(val)
	}

	pub(crate) fn read_u16(&mut self, field: &'static str) -> Result<u16, Error> {
		Ok(u16::from_be_bytes(self.read_array(field)?))
	}

	pub(crate) fn read_u24(&mut self, field: &'static str) -> Result<u32, Error> {
		let [a, b, c] = self.read_array(field)?;
		Ok(u32::from_be_bytes([0, a, b, c]))
	}

	pub(crate) fn read_array<const N: usize>(
		&mut self,
		field: &'static str,
	) -> Result<[u8; N], Error> {
		let bytes = self.read_bytes(N, field)?;
		let mut out = [0u8; N];
		out.copy_from_slice(bytes);
		Ok(out)
	}

	pub(crate) fn read_bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], Error> {
		if self.remaining() < n {
			return Err(Error::Truncated { field });
		}
		let slice = &self.data[self.pos..self.pos + n];
		self.pos += n;
		Ok(slice)
	}
}

/// Decode a big-endian `u16` list. The caller has checked the length is even.
pub(crate) fn u16_list(data: &[u8]) -> alloc::vec::Vec<u16> {
	data
		.chunks_exact(2)
		.map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
		.collect()
}
