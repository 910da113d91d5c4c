/* src/record.rs */

use std::io::Read;

use crate::block::ByteBlock;
use crate::parser::{HANDSHAKE_CLIENT_HELLO, parse};
use crate::{ClientHello, Error, ReadError};

/// TLS record content type carrying handshake messages.
pub const CONTENT_TYPE_HANDSHAKE: u8 = 0x16;

/// First byte of an SSLv2 ClientHello: the high bit of a two byte length
/// set on a record shorter than 256 bytes.
const SSLV2_MARKER: u8 = 0x80;

/// Record versions at or above this are not plausible TLS.
const MAX_RECORD_VERSION: u16 = 0x1000;

/// Handshake header: one type byte and a 24-bit length.
const HANDSHAKE_HEADER_LEN: usize = 4;

/// Header of a single TLS record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
	/// Content type byte.
	pub content_type: u8,
	/// Record layer protocol version.
	pub version: u16,
	/// Payload length that follows the header.
	pub payload_len: u16,
}

impl RecordHeader {
	/// Encoded size of a record header.
	pub const SIZE: usize = 5;

	/// Decode and sanity check the first [`Self::SIZE`] bytes of `data`.
	///
	/// Only handshake records from something that could plausibly be a TLS
	/// client are accepted, so a caller can give up before reading a
	/// payload that was never TLS.
	///
	/// # Errors
	///
	/// Returns an error for short input, an SSLv2-style header, a content
	/// type other than Handshake, or a version of `0x1000` or more.
	pub fn parse(data: &[u8]) -> Result<Self, Error> {
		let Some(&[content_type, v0, v1, l0, l1]) = data.first_chunk::<5>() else {
			return Err(Error::BufferTooShort {
				need: Self::SIZE,
				have: data.len(),
			});
		};
		if content_type == SSLV2_MARKER {
			return Err(Error::Sslv2Handshake);
		}
		if content_type != CONTENT_TYPE_HANDSHAKE {
			return Err(Error::NotHandshakeRecord(content_type));
		}
		let version = u16::from_be_bytes([v0, v1]);
		if version >= MAX_RECORD_VERSION {
			return Err(Error::UnsupportedRecordVersion(version));
		}
		Ok(Self {
			content_type,
			version,
			payload_len: u16::from_be_bytes([l0, l1]),
		})
	}

	/// Header plus payload length.
	#[must_use]
	pub fn record_len(&self) -> usize {
		Self::SIZE + self.payload_len as usize
	}
}

/// Reassembles one ClientHello from TLS records read off a byte stream.
///
/// Reads may return any amount of data; bytes that belong to the next
/// record are held back until the next call. A reader serves a single
/// parse and assumes the stream starts at a fresh handshake.
#[derive(Debug, Default)]
pub struct RecordReader {
	pending: Option<ByteBlock>,
	handshake: Vec<u8>,
}

impl RecordReader {
	/// Create a reader with no buffered data.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Handshake bytes collected so far and not yet consumed.
	#[must_use]
	pub fn buffered(&self) -> &[u8] {
		&self.handshake
	}

	/// Read one record from `source` and append its payload to the
	/// handshake buffer.
	///
	/// # Errors
	///
	/// [`ReadError::TruncatedStream`] when the source fails or ends inside
	/// the record, [`ReadError::NotTls`] when the header is rejected. A bad
	/// header is reported before any payload is read.
	pub fn read_next_record<R: Read + ?Sized>(
		&mut self,
		source: &mut R,
	) -> Result<RecordHeader, ReadError> {
		let mut block = self.pending.take().unwrap_or_default();

		block
			.append_from_until(source, RecordHeader::SIZE)
			.map_err(|source| ReadError::TruncatedStream {
				need: RecordHeader::SIZE,
				source,
			})?;
		let header = RecordHeader::parse(block.as_slice())?;
		tracing::debug!(
			content_type = header.content_type,
			version = header.version,
			payload_len = header.payload_len,
			"read record header"
		);

		let end = header.record_len();
		block
			.append_from_until(source, end)
			.map_err(|source| ReadError::TruncatedStream { need: end, source })?;

		self.pending = block.split_off(end);
		block.set_offset(RecordHeader::SIZE);
		self.handshake.extend_from_slice(block.unread());
		tracing::debug!(
			buffered = self.handshake.len(),
			pending = self.pending.as_ref().map_or(0, ByteBlock::len),
			"appended record payload"
		);
		Ok(header)
	}

	/// Read records until a whole handshake message is buffered and decode
	/// it as a ClientHello.
	///
	/// # Errors
	///
	/// Propagates record errors from [`Self::read_next_record`], and returns
	/// [`ReadError::NotTls`] when the message is not a well formed
	/// ClientHello.
	pub fn read_client_hello<R: Read + ?Sized>(
		&mut self,
		source: &mut R,
	) -> Result<ClientHello, ReadError> {
		self.read_next_record(source)?;

		let Some(&[_, l0, l1, l2]) = self.handshake.first_chunk::<HANDSHAKE_HEADER_LEN>() else {
			return Err(Error::BufferTooShort {
				need: HANDSHAKE_HEADER_LEN,
				have: self.handshake.len(),
			}
			.into());
		};
		let msg_len = HANDSHAKE_HEADER_LEN + u32::from_be_bytes([0, l0, l1, l2]) as usize;

		while self.handshake.len() < msg_len {
			tracing::debug!(
				missing = msg_len - self.handshake.len(),
				"handshake message continues in next record"
			);
			self.read_next_record(source)?;
		}

		let message: Vec<u8> = self.handshake.drain(..msg_len).collect();
		if message[0] != HANDSHAKE_CLIENT_HELLO {
			return Err(Error::NotClientHello(message[0]).into());
		}
		Ok(parse(&message)?)
	}
}

/// Read a ClientHello from the start of `source` with a fresh
/// [`RecordReader`].
///
/// # Errors
///
/// See [`RecordReader::read_client_hello`].
pub fn read_client_hello<R: Read + ?Sized>(source: &mut R) -> Result<ClientHello, ReadError> {
	RecordReader::new().read_client_hello(source)
}
