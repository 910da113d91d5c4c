/* src/error.rs */

#[cfg(feature = "std")]
use std::io;

use alloc::string::String;

/// Errors produced while decoding a TLS record or ClientHello.
///
/// Every variant means the input is not a usable TLS ClientHello.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// Input buffer does not contain enough bytes.
	#[error("buffer too short: need {need} bytes, have {have}")]
	BufferTooShort {
		/// Minimum bytes required.
		need: usize,
		/// Bytes actually available.
		have: usize,
	},

	/// TLS record content type is not Handshake (`0x16`).
	#[error("unexpected content type: expected 0x16 (Handshake), got {0:#04x}")]
	NotHandshakeRecord(u8),

	/// The first byte looks like an SSLv2 record header.
	#[error("unsupported SSLv2 handshake received")]
	Sslv2Handshake,

	/// Record protocol version is too large to belong to a real TLS peer.
	#[error("implausible record version {0:#06x}")]
	UnsupportedRecordVersion(u16),

	/// Handshake message type is not ClientHello (`0x01`).
	#[error("unexpected handshake type: expected 0x01 (ClientHello), got {0:#04x}")]
	NotClientHello(u8),

	/// A required field was truncated in the input.
	#[error("truncated {field}")]
	Truncated {
		/// Name of the truncated field.
		field: &'static str,
	},

	/// Session ID is longer than 32 bytes.
	#[error("session ID length {0} exceeds 32")]
	SessionIdTooLong(usize),

	/// Cipher suite list length is odd.
	#[error("cipher suites length {0} is not a multiple of 2")]
	OddCipherSuitesLength(usize),

	/// Extensions block length differs from the bytes that follow it.
	#[error("extensions length {declared} does not match remaining {actual} bytes")]
	ExtensionsLengthMismatch {
		/// Length announced by the extensions header.
		declared: usize,
		/// Bytes actually left in the message.
		actual: usize,
	},

	/// A recognized extension has an inconsistent body.
	#[error("malformed extension {type_id:#06x}: {reason}")]
	InvalidExtension {
		/// TLS extension type identifier.
		type_id: u16,
		/// What was wrong with the body.
		reason: &'static str,
	},
}

/// Errors produced while pulling a ClientHello off a byte stream.
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReadError {
	/// The source ended or failed before the record was complete.
	#[error("stream ended before {need} bytes were available")]
	TruncatedStream {
		/// Bytes the reader was waiting for.
		need: usize,
		/// Error reported by the source.
		#[source]
		source: io::Error,
	},

	/// The bytes read are not a TLS ClientHello.
	#[error("not a TLS packet: {0}")]
	NotTls(#[from] Error),
}

/// A transport write failed part way through a fragmented write.
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
#[error("transport write failed after {written} bytes")]
pub struct PartialWrite {
	/// Bytes handed to the transport before the failure.
	pub written: usize,
	/// Error reported by the transport.
	#[source]
	pub source: io::Error,
}

#[cfg(feature = "std")]
impl PartialWrite {
	/// Discard the byte count and return the transport error.
	#[must_use]
	pub fn into_source(self) -> io::Error {
		self.source
	}
}

/// Errors produced while building a [`FragmentationPolicy`](crate::FragmentationPolicy).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PolicyError {
	/// Lower bound is greater than the upper bound.
	#[error("invalid range: min {min} exceeds max {max}")]
	InvalidRange {
		/// Lower bound.
		min: u64,
		/// Upper bound.
		max: u64,
	},

	/// Range text is not `N` or `MIN-MAX`.
	#[error("malformed range {0:?}")]
	Malformed(String),
}
