/* src/parser.rs */

use alloc::vec::Vec;

use crate::ClientHello;
use crate::Error;
use crate::extension::apply_extension;
use crate::reader::{Reader, u16_list};

/// Handshake message type of a ClientHello.
pub(crate) const HANDSHAKE_CLIENT_HELLO: u8 = 0x01;

/// Shortest handshake message accepted before any field is decoded.
const MIN_CLIENT_HELLO_LEN: usize = 42;

/// Longest session ID a ClientHello may carry.
const MAX_SESSION_ID_LEN: usize = 32;

/// Parse a TLS ClientHello from a complete handshake message.
///
/// The input should begin with the handshake type byte `0x01` followed by
/// the 24-bit body length, with the record layer already removed. Lengths
/// inside the message are checked against the bytes that are really there
/// and any mismatch rejects the whole message; unknown extensions are
/// skipped.
///
/// # Errors
///
/// Returns an error when the data is truncated, the handshake type is not
/// ClientHello, or a field or recognized extension is malformed.
///
/// ```
/// # fn build() -> Vec<u8> {
/// #     let mut d = vec![0x01, 0x00, 0x00, 0x29, 0x03, 0x03];
/// #     d.extend_from_slice(&[0u8; 32]);
/// #     d.extend_from_slice(&[0x00, 0x00, 0x02, 0x13, 0x01, 0x01, 0x00]);
/// #     d
/// # }
/// # let data = build();
/// let hello = tlsfrag::parse(&data).unwrap();
/// assert_eq!(hello.version, 0x0303);
/// assert_eq!(hello.server_name(), None);
/// ```
pub fn parse(data: &[u8]) -> Result<ClientHello, Error> {
	if data.len() < MIN_CLIENT_HELLO_LEN {
		return Err(Error::BufferTooShort {
			need: MIN_CLIENT_HELLO_LEN,
			have: data.len(),
		});
	}
	let mut r = Reader::new(data);
	let hs_type = r.read_u8("handshake type")?;
	if hs_type != HANDSHAKE_CLIENT_HELLO {
		return Err(Error::NotClientHello(hs_type));
	}
	let body_len = r.read_u24("handshake length")? as usize;
	let body = r.read_bytes(body_len, "handshake body")?;
	let mut hello = parse_body(body)?;
	hello.raw = data[..4 + body_len].to_vec();
	tracing::debug!(
		version = hello.version,
		cipher_suites = hello.cipher_suites.len(),
		server_name = ?hello.server_name(),
		ticket = hello.ticket_supported,
		"parsed ClientHello"
	);
	Ok(hello)
}

/// Parse a TLS ClientHello from bytes that start with a TLS record header.
///
/// The handshake message may be spread over several consecutive records;
/// they are joined the same way [`RecordReader`](crate::RecordReader) joins
/// them off a live stream.
///
/// # Errors
///
/// Returns an error when the record layer is invalid, the records end
/// before the handshake message does, or the message is not a valid
/// ClientHello.
///
/// ```
/// # fn build() -> Vec<u8> {
/// #     let mut d = vec![0x16, 0x03, 0x01, 0x00, 0x2D];
/// #     d.push(0x01); d.extend_from_slice(&[0x00, 0x00, 0x29]);
/// #     d.extend_from_slice(&[0x03, 0x03]);
/// #     d.extend_from_slice(&[0u8; 32]);
/// #     d.extend_from_slice(&[0x00, 0x00, 0x02, 0x13, 0x01, 0x01, 0x00]);
/// #     d
/// # }
/// # let data = build();
/// let hello = tlsfrag::parse_from_record(&data).unwrap();
/// assert_eq!(hello.cipher_suites, vec![0x1301]);
/// ```
#[cfg(feature = "std")]
pub fn parse_from_record(mut data: &[u8]) -> Result<ClientHello, Error> {
	use crate::ReadError;

	let have = data.len();
	match crate::RecordReader::new().read_client_hello(&mut data) {
		Ok(hello) => Ok(hello),
		Err(ReadError::NotTls(e)) => Err(e),
		Err(ReadError::TruncatedStream { need, .. }) => {
			Err(Error::BufferTooShort { need, have })
		}
	}
}

fn parse_body(data: &[u8]) -> Result<ClientHello, Error> {
	let mut r = Reader::new(data);

	let version = r.read_u16("legacy version")?;
	let random = r.read_array("client random")?;

	let sid_len = r.read_u8("session ID length")? as usize;
	if sid_len > MAX_SESSION_ID_LEN {
		return Err(Error::SessionIdTooLong(sid_len));
	}
	let session_id = r.read_bytes(sid_len, "session ID")?.to_vec();

	let cs_len = r.read_u16("cipher suites length")? as usize;
	if !cs_len.is_multiple_of(2) {
		return Err(Error::OddCipherSuitesLength(cs_len));
	}
	let cipher_suites = u16_list(r.read_bytes(cs_len, "cipher suites")?);

	let comp_len = r.read_u8("compression methods length")? as usize;
	let compression_methods = r.read_bytes(comp_len, "compression methods")?.to_vec();

	let mut hello = ClientHello {
		raw: Vec::new(),
		version,
		random,
		session_id,
		cipher_suites,
		compression_methods,
		..ClientHello::default()
	};

	if !r.is_empty() {
		parse_extensions(&mut r, &mut hello)?;
	}
	Ok(hello)
}

fn parse_extensions(r: &mut Reader<'_>, hello: &mut ClientHello) -> Result<(), Error> {
	let declared = r.read_u16("extensions length")? as usize;
	if declared != r.remaining() {
		return Err(Error::ExtensionsLengthMismatch {
			declared,
			actual: r.remaining(),
		});
	}
	while !r.is_empty() {
		let type_id = r.read_u16("extension type")?;
		let ext_len = r.read_u16("extension length")? as usize;
		let ext_body = r.read_bytes(ext_len, "extension body")?;
		apply_extension(hello, type_id, ext_body)?;
	}
	Ok(())
}
