/* tests/helpers/mod.rs */
#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::Mutex;

pub(crate) const HOST: &[u8] = b"example.com";

pub(crate) fn minimal_raw() -> Vec<u8> {
	let mut body = Vec::new();
	body.extend_from_slice(&[0x03, 0x03]); // legacy version
	body.extend_from_slice(&[0u8; 32]); // random
	body.push(0x00); // session ID length
	body.extend_from_slice(&[0x00, 0x02, 0x13, 0x01]); // cipher suites
	body.extend_from_slice(&[0x01, 0x00]); // compression
	wrap_handshake(&body)
}

/// Prefix a ClientHello body with its handshake header.
pub(crate) fn wrap_handshake(body: &[u8]) -> Vec<u8> {
	let mut msg = vec![0x01]; // handshake type
	let len = body.len() as u32;
	msg.push((len >> 16) as u8);
	msg.push((len >> 8) as u8);
	msg.push(len as u8);
	msg.extend_from_slice(body);
	msg
}

/// Wrap a raw handshake message in a TLS record layer.
pub(crate) fn wrap_record(handshake: &[u8]) -> Vec<u8> {
	let mut rec = vec![0x16, 0x03, 0x01]; // content type + version
	push_u16(&mut rec, handshake.len() as u16);
	rec.extend_from_slice(handshake);
	rec
}

/// Cut a handshake message in two and wrap each part in its own record.
pub(crate) fn split_records(handshake: &[u8], at: usize) -> Vec<u8> {
	let mut out = wrap_record(&handshake[..at]);
	out.extend_from_slice(&wrap_record(&handshake[at..]));
	out
}

/// Fixed fields shared by the full ClientHello builders.
fn fixed_fields() -> Vec<u8> {
	let mut body = Vec::new();
	body.extend_from_slice(&[0x03, 0x03]); // legacy version
	body.extend_from_slice(&[0xAB; 32]); // random
	// session ID (32 bytes)
	body.push(0x20);
	body.extend_from_slice(&[0xCD; 32]);
	// cipher suites: TLS_AES_128_GCM + TLS_AES_256_GCM + TLS_CHACHA20
	body.extend_from_slice(&[0x00, 0x06]);
	body.extend_from_slice(&[0x13, 0x01]);
	body.extend_from_slice(&[0x13, 0x02]);
	body.extend_from_slice(&[0x13, 0x03]);
	// compression
	body.extend_from_slice(&[0x01, 0x00]);
	body
}

/// ClientHello handshake message carrying `extensions` verbatim.
pub(crate) fn raw_with_extensions(extensions: &[u8]) -> Vec<u8> {
	let mut body = fixed_fields();
	push_u16(&mut body, extensions.len() as u16);
	body.extend_from_slice(extensions);
	wrap_handshake(&body)
}

/// Build a raw ClientHello with every extension the parser understands.
pub(crate) fn full_raw() -> Vec<u8> {
	raw_with_extensions(&build_extensions())
}

/// Offset of [`HOST`] inside `wrap_record(&full_raw())`.
pub(crate) fn full_record_sni_offset() -> usize {
	5 // record header
		+ 4 // handshake header
		+ fixed_fields().len()
		+ 2 // extensions length
		+ 4 // SNI extension header
		+ 2 // name count
		+ 1 // name type
		+ 2 // name length
}

/// server_name extension holding one host_name.
pub(crate) fn sni_extension(host: &[u8]) -> Vec<u8> {
	let mut ext = Vec::new();
	push_ext_header(&mut ext, 0x0000, 2 + 1 + 2 + host.len());
	push_u16(&mut ext, 1); // one entry
	ext.push(0x00); // host_name type
	push_u16(&mut ext, host.len() as u16);
	ext.extend_from_slice(host);
	ext
}

fn build_extensions() -> Vec<u8> {
	let mut exts = sni_extension(HOST);

	// Status Request: OCSP, no responder IDs, no extensions
	push_ext_header(&mut exts, 0x0005, 5);
	exts.extend_from_slice(&[0x01, 0x00, 0x00, 0x00, 0x00]);

	// Supported Curves: x25519 + secp256r1
	push_ext_header(&mut exts, 0x000a, 2 + 4);
	push_u16(&mut exts, 4);
	push_u16(&mut exts, 0x001d); // x25519
	push_u16(&mut exts, 0x0017); // secp256r1

	// Supported Points: uncompressed
	push_ext_header(&mut exts, 0x000b, 2);
	exts.push(0x01);
	exts.push(0x00);

	// Session Ticket carrying a 4-byte ticket
	push_ext_header(&mut exts, 0x0023, 4);
	exts.extend_from_slice(&[0x7A; 4]);

	// Next Protocol Negotiation
	push_ext_header(&mut exts, 13172, 0);

	// ALPN, not decoded: h2
	push_ext_header(&mut exts, 0x0010, 2 + 3);
	push_u16(&mut exts, 3);
	exts.push(2);
	exts.extend_from_slice(b"h2");

	// Unknown extension 0x0042
	push_ext_header(&mut exts, 0x0042, 3);
	exts.extend_from_slice(&[0xDE, 0xAD, 0xBE]);

	exts
}

pub(crate) fn push_ext_header(buf: &mut Vec<u8>, type_id: u16, data_len: usize) {
	push_u16(buf, type_id);
	push_u16(buf, data_len as u16);
}

pub(crate) fn push_u16(buf: &mut Vec<u8>, val: u16) {
	buf.push((val >> 8) as u8);
	buf.push(val as u8);
}

/// In-memory transport that records each write call separately.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
	writes: Mutex<Vec<Vec<u8>>>,
	incoming: Mutex<Vec<u8>>,
	/// Fail every write once this many write calls have succeeded.
	fail_after: Option<usize>,
}

impl MockTransport {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	pub(crate) fn failing_after(calls: usize) -> Self {
		Self {
			fail_after: Some(calls),
			..Self::default()
		}
	}

	pub(crate) fn with_incoming(data: &[u8]) -> Self {
		Self {
			incoming: Mutex::new(data.to_vec()),
			..Self::default()
		}
	}

	pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
		self.writes.lock().unwrap().clone()
	}
}

#[cfg(feature = "std")]
impl tlsfrag::Transport for MockTransport {
	fn close(&self) -> io::Result<()> {
		Ok(())
	}
}

impl Write for &MockTransport {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let mut writes = self.writes.lock().unwrap();
		if self.fail_after.is_some_and(|n| writes.len() >= n) {
			return Err(io::Error::from(io::ErrorKind::ConnectionReset));
		}
		writes.push(buf.to_vec());
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl Read for &MockTransport {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let mut incoming = self.incoming.lock().unwrap();
		let n = buf.len().min(incoming.len());
		buf[..n].copy_from_slice(&incoming[..n]);
		incoming.drain(..n);
		Ok(n)
	}
}

/// Reader that hands out at most `step` bytes per call.
pub(crate) struct Trickle<'a> {
	pub(crate) data: &'a [u8],
	pub(crate) step: usize,
}

impl Read for Trickle<'_> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let n = self.step.min(buf.len()).min(self.data.len());
		buf[..n].copy_from_slice(&self.data[..n]);
		self.data = &self.data[n..];
		Ok(n)
	}
}
