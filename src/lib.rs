/* src/lib.rs */

//! TLS ClientHello reader and SNI-aware fragmenting stream.
//!
//! Two pieces work together:
//!
//! - A parser that rebuilds a ClientHello from TLS records, across as many
//!   records and reads as it takes, via [`RecordReader`], or from a bare
//!   handshake message via [`parse`].
//! - [`FragmentingStream`], a drop-in wrapper around a duplex transport that
//!   splits the first outgoing ClientHello into small, randomly sized and
//!   randomly delayed writes around the Server Name Indication, so that a
//!   middlebox looking for the hostname in one segment does not see it.
//!
//! ```no_run
//! use std::io::Write;
//! use std::net::TcpStream;
//!
//! use tlsfrag::{FragmentationPolicy, FragmentingStream};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let client_hello: Vec<u8> = Vec::new();
//! let tcp = TcpStream::connect("example.com:443")?;
//! let mut stream = FragmentingStream::new(tcp, FragmentationPolicy::default());
//! stream.write_all(&client_hello)?; // fragmented
//! stream.write_all(b"later records")?; // passed through
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
mod block;
mod error;
mod extension;
#[cfg(feature = "std")]
mod fragment;
mod parser;
mod policy;
mod reader;
#[cfg(feature = "std")]
mod record;
#[cfg(feature = "std")]
mod stream;

use alloc::vec::Vec;

pub use crate::error::{Error, PolicyError};
#[cfg(feature = "std")]
pub use crate::error::{PartialWrite, ReadError};
pub use crate::extension::ExtensionType;
#[cfg(feature = "std")]
pub use crate::fragment::{Zones, split_at_server_name};
pub use crate::parser::parse;
#[cfg(feature = "std")]
pub use crate::parser::parse_from_record;
pub use crate::policy::{FragmentationPolicy, Interval};
#[cfg(feature = "std")]
pub use crate::record::{CONTENT_TYPE_HANDSHAKE, RecordHeader, RecordReader, read_client_hello};
#[cfg(feature = "std")]
pub use crate::stream::{FragmentingStream, Transport};

/// Parsed TLS ClientHello message.
///
/// Optional extension fields keep their defaults (`None`, `false`, empty)
/// when the extension is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientHello {
	/// The whole handshake message, header included.
	pub raw: Vec<u8>,
	/// Legacy protocol version (usually `0x0303`).
	pub version: u16,
	/// 32-byte client random.
	pub random: [u8; 32],
	/// Session ID, at most 32 bytes.
	pub session_id: Vec<u8>,
	/// Offered cipher suite identifiers, in wire order.
	pub cipher_suites: Vec<u16>,
	/// Compression method bytes.
	pub compression_methods: Vec<u8>,
	/// Raw bytes of the first host_name entry of the SNI extension.
	pub sni: Option<Vec<u8>>,
	/// `status_request` asked for OCSP stapling.
	pub ocsp_stapling: bool,
	/// Supported elliptic curves / named groups.
	pub supported_curves: Vec<u16>,
	/// Supported EC point formats.
	pub supported_points: Vec<u8>,
	/// `session_ticket` extension was present.
	pub ticket_supported: bool,
	/// Body of the `session_ticket` extension.
	pub session_ticket: Vec<u8>,
	/// Next Protocol Negotiation extension was present.
	pub next_proto_neg: bool,
}

impl ClientHello {
	/// Return the SNI hostname when it is valid UTF-8.
	#[must_use]
	pub fn server_name(&self) -> Option<&str> {
		self.sni
			.as_deref()
			.and_then(|name| core::str::from_utf8(name).ok())
	}

	/// Whether a cipher suite identifier was offered.
	#[must_use]
	pub fn offers_cipher_suite(&self, suite: u16) -> bool {
		self.cipher_suites.contains(&suite)
	}
}
