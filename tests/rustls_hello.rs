/* tests/rustls_hello.rs */
#![allow(missing_docs)]
#![cfg(feature = "std")]

mod helpers;

use std::sync::Arc;

use helpers::{MockTransport, Trickle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustls::pki_types::ServerName;
use tlsfrag::{FragmentationPolicy, FragmentingStream, Interval, read_client_hello};

/// First flight of a real rustls client, as it would hit the socket.
fn rustls_client_hello(host: &'static str) -> Vec<u8> {
	let provider = Arc::new(rustls::crypto::ring::default_provider());
	let config = rustls::ClientConfig::builder_with_provider(provider)
		.with_safe_default_protocol_versions()
		.unwrap()
		.with_root_certificates(rustls::RootCertStore::empty())
		.with_no_client_auth();
	let name = ServerName::try_from(host).unwrap();
	let mut conn = rustls::ClientConnection::new(Arc::new(config), name).unwrap();

	let mut out = Vec::new();
	while conn.wants_write() {
		conn.write_tls(&mut out).unwrap();
	}
	out
}

#[test]
fn parses_rustls_client_hello() {
	let flight = rustls_client_hello("example.com");
	let mut src = Trickle {
		data: &flight,
		step: 7,
	};
	let hello = read_client_hello(&mut src).unwrap();

	assert_eq!(hello.server_name(), Some("example.com"));
	assert_eq!(hello.version, 0x0303);
	assert!(hello.offers_cipher_suite(0x1301));
	assert!(hello.supported_curves.contains(&0x001d));
	assert!(hello.supported_points.contains(&0x00));
	assert_eq!(hello.raw, flight[5..]);
}

#[test]
fn hostname_never_leaves_in_one_write() {
	let host = "fragment.example.org";
	let flight = rustls_client_hello(host);
	let policy = FragmentationPolicy::default().with_delay_ms(Interval::fixed(0));
	let stream =
		FragmentingStream::with_rng(MockTransport::new(), policy, StdRng::seed_from_u64(5));

	assert_eq!(stream.send(&flight).unwrap(), flight.len());

	let writes = stream.get_ref().writes();
	assert!(writes.len() > host.len() / 2);
	assert!(
		!writes
			.iter()
			.any(|w| w.windows(host.len()).any(|x| x == host.as_bytes()))
	);
	assert_eq!(writes.concat(), flight);
}
