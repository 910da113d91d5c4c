/* demos/fragment_handshake.rs */
#![allow(missing_docs)]

use std::error::Error;
use std::io::{self, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use tlsfrag::{FragmentationPolicy, FragmentingStream, Interval, Transport};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();

	let mut args = std::env::args().skip(1);
	let mut host = None;
	let mut port = 443u16;
	let mut policy = FragmentationPolicy::default();

	while let Some(arg) = args.next() {
		match arg.as_str() {
			"-p" | "--port" => {
				port = args.next().ok_or("expected port after --port")?.parse()?;
			}
			"--sni-size" => {
				let sni: Interval = args.next().ok_or("expected range after --sni-size")?.parse()?;
				policy = FragmentationPolicy::new(policy.before_sni(), sni, sni, policy.delay_ms());
			}
			"--delay" => {
				let delay: Interval = args.next().ok_or("expected range after --delay")?.parse()?;
				policy = policy.with_delay_ms(delay);
			}
			"-h" | "--help" => {
				println!("Usage: fragment_handshake [OPTIONS] HOST");
				println!("Options:");
				println!("  -p, --port PORT      Server port (default: 443)");
				println!("  --sni-size MIN-MAX   Fragment size from hostname on (default: 1-2)");
				println!("  --delay MIN-MAX      Pause after each fragment in ms (default: 10-20)");
				println!("  -h, --help           Show this help message");
				return Ok(());
			}
			_ if host.is_none() => host = Some(arg),
			_ => {
				error!("Unknown argument: {}", arg);
				return Err(format!("unknown argument: {arg}").into());
			}
		}
	}
	let host = host.unwrap_or_else(|| "www.rust-lang.org".to_owned());

	let root_store =
		rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
	let config = rustls::ClientConfig::builder_with_provider(Arc::new(
		rustls::crypto::ring::default_provider(),
	))
	.with_safe_default_protocol_versions()?
	.with_root_certificates(root_store)
	.with_no_client_auth();

	let server_name = ServerName::try_from(host.clone())?;
	let mut conn = rustls::ClientConnection::new(Arc::new(config), server_name)?;

	info!(%host, port, ?policy, "connecting");
	let sock = TcpStream::connect((host.as_str(), port))?;
	sock.set_nodelay(true)?;
	let mut sock = FragmentingStream::new(sock, policy);
	sock.set_timeout(Some(Duration::from_secs(30)))?;

	let mut tls = rustls::Stream::new(&mut conn, &mut sock);
	let request = format!(
		"HEAD / HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\nAccept-Encoding: identity\r\n\r\n"
	);
	tls.write_all(request.as_bytes())?;
	if let Some(suite) = tls.conn.negotiated_cipher_suite() {
		info!(suite = ?suite.suite(), "handshake complete");
	}

	let mut response = Vec::new();
	match tls.read_to_end(&mut response) {
		Ok(_) => {}
		// peer closed without close_notify
		Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {}
		Err(e) => return Err(e.into()),
	}
	let head = String::from_utf8_lossy(&response);
	if let Some(status) = head.lines().next() {
		info!(status, bytes = response.len(), "response");
	}

	sock.close()?;
	Ok(())
}
