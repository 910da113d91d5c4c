/* demos/parse_record.rs */
#![allow(missing_docs)]

fn main() {
	let records = build_sample_records();

	match tlsfrag::parse_from_record(&records) {
		Ok(hello) => {
			println!("Legacy version: {:#06x}", hello.version);
			println!("Random: {:02x?}", hello.random);
			println!(
				"Session ID ({} bytes): {:02x?}",
				hello.session_id.len(),
				hello.session_id
			);
			println!(
				"Cipher suites: {:?}",
				hello
					.cipher_suites
					.iter()
					.map(|cs| format!("{cs:#06x}"))
					.collect::<Vec<_>>()
			);

			match (&hello.sni, hello.server_name()) {
				(_, Some(sni)) => println!("SNI: {sni}"),
				(Some(raw), None) => println!("SNI (not UTF-8): {raw:02x?}"),
				(None, None) => println!("SNI: none"),
			}

			if !hello.supported_curves.is_empty() {
				println!(
					"Supported curves: {:?}",
					hello
						.supported_curves
						.iter()
						.map(|g| format!("{g:#06x}"))
						.collect::<Vec<_>>()
				);
			}
			println!("Point formats: {:?}", hello.supported_points);
			println!("OCSP stapling: {}", hello.ocsp_stapling);
			println!(
				"Session ticket: {} ({} bytes)",
				hello.ticket_supported,
				hello.session_ticket.len()
			);
			println!("Handshake message: {} bytes", hello.raw.len());

			if let Some(zones) = hello
				.sni
				.as_deref()
				.and_then(|name| tlsfrag::split_at_server_name(&records, name))
			{
				println!(
					"Hostname at offset {}: {} bytes before, {} after",
					zones.offset(),
					zones.before.len(),
					zones.after.len()
				);
			}
		}
		Err(e) => eprintln!("Parse error: {e}"),
	}
}

/// A ClientHello split over two handshake records.
fn build_sample_records() -> Vec<u8> {
	let mut body = Vec::new();
	body.extend_from_slice(&[0x03, 0x03]);
	body.extend_from_slice(&[0x42; 32]);
	body.push(0x00);
	body.extend_from_slice(&[0x00, 0x04]);
	body.extend_from_slice(&[0xC0, 0x2F]); // TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256
	body.extend_from_slice(&[0x13, 0x01]); // TLS_AES_128_GCM_SHA256
	body.extend_from_slice(&[0x01, 0x00]);

	let mut exts = Vec::new();

	// SNI
	let host = b"www.example.com";
	push_u16(&mut exts, 0x0000);
	push_u16(&mut exts, (2 + 1 + 2 + host.len()) as u16);
	push_u16(&mut exts, 1);
	exts.push(0x00);
	push_u16(&mut exts, host.len() as u16);
	exts.extend_from_slice(host);

	// Supported Curves
	push_u16(&mut exts, 0x000a);
	push_u16(&mut exts, 6);
	push_u16(&mut exts, 4);
	push_u16(&mut exts, 0x001d);
	push_u16(&mut exts, 0x0017);

	// Point Formats
	push_u16(&mut exts, 0x000b);
	push_u16(&mut exts, 2);
	exts.extend_from_slice(&[0x01, 0x00]);

	// Session Ticket, empty
	push_u16(&mut exts, 0x0023);
	push_u16(&mut exts, 0);

	push_u16(&mut body, exts.len() as u16);
	body.extend_from_slice(&exts);

	let mut hs = vec![0x01];
	let len = body.len() as u32;
	hs.push((len >> 16) as u8);
	hs.push((len >> 8) as u8);
	hs.push(len as u8);
	hs.extend_from_slice(&body);

	let (first, second) = hs.split_at(hs.len() / 2);
	let mut records = Vec::new();
	for part in [first, second] {
		records.extend_from_slice(&[0x16, 0x03, 0x01]);
		push_u16(&mut records, part.len() as u16);
		records.extend_from_slice(part);
	}
	records
}

fn push_u16(buf: &mut Vec<u8>, val: u16) {
	buf.push((val >> 8) as u8);
	buf.push(val as u8);
}
