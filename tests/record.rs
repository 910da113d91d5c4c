/* tests/record.rs */
#![allow(missing_docs)]
#![cfg(feature = "std")]

mod helpers;

use std::io;

use helpers::Trickle;
use tlsfrag::{Error, ReadError, RecordReader, parse, parse_from_record, read_client_hello};

#[test]
fn single_record() {
	let raw = helpers::full_raw();
	let record = helpers::wrap_record(&raw);
	let hello = read_client_hello(&mut &record[..]).unwrap();
	assert_eq!(hello, parse(&raw).unwrap());
	assert_eq!(hello.server_name(), Some("example.com"));
}

#[test]
fn message_split_across_records() {
	let raw = helpers::full_raw();
	let expected = parse(&raw).unwrap();
	// after the handshake header, inside the fixed fields, inside the SNI
	for at in [4, 40, 100] {
		let records = helpers::split_records(&raw, at);
		let hello = parse_from_record(&records).unwrap();
		assert_eq!(hello, expected, "split at {at}");
	}
}

#[test]
fn one_byte_reads() {
	let raw = helpers::full_raw();
	let records = helpers::split_records(&raw, 50);
	let mut src = Trickle {
		data: &records,
		step: 1,
	};
	let hello = read_client_hello(&mut src).unwrap();
	assert_eq!(hello.raw, raw);
	assert!(src.data.is_empty());
}

#[test]
fn leftover_records_stay_buffered() {
	let raw = helpers::minimal_raw();
	let mut stream = helpers::wrap_record(&raw);
	stream.extend_from_slice(&helpers::wrap_record(&raw));

	let mut src = &stream[..];
	let mut reader = RecordReader::new();
	reader.read_client_hello(&mut src).unwrap();
	assert!(reader.buffered().is_empty());
	// the second record was already pulled off the source
	let header = reader.read_next_record(&mut src).unwrap();
	assert_eq!(header.record_len(), stream.len() / 2);
	assert_eq!(reader.buffered(), raw);
}

#[test]
fn truncated_stream() {
	let record = helpers::wrap_record(&helpers::full_raw());
	let cut = &record[..record.len() - 3];
	let err = read_client_hello(&mut &cut[..]).unwrap_err();
	let ReadError::TruncatedStream { need, source } = err else {
		panic!("expected a truncated stream");
	};
	assert_eq!(need, record.len());
	assert_eq!(source.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn missing_continuation_record() {
	let raw = helpers::full_raw();
	let records = helpers::split_records(&raw, 30);
	let first_len = 5 + 30;
	let err = read_client_hello(&mut &records[..first_len]).unwrap_err();
	assert!(matches!(err, ReadError::TruncatedStream { need: 5, .. }));
}

#[test]
fn sslv2_rejected_before_payload() {
	let mut data = vec![0x80, 0x2e, 0x01, 0x03, 0x01];
	data.extend_from_slice(&[0u8; 64]);
	let mut src = Trickle {
		data: &data,
		step: 5,
	};
	let err = read_client_hello(&mut src).unwrap_err();
	assert!(matches!(err, ReadError::NotTls(Error::Sslv2Handshake)));
	// only the header was consumed
	assert_eq!(src.data.len(), 64);
}

#[test]
fn http_request_is_not_tls() {
	let err = read_client_hello(&mut &b"GET / HTTP/1.1\r\n\r\n"[..]).unwrap_err();
	assert!(matches!(err, ReadError::NotTls(Error::NotHandshakeRecord(b'G'))));
}

#[test]
fn server_hello_record_rejected() {
	let mut raw = helpers::minimal_raw();
	raw[0] = 0x02;
	let record = helpers::wrap_record(&raw);
	let err = read_client_hello(&mut &record[..]).unwrap_err();
	assert!(matches!(err, ReadError::NotTls(Error::NotClientHello(0x02))));
}

#[test]
fn parse_from_record_errors() {
	assert_eq!(
		parse_from_record(&[0x16, 0x03]).unwrap_err(),
		Error::BufferTooShort { need: 5, have: 2 }
	);

	let mut record = helpers::wrap_record(&helpers::minimal_raw());
	record[0] = 0x17;
	assert_eq!(
		parse_from_record(&record).unwrap_err(),
		Error::NotHandshakeRecord(0x17)
	);

	record[0] = 0x16;
	record[1] = 0x10;
	assert_eq!(
		parse_from_record(&record).unwrap_err(),
		Error::UnsupportedRecordVersion(0x1001)
	);

	let record = helpers::wrap_record(&helpers::minimal_raw());
	let have = record.len() - 1;
	assert_eq!(
		parse_from_record(&record[..have]).unwrap_err(),
		Error::BufferTooShort {
			need: record.len(),
			have,
		}
	);
}
