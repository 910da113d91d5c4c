/* src/extension.rs */

use crate::ClientHello;
use crate::Error;
use crate::reader::{Reader, u16_list};

/// ClientHello extensions this crate decodes. Everything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
#[non_exhaustive]
pub enum ExtensionType {
	/// Server Name Indication (RFC 6066).
	ServerName = 0,
	/// Certificate status request (RFC 6066).
	StatusRequest = 5,
	/// Supported elliptic curves, now "supported groups" (RFC 4492).
	SupportedCurves = 10,
	/// Supported EC point formats (RFC 4492).
	SupportedPoints = 11,
	/// Session ticket (RFC 5077).
	SessionTicket = 35,
	/// Next Protocol Negotiation draft extension, never IANA assigned.
	NextProtoNeg = 13172,
}

impl TryFrom<u16> for ExtensionType {
	type Error = ();

	fn try_from(value: u16) -> Result<Self, Self::Error> {
		match value {
			0 => Ok(Self::ServerName),
			5 => Ok(Self::StatusRequest),
			10 => Ok(Self::SupportedCurves),
			11 => Ok(Self::SupportedPoints),
			35 => Ok(Self::SessionTicket),
			13172 => Ok(Self::NextProtoNeg),
			_ => Err(()),
		}
	}
}

/// SNI name type for a DNS hostname.
const NAME_TYPE_HOST_NAME: u8 = 0;

/// `CertificateStatusType` value for OCSP.
const STATUS_TYPE_OCSP: u8 = 1;

pub(crate) fn apply_extension(
	hello: &mut ClientHello,
	type_id: u16,
	data: &[u8],
) -> Result<(), Error> {
	let Ok(ext) = ExtensionType::try_from(type_id) else {
		return Ok(());
	};
	let invalid = |reason: &'static str| Error::InvalidExtension { type_id, reason };
	match ext {
		ExtensionType::ServerName => {
			hello.sni = parse_sni(data).map_err(|_| invalid("truncated server name list"))?;
		}
		ExtensionType::StatusRequest => {
			let Some(&status_type) = data.first() else {
				return Err(invalid("empty status request"));
			};
			if status_type == STATUS_TYPE_OCSP {
				hello.ocsp_stapling = true;
			}
		}
		ExtensionType::SupportedCurves => {
			if data.len() < 2 {
				return Err(invalid("missing curve list length"));
			}
			let list_len = u16::from_be_bytes([data[0], data[1]]) as usize;
			if !list_len.is_multiple_of(2) || data.len() != list_len + 2 {
				return Err(invalid("curve list length mismatch"));
			}
			hello.supported_curves = u16_list(&data[2..]);
		}
		ExtensionType::SupportedPoints => {
			let Some((&list_len, points)) = data.split_first() else {
				return Err(invalid("missing point format list length"));
			};
			if points.len() != list_len as usize {
				return Err(invalid("point format list length mismatch"));
			}
			hello.supported_points = points.to_vec();
		}
		ExtensionType::SessionTicket => {
			hello.ticket_supported = true;
			hello.session_ticket = data.to_vec();
		}
		ExtensionType::NextProtoNeg => {
			if !data.is_empty() {
				return Err(invalid("next protocol negotiation must be empty"));
			}
			hello.next_proto_neg = true;
		}
	}
	tracing::debug!(?ext, len = data.len(), "decoded extension");
	Ok(())
}

/// Return the first host_name entry of a server_name extension body.
///
/// The leading `u16` is taken as the number of entries. Scanning stops at
/// the first host_name, so entries after it are not checked.
fn parse_sni(data: &[u8]) -> Result<Option<alloc::vec::Vec<u8>>, Error> {
	let mut r = Reader::new(data);
	let count = r.read_u16("SNI entry count")?;
	for _ in 0..count {
		let name_type = r.read_u8("SNI name type")?;
		let name_len = r.read_u16("SNI name length")? as usize;
		let name = r.read_bytes(name_len, "SNI name")?;
		if name_type == NAME_TYPE_HOST_NAME {
			return Ok(Some(name.to_vec()));
		}
	}
	Ok(None)
}
