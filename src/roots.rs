//! Decoding of `get-roots` entries.

use openssl::x509::X509;

use crate::{jsons, Error};

/// Decode one entry of the `certificates` array: standard base64 around a DER
/// certificate.
///
/// Nothing about the certificate is checked beyond it being parsable. Bytes
/// after the certificate make the entry invalid.
pub fn decode_root(encoded: &str) -> Result<X509, Error> {
  let der = decode_base64(encoded).map_err(Error::BadEncoding)?;
  let cert = X509::from_der(&der).map_err(|e| Error::BadCertificate(format!("While decoding certificate: {}", e)))?;
  match outer_len(&der) {
    Some(len) if len == der.len() => Ok(cert),
    Some(len) if len < der.len() => Err(Error::BadCertificate(format!("{} bytes of trailing data after certificate", der.len() - len))),
    _ => Err(Error::BadCertificate("Invalid DER length".to_owned())),
  }
}

/// Standard alphabet base64, forgiving in the same places most decoders are:
/// line breaks are ignored and non-zero trailing bits are accepted.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
  let config = base64::STANDARD.decode_allow_trailing_bits(true);
  if encoded.contains(|c| c == '\r' || c == '\n') {
    let joined: String = encoded.chars().filter(|&c| c != '\r' && c != '\n').collect();
    base64::decode_config(&joined, config)
  } else {
    base64::decode_config(encoded, config)
  }
}

/// Length of the outermost DER element at the start of `der`, header included.
fn outer_len(der: &[u8]) -> Option<usize> {
  let len_byte = *der.get(1)?;
  if len_byte & 0x80 == 0 {
    return Some(2 + len_byte as usize);
  }
  let nb_len_bytes = (len_byte & 0x7f) as usize;
  if nb_len_bytes == 0 || nb_len_bytes > std::mem::size_of::<usize>() {
    return None;
  }
  let len = der.get(2..2 + nb_len_bytes)?.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
  len.checked_add(2 + nb_len_bytes)
}

/// Decode every entry of `response`, in order, together with its index.
///
/// A bad entry only yields an `Err` for itself; it is up to the caller whether
/// to skip it.
pub fn decode_roots(response: &jsons::GetRoots) -> impl Iterator<Item = (usize, Result<X509, Error>)> + '_ {
  response.certificates.iter().map(|encoded| decode_root(encoded)).enumerate()
}
