//! Certificate Transparency log root listing.
//!
//! Every CT log publishes the set of root certificates it accepts as trust
//! anchors through `GET <log>/ct/v1/get-roots` (see section 4.7 of [the
//! RFC](https://tools.ietf.org/html/rfc6962#section-4.7)). The response is a
//! JSON object with a single `certificates` array, each element being a
//! base64-encoded DER certificate.
//!
//! This crate fetches that list, decodes whatever it can, and turns the
//! subject of each root into a one-line summary such as
//! `CN=ISRG Root X1; O=[Internet Security Research Group]; C=[US]`.
//!
//! Nothing here verifies anything. Roots are not checked for validity,
//! signatures or anything else; an entry that can't be decoded is dropped.
use std::{fmt, io};

use log::debug;
use openssl::x509::X509;

pub mod certutils;
pub mod internal;
pub mod jsons;
pub mod roots;

pub use certutils::{subject_to_string, SubjectName};

/// Errors that this library could return.
#[derive(Debug)]
pub enum Error {
  /// Some odd stuff happened.
  Unknown(String),

  /// The request could not be sent, or no response came back.
  NetIO(reqwest::Error),

  /// The server responded, but the body could not be read in full.
  ReadBody(reqwest::Error),

  /// Server responded with something bad (e.g. malformed JSON)
  MalformedResponseBody(String),

  /// A root entry is not valid base64.
  BadEncoding(base64::DecodeError),

  /// A root entry is not a DER certificate openssl can parse.
  BadCertificate(String),
}

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::Unknown(desc) => write!(f, "{}", desc),
      Error::NetIO(e) => write!(f, "Network IO error: {}", e),
      Error::ReadBody(e) => write!(f, "Unable to read server response: {}", e),
      Error::MalformedResponseBody(desc) => write!(f, "Unable to parse server response: {}", desc),
      Error::BadEncoding(e) => write!(f, "Invalid base64: {}", e),
      Error::BadCertificate(desc) => write!(f, "Invalid certificate: {}", desc),
    }
  }
}

impl std::error::Error for Error {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Error::NetIO(e) | Error::ReadBody(e) => Some(e),
      Error::BadEncoding(e) => Some(e),
      _ => None,
    }
  }
}

/// Fetch the root list of the log at `log_uri` and decode every entry.
///
/// Entries that fail to decode are skipped (and logged at debug level). The
/// order of the server response is kept.
pub fn get_roots(log_uri: &str) -> Result<Vec<X509>, Error> {
  let response = internal::get_roots_response(log_uri)?;
  Ok(roots::decode_roots(&response).filter_map(keep_decoded).collect())
}

/// Turn an already parsed `get-roots` response into display lines, one per
/// decodable root.
pub fn format_roots(response: &jsons::GetRoots) -> Vec<String> {
  roots::decode_roots(response)
    .filter_map(keep_decoded)
    .map(|cert| subject_to_string(&cert))
    .collect()
}

/// Fetch the root list of the log at `log_uri` and write one subject line per
/// root into `out`. Returns the number of lines written.
///
/// Nothing is written unless the response was fetched and parsed.
pub fn print_roots<W: io::Write>(log_uri: &str, out: &mut W) -> Result<usize, Error> {
  let response = internal::get_roots_response(log_uri)?;
  let lines = format_roots(&response);
  for line in lines.iter() {
    writeln!(out, "{}", line).map_err(|e| Error::Unknown(format!("Unable to write output: {}", e)))?;
  }
  Ok(lines.len())
}

fn keep_decoded((index, result): (usize, Result<X509, Error>)) -> Option<X509> {
  match result {
    Ok(cert) => Some(cert),
    Err(e) => {
      debug!("Skipping root #{}: {}", index, e);
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use std::io::{Read, Write};
  use std::net::TcpListener;
  use std::thread;

  use openssl::nid::Nid;

  use super::*;
  use crate::certutils::self_signed;

  /// Answer exactly one HTTP request on a local port with `status` and `body`.
  /// Returns the base URI to use as the log and a handle yielding the request
  /// head that was received.
  fn serve_once(status: &'static str, body: String) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_uri = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
      let (mut stream, _) = listener.accept().unwrap();
      let mut request = Vec::new();
      let mut buf = [0u8; 1024];
      while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
          break;
        }
        request.extend_from_slice(&buf[..n]);
      }
      let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status, body.len(), body);
      stream.write_all(response.as_bytes()).unwrap();
      String::from_utf8_lossy(&request).into_owned()
    });
    (base_uri, handle)
  }

  fn roots_body(certificates: &[String]) -> String {
    serde_json::json!({ "certificates": certificates }).to_string()
  }

  fn encode(subject: &[(Nid, &str)]) -> String {
    base64::encode(&self_signed(subject).to_der().unwrap())
  }

  #[test]
  fn print_roots_prints_decodable_entries() {
    let body = roots_body(&[
      "!!".to_owned(),
      encode(&[(Nid::COMMONNAME, "X")]),
      base64::encode(b"not a certificate"),
      encode(&[(Nid::ORGANIZATIONNAME, "A"), (Nid::ORGANIZATIONNAME, "B"), (Nid::COUNTRYNAME, "US")]),
    ]);
    let (base_uri, server) = serve_once("200 OK", body);
    let mut out = Vec::new();
    assert_eq!(print_roots(&base_uri, &mut out).unwrap(), 2);
    assert_eq!(String::from_utf8(out).unwrap(), "CN=X\nO=[A, B]; C=[US]\n");
    assert!(server.join().unwrap().starts_with("GET /ct/v1/get-roots HTTP/1.1\r\n"));
  }

  #[test]
  fn print_roots_not_json() {
    let (base_uri, server) = serve_once("200 OK", "<html>hello</html>".to_owned());
    let mut out = Vec::new();
    let err = print_roots(&base_uri, &mut out).expect_err("body is not JSON");
    assert!(matches!(err, Error::MalformedResponseBody(_)), "{:?}", err);
    assert!(out.is_empty());
    server.join().unwrap();
  }

  #[test]
  fn print_roots_ignores_status() {
    let body = roots_body(&[encode(&[(Nid::COMMONNAME, "Still listed")])]);
    let (base_uri, server) = serve_once("404 Not Found", body);
    let mut out = Vec::new();
    assert_eq!(print_roots(&base_uri, &mut out).unwrap(), 1);
    assert_eq!(String::from_utf8(out).unwrap(), "CN=Still listed\n");
    server.join().unwrap();
  }

  #[test]
  fn get_roots_keeps_order() {
    let body = roots_body(&[
      encode(&[(Nid::COMMONNAME, "second")]),
      "AAAA".to_owned(),
      encode(&[(Nid::COMMONNAME, "first")]),
    ]);
    let (base_uri, server) = serve_once("200 OK", body);
    let roots = get_roots(&base_uri).unwrap();
    let names: Vec<_> = roots.iter().map(subject_to_string).collect();
    assert_eq!(names, vec!["CN=second", "CN=first"]);
    server.join().unwrap();
  }

  #[test]
  fn print_roots_unreachable() {
    let mut out = Vec::new();
    let err = print_roots("http://127.0.0.1:1", &mut out).expect_err("nothing listens on port 1");
    assert!(matches!(err, Error::NetIO(_)), "{:?}", err);
    assert!(out.is_empty());
  }

  #[test]
  fn print_roots_empty_uri() {
    let mut out = Vec::new();
    let err = print_roots("", &mut out).expect_err("empty uri");
    assert!(matches!(err, Error::NetIO(_)), "{:?}", err);
    assert!(out.is_empty());
  }

  #[test]
  fn get_roots_unreachable() {
    assert!(matches!(get_roots("http://127.0.0.1:1"), Err(Error::NetIO(_))));
  }
}
