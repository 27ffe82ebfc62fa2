//! Things that are only useful if you are doing your own API calling.

use log::{trace, warn};

use crate::{jsons, Error};

/// How much of a response body ends up in logs and error messages.
const PREVIEW_LEN: usize = 150;

/// Construct a new [reqwest::blocking::Client](reqwest::blocking::Client) to be
/// used with the functions in this module. You don't necessary need to use this.
///
/// Redirects are followed (up to reqwest's default limit of 10). Timeouts are
/// left at reqwest's defaults.
pub fn new_http_client() -> Result<reqwest::blocking::Client, Error> {
  let mut def_headers = reqwest::header::HeaderMap::new();
  def_headers.insert("User-Agent", reqwest::header::HeaderValue::from_static("rust-ctroots"));
  match reqwest::blocking::Client::builder()
      .gzip(true)
      .default_headers(def_headers)
      .build() {
    Ok(r) => Ok(r),
    Err(e) => Err(Error::Unknown(format!("{}", &e)))
  }
}

/// The `get-roots` endpoint of a log.
///
/// This is a plain concatenation: `log_uri` is not parsed or normalized, so a
/// trailing `/` results in `//ct/v1/get-roots`.
///
/// # Example:
/// ```rust
/// # use ctroots::internal::roots_url;
/// assert_eq!(roots_url("https://ct.googleapis.com/logs/argon2020"), "https://ct.googleapis.com/logs/argon2020/ct/v1/get-roots");
/// ```
pub fn roots_url(log_uri: &str) -> String {
  format!("{}/ct/v1/get-roots", log_uri)
}

/// Perform a GET request and read the whole body.
///
/// The status code is not checked: a non-2xx response is logged, and its body is
/// returned like any other.
pub fn fetch_body(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<u8>, Error> {
  let response = client.get(url).send().map_err(Error::NetIO)?;
  let status = response.status();
  if !status.is_success() {
    warn!("GET {} -> {}", url, status);
  }
  let body = response.bytes().map_err(Error::ReadBody)?;
  trace!("GET {} -> {} ({} bytes) {:?}", url, status, body.len(), preview(&body));
  Ok(body.to_vec())
}

/// Parse a `get-roots` response body.
pub fn parse_roots(body: &[u8]) -> Result<jsons::GetRoots, Error> {
  serde_json::from_slice(body).map_err(|e| Error::MalformedResponseBody(format!("Unable to decode JSON: {} (response is {:?})", &e, preview(body))))
}

/// Fetch and parse the root list of the log at `log_uri`, using a fresh client.
pub fn get_roots_response(log_uri: &str) -> Result<jsons::GetRoots, Error> {
  let client = new_http_client()?;
  let body = fetch_body(&client, &roots_url(log_uri))?;
  let response = parse_roots(&body)?;
  trace!("{} accepts {} roots", log_uri, response.certificates.len());
  Ok(response)
}

fn preview(body: &[u8]) -> String {
  let text = String::from_utf8_lossy(body);
  if text.chars().count() > PREVIEW_LEN {
    format!("{}...", text.chars().take(PREVIEW_LEN).collect::<String>())
  } else {
    text.into_owned()
  }
}
