//! Structs for parsing server response.

use serde::Deserialize;

/// Response of `ct/v1/get-roots`. Each certificate is a base64 encoded DER.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct GetRoots {
  #[serde(default)]
  pub certificates: Vec<String>,
}
