//! Reading and printing certificate subjects.

use std::fmt;

use log::trace;
use openssl::nid::Nid;
use openssl::x509::{X509NameRef, X509Ref};

/// The parts of a distinguished name we care about.
///
/// A subject may carry several values for the same attribute; all of them are
/// kept, in certificate order. Only one common name is kept (the last one), the
/// way most tools present it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectName {
  pub common_name: Option<String>,
  pub organization: Vec<String>,
  pub organizational_unit: Vec<String>,
  pub locality: Vec<String>,
  pub province: Vec<String>,
  pub country: Vec<String>,
}

impl SubjectName {
  pub fn from_x509_name(name: &X509NameRef) -> Self {
    SubjectName {
      common_name: entries_by_nid(name, Nid::COMMONNAME).pop(),
      organization: entries_by_nid(name, Nid::ORGANIZATIONNAME),
      organizational_unit: entries_by_nid(name, Nid::ORGANIZATIONALUNITNAME),
      locality: entries_by_nid(name, Nid::LOCALITYNAME),
      province: entries_by_nid(name, Nid::STATEORPROVINCENAME),
      country: entries_by_nid(name, Nid::COUNTRYNAME),
    }
  }

  /// Read the subject of a certificate.
  pub fn from_cert<R: AsRef<X509Ref>>(cert: &R) -> Self {
    Self::from_x509_name(cert.as_ref().subject_name())
  }
}

/// Formats as `CN=<cn>; O=[..]; OU=[..]; L=[..]; ST=[..]; C=[..]`, leaving out
/// absent attributes. A subject with none of them prints as `???`.
impl fmt::Display for SubjectName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut out: Vec<String> = Vec::new();
    if let Some(cn) = self.common_name.as_ref().filter(|cn| !cn.is_empty()) {
      out.push(format!("CN={}", cn));
    }
    let multi_valued = [
      ("O", &self.organization),
      ("OU", &self.organizational_unit),
      ("L", &self.locality),
      ("ST", &self.province),
      ("C", &self.country),
    ];
    for &(tag, values) in multi_valued.iter() {
      if !values.is_empty() {
        out.push(format!("{}=[{}]", tag, values.join(", ")));
      }
    }
    if out.is_empty() {
      return f.write_str("???");
    }
    f.write_str(&out.join("; "))
  }
}

/// One line summary of the subject of `cert`.
pub fn subject_to_string<R: AsRef<X509Ref>>(cert: &R) -> String {
  SubjectName::from_cert(cert).to_string()
}

fn entries_by_nid(name: &X509NameRef, nid: Nid) -> Vec<String> {
  name.entries_by_nid(nid).filter_map(|entry| {
    // Interior NULs are kept as they are.
    match entry.data().to_string() {
      Ok(s) => Some(s),
      Err(e) => {
        // Not convertible to UTF-8; leave it out.
        trace!("Dropping value of nid {}: {}", nid.as_raw(), e);
        None
      }
    }
  }).collect()
}

/// Build a throwaway self-signed certificate with the given subject.
#[cfg(test)]
pub(crate) fn self_signed(subject: &[(Nid, &str)]) -> openssl::x509::X509 {
  use openssl::asn1::Asn1Time;
  use openssl::ec::{EcGroup, EcKey};
  use openssl::hash::MessageDigest;
  use openssl::pkey::PKey;
  use openssl::x509::{X509Builder, X509NameBuilder};

  let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
  let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();
  let mut name = X509NameBuilder::new().unwrap();
  for &(nid, value) in subject.iter() {
    name.append_entry_by_nid(nid, value).unwrap();
  }
  let name = name.build();
  let mut builder = X509Builder::new().unwrap();
  builder.set_version(2).unwrap();
  builder.set_subject_name(&name).unwrap();
  builder.set_issuer_name(&name).unwrap();
  builder.set_pubkey(&key).unwrap();
  builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
  builder.set_not_after(&Asn1Time::days_from_now(1).unwrap()).unwrap();
  builder.sign(&key, MessageDigest::sha256()).unwrap();
  builder.build()
}
