#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate ctroots;

fuzz_target!(|data: &[u8]| {
  if let Ok(encoded) = std::str::from_utf8(data) {
    if let Ok(cert) = ctroots::roots::decode_root(encoded) {
      let _ = ctroots::subject_to_string(&cert);
    }
  }
});
