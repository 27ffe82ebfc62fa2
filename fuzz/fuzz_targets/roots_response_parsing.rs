#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate ctroots;

fuzz_target!(|data: &[u8]| {
  if let Ok(response) = ctroots::internal::parse_roots(data) {
    let _ = ctroots::format_roots(&response);
  }
});
