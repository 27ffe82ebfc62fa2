use std::io;

use clap::Parser;
use ctroots::Error;
use log::info;

#[derive(Parser)]
#[command(name = "ctroots", version, about, long_about = None)]
struct Args {
  /// Base URI of the CT log, e.g. https://ct.googleapis.com/logs/argon2020
  #[arg(long, value_name = "URI", default_value = "")]
  log: String,
}

fn main() {
  env_logger::init();
  let args = Args::parse();

  let stdout = io::stdout();
  let mut out = stdout.lock();
  match ctroots::print_roots(&args.log, &mut out) {
    Ok(nb_roots) => info!("Listed {} roots of {:?}", nb_roots, &args.log),
    Err(e) => match e {
      Error::NetIO(_) => eprintln!("failed to get CT log roots: {}", &e),
      Error::ReadBody(_) => eprintln!("failed to read CT log roots response: {}", &e),
      Error::MalformedResponseBody(_) => eprintln!("failed to parse CT log roots response: {}", &e),
      _ => eprintln!("{}", &e),
    },
  }
}
