use std::env;
use std::process;

use tiered_dispatch::{cli, logging};

fn main() {
    logging::init_logging();
    let args: Vec<String> = env::args().collect();
    process::exit(cli::run_with_args(&args));
}
