//! WikiFilter CLI: `wikifilter <dict_path> <text_path> [thread_count]`.

use clap::Parser;
use std::time::Instant;
use wikifilter::engine::{self, Cli};
use wikifilter::error::exit_code_for;
use wikifilter::logger;

fn main() {
    logger::setup_logging(std::env::var("WIKIFILTER_VERBOSE").is_ok());
    let started = Instant::now();

    // `Cli::parse()` would exit 2 on a usage error; exit 1 for `ArgError` is wanted instead, so
    // we parse manually and print clap's own usage text before exiting with that code.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            let code = match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            std::process::exit(code);
        }
    };

    if let Err(err) = engine::run(&cli) {
        log::error!("{err:#}");
        log::debug!("failed after {:?}", started.elapsed());
        std::process::exit(exit_code_for(&err));
    }

    log::debug!("total time: {:?}", started.elapsed());
}
