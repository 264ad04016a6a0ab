//! Binary entry point: parses `argv`, enumerates files, drives the
//! engine, and maps `RecsortError` to an exit code (spec §6, §7).

use recsort::cli::{self, Parsed};
use recsort::error::RecsortError;
use recsort::progress::ProgressSink;
use recsort::{externalsort, fileenum, install_interrupt_handler, new_run_context, run_all, stderr_is_terminal};

fn main() {
    std::process::exit(real_main());
}

fn real_main() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let parsed = match cli::parse(&args) {
        Ok(parsed) => parsed,
        Err(err) => {
            report_invalid_argument(&err);
            return 2;
        }
    };

    let (config, file_args) = match parsed {
        Parsed::Usage => {
            print!("{}", cli::USAGE);
            return 0;
        }
        Parsed::Run { config, files } => (config, files),
    };

    let files = match fileenum::enumerate(&file_args) {
        Ok(files) => files,
        Err(err) => {
            report_invalid_argument(&err);
            return 2;
        }
    };

    install_interrupt_handler();
    let run_ctx = new_run_context(stderr_is_terminal());
    let sorter = externalsort::default_sorter();

    match run_all(&config, &files, &run_ctx, sorter.as_ref()) {
        Ok(count) => {
            run_ctx.progress.finish();
            println!("{count} files processed.");
            0
        }
        Err(err) => {
            run_ctx.progress.finish();
            // Spec §7: all non-argument errors are a single line to
            // standard output (a preserved legacy quirk, not stderr).
            println!("{err}");
            1
        }
    }
}

fn report_invalid_argument(err: &RecsortError) {
    eprintln!("{err}");
    eprintln!("Try '/?' for usage.");
}
