mod logger;
mod options;
mod workloads;

use crate::logger::StderrLogger;
use crate::options::Options;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let options = Options::parse();

    if options.list {
        for w in &workloads::ALL {
            println!("{:<12} {}", w.name, w.title);
        }
        return ExitCode::SUCCESS;
    }

    if let Err(e) = StderrLogger::new(options.level()).init() {
        eprintln!("pagesim: {e}");
    }

    let mut failed = 0;
    for workload in options.selected() {
        println!("\n=== TEST: {} ===", workload.title);
        let outcome = workload.run();
        for (ok, what) in outcome.checks.iter() {
            println!("  {}: {what}", if ok { "PASS" } else { "FAIL" });
        }
        println!("\n{}", outcome.stats);
        failed += outcome.checks.failed();
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        eprintln!("pagesim: {failed} check(s) failed");
        ExitCode::FAILURE
    }
}
