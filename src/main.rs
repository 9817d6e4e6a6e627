//! Host-side testbench for the image loader.
//!
//! Runs every loader scenario against a simulated volume and exits with a
//! non-zero status if any check failed.
#![forbid(unsafe_code)]

use std::process::ExitCode;

mod logger;
mod testbench;

fn main() -> ExitCode {
    logger::init();

    let report = testbench::run();

    println!();
    println!("==== TEST SUMMARY ====");
    println!("Passed: {}", report.passed());
    println!("Failed: {}", report.failed());

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
