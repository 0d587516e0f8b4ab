//! NEM Vanity Address Generator CLI
//!
//! Usage:
//!   nem_vanity foo                        # Find addresses containing "FOO"
//!   nem_vanity -n 3 --network testnet bar # Find 3 testnet addresses containing "BAR"
//!   nem_vanity --test-file testkeys.dat   # Verify key derivation against a file

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{debug, error, info, warn};

use nem_vanity::{
    self_test, Config, ConfigError, ConsoleSink, NemAddressEncoder, NemKeyDeriver, Needle,
    Reporter, Verifier, WorkerEvent, WorkerPool,
};

const EXIT_USAGE: i32 = 1;
const EXIT_INVALID_NEEDLE: i32 = 2;
const EXIT_SELF_TEST: i32 = 3;
const EXIT_TEST_FILE: i32 = 4;
const EXIT_SEARCH_ABORTED: i32 = 5;

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let config = match Config::try_parse() {
        Ok(config) => config,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            let _ = e.print();
            return code;
        }
    };

    init_logging(config.verbose);

    if config.is_empty() {
        let _ = Config::command().print_help();
        return 0;
    }

    let needle = match config.validate() {
        Ok(needle) => needle,
        Err(e) => {
            error!("Configuration error: {}", e);
            return match e {
                ConfigError::InvalidNeedle(_) => EXIT_INVALID_NEEDLE,
                _ => EXIT_USAGE,
            };
        }
    };

    let deriver = NemKeyDeriver::new();
    let encoder = NemAddressEncoder::new(config.network);
    let mut reporter = Reporter::new(ConsoleSink::new());

    if config.skip_self_test {
        warn!("built-in self-test skipped");
    } else if let Err(e) = self_test(deriver, &mut reporter) {
        error!("Self-test failed: {}", e);
        return EXIT_SELF_TEST;
    }

    if let Some(path) = &config.test_file {
        let verifier = Verifier::new(deriver, encoder);
        return match verifier.verify_file(path, &mut reporter) {
            Ok(_) => 0,
            Err(e) => {
                reporter.end_status_line();
                error!(verified = e.verified(), "Test file verification failed: {}", e);
                EXIT_TEST_FILE
            }
        };
    }

    match needle {
        Some(needle) => search(&config, needle, deriver, encoder, &mut reporter),
        None => 0,
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn search(
    config: &Config,
    needle: Needle,
    deriver: NemKeyDeriver,
    encoder: NemAddressEncoder,
    reporter: &mut Reporter<ConsoleSink>,
) -> i32 {
    reporter.line("NEM Vanity Address Generator");
    reporter.line("============================");
    reporter.line(&format!("Needle:     {}", needle));
    let network = encoder.network();
    reporter.line(&format!(
        "Network:    {} (addresses start with {})",
        network,
        network.prefix()
    ));
    reporter.line(&format!("Difficulty: {}", needle.difficulty_description()));
    reporter.line(&format!("Workers:    {}", config.worker_count()));
    if config.count > 0 {
        reporter.line(&format!("Target:     {} address(es)", config.count));
    } else {
        reporter.line("Target:     unlimited");
    }
    reporter.line("");

    let mut pool = match WorkerPool::new(config.worker_count(), needle, deriver, encoder) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to spawn worker threads: {}", e);
            return EXIT_SEARCH_ABORTED;
        }
    };

    ctrlc_handler(pool.stop_flag_clone());

    reporter.line("Searching... (Press Ctrl+C to stop)");

    let report_interval = Duration::from_secs(config.report_interval);
    let mut found = 0;
    let mut exit_code = 0;
    let mut target_reached = false;

    while !pool.is_stopped() {
        match pool.wait_for_event(report_interval) {
            Some(WorkerEvent::Found(result)) => {
                found += 1;
                debug!(worker = result.worker_id, position = result.position, "match");
                reporter.found(&result);

                if config.count > 0 && found >= config.count {
                    target_reached = true;
                    break;
                }
            }
            Some(WorkerEvent::Failed { worker_id, error }) => {
                reporter.end_status_line();
                error!(worker = worker_id, "Search aborted: {}", error);
                exit_code = EXIT_SEARCH_ABORTED;
                break;
            }
            None => reporter.progress(pool.total_keys(), pool.elapsed()),
        }
    }

    // A worker that fails raises the stop flag before its event arrives.
    for event in pool.stop_and_drain() {
        match event {
            WorkerEvent::Found(result) if !target_reached && exit_code == 0 => {
                found += 1;
                reporter.found(&result);
            }
            WorkerEvent::Found(_) => {}
            WorkerEvent::Failed { worker_id, error } => {
                reporter.end_status_line();
                error!(worker = worker_id, "Search aborted: {}", error);
                exit_code = EXIT_SEARCH_ABORTED;
            }
        }
    }

    if target_reached {
        reporter.line(&format!("Target reached! Found {} address(es).", found));
    } else if exit_code == 0 {
        reporter.line("Stopped by user.");
    }

    reporter.line("");
    reporter.line("--- Final Statistics ---");
    reporter.line(&format!("Total keys generated: {}", format_number(pool.total_keys())));
    reporter.line(&format!("Total matches found:  {}", found));
    reporter.line(&format!("Time elapsed:         {:.2}s", pool.elapsed().as_secs_f64()));
    reporter.line(&format!(
        "Average speed:        {}/s",
        format_number(pool.keys_per_second() as u64)
    ));
    info!(tried = pool.total_keys(), found, "search finished");

    exit_code
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    }) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }
}
