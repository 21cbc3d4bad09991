//! Paging scheduler simulator - Main Entry Point
//!
//! Usage: paging_sim [OPTIONS] <frames> <quantum> <process_file>...
//!
//! Arguments:
//!   frames        - Number of frames (F) in user memory
//!   quantum       - Round Robin time quantum (Q)
//!   process_file  - One file per process: `name: X; page: n; ... end;`
//!
//! Options:
//!   -v, --verbose   Log scheduling decisions to stderr (repeat for more)
//!   --policy <p>    local, global or both (default: both)
//!   --json          Print results as JSON instead of tables
//!   --trace         Print the tick-by-tick event trace to stderr
//!   -o, --output    Also write the results to a file

mod logger;

use std::process;

use anyhow::{Context, Result, bail};
use clap::{App, Arg};

use paging_sim::io::{load_processes, write_results};
use paging_sim::report::{render_json, render_tables};
use paging_sim::simulation::{PolicyKind, SimConfig, run_policies};

/// Command-line configuration
struct Config {
    frames: usize,
    quantum: u32,
    files: Vec<String>,
    policies: Vec<PolicyKind>,
    json: bool,
    trace: bool,
    output: Option<String>,
    verbosity: u64,
}

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = logger::init(config.verbosity) {
        eprintln!("Warning: logger unavailable: {}", e);
    }

    // Run the simulation and handle any errors
    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn parse_args() -> Result<Config> {
    let matches = App::new("paging_sim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Round Robin scheduling over demand-paged memory with FIFO page replacement")
        .arg(
            Arg::with_name("frames")
                .help("Number of frames (F) in user memory")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("quantum")
                .help("Round Robin time quantum (Q)")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::with_name("process_file")
                .help("Process description files, one per process")
                .required(true)
                .multiple(true)
                .index(3),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log scheduling decisions to stderr"),
        )
        .arg(
            Arg::with_name("policy")
                .long("policy")
                .takes_value(true)
                .possible_values(&["local", "global", "both"])
                .default_value("both")
                .help("Replacement policy to simulate"),
        )
        .arg(Arg::with_name("json").long("json").help("Print results as JSON"))
        .arg(Arg::with_name("trace").long("trace").help("Print the event trace to stderr"))
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Also write the results to this file"),
        )
        .get_matches();

    let frames: usize = matches
        .value_of("frames")
        .unwrap_or_default()
        .parse()
        .context("frames must be a non-negative integer")?;
    let quantum: u32 = matches
        .value_of("quantum")
        .unwrap_or_default()
        .parse()
        .context("quantum must be a non-negative integer")?;

    let policies = match matches.value_of("policy").unwrap_or("both") {
        "both" => PolicyKind::ALL.to_vec(),
        other => vec![other.parse::<PolicyKind>().map_err(anyhow::Error::msg)?],
    };

    let files = matches
        .values_of("process_file")
        .map(|values| values.map(String::from).collect())
        .unwrap_or_default();

    Ok(Config {
        frames,
        quantum,
        files,
        policies,
        json: matches.is_present("json"),
        trace: matches.is_present("trace"),
        output: matches.value_of("output").map(String::from),
        verbosity: matches.occurrences_of("verbose"),
    })
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> Result<()> {
    // Step 1: Read process descriptions, dropping any that fail to load
    // (excluded files are already logged as warnings). Configuration
    // errors such as the page limit abort here.
    let loaded = load_processes(&config.files)?;
    if loaded.descriptors.is_empty() {
        bail!("no valid process files given ({} excluded)", loaded.excluded.len());
    }

    // Step 2: Simulate each requested policy
    let sim = SimConfig::new(config.frames, config.quantum);
    let outputs = run_policies(&config.policies, &loaded.descriptors, sim, config.trace)?;

    if config.trace {
        for output in &outputs {
            eprintln!("=== {} ===", output.report.policy);
            for event in &output.events {
                eprintln!("{}", event);
            }
        }
    }

    // Step 3: Render and emit results
    let reports: Vec<_> = outputs.into_iter().map(|o| o.report).collect();
    let rendered = if config.json {
        render_json(&reports).context("failed to serialize results")? + "\n"
    } else {
        render_tables(&reports)
    };
    print!("{}", rendered);

    if let Some(path) = &config.output {
        write_results(path, &rendered)?;
    }

    Ok(())
}
