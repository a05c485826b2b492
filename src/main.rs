use std::{env, process, time::Instant};

use serde::Serialize;
use tramp::{
    runtime::trampoline::{RunStats, Trampoline},
    workloads::Workload,
};

const DEFAULT_STEPS: u64 = 1_000_000;

#[derive(Debug, Serialize)]
struct Report {
    workload: Workload,
    steps: u64,
    result: Option<u64>,
    fault: Option<String>,
    elapsed_micros: u128,
    stats: RunStats,
}

fn main() {
    let mut args: Vec<String> = env::args().collect();
    let trace = args.iter().any(|arg| arg == "--trace");
    let show_stats = args.iter().any(|arg| arg == "--stats");
    let json = args.iter().any(|arg| arg == "--json");
    if trace {
        args.retain(|arg| arg != "--trace");
    }
    if show_stats {
        args.retain(|arg| arg != "--stats");
    }
    if json {
        args.retain(|arg| arg != "--json");
    }
    let steps = match extract_steps(&mut args) {
        Some(value) => value,
        None => process::exit(1),
    };

    init_logging(trace);

    if args.len() < 2 {
        print_help();
        return;
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => print_help(),
        "list" => {
            for workload in Workload::ALL {
                println!("{}", workload);
            }
        }
        "all" => {
            for workload in Workload::ALL {
                run_workload(workload, steps, trace, show_stats, json);
            }
        }
        name => match name.parse::<Workload>() {
            Ok(workload) => run_workload(workload, steps, trace, show_stats, json),
            Err(err) => {
                eprintln!("Error: {}", err);
                eprintln!("Run `tramp list` to see the available workloads.");
                process::exit(1);
            }
        },
    }
}

fn init_logging(trace: bool) {
    let default_filter = if trace { "trace" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run_workload(workload: Workload, steps: u64, trace: bool, show_stats: bool, json: bool) {
    let effect = workload.build(steps);
    let mut trampoline = if workload.nests_statically() {
        Trampoline::with_capacity(usize::try_from(steps).unwrap_or(0).saturating_add(1))
    } else {
        Trampoline::new()
    };
    trampoline.set_trace(trace);

    let start = Instant::now();
    let outcome = trampoline.run(&effect);
    let elapsed = start.elapsed();

    let report = Report {
        workload,
        steps,
        result: outcome.as_ref().ok().copied(),
        fault: outcome.as_ref().err().map(|fault| fault.to_string()),
        elapsed_micros: elapsed.as_micros(),
        stats: *trampoline.stats(),
    };

    if json {
        match serde_json::to_string(&report) {
            Ok(line) => println!("{}", line),
            Err(err) => {
                eprintln!("Error: failed to serialize report: {}", err);
                process::exit(1);
            }
        }
    } else {
        match &outcome {
            Ok(value) => println!("{}: {} ({:.2?})", workload, value, elapsed),
            Err(fault) => println!("{}: fault: {} ({:.2?})", workload, fault, elapsed),
        }
        if show_stats {
            println!("{}", report.stats);
        }
    }

    if outcome.is_err() {
        process::exit(1);
    }
}

fn extract_steps(args: &mut Vec<String>) -> Option<u64> {
    let mut steps = DEFAULT_STEPS;
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--steps" {
            if i + 1 >= args.len() {
                eprintln!("Usage: tramp <workload> --steps <n>");
                return None;
            }
            let value = args.remove(i + 1);
            args.remove(i);
            match value.replace('_', "").parse::<u64>() {
                Ok(parsed) => {
                    steps = parsed;
                }
                Err(_) => {
                    eprintln!("Error: --steps expects a non-negative integer.");
                    return None;
                }
            }
            continue;
        }
        i += 1;
    }
    Some(steps)
}

fn print_help() {
    println!(
        "\
tramp: stack-safe effect runtime workloads

Usage:
  tramp <workload> [--steps <n>]
  tramp all [--steps <n>]
  tramp list

Workloads:
  bind-loop       sequential and_then loop, built one step at a time
  map-chain       <n> maps nested on one opaque step
  apply-chain     <n> nested apply_with nodes
  for-range       host for loop over 0..<n>
  repeat-until    host loop re-running a condition

Flags:
  --steps <n>     Number of steps to count (default: 1000000)
  --trace         Log every interpreter transition (very verbose)
  --stats         Print work-stack counters after each run
  --json          Print one JSON report per run
  -h, --help      Show this help message

Logging honours RUST_LOG (default: warn, or trace with --trace).
"
    );
}
