use std::process::ExitCode;

use tracing::Level;
use xbeam_io::SimulationManager;

fn usage() {
    eprintln!("usage: xbeam-cli -c <config.json> [-v]");
    eprintln!();
    eprintln!("  -c, --config <file>   run configuration (JSON)");
    eprintln!("  -v, --verbose         log assembly and stepping details");
}

struct Args {
    config: String,
    verbose: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let mut config = None;
    let mut verbose = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => config = Some(args.next()?),
            "-v" | "--verbose" => verbose = true,
            _ => return None,
        }
    }
    Some(Args {
        config: config?,
        verbose,
    })
}

fn main() -> ExitCode {
    let Some(args) = parse_args(std::env::args().skip(1)) else {
        usage();
        return ExitCode::from(2);
    };

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let result = SimulationManager::from_config_file(&args.config)
        .and_then(|mut manager| manager.run());
    if let Err(err) = result {
        eprintln!("error: {err}");
        return ExitCode::from(1);
    }
    println!("Analysis completed.");
    ExitCode::SUCCESS
}
