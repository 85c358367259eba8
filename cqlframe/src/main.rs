use std::io::{self, IsTerminal, Read};
use std::path::Path;

use cqlframe::{Error as FrameError, FrameOptions, FrameRequest};

#[allow(clippy::print_stdout)]
fn print_help() {
    const NAME: &str = env!("CARGO_PKG_NAME");
    const VER: &str = env!("CARGO_PKG_VERSION");
    println!("{} version {}", NAME, VER);
    println!();
    println!("Reads a frame request as JSON and prints the resulting frame.");
    println!("The request is {{\"query\": {{...}}, \"result\": {{\"columns\": [...], \"rows\": [...]}}}}.");
    println!();
    println!("Command-line options:");
    println!("  --file PATH           Read the request from PATH instead of stdin");
    println!("  --frame-name NAME     Name of the produced frame (default: response)");
    println!("  --time-field NAME     Field preferred for time sorting (default: time)");
    println!("  --max-depth N         Nesting limit for composite values (default: 64)");
    println!("  --help                Show this usage information");
}

fn read_request<R: Read>(mut reader: R) -> Result<FrameRequest, FrameError> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|e| FrameError::Internal(format!("failed to read request: {}", e)))?;
    FrameRequest::from_json(&buf)
}

fn read_request_file(path: &Path) -> Result<FrameRequest, FrameError> {
    let file = std::fs::File::open(path)
        .map_err(|e| FrameError::Internal(format!("failed to open {}: {}", path.display(), e)))?;
    read_request(io::BufReader::new(file))
}

#[allow(clippy::print_stdout, clippy::print_stderr)]
fn run(request: &FrameRequest, options: &FrameOptions) -> Result<(), FrameError> {
    let frame = request.build(options)?;
    println!("{}", frame.to_pretty_string()?);
    println!(
        "frame '{}': {} rows, {} fields, visualization {}",
        frame.name,
        frame.num_rows(),
        frame.num_fields(),
        frame.meta.preferred_visualization.as_str()
    );
    for notice in frame.notices() {
        eprintln!("{}: {}", notice.severity, notice.text);
    }
    Ok(())
}

#[allow(clippy::print_stderr)]
fn main() {
    let mut args = std::env::args().skip(1);
    let mut options = FrameOptions::default();
    let mut file: Option<String> = None;

    while let Some(arg) = args.next() {
        let mut value_for = |flag: &str| {
            args.next().unwrap_or_else(|| {
                eprintln!("{} requires a value", flag);
                std::process::exit(1);
            })
        };
        match arg.as_str() {
            "--file" => file = Some(value_for("--file")),
            "--frame-name" => options.frame_name = value_for("--frame-name"),
            "--time-field" => options.time_field = value_for("--time-field"),
            "--max-depth" => {
                let raw = value_for("--max-depth");
                options.max_depth = raw.parse().unwrap_or_else(|_| {
                    eprintln!("--max-depth expects a number, got {}", raw);
                    std::process::exit(1);
                });
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            other => {
                eprintln!("Unrecognized argument: {}", other);
                print_help();
                std::process::exit(1);
            }
        }
    }

    let request = match &file {
        Some(path) => read_request_file(Path::new(path)),
        None if !io::stdin().is_terminal() => read_request(io::stdin()),
        None => {
            print_help();
            std::process::exit(1);
        }
    };

    let result = request.and_then(|request| run(&request, &options));
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
