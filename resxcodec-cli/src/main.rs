use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use resxcodec::convert_auto;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The input file to convert (.json or .resx)
    input: PathBuf,

    /// The output file to write (.resx or .json)
    output: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let input = full_path(&args.input);
    let output = full_path(&args.output);
    println!("Input: {}, Output: {}", input.display(), output.display());

    match convert_auto(&input, &output) {
        Ok(conversion) => {
            println!(
                "Successfully converted {}: {}",
                conversion,
                output.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn full_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
