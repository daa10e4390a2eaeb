//! A tiny program whose output is pinned by the process-harness snapshot tests.
//!
//! `--echo <text>` prints the text, `-h`/`--help` prints a one-line usage, and unknown flags
//! exit with status 2.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "example-cli-program",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Print the one-line usage.
    #[arg(short = 'h', long = "help")]
    help: bool,
    /// Text to print back.
    #[arg(long)]
    echo: Option<String>,
}

fn main() {
    let args = Args::parse();

    if args.help {
        println!(" example-cli-program [flags]");
        return;
    }

    if let Some(text) = args.echo.filter(|text| !text.is_empty()) {
        println!("{text}");
    }
}
