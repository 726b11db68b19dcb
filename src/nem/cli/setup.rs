use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nem", bin_name = "nem", version)]
#[command(
    about = "Mnemonic shortcuts for shell commands",
    long_about = None,
    after_help = "Run `nem /h` for the list of operations."
)]
pub struct Cli {
    /// More log output on stderr (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, help_heading = "Options")]
    pub verbose: u8,

    /// Print the resolved command instead of running it
    #[arg(short = 'n', long, help_heading = "Options")]
    pub dry_run: bool,

    /// Use this root nem file instead of the configured one
    #[arg(long, value_name = "FILE", help_heading = "Options")]
    pub root: Option<PathBuf>,

    /// A code followed by its arguments, or a /<resource><action> operation
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
