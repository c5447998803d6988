use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "mkf")]
pub struct Options {
    /// The path to the grammar file.
    #[structopt(name = "GRAMMAR-FILE", parse(from_os_str))]
    pub grammar_file: PathBuf,

    /// Strings to match against the grammar. When none are given (and
    /// neither `--file` nor `--interactive` is used), all of stdin is read
    /// as a single input.
    #[structopt(name = "INPUT")]
    pub inputs: Vec<String>,

    /// Read one more input from a file.
    #[structopt(short, long, parse(from_os_str))]
    pub file: Option<PathBuf>,

    /// Read inputs from stdin, one per line, matching each as it arrives.
    #[structopt(short, long)]
    pub interactive: bool,

    /// Print parse trees as JSON.
    #[structopt(long)]
    pub json: bool,

    /// Print the compiled grammar and exit.
    #[structopt(long)]
    pub dump: bool,

    /// Accept matches that leave part of the input unconsumed.
    #[structopt(long)]
    pub allow_trailing: bool,

    /// How deeply rules may nest while matching. Defaults to the library's
    /// ceiling.
    #[structopt(long)]
    pub max_depth: Option<usize>,

    /// Log more (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

impl Options {
    /// Inputs come from stdin unless they were given some other way.
    pub fn read_stdin_whole(&self) -> bool {
        self.inputs.is_empty() && self.file.is_none() && !self.interactive
    }
}
