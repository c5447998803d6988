mod cli;
mod logging;

use libmkf::{parser::report::report_error, Grammar, Matcher, Trailing};
use std::{
    fs,
    io::{self, BufRead, Read, Write},
    path::Path,
    process::ExitCode,
};
use structopt::StructOpt;

/// Every input matched, or the grammar was dumped.
const MATCHED: u8 = 0;
/// Some input didn't match, or couldn't be read.
const NOT_MATCHED: u8 = 1;
/// The grammar can't be loaded or compiled.
const BAD_GRAMMAR: u8 = 2;

fn main() -> ExitCode {
    let options = cli::Options::from_args();
    logging::init(options.verbose);
    ExitCode::from(execute(&options))
}

fn execute(options: &cli::Options) -> u8 {
    let grammar = match load_grammar(&options.grammar_file) {
        Ok(grammar) => grammar,
        Err(message) => {
            eprint!("{}", message);
            return BAD_GRAMMAR;
        }
    };

    if options.dump {
        println!("{}", grammar);
        return MATCHED;
    }

    let trailing = if options.allow_trailing {
        Trailing::Allow
    } else {
        Trailing::Reject
    };
    let mut matcher = grammar.matcher().trailing(trailing);
    if let Some(max_depth) = options.max_depth {
        matcher = matcher.max_depth(max_depth);
    }

    match run(options, &matcher) {
        Ok(true) => MATCHED,
        Ok(false) => NOT_MATCHED,
        Err(e) => {
            eprintln!("error: {}", e);
            NOT_MATCHED
        }
    }
}

fn load_grammar(path: &Path) -> Result<Grammar, String> {
    let src = fs::read_to_string(path)
        .map_err(|e| format!("error: couldn't read {}: {}\n", path.display(), e))?;
    libmkf::compile(&src).map_err(|e| report_error(&src, &e))
}

/// Matches every input the options name. Returns whether all of them
/// matched.
fn run(options: &cli::Options, matcher: &Matcher<'_>) -> io::Result<bool> {
    let mut all_matched = true;

    for input in &options.inputs {
        all_matched &= report(options, matcher, input)?;
    }

    if let Some(path) = &options.file {
        let input = fs::read_to_string(path)?;
        all_matched &= report(options, matcher, strip_newline(&input))?;
    }

    if options.interactive {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            all_matched &= report(options, matcher, &line?)?;
        }
    } else if options.read_stdin_whole() {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        all_matched &= report(options, matcher, strip_newline(&input))?;
    }

    Ok(all_matched)
}

/// Prints the tree for `input`, or why it didn't match.
fn report(options: &cli::Options, matcher: &Matcher<'_>, input: &str) -> io::Result<bool> {
    let node = match matcher.parse(input) {
        Ok(node) => node,
        Err(e) => {
            eprintln!("{:?}: {}", input, e);
            return Ok(false);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if options.json {
        serde_json::to_writer_pretty(&mut out, &node)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", node)?;
    }
    out.flush()?;
    Ok(true)
}

fn strip_newline(input: &str) -> &str {
    let input = input.strip_suffix('\n').unwrap_or(input);
    input.strip_suffix('\r').unwrap_or(input)
}
