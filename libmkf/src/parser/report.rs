use super::space;
use crate::fault::{GrammarErr, SyntaxErr};
use std::fmt;

/// Renders a compilation error against the grammar source it came from:
/// the message, the offending line in a gutter and, for tokenizer failures,
/// a caret under the column that couldn't be lexed.
pub fn report_error(src: &str, err: &GrammarErr) -> String {
    Report { src, err }.to_string()
}

struct Report<'a> {
    src: &'a str,
    err: &'a GrammarErr,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.err {
            GrammarErr::Syntax { line, kind } => {
                let text = self.src.split('\n').nth(*line).unwrap_or("").trim_end();

                // Tabs are shown as four spaces so the caret lines up.
                let (indent, rest) = match space::indentation(text) {
                    Ok((rest, _)) => (4, rest),
                    Err(_) => (0, text),
                };

                writeln!(f, "error: {}", kind)?;
                writeln!(f, "{space:4}|", space = "")?;
                writeln!(
                    f,
                    "{line_number:<4}| {pad:indent$}{rest}",
                    line_number = line,
                    pad = "",
                    indent = indent,
                    rest = rest,
                )?;
                match kind {
                    SyntaxErr::Tokenize { column } => {
                        let chars = rest.get(..*column).map_or(*column, |s| s.chars().count());
                        writeln!(
                            f,
                            "{space:4}| {caret:>col$}",
                            space = "",
                            caret = '^',
                            col = indent + chars + 1,
                        )
                    }
                    _ => writeln!(f, "{space:4}|", space = ""),
                }
            }
            GrammarErr::RuleNotFound { rule_name } => {
                writeln!(f, "error: {}", self.err)?;
                writeln!(
                    f,
                    "{space:4}= `{rule}` is referenced but never declared",
                    space = "",
                    rule = rule_name,
                )
            }
        }
    }
}
