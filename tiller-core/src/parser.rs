//! Command-line grammar: `<command-name> [#<element-id>] [<args>...]`.
//!
//! The command name is matched case-insensitively (normalized to lower
//! case); the element id and arguments pass through verbatim. A
//! double-quoted run is one argument with the quotes stripped; any other
//! maximal run of non-whitespace is one argument.

use regex::Regex;
use std::sync::OnceLock;

/// A parsed command, constructed per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Lower-cased command name.
    pub name: String,
    /// Element id given after `#`, verbatim.
    pub target: Option<String>,
    /// Positional arguments, verbatim (quotes stripped).
    pub args: Vec<String>,
}

fn head_pattern() -> &'static Regex {
    static HEAD: OnceLock<Regex> = OnceLock::new();
    HEAD.get_or_init(|| {
        Regex::new(r"^(\S+)(?:\s+#(\S+))?(.*)$").expect("command grammar is a valid pattern")
    })
}

fn arg_pattern() -> &'static Regex {
    static ARG: OnceLock<Regex> = OnceLock::new();
    ARG.get_or_init(|| Regex::new(r#""[^"]*"|\S+"#).expect("argument grammar is a valid pattern"))
}

/// Parse one command line. Returns `None` for input that does not match the
/// minimal `<command-name>` shape (empty or whitespace-only included); no
/// partial result is ever produced.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let captures = head_pattern().captures(trimmed)?;
    let name = captures.get(1)?.as_str().to_lowercase();
    let target = captures.get(2).map(|m| m.as_str().to_string());
    let rest = captures.get(3).map(|m| m.as_str().trim()).unwrap_or("");

    let args = arg_pattern()
        .find_iter(rest)
        .map(|m| m.as_str().trim_matches('"').to_string())
        .collect();

    Some(ParsedCommand { name, target, args })
}
