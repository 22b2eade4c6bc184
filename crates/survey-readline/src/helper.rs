use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

pub const BACK: &str = "/back";
pub const QUIT: &str = "/quit";
pub const SKIP: &str = "/skip";
pub const HINT: &str = "/hint";

/// Completion, highlighting, and hints for the survey prompts.
///
/// Commands start with `/`. The labels of the choice question currently
/// on screen complete as well.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    choices: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: [BACK, QUIT, SKIP, HINT].iter().map(|c| c.to_string()).collect(),
            choices: Vec::new(),
        }
    }

    pub fn set_choices(&mut self, choices: Vec<String>) {
        self.choices = choices;
    }

    fn candidates<'a>(&'a self, line: &str) -> impl Iterator<Item = &'a String> + 'a {
        let source = if line.starts_with('/') {
            &self.commands
        } else {
            &self.choices
        };
        let prefix = line.to_lowercase();
        source
            .iter()
            .filter(move |c| !prefix.is_empty() && c.to_lowercase().starts_with(&prefix))
    }
}

impl Default for CliHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .candidates(&line[..pos])
            .map(|c| Pair {
                display: c.clone(),
                replacement: c.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && line.contains(' ') {
            return None;
        }
        self.candidates(line)
            .find(|c| c.len() > line.len())
            .and_then(|c| c.get(line.len()..))
            .map(|rest| rest.to_string())
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_complete_on_slash() {
        let helper = CliHelper::new();
        let found: Vec<_> = helper.candidates("/b").collect();
        assert_eq!(found, vec![BACK]);
    }

    #[test]
    fn test_choices_complete_case_insensitively() {
        let mut helper = CliHelper::new();
        helper.set_choices(vec!["Engineer".to_string(), "Other".to_string()]);

        let found: Vec<_> = helper.candidates("eng").collect();
        assert_eq!(found, vec!["Engineer"]);
        assert_eq!(helper.candidates("").count(), 0);
    }
}
