use anyhow::Result;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use crate::helper::{CliHelper, QUIT};

/// Source of participant input.
pub trait LineInput {
    /// Reads one line. `None` means input has ended.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Offers the labels of the current choice question for completion.
    fn set_choices(&mut self, _choices: Vec<String>) {}
}

impl LineInput for Editor<CliHelper, DefaultHistory> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C leaves the survey; the snapshot keeps the progress
            Err(ReadlineError::Interrupted) => Ok(Some(QUIT.to_string())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_choices(&mut self, choices: Vec<String>) {
        if let Some(helper) = self.helper_mut() {
            helper.set_choices(choices);
        }
    }
}
