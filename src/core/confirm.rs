//! core/confirm.rs
//! Yes/no gate in front of destructive file operations.
//!
//! The write path never talks to the terminal directly; it asks a `Confirm`.
//! - `ConsoleConfirm` asks on the terminal
//! - `AssumeYes` is for unattended runs (`--yes`)
//! - any `FnMut(&str) -> bool` closure works too

use dialoguer::Confirm as Prompt;

use super::error::{Error, Result};

pub trait Confirm {
    /// `Ok(true)` to proceed, `Ok(false)` to cancel.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(self(prompt))
    }
}

/// Interactive terminal prompt. Enter without an answer means "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleConfirm;

impl Confirm for ConsoleConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Prompt::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(prompt_error)
    }
}

fn prompt_error(e: dialoguer::Error) -> Error {
    match e {
        dialoguer::Error::IO(source) => Error::io("Error reading input from", "<stdin>", source),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Ask, and turn a "no" into `Error::Cancelled`.
pub(crate) fn require(confirm: &mut dyn Confirm, prompt: &str) -> Result<()> {
    if confirm.confirm(prompt)? {
        Ok(())
    } else {
        Err(Error::Cancelled)
    }
}
