//! Console Interaction
//!
//! The menu and the deletion workflow talk to the user only through the
//! [`Console`] trait. [`TerminalConsole`] backs it with `dialoguer` prompts on
//! stdin/stdout.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

use crate::error::Result;
use crate::output::Message;

/// User-facing input and output
pub trait Console {
    /// Pick one of `items`, returning its index
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize>;

    /// Read a line of text
    fn input(&mut self, prompt: &str) -> Result<String>;

    /// Ask a yes/no question; the default answer is no
    fn confirm(&mut self, prompt: &str) -> Result<bool>;

    /// Show a classified message
    fn show(&mut self, message: &Message);

    /// Show a block of pre-formatted text, such as a rendered table
    fn print(&mut self, text: &str);
}

/// Interactive terminal console
pub struct TerminalConsole {
    theme: ColorfulTheme,
}

impl TerminalConsole {
    #[must_use]
    pub fn new() -> Self {
        Self { theme: ColorfulTheme::default() }
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for TerminalConsole {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<usize> {
        Ok(Select::with_theme(&self.theme).with_prompt(prompt).items(items).default(0).interact()?)
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme).with_prompt(prompt).interact_text()?)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme).with_prompt(prompt).default(false).interact()?)
    }

    fn show(&mut self, message: &Message) {
        println!("{message}");
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}
