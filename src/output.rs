//! Console Message Types
//!
//! Every line the tool reports (outside of rendered tables) is a [`Message`]
//! tagged with a [`MessageClass`], so the terminal front end can present each
//! class consistently.
//!
//! # Output Contract
//! - Info, success and cancelled messages print as-is
//! - Warnings print as `WARNING: <text>`
//! - Errors print as `ERROR: <text>`

use serde::Serialize;

use crate::error::RosterError;

/// Presentation class of a console message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageClass {
    Info,
    Warning,
    Success,
    Cancelled,
    Error,
}

impl MessageClass {
    /// Prefix printed before the message text
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Warning => "WARNING: ",
            Self::Error => "ERROR: ",
            Self::Info | Self::Success | Self::Cancelled => "",
        }
    }
}

/// A classified console message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub class: MessageClass,
    pub text: String,
}

impl Message {
    pub fn new(class: MessageClass, text: impl Into<String>) -> Self {
        Self { class, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(MessageClass::Info, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(MessageClass::Warning, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(MessageClass::Success, text)
    }

    pub fn cancelled(text: impl Into<String>) -> Self {
        Self::new(MessageClass::Cancelled, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageClass::Error, text)
    }

    /// Error message carrying the error's own text
    pub fn from_error(err: &RosterError) -> Self {
        Self::error(err.message())
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.class.prefix(), self.text)
    }
}
