//! User-facing diagnostic message formatting.
//!
//! `fcp` reports failures as a single rendered line rather than a bare
//! [`std::error::Error`] `Display` implementation, so that the role that
//! detected the problem (sender or receiver side of a transfer) is always
//! visible alongside the underlying cause.

use std::fmt;

/// Which side of a transfer produced a [`Message`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// The side reading files off disk and writing them to the pool.
    Sender,
    /// The side reading packets off the pool and writing files to disk.
    Receiver,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sender => "sender",
            Self::Receiver => "receiver",
        };
        f.write_str(name)
    }
}

/// Severity of a rendered diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// A per-file or per-connection problem; the transfer may still
    /// otherwise complete.
    Warning,
    /// A problem that stops the transfer.
    Error,
}

/// A single user-facing diagnostic line.
///
/// Construct one with [`Message::error`] or [`Message::warning`], optionally
/// attach a [`Role`] and a source location with [`Message::with_role`] and
/// [`Message::with_source`], then render it with [`ToString::to_string`] or
/// `{}`/[`fmt::Display`].
///
/// # Examples
///
/// ```
/// use core::message::{Message, Role};
///
/// let rendered = Message::error(12, "CRC mismatch after 5 retries")
///     .with_role(Role::Receiver)
///     .to_string();
///
/// assert!(rendered.contains("fcp error: CRC mismatch after 5 retries (code 12)"));
/// assert!(rendered.contains("[receiver]"));
/// ```
#[derive(Clone, Debug)]
pub struct Message {
    severity: Severity,
    code: Option<i32>,
    text: String,
    role: Option<Role>,
    source: Option<&'static str>,
}

impl Message {
    /// Creates an error-severity message carrying an exit code.
    pub fn error(code: i32, text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: Some(code),
            text: text.into(),
            role: None,
            source: None,
        }
    }

    /// Creates a warning-severity message with no associated exit code.
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: None,
            text: text.into(),
            role: None,
            source: None,
        }
    }

    /// Tags the message with the role that produced it.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Attaches the source location the message was raised from, typically
    /// captured with [`message_source!`].
    #[must_use]
    pub fn with_source(mut self, source: &'static str) -> Self {
        self.source = Some(source);
        self
    }

    /// The severity of this message.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "fcp error",
            Severity::Warning => "fcp warning",
        };
        write!(f, "{prefix}: {}", self.text)?;
        if let Some(code) = self.code {
            write!(f, " (code {code})")?;
        }
        if let Some(role) = self.role {
            write!(f, " [{role}]")?;
        }
        if let Some(source) = self.source {
            write!(f, " ({source})")?;
        }
        Ok(())
    }
}

/// Captures `file:line` of the call site for use with [`Message::with_source`].
#[macro_export]
macro_rules! message_source {
    () => {
        concat!(file!(), ":", line!())
    };
}

#[cfg(test)]
mod tests {
    use super::{Message, Role, Severity};

    #[test]
    fn error_renders_code_and_role() {
        let rendered = Message::error(11, "short read")
            .with_role(Role::Sender)
            .to_string();
        assert_eq!(rendered, "fcp error: short read (code 11) [sender]");
    }

    #[test]
    fn warning_has_no_code() {
        let rendered = Message::warning("retrying chunk 4").to_string();
        assert_eq!(rendered, "fcp warning: retrying chunk 4");
    }

    #[test]
    fn with_source_appends_location() {
        let source = message_source!();
        let rendered = Message::error(2, "bad flag byte")
            .with_source(source)
            .to_string();
        assert!(rendered.ends_with(&format!("({source})")));
    }

    #[test]
    fn severity_reflects_constructor() {
        assert_eq!(Message::error(1, "x").severity(), Severity::Error);
        assert_eq!(Message::warning("x").severity(), Severity::Warning);
    }
}
