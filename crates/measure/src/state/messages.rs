//! Severity-tagged user messages raised at service boundaries.

use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserMessage {
    pub severity: Severity,
    pub text: String,
}

/// Queue the host drains to show toasts / status lines
#[derive(Debug, Default)]
pub struct MessageCenter {
    messages: Vec<UserMessage>,
}

impl MessageCenter {
    pub fn post(&mut self, severity: Severity, text: impl Into<String>) {
        let text = text.into();
        match severity {
            Severity::Info => info!("{text}"),
            Severity::Warning => warn!("{text}"),
            Severity::Error => error!("{text}"),
        }
        self.messages.push(UserMessage { severity, text });
    }

    pub fn messages(&self) -> &[UserMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&UserMessage> {
        self.messages.last()
    }

    pub fn drain(&mut self) -> Vec<UserMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
