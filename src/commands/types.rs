//! Classification of incoming messages.

use std::fmt;

use super::extract_identifier;

/// What an incoming text message asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotQuery {
    /// The `/start` command.
    Start,

    /// Look up an account. `None` when nothing usable could be extracted.
    Lookup(Option<String>),
}

impl BotQuery {
    /// Parses a message text. Every text is either `/start` or a lookup.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        if text.trim() == "/start" {
            return Self::Start;
        }

        Self::Lookup(extract_identifier(text))
    }

    /// The extracted lookup key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Start => None,
            Self::Lookup(key) => key.as_deref(),
        }
    }
}

impl fmt::Display for BotQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Lookup(Some(key)) => write!(f, "lookup {key}"),
            Self::Lookup(None) => write!(f, "lookup <unparseable>"),
        }
    }
}
