use std::fmt;

#[derive(Debug)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (non-positive sigma, inverted box, etc.).
    ConfigValidation(String),
    /// Event file parse / deserialization error.
    EventParse(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::EventParse(msg) => write!(f, "event parse error: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {}
