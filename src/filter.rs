use anyhow::{Context, Result};
use regex::Regex;

/// Decides whether a message's extracted text is worth relaying.
#[derive(Debug, Clone)]
pub enum MessageFilter {
    AlwaysPass,
    RegexMatch(Regex),
}

impl MessageFilter {
    /// Compile the configured pattern; no pattern means everything passes.
    pub fn from_pattern(pattern: Option<&str>) -> Result<Self> {
        match pattern {
            None => Ok(MessageFilter::AlwaysPass),
            Some(pattern) => {
                let regex = Regex::new(pattern)
                    .with_context(|| format!("Invalid filter regex: {}", pattern))?;
                Ok(MessageFilter::RegexMatch(regex))
            }
        }
    }

    /// True when the pattern matches anywhere in `text`
    pub fn passes(&self, text: &str) -> bool {
        match self {
            MessageFilter::AlwaysPass => true,
            MessageFilter::RegexMatch(regex) => regex.is_match(text),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            MessageFilter::AlwaysPass => "always passing empty filter".to_string(),
            MessageFilter::RegexMatch(regex) => format!("<RegexFilter {}>", regex.as_str()),
        }
    }
}
