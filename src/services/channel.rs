//! Channel authorizer.
//!
//! Decides which channel a relayed message goes to: the configured default
//! when none is requested, otherwise the requested one if the allow-list
//! permits it.

use crate::error::AppError;

/// Allow-list value that permits every channel.
pub const ALLOW_ALL: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
enum AllowList {
    Any,
    /// Lower-cased entries.
    Only(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct ChannelAuthorizer {
    default_channel: String,
    allowed: AllowList,
}

impl ChannelAuthorizer {
    /// `allowed` is either `*` or a comma-separated list of channel names.
    pub fn new(default_channel: impl Into<String>, allowed: &str) -> Self {
        let allowed = if allowed.trim() == ALLOW_ALL {
            AllowList::Any
        } else {
            AllowList::Only(
                allowed
                    .split(',')
                    .map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty())
                    .collect(),
            )
        };

        Self {
            default_channel: default_channel.into(),
            allowed,
        }
    }

    /// Resolve the destination for a message.
    ///
    /// The returned name keeps the caller's casing; matching against the
    /// allow-list ignores case.
    pub fn resolve(&self, requested: &str) -> Result<String, AppError> {
        if requested.is_empty() {
            return Ok(self.default_channel.clone());
        }

        match &self.allowed {
            AllowList::Any => Ok(requested.to_string()),
            AllowList::Only(channels) => {
                let wanted = requested.to_lowercase();
                if channels.iter().any(|c| *c == wanted) {
                    Ok(requested.to_string())
                } else {
                    Err(AppError::UnauthorizedChannel(requested.to_string()))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_uses_default() {
        let channels = ChannelAuthorizer::new("#general", "a,b");

        assert_eq!(channels.resolve("").unwrap(), "#general");
    }

    #[test]
    fn empty_request_uses_default_with_wildcard() {
        let channels = ChannelAuthorizer::new("#general", "*");

        assert_eq!(channels.resolve("").unwrap(), "#general");
    }

    #[test]
    fn match_ignores_case_and_keeps_caller_casing() {
        let channels = ChannelAuthorizer::new("#general", "a,b");

        assert_eq!(channels.resolve("B").unwrap(), "B");
    }

    #[test]
    fn wildcard_allows_anything() {
        let channels = ChannelAuthorizer::new("#general", "*");

        assert_eq!(channels.resolve("#Random").unwrap(), "#Random");
        assert_eq!(channels.resolve("x").unwrap(), "x");
    }

    #[test]
    fn unlisted_channel_is_rejected() {
        let channels = ChannelAuthorizer::new("#general", "a,b");

        assert!(matches!(
            channels.resolve("c"),
            Err(AppError::UnauthorizedChannel(ref c)) if c == "c"
        ));
    }

    #[test]
    fn entries_are_trimmed() {
        let channels = ChannelAuthorizer::new("#general", " #ops , #dev ,");

        assert_eq!(channels.resolve("#DEV").unwrap(), "#DEV");
        assert!(channels.resolve("").is_ok());
    }

    #[test]
    fn empty_allow_list_only_permits_default() {
        let channels = ChannelAuthorizer::new("#general", "");

        assert_eq!(channels.resolve("").unwrap(), "#general");
        assert!(channels.resolve("#general").is_err());
    }
}
