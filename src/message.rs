use std::fmt;
use std::sync::Arc;

/// Text used when no custom message is configured.
pub const DEFAULT_MESSAGE: &str = "Motion detected";

/// Query-string key carrying a custom announcement message.
pub const MESSAGE_PARAM: &str = "message";

/// The text spoken on each announcement and shown on the alert status.
///
/// Resolved once at startup and immutable afterwards; clones share the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementMessage(Arc<str>);

impl AnnouncementMessage {
    /// Use `text` verbatim, falling back to the default when it is blank.
    pub fn new(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if text.trim().is_empty() {
            return Self::default();
        }
        Self(Arc::from(text))
    }

    /// Resolve the message from a URL-style query string such as `?message=all+clear`.
    ///
    /// `+` decodes to a space before percent-decoding. A missing, empty, or undecodable
    /// parameter yields the default message.
    pub fn from_query(query: &str) -> Self {
        query_param(query, MESSAGE_PARAM)
            .map(Self::new)
            .unwrap_or_default()
    }

    /// Resolve from an optional query string.
    pub fn resolve(query: Option<&str>) -> Self {
        query.map(Self::from_query).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AnnouncementMessage {
    fn default() -> Self {
        Self(Arc::from(DEFAULT_MESSAGE))
    }
}

impl fmt::Display for AnnouncementMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Look up and decode the first value for `key`.
fn query_param(query: &str, key: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k)? == key).then_some(v)
        })
        .next()
        .and_then(decode_component)
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|s| s.into_owned())
}
