//! Provider link rewriting (view page to direct download)

use serde::{Deserialize, Serialize};

/// Literal substring replacement applied to a provider's raw link
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RewriteRule {
    pub from: String,
    pub to: String,
}

impl RewriteRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Search text is non-empty and distinct from its replacement
    pub fn is_well_formed(&self) -> bool {
        !self.from.is_empty() && self.from != self.to
    }

    /// Replace the first occurrence of `from`
    ///
    /// A rule whose replacement contains the search text, such as
    /// `host/ -> host/dl/`, leaves links that already contain the replacement alone.
    pub fn apply(&self, url: &str) -> String {
        if self.from.is_empty() {
            return url.to_string();
        }
        if self.to.contains(&self.from) && url.contains(&self.to) {
            return url.to_string();
        }
        url.replacen(&self.from, &self.to, 1)
    }
}

/// Apply an optional rewrite rule to a raw provider link
pub fn normalize(raw_url: &str, rule: Option<&RewriteRule>) -> String {
    let url = raw_url.trim();
    match rule {
        Some(rule) => {
            let rewritten = rule.apply(url);
            if rewritten != url {
                tracing::debug!(raw = url, url = %rewritten, "Rewrote provider link");
            }
            rewritten
        }
        None => url.to_string(),
    }
}
