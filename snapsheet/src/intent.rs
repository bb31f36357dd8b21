//! Intent tokens: invalidate stale continuations of async requests.
//!
//! A request that must wait for a precondition captures a token when it is
//! issued. When it resumes it checks whether its token is still the latest
//! one for its target; if a newer request replaced it, the resumption is
//! dropped instead of acted upon.

use std::collections::HashMap;
use std::hash::Hash;

/// Monotonic request marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntentToken(u64);

impl std::fmt::Display for IntentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "intent-{}", self.0)
    }
}

/// Latest issued token per target.
#[derive(Debug, Clone)]
pub struct IntentTokens<K> {
    next: u64,
    latest: HashMap<K, IntentToken>,
}

impl<K> Default for IntentTokens<K> {
    fn default() -> Self {
        Self {
            next: 0,
            latest: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> IntentTokens<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token for `target`, superseding earlier ones.
    pub fn issue(&mut self, target: K) -> IntentToken {
        self.next += 1;
        let token = IntentToken(self.next);
        self.latest.insert(target, token);
        token
    }

    /// Returns true if `token` is the latest issued for `target`.
    pub fn is_current(&self, target: &K, token: IntentToken) -> bool {
        self.latest.get(target) == Some(&token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_token_supersedes_older_for_same_target() {
        let mut tokens = IntentTokens::new();
        let first = tokens.issue("middle");
        let second = tokens.issue("middle");
        let other = tokens.issue("open");

        assert!(!tokens.is_current(&"middle", first));
        assert!(tokens.is_current(&"middle", second));
        assert!(tokens.is_current(&"open", other));
        assert!(first < second);
    }
}
