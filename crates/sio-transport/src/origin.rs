/// Pluggable CORS origin-verification policy.
///
/// The 0.6 reference server's origin check is a permissive stub; spec.md
/// flags this as an open question for a target implementation to settle.
/// We expose the seam as a trait rather than hard-coding a restrictive
/// default, so a deployment can supply its own policy without touching the
/// transport state machines.
pub trait OriginPolicy: Send + Sync {
    fn allow(&self, origin: &str) -> bool;
}

/// The default policy: every origin is accepted. Matches the original
/// server's stub behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAny;

impl OriginPolicy for AllowAny {
    fn allow(&self, _origin: &str) -> bool {
        true
    }
}

/// Accepts only origins present in a fixed allow-list.
#[derive(Debug, Clone)]
pub struct AllowList(pub Vec<String>);

impl OriginPolicy for AllowList {
    fn allow(&self, origin: &str) -> bool {
        self.0.iter().any(|allowed| allowed == origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_any_accepts_everything() {
        assert!(AllowAny.allow("https://example.com"));
        assert!(AllowAny.allow("null"));
    }

    #[test]
    fn allow_list_only_accepts_listed_origins() {
        let policy = AllowList(vec!["https://example.com".to_owned()]);
        assert!(policy.allow("https://example.com"));
        assert!(!policy.allow("https://evil.example"));
    }
}
