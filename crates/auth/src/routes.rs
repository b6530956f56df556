//! Route classification: which scope a request path requires.
//!
//! Patterns are segment based:
//! - `/api/login` matches exactly that path
//! - `/api/*/items` matches one arbitrary segment in place of `*`
//! - `/api/admin/**` matches `/api/admin` and everything below it
//!
//! Public rules are consulted first, then user, then admin; inside a list the
//! declaration order wins. A path no rule matches still requires an
//! authenticated principal ([`RouteScope::Authenticated`]).

use serde::Serialize;

use crate::ConfigError;

/// Access tier a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteScope {
    /// No authentication at all; token validation is skipped.
    Public,
    /// Requires the `user` or `admin` authority.
    User,
    /// Requires the `admin` authority.
    Admin,
    /// Matched no rule: any authenticated principal.
    Authenticated,
}

impl RouteScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteScope::Public => "public",
            RouteScope::User => "user",
            RouteScope::Admin => "admin",
            RouteScope::Authenticated => "authenticated",
        }
    }
}

impl core::fmt::Display for RouteScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    AnyOne,
}

/// A single compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    /// Trailing `/**`.
    subtree: bool,
}

impl RoutePattern {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidRoutePattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if raw.contains(['?', '#']) {
            return Err(invalid("must not contain a query or fragment"));
        }

        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut subtree = false;

        for (i, part) in parts.iter().enumerate() {
            match *part {
                "**" if i + 1 == parts.len() => subtree = true,
                "**" => return Err(invalid("'**' is only allowed as the last segment")),
                "*" => segments.push(Segment::AnyOne),
                "." | ".." => return Err(invalid("dot segments are not allowed")),
                p if p.contains('*') => {
                    return Err(invalid("'*' must make up a whole segment"));
                }
                p => segments.push(Segment::Literal(p.to_string())),
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            subtree,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn matches(&self, path: &[&str]) -> bool {
        let len_ok = if self.subtree {
            path.len() >= self.segments.len()
        } else {
            path.len() == self.segments.len()
        };

        len_ok
            && self.segments.iter().zip(path).all(|(seg, part)| match seg {
                Segment::AnyOne => true,
                Segment::Literal(lit) => lit == part,
            })
    }
}

/// The three ordered pattern lists, fixed at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRules {
    pub public: Vec<RoutePattern>,
    pub user: Vec<RoutePattern>,
    pub admin: Vec<RoutePattern>,
}

impl RouteRules {
    pub fn from_patterns<S: AsRef<str>>(
        public: &[S],
        user: &[S],
        admin: &[S],
    ) -> Result<Self, ConfigError> {
        fn compile<S: AsRef<str>>(raw: &[S]) -> Result<Vec<RoutePattern>, ConfigError> {
            raw.iter().map(|p| RoutePattern::parse(p.as_ref())).collect()
        }

        Ok(Self {
            public: compile(public)?,
            user: compile(user)?,
            admin: compile(admin)?,
        })
    }
}

/// Total, deterministic mapping from request path to [`RouteScope`].
#[derive(Debug, Clone)]
pub struct RouteClassifier {
    rules: RouteRules,
}

impl RouteClassifier {
    pub fn new(rules: RouteRules) -> Self {
        Self { rules }
    }

    pub fn classify(&self, path: &str) -> RouteScope {
        let segments = normalize(path);
        let hit = |list: &[RoutePattern]| list.iter().any(|p| p.matches(&segments));

        if hit(&self.rules.public) {
            RouteScope::Public
        } else if hit(&self.rules.user) {
            RouteScope::User
        } else if hit(&self.rules.admin) {
            RouteScope::Admin
        } else {
            RouteScope::Authenticated
        }
    }
}

/// Whether the router and the classifier are guaranteed to see the same path:
/// rooted, no empty segments and no dot segments (plain or percent-encoded).
/// A single trailing slash is allowed.
pub fn is_canonical_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    rest.split('/').all(|seg| !seg.is_empty() && !is_dot_segment(seg))
}

fn is_dot_segment(seg: &str) -> bool {
    let decoded = seg.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Split a request path into segments: query/fragment dropped, empty
/// segments collapsed, `.`/`..` resolved lexically.
fn normalize(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut out: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            p => out.push(p),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RouteClassifier {
        RouteClassifier::new(
            RouteRules::from_patterns(
                &[
                    "/swagger-ui.html",
                    "/v3/api-docs/**",
                    "/swagger-ui/**",
                    "/api/register/**",
                    "/api/login",
                    "/api/health",
                ],
                &["/api/public/**"],
                &["/api/admin/**"],
            )
            .unwrap(),
        )
    }

    #[test]
    fn public_paths() {
        let c = classifier();
        for p in [
            "/api/login",
            "/api/login/",
            "/api/health",
            "/api/register",
            "/api/register/extra",
            "/swagger-ui.html",
            "/swagger-ui/index.html",
            "/v3/api-docs",
            "/api/login?next=/x",
        ] {
            assert_eq!(c.classify(p), RouteScope::Public, "{p}");
        }
    }

    #[test]
    fn scoped_paths() {
        let c = classifier();
        assert_eq!(c.classify("/api/public/profile"), RouteScope::User);
        assert_eq!(c.classify("/api/admin/principals/a@b.com"), RouteScope::Admin);
        assert_eq!(c.classify("/api//admin///principals"), RouteScope::Admin);
    }

    #[test]
    fn unmatched_paths_require_authentication() {
        let c = classifier();
        assert_eq!(c.classify("/api/whoami"), RouteScope::Authenticated);
        assert_eq!(c.classify("/"), RouteScope::Authenticated);
        assert_eq!(c.classify(""), RouteScope::Authenticated);
        assert_eq!(c.classify("/api/orders/7"), RouteScope::Authenticated);
    }

    #[test]
    fn matching_is_segment_aligned_not_substring() {
        let c = classifier();
        assert_eq!(c.classify("/api/loginx"), RouteScope::Authenticated);
        assert_eq!(c.classify("/x/api/login"), RouteScope::Authenticated);
        assert_eq!(c.classify("/api/administrator"), RouteScope::Authenticated);
    }

    #[test]
    fn dot_segments_cannot_escape_into_public() {
        let c = classifier();
        assert_eq!(c.classify("/api/register/../admin/users"), RouteScope::Admin);
        assert_eq!(c.classify("/api/login/.."), RouteScope::Authenticated);
    }

    #[test]
    fn public_wins_over_later_lists() {
        let c = RouteClassifier::new(
            RouteRules::from_patterns(&["/api/shared/**"], &["/api/**"], &["/api/shared/admin/**"])
                .unwrap(),
        );
        assert_eq!(c.classify("/api/shared/admin/x"), RouteScope::Public);
        assert_eq!(c.classify("/api/other"), RouteScope::User);
    }

    #[test]
    fn single_segment_wildcard() {
        let c = RouteClassifier::new(
            RouteRules::from_patterns::<&str>(&[], &["/api/*/items"], &[]).unwrap(),
        );
        assert_eq!(c.classify("/api/shop-1/items"), RouteScope::User);
        assert_eq!(c.classify("/api/shop-1/x/items"), RouteScope::Authenticated);
        assert_eq!(c.classify("/api/items"), RouteScope::Authenticated);
    }

    #[test]
    fn canonical_paths() {
        for ok in ["/", "/api/login", "/api/login/", "/api/admin/principals/a@b.com", "/v1.2/x"] {
            assert!(is_canonical_path(ok), "{ok}");
        }
        for bad in [
            "",
            "api/login",
            "//api/login",
            "/api//admin",
            "/api/login//",
            "/api/admin/principals/../../login",
            "/api/./login",
            "/api/login/..",
            "/api/%2e%2e/admin",
            "/api/.%2E/admin",
        ] {
            assert!(!is_canonical_path(bad), "{bad}");
        }
    }

    #[test]
    fn bad_patterns_are_config_errors() {
        for bad in ["api/login", "/api/**/x", "/api/adm*", "/api/../x", "/api?x=1"] {
            assert!(
                matches!(RoutePattern::parse(bad), Err(ConfigError::InvalidRoutePattern { .. })),
                "{bad}"
            );
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: classification is total and deterministic.
            #[test]
            fn classify_is_total_and_deterministic(path in "(/[a-z.*]{0,6}){0,6}") {
                let c = classifier();
                let first = c.classify(&path);
                prop_assert_eq!(first, c.classify(&path));
            }

            /// Property: anything under the admin subtree is admin unless a public rule claims it.
            #[test]
            fn admin_subtree(rest in "(/[a-z0-9]{1,8}){0,4}") {
                let path = format!("/api/admin{rest}");
                prop_assert_eq!(classifier().classify(&path), RouteScope::Admin);
            }
        }
    }
}
