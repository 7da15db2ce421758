//! Wildcard URL pattern matching.
//!
//! # Responsibilities
//! - Parse rule patterns such as `*://*/merchants/*`
//! - Match a full request URL component by component
//!
//! # Design Decisions
//! - Scheme and host matching is case-insensitive
//! - Path matching is case-sensitive
//! - `*` never crosses a `/` boundary inside a path
//! - A pattern without `scheme://` constrains the path only
//! - Query strings and fragments of the candidate are ignored
//! - No regex to guarantee O(n) matching

/// A compiled wildcard pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<String>,
    segments: Vec<String>,
}

impl UrlPattern {
    /// Compile a pattern string.
    pub fn parse(pattern: &str) -> Self {
        let pattern = pattern.trim();
        match pattern.split_once("://") {
            Some((scheme, rest)) => {
                let (authority, path) = match rest.find('/') {
                    Some(idx) => rest.split_at(idx),
                    None => (rest, "/"),
                };
                let (host, port) = split_port(authority);
                Self {
                    scheme: Some(scheme.to_ascii_lowercase()),
                    host: Some(host.to_ascii_lowercase()),
                    port: port.map(str::to_string),
                    segments: segments(path),
                }
            }
            None => Self {
                scheme: None,
                host: None,
                port: None,
                segments: segments(pattern),
            },
        }
    }

    /// Returns true if `url` (absolute, or a bare path) matches this pattern.
    pub fn matches(&self, url: &str) -> bool {
        let candidate = Candidate::parse(url);

        if let Some(scheme) = &self.scheme {
            match &candidate.scheme {
                Some(actual) if glob(scheme, actual) => {}
                None if scheme == "*" => {}
                _ => return false,
            }
        }

        if let Some(host) = &self.host {
            match &candidate.host {
                Some(actual) if glob(host, actual) => {}
                None if host == "*" => {}
                _ => return false,
            }
        }

        if let Some(port) = &self.port {
            if port != "*" && candidate.port.as_deref() != Some(port.as_str()) {
                return false;
            }
        }

        let actual = segments(candidate.path);
        self.segments.len() == actual.len()
            && self
                .segments
                .iter()
                .zip(actual.iter())
                .all(|(expected, actual)| glob(expected, actual))
    }
}

/// Match `url` against a pattern string without keeping the compiled form.
pub fn matches(pattern: &str, url: &str) -> bool {
    UrlPattern::parse(pattern).matches(url)
}

/// Components of the URL being tested.
struct Candidate<'a> {
    scheme: Option<String>,
    host: Option<String>,
    port: Option<String>,
    path: &'a str,
}

impl<'a> Candidate<'a> {
    fn parse(url: &'a str) -> Self {
        let url = url.trim();
        let url = url.split(['?', '#']).next().unwrap_or_default();
        match url.split_once("://") {
            Some((scheme, rest)) => {
                let (authority, path) = match rest.find('/') {
                    Some(idx) => rest.split_at(idx),
                    None => (rest, "/"),
                };
                // Userinfo never takes part in matching.
                let authority = authority.rsplit('@').next().unwrap_or(authority);
                let (host, port) = split_port(authority);
                Self {
                    scheme: Some(scheme.to_ascii_lowercase()),
                    host: Some(host.to_ascii_lowercase()),
                    port: port.map(str::to_string),
                    path,
                }
            }
            None => Self {
                scheme: None,
                host: None,
                port: None,
                path: url,
            },
        }
    }
}

/// Split `host[:port]`, leaving bracketed IPv6 literals intact.
fn split_port(authority: &str) -> (&str, Option<&str>) {
    if authority.starts_with('[') {
        return match authority.find("]:") {
            Some(idx) => (&authority[..=idx], Some(&authority[idx + 2..])),
            None => (authority, None),
        };
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    }
}

fn segments(path: &str) -> Vec<String> {
    let path = path.strip_prefix('/').unwrap_or(path);
    if path.is_empty() {
        return Vec::new();
    }
    path.split('/').map(str::to_string).collect()
}

/// Glob match where `*` matches any run of characters (possibly empty).
fn glob(pattern: &str, text: &str) -> bool {
    let pattern = pattern.as_bytes();
    let text = text.as_bytes();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == b'*')
}
