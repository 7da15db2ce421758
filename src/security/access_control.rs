//! Rule evaluation against a request.
//!
//! A request passes if ANY candidate rule matches: the pattern matches the
//! URL, the method is allowed and, for authorization, the role is allowed.
//! No rule matching means denial; callers decide how to report it.

use crate::routing::matcher::UrlPattern;
use crate::rules::Rule;

/// True if any rule matches the URL and allows the method.
pub fn authorize(rules: &[Rule], url: &str, method: &str) -> bool {
    rules
        .iter()
        .any(|rule| rule.allows_method(method) && UrlPattern::parse(&rule.pattern).matches(url))
}

/// Role-aware variant of [`authorize`]. `role` is `None` for anonymous callers.
pub fn authorize_role(rules: &[Rule], url: &str, method: &str, role: Option<&str>) -> bool {
    rules.iter().any(|rule| {
        rule.allows_method(method)
            && rule.allows_role(role)
            && UrlPattern::parse(&rule.pattern).matches(url)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(service: &str, pattern: &str, methods: Option<&[&str]>, roles: Option<&[&str]>) -> Rule {
        let now = Utc::now();
        Rule {
            id: 1,
            service: service.into(),
            pattern: pattern.into(),
            methods: methods.map(|m| m.iter().map(|s| s.to_string()).collect()),
            roles: roles.map(|r| r.iter().map(|s| s.to_string()).collect()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_allowed_and_disallowed_methods() {
        let rules = vec![rule("merchants", "*://*/merchants/*", Some(&["GET", "POST"]), None)];
        let url = "http://localhost:5566/merchants/5";
        assert!(authorize(&rules, url, "GET"));
        assert!(authorize(&rules, url, "POST"));
        assert!(!authorize(&rules, url, "DELETE"));
    }

    #[test]
    fn test_unset_and_wildcard_methods() {
        let url = "http://localhost/merchants/5";
        assert!(authorize(&[rule("merchants", "*://*/merchants/*", None, None)], url, "PUT"));
        assert!(authorize(&[rule("merchants", "*://*/merchants/*", Some(&["*"]), None)], url, "PUT"));
    }

    #[test]
    fn test_no_rules_denies() {
        assert!(!authorize(&[], "http://localhost/merchants/5", "GET"));
        assert!(!authorize_role(&[], "http://localhost/merchants/5", "GET", Some("1")));
    }

    #[test]
    fn test_any_rule_matches() {
        let rules = vec![
            rule("orders", "*://*/orders/*", Some(&["GET"]), None),
            rule("*", "*://*/*/5", Some(&["DELETE"]), None),
        ];
        assert!(authorize(&rules, "http://localhost/orders/5", "DELETE"));
        assert!(authorize(&rules, "http://localhost/orders/7", "GET"));
        assert!(!authorize(&rules, "http://localhost/orders/7", "DELETE"));
    }

    #[test]
    fn test_role_aware() {
        let rules = vec![rule(
            "autz-merchants",
            "*://*/autz-merchants/*",
            Some(&["GET", "POST"]),
            Some(&["2"]),
        )];
        let url = "http://localhost/autz-merchants/5";
        assert!(authorize_role(&rules, url, "GET", Some("2")));
        assert!(!authorize_role(&rules, url, "GET", Some("3")));
        assert!(!authorize_role(&rules, url, "DELETE", Some("2")));
        assert!(!authorize_role(&rules, url, "GET", None));
    }

    #[test]
    fn test_role_wildcard_admits_anonymous() {
        let rules = vec![rule("*", "*://*/public/*", None, Some(&["*"]))];
        assert!(authorize_role(&rules, "http://localhost/public/docs", "GET", None));
    }
}
