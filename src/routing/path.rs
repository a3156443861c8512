//! Path composition and separator normalization.
//!
//! Normalization is purely syntactic. It collapses runs of `/` and
//! guarantees a leading `/`; it does not resolve `.` or `..`, does not
//! decode percent-escapes and never touches the query string.

use crate::routing::tenant::TenantId;

/// Build the origin path for `tenant` from the viewer's request path.
pub fn compose(tenant: &TenantId, path: &str) -> String {
    let mut composed = String::with_capacity(tenant.as_str().len() + path.len() + 2);
    composed.push('/');
    composed.push_str(tenant.as_str());
    composed.push('/');
    composed.push_str(path);
    normalize(&composed)
}

/// Collapse every run of `/` to one and ensure the path starts with `/`.
pub fn normalize(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    out.push('/');

    let mut previous_was_slash = true;
    for ch in path.chars() {
        if ch == '/' {
            if previous_was_slash {
                continue;
            }
            previous_was_slash = true;
        } else {
            previous_was_slash = false;
        }
        out.push(ch);
    }

    out
}

pub fn is_normalized(path: &str) -> bool {
    path.starts_with('/') && !path.contains("//")
}

/// Rewrite a full request target (`path[?query]`) for `tenant`.
pub fn rewrite_target(tenant: &TenantId, target: &str) -> String {
    match target.split_once('?') {
        Some((path, query)) => format!("{}?{}", compose(tenant, path), query),
        None => compose(tenant, target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::domain::BaseDomain;
    use crate::routing::tenant::extract_tenant;

    fn tenant(host: &str) -> TenantId {
        let base: BaseDomain = "example.com".parse().unwrap();
        extract_tenant(host, &base).unwrap()
    }

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize("//a///b//"), "/a/b/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("a/b"), "/a/b");
    }

    #[test]
    fn test_normalize_is_syntactic_only() {
        assert_eq!(normalize("/a/./b/../c"), "/a/./b/../c");
        assert_eq!(normalize("/a%2F%2Fb"), "/a%2F%2Fb");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for path in ["", "/", "//x//y", "/blog/", "a//b"] {
            let once = normalize(path);
            assert!(is_normalized(&once));
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_compose_for_apex() {
        assert_eq!(compose(&TenantId::apex(), "/"), "/");
        assert_eq!(compose(&TenantId::apex(), "/x"), "/x");
        assert_eq!(compose(&TenantId::apex(), ""), "/");
    }

    #[test]
    fn test_compose_for_tenant() {
        assert_eq!(compose(&tenant("blog.example.com"), "/post/1"), "/blog/post/1");
        assert_eq!(compose(&tenant("blog.example.com"), "/"), "/blog/");
        assert_eq!(compose(&tenant("blog.example.com"), ""), "/blog/");
        assert_eq!(compose(&tenant("blog.example.com"), "index.html"), "/blog/index.html");
        assert_eq!(compose(&tenant("a.b.example.com"), "/x"), "/a.b/x");
    }

    #[test]
    fn test_rewrite_target_keeps_query_verbatim() {
        let blog = tenant("blog.example.com");
        assert_eq!(rewrite_target(&blog, "/search?q=a//b&next=/x"), "/blog/search?q=a//b&next=/x");
        assert_eq!(rewrite_target(&blog, "/?"), "/blog/?");
        assert_eq!(rewrite_target(&TenantId::apex(), "//x?y"), "/x?y");
    }
}
