// Pagination support for GitHub API

/// Extract the `rel="next"` target from a `Link` header.
///
/// GitHub returns Link headers like
/// `<https://api.github.com/r?page=2>; rel="next", <https://api.github.com/r?page=5>; rel="last"`
///
/// # Examples
///
/// ```rust
/// use github_webhook_sdk::client::next_page_url;
///
/// let header = r#"<https://api.github.com/repositories/1/commits?page=2>; rel="next""#;
///
/// assert_eq!(
///     next_page_url(Some(header)).as_deref(),
///     Some("https://api.github.com/repositories/1/commits?page=2")
/// );
/// assert_eq!(next_page_url(None), None);
/// ```
pub fn next_page_url(link_header: Option<&str>) -> Option<String> {
    link_header?.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let (target, rel) = (parts.next()?, parts.next()?);

        let rel = rel.trim().trim_start_matches("rel=").trim_matches('"');
        (rel == "next").then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
