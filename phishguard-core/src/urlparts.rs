/// Best-effort split of a raw URL string. Host semantics follow the loose
/// convention the extractors rely on: an authority component exists only
/// after a `//` marker, so a bare `example.com` has no host.
/// Splitting never fails; unrecognizable input yields empty parts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlParts<'a> {
  pub scheme: Option<&'a str>,
  pub host: Option<&'a str>,
}

pub fn split(url: &str) -> UrlParts<'_> {
  if let Some(pos) = url.find("://") {
    let scheme = &url[..pos];
    if is_scheme(scheme) {
      return UrlParts {
        scheme: Some(scheme),
        host: host_of(&url[pos + 3..]),
      };
    }
  }

  if let Some(rest) = url.strip_prefix("//") {
    return UrlParts {
      scheme: None,
      host: host_of(rest),
    };
  }

  UrlParts::default()
}

fn host_of(after_authority_marker: &str) -> Option<&str> {
  let end = after_authority_marker
    .find(['/', '?', '#'])
    .unwrap_or(after_authority_marker.len());
  let host = &after_authority_marker[..end];
  if host.is_empty() {
    None
  } else {
    Some(host)
  }
}

fn is_scheme(candidate: &str) -> bool {
  !candidate.is_empty()
    && candidate
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_scheme_and_host() {
    let parts = split("https://www.example.com/login?next=1");
    assert_eq!(parts.scheme, Some("https"));
    assert_eq!(parts.host, Some("www.example.com"));
  }

  #[test]
  fn host_keeps_port_and_userinfo() {
    assert_eq!(split("http://evil.com:8080/x").host, Some("evil.com:8080"));
    assert_eq!(split("http://user@evil.com/x").host, Some("user@evil.com"));
  }

  #[test]
  fn bare_domain_has_no_host() {
    let parts = split("example.com");
    assert_eq!(parts.scheme, None);
    assert_eq!(parts.host, None);
  }

  #[test]
  fn protocol_relative_url_has_host_but_no_scheme() {
    let parts = split("//cdn.example.com/app.js");
    assert_eq!(parts.scheme, None);
    assert_eq!(parts.host, Some("cdn.example.com"));
  }

  #[test]
  fn garbage_scheme_is_not_a_scheme() {
    let parts = split("ht tp://x.com/");
    assert_eq!(parts.scheme, None);
    assert_eq!(parts.host, None);
  }

  #[test]
  fn empty_authority_is_no_host() {
    assert_eq!(split("https:///path").host, None);
    assert_eq!(split("").host, None);
  }

  #[test]
  fn host_stops_at_query_or_fragment() {
    assert_eq!(split("http://a.com?x=1").host, Some("a.com"));
    assert_eq!(split("http://a.com#frag").host, Some("a.com"));
  }
}
