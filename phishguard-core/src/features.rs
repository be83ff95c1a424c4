use crate::urlparts;

// Common TLD tokens that legitimate sites never place in the middle of a
// hostname; seeing one there (paypal.com.verify.net) is a spoofing signal.
const COMMON_TLDS: [&str; 7] = ["com", "org", "net", "in", "co", "gov", "edu"];

// Low-trust TLDs with cheap or free registration.
const SUSPICIOUS_TLDS: [&str; 10] = [
  "zip", "xyz", "cricket", "party", "gq", "tk", "ml", "cf", "buzz", "top",
];

const NUMERIC_RATIO_THRESHOLD: f64 = 0.2;

/// Result of a single extractor. `value` always enters the feature vector;
/// `degraded` is set when the extractor fell back to its default because the
/// input gave it nothing to work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction {
  pub value: i64,
  pub degraded: Option<&'static str>,
}

impl Extraction {
  pub fn ok(value: i64) -> Self {
    Self {
      value,
      degraded: None,
    }
  }

  pub fn fallback(value: i64, reason: &'static str) -> Self {
    Self {
      value,
      degraded: Some(reason),
    }
  }
}

pub fn url_length(url: &str) -> Extraction {
  Extraction::ok(url.chars().count() as i64)
}

/// 1 iff the host is a dotted-quad IPv4 literal (`^(\d{1,3}\.){3}\d{1,3}$`).
pub fn has_ip(url: &str) -> Extraction {
  let Some(host) = urlparts::split(url).host else {
    return Extraction::fallback(0, "no host");
  };
  Extraction::ok(i64::from(is_ipv4_literal(host)))
}

fn is_ipv4_literal(host: &str) -> bool {
  let mut octets = 0;
  for part in host.split('.') {
    octets += 1;
    if octets > 4 {
      return false;
    }
    if part.is_empty() || part.len() > 3 || !part.chars().all(|c| c.is_ascii_digit()) {
      return false;
    }
  }
  octets == 4
}

/// '@' anywhere in the raw URL, not just the host. Attackers hide the real
/// authority after a decoy `user@` prefix.
pub fn has_at(url: &str) -> Extraction {
  Extraction::ok(i64::from(url.contains('@')))
}

pub fn subdomain_count(url: &str) -> Extraction {
  let Some(host) = urlparts::split(url).host else {
    return Extraction::fallback(0, "no host");
  };
  Extraction::ok(host.matches('.').count() as i64)
}

pub fn has_hyphen(url: &str) -> Extraction {
  let Some(host) = urlparts::split(url).host else {
    return Extraction::fallback(0, "no host");
  };
  Extraction::ok(i64::from(host.contains('-')))
}

/// A second "//" after the scheme separator, the open-redirect trick of
/// embedding another authority in the path.
pub fn has_double_slash(url: &str) -> Extraction {
  match url.find("://") {
    Some(pos) => Extraction::ok(i64::from(url[pos + 3..].contains("//"))),
    None => Extraction::ok(0),
  }
}

pub fn has_custom_port(url: &str) -> Extraction {
  let Some(host) = urlparts::split(url).host else {
    return Extraction::fallback(0, "no host");
  };
  Extraction::ok(i64::from(host.contains(':')))
}

/// With three or more host labels, a common TLD token in any non-final
/// position marks a brand-spoofing host like `paypal.com.verify.net`.
pub fn tld_in_subdomain(url: &str) -> Extraction {
  let Some(host) = urlparts::split(url).host else {
    return Extraction::fallback(0, "no host");
  };
  let labels: Vec<&str> = host.split('.').collect();
  if labels.len() < 3 {
    return Extraction::ok(0);
  }
  let hit = labels[..labels.len() - 1]
    .iter()
    .any(|label| COMMON_TLDS.contains(label));
  Extraction::ok(i64::from(hit))
}

/// Final host label against the low-trust TLD set. Falls back to the raw
/// input when there is no host, so a scheme-less `paypal.tk` still flags.
pub fn suspicious_tld(url: &str) -> Extraction {
  let host = urlparts::split(url).host.unwrap_or(url);
  if !host.contains('.') {
    return Extraction::ok(0);
  }
  let extension = host
    .rsplit('.')
    .next()
    .unwrap_or("")
    .to_ascii_lowercase();
  Extraction::ok(i64::from(SUSPICIOUS_TLDS.contains(&extension.as_str())))
}

/// Digit-to-length ratio over the full URL; random numeric tokens push
/// phishing URLs past the threshold.
pub fn high_numeric_ratio(url: &str) -> Extraction {
  let length = url.chars().count();
  if length == 0 {
    return Extraction::ok(0);
  }
  let digits = url.chars().filter(char::is_ascii_digit).count();
  let ratio = digits as f64 / length as f64;
  Extraction::ok(i64::from(ratio > NUMERIC_RATIO_THRESHOLD))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ip_literal_host_flags() {
    assert_eq!(has_ip("http://192.168.1.1/login").value, 1);
    assert_eq!(has_ip("http://example.com").value, 0);
    assert_eq!(has_ip("http://192.168.1/login").value, 0);
    assert_eq!(has_ip("http://1.2.3.4.5/").value, 0);
  }

  #[test]
  fn ip_extractor_degrades_without_host() {
    let ex = has_ip("not a url");
    assert_eq!(ex.value, 0);
    assert_eq!(ex.degraded, Some("no host"));
  }

  #[test]
  fn at_symbol_is_searched_in_full_url() {
    assert_eq!(has_at("http://user@evil.com").value, 1);
    assert_eq!(has_at("http://evil.com/path?next=a@b").value, 1);
    assert_eq!(has_at("http://example.com").value, 0);
  }

  #[test]
  fn double_slash_after_scheme_separator() {
    assert_eq!(has_double_slash("http://good.com//evil.com").value, 1);
    assert_eq!(has_double_slash("http://good.com/path").value, 0);
    assert_eq!(has_double_slash("good.com//evil.com").value, 0);
  }

  #[test]
  fn tld_in_subdomain_needs_three_labels() {
    assert_eq!(tld_in_subdomain("http://paypal.com.verify.net/").value, 1);
    assert_eq!(tld_in_subdomain("http://www.paypal.com/").value, 0);
    assert_eq!(tld_in_subdomain("http://paypal.com/").value, 0);
  }

  #[test]
  fn suspicious_tld_matches_final_label() {
    assert_eq!(suspicious_tld("http://login-update.tk/reset").value, 1);
    assert_eq!(suspicious_tld("http://example.com").value, 0);
    assert_eq!(suspicious_tld("http://EXAMPLE.TK").value, 1);
  }

  #[test]
  fn suspicious_tld_falls_back_to_raw_input() {
    assert_eq!(suspicious_tld("paypal.tk").value, 1);
    assert_eq!(suspicious_tld("paypal").value, 0);
  }

  #[test]
  fn custom_port_and_hyphen() {
    assert_eq!(has_custom_port("http://evil.com:8080/").value, 1);
    assert_eq!(has_custom_port("http://evil.com/a:b").value, 0);
    assert_eq!(has_hyphen("http://secure-login.com/").value, 1);
    assert_eq!(has_hyphen("http://example.com/-").value, 0);
  }

  #[test]
  fn subdomain_count_counts_dots_in_host() {
    assert_eq!(subdomain_count("http://a.b.c.example.com/").value, 4);
    assert_eq!(subdomain_count("http://example.com/x.y.z").value, 1);
    assert_eq!(subdomain_count("nohost").value, 0);
  }

  #[test]
  fn numeric_ratio_threshold() {
    // 10 of 23 characters are digits.
    assert_eq!(high_numeric_ratio("http://a.com/1234567890").value, 1);
    assert_eq!(high_numeric_ratio("http://example.com/about").value, 0);
    assert_eq!(high_numeric_ratio("").value, 0);
  }

  #[test]
  fn url_length_counts_characters() {
    assert_eq!(url_length("").value, 0);
    assert_eq!(url_length("http://a.com").value, 12);
  }
}
