//! External signal resolver: the SSL scheme check and the registry-backed
//! domain age lookup. This is the only module permitted to touch the
//! network, and every failure it can hit maps to a defined sentinel.

use crate::features::Extraction;
use crate::urlparts;
use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::redirect::Policy;
use serde::Deserialize;
use std::io::Read;
use std::time::Duration;

const MAX_RDAP_BYTES: usize = 256 * 1024;

/// 1 iff the URL's scheme resolves to https. Scheme-less input is given the
/// https prefix first, so a bare domain passes the check.
pub fn check_ssl(url: &str) -> Extraction {
  let candidate: String;
  let effective = if url.starts_with("http") {
    url
  } else {
    candidate = format!("https://{url}");
    &candidate
  };

  match urlparts::split(effective).scheme {
    Some(scheme) if scheme.eq_ignore_ascii_case("https") => Extraction::ok(1),
    Some(_) => Extraction::ok(0),
    None => Extraction::fallback(0, "unparsable scheme"),
  }
}

/// Seam for the registration-record lookup. Implementations may block, so
/// they carry their own timeout; everything else in an analysis is pure.
pub trait DomainAgeLookup {
  fn creation_date(&self, host: &str) -> anyhow::Result<Option<DateTime<Utc>>>;
}

/// Lookup used for offline analysis. Always fails, which the caller maps to
/// the -1 unknown sentinel.
pub struct DisabledLookup;

impl DomainAgeLookup for DisabledLookup {
  fn creation_date(&self, _host: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
    anyhow::bail!("domain age lookup is disabled")
  }
}

/// RDAP client. The bootstrap endpoint redirects to the registry authority
/// for the queried TLD, so a small redirect budget is required.
pub struct RdapLookup {
  client: Client,
  endpoint: String,
}

impl RdapLookup {
  pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
    let parsed =
      reqwest::Url::parse(endpoint).with_context(|| format!("invalid RDAP endpoint: {endpoint}"))?;
    if parsed.scheme() != "https" {
      anyhow::bail!("RDAP endpoint must use HTTPS");
    }

    let client = Client::builder()
      .timeout(timeout)
      .redirect(Policy::limited(5))
      .build()
      .context("build HTTP client")?;

    Ok(Self {
      client,
      endpoint: endpoint.trim_end_matches('/').to_string(),
    })
  }
}

impl DomainAgeLookup for RdapLookup {
  fn creation_date(&self, host: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
    let raw = format!("{}/domain/{host}", self.endpoint);
    let url = reqwest::Url::parse(&raw).with_context(|| format!("build RDAP URL for {host}"))?;

    let response = self
      .client
      .get(url)
      .header(
        USER_AGENT,
        format!("phishguard/{}", env!("CARGO_PKG_VERSION")),
      )
      .header(ACCEPT, "application/rdap+json")
      .send()
      .with_context(|| format!("RDAP query for {host}"))?;

    if response.status().as_u16() != 200 {
      anyhow::bail!(
        "unexpected HTTP status {} for RDAP query",
        response.status().as_u16()
      );
    }

    let body = read_response_with_limit(response, MAX_RDAP_BYTES)?;
    let record: RdapDomain = serde_json::from_slice(&body).context("parse RDAP JSON")?;
    Ok(first_registration_date(&record))
  }
}

#[derive(Debug, Deserialize)]
struct RdapDomain {
  #[serde(default)]
  events: Vec<RdapEvent>,
}

#[derive(Debug, Deserialize)]
struct RdapEvent {
  #[serde(rename = "eventAction")]
  event_action: String,
  #[serde(rename = "eventDate", default)]
  event_date: Option<String>,
}

fn first_registration_date(record: &RdapDomain) -> Option<DateTime<Utc>> {
  // Registries occasionally publish duplicate registration events; the
  // first one wins.
  record
    .events
    .iter()
    .find(|e| e.event_action == "registration")
    .and_then(|e| e.event_date.as_deref())
    .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
    .map(|date| date.with_timezone(&Utc))
}

/// Days since the domain's registration. Any lookup failure, a missing
/// creation date, or an unparsable date all yield the -1 unknown sentinel.
/// -1 must stay distinct from 0: 0 is a confirmed same-day registration and
/// counts as a risk signal, -1 does not.
pub fn domain_age(lookup: &dyn DomainAgeLookup, url: &str) -> Extraction {
  let host = match urlparts::split(url).host {
    Some(h) => h,
    // Scheme-less input: try the raw string as a host name.
    None if !url.is_empty() => url,
    None => return Extraction::fallback(-1, "empty input"),
  };

  match lookup.creation_date(host) {
    Ok(Some(created)) => {
      let days = (Utc::now() - created).num_days();
      Extraction::ok(days.max(0))
    }
    Ok(None) => Extraction::fallback(-1, "no creation date in registry record"),
    Err(e) => {
      tracing::debug!(host = %host, error = %e, "domain age lookup failed");
      Extraction::fallback(-1, "lookup failed")
    }
  }
}

fn read_response_with_limit(response: Response, max_bytes: usize) -> anyhow::Result<Vec<u8>> {
  let mut out = Vec::new();
  let mut limited = response.take((max_bytes.saturating_add(1)) as u64);
  limited.read_to_end(&mut out).context("read response body")?;

  if out.len() > max_bytes {
    anyhow::bail!("response exceeds max size {} bytes", max_bytes);
  }

  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  struct FixedLookup(Option<DateTime<Utc>>);

  impl DomainAgeLookup for FixedLookup {
    fn creation_date(&self, _host: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
      Ok(self.0)
    }
  }

  struct FailingLookup;

  impl DomainAgeLookup for FailingLookup {
    fn creation_date(&self, _host: &str) -> anyhow::Result<Option<DateTime<Utc>>> {
      anyhow::bail!("connection refused")
    }
  }

  #[test]
  fn https_scheme_passes() {
    assert_eq!(check_ssl("https://example.com").value, 1);
    assert_eq!(check_ssl("http://example.com").value, 0);
  }

  #[test]
  fn bare_domain_gets_https_prefix() {
    assert_eq!(check_ssl("example.com").value, 1);
  }

  #[test]
  fn lookup_failure_is_unknown_not_new() {
    let ex = domain_age(&FailingLookup, "https://example.com");
    assert_eq!(ex.value, -1);
    assert!(ex.degraded.is_some());
  }

  #[test]
  fn missing_creation_date_is_unknown() {
    let ex = domain_age(&FixedLookup(None), "https://example.com");
    assert_eq!(ex.value, -1);
  }

  #[test]
  fn age_is_days_since_registration() {
    let created = Utc::now() - chrono::Duration::days(400);
    let ex = domain_age(&FixedLookup(Some(created)), "https://example.com");
    assert_eq!(ex.value, 400);
    assert_eq!(ex.degraded, None);
  }

  #[test]
  fn future_creation_date_clamps_to_new() {
    let created = Utc::now() + chrono::Duration::days(3);
    let ex = domain_age(&FixedLookup(Some(created)), "https://example.com");
    assert_eq!(ex.value, 0);
  }

  #[test]
  fn scheme_less_input_uses_raw_string_as_host() {
    let created = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
    let ex = domain_age(&FixedLookup(Some(created)), "example.com");
    assert!(ex.value > 365);
  }

  #[test]
  fn registration_event_is_picked_first() {
    let record: RdapDomain = serde_json::from_str(
      r#"{
        "events": [
          {"eventAction": "last changed", "eventDate": "2024-05-01T00:00:00Z"},
          {"eventAction": "registration", "eventDate": "1997-09-15T04:00:00Z"},
          {"eventAction": "registration", "eventDate": "2001-01-01T00:00:00Z"}
        ]
      }"#,
    )
    .unwrap();
    let date = first_registration_date(&record).unwrap();
    assert_eq!(date.timestamp(), 874_296_000);
  }

  #[test]
  fn record_without_events_has_no_date() {
    let record: RdapDomain = serde_json::from_str("{}").unwrap();
    assert!(first_registration_date(&record).is_none());
  }

  #[test]
  fn non_https_endpoint_rejected() {
    assert!(RdapLookup::new("http://rdap.org", Duration::from_secs(5)).is_err());
    assert!(RdapLookup::new("https://rdap.org", Duration::from_secs(5)).is_ok());
  }
}
