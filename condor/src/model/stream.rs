//! Monitored stream entries.

use serde::{Deserialize, Serialize};
use url::Url;

use super::settings::GlobalSettings;
use super::tristate::Tristate;

/// Platform token used before the probe has identified one.
static UNKNOWN_KIND: &str = "unknown";

/// One monitored target.
///
/// The URL is the entry's identity: status tracking keys on the normalized
/// URL and treats it as immutable for the entry's lifetime. Everything else
/// is presentation or launch configuration with global fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamEntry {
    /// Stream URL; unique key for status tracking.
    pub url: String,
    /// Display label; empty falls back to the URL.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Platform identifier (extractor plugin name), resolved lazily from the
    /// URL; not required at creation.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Quality preference; empty falls back to the global default.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub quality: String,
    /// Player executable; empty falls back to the global default.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub player: String,
    /// Poll toggle; unset follows `monitoring_enabled`.
    #[serde(skip_serializing_if = "Tristate::is_unset")]
    pub check: Tristate,
    /// Notification toggle; unset follows `default_notify`.
    #[serde(skip_serializing_if = "Tristate::is_unset")]
    pub notify: Tristate,
    /// Extra extractor arguments for this stream.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub extractor_args: String,
    /// Extra player arguments for this stream.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub player_args: String,
}

impl StreamEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Label shown to users; substituted for `$SC.name`.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.url } else { &self.name }
    }

    /// Platform token; substituted for `$SC.type`.
    pub fn kind_or_unknown(&self) -> &str {
        if self.kind.is_empty() {
            UNKNOWN_KIND
        } else {
            &self.kind
        }
    }

    /// Identity key used by the monitor's status map.
    pub fn status_key(&self) -> String {
        normalize_url(&self.url)
    }

    /// Whether this entry is polled, given the global monitoring toggle.
    pub fn effective_check(&self, global: &GlobalSettings) -> bool {
        self.check.resolve(global.monitoring_enabled)
    }

    /// Whether transitions for this entry notify, given the global default.
    pub fn effective_notify(&self, global: &GlobalSettings) -> bool {
        self.notify.resolve(global.default_notify)
    }

    /// Quality preference with the global fallback applied.
    pub fn effective_quality<'a>(&'a self, global: &'a GlobalSettings) -> &'a str {
        if self.quality.is_empty() {
            &global.default_quality
        } else {
            &self.quality
        }
    }
}

/// Normalize a URL for use as a status-map key.
///
/// Parsing canonicalizes scheme/host case and trailing details; input that
/// does not parse falls back to its trimmed form so arbitrary strings still
/// get a stable key.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) => url.to_string(),
        Err(_) => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_url() {
        let mut entry = StreamEntry::new("https://example.com/live");
        assert_eq!(entry.display_name(), "https://example.com/live");
        entry.name = "Example".to_string();
        assert_eq!(entry.display_name(), "Example");
    }

    #[test]
    fn test_kind_or_unknown() {
        let mut entry = StreamEntry::new("https://example.com/live");
        assert_eq!(entry.kind_or_unknown(), "unknown");
        entry.kind = "twitch".to_string();
        assert_eq!(entry.kind_or_unknown(), "twitch");
    }

    #[test]
    fn test_effective_check_tristate() {
        let mut global = GlobalSettings::default();
        let mut entry = StreamEntry::new("https://x/y");

        global.monitoring_enabled = true;
        entry.check = Tristate::Unset;
        assert!(entry.effective_check(&global));

        entry.check = Tristate::Off;
        assert!(!entry.effective_check(&global));

        global.monitoring_enabled = false;
        entry.check = Tristate::On;
        assert!(entry.effective_check(&global));
    }

    #[test]
    fn test_effective_quality_fallback() {
        let global = GlobalSettings::default();
        let mut entry = StreamEntry::new("https://x/y");
        assert_eq!(entry.effective_quality(&global), "best");
        entry.quality = "720p".to_string();
        assert_eq!(entry.effective_quality(&global), "720p");
    }

    #[test]
    fn test_normalize_url_canonicalizes_case_and_whitespace() {
        assert_eq!(
            normalize_url("  HTTPS://Example.COM/Live "),
            "https://example.com/Live"
        );
    }

    #[test]
    fn test_normalize_url_unparseable_falls_back_to_trim() {
        assert_eq!(normalize_url("  not a url  "), "not a url");
    }

    #[test]
    fn test_serde_tristate_absent_vs_false() {
        let entry: StreamEntry =
            serde_json::from_str(r#"{ "url": "https://x/y" }"#).unwrap();
        assert_eq!(entry.check, Tristate::Unset);

        let entry: StreamEntry =
            serde_json::from_str(r#"{ "url": "https://x/y", "check": false }"#).unwrap();
        assert_eq!(entry.check, Tristate::Off);

        let entry: StreamEntry =
            serde_json::from_str(r#"{ "url": "https://x/y", "check": true, "type": "twitch" }"#)
                .unwrap();
        assert_eq!(entry.check, Tristate::On);
        assert_eq!(entry.kind, "twitch");
    }
}
