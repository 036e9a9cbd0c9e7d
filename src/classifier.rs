use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::RawFeedItem;

pub const INVALID_DATE: &str = "Invalid Date";

/// Lowercase tokens; any substring hit in `title + " " + description` makes an item relevant.
pub const KEYWORDS: &[&str] = &[
    "security", "cyber", "hack", "malware", "virus", "ransomware", "phishing",
    "vulnerability", "exploit", "breach", "attack", "threat", "firewall",
    "encryption", "authentication", "penetration", "pentest", "incident",
    "response", "forensics", "compliance", "gdpr", "iso", "nist", "mitre",
    "apt", "zero-day", "cve", "cwe", "owasp", "siem", "soar", "edr", "xdr",
    "endpoint", "network", "cloud", "iot", "ai", "machine learning", "ml",
    "blockchain", "cryptocurrency", "defi", "web3", "metaverse", "quantum",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "Malware / Threat")]
    MalwareThreat,
    #[serde(rename = "Vulnerability / Exploit")]
    VulnerabilityExploit,
    #[serde(rename = "Cyber Attack / Breach")]
    AttackBreach,
    #[serde(rename = "Surveillance / Espionage")]
    SurveillanceEspionage,
    #[serde(rename = "Cloud Security / AI Security")]
    CloudAi,
    #[serde(rename = "Mobile Security")]
    Mobile,
    #[serde(rename = "Network Security")]
    Network,
    #[serde(rename = "Compliance / Regulation")]
    ComplianceRegulation,
    #[serde(rename = "Cybersecurity / General")]
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MalwareThreat => "Malware / Threat",
            Category::VulnerabilityExploit => "Vulnerability / Exploit",
            Category::AttackBreach => "Cyber Attack / Breach",
            Category::SurveillanceEspionage => "Surveillance / Espionage",
            Category::CloudAi => "Cloud Security / AI Security",
            Category::Mobile => "Mobile Security",
            Category::Network => "Network Security",
            Category::ComplianceRegulation => "Compliance / Regulation",
            Category::General => "Cybersecurity / General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// First match wins; order matters.
const CATEGORY_RULES: &[(&[&str], Category)] = &[
    (&["malware", "virus", "ransomware"], Category::MalwareThreat),
    (&["vulnerability", "exploit", "cve"], Category::VulnerabilityExploit),
    (&["breach", "attack", "hack"], Category::AttackBreach),
    (&["surveillance", "spy", "espionage"], Category::SurveillanceEspionage),
    (&["cloud", "ai", "machine learning"], Category::CloudAi),
    (&["mobile", "android", "ios"], Category::Mobile),
    (&["network", "firewall", "traffic"], Category::Network),
    (&["compliance", "gdpr", "regulation"], Category::ComplianceRegulation),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub relevant: bool,
    pub category: Category,
}

pub fn classify(item: &RawFeedItem) -> Classification {
    let text = format!("{} {}", item.title, item.description).to_lowercase();

    let relevant = KEYWORDS.iter().any(|keyword| text.contains(keyword));
    let category = CATEGORY_RULES
        .iter()
        .find(|(tokens, _)| tokens.iter().any(|token| text.contains(token)))
        .map(|(_, category)| *category)
        .unwrap_or(Category::General);

    Classification { relevant, category }
}

/// Renders a feed date as e.g. `Jan 5, 2025` (UTC). Unparseable input yields [`INVALID_DATE`].
pub fn format_display_date(raw: &str) -> String {
    match parse_published(raw) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|date| date.with_timezone(&Utc))
}
