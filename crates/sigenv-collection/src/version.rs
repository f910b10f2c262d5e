//! Library version parsing and ordering
//!
//! Versions are dotted numeric segments with an optional pre-release tail:
//! `1.2`, `0.10.1`, `2.0.0-rc1`, `2.0.0.pre1`. Directory names found in
//! repositories and package stores are ordered with this type.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during version parsing
#[derive(Debug, Error)]
pub enum VersionError {
    /// Empty version string
    #[error("Empty version string")]
    Empty,

    /// First segment is not numeric
    #[error("Invalid version format: {0}")]
    InvalidVersion(String),
}

/// A library version
#[derive(Debug, Clone)]
pub struct Version {
    /// Numeric release segments
    pub segments: Vec<u64>,

    /// Pre-release tail, if any
    pub prerelease: Option<String>,

    /// Text the version was parsed from
    raw: String,
}

impl Version {
    /// Parse a version string
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(VersionError::Empty);
        }

        let s = raw.strip_prefix('v').unwrap_or(raw);

        // `-` always starts a pre-release
        let (release, mut prerelease) = match s.split_once('-') {
            Some((release, pre)) => (release, Some(pre.to_string())),
            None => (s, None),
        };

        // A non-numeric dotted segment starts one too (`2.0.0.pre1`)
        let mut segments = Vec::new();
        let mut tail = Vec::new();
        for part in release.split('.') {
            match part.parse::<u64>() {
                Ok(n) if tail.is_empty() => segments.push(n),
                _ => tail.push(part),
            }
        }

        if !tail.is_empty() {
            let tail = tail.join(".");
            prerelease = Some(match prerelease {
                Some(pre) => format!("{}-{}", tail, pre),
                None => tail,
            });
        }

        if segments.is_empty() {
            return Err(VersionError::InvalidVersion(raw.to_string()));
        }

        Ok(Version {
            segments,
            prerelease,
            raw: raw.to_string(),
        })
    }

    /// Check if this is a prerelease version
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// The text this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Missing segments count as zero: 1.2 == 1.2.0
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).copied().unwrap_or(0);
            let b = other.segments.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }

        // Versions with prerelease are less than without
        match (&self.prerelease, &other.prerelease) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

/// Sort version strings ascending, dropping duplicates and ones that do not parse
///
/// Spellings that compare equal (`1.2`, `1.2.0`) are both kept.
pub fn sort_versions<I, S>(versions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut parsed: Vec<Version> = versions
        .into_iter()
        .filter(|v| seen.insert(v.as_ref().to_string()))
        .filter_map(|v| match Version::parse(v.as_ref()) {
            Ok(version) => Some(version),
            Err(err) => {
                debug!(version = v.as_ref(), error = %err, "ignoring unparseable version");
                None
            }
        })
        .collect();

    parsed.sort();
    parsed.into_iter().map(|v| v.raw).collect()
}
