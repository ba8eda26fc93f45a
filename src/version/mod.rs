//! Version policy: externally visible build suffixes derived from the ledger.
//!
//! A suffix has the form `b<buildNumber>-<commit>`. Downstream consumers parse
//! it, so the format is a compatibility contract.

use crate::error::{LedgerError, Result, VersionError};
use crate::git::Stager;
use crate::ledger::LedgerStore;
use std::fmt;
use std::str::FromStr;

/// Parsed `b<N>-<commit>` artifact identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildSuffix {
    /// Build number, always positive
    pub build_number: u64,
    /// Upstream commit hash; empty when none was recorded
    pub commit: String,
}

impl fmt::Display for BuildSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}-{}", self.build_number, self.commit)
    }
}

impl FromStr for BuildSuffix {
    type Err = VersionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = |reason: &str| VersionError::InvalidSuffix {
            suffix: s.to_string(),
            reason: reason.to_string(),
        };

        let rest = s
            .strip_prefix('b')
            .ok_or_else(|| invalid("must start with 'b'"))?;
        let (number, commit) = rest
            .split_once('-')
            .ok_or_else(|| invalid("missing '-' between build number and commit"))?;
        let build_number = number
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| invalid("build number must be a positive integer"))?;

        Ok(Self {
            build_number,
            commit: commit.to_string(),
        })
    }
}

/// Derives build suffixes from ledger state
#[derive(Debug)]
pub struct VersionPolicy<'a, S> {
    ledger: &'a LedgerStore<S>,
}

impl<'a, S: Stager> VersionPolicy<'a, S> {
    /// Policy reading from `ledger`
    pub fn new(ledger: &'a LedgerStore<S>) -> Self {
        Self { ledger }
    }

    /// Structured suffix for `name`; fails when no build number exists
    pub fn build_suffix(&self, name: &str) -> Result<BuildSuffix> {
        let record = self.ledger.load(name)?;
        let build_number = record
            .build_number
            .ok_or_else(|| LedgerError::BuildNumberNotFound {
                name: name.to_string(),
            })?;
        Ok(BuildSuffix {
            build_number,
            commit: record.commit.unwrap_or_default(),
        })
    }

    /// `b<buildNumber>-<commit>` for `name`
    pub fn version_suffix(&self, name: &str) -> Result<String> {
        self.build_suffix(name).map(|suffix| suffix.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::NoopStager;

    #[test]
    fn test_display_format() {
        let suffix = BuildSuffix {
            build_number: 12,
            commit: "deadbeef".to_string(),
        };
        assert_eq!(suffix.to_string(), "b12-deadbeef");
    }

    #[test]
    fn test_parse_splits_at_first_dash() {
        let suffix: BuildSuffix = "b3-feature-x".parse().unwrap();
        assert_eq!(suffix.build_number, 3);
        assert_eq!(suffix.commit, "feature-x");

        let empty: BuildSuffix = "b1-".parse().unwrap();
        assert_eq!(empty.commit, "");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("3-abc".parse::<BuildSuffix>().is_err());
        assert!("b0-abc".parse::<BuildSuffix>().is_err());
        assert!("bx-abc".parse::<BuildSuffix>().is_err());
        assert!("b7".parse::<BuildSuffix>().is_err());
    }

    #[test]
    fn test_suffix_follows_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = LedgerStore::new(dir.path().join("versions.json"), NoopStager);
        let policy = VersionPolicy::new(&ledger);

        assert!(policy.version_suffix("acme").is_err());

        assert_eq!(ledger.increment_build_number("acme").unwrap(), 1);
        assert_eq!(policy.version_suffix("acme").unwrap(), "b1-");

        assert!(ledger.record_attribute("acme", "commit", "abc123").unwrap());
        assert_eq!(policy.version_suffix("acme").unwrap(), "b1-abc123");
        assert!(!ledger.record_attribute("acme", "commit", "abc123").unwrap());

        ledger.increment_build_number("acme").unwrap();
        assert_eq!(policy.version_suffix("acme").unwrap(), "b2-abc123");
    }
}
