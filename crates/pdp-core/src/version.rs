//! Policy versions, version-match patterns and id references
//!
//! A version is a dot-separated list of non-negative integers (`1.0.3`).
//! A version match pattern may use `*` for any single component and a
//! trailing `+` for any remaining suffix (`1.*.+`).

use crate::error::BuildError;
use crate::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Policy or policy-set version
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(Vec<u32>);

impl Version {
    /// Parse a version string
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidVersion` for empty strings or non-numeric components
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        if text.is_empty() {
            return Err(BuildError::InvalidVersion(text.to_string()));
        }
        text.split('.')
            .map(|component| {
                component
                    .parse::<u32>()
                    .map_err(|_| BuildError::InvalidVersion(text.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// The version components
    #[must_use]
    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self(vec![1, 0])
    }
}

impl FromStr for Version {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = BuildError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum VersionComponent {
    Number(u32),
    AnySingle,
    AnySuffix,
}

/// Version pattern used by id references
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionMatch {
    pattern: String,
    components: Vec<VersionComponent>,
}

impl VersionMatch {
    /// Parse a version-match pattern
    ///
    /// # Errors
    ///
    /// Returns `BuildError::InvalidVersionMatch` if a component is neither a
    /// number, `*`, nor a trailing `+`
    pub fn parse(pattern: &str) -> Result<Self, BuildError> {
        let invalid = || BuildError::InvalidVersionMatch(pattern.to_string());
        if pattern.is_empty() {
            return Err(invalid());
        }

        let parts: Vec<&str> = pattern.split('.').collect();
        let last = parts.len() - 1;
        let mut components = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            let component = match *part {
                "*" => VersionComponent::AnySingle,
                "+" if index == last => VersionComponent::AnySuffix,
                number => VersionComponent::Number(number.parse().map_err(|_| invalid())?),
            };
            components.push(component);
        }

        Ok(Self {
            pattern: pattern.to_string(),
            components,
        })
    }

    /// The pattern text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Compare a version to this pattern, treating wildcards as equal
    fn compare(&self, version: &Version) -> Ordering {
        let actual = version.components();
        for (index, component) in self.components.iter().enumerate() {
            match component {
                VersionComponent::AnySuffix => return Ordering::Equal,
                VersionComponent::AnySingle => {
                    if index >= actual.len() {
                        return Ordering::Less;
                    }
                }
                VersionComponent::Number(expected) => match actual.get(index) {
                    None => return Ordering::Less,
                    Some(value) if value != expected => return value.cmp(expected),
                    Some(_) => {}
                },
            }
        }
        if actual.len() > self.components.len() {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Returns true if `version` matches this pattern exactly
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        self.compare(version) == Ordering::Equal
    }

    /// Returns true if `version` is at or after this pattern
    #[must_use]
    pub fn matches_at_least(&self, version: &Version) -> bool {
        self.compare(version) != Ordering::Less
    }

    /// Returns true if `version` is at or before this pattern
    #[must_use]
    pub fn matches_at_most(&self, version: &Version) -> bool {
        self.compare(version) != Ordering::Greater
    }
}

impl fmt::Display for VersionMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl FromStr for VersionMatch {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Identifier and version of an evaluated policy or policy set
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdReference {
    id: Identifier,
    version: Version,
}

impl IdReference {
    /// Create a new id reference
    #[must_use]
    pub fn new(id: Identifier, version: Version) -> Self {
        Self { id, version }
    }

    /// The referenced identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// The referenced version
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }
}

/// Reference constraint: an identifier plus optional version constraints
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdReferenceMatch {
    id: Identifier,
    version: Option<VersionMatch>,
    earliest_version: Option<VersionMatch>,
    latest_version: Option<VersionMatch>,
}

impl IdReferenceMatch {
    /// Match any version of `id`
    #[must_use]
    pub fn new(id: impl Into<Identifier>) -> Self {
        Self {
            id: id.into(),
            version: None,
            earliest_version: None,
            latest_version: None,
        }
    }

    /// Require versions matching `pattern`
    #[must_use]
    pub fn with_version(mut self, pattern: VersionMatch) -> Self {
        self.version = Some(pattern);
        self
    }

    /// Require versions at or after `pattern`
    #[must_use]
    pub fn with_earliest_version(mut self, pattern: VersionMatch) -> Self {
        self.earliest_version = Some(pattern);
        self
    }

    /// Require versions at or before `pattern`
    #[must_use]
    pub fn with_latest_version(mut self, pattern: VersionMatch) -> Self {
        self.latest_version = Some(pattern);
        self
    }

    /// The referenced identifier
    #[must_use]
    pub fn id(&self) -> &Identifier {
        &self.id
    }

    /// Returns true if a candidate with this id and version satisfies the reference
    #[must_use]
    pub fn matches(&self, id: &Identifier, version: &Version) -> bool {
        self.id == *id
            && self.version.as_ref().map_or(true, |m| m.matches(version))
            && self
                .earliest_version
                .as_ref()
                .map_or(true, |m| m.matches_at_least(version))
            && self
                .latest_version
                .as_ref()
                .map_or(true, |m| m.matches_at_most(version))
    }
}

impl fmt::Display for IdReferenceMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if let Some(version) = &self.version {
            write!(f, " version={version}")?;
        }
        if let Some(earliest) = &self.earliest_version {
            write!(f, " earliest={earliest}")?;
        }
        if let Some(latest) = &self.latest_version {
            write!(f, " latest={latest}")?;
        }
        Ok(())
    }
}
