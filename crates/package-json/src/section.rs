use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::error::UnknownSection;

/// Which dependency section of `package.json` an entry belongs to.
///
/// Variants are declared strongest first; `Ord` follows declaration order,
/// so the minimum of several sections is the one that wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub enum DependencySection {
    /// "dependencies"
    #[default]
    Dependencies,
    /// "devDependencies"
    DevDependencies,
    /// "peerDependencies"
    PeerDependencies,
}

impl DependencySection {
    /// Strongest first.
    pub const PRECEDENCE: [DependencySection; 3] = [
        DependencySection::Dependencies,
        DependencySection::DevDependencies,
        DependencySection::PeerDependencies,
    ];

    /// Get the JSON key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dependencies => "dependencies",
            Self::DevDependencies => "devDependencies",
            Self::PeerDependencies => "peerDependencies",
        }
    }

    /// Sections weaker than this one.
    pub fn weaker(&self) -> impl Iterator<Item = DependencySection> + '_ {
        Self::PRECEDENCE.into_iter().filter(move |s| s > self)
    }
}

/// Parse from the JSON key
impl FromStr for DependencySection {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dependencies" => Ok(Self::Dependencies),
            "devDependencies" => Ok(Self::DevDependencies),
            "peerDependencies" => Ok(Self::PeerDependencies),
            other => Err(UnknownSection(other.to_string())),
        }
    }
}

impl Display for DependencySection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        assert!(DependencySection::Dependencies < DependencySection::DevDependencies);
        assert_eq!(
            DependencySection::Dependencies.weaker().collect::<Vec<_>>(),
            vec![
                DependencySection::DevDependencies,
                DependencySection::PeerDependencies
            ]
        );
        assert_eq!(DependencySection::PeerDependencies.weaker().count(), 0);
    }

    #[test]
    fn test_keys() {
        for section in DependencySection::PRECEDENCE {
            assert_eq!(section.as_str().parse(), Ok(section));
        }
        assert_eq!(
            "optionalDependencies".parse::<DependencySection>(),
            Err(UnknownSection("optionalDependencies".to_string()))
        );
    }
}
