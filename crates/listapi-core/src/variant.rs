//! List variants
//!
//! A [`ListVariant`] is the identity a request resolves to: which table it
//! addresses, which JSON shape applies, and whether it may be modified.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Allow/deny scope of a domain list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Allow,
    Deny,
    /// Both allow and deny entries
    Any,
}

/// Matching kind of a domain list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Exact,
    Regex,
    /// Both exact and regex entries
    Any,
}

/// The list a request addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListVariant {
    Groups,
    Adlists,
    Clients,
    DomainList { scope: Scope, kind: Kind },
}

impl ListVariant {
    /// Shorthand for a domain list variant
    pub const fn domains(scope: Scope, kind: Kind) -> Self {
        Self::DomainList { scope, kind }
    }

    /// Whether the public API may create, update, or delete rows of this list
    ///
    /// Broad domain lists (any scope or any kind) are read-only views over
    /// several stored types, so a write would be ambiguous.
    pub fn is_mutable(&self) -> bool {
        match self {
            Self::Groups | Self::Adlists | Self::Clients => true,
            Self::DomainList { scope, kind } => *scope != Scope::Any && *kind != Kind::Any,
        }
    }

    /// Key under which a read nests its result array
    pub fn collection_key(&self) -> &'static str {
        match self {
            Self::Groups => "groups",
            Self::Adlists => "adlists",
            Self::Clients | Self::DomainList { .. } => "domains",
        }
    }

    /// The single stored type a fully specific domain list writes
    pub fn domain_type(&self) -> Option<DomainType> {
        match self {
            Self::DomainList { scope, kind } => DomainType::from_parts(*scope, *kind),
            Self::Groups | Self::Adlists | Self::Clients => None,
        }
    }

    /// Whether a stored domain type is visible through this variant
    pub fn matches_type(&self, domain_type: DomainType) -> bool {
        match self {
            Self::DomainList { scope, kind } => {
                (*scope == Scope::Any || *scope == domain_type.scope())
                    && (*kind == Kind::Any || *kind == domain_type.kind())
            }
            Self::Groups | Self::Adlists | Self::Clients => false,
        }
    }

    /// Whether rows of this list carry group memberships
    pub fn has_groups(&self) -> bool {
        match self {
            Self::Clients | Self::DomainList { .. } => true,
            Self::Groups | Self::Adlists => false,
        }
    }
}

impl fmt::Display for ListVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Groups => f.write_str("groups"),
            Self::Adlists => f.write_str("adlists"),
            Self::Clients => f.write_str("clients"),
            Self::DomainList { scope, kind } => {
                f.write_str("domains")?;
                match scope {
                    Scope::Allow => f.write_str("/allow")?,
                    Scope::Deny => f.write_str("/deny")?,
                    Scope::Any => {}
                }
                match kind {
                    Kind::Exact => f.write_str("/exact"),
                    Kind::Regex => f.write_str("/regex"),
                    Kind::Any => Ok(()),
                }
            }
        }
    }
}

/// Stored classification of a domain list row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DomainType {
    #[serde(rename = "allow/exact")]
    AllowExact,
    #[serde(rename = "allow/regex")]
    AllowRegex,
    #[serde(rename = "deny/exact")]
    DenyExact,
    #[serde(rename = "deny/regex")]
    DenyRegex,
}

impl DomainType {
    /// Build a stored type from a specific scope and kind
    pub fn from_parts(scope: Scope, kind: Kind) -> Option<Self> {
        match (scope, kind) {
            (Scope::Allow, Kind::Exact) => Some(Self::AllowExact),
            (Scope::Allow, Kind::Regex) => Some(Self::AllowRegex),
            (Scope::Deny, Kind::Exact) => Some(Self::DenyExact),
            (Scope::Deny, Kind::Regex) => Some(Self::DenyRegex),
            (Scope::Any, _) | (_, Kind::Any) => None,
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            Self::AllowExact | Self::AllowRegex => Scope::Allow,
            Self::DenyExact | Self::DenyRegex => Scope::Deny,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::AllowExact | Self::DenyExact => Kind::Exact,
            Self::AllowRegex | Self::DenyRegex => Kind::Regex,
        }
    }

    /// Wire label, e.g. `allow/exact`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllowExact => "allow/exact",
            Self::AllowRegex => "allow/regex",
            Self::DenyExact => "deny/exact",
            Self::DenyRegex => "deny/regex",
        }
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow/exact" => Ok(Self::AllowExact),
            "allow/regex" => Ok(Self::AllowRegex),
            "deny/exact" => Ok(Self::DenyExact),
            "deny/regex" => Ok(Self::DenyRegex),
            other => Err(crate::Error::invalid_input(format!(
                "unknown domain type '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_SCOPES: [Scope; 3] = [Scope::Allow, Scope::Deny, Scope::Any];
    const ALL_KINDS: [Kind; 3] = [Kind::Exact, Kind::Regex, Kind::Any];

    #[test]
    fn only_specific_domain_lists_are_mutable() {
        for scope in ALL_SCOPES {
            for kind in ALL_KINDS {
                let variant = ListVariant::domains(scope, kind);
                let expected = scope != Scope::Any && kind != Kind::Any;
                assert_eq!(variant.is_mutable(), expected, "{}", variant);
            }
        }

        assert!(ListVariant::Groups.is_mutable());
        assert!(ListVariant::Adlists.is_mutable());
        assert!(ListVariant::Clients.is_mutable());
    }

    #[test]
    fn mutable_variants_have_a_single_domain_type() {
        for scope in ALL_SCOPES {
            for kind in ALL_KINDS {
                let variant = ListVariant::domains(scope, kind);
                assert_eq!(variant.domain_type().is_some(), variant.is_mutable());
            }
        }
    }

    #[test]
    fn broad_variants_match_their_members() {
        let allow_any = ListVariant::domains(Scope::Allow, Kind::Any);
        assert!(allow_any.matches_type(DomainType::AllowExact));
        assert!(allow_any.matches_type(DomainType::AllowRegex));
        assert!(!allow_any.matches_type(DomainType::DenyExact));

        let any_regex = ListVariant::domains(Scope::Any, Kind::Regex);
        assert!(any_regex.matches_type(DomainType::DenyRegex));
        assert!(!any_regex.matches_type(DomainType::AllowExact));

        let everything = ListVariant::domains(Scope::Any, Kind::Any);
        assert!(everything.matches_type(DomainType::DenyExact));
        assert!(!ListVariant::Groups.matches_type(DomainType::DenyExact));
    }

    #[test]
    fn collection_keys() {
        assert_eq!(ListVariant::Groups.collection_key(), "groups");
        assert_eq!(ListVariant::Adlists.collection_key(), "adlists");
        assert_eq!(ListVariant::Clients.collection_key(), "domains");
        assert_eq!(
            ListVariant::domains(Scope::Deny, Kind::Regex).collection_key(),
            "domains"
        );
    }

    #[test]
    fn domain_type_labels_parse_back() {
        for label in ["allow/exact", "allow/regex", "deny/exact", "deny/regex"] {
            let parsed: DomainType = label.parse().unwrap();
            assert_eq!(parsed.as_str(), label);
        }
        assert!("allow".parse::<DomainType>().is_err());
    }

    #[test]
    fn display_names() {
        assert_eq!(
            ListVariant::domains(Scope::Allow, Kind::Exact).to_string(),
            "domains/allow/exact"
        );
        assert_eq!(
            ListVariant::domains(Scope::Any, Kind::Regex).to_string(),
            "domains/regex"
        );
        assert_eq!(ListVariant::domains(Scope::Any, Kind::Any).to_string(), "domains");
    }
}
