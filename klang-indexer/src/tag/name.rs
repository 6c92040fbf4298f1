//! Entity display and sort names

use klang_common::config::KlangConfig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// The name of a music entity.
///
/// Songs and albums always carry a known name; artists and genres may have
/// had no tag at all, in which case a placeholder is used. Placeholders sort
/// before all known names so "unknown" buckets surface together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Name {
    Known(KnownName),
    Unknown(Placeholder),
}

/// A name actually present in the metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KnownName {
    raw: String,
    sort: Option<String>,
    sort_key: String,
}

/// What kind of entity an unknown name stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placeholder {
    Artist,
    Genre,
}

impl Name {
    /// Interpret a raw name and optional sort tag.
    pub fn known(raw: &str, sort: Option<&str>, config: &KlangConfig) -> Name {
        let sort_key = sort_key(sort.unwrap_or(raw), config);
        Name::Known(KnownName {
            raw: raw.to_string(),
            sort: sort.map(str::to_string),
            sort_key,
        })
    }

    /// Interpret an optional raw name, falling back to a placeholder.
    pub fn known_or(raw: Option<&str>, sort: Option<&str>, placeholder: Placeholder, config: &KlangConfig) -> Name {
        match raw {
            Some(raw) => Name::known(raw, sort, config),
            None => Name::Unknown(placeholder),
        }
    }

    /// The raw tag value, or None for a placeholder.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Name::Known(known) => Some(&known.raw),
            Name::Unknown(_) => None,
        }
    }

    /// The raw sort tag value, if one was present.
    pub fn sort(&self) -> Option<&str> {
        match self {
            Name::Known(known) => known.sort.as_deref(),
            Name::Unknown(_) => None,
        }
    }

    /// The key this name sorts by. Placeholders sort before everything.
    pub fn sort_key(&self) -> &str {
        match self {
            Name::Known(known) => &known.sort_key,
            Name::Unknown(_) => "",
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::Known(known) => write!(f, "{}", known.raw),
            Name::Unknown(Placeholder::Artist) => write!(f, "Unknown Artist"),
            Name::Unknown(Placeholder::Genre) => write!(f, "Unknown Genre"),
        }
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Name::Unknown(_), Name::Known(_)) => Ordering::Less,
            (Name::Known(_), Name::Unknown(_)) => Ordering::Greater,
            (Name::Unknown(a), Name::Unknown(b)) => a.cmp(b),
            (Name::Known(a), Name::Known(b)) => a
                .sort_key
                .cmp(&b.sort_key)
                .then_with(|| a.raw.cmp(&b.raw))
                .then_with(|| a.sort.cmp(&b.sort)),
        }
    }
}

impl PartialOrd for Placeholder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Placeholder {
    fn cmp(&self, other: &Self) -> Ordering {
        (*self as u8).cmp(&(*other as u8))
    }
}

/// Compute the case-folded key a name sorts by. With intelligent sort names
/// enabled, a leading English article is dropped, so "The Beatles" sorts
/// under B.
fn sort_key(name: &str, config: &KlangConfig) -> String {
    let folded = name.trim().to_lowercase();
    if !config.intelligent_sort_names {
        return folded;
    }
    for article in ["the ", "an ", "a "] {
        if let Some(rest) = folded.strip_prefix(article) {
            let rest = rest.trim_start();
            if !rest.is_empty() {
                return rest.to_string();
            }
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(intelligent: bool) -> KlangConfig {
        KlangConfig {
            intelligent_sort_names: intelligent,
            ..Default::default()
        }
    }

    #[test]
    fn test_explicit_sort_tag_wins() {
        let name = Name::known("The Smile", Some("Smile, The"), &config(true));
        assert_eq!(name.sort_key(), "smile, the");
        assert_eq!(name.to_string(), "The Smile");
    }

    #[test]
    fn test_intelligent_article_stripping() {
        let name = Name::known("The Beatles", None, &config(true));
        assert_eq!(name.sort_key(), "beatles");
        let name = Name::known("A Winged Victory for the Sullen", None, &config(true));
        assert_eq!(name.sort_key(), "winged victory for the sullen");
    }

    #[test]
    fn test_article_stripping_disabled() {
        let name = Name::known("The Beatles", None, &config(false));
        assert_eq!(name.sort_key(), "the beatles");
    }

    #[test]
    fn test_name_that_is_only_an_article() {
        // "The The" strips one article but never to an empty key... and a
        // bare "The" keeps its own name as the key.
        let name = Name::known("The", None, &config(true));
        assert_eq!(name.sort_key(), "the");
        let name = Name::known("The The", None, &config(true));
        assert_eq!(name.sort_key(), "the");
    }

    #[test]
    fn test_unknown_sorts_first() {
        let unknown = Name::Unknown(Placeholder::Artist);
        let known = Name::known("Aphex Twin", None, &config(true));
        assert!(unknown < known);
        assert_eq!(unknown.to_string(), "Unknown Artist");
        assert!(unknown.raw().is_none());
    }
}
