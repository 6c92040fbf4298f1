//! Release type parsing
//!
//! Albums are classified from MusicBrainz-style release group type tags: a
//! primary type (album/ep/single) optionally followed by secondary types
//! that refine it (live, remix, compilation, ...). Unrecognized primary
//! types are treated as plain albums so that arbitrary tags never fail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of release a particular album is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseType {
    /// A full-length release.
    Album(Option<Refinement>),
    /// A shorter extended-play release.
    Ep(Option<Refinement>),
    /// A release of one or very few tracks.
    Single(Option<Refinement>),
    /// A collection of tracks from several other releases or artists.
    Compilation(Option<Refinement>),
    /// Music released as part of another medium, like a film score.
    Soundtrack,
    /// A continuous DJ mix.
    Mix,
    /// A mixtape, often self-released.
    Mixtape,
    /// A demo recording.
    Demo,
}

/// A specification of what kind of performance a release is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Refinement {
    /// A live performance.
    Live,
    /// Another artist's remix of a prior performance.
    Remix,
}

impl ReleaseType {
    /// The refinement of this release type, if any.
    pub fn refinement(&self) -> Option<Refinement> {
        match self {
            ReleaseType::Album(r)
            | ReleaseType::Ep(r)
            | ReleaseType::Single(r)
            | ReleaseType::Compilation(r) => *r,
            _ => None,
        }
    }

    /// Parse a release type from a list of type tags, primary first.
    ///
    /// Returns None for an empty list; callers decide the default.
    pub fn parse(types: &[String]) -> Option<ReleaseType> {
        let primary = types.first()?;
        // Primary types should be the first types in the sequence.
        if primary.eq_ignore_ascii_case("album") {
            Some(parse_secondary_types(types, 1, ReleaseType::Album))
        } else if primary.eq_ignore_ascii_case("ep") {
            Some(parse_secondary_types(types, 1, ReleaseType::Ep))
        } else if primary.eq_ignore_ascii_case("single") {
            Some(parse_secondary_types(types, 1, ReleaseType::Single))
        } else {
            // Whether primary types are a pre-requisite for secondary types
            // is unspecified, so orphaned secondary types are mapped onto an
            // Album release type.
            Some(parse_secondary_types(types, 0, ReleaseType::Album))
        }
    }
}

fn parse_secondary_types(
    types: &[String],
    index: usize,
    with_refinement: fn(Option<Refinement>) -> ReleaseType,
) -> ReleaseType {
    let secondary = types.get(index).map(String::as_str);
    if secondary.is_some_and(|s| s.eq_ignore_ascii_case("compilation")) {
        // The release is a compilation; the next type may still refine it.
        parse_secondary_type(
            types.get(index + 1).map(String::as_str),
            ReleaseType::Compilation,
        )
    } else {
        parse_secondary_type(secondary, with_refinement)
    }
}

fn parse_secondary_type(
    secondary: Option<&str>,
    with_refinement: fn(Option<Refinement>) -> ReleaseType,
) -> ReleaseType {
    match secondary {
        Some(s) if s.eq_ignore_ascii_case("soundtrack") => ReleaseType::Soundtrack,
        Some(s) if s.eq_ignore_ascii_case("dj-mix") => ReleaseType::Mix,
        Some(s) if s.eq_ignore_ascii_case("mixtape/street") => ReleaseType::Mixtape,
        Some(s) if s.eq_ignore_ascii_case("demo") => ReleaseType::Demo,
        Some(s) if s.eq_ignore_ascii_case("live") => with_refinement(Some(Refinement::Live)),
        Some(s) if s.eq_ignore_ascii_case("remix") => with_refinement(Some(Refinement::Remix)),
        _ => with_refinement(None),
    }
}

impl Default for ReleaseType {
    fn default() -> Self {
        ReleaseType::Album(None)
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let base = match self {
            ReleaseType::Album(_) => "Album",
            ReleaseType::Ep(_) => "EP",
            ReleaseType::Single(_) => "Single",
            ReleaseType::Compilation(_) => "Compilation",
            ReleaseType::Soundtrack => "Soundtrack",
            ReleaseType::Mix => "DJ Mix",
            ReleaseType::Mixtape => "Mixtape",
            ReleaseType::Demo => "Demo",
        };
        match self.refinement() {
            None => write!(f, "{base}"),
            Some(Refinement::Live) => write!(f, "Live {base}"),
            Some(Refinement::Remix) => write!(f, "Remix {base}"),
        }
    }
}
