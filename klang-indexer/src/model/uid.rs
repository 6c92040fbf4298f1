//! Stable entity identity
//!
//! A [`Uid`] is a cheap, reliable way to differentiate music entities,
//! derived either from a MusicBrainz ID found in the tags or from a SHA-256
//! content hash of the entity's non-subjective metadata. Unlike names (which
//! collide) or source-assigned row IDs (which drift as the collection
//! changes), a UID stays stable across sessions for as long as the
//! underlying metadata does.
//!
//! Treat UIDs as black boxes that can only be created, compared, and
//! round-tripped through their string form.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The kind of entity a [`Uid`] identifies. Two entities of different kinds
/// never compare equal, even if their hashed content matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Song,
    Album,
    Artist,
    Genre,
    Playlist,
}

impl ItemKind {
    fn code(&self) -> &'static str {
        match self {
            ItemKind::Song => "song",
            ItemKind::Album => "album",
            ItemKind::Artist => "artist",
            ItemKind::Genre => "genre",
            ItemKind::Playlist => "playlist",
        }
    }

    fn from_code(code: &str) -> Option<ItemKind> {
        match code {
            "song" => Some(ItemKind::Song),
            "album" => Some(ItemKind::Album),
            "artist" => Some(ItemKind::Artist),
            "genre" => Some(ItemKind::Genre),
            "playlist" => Some(ItemKind::Playlist),
            _ => None,
        }
    }
}

/// Where a [`Uid`]'s value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// Derived from a content hash of the entity's metadata.
    Klang,
    /// Taken verbatim from a MusicBrainz ID in the tags.
    MusicBrainz,
}

impl Namespace {
    fn prefix(&self) -> &'static str {
        match self {
            Namespace::Klang => "klang",
            Namespace::MusicBrainz => "musicbrainz",
        }
    }
}

/// A unique identifier for a piece of music.
///
/// Equality and hashing depend only on the namespace, the item kind, and
/// the 128-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uid {
    namespace: Namespace,
    item: ItemKind,
    value: u128,
}

impl Uid {
    /// Create a MusicBrainz-style UID from an ID extracted from a file.
    pub fn musicbrainz(item: ItemKind, mbid: Uuid) -> Uid {
        Uid {
            namespace: Namespace::MusicBrainz,
            item,
            value: mbid.as_u128(),
        }
    }

    /// Create a hashed UID from the non-subjective, unlikely-to-change
    /// metadata of the entity.
    ///
    /// The closure feeds the relevant fields into the digest. Make sure the
    /// fields fed (and their order) stay stable; changing them invalidates
    /// every previously persisted UID of that item kind.
    pub fn hashed(item: ItemKind, fill: impl FnOnce(&mut UidDigest)) -> Uid {
        let mut digest = UidDigest(Sha256::new());
        fill(&mut digest);
        let output = digest.0.finalize();
        // Truncate the digest to 128 bits. This does cleave off some of the
        // hash, but the remaining space is still far beyond any realistic
        // collection size.
        let value = u128::from_be_bytes(output[..16].try_into().unwrap());
        Uid {
            namespace: Namespace::Klang,
            item,
            value,
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn item(&self) -> ItemKind {
        self.item
    }
}

impl fmt::Display for Uid {
    /// Formats as `namespace:item-uuid`, e.g.
    /// `klang:song-0b744ae3-1326-4db9-9fe7-0b2658a6c9bb`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}",
            self.namespace.prefix(),
            self.item.code(),
            Uuid::from_u128(self.value)
        )
    }
}

impl FromStr for Uid {
    type Err = ();

    /// Parse a UID back from its string representation.
    fn from_str(s: &str) -> Result<Uid, ()> {
        let (namespace, rest) = s.split_once(':').ok_or(())?;
        let namespace = match namespace {
            "klang" => Namespace::Klang,
            "musicbrainz" => Namespace::MusicBrainz,
            _ => return Err(()),
        };
        let (code, uuid) = rest.split_once('-').ok_or(())?;
        let item = ItemKind::from_code(code).ok_or(())?;
        let uuid = Uuid::parse_str(uuid).map_err(|_| ())?;
        Ok(Uid {
            namespace,
            item,
            value: uuid.as_u128(),
        })
    }
}

/// Accumulates entity metadata into a UID hash.
///
/// Encoding rules, fixed forever:
/// - An absent optional value feeds the single sentinel byte `0x00`; a
///   present value feeds `0x01` followed by its encoding, so that
///   presence/absence itself is distinguishable.
/// - Strings are lower-cased and fed as a little-endian u32 byte length
///   followed by the UTF-8 bytes, making consecutive values unambiguous.
/// - Integers are fed as fixed-width little-endian bytes.
/// - Lists are fed as a little-endian u32 element count followed by each
///   element.
pub struct UidDigest(Sha256);

impl UidDigest {
    pub fn string(&mut self, value: Option<&str>) {
        match value {
            Some(value) => {
                self.0.update([0x01]);
                let folded = value.to_lowercase();
                self.0.update((folded.len() as u32).to_le_bytes());
                self.0.update(folded.as_bytes());
            }
            None => self.0.update([0x00]),
        }
    }

    pub fn u32(&mut self, value: Option<u32>) {
        match value {
            Some(value) => {
                self.0.update([0x01]);
                self.0.update(value.to_le_bytes());
            }
            None => self.0.update([0x00]),
        }
    }

    pub fn string_list<S: AsRef<str>>(&mut self, values: &[S]) {
        self.0.update((values.len() as u32).to_le_bytes());
        for value in values {
            self.string(Some(value.as_ref()));
        }
    }

    /// Feed a display representation of any value, e.g. a [`crate::tag::Date`].
    pub fn display(&mut self, value: Option<&dyn fmt::Display>) {
        match value {
            Some(value) => self.string(Some(&value.to_string())),
            None => self.string(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song_uid(name: &str, track: Option<u32>) -> Uid {
        Uid::hashed(ItemKind::Song, |d| {
            d.string(Some(name));
            d.u32(track);
        })
    }

    #[test]
    fn test_hashing_is_deterministic() {
        assert_eq!(song_uid("Paranoid", Some(2)), song_uid("Paranoid", Some(2)));
    }

    #[test]
    fn test_hashing_is_case_insensitive() {
        assert_eq!(song_uid("PARANOID", Some(2)), song_uid("paranoid", Some(2)));
    }

    #[test]
    fn test_different_fields_differ() {
        assert_ne!(song_uid("Paranoid", Some(2)), song_uid("Paranoid", Some(3)));
        assert_ne!(song_uid("Paranoid", Some(2)), song_uid("Iron Man", Some(2)));
    }

    #[test]
    fn test_absence_is_distinguished() {
        assert_ne!(song_uid("Paranoid", None), song_uid("Paranoid", Some(0)));
    }

    #[test]
    fn test_item_kind_distinguishes() {
        let song = Uid::hashed(ItemKind::Song, |d| d.string(Some("x")));
        let album = Uid::hashed(ItemKind::Album, |d| d.string(Some("x")));
        assert_ne!(song, album);
    }

    #[test]
    fn test_list_boundaries_are_unambiguous() {
        let joined = Uid::hashed(ItemKind::Song, |d| d.string_list(&["ab"]));
        let split = Uid::hashed(ItemKind::Song, |d| d.string_list(&["a", "b"]));
        assert_ne!(joined, split);
    }

    #[test]
    fn test_musicbrainz_priority_form() {
        let mbid = Uuid::parse_str("b1a9c0e9-d987-4042-ae91-78d6a3267d69").unwrap();
        let uid = Uid::musicbrainz(ItemKind::Artist, mbid);
        assert_eq!(uid.namespace(), Namespace::MusicBrainz);
        assert_eq!(
            uid.to_string(),
            "musicbrainz:artist-b1a9c0e9-d987-4042-ae91-78d6a3267d69"
        );
    }

    #[test]
    fn test_string_round_trip() {
        let uid = song_uid("Paranoid", Some(2));
        let parsed: Uid = uid.to_string().parse().unwrap();
        assert_eq!(uid, parsed);
    }

    #[test]
    fn test_from_str_rejects_malformed() {
        assert!("not-a-uid".parse::<Uid>().is_err());
        assert!("klang:song".parse::<Uid>().is_err());
        assert!("klang:wrong-b1a9c0e9-d987-4042-ae91-78d6a3267d69".parse::<Uid>().is_err());
        assert!("other:song-b1a9c0e9-d987-4042-ae91-78d6a3267d69".parse::<Uid>().is_err());
    }
}
