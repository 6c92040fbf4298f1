//! ID3 genre parsing
//!
//! ID3v1 stores genres as an index into a conventional table, and ID3v2.3
//! allows several such indices plus free-form names in a single field
//! (`(51)(39)Custom`). Both forms are resolved here into plain genre names.
//! The parsing rules are derived from mutagen's TCON handling.

use crate::tag::util::{parse_multi_value, split_escaped};
use klang_common::config::KlangConfig;

/// Parse a multi-value genre tag using ID3 rules.
///
/// ID3v1 integer values are converted to their named counterparts, and
/// singular ID3v2-style composite fields are split into one or more names.
/// Anything unrecognized falls back to the literal raw token, and finally to
/// the user's separator configuration.
pub fn parse_id3_genre_names(values: &[String], config: &KlangConfig) -> Vec<String> {
    if values.len() == 1 {
        parse_id3_multi_value_genre(&values[0], config)
    } else {
        // Nothing to split, just map any ID3v1 genres to their named
        // counterparts.
        values
            .iter()
            .map(|v| parse_id3v1_genre(v).unwrap_or(v.as_str()).to_string())
            .collect()
    }
}

fn parse_id3_multi_value_genre(value: &str, config: &KlangConfig) -> Vec<String> {
    if let Some(name) = parse_id3v1_genre(value) {
        return vec![name.to_string()];
    }
    if let Some(names) = parse_id3v2_genre(value) {
        return names;
    }
    parse_multi_value(std::slice::from_ref(&value.to_string()), config)
}

/// Parse an ID3v1 integer genre field.
///
/// Returns a named genre if the field is a valid table index, "Cover" or
/// "Remix" for the "CR"/"RX" pseudo-indices, and None otherwise.
fn parse_id3v1_genre(value: &str) -> Option<&'static str> {
    // ID3v1 genres are a plain integer without formatting, so try to index
    // the genre table with such.
    match value.parse::<usize>() {
        Ok(index) => GENRE_TABLE.get(index).copied(),
        // CR and RX are not technically ID3v1, but are formatted similarly
        // to a plain number.
        Err(_) => match value {
            "CR" => Some("Cover"),
            "RX" => Some("Remix"),
            _ => None,
        },
    }
}

/// Parse an ID3v2 genre field, which supports multiple genre indices and
/// combined index/name values like `(51)(39)Psybient`.
///
/// Returns None if the field is not in ID3v2 format, in which case the
/// caller should treat it as a plain name.
fn parse_id3v2_genre(value: &str) -> Option<Vec<String>> {
    let (ids, name) = split_id3v2_groups(value);

    let mut genres: Vec<String> = Vec::new();
    let mut push = |genre: String| {
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    };

    // Case 1: Genre IDs in the format (INT|RX|CR), parsed as ID3v1 values.
    for id in ids {
        if let Some(resolved) = parse_id3v1_genre(id) {
            push(resolved.to_string());
        }
    }

    // Case 2: A trailing genre name. `((` escapes a literal leading
    // parenthesis in the name.
    if !name.is_empty() {
        if let Some(stripped) = name.strip_prefix("((") {
            push(format!("({stripped}"));
        } else {
            push(name.to_string());
        }
    }

    // If this parsing changed nothing, the field was not in ID3v2 format.
    if genres.len() == 1 && genres[0] == value {
        return None;
    }

    Some(genres)
}

/// Split an ID3v2 genre field into its leading parenthesized index tokens
/// and the trailing name. Equivalent to mutagen's
/// `((?:\((\d+|RX|CR)\))*)(.+)?` grouping.
fn split_id3v2_groups(value: &str) -> (Vec<&str>, &str) {
    let mut ids = Vec::new();
    let mut rest = value;

    loop {
        // `((` starts an escaped name, not an index group.
        if rest.starts_with("((") {
            break;
        }
        let Some(inner) = rest.strip_prefix('(') else {
            break;
        };
        let Some(end) = inner.find(')') else {
            break;
        };
        let token = &inner[..end];
        let valid = token == "RX"
            || token == "CR"
            || (!token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()));
        if !valid {
            break;
        }
        ids.push(token);
        rest = &inner[end + 1..];
    }

    (ids, rest)
}

/// The "conventional" mapping between ID3v1 integer genres and their named
/// counterparts. Includes non-standard extensions.
const GENRE_TABLE: &[&str] = &[
    // ID3 Standard
    "Blues",
    "Classic Rock",
    "Country",
    "Dance",
    "Disco",
    "Funk",
    "Grunge",
    "Hip-Hop",
    "Jazz",
    "Metal",
    "New Age",
    "Oldies",
    "Other",
    "Pop",
    "R&B",
    "Rap",
    "Reggae",
    "Rock",
    "Techno",
    "Industrial",
    "Alternative",
    "Ska",
    "Death Metal",
    "Pranks",
    "Soundtrack",
    "Euro-Techno",
    "Ambient",
    "Trip-Hop",
    "Vocal",
    "Jazz+Funk",
    "Fusion",
    "Trance",
    "Classical",
    "Instrumental",
    "Acid",
    "House",
    "Game",
    "Sound Clip",
    "Gospel",
    "Noise",
    "AlternRock",
    "Bass",
    "Soul",
    "Punk",
    "Space",
    "Meditative",
    "Instrumental Pop",
    "Instrumental Rock",
    "Ethnic",
    "Gothic",
    "Darkwave",
    "Techno-Industrial",
    "Electronic",
    "Pop-Folk",
    "Eurodance",
    "Dream",
    "Southern Rock",
    "Comedy",
    "Cult",
    "Gangsta",
    "Top 40",
    "Christian Rap",
    "Pop/Funk",
    "Jungle",
    "Native American",
    "Cabaret",
    "New Wave",
    "Psychadelic",
    "Rave",
    "Showtunes",
    "Trailer",
    "Lo-Fi",
    "Tribal",
    "Acid Punk",
    "Acid Jazz",
    "Polka",
    "Retro",
    "Musical",
    "Rock & Roll",
    "Hard Rock",
    // Winamp extensions, more or less a de-facto standard
    "Folk",
    "Folk-Rock",
    "National Folk",
    "Swing",
    "Fast Fusion",
    "Bebob",
    "Latin",
    "Revival",
    "Celtic",
    "Bluegrass",
    "Avantgarde",
    "Gothic Rock",
    "Progressive Rock",
    "Psychedelic Rock",
    "Symphonic Rock",
    "Slow Rock",
    "Big Band",
    "Chorus",
    "Easy Listening",
    "Acoustic",
    "Humour",
    "Speech",
    "Chanson",
    "Opera",
    "Chamber Music",
    "Sonata",
    "Symphony",
    "Booty Bass",
    "Primus",
    "Porn Groove",
    "Satire",
    "Slow Jam",
    "Club",
    "Tango",
    "Samba",
    "Folklore",
    "Ballad",
    "Power Ballad",
    "Rhythmic Soul",
    "Freestyle",
    "Duet",
    "Punk Rock",
    "Drum Solo",
    "A capella",
    "Euro-House",
    "Dance Hall",
    "Goa",
    "Drum & Bass",
    "Club-House",
    "Hardcore",
    "Terror",
    "Indie",
    "Britpop",
    "Negerpunk",
    "Polsk Punk",
    "Beat",
    "Christian Gangsta",
    "Heavy Metal",
    "Black Metal",
    "Crossover",
    "Contemporary Christian",
    "Christian Rock",
    "Merengue",
    "Salsa",
    "Thrash Metal",
    "Anime",
    "JPop",
    "Synthpop",
    // Winamp 5.6+ extensions, also used by EasyTAG
    "Abstract",
    "Art Rock",
    "Baroque",
    "Bhangra",
    "Big Beat",
    "Breakbeat",
    "Chillout",
    "Downtempo",
    "Dub",
    "EBM",
    "Eclectic",
    "Electro",
    "Electroclash",
    "Emo",
    "Experimental",
    "Garage",
    "Global",
    "IDM",
    "Illbient",
    "Industro-Goth",
    "Jam Band",
    "Krautrock",
    "Leftfield",
    "Lounge",
    "Math Rock",
    "New Romantic",
    "Nu-Breakz",
    "Post-Punk",
    "Post-Rock",
    "Psytrance",
    "Shoegaze",
    "Space Rock",
    "Trop Rock",
    "World Music",
    "Neoclassical",
    "Audiobook",
    "Audio Theatre",
    "Neue Deutsche Welle",
    "Podcast",
    "Indie Rock",
    "G-Funk",
    "Dubstep",
    "Garage Rock",
    "Psybient",
];
