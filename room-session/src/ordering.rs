//! Deterministic ordering of shared tracks
//!
//! Tracks are ordered by their joined artist names. The comparison is a
//! four-level collation after the Unicode collation algorithm's strengths:
//!
//! 1. base letters: accents and case are ignored, so `"Édith"` sorts with `"Edith"`
//!    and ahead of `"Zappa"`,
//! 2. accents: at equal base letters the unaccented form comes first,
//! 3. case: lowercase before uppercase at the first position where case differs,
//! 4. raw code points, so that only identical strings compare equal.
//!
//! Only identical artist strings are ties, and ties keep the order the server
//! sent them in (`slice::sort_by` is stable).

use std::cmp::Ordering;

use room_api::Track;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compare two display strings the way a user expects a list to read
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| {
            // lowercase first: map uppercase to `true` so `false` sorts ahead
            a.nfd()
                .map(char::is_uppercase)
                .cmp(b.nfd().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Lowercased letters with diacritics removed
fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .flat_map(fold_letter)
}

/// Lowercased decomposed text, diacritics kept
fn accented(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Latin letters that carry no decomposition but read as plain ones
fn fold_letter(c: char) -> FoldedLetter {
    let folded: &'static str = match c {
        'ø' => "o",
        'đ' | 'ð' => "d",
        'ł' => "l",
        'ı' => "i",
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        'þ' => "th",
        _ => return FoldedLetter::One(Some(c)),
    };
    FoldedLetter::Many(folded.chars())
}

enum FoldedLetter {
    One(Option<char>),
    Many(std::str::Chars<'static>),
}

impl Iterator for FoldedLetter {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        match self {
            FoldedLetter::One(c) => c.take(),
            FoldedLetter::Many(chars) => chars.next(),
        }
    }
}

/// Compare two tracks by their joined artist names
pub fn compare_tracks(a: &Track, b: &Track) -> Ordering {
    collate(&a.joined_artists(), &b.joined_artists())
}

/// Stable in-place sort of tracks by artists
pub fn sort_tracks(tracks: &mut [Track]) {
    // cache the joined strings so each track is formatted once
    let mut keyed: Vec<(String, Track)> = tracks
        .iter()
        .map(|t| (t.joined_artists(), t.clone()))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| collate(a, b));

    for (slot, (_, track)) in tracks.iter_mut().zip(keyed) {
        *slot = track;
    }
}

/// Sorted copy of `tracks`
pub fn sorted(tracks: &[Track]) -> Vec<Track> {
    let mut out = tracks.to_vec();
    sort_tracks(&mut out);
    out
}

/// Whether `tracks` is already in artist order
pub fn is_sorted(tracks: &[Track]) -> bool {
    tracks
        .windows(2)
        .all(|w| compare_tracks(&w[0], &w[1]) != Ordering::Greater)
}
