//! Field extractors: one function per semantic type, each tolerant of
//! missing or malformed cells. Every mapping in layout.rs goes through these
//! so null handling is identical at every call site.

use crate::GeoPoint;
use crate::wire::Cell;
use chrono::{Datelike, Duration, NaiveDate};

/// Club-form tokens dropped when deriving a short team name.
const CLUB_TOKENS: [&str; 10] = [
    "uhc", "uht", "uh", "hc", "sv", "tv", "stv", "unihockey", "floorball", "club",
];

/// First text fragment of a cell, trimmed. Empty when the cell is missing.
pub fn text(cell: Option<&Cell>) -> String {
    line(cell, 0)
}

/// The `n`-th text fragment of a cell, trimmed.
pub fn line(cell: Option<&Cell>, n: usize) -> String {
    cell.and_then(|c| c.text.get(n))
        .map(|s| s.trim().to_owned())
        .unwrap_or_default()
}

/// All fragments joined with a single space.
pub fn joined(cell: Option<&Cell>) -> String {
    cell.map(|c| {
        c.text
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    })
    .unwrap_or_default()
}

/// Non-empty first fragment. Callers drop the row on `None`.
pub fn required_text(cell: Option<&Cell>) -> Option<String> {
    let t = text(cell);
    (!t.is_empty()).then_some(t)
}

/// Same as [`required_text`] but for optional columns.
pub fn optional_text(cell: Option<&Cell>) -> Option<String> {
    required_text(cell)
}

/// Integer value of the first fragment. Thousands separators (`'`, `’`,
/// spaces, `.`) are ignored; anything else non-numeric yields `None`.
pub fn int(cell: Option<&Cell>) -> Option<u32> {
    parse_int(&text(cell))
}

pub fn int_or_zero(cell: Option<&Cell>) -> u32 {
    int(cell).unwrap_or(0)
}

pub fn parse_int(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\'' | '’' | ' ' | '.' | '\u{a0}'))
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Signed integer, accepting a leading `+` or `-`.
pub fn signed_int(cell: Option<&Cell>) -> Option<i32> {
    let t = text(cell);
    let (sign, rest) = match t.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, t.strip_prefix('+').unwrap_or(&t)),
    };
    parse_int(rest).and_then(|n| i32::try_from(n).ok()).map(|n| sign * n)
}

/// First linked entity id of a cell.
pub fn link_id(cell: Option<&Cell>) -> Option<String> {
    cell.and_then(|c| c.link.as_ref())
        .and_then(|l| l.ids.first())
        .filter(|id| !id.is_empty())
        .cloned()
}

/// Deterministic id derived from a display name: lower-cased, whitespace
/// runs become `_`, everything outside `[a-z0-9_]` is dropped.
pub fn synthetic_id(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Upstream team id when the cell links one, otherwise the synthetic id.
pub fn team_id(cell: Option<&Cell>, name: &str) -> String {
    link_id(cell).unwrap_or_else(|| synthetic_id(name))
}

pub fn image_url(cell: Option<&Cell>) -> Option<String> {
    cell.and_then(|c| c.image.as_ref())
        .map(|i| i.url.trim().to_owned())
        .filter(|u| !u.is_empty())
}

pub fn has_image(cell: Option<&Cell>) -> bool {
    image_url(cell).is_some()
}

pub fn coordinates(cell: Option<&Cell>) -> Option<GeoPoint> {
    cell.and_then(|c| c.coordinates)
        .filter(|c| c.lat.is_finite() && c.lng.is_finite())
        .map(|c| GeoPoint { lat: c.lat, lng: c.lng })
}

/// Short display name: club-form tokens stripped, full name if nothing
/// would remain.
pub fn short_name(name: &str) -> String {
    let kept: Vec<&str> = name
        .split_whitespace()
        .filter(|token| {
            let bare = token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            !CLUB_TOKENS.contains(&bare.as_str())
        })
        .collect();
    if kept.is_empty() {
        name.trim().to_owned()
    } else {
        kept.join(" ")
    }
}

/// Finds a calendar date in free text. Understands `dd.mm.yyyy`, `dd.mm.yy`,
/// ISO `yyyy-mm-dd` and the relative words upstream uses for recent days.
pub fn parse_date(raw: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let lower = raw.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }
    for (word, offset) in [
        ("heute", 0),
        ("today", 0),
        ("gestern", -1),
        ("yesterday", -1),
        ("morgen", 1),
        ("tomorrow", 1),
    ] {
        if lower.contains(word) {
            return reference.checked_add_signed(Duration::days(offset));
        }
    }

    lower
        .split(|c: char| c.is_whitespace() || c == ',')
        .find_map(|token| parse_date_token(token.trim_matches('.').trim(), reference))
}

fn parse_date_token(token: &str, reference: NaiveDate) -> Option<NaiveDate> {
    if token.len() == 10 && token.as_bytes().get(4) == Some(&b'-') {
        return NaiveDate::parse_from_str(token, "%Y-%m-%d").ok();
    }
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let year: i32 = match parts[2].len() {
        4 => parts[2].parse().ok()?,
        2 => {
            let short: i32 = parts[2].parse().ok()?;
            reference.year() / 100 * 100 + short
        }
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `HH:MM` found in free text, zero-padded.
pub fn parse_time(raw: &str) -> Option<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .find_map(|token| {
            let token = token.trim_end_matches('h');
            let (h, m) = token.split_once(':')?;
            if h.is_empty() || h.len() > 2 || m.len() != 2 {
                return None;
            }
            let h: u32 = h.parse().ok()?;
            let m: u32 = m.parse().ok()?;
            (h < 24 && m < 60).then(|| format!("{h:02}:{m:02}"))
        })
}

/// `"45:30"` → `(45, 30)`.
pub fn goal_pair(raw: &str) -> Option<(u32, u32)> {
    let (f, a) = raw.split_once(':').or_else(|| raw.split_once('-'))?;
    Some((parse_int(f)?, parse_int(a)?))
}

/// Referee cells list names separated by `/`, `,` or `&`.
pub fn names_list(raw: &str) -> Vec<String> {
    raw.split(['/', ',', '&'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
