//! Catalog records as stored in the artists table.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Release year. Clients send both `1997` and `"1997"`, and the stored JSON type
/// is kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(Number),
    Text(String),
}

impl Year {
    fn numeric(&self) -> Option<f64> {
        let value = match self {
            Year::Number(number) => number.as_f64(),
            Year::Text(text) => text.trim().parse::<f64>().ok(),
        }?;
        value.is_finite().then_some(value)
    }

    /// Empty text and zero count as "no year given".
    pub fn is_blank(&self) -> bool {
        match self {
            Year::Number(number) => number.as_f64() == Some(0.0),
            Year::Text(text) => text.is_empty(),
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Year::Number(number) => write!(f, "{}", number),
            Year::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<u16> for Year {
    fn from(value: u16) -> Year {
        Year::Number(value.into())
    }
}

impl From<&str> for Year {
    fn from(value: &str) -> Year {
        Year::Text(value.to_owned())
    }
}

/// Orders years for display, the way loosely typed comparison does:
///
/// - two strings compare lexically, so `"980"` sorts after `"1975"`;
/// - a number against a number or a numeric string compares numerically;
/// - non-numeric text sorts after numbers, and albums without a year last.
///
/// Mixing the string and numeric rules can form cycles (`9 < "10" < "8" < 9`),
/// so this is not a total order. Use [`sort_albums`], which tolerates that,
/// rather than `slice::sort_by`.
pub fn compare_years(a: Option<&Year>, b: Option<&Year>) -> Ordering {
    fn rank(year: Option<&Year>) -> u8 {
        match year {
            Some(year) if year.numeric().is_some() => 0,
            Some(Year::Text(_)) => 1,
            _ => 2,
        }
    }

    match (a, b) {
        (Some(Year::Text(x)), Some(Year::Text(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (x.numeric(), y.numeric()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => rank(a).cmp(&rank(b)),
        },
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Stable insertion sort by year. Albums only move past strictly greater
/// neighbours, so equal years keep their stored order and an inconsistent
/// comparison never panics.
pub fn sort_albums(albums: &mut [Album]) {
    for i in 1..albums.len() {
        let mut j = i;
        while j > 0
            && compare_years(albums[j - 1].year.as_ref(), albums[j].year.as_ref())
                == Ordering::Greater
        {
            albums.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// An album embedded in its artist's record. Attributes the catalog does not
/// model are kept in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Album {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,
    /// Older records may lack a condition; it reads back as `""`.
    #[serde(default)]
    pub condition: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Artist {
    pub fn new(name: impl Into<String>) -> Artist {
        Artist {
            name: name.into(),
            ..Artist::default()
        }
    }

    pub fn album(&self, album_id: &str) -> Option<&Album> {
        self.albums.iter().find(|album| album.id == album_id)
    }

    /// Read-side normalization: albums ascending by year.
    pub fn normalize(mut self) -> Artist {
        sort_albums(&mut self.albums);
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn album(id: &str, year: Option<Year>) -> Album {
        Album {
            id: id.to_owned(),
            title: format!("title {}", id),
            year,
            condition: "Mint".to_owned(),
            ..Album::default()
        }
    }

    #[test]
    fn missing_condition_reads_as_empty() {
        let artist: Artist = serde_json::from_value(json!({
            "id": "1",
            "name": "A",
            "albums": [{ "id": "x", "title": "T", "year": 1990 }]
        }))
        .expect("valid artist");

        assert_eq!(artist.albums[0].condition, "");
    }

    #[test]
    fn missing_albums_read_as_empty_list() {
        let artist: Artist =
            serde_json::from_value(json!({ "id": "1", "name": "A" })).expect("valid artist");
        assert!(artist.albums.is_empty());
    }

    #[test]
    fn year_keeps_its_json_type() {
        let numeric: Album =
            serde_json::from_value(json!({ "id": "a", "title": "T", "year": 1997 }))
                .expect("valid album");
        let text: Album =
            serde_json::from_value(json!({ "id": "b", "title": "T", "year": "1997" }))
                .expect("valid album");

        assert_eq!(serde_json::to_value(&numeric).expect("serializes")["year"], json!(1997));
        assert_eq!(serde_json::to_value(&text).expect("serializes")["year"], json!("1997"));
    }

    #[test]
    fn normalize_sorts_by_year() {
        let artist = Artist {
            id: "1".to_owned(),
            name: "A".to_owned(),
            albums: vec![
                album("c", Some(Year::from(2001))),
                album("a", Some(Year::from("1975"))),
                album("b", Some(Year::from(1990))),
            ],
            ..Artist::default()
        }
        .normalize();

        let ids: Vec<&str> = artist.albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn equal_years_keep_stored_order() {
        let artist = Artist {
            id: "1".to_owned(),
            name: "A".to_owned(),
            albums: vec![
                album("second-press", Some(Year::from(1980))),
                album("early", Some(Year::from(1970))),
                album("first-press", Some(Year::from("1980"))),
            ],
            ..Artist::default()
        }
        .normalize();

        let ids: Vec<&str> = artist.albums.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "second-press", "first-press"]);
    }

    #[test]
    fn text_years_compare_lexically() {
        assert_eq!(
            compare_years(Some(&Year::from("980")), Some(&Year::from("1975"))),
            Ordering::Greater
        );
        assert_eq!(
            compare_years(Some(&Year::from(980)), Some(&Year::from("1975"))),
            Ordering::Less
        );
    }

    #[test]
    fn cyclic_years_still_sort() {
        let mut albums = vec![
            album("nine", Some(Year::from(9))),
            album("ten", Some(Year::from("10"))),
            album("eight", Some(Year::from("8"))),
            album("none", None),
        ];
        sort_albums(&mut albums);

        assert_eq!(albums.len(), 4);
        assert_eq!(albums[3].id, "none");
    }

    #[test]
    fn unmodelled_attributes_round_trip() {
        let stored = json!({
            "id": "1",
            "name": "A",
            "genre": "rock",
            "albums": [{ "id": "a", "title": "T", "year": 2001, "condition": "VG", "label": "EMI" }]
        });

        let artist: Artist = serde_json::from_value(stored.clone()).expect("valid artist");
        assert_eq!(artist.extra["genre"], json!("rock"));
        assert_eq!(artist.albums[0].extra["label"], json!("EMI"));
        assert_eq!(serde_json::to_value(&artist).expect("serializes"), stored);
    }

    #[test]
    fn unknown_years_sort_last() {
        assert_eq!(
            compare_years(Some(&Year::from("unknown")), Some(&Year::from(1999))),
            Ordering::Greater
        );
        assert_eq!(compare_years(None, Some(&Year::from("unknown"))), Ordering::Greater);
        assert_eq!(
            compare_years(Some(&Year::from("b")), Some(&Year::from("a"))),
            Ordering::Greater
        );
        assert_eq!(compare_years(None, None), Ordering::Equal);
    }

    #[test]
    fn blank_years() {
        assert!(Year::from("").is_blank());
        assert!(Year::from(0).is_blank());
        assert!(!Year::from(1999).is_blank());
    }
}
