use serde::{Deserialize, Serialize};

/// Maximum title length, counted in characters.
pub const TITLE_MAX_LEN: usize = 100;
/// Substring rewritten by the bulk title update.
pub const UPDATE_FROM: &str = "to";
/// Replacement written in place of [`UPDATE_FROM`].
pub const UPDATE_TO: &str = "ttoo";

/// One movie entry. Rows, lines and in-memory elements all decode to this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub title: String,
    pub country: String,
    pub year: i32,
    pub runtime: Option<u32>,
}

impl Record {
    pub fn new(
        id: u32,
        title: impl Into<String>,
        country: impl Into<String>,
        year: i32,
        runtime: Option<u32>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            country: country.into(),
            year,
            runtime,
        }
    }

    /// Apply the bulk rewrite to this record's title in place.
    /// Returns true when the title changed.
    pub fn rewrite_title(&mut self) -> bool {
        match rewrite_title(&self.title) {
            Some(title) => {
                self.title = title;
                true
            }
            None => false,
        }
    }
}

/// Compute the rewritten title, or `None` when the title must stay as it is:
/// either the pattern does not occur or the result would exceed
/// [`TITLE_MAX_LEN`] characters.
pub fn rewrite_title(title: &str) -> Option<String> {
    if !title.contains(UPDATE_FROM) {
        return None;
    }
    let replaced = title.replace(UPDATE_FROM, UPDATE_TO);
    if replaced.chars().count() > TITLE_MAX_LEN {
        return None;
    }
    Some(replaced)
}
