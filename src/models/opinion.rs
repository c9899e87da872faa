use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EnrichedMovie;

/// What a user recorded about a movie
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum Opinion {
    LovedIt = 1,
    DidntLikeIt = 2,
    WantToWatch = 3,
    Pass = 4,
}

impl Opinion {
    /// Opinions that seed personalized recommendations
    pub fn is_liked(self) -> bool {
        matches!(self, Opinion::LovedIt | Opinion::WantToWatch)
    }

    pub fn code(self) -> i16 {
        self as i16
    }
}

impl TryFrom<i16> for Opinion {
    type Error = String;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Opinion::LovedIt),
            2 => Ok(Opinion::DidntLikeIt),
            3 => Ok(Opinion::WantToWatch),
            4 => Ok(Opinion::Pass),
            other => Err(format!("unknown opinion code {}", other)),
        }
    }
}

impl std::str::FromStr for Opinion {
    type Err = String;

    /// Accepts the numeric code (`3`) or the snake_case name (`want_to_watch`)
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if let Ok(code) = raw.parse::<i16>() {
            return Opinion::try_from(code);
        }
        match raw {
            "loved_it" => Ok(Opinion::LovedIt),
            "didnt_like_it" => Ok(Opinion::DidntLikeIt),
            "want_to_watch" => Ok(Opinion::WantToWatch),
            "pass" => Ok(Opinion::Pass),
            other => Err(format!("unknown opinion {}", other)),
        }
    }
}

/// A user's recorded interaction with a movie
#[derive(Debug, Clone, PartialEq)]
pub struct UserMovie {
    pub user_id: i64,
    pub movie_id: i64,
    pub opinion: Opinion,
    pub created_at: DateTime<Utc>,
}

/// One page of a user's movie list
#[derive(Debug, Clone, Serialize)]
pub struct UserMoviesPage {
    pub movies: Vec<EnrichedMovie>,
    pub has_more: bool,
}

/// Slices `items` for a 1-based page. Out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], page: u32, page_size: u32) -> &[T] {
    let start = (page.max(1) as usize - 1).saturating_mul(page_size as usize);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size as usize).min(items.len());
    &items[start..end]
}
