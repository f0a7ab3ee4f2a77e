//! Movie status stored as a SMALLINT.
//!
//! Discriminants are the stored values and must not be renumbered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status ID type matching the `movies.status` column.
pub type StatusId = i16;

/// A stored status value outside the known range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown movie status '{0}'")]
pub struct UnknownStatus(pub String);

/// Where a movie is in its run.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovieStatus {
    ComingSoon = 1,
    NowShowing = 2,
    Ended = 3,
}

impl MovieStatus {
    pub const ALL: [MovieStatus; 3] = [
        MovieStatus::ComingSoon,
        MovieStatus::NowShowing,
        MovieStatus::Ended,
    ];

    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Display label ("Now Showing").
    pub fn label(self) -> &'static str {
        match self {
            MovieStatus::ComingSoon => "Coming Soon",
            MovieStatus::NowShowing => "Now Showing",
            MovieStatus::Ended => "Ended",
        }
    }

    fn variant_name(self) -> &'static str {
        match self {
            MovieStatus::ComingSoon => "ComingSoon",
            MovieStatus::NowShowing => "NowShowing",
            MovieStatus::Ended => "Ended",
        }
    }
}

impl fmt::Display for MovieStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<MovieStatus> for StatusId {
    fn from(value: MovieStatus) -> Self {
        value as StatusId
    }
}

impl TryFrom<StatusId> for MovieStatus {
    type Error = UnknownStatus;

    fn try_from(id: StatusId) -> Result<Self, Self::Error> {
        MovieStatus::ALL
            .into_iter()
            .find(|status| status.id() == id)
            .ok_or_else(|| UnknownStatus(id.to_string()))
    }
}

impl FromStr for MovieStatus {
    type Err = UnknownStatus;

    /// Accepts the variant name (case-insensitive) or the numeric id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(id) = trimmed.parse::<StatusId>() {
            return MovieStatus::try_from(id);
        }
        MovieStatus::ALL
            .into_iter()
            .find(|status| status.variant_name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownStatus(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_stored_values() {
        assert_eq!(MovieStatus::ComingSoon.id(), 1);
        assert_eq!(MovieStatus::NowShowing.id(), 2);
        assert_eq!(MovieStatus::Ended.id(), 3);
    }

    #[test]
    fn unknown_id_is_rejected() {
        assert_eq!(MovieStatus::try_from(0), Err(UnknownStatus("0".into())));
        assert!(MovieStatus::try_from(4).is_err());
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("nowshowing".parse(), Ok(MovieStatus::NowShowing));
        assert_eq!("3".parse(), Ok(MovieStatus::Ended));
        assert!("Cancelled".parse::<MovieStatus>().is_err());
    }

    #[test]
    fn label_is_human_readable() {
        assert_eq!(MovieStatus::ComingSoon.to_string(), "Coming Soon");
    }
}
