//! Identity newtypes shared by every Duelquiz crate.
//!
//! All ids are plain `u64`s on the wire (`#[serde(transparent)]`), matching
//! the integer primary keys the user and question stores hand out. The
//! `Display` forms carry a one-letter prefix so log lines stay unambiguous:
//! `U-1 joined S-7` instead of `1 joined 7`.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }
    };
}

id_type!(
    /// A registered user. Seats in a match are filled by user ids.
    UserId,
    "U"
);

id_type!(
    /// A match session ("room"). Allocated by the session registry.
    SessionId,
    "S"
);

id_type!(
    /// A question in the catalog.
    QuestionId,
    "Q"
);

id_type!(
    /// A topical field that groups questions (e.g. "geography").
    FieldId,
    "F"
);

id_type!(
    /// An answer option. Every question owns exactly one correct option.
    OptionId,
    "O"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&UserId(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&SessionId(7)).unwrap(), "7");
        let qid: QuestionId = serde_json::from_str("13").unwrap();
        assert_eq!(qid, QuestionId(13));
    }

    #[test]
    fn test_ids_display_with_prefix() {
        assert_eq!(UserId(1).to_string(), "U-1");
        assert_eq!(SessionId(9).to_string(), "S-9");
        assert_eq!(QuestionId(3).to_string(), "Q-3");
        assert_eq!(FieldId(2).to_string(), "F-2");
        assert_eq!(OptionId(5).to_string(), "O-5");
    }
}
