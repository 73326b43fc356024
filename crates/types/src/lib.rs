//! Validated primitive types shared by the ward crates.
//!
//! Every identifier that crosses a crate boundary (CLI argument, REST path segment, dataset
//! field) is parsed into one of these types first. Once constructed the value is known to be
//! well formed, so the core never re-validates identifier syntax.

use std::fmt;
use std::str::FromStr;

/// Maximum length accepted for any identifier.
pub const MAX_ID_LEN: usize = 32;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("{kind} identifier cannot be empty")]
    Empty { kind: &'static str },
    #[error("{kind} identifier exceeds {max} characters: '{value}'", max = MAX_ID_LEN)]
    TooLong { kind: &'static str, value: String },
    #[error(
        "{kind} identifier contains invalid characters (only ASCII letters, digits, '-' and '_' allowed): '{value}'"
    )]
    InvalidCharacters { kind: &'static str, value: String },
    #[error("bed identifier must be '<room>-<sequence>' with sequence >= 1, got: '{0}'")]
    InvalidBed(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NonEmptyText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

fn validate_id(kind: &'static str, input: &str) -> Result<String, IdError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty { kind });
    }
    if trimmed.len() > MAX_ID_LEN {
        return Err(IdError::TooLong {
            kind,
            value: trimmed.to_owned(),
        });
    }
    let ok = trimmed
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_'));
    if !ok {
        return Err(IdError::InvalidCharacters {
            kind,
            value: trimmed.to_owned(),
        });
    }
    Ok(trimmed.to_owned())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Parses and validates an identifier.
            pub fn parse(input: &str) -> Result<Self, IdError> {
                validate_id($kind, input).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Self::parse(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

string_id!(
    /// Patient identifier, conventionally `P` followed by a zero-padded number (`P001`).
    PatientId,
    "patient"
);

string_id!(
    /// Room identifier (`A-201`, `ICU-1`, `REC-1`).
    RoomId,
    "room"
);

string_id!(
    /// Staff member identifier.
    StaffId,
    "staff"
);

string_id!(
    /// Floor identifier (`ground`, `first`, ...).
    FloorId,
    "floor"
);

impl PatientId {
    /// Builds the conventional `P###` identifier for a registration number.
    pub fn numbered(number: u32) -> Self {
        Self(format!("P{number:03}"))
    }

    /// Returns the numeric suffix of a `P###` identifier, if it has one.
    pub fn number(&self) -> Option<u32> {
        self.0.strip_prefix('P').and_then(|n| n.parse().ok())
    }
}

/// A bed inside a room: `<room-id>-<sequence>`, e.g. `A-201-1`.
///
/// Room identifiers may themselves contain hyphens, so the sequence is always the text after
/// the *last* hyphen. Sequences start at 1.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BedId {
    room: RoomId,
    sequence: u16,
}

impl BedId {
    /// Builds the identifier for bed `sequence` of `room`.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidBed`] if `sequence` is zero or the combined identifier would
    /// exceed [`MAX_ID_LEN`].
    pub fn new(room: RoomId, sequence: u16) -> Result<Self, IdError> {
        let rendered = format!("{room}-{sequence}");
        if sequence == 0 || rendered.len() > MAX_ID_LEN {
            return Err(IdError::InvalidBed(rendered));
        }
        Ok(Self { room, sequence })
    }

    pub fn parse(input: &str) -> Result<Self, IdError> {
        let trimmed = input.trim();
        let (room, sequence) = trimmed
            .rsplit_once('-')
            .ok_or_else(|| IdError::InvalidBed(trimmed.to_owned()))?;
        let room = RoomId::parse(room).map_err(|_| IdError::InvalidBed(trimmed.to_owned()))?;
        let sequence: u16 = sequence
            .parse()
            .map_err(|_| IdError::InvalidBed(trimmed.to_owned()))?;
        Self::new(room, sequence)
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn sequence(&self) -> u16 {
        self.sequence
    }
}

impl fmt::Display for BedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.room, self.sequence)
    }
}

impl FromStr for BedId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl serde::Serialize for BedId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for BedId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BedId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        assert_eq!(NonEmptyText::new("  Ward round ").unwrap().as_str(), "Ward round");
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn ids_accept_hospital_style_identifiers() {
        for raw in ["P001", "A-201", "ICU-1", "dr_johnson", "ground"] {
            assert_eq!(RoomId::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn ids_reject_spaces_and_symbols() {
        let err = PatientId::parse("P 001").unwrap_err();
        assert!(matches!(err, IdError::InvalidCharacters { kind: "patient", .. }));
        assert!(matches!(
            StaffId::parse(""),
            Err(IdError::Empty { kind: "staff" })
        ));
        assert!(matches!(
            FloorId::parse(&"x".repeat(MAX_ID_LEN + 1)),
            Err(IdError::TooLong { .. })
        ));
    }

    #[test]
    fn patient_numbering() {
        assert_eq!(PatientId::numbered(7).as_str(), "P007");
        assert_eq!(PatientId::numbered(1234).as_str(), "P1234");
        assert_eq!(PatientId::parse("P099").unwrap().number(), Some(99));
        assert_eq!(PatientId::parse("WARD").unwrap().number(), None);
    }

    #[test]
    fn bed_id_splits_on_last_hyphen() {
        let bed = BedId::parse("A-201-1").unwrap();
        assert_eq!(bed.room().as_str(), "A-201");
        assert_eq!(bed.sequence(), 1);
        assert_eq!(bed.to_string(), "A-201-1");

        let icu = BedId::parse("ICU-3-1").unwrap();
        assert_eq!(icu.room().as_str(), "ICU-3");
    }

    #[test]
    fn bed_id_rejects_missing_or_zero_sequence() {
        assert!(matches!(BedId::parse("A201"), Err(IdError::InvalidBed(_))));
        assert!(matches!(BedId::parse("A-201-0"), Err(IdError::InvalidBed(_))));
        assert!(matches!(BedId::parse("A-201-x"), Err(IdError::InvalidBed(_))));
        assert!(matches!(BedId::parse("-1"), Err(IdError::InvalidBed(_))));
    }

    #[test]
    fn ids_serialise_as_plain_strings() {
        let bed = BedId::parse("ICU-2-1").unwrap();
        assert_eq!(serde_json::to_string(&bed).unwrap(), "\"ICU-2-1\"");
        let back: BedId = serde_json::from_str("\"ICU-2-1\"").unwrap();
        assert_eq!(back, bed);

        let bad: Result<PatientId, _> = serde_json::from_str("\"P 1\"");
        assert!(bad.is_err());
    }
}
