/// Shared types used across the codebase

use serde::Deserialize;

/// Rejected textual value for one of the closed string enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{value}', expected one of: {expected}")]
pub struct ValueError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Declares a closed set of string values stored as TEXT columns.
///
/// Generates `as_str`, `FromStr`, `Display`, serde (as the plain string) and
/// the sqlx `Type`/`Encode`/`Decode` impls for Postgres.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::types::ValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err($crate::types::ValueError {
                        kind: stringify!($name),
                        value: s.to_string(),
                        expected: [$($text),+].join(", "),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(raw.parse::<$name>()?)
            }
        }
    };
}

pub(crate) use text_enum;

text_enum! {
    /// Which of the four applications a token or account belongs to.
    pub enum Portal {
        Registration => "registration",
        Tutoring => "tutoring",
        Freelance => "freelance",
        Store => "store",
    }
}

/// Full English weekday name for any spelling chrono accepts
/// ("mon", "Monday", "MONDAY").
pub fn canonical_weekday(raw: &str) -> Option<&'static str> {
    let day: chrono::Weekday = raw.trim().parse().ok()?;
    Some(match day {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    })
}

/// A list field that clients send either as a JSON array or as one
/// comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    Many(Vec<String>),
    Joined(String),
}

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        let items = match self {
            StringList::Many(items) => items,
            StringList::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        };
        items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_parses_and_displays() {
        assert_eq!("store".parse::<Portal>().unwrap(), Portal::Store);
        assert_eq!(Portal::Tutoring.to_string(), "tutoring");
        assert_eq!(Portal::ALL.len(), 4);
    }

    #[test]
    fn unknown_value_lists_expected_values() {
        let err = "shop".parse::<Portal>().unwrap_err();
        assert_eq!(err.kind, "Portal");
        assert!(err.expected.contains("registration"));
        assert!(err.to_string().contains("'shop'"));
    }

    #[test]
    fn enum_serde_uses_plain_string() {
        let json = serde_json::to_string(&Portal::Freelance).unwrap();
        assert_eq!(json, "\"freelance\"");
        let back: Portal = serde_json::from_str("\"registration\"").unwrap();
        assert_eq!(back, Portal::Registration);
        assert!(serde_json::from_str::<Portal>("\"Registration\"").is_err());
    }

    #[test]
    fn weekday_spellings_are_canonicalized() {
        assert_eq!(canonical_weekday("tue"), Some("Tuesday"));
        assert_eq!(canonical_weekday(" SUNDAY "), Some("Sunday"));
        assert_eq!(canonical_weekday("someday"), None);
    }

    #[test]
    fn string_list_accepts_array_or_comma_string() {
        let joined: StringList = serde_json::from_str("\"Math, Physics,, Chemistry \"").unwrap();
        assert_eq!(joined.into_vec(), vec!["Math", "Physics", "Chemistry"]);

        let many: StringList = serde_json::from_str("[\"BSc\", \" MSc \"]").unwrap();
        assert_eq!(many.into_vec(), vec!["BSc", "MSc"]);
    }
}
