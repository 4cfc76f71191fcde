use serde::Deserialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::users::error::{UserError, UserResult};

/// Columns a caller may ask for in a lookup. Closed set; the only source of
/// column names that ever reaches a SQL string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Id,
    Name,
    Username,
    Bio,
    AvatarUrl,
    LastSeen,
}

impl UserField {
    pub const ALL: [UserField; 6] = [
        UserField::Id,
        UserField::Name,
        UserField::Username,
        UserField::Bio,
        UserField::AvatarUrl,
        UserField::LastSeen,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.column() == name)
    }

    pub const fn column(self) -> &'static str {
        match self {
            UserField::Id => "id",
            UserField::Name => "name",
            UserField::Username => "username",
            UserField::Bio => "bio",
            UserField::AvatarUrl => "avatar_url",
            UserField::LastSeen => "last_seen",
        }
    }

    /// Keeps recognised names in caller order, dropping unknowns and repeats.
    pub fn filter_allowed<S: AsRef<str>>(names: &[S]) -> Vec<UserField> {
        let mut out: Vec<UserField> = Vec::with_capacity(names.len());
        for field in names.iter().filter_map(|n| Self::parse(n.as_ref())) {
            if !out.contains(&field) {
                out.push(field);
            }
        }
        out
    }
}

/// Which column governs a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchParameter {
    Id,
    Username,
}

impl MatchParameter {
    pub fn parse(raw: &str) -> UserResult<Self> {
        match raw {
            "id" => Ok(Self::Id),
            "username" => Ok(Self::Username),
            other => Err(UserError::InvalidParameter(other.to_string())),
        }
    }
}

/// Raw match value as it arrives on the wire: one string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MatchValue {
    One(String),
    Many(Vec<String>),
}

/// Lookup filter, fixed once the parameter and value shape are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMatch {
    ById(Vec<String>),
    ByUsernamePattern(String),
    ByUsernameSet(Vec<String>),
}

impl UserMatch {
    pub fn new(parameter: MatchParameter, value: MatchValue) -> UserResult<Self> {
        match (parameter, value) {
            (MatchParameter::Id, MatchValue::Many(ids)) => Ok(Self::ById(ids)),
            (MatchParameter::Id, MatchValue::One(_)) => Err(UserError::InvalidArgument(
                "id lookup expects a list of ids".into(),
            )),
            (MatchParameter::Username, MatchValue::One(pattern)) => {
                if pattern.is_empty() {
                    return Err(UserError::InvalidArgument(
                        "username pattern must not be empty".into(),
                    ));
                }
                Ok(Self::ByUsernamePattern(pattern))
            }
            (MatchParameter::Username, MatchValue::Many(names)) => Ok(Self::ByUsernameSet(names)),
        }
    }
}

/// Row to insert on creation.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub name: Option<String>,
    pub avatar_url: String,
}

/// Projection row of a lookup. Columns left out of the SELECT decode as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct UserRow {
    #[sqlx(default)]
    pub id: Option<String>,
    #[sqlx(default)]
    pub username: Option<String>,
    #[sqlx(default)]
    pub name: Option<String>,
    #[sqlx(default)]
    pub bio: Option<String>,
    #[sqlx(default)]
    pub avatar_url: Option<String>,
    #[sqlx(default)]
    pub last_seen: Option<OffsetDateTime>,
}

/// Minimal projection used for the email lookup.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: String,
    pub username: String,
    #[allow(dead_code)]
    pub pass_hash: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_allowed_drops_unknown_and_duplicate_names() {
        let fields = UserField::filter_allowed(&[
            "username",
            "email",
            "pass_hash",
            "id",
            "username",
            "last_seen",
        ]);
        assert_eq!(
            fields,
            vec![UserField::Username, UserField::Id, UserField::LastSeen]
        );
    }

    #[test]
    fn filter_allowed_is_empty_for_unknown_columns() {
        assert!(UserField::filter_allowed(&["nonexistent_column", "email; DROP TABLE users"]).is_empty());
    }

    #[test]
    fn every_field_round_trips_through_its_column() {
        for field in UserField::ALL {
            assert_eq!(UserField::parse(field.column()), Some(field));
        }
    }

    #[test]
    fn parameter_allow_list() {
        assert_eq!(MatchParameter::parse("id").unwrap(), MatchParameter::Id);
        assert_eq!(MatchParameter::parse("username").unwrap(), MatchParameter::Username);
        assert!(matches!(
            MatchParameter::parse("bogus"),
            Err(UserError::InvalidParameter(p)) if p == "bogus"
        ));
        assert!(MatchParameter::parse("ID").is_err());
    }

    #[test]
    fn match_shape_is_checked() {
        assert_eq!(
            UserMatch::new(MatchParameter::Id, MatchValue::Many(vec!["u1".into()])).unwrap(),
            UserMatch::ById(vec!["u1".into()])
        );
        assert!(matches!(
            UserMatch::new(MatchParameter::Id, MatchValue::One("u1".into())),
            Err(UserError::InvalidArgument(_))
        ));
        assert_eq!(
            UserMatch::new(MatchParameter::Username, MatchValue::One("ali".into())).unwrap(),
            UserMatch::ByUsernamePattern("ali".into())
        );
        assert_eq!(
            UserMatch::new(MatchParameter::Username, MatchValue::Many(vec!["bob".into()])).unwrap(),
            UserMatch::ByUsernameSet(vec!["bob".into()])
        );
        assert!(UserMatch::new(MatchParameter::Username, MatchValue::One(String::new())).is_err());
    }

    #[test]
    fn match_value_decodes_either_shape() {
        let one: MatchValue = serde_json::from_str(r#""ali""#).unwrap();
        assert_eq!(one, MatchValue::One("ali".into()));
        let many: MatchValue = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(many, MatchValue::Many(vec!["a".into(), "b".into()]));
    }
}
