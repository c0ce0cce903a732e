//! Typed member access over `serde_json` objects.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{LoadError, LoadResult};

/// A content object as produced by the configuration reader.
pub type JsonObject = Map<String, Value>;

/// Typed accessors for required and optional members.
pub trait JsonObjectExt {
    fn member(&self, member: &str) -> LoadResult<&Value>;
    fn get_str(&self, member: &str) -> LoadResult<&str>;
    fn get_str_or<'a>(&'a self, member: &str, default: &'a str) -> LoadResult<&'a str>;
    fn get_int(&self, member: &str) -> LoadResult<i64>;
    fn get_bool_or(&self, member: &str, default: bool) -> LoadResult<bool>;
    fn get_object(&self, member: &str) -> LoadResult<&JsonObject>;
    fn get_array(&self, member: &str) -> LoadResult<&Vec<Value>>;
    /// Deserialize a member into an enum or other serde type.
    fn get_enum<E: DeserializeOwned>(&self, member: &str) -> LoadResult<E>;
}

impl JsonObjectExt for JsonObject {
    fn member(&self, member: &str) -> LoadResult<&Value> {
        self.get(member).ok_or_else(|| LoadError::missing(member))
    }

    fn get_str(&self, member: &str) -> LoadResult<&str> {
        as_str(self.member(member)?, member)
    }

    fn get_str_or<'a>(&'a self, member: &str, default: &'a str) -> LoadResult<&'a str> {
        match self.get(member) {
            Some(value) => as_str(value, member),
            None => Ok(default),
        }
    }

    fn get_int(&self, member: &str) -> LoadResult<i64> {
        as_int(self.member(member)?, member)
    }

    fn get_bool_or(&self, member: &str, default: bool) -> LoadResult<bool> {
        match self.get(member) {
            Some(value) => value
                .as_bool()
                .ok_or_else(|| LoadError::invalid(member, "expected a boolean")),
            None => Ok(default),
        }
    }

    fn get_object(&self, member: &str) -> LoadResult<&JsonObject> {
        as_object(self.member(member)?, member)
    }

    fn get_array(&self, member: &str) -> LoadResult<&Vec<Value>> {
        self.member(member)?
            .as_array()
            .ok_or_else(|| LoadError::invalid(member, "expected an array"))
    }

    fn get_enum<E: DeserializeOwned>(&self, member: &str) -> LoadResult<E> {
        let value = self.member(member)?;
        serde_json::from_value(value.clone())
            .map_err(|e| LoadError::invalid(member, format!("unrecognized value {}: {}", value, e)))
    }
}

pub(crate) fn as_str<'a>(value: &'a Value, member: &str) -> LoadResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| LoadError::invalid(member, "expected a string"))
}

pub(crate) fn as_int(value: &Value, member: &str) -> LoadResult<i64> {
    value
        .as_i64()
        .ok_or_else(|| LoadError::invalid(member, "expected an integer"))
}

pub(crate) fn as_object<'a>(value: &'a Value, member: &str) -> LoadResult<&'a JsonObject> {
    value
        .as_object()
        .ok_or_else(|| LoadError::invalid(member, "expected an object"))
}

/// Narrow an integer to `i32`, rejecting out-of-range literals.
pub(crate) fn to_i32(value: i64, member: &str) -> LoadResult<i32> {
    i32::try_from(value).map_err(|_| LoadError::invalid(member, "integer out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_rules::AimRule;
    use serde_json::json;

    fn object(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_members() {
        let jo = object(json!({ "name": "x", "count": 3 }));
        assert_eq!(jo.get_str("name").unwrap(), "x");
        assert_eq!(jo.get_int("count").unwrap(), 3);
        assert!(matches!(jo.get_str("missing"), Err(LoadError::MissingMember(_))));
        assert!(matches!(jo.get_int("name"), Err(LoadError::InvalidValue { .. })));
    }

    #[test]
    fn test_optional_members() {
        let jo = object(json!({ "flag": true }));
        assert_eq!(jo.get_str_or("type", "").unwrap(), "");
        assert!(jo.get_bool_or("flag", false).unwrap());
        assert!(!jo.get_bool_or("other", false).unwrap());
    }

    #[test]
    fn test_enum_members() {
        let jo = object(json!({ "rule": "AIM_SPRAY", "bad": "AIM_WILDLY" }));
        assert_eq!(jo.get_enum::<AimRule>("rule").unwrap(), AimRule::Spray);
        assert!(jo.get_enum::<AimRule>("bad").is_err());
    }
}
