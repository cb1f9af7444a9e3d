use sha2::{Digest, Sha256};
use sqlx::{
    Decode, Sqlite, Type,
    encode::IsNull,
    error::BoxDynError,
    sqlite::{SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef},
};
use std::borrow::Cow;
use std::fmt::{self, Display};
use thiserror::Error;

/// Width of the raw digest.
pub const ID_LEN: usize = 32;
/// Width of the printable hex form.
pub const ID_STR_LEN: usize = 2 * ID_LEN;

/// Content hash used as an identifier: the same hash function runs over an
/// expression's canonical serialisation and over a filesystem subtree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id([u8; ID_LEN]);

impl Id {
    pub fn digest(&self) -> &[u8; ID_LEN] {
        &self.0
    }
}

/// Hash a byte string into an [`Id`].
pub fn hash_bytes(bytes: &[u8]) -> Id {
    Id(Sha256::digest(bytes).into())
}

impl From<[u8; ID_LEN]> for Id {
    fn from(digest: [u8; ID_LEN]) -> Self {
        Id(digest)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self)
    }
}

#[derive(Clone, Copy, Debug, Error)]
#[error("malformed identifier")]
pub struct ParseIdError;

impl TryFrom<&str> for Id {
    type Error = ParseIdError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.len() != ID_STR_LEN {
            return Err(ParseIdError);
        }
        let digest = hex::decode(value).map_err(|_| ParseIdError)?;
        Ok(Id(digest.try_into().map_err(|_| ParseIdError)?))
    }
}

impl Type<Sqlite> for Id {
    fn type_info() -> SqliteTypeInfo {
        <&str as Type<Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Encode<'r, Sqlite> for Id {
    fn encode_by_ref(&self, args: &mut Vec<SqliteArgumentValue<'r>>) -> Result<IsNull, BoxDynError>
    where
        Self: Sized,
    {
        args.push(SqliteArgumentValue::Text(Cow::Owned(self.to_string())));
        Ok(IsNull::No)
    }
}

impl<'r> sqlx::Decode<'r, Sqlite> for Id {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let value = <String as Decode<Sqlite>>::decode(value)?;
        Ok(Id::try_from(value.as_str())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        let id = hash_bytes(b"hello world");
        assert_eq!(
            id.to_string(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn display_parse_round_trip() {
        let id = hash_bytes(b"some bytes");
        let printed = id.to_string();
        assert_eq!(printed.len(), ID_STR_LEN);
        assert_eq!(Id::try_from(printed.as_str()).unwrap(), id);
    }

    #[test]
    fn rejects_malformed() {
        assert!(Id::try_from("").is_err());
        assert!(Id::try_from("abc").is_err());
        // right length, bad alphabet
        let bad = "zz".repeat(ID_LEN);
        assert!(Id::try_from(bad.as_str()).is_err());
    }
}
