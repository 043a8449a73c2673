//! Enumerations stored as uppercase text columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// String conversions plus SQLx text mapping for a fieldless enum
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

/// Lifecycle of a registered library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LibraryStatus {
    Active,
    Inactive,
    /// Waiting for approval
    Pending,
}

text_enum!(LibraryStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Pending => "PENDING",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LibraryCategory {
    Public,
    Private,
    University,
    School,
}

text_enum!(LibraryCategory {
    Public => "PUBLIC",
    Private => "PRIVATE",
    University => "UNIVERSITY",
    School => "SCHOOL",
});

impl LibraryCategory {
    pub fn description(&self) -> &'static str {
        match self {
            LibraryCategory::Public => "Biblioteca Pública",
            LibraryCategory::Private => "Biblioteca Privada",
            LibraryCategory::University => "Biblioteca Universitária",
            LibraryCategory::School => "Biblioteca Escolar",
        }
    }
}

/// Back-office account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminRole {
    Admin,
    Moderator,
}

text_enum!(AdminRole {
    Admin => "ADMIN",
    Moderator => "MODERATOR",
});

impl AdminRole {
    /// Human readable name, for messages
    pub fn label(&self) -> &'static str {
        match self {
            AdminRole::Admin => "Administrator",
            AdminRole::Moderator => "Moderator",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminStatus {
    Active,
    Inactive,
}

text_enum!(AdminStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
});

/// Role carried by an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Moderator,
    Library,
}

text_enum!(Role {
    Admin => "ADMIN",
    Moderator => "MODERATOR",
    Library => "LIBRARY",
});

impl From<AdminRole> for Role {
    fn from(role: AdminRole) -> Self {
        match role {
            AdminRole::Admin => Role::Admin,
            AdminRole::Moderator => Role::Moderator,
        }
    }
}

/// Image categories accepted by the upload endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum UploadKind {
    /// Book cover
    Cover,
    /// Author portrait
    Author,
    /// Library photo
    Library,
}

text_enum!(UploadKind {
    Cover => "COVER",
    Author => "AUTHOR",
    Library => "LIBRARY",
});

impl TryFrom<String> for UploadKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl UploadKind {
    pub const ALL: [UploadKind; 3] = [UploadKind::Cover, UploadKind::Author, UploadKind::Library];

    /// Sub-directory of the upload root
    pub fn directory(&self) -> &'static str {
        match self {
            UploadKind::Cover => "covers",
            UploadKind::Author => "authors",
            UploadKind::Library => "libraries",
        }
    }

    /// Bounding box (width, height) the image is scaled into
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            UploadKind::Cover => (600, 800),
            UploadKind::Author => (400, 400),
            UploadKind::Library => (800, 600),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("active".parse::<LibraryStatus>(), Ok(LibraryStatus::Active));
        assert_eq!(" Pending ".parse::<LibraryStatus>(), Ok(LibraryStatus::Pending));
        assert!("approved".parse::<LibraryStatus>().is_err());
        assert_eq!("university".parse::<LibraryCategory>(), Ok(LibraryCategory::University));
    }

    #[test]
    fn test_json_names() {
        assert_eq!(serde_json::to_string(&LibraryStatus::Inactive).unwrap(), "\"INACTIVE\"");
        assert_eq!(serde_json::to_string(&Role::Library).unwrap(), "\"LIBRARY\"");
        let role: AdminRole = serde_json::from_str("\"MODERATOR\"").unwrap();
        assert_eq!(role, AdminRole::Moderator);
        assert_eq!(Role::from(role), Role::Moderator);
    }

    #[test]
    fn test_upload_kind() {
        let kind: UploadKind = serde_json::from_str("\"cover\"").unwrap();
        assert_eq!(kind, UploadKind::Cover);
        assert_eq!(kind.directory(), "covers");
        assert_eq!(kind.dimensions(), (600, 800));
        assert_eq!(UploadKind::Library.dimensions(), (800, 600));
        assert_eq!(serde_json::to_string(&UploadKind::Author).unwrap(), "\"AUTHOR\"");
        assert!(serde_json::from_str::<UploadKind>("\"poster\"").is_err());
    }

    #[test]
    fn test_category_description() {
        assert_eq!(LibraryCategory::School.description(), "Biblioteca Escolar");
        assert_eq!(LibraryCategory::Public.to_string(), "PUBLIC");
    }
}
