//! Library and address models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    geo::{Coordinate, Located},
    validation,
};

use super::{
    book::HeldBook,
    enums::{LibraryCategory, LibraryStatus},
};

/// Columns selected by every library query, in `LibraryRecord` order
pub const LIBRARY_COLUMNS: &str = r#"
    l.id, l.trade_name, l.legal_name, l.cnpj, l.phone, l.category, l.website, l.photo,
    l.status, l.created_at, l.updated_at,
    l.address_id, a.cep, a.street, a.number, a.complement, a.district, a.city, a.state,
    a.latitude, a.longitude,
    c.email
"#;

pub const LIBRARY_FROM: &str = r#"
    FROM libraries l
    JOIN addresses a ON a.id = l.address_id
    LEFT JOIN library_credentials c ON c.library_id = l.id
"#;

/// Library row joined with its address and login email
#[derive(Debug, Clone, FromRow)]
pub struct LibraryRecord {
    pub id: i64,
    pub trade_name: String,
    pub legal_name: String,
    pub cnpj: String,
    pub phone: Option<String>,
    pub category: LibraryCategory,
    pub website: Option<String>,
    pub photo: Option<String>,
    pub status: LibraryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub address_id: i64,
    pub cep: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub email: Option<String>,
}

impl LibraryRecord {
    pub fn address(&self) -> AddressView {
        AddressView {
            cep: validation::format_cep(&self.cep),
            street: self.street.clone(),
            number: self.number.clone(),
            complement: self.complement.clone(),
            district: self.district.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    pub fn position(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressView {
    pub cep: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Public listing entry
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LibrarySummary {
    pub id: i64,
    pub trade_name: String,
    pub phone: Option<String>,
    pub category: LibraryCategory,
    pub website: Option<String>,
    pub photo: Option<String>,
    pub address: AddressView,
}

impl From<&LibraryRecord> for LibrarySummary {
    fn from(record: &LibraryRecord) -> Self {
        Self {
            id: record.id,
            trade_name: record.trade_name.clone(),
            phone: record.phone.clone(),
            category: record.category,
            website: record.website.clone(),
            photo: record.photo.clone(),
            address: record.address(),
        }
    }
}

/// Public page of an approved library
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LibraryDetails {
    #[serde(flatten)]
    pub library: LibrarySummary,
    pub category_description: String,
    pub books: Vec<HeldBook>,
}

/// Full view, for the owning library and for staff
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LibraryProfile {
    pub id: i64,
    pub trade_name: String,
    pub legal_name: String,
    pub cnpj: String,
    pub phone: Option<String>,
    pub category: LibraryCategory,
    pub website: Option<String>,
    pub photo: Option<String>,
    pub status: LibraryStatus,
    pub email: Option<String>,
    pub address: AddressView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&LibraryRecord> for LibraryProfile {
    fn from(record: &LibraryRecord) -> Self {
        Self {
            id: record.id,
            trade_name: record.trade_name.clone(),
            legal_name: record.legal_name.clone(),
            cnpj: validation::format_cnpj(&record.cnpj),
            phone: record.phone.clone(),
            category: record.category,
            website: record.website.clone(),
            photo: record.photo.clone(),
            status: record.status,
            email: record.email.clone(),
            address: record.address(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<LibraryRecord> for LibraryProfile {
    fn from(record: LibraryRecord) -> Self {
        Self::from(&record)
    }
}

/// A library holding a given book, with its copy count
#[derive(Debug, Clone, FromRow)]
pub struct Holding {
    #[sqlx(flatten)]
    pub library: LibraryRecord,
    pub quantity: i32,
}

impl Located for Holding {
    fn coordinate(&self) -> Option<Coordinate> {
        self.library.position()
    }
}

/// Where a book can be found, nearest first when a position was given
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LibraryForBook {
    pub id: i64,
    pub trade_name: String,
    pub phone: Option<String>,
    pub photo: Option<String>,
    pub address: AddressView,
    pub quantity: i32,
    pub distance_km: Option<f64>,
    /// `"850 m"`, `"2.50 km"` or `"N/A"`
    pub formatted_distance: String,
}

/// Dashboard map marker
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LibraryMapPoint {
    pub id: i64,
    pub trade_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: LibraryStatus,
    pub city: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AddressInput {
    #[validate(length(min = 1, message = "is required"))]
    pub cep: String,
    #[validate(length(min = 1, max = 100))]
    pub street: String,
    #[validate(length(min = 1, max = 10))]
    pub number: String,
    #[validate(length(max = 50))]
    pub complement: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub district: String,
    #[validate(length(min = 1, max = 50))]
    pub city: String,
    #[validate(length(min = 1, max = 50))]
    pub state: String,
}

impl AddressInput {
    /// One-line address as sent to the geocoder
    pub fn full_address(&self) -> String {
        let mut out = format!("{}, {}", self.street.trim(), self.number.trim());
        if let Some(complement) = self.complement.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            out.push_str(" - ");
            out.push_str(complement);
        }
        out.push_str(&format!(
            ", {}, {} - {}, {}, Brasil",
            self.district.trim(),
            self.city.trim(),
            self.state.trim(),
            self.cep.trim()
        ));
        out
    }
}

/// Address ready to persist: sanitized CEP and resolved position
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub input: AddressInput,
    pub cep: String,
    pub position: Coordinate,
}

/// Registration after validation and sanitizing
#[derive(Debug, Clone)]
pub struct NewLibrary {
    pub trade_name: String,
    pub legal_name: String,
    pub cnpj: String,
    pub phone: Option<String>,
    pub category: LibraryCategory,
    pub website: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub address: NewAddress,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterLibrary {
    #[validate(length(min = 1, max = 100))]
    pub trade_name: String,
    #[validate(length(min = 1, max = 100))]
    pub legal_name: String,
    pub cnpj: String,
    pub phone: Option<String>,
    pub category: LibraryCategory,
    #[validate(length(max = 100))]
    pub website: Option<String>,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 6, max = 255))]
    pub password: String,
    #[validate(nested)]
    pub address: AddressInput,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLibrary {
    #[validate(length(min = 1, max = 100))]
    pub trade_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub legal_name: Option<String>,
    pub phone: Option<String>,
    pub category: Option<LibraryCategory>,
    #[validate(length(max = 100))]
    pub website: Option<String>,
    #[validate(length(max = 255))]
    pub photo: Option<String>,
    #[validate(nested)]
    pub address: Option<AddressInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateLibraryStatus {
    pub status: LibraryStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LibraryFilter {
    /// Only libraries with this status
    pub status: Option<LibraryStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(complement: Option<&str>) -> AddressInput {
        AddressInput {
            cep: "01310-100".to_string(),
            street: "Avenida Paulista".to_string(),
            number: "1578".to_string(),
            complement: complement.map(String::from),
            district: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
        }
    }

    #[test]
    fn test_full_address() {
        assert_eq!(
            address(None).full_address(),
            "Avenida Paulista, 1578, Bela Vista, São Paulo - SP, 01310-100, Brasil"
        );
        assert_eq!(
            address(Some("Térreo")).full_address(),
            "Avenida Paulista, 1578 - Térreo, Bela Vista, São Paulo - SP, 01310-100, Brasil"
        );
        assert_eq!(address(Some("  ")).full_address(), address(None).full_address());
    }

    #[test]
    fn test_address_validation() {
        assert!(address(None).validate().is_ok());

        let mut bad = address(None);
        bad.street = String::new();
        bad.number = "12345678901".to_string();
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[test]
    fn test_update_payload_accepts_partial_json() {
        let update: UpdateLibrary = serde_json::from_str(r#"{"phone": "(11) 3333-4444"}"#).unwrap();
        assert_eq!(update.phone.as_deref(), Some("(11) 3333-4444"));
        assert!(update.trade_name.is_none());
        assert!(update.address.is_none());
        assert!(update.validate().is_ok());
    }
}
