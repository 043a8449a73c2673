//! Field rules for Brazilian registry data, contact details and catalog values

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_PASSWORD_LENGTH: usize = 255;
pub const MIN_PUBLICATION_YEAR: i32 = 1000;

/// The only city served
pub const SERVED_CITY: &str = "São Paulo";

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("email pattern"));
static CNPJ_FORMATTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}\.[0-9]{3}\.[0-9]{3}/[0-9]{4}-[0-9]{2}$").expect("cnpj pattern"));
static CNPJ_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{14}$").expect("cnpj digits pattern"));
static CEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}-?[0-9]{3}$").expect("cep pattern"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?[0-9]{2}\)?\s?[0-9]{4,5}-?[0-9]{4}$").expect("phone pattern"));
static ISBN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{13}$").expect("isbn pattern"));
static WEBSITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?(www\.)?[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}(/.*)?$").expect("website pattern")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

/// Accepts `12.345.678/0001-90` as well as the bare 14 digits
pub fn is_valid_cnpj(cnpj: &str) -> bool {
    let cnpj = cnpj.trim();
    CNPJ_FORMATTED.is_match(cnpj) || CNPJ_DIGITS.is_match(cnpj)
}

pub fn is_valid_cep(cep: &str) -> bool {
    CEP.is_match(cep.trim())
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE.is_match(phone.trim())
}

pub fn is_valid_isbn(isbn: &str) -> bool {
    ISBN.is_match(isbn.trim())
}

pub fn is_valid_website(url: &str) -> bool {
    WEBSITE.is_match(url.trim())
}

pub fn is_valid_password(password: &str) -> bool {
    (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&password.chars().count())
}

/// Publication years run from 1000 to next year (announced titles)
pub fn is_valid_publication_year(year: i32, current_year: i32) -> bool {
    (MIN_PUBLICATION_YEAR..=current_year + 1).contains(&year)
}

/// Keep only ASCII digits
pub fn sanitize_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// `12345678000190` -> `12.345.678/0001-90`; anything else is returned untouched
pub fn format_cnpj(cnpj: &str) -> String {
    let digits = sanitize_digits(cnpj);
    if digits.len() != 14 {
        return cnpj.to_string();
    }
    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}

/// `01310100` -> `01310-100`; anything else is returned untouched
pub fn format_cep(cep: &str) -> String {
    let digits = sanitize_digits(cep);
    if digits.len() != 8 {
        return cep.to_string();
    }
    format!("{}-{}", &digits[0..5], &digits[5..8])
}

/// Whether a city/state pair lies in the served area
pub fn is_served_area(city: &str, state: &str) -> bool {
    let city = city.trim().to_lowercase();
    let state = state.trim().to_lowercase();
    city == SERVED_CITY.to_lowercase() && (state == "sp" || state == SERVED_CITY.to_lowercase())
}

/// Turn a failed predicate into a validation error
pub fn ensure(condition: bool, message: &str) -> AppResult<()> {
    if condition {
        Ok(())
    } else {
        Err(AppError::Validation(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("contato@biblioteca.org.br"));
        assert!(is_valid_email("  user+tag@example.com "));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user@domain.c"));
    }

    #[test]
    fn test_cnpj_with_and_without_mask() {
        assert!(is_valid_cnpj("12.345.678/0001-90"));
        assert!(is_valid_cnpj("12345678000190"));
        assert!(!is_valid_cnpj("12.345.678/0001-9"));
        assert!(!is_valid_cnpj("1234567800019"));
        assert!(!is_valid_cnpj("12-345-678/0001.90"));
    }

    #[test]
    fn test_cep() {
        assert!(is_valid_cep("01310-100"));
        assert!(is_valid_cep("01310100"));
        assert!(!is_valid_cep("0131-0100"));
        assert!(!is_valid_cep("1310100"));
    }

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("(11) 98765-4321"));
        assert!(is_valid_phone("11987654321"));
        assert!(is_valid_phone("(11)3333-4444"));
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone("+55 11 98765-4321"));
    }

    #[test]
    fn test_isbn() {
        assert!(is_valid_isbn("9788535902778"));
        assert!(!is_valid_isbn("978-8535902778"));
        assert!(!is_valid_isbn("853590277X"));
    }

    #[test]
    fn test_only_ascii_digits_count() {
        assert!(!is_valid_cep("١٢٣٤٥٦٧٨"));
        assert!(!is_valid_cnpj("١٢٣٤٥٦٧٨٠٠٠١٩٠"));
        assert!(!is_valid_isbn("٩٧٨٨٥٣٥٩٠٢٧٧٨"));
        assert!(!is_valid_phone("١١٩٨٧٦٥٤٣٢١"));
        assert_eq!(sanitize_digits("١٢٣-45"), "45");
    }

    #[test]
    fn test_website() {
        assert!(is_valid_website("https://www.bibliotecamariodeandrade.sp.gov.br"));
        assert!(is_valid_website("biblioteca.org/acervo"));
        assert!(!is_valid_website("not a url"));
    }

    #[test]
    fn test_password_length() {
        assert!(!is_valid_password("12345"));
        assert!(is_valid_password("123456"));
        assert!(is_valid_password(&"x".repeat(255)));
        assert!(!is_valid_password(&"x".repeat(256)));
    }

    #[test]
    fn test_publication_year() {
        assert!(is_valid_publication_year(1000, 2026));
        assert!(is_valid_publication_year(2027, 2026));
        assert!(!is_valid_publication_year(2028, 2026));
        assert!(!is_valid_publication_year(999, 2026));
    }

    #[test]
    fn test_sanitize_and_format() {
        assert_eq!(sanitize_digits("12.345.678/0001-90"), "12345678000190");
        assert_eq!(sanitize_digits("(11) 98765-4321"), "11987654321");
        assert_eq!(format_cnpj("12345678000190"), "12.345.678/0001-90");
        assert_eq!(format_cnpj("123"), "123");
        assert_eq!(format_cep("01310100"), "01310-100");
        assert_eq!(format_cep("01310-100"), "01310-100");
        assert_eq!(format_cep("0131"), "0131");
    }

    #[test]
    fn test_served_area() {
        assert!(is_served_area("São Paulo", "SP"));
        assert!(is_served_area("são paulo", "são paulo"));
        assert!(is_served_area(" SÃO PAULO ", "sp"));
        assert!(!is_served_area("Campinas", "SP"));
        assert!(!is_served_area("São Paulo", "RJ"));
    }

    #[test]
    fn test_ensure() {
        assert!(ensure(true, "fine").is_ok());
        match ensure(false, "Invalid CEP") {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Invalid CEP"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
