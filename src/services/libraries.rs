//! Public library pages and each library's own area

use std::sync::Arc;

use chrono::Datelike;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    geo::SAO_PAULO_BOUNDS,
    models::{
        book::{AddBook, BookInput, CollectionBook, HeldBook, UpdateBook},
        enums::LibraryStatus,
        library::{AddressInput, LibraryDetails, LibraryProfile, LibrarySummary, NewAddress, UpdateLibrary},
        pagination::{Page, PageRequest},
    },
    repository::Repository,
    services::{auth::non_blank, geocoding::Geocoder},
    validation::{self, ensure, SERVED_CITY},
};

/// Outcome of a collection change that may drop the entry
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionChange {
    Updated(HeldBook),
    Removed,
}

#[derive(Clone)]
pub struct LibrariesService {
    repository: Repository,
    geocoder: Arc<dyn Geocoder>,
}

impl LibrariesService {
    pub fn new(repository: Repository, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { repository, geocoder }
    }

    /// Active libraries of the served city
    pub async fn list_active(&self, page: &PageRequest) -> AppResult<Page<LibrarySummary>> {
        let (rows, total) = self
            .repository
            .libraries_list(Some(LibraryStatus::Active), Some(SERVED_CITY), page)
            .await?;
        Ok(Page::new(rows.iter().map(LibrarySummary::from).collect(), page, total))
    }

    /// Public page of an active library with the books it holds
    pub async fn public_details(&self, id: i64) -> AppResult<LibraryDetails> {
        let record = self.repository.libraries_get_by_id(id).await?;
        if record.status != LibraryStatus::Active {
            return Err(AppError::NotFound(format!("Library with id {} not found", id)));
        }

        let books = self.repository.collection_all(id).await?;
        Ok(LibraryDetails {
            library: LibrarySummary::from(&record),
            category_description: record.category.description().to_string(),
            books,
        })
    }

    pub async fn profile(&self, id: i64) -> AppResult<LibraryProfile> {
        Ok(self.repository.libraries_get_by_id(id).await?.into())
    }

    /// Partial update; a new address is checked and geocoded again
    pub async fn update_profile(&self, id: i64, mut changes: UpdateLibrary) -> AppResult<LibraryProfile> {
        changes.validate()?;

        if let Some(phone) = non_blank(changes.phone.as_deref()) {
            ensure(validation::is_valid_phone(phone), "Invalid phone")?;
            changes.phone = Some(validation::sanitize_digits(phone));
        }
        if let Some(website) = non_blank(changes.website.as_deref()) {
            ensure(validation::is_valid_website(website), "Invalid website")?;
        }

        let address = match changes.address.take() {
            Some(input) => {
                ensure(validation::is_valid_cep(input.cep.trim()), "Invalid CEP")?;
                Some(resolve_address(self.geocoder.as_ref(), input).await?)
            }
            None => None,
        };

        let updated = self
            .repository
            .libraries_update_profile(id, &changes, address.as_ref())
            .await?;
        tracing::info!("Library {} updated its profile", id);

        Ok(updated.into())
    }

    pub async fn collection(&self, id: i64, page: &PageRequest) -> AppResult<Page<HeldBook>> {
        let (books, total) = self.repository.collection_list(id, page).await?;
        Ok(Page::new(books, page, total))
    }

    /// A held book with everything needed to edit it
    pub async fn collection_entry(&self, id: i64, book_id: i64) -> AppResult<CollectionBook> {
        let quantity = self.held_quantity(id, book_id).await?;
        let book = self.repository.books_get_by_id(book_id).await?;
        let genres = self.repository.books_genres(book_id).await?;

        Ok(CollectionBook {
            book,
            genre_ids: genres.iter().map(|g| g.id).collect(),
            genres: genres.into_iter().map(|g| g.name).collect(),
            quantity,
        })
    }

    pub async fn add_book(&self, id: i64, request: AddBook) -> AppResult<CollectionBook> {
        request.validate()?;
        self.check_book_input(&request.book, None).await?;

        let book_id = self.repository.collection_add(id, &request.book, request.quantity).await?;
        tracing::info!("Library {} added book {} ({} copies)", id, book_id, request.quantity);

        self.collection_entry(id, book_id).await
    }

    pub async fn update_book(&self, id: i64, book_id: i64, request: UpdateBook) -> AppResult<CollectionChange> {
        request.validate()?;
        self.held_quantity(id, book_id).await?;
        self.check_book_input(&request.book, Some(book_id)).await?;

        self.repository
            .collection_update(id, book_id, &request.book, request.quantity)
            .await?;

        self.change_outcome(id, book_id, request.quantity).await
    }

    pub async fn update_quantity(&self, id: i64, book_id: i64, quantity: i32) -> AppResult<CollectionChange> {
        ensure(quantity >= 0, "Quantity cannot be negative")?;

        let found = if quantity == 0 {
            self.repository.collection_remove(id, book_id).await?
        } else {
            self.repository.collection_set_quantity(id, book_id, quantity).await?
        };
        if !found {
            return Err(not_held(id, book_id));
        }

        self.change_outcome(id, book_id, quantity).await
    }

    pub async fn remove_book(&self, id: i64, book_id: i64) -> AppResult<()> {
        if !self.repository.collection_remove(id, book_id).await? {
            return Err(not_held(id, book_id));
        }
        tracing::info!("Library {} removed book {}", id, book_id);
        Ok(())
    }

    async fn held_quantity(&self, id: i64, book_id: i64) -> AppResult<i32> {
        self.repository
            .collection_quantity(id, book_id)
            .await?
            .ok_or_else(|| not_held(id, book_id))
    }

    async fn change_outcome(&self, id: i64, book_id: i64, quantity: i32) -> AppResult<CollectionChange> {
        if quantity == 0 {
            tracing::info!("Library {} removed book {}", id, book_id);
            return Ok(CollectionChange::Removed);
        }

        let book = self.repository.books_get_by_id(book_id).await?;
        Ok(CollectionChange::Updated(HeldBook {
            id: book.id,
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            publication_year: book.publication_year,
            cover: book.cover,
            quantity,
        }))
    }

    /// ISBN, publication year, genre ids and ISBN ownership
    async fn check_book_input(&self, input: &BookInput, book_id: Option<i64>) -> AppResult<()> {
        check_book_fields(input, chrono::Utc::now().year())?;

        if book_id.is_some() && self.repository.books_isbn_taken(&input.isbn, book_id).await? {
            return Err(AppError::Conflict("ISBN already registered".to_string()));
        }

        if let Some(genre_ids) = input.genre_ids.as_deref().filter(|ids| !ids.is_empty()) {
            let missing = self.repository.genres_missing(genre_ids).await?;
            if let Some(first) = missing.first() {
                return Err(AppError::NotFound(format!("Genre with id {} not found", first)));
            }
        }

        Ok(())
    }
}

fn check_book_fields(input: &BookInput, current_year: i32) -> AppResult<()> {
    ensure(validation::is_valid_isbn(&input.isbn), "ISBN must have exactly 13 digits")?;
    if let Some(year) = input.publication_year {
        ensure(
            validation::is_valid_publication_year(year, current_year),
            &format!(
                "Publication year must be between {} and {}",
                validation::MIN_PUBLICATION_YEAR,
                current_year + 1
            ),
        )?;
    }
    Ok(())
}

fn not_held(id: i64, book_id: i64) -> AppError {
    AppError::NotFound(format!("Book {} is not in the collection of library {}", book_id, id))
}

/// Check the service area, geocode the address and keep it only inside the city bounds
pub(crate) async fn resolve_address(geocoder: &dyn Geocoder, input: AddressInput) -> AppResult<NewAddress> {
    ensure(
        validation::is_served_area(&input.city, &input.state),
        "Only libraries in São Paulo - SP can be registered",
    )?;

    let full_address = input.full_address();
    let result = geocoder.geocode(&full_address).await.map_err(|e| match e {
        AppError::Validation(reason) => {
            tracing::warn!("Could not geocode '{}': {}", full_address, reason);
            AppError::Validation(format!("Invalid address: {}", reason))
        }
        other => {
            tracing::warn!("Geocoding unavailable for '{}': {}", full_address, other);
            other
        }
    })?;

    ensure(
        SAO_PAULO_BOUNDS.contains(&result.coordinate),
        "Address is outside the São Paulo area",
    )?;

    Ok(NewAddress {
        cep: validation::sanitize_digits(&input.cep),
        position: result.coordinate,
        input,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geo::Coordinate,
        services::geocoding::{GeocodeResult, MockGeocoder},
    };

    fn address(city: &str, state: &str) -> AddressInput {
        AddressInput {
            cep: "01310-100".to_string(),
            street: "Avenida Paulista".to_string(),
            number: "1578".to_string(),
            complement: None,
            district: "Bela Vista".to_string(),
            city: city.to_string(),
            state: state.to_string(),
        }
    }

    fn answering(coordinate: Coordinate) -> MockGeocoder {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_geocode().times(1).returning(move |a| {
            Ok(GeocodeResult {
                coordinate,
                formatted_address: a.to_string(),
            })
        });
        geocoder
    }

    fn book(isbn: &str, year: Option<i32>) -> BookInput {
        BookInput {
            isbn: isbn.to_string(),
            title: "Vidas Secas".to_string(),
            author: "Graciliano Ramos".to_string(),
            publisher: None,
            publication_year: year,
            cover: None,
            synopsis: None,
            author_photo: None,
            genre_ids: None,
        }
    }

    #[tokio::test]
    async fn test_resolve_address() {
        let geocoder = answering(Coordinate::new(-23.5614, -46.6560));
        let resolved = resolve_address(&geocoder, address("São Paulo", "SP")).await.unwrap();

        assert_eq!(resolved.cep, "01310100");
        assert_eq!(resolved.position, Coordinate::new(-23.5614, -46.6560));
        assert_eq!(resolved.input.street, "Avenida Paulista");
    }

    #[tokio::test]
    async fn test_outside_city_is_rejected_before_geocoding() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_geocode().never();

        let result = resolve_address(&geocoder, address("Campinas", "SP")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_position_outside_bounds_is_rejected() {
        let geocoder = answering(Coordinate::new(-22.9068, -43.1729));
        let result = resolve_address(&geocoder, address("São Paulo", "SP")).await;
        assert!(matches!(result, Err(AppError::Validation(m)) if m.contains("outside")));
    }

    #[tokio::test]
    async fn test_geocoding_failures() {
        let mut not_found = MockGeocoder::new();
        not_found
            .expect_geocode()
            .returning(|_| Err(AppError::Validation("Address not found".to_string())));
        match resolve_address(&not_found, address("são paulo", "São Paulo")).await {
            Err(AppError::Validation(m)) => assert_eq!(m, "Invalid address: Address not found"),
            other => panic!("unexpected result: {:?}", other.map(|a| a.cep)),
        }

        let mut unavailable = MockGeocoder::new();
        unavailable
            .expect_geocode()
            .returning(|_| Err(AppError::Geocoding("Geocoding quota exceeded".to_string())));
        let result = resolve_address(&unavailable, address("São Paulo", "SP")).await;
        assert!(matches!(result, Err(AppError::Geocoding(_))));
    }

    #[test]
    fn test_book_field_checks() {
        assert!(check_book_fields(&book("9788535902778", Some(1938)), 2025).is_ok());
        assert!(check_book_fields(&book("9788535902778", None), 2025).is_ok());
        assert!(check_book_fields(&book("9788535902778", Some(2026)), 2025).is_ok());
        assert!(check_book_fields(&book("9788535902778", Some(2027)), 2025).is_err());
        assert!(check_book_fields(&book("9788535902778", Some(999)), 2025).is_err());
        assert!(check_book_fields(&book("978-85-359-0277-8", None), 2025).is_err());
    }
}
