//! Public book catalog

use crate::{
    error::AppResult,
    geo::{rank_by_proximity, Coordinate, Ranked},
    models::{
        book::{BookDetails, BookShort},
        library::{Holding, LibraryForBook},
        pagination::{Page, PageRequest},
    },
    repository::Repository,
    validation::SERVED_CITY,
};

pub const POPULAR_LIMIT: i64 = 10;
pub const SIMILAR_LIMIT: i64 = 5;

const NO_DISTANCE: &str = "N/A";

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books by title; lists everything without a title
    pub async fn search(&self, title: Option<&str>, page: &PageRequest) -> AppResult<Page<BookShort>> {
        let (books, total) = self.repository.books_search(title, page).await?;
        Ok(Page::new(books, page, total))
    }

    pub async fn popular(&self) -> AppResult<Vec<BookShort>> {
        self.repository.books_popular(POPULAR_LIMIT).await
    }

    /// Book with genre names and a few books sharing a genre
    pub async fn details(&self, book_id: i64) -> AppResult<BookDetails> {
        let book = self.repository.books_get_by_id(book_id).await?;
        let genres = self.repository.books_genres(book_id).await?;
        let similar = self.repository.books_similar(book_id, SIMILAR_LIMIT).await?;

        Ok(BookDetails {
            book,
            genres: genres.into_iter().map(|g| g.name).collect(),
            similar,
        })
    }

    /// Active libraries holding a book, nearest first when a valid position is given
    pub async fn libraries_for_book(
        &self,
        book_id: i64,
        position: Option<Coordinate>,
    ) -> AppResult<Vec<LibraryForBook>> {
        // 404 for unknown books rather than an empty list
        self.repository.books_get_by_id(book_id).await?;

        let holdings = self.repository.libraries_holding_book(book_id, SERVED_CITY).await?;
        tracing::debug!("Book {} held by {} libraries", book_id, holdings.len());

        Ok(rank_by_proximity(position, holdings)
            .into_iter()
            .map(LibraryForBook::from)
            .collect())
    }
}

impl From<Ranked<Holding>> for LibraryForBook {
    fn from(ranked: Ranked<Holding>) -> Self {
        let Holding { library, quantity } = ranked.entity;
        let address = library.address();
        Self {
            id: library.id,
            trade_name: library.trade_name,
            phone: library.phone,
            photo: library.photo,
            address,
            quantity,
            distance_km: ranked.distance_km,
            formatted_distance: ranked.formatted_distance.unwrap_or_else(|| NO_DISTANCE.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geo::SAO_PAULO_CENTER,
        models::{
            enums::{LibraryCategory, LibraryStatus},
            library::LibraryRecord,
        },
    };
    use chrono::Utc;

    fn holding(id: i64, position: Option<(f64, f64)>) -> Holding {
        Holding {
            library: LibraryRecord {
                id,
                trade_name: format!("Biblioteca {}", id),
                legal_name: format!("Biblioteca {} LTDA", id),
                cnpj: "11222333000181".to_string(),
                phone: None,
                category: LibraryCategory::Public,
                website: None,
                photo: None,
                status: LibraryStatus::Active,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                address_id: id,
                cep: "01310100".to_string(),
                street: "Avenida Paulista".to_string(),
                number: "1000".to_string(),
                complement: None,
                district: "Bela Vista".to_string(),
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
                latitude: position.map(|p| p.0),
                longitude: position.map(|p| p.1),
                email: None,
            },
            quantity: 2,
        }
    }

    fn results(position: Option<Coordinate>, holdings: Vec<Holding>) -> Vec<LibraryForBook> {
        rank_by_proximity(position, holdings)
            .into_iter()
            .map(LibraryForBook::from)
            .collect()
    }

    #[test]
    fn test_nearest_library_first() {
        let far = holding(1, Some((-23.6500, -46.7000)));
        let near = holding(2, Some((-23.5600, -46.6400)));
        let unknown = holding(3, None);

        let out = results(Some(SAO_PAULO_CENTER), vec![far, unknown, near]);
        let ids: Vec<i64> = out.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        assert!(out[0].distance_km.unwrap() < out[1].distance_km.unwrap());
        assert_eq!(out[2].distance_km, None);
        assert_eq!(out[2].formatted_distance, "N/A");
        assert_eq!(out[0].address.cep, "01310-100");
    }

    #[test]
    fn test_without_position_keeps_order() {
        let out = results(
            None,
            vec![holding(5, Some((-23.6, -46.7))), holding(4, Some((-23.5, -46.6)))],
        );
        let ids: Vec<i64> = out.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![5, 4]);
        assert!(out.iter().all(|l| l.formatted_distance == "N/A" && l.distance_km.is_none()));
    }

    #[test]
    fn test_invalid_position_is_ignored() {
        let out = results(
            Some(Coordinate::new(123.0, 0.0)),
            vec![holding(9, Some((-23.6, -46.7))), holding(8, Some((-23.5, -46.6)))],
        );
        assert_eq!(out[0].id, 9);
        assert_eq!(out[0].formatted_distance, "N/A");
    }
}
