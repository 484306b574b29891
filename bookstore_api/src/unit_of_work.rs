use std::sync::Arc;

use crate::api::Author;
use crate::books_repository::BookRepository;
use crate::document_repository::DocumentRepository;

/// Single handle bundling one repository per entity type, constructed once at
/// startup and shared by every request handler. "Unit of work" by naming
/// convention only, there is no transaction spanning the two collections.
pub struct BookstoreUnitOfWork {
    authors_repository: Arc<dyn DocumentRepository<Author>>,
    books_repository: Arc<dyn BookRepository>,
}

impl BookstoreUnitOfWork {
    pub fn new(
        authors_repository: Arc<dyn DocumentRepository<Author>>,
        books_repository: Arc<dyn BookRepository>,
    ) -> Self {
        Self {
            authors_repository,
            books_repository,
        }
    }

    pub fn authors(&self) -> &dyn DocumentRepository<Author> {
        self.authors_repository.as_ref()
    }

    pub fn books(&self) -> &dyn BookRepository {
        self.books_repository.as_ref()
    }
}
