pub use in_memory_books_repository::InMemoryBooksRepository;
pub use mongo_books_repository::MongoBooksRepository;

use serde_json::json;

use crate::api::{Book, Reviewer};
use crate::document_repository::{DocumentRepository, DocumentRepositoryError, Filter};

mod in_memory_books_repository;
mod mongo_books_repository;

/// Repository for books, extends the generic document surface with the three
/// reviewer mutations expressed as atomic single-document updates
#[async_trait::async_trait]
pub trait BookRepository: DocumentRepository<Book> {
    /// Appends the reviewer to the book's reviewer list, duplicate names are allowed.
    /// Returns the updated book, None when the book id matches nothing.
    async fn add_reviewer(
        &self,
        book_id: &str,
        reviewer: Reviewer,
    ) -> Result<Option<Book>, DocumentRepositoryError>;

    /// Sets the institute of the first reviewer whose name matches `reviewer.name`,
    /// leaving the name and the list order untouched. Returns the updated book,
    /// None when either the book or the named reviewer is missing (the two causes
    /// are indistinguishable at this layer).
    async fn update_reviewer(
        &self,
        book_id: &str,
        reviewer: Reviewer,
    ) -> Result<Option<Book>, DocumentRepositoryError>;

    /// Removes every reviewer with the given name from the book's reviewer list.
    /// Returns the updated book, None when the book id matches nothing.
    async fn delete_reviewer(
        &self,
        book_id: &str,
        name: &str,
    ) -> Result<Option<Book>, DocumentRepositoryError>;
}

/// Compound predicate used by update_reviewer: id match AND array-element match
pub(crate) fn book_with_reviewer_filter(book_id: &str, reviewer_name: &str) -> Filter {
    Filter::by_id(book_id).and(Filter::elem_match(
        "reviewers",
        Filter::field("name", json!(reviewer_name)),
    ))
}
