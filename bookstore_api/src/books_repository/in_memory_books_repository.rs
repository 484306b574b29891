use crate::api::{Book, Reviewer};
use crate::books_repository::{book_with_reviewer_filter, BookRepository};
use crate::document_repository::{
    DocumentRepository, DocumentRepositoryError, Filter, InMemoryDocumentRepository, SortBy,
};

/// In-memory book repository. Reviewer mutations run under the inner store's
/// single write lock, mirroring the atomicity of the mongodb update operators.
pub struct InMemoryBooksRepository {
    books: InMemoryDocumentRepository<Book>,
}

impl Default for InMemoryBooksRepository {
    fn default() -> Self {
        Self {
            books: Default::default(),
        }
    }
}

#[async_trait::async_trait]
impl DocumentRepository<Book> for InMemoryBooksRepository {
    async fn find_one(&self, filter: Filter) -> Result<Option<Book>, DocumentRepositoryError> {
        self.books.find_one(filter).await
    }

    async fn find_many(
        &self,
        filter: Filter,
        sort: Option<SortBy>,
    ) -> Result<Vec<Book>, DocumentRepositoryError> {
        self.books.find_many(filter, sort).await
    }

    async fn insert_one(&self, entity: Book) -> Result<Book, DocumentRepositoryError> {
        self.books.insert_one(entity).await
    }

    async fn find_one_and_replace(
        &self,
        filter: Filter,
        entity: Book,
    ) -> Result<Option<Book>, DocumentRepositoryError> {
        self.books.find_one_and_replace(filter, entity).await
    }

    async fn delete_one(&self, filter: Filter) -> Result<u64, DocumentRepositoryError> {
        self.books.delete_one(filter).await
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBooksRepository {
    async fn add_reviewer(
        &self,
        book_id: &str,
        reviewer: Reviewer,
    ) -> Result<Option<Book>, DocumentRepositoryError> {
        self.books
            .find_one_and_update(&Filter::by_id(book_id), |book| {
                book.reviewers.push(reviewer)
            })
    }

    async fn update_reviewer(
        &self,
        book_id: &str,
        reviewer: Reviewer,
    ) -> Result<Option<Book>, DocumentRepositoryError> {
        self.books.find_one_and_update(
            &book_with_reviewer_filter(book_id, &reviewer.name),
            move |book| {
                // first matching slot only, delete_reviewer is the one that sweeps
                if let Some(existing) = book
                    .reviewers
                    .iter_mut()
                    .find(|existing| existing.name == reviewer.name)
                {
                    existing.institute = reviewer.institute;
                }
            },
        )
    }

    async fn delete_reviewer(
        &self,
        book_id: &str,
        name: &str,
    ) -> Result<Option<Book>, DocumentRepositoryError> {
        self.books
            .find_one_and_update(&Filter::by_id(book_id), |book| {
                book.reviewers.retain(|reviewer| reviewer.name != name)
            })
    }
}
