use mongodb::bson::{doc, to_bson};
use mongodb::options::ReturnDocument;
use mongodb::Collection;

use crate::api::{Book, Reviewer};
use crate::books_repository::{book_with_reviewer_filter, BookRepository};
use crate::document_repository::{
    filter_to_document, DocumentRepository, DocumentRepositoryError, Filter, MongoDocumentRepository,
    SortBy,
};

/// Book repository backed by mongodb. The generic surface delegates to the
/// inner document repository, the reviewer mutations are update-operator
/// expressions applied with find_one_and_update.
pub struct MongoBooksRepository {
    books: MongoDocumentRepository<Book>,
}

impl MongoBooksRepository {
    pub fn new(collection: Collection<Book>) -> Self {
        Self {
            books: MongoDocumentRepository::new(collection),
        }
    }

    fn collection(&self) -> &Collection<Book> {
        self.books.collection()
    }
}

#[async_trait::async_trait]
impl DocumentRepository<Book> for MongoBooksRepository {
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
impl BookRepository for MongoBooksRepository {
    async fn add_reviewer(
        &self,
        book_id: &str,
        reviewer: Reviewer,
    ) -> Result<Option<Book>, DocumentRepositoryError> {
        let update = doc! { "$push": { "reviewers": to_bson(&reviewer)? } };
        Ok(self
            .collection()
            .find_one_and_update(filter_to_document(&Filter::by_id(book_id))?, update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn update_reviewer(
        &self,
        book_id: &str,
        reviewer: Reviewer,
    ) -> Result<Option<Book>, DocumentRepositoryError> {
        // the positional operator binds to the element matched by $elemMatch
        let filter = filter_to_document(&book_with_reviewer_filter(book_id, &reviewer.name))?;
        let update = doc! { "$set": { "reviewers.$.institute": reviewer.institute } };
        Ok(self
            .collection()
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_reviewer(
        &self,
        book_id: &str,
        name: &str,
    ) -> Result<Option<Book>, DocumentRepositoryError> {
        // $pull removes every matching element, not just the first
        let update = doc! { "$pull": { "reviewers": { "name": name } } };
        Ok(self
            .collection()
            .find_one_and_update(filter_to_document(&Filter::by_id(book_id))?, update)
            .return_document(ReturnDocument::After)
            .await?)
    }
}

#[cfg(test)]
mod mongo_books_repository_tests {
    use std::sync::Arc;

    use serial_test::file_serial;
    use testcontainers::core::IntoContainerPort;
    use testcontainers::runners::AsyncRunner;
    use testcontainers::{ContainerAsync, GenericImage, ImageExt};

    use crate::api::{Book, Reviewer};
    use crate::books_repository::{BookRepository, MongoBooksRepository};
    use crate::document_repository::{DocumentRepository, Filter, SortBy};

    async fn start_mongo_container_and_init_repo()
        -> (ContainerAsync<GenericImage>, MongoBooksRepository) {
        let mongo_container = GenericImage::new("mongo", "7")
            .with_mapped_port(27017, 27017.tcp())
            .start()
            .await
            .expect("Failed to start mongo");

        let client = mongodb::Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .expect("Failed to create mongo client");

        for _ in 0..10 {
            if client
                .database("admin")
                .run_command(mongodb::bson::doc! { "ping": 1 })
                .await
                .is_ok()
            {
                let collection = client.database("bookstore_test").collection("books");
                return (mongo_container, MongoBooksRepository::new(collection));
            }
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        }
        panic!("Failed to setup mongo container")
    }

    fn book(name: &str) -> Book {
        Book {
            id: "".to_string(),
            book_name: name.to_string(),
            price: 9.99,
            category: "Novel".to_string(),
            author: "George Orwell".to_string(),
            reviewers: vec![],
        }
    }

    fn reviewer(name: &str, institute: &str) -> Reviewer {
        Reviewer {
            name: name.to_string(),
            institute: institute.to_string(),
        }
    }

    #[tokio::test]
    #[file_serial(key, path => "../.mongotestslock")]
    /// Tests the three reviewer mutations against a real mongod
    /// for the sake of not starting container multiple times it tests everything in one testcase
    async fn test_add_update_and_delete_reviewers() {
        let (_container, repo) = start_mongo_container_and_init_repo().await;

        let inserted = repo.insert_one(book("1984")).await.expect("Failed to insert book");

        // reviewer operations on a missing book report absence, not an error
        let missing = repo
            .add_reviewer("no-such-id", reviewer("A", "X"))
            .await
            .expect("Failed to add reviewer");
        assert_eq!(missing, None);
        let missing = repo
            .update_reviewer("no-such-id", reviewer("A", "X"))
            .await
            .expect("Failed to update reviewer");
        assert_eq!(missing, None);
        let missing = repo
            .delete_reviewer("no-such-id", "A")
            .await
            .expect("Failed to delete reviewer");
        assert_eq!(missing, None);

        // appends keep arrival order and allow duplicate names
        let updated = repo
            .add_reviewer(&inserted.id, reviewer("A", "X"))
            .await
            .expect("Failed to add reviewer")
            .expect("Book not found");
        assert_eq!(updated.reviewers, vec![reviewer("A", "X")]);

        repo.add_reviewer(&inserted.id, reviewer("A", "Y"))
            .await
            .expect("Failed to add reviewer")
            .expect("Book not found");
        let updated = repo
            .add_reviewer(&inserted.id, reviewer("B", "Z"))
            .await
            .expect("Failed to add reviewer")
            .expect("Book not found");
        assert_eq!(
            updated.reviewers,
            vec![reviewer("A", "X"), reviewer("A", "Y"), reviewer("B", "Z")]
        );

        // update touches only the institute of the first matching slot
        let updated = repo
            .update_reviewer(&inserted.id, reviewer("A", "W"))
            .await
            .expect("Failed to update reviewer")
            .expect("Book or reviewer not found");
        assert_eq!(
            updated.reviewers,
            vec![reviewer("A", "W"), reviewer("A", "Y"), reviewer("B", "Z")]
        );

        // updating a name that does not exist leaves the book unmutated
        let missing_name = repo
            .update_reviewer(&inserted.id, reviewer("C", "Q"))
            .await
            .expect("Failed to update reviewer");
        assert_eq!(missing_name, None);

        // delete by name removes every matching slot
        let updated = repo
            .delete_reviewer(&inserted.id, "A")
            .await
            .expect("Failed to delete reviewer")
            .expect("Book not found");
        assert_eq!(updated.reviewers, vec![reviewer("B", "Z")]);
    }

    #[tokio::test]
    #[file_serial(key, path => "../.mongotestslock")]
    /// Tests that concurrent appends are not lost and that listings sort by title
    async fn test_concurrent_adds_and_sorted_listing() {
        let (_container, repo) = start_mongo_container_and_init_repo().await;
        let repo = Arc::new(repo);

        let inserted = repo
            .insert_one(book("Animal Farm"))
            .await
            .expect("Failed to insert book");

        let adds = (0..10).map(|index| {
            let repo = repo.clone();
            let book_id = inserted.id.clone();
            tokio::spawn(async move {
                repo.add_reviewer(&book_id, reviewer(&format!("R{}", index), "X"))
                    .await
                    .expect("Failed to add reviewer")
                    .expect("Book not found");
            })
        });
        for add in futures_util::future::join_all(adds).await {
            add.expect("Add reviewer task panicked");
        }

        let after = repo
            .find_one(Filter::by_id(&inserted.id))
            .await
            .expect("Failed to find book")
            .expect("Book not found");
        assert_eq!(after.reviewers.len(), 10);

        repo.insert_one(book("Homage to Catalonia"))
            .await
            .expect("Failed to insert book");
        repo.insert_one(book("Burmese Days"))
            .await
            .expect("Failed to insert book");

        let books = repo
            .find_many(Filter::all(), Some(SortBy::ascending("name")))
            .await
            .expect("Failed to list books");
        let titles: Vec<&str> = books.iter().map(|book| book.book_name.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Animal Farm", "Burmese Days", "Homage to Catalonia"]
        );
    }
}
