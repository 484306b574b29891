use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::document_repository::{
    DocumentEntity, DocumentRepository, DocumentRepositoryError, Filter, SortBy,
};

/// In-memory stand-in for a document collection, insertion order preserved.
/// Used when the service runs with USE_IN_MEMORY_DB and by unit tests.
pub struct InMemoryDocumentRepository<T> {
    documents: RwLock<Vec<T>>,
}

impl<T> Default for InMemoryDocumentRepository<T> {
    fn default() -> Self {
        Self {
            documents: Default::default(),
        }
    }
}

impl<T: DocumentEntity> InMemoryDocumentRepository<T> {
    /// Applies `mutate` to the first document matching the filter under a single
    /// write lock, the in-memory counterpart of an atomic single-document update.
    /// Returns the document after mutation, None when nothing matched.
    pub fn find_one_and_update<F>(
        &self,
        filter: &Filter,
        mutate: F,
    ) -> Result<Option<T>, DocumentRepositoryError>
    where
        F: FnOnce(&mut T),
    {
        let mut documents = self.documents.write();
        let position = matching_position(&documents, filter)?;
        match position {
            Some(index) => {
                mutate(&mut documents[index]);
                Ok(Some(documents[index].clone()))
            }
            None => Ok(None),
        }
    }
}

fn matching_position<T: DocumentEntity>(
    documents: &[T],
    filter: &Filter,
) -> Result<Option<usize>, DocumentRepositoryError> {
    for (index, document) in documents.iter().enumerate() {
        if filter.matches(&serde_json::to_value(document)?) {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn field_as_string(document: &Value, field: &str) -> String {
    match document.get(field) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait::async_trait]
impl<T: DocumentEntity> DocumentRepository<T> for InMemoryDocumentRepository<T> {
    async fn find_one(&self, filter: Filter) -> Result<Option<T>, DocumentRepositoryError> {
        let documents = self.documents.read();
        let position = matching_position(&documents, &filter)?;
        Ok(position.map(|index| documents[index].clone()))
    }

    async fn find_many(
        &self,
        filter: Filter,
        sort: Option<SortBy>,
    ) -> Result<Vec<T>, DocumentRepositoryError> {
        let documents = self.documents.read();
        let mut matching = Vec::new();
        for document in documents.iter() {
            let as_json = serde_json::to_value(document)?;
            if filter.matches(&as_json) {
                matching.push((as_json, document.clone()));
            }
        }
        if let Some(sort) = sort {
            matching.sort_by(|(left, _), (right, _)| {
                let left = field_as_string(left, &sort.field);
                let right = field_as_string(right, &sort.field);
                if sort.ascending {
                    left.cmp(&right)
                } else {
                    right.cmp(&left)
                }
            });
        }
        Ok(matching.into_iter().map(|(_, document)| document).collect())
    }

    async fn insert_one(&self, mut entity: T) -> Result<T, DocumentRepositoryError> {
        if entity.id().is_empty() {
            entity.set_id(Uuid::new_v4().to_string());
        }
        self.documents.write().push(entity.clone());
        Ok(entity)
    }

    async fn find_one_and_replace(
        &self,
        filter: Filter,
        entity: T,
    ) -> Result<Option<T>, DocumentRepositoryError> {
        let mut documents = self.documents.write();
        let position = matching_position(&documents, &filter)?;
        match position {
            Some(index) => {
                documents[index] = entity;
                Ok(Some(documents[index].clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_one(&self, filter: Filter) -> Result<u64, DocumentRepositoryError> {
        let mut documents = self.documents.write();
        let position = matching_position(&documents, &filter)?;
        match position {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod in_memory_document_repository_tests {
    use crate::api::Author;
    use crate::document_repository::{
        DocumentRepository, Filter, InMemoryDocumentRepository, SortBy,
    };

    fn author(name: &str, country: &str) -> Author {
        Author {
            id: "".to_string(),
            name: name.to_string(),
            country: country.to_string(),
        }
    }

    #[tokio::test]
    /// Tests if insert_one and find_one work correctly, including the id assignment
    async fn test_insert_author_and_get_it() {
        let repo = InMemoryDocumentRepository::default();

        let not_found = repo
            .find_one(Filter::by_id("no-such-id"))
            .await
            .expect("Failed to find");
        assert_eq!(not_found, None);

        let inserted = repo
            .insert_one(author("George Orwell", "United Kingdom"))
            .await
            .expect("Failed to insert author");
        assert!(!inserted.id.is_empty());

        let found = repo
            .find_one(Filter::by_id(&inserted.id))
            .await
            .expect("Failed to find author")
            .expect("Author not found");
        assert_eq!(found, inserted);
    }

    #[tokio::test]
    /// Tests that a caller-supplied id is kept as-is
    async fn test_insert_keeps_existing_id() {
        let repo = InMemoryDocumentRepository::default();

        let inserted = repo
            .insert_one(Author {
                id: "fixed-id".to_string(),
                ..author("George Orwell", "United Kingdom")
            })
            .await
            .expect("Failed to insert author");
        assert_eq!(inserted.id, "fixed-id");
    }

    #[tokio::test]
    /// Tests replace of an existing and of a missing document
    async fn test_replace_author() {
        let repo = InMemoryDocumentRepository::default();

        let inserted = repo
            .insert_one(author("George Orwell", "United Kingdom"))
            .await
            .expect("Failed to insert author");

        let replacement = Author {
            country: "India".to_string(),
            ..inserted.clone()
        };
        let replaced = repo
            .find_one_and_replace(Filter::by_id(&inserted.id), replacement.clone())
            .await
            .expect("Failed to replace author")
            .expect("Author not found for replace");
        assert_eq!(replaced, replacement);

        let after = repo
            .find_one(Filter::by_id(&inserted.id))
            .await
            .expect("Failed to find author")
            .expect("Author not found");
        assert_eq!(after, replacement);

        let replaced_missing = repo
            .find_one_and_replace(Filter::by_id("no-such-id"), replacement)
            .await
            .expect("Failed to replace author");
        assert_eq!(replaced_missing, None);
    }

    #[tokio::test]
    /// Tests delete reports 1 for a removed document and 0 for a miss
    async fn test_delete_author() {
        let repo = InMemoryDocumentRepository::default();

        let inserted = repo
            .insert_one(author("George Orwell", "United Kingdom"))
            .await
            .expect("Failed to insert author");

        let deleted = repo
            .delete_one(Filter::by_id(&inserted.id))
            .await
            .expect("Failed to delete author");
        assert_eq!(deleted, 1);

        let found = repo
            .find_one(Filter::by_id(&inserted.id))
            .await
            .expect("Failed to find author");
        assert_eq!(found, None);

        let deleted_again = repo
            .delete_one(Filter::by_id(&inserted.id))
            .await
            .expect("Failed to delete author");
        assert_eq!(deleted_again, 0);
    }

    #[tokio::test]
    /// Tests the listing is sorted by name no matter the insertion order
    async fn test_find_many_sorted_by_name() {
        let repo = InMemoryDocumentRepository::default();

        repo.insert_one(author("Stanislaw Lem", "Poland"))
            .await
            .expect("Failed to insert author");
        repo.insert_one(author("Aldous Huxley", "United Kingdom"))
            .await
            .expect("Failed to insert author");
        repo.insert_one(author("Mary Shelley", "United Kingdom"))
            .await
            .expect("Failed to insert author");

        let authors = repo
            .find_many(Filter::all(), Some(SortBy::ascending("name")))
            .await
            .expect("Failed to list authors");

        let names: Vec<&str> = authors.iter().map(|author| author.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Aldous Huxley", "Mary Shelley", "Stanislaw Lem"]
        );
    }
}
