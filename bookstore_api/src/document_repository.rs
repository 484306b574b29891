pub use in_memory_document_repository::InMemoryDocumentRepository;
pub use mongo_document_repository::MongoDocumentRepository;
pub(crate) use mongo_document_repository::filter_to_document;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::api::{Author, Book};

mod in_memory_document_repository;
mod mongo_document_repository;

#[derive(thiserror::Error, Debug)]
pub enum DocumentRepositoryError {
    #[error("Failed to deserialize document: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to convert filter value to bson: {0}")]
    BsonConversionError(#[from] mongodb::bson::ser::Error),

    #[error("Database failure {0}")]
    DatabaseFailure(#[from] mongodb::error::Error),

    #[error("Other error {0}")]
    Other(String),
}

/// Document stored in its own collection, addressable by an opaque string id
pub trait DocumentEntity:
    Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static
{
    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);
}

impl DocumentEntity for Author {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl DocumentEntity for Book {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Single comparison over a document field, kept as plain data so that every
/// backend can translate it to its own query representation
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals value
    Eq { field: String, value: Value },
    /// Array field contains at least one element matching the nested filter
    ElemMatch { field: String, filter: Filter },
}

/// Conjunction of conditions over document fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Matches every document
    pub fn all() -> Self {
        Self::default()
    }

    pub fn field(field: impl Into<String>, value: Value) -> Self {
        Self {
            conditions: vec![Condition::Eq {
                field: field.into(),
                value,
            }],
        }
    }

    /// Matches documents whose id equals `id`
    pub fn by_id(id: &str) -> Self {
        Self::field("_id", Value::String(id.to_string()))
    }

    pub fn elem_match(field: impl Into<String>, filter: Filter) -> Self {
        Self {
            conditions: vec![Condition::ElemMatch {
                field: field.into(),
                filter,
            }],
        }
    }

    pub fn and(mut self, other: Filter) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Evaluates the filter against the json representation of a document
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.matches(document))
    }
}

impl Condition {
    fn matches(&self, document: &Value) -> bool {
        match self {
            Condition::Eq { field, value } => document.get(field) == Some(value),
            Condition::ElemMatch { field, filter } => document
                .get(field)
                .and_then(Value::as_array)
                .map_or(false, |elements| {
                    elements.iter().any(|element| filter.matches(element))
                }),
        }
    }
}

/// Sort order applied to listings
#[derive(Debug, Clone, PartialEq)]
pub struct SortBy {
    pub field: String,
    pub ascending: bool,
}

impl SortBy {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }
}

#[async_trait::async_trait]
pub trait DocumentRepository<T: DocumentEntity>: Send + Sync {
    /// Returns the first document matching the filter, None when nothing matches
    async fn find_one(&self, filter: Filter) -> Result<Option<T>, DocumentRepositoryError>;

    /// Returns all documents matching the filter, an empty filter returns the whole collection
    async fn find_many(
        &self,
        filter: Filter,
        sort: Option<SortBy>,
    ) -> Result<Vec<T>, DocumentRepositoryError>;

    /// Persists the document, assigning a fresh id when it comes without one,
    /// and returns the persisted representation
    async fn insert_one(&self, entity: T) -> Result<T, DocumentRepositoryError>;

    /// Atomically replaces the first matching document wholesale and returns the
    /// resulting document, None when nothing matched
    async fn find_one_and_replace(
        &self,
        filter: Filter,
        entity: T,
    ) -> Result<Option<T>, DocumentRepositoryError>;

    /// Removes at most one matching document, returns the number of documents removed
    async fn delete_one(&self, filter: Filter) -> Result<u64, DocumentRepositoryError>;
}

#[cfg(test)]
mod filter_tests {
    use serde_json::json;

    use crate::document_repository::Filter;

    #[test]
    fn test_eq_condition_matches_on_field_value() {
        let document = json!({"_id": "a1", "name": "Orwell"});

        assert!(Filter::by_id("a1").matches(&document));
        assert!(!Filter::by_id("a2").matches(&document));
        assert!(Filter::field("name", json!("Orwell")).matches(&document));
        assert!(!Filter::field("name", json!("orwell")).matches(&document));
        assert!(!Filter::field("missing", json!("Orwell")).matches(&document));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::all().matches(&json!({"_id": "a1"})));
        assert!(Filter::all().matches(&json!({})));
    }

    #[test]
    fn test_and_requires_all_conditions() {
        let document = json!({"_id": "b1", "category": "novel"});
        let matching = Filter::by_id("b1").and(Filter::field("category", json!("novel")));
        let not_matching = Filter::by_id("b1").and(Filter::field("category", json!("drama")));

        assert!(matching.matches(&document));
        assert!(!not_matching.matches(&document));
    }

    #[test]
    fn test_elem_match_looks_into_array_elements() {
        let document = json!({
            "_id": "b1",
            "reviewers": [
                {"name": "A", "institute": "X"},
                {"name": "B", "institute": "Y"},
            ]
        });

        let has_b = Filter::elem_match("reviewers", Filter::field("name", json!("B")));
        let has_c = Filter::elem_match("reviewers", Filter::field("name", json!("C")));

        assert!(has_b.matches(&document));
        assert!(!has_c.matches(&document));
        // array missing or not an array does not match
        assert!(!has_b.matches(&json!({"_id": "b1"})));
        assert!(!has_b.matches(&json!({"_id": "b1", "reviewers": "B"})));
    }
}
