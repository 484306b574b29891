use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_bson, Document};
use mongodb::options::ReturnDocument;
use mongodb::Collection;
use uuid::Uuid;

use crate::document_repository::{
    Condition, DocumentEntity, DocumentRepository, DocumentRepositoryError, Filter, SortBy,
};

/// Generic repository over one mongodb collection. Holds no state besides the
/// collection handle, atomicity of every operation comes from the store itself.
pub struct MongoDocumentRepository<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T: DocumentEntity> MongoDocumentRepository<T> {
    /// The collection handle is injected, this layer never builds its own connection
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection }
    }

    pub(crate) fn collection(&self) -> &Collection<T> {
        &self.collection
    }
}

/// Translates the store-agnostic filter into a mongodb query document
pub(crate) fn filter_to_document(filter: &Filter) -> Result<Document, DocumentRepositoryError> {
    let mut document = Document::new();
    for condition in filter.conditions() {
        match condition {
            Condition::Eq { field, value } => {
                document.insert(field, to_bson(value)?);
            }
            Condition::ElemMatch { field, filter } => {
                document.insert(field, doc! { "$elemMatch": filter_to_document(filter)? });
            }
        }
    }
    Ok(document)
}

fn sort_to_document(sort: &SortBy) -> Document {
    let direction = if sort.ascending { 1 } else { -1 };
    doc! { sort.field.clone(): direction }
}

#[async_trait::async_trait]
impl<T: DocumentEntity> DocumentRepository<T> for MongoDocumentRepository<T> {
    async fn find_one(&self, filter: Filter) -> Result<Option<T>, DocumentRepositoryError> {
        Ok(self
            .collection
            .find_one(filter_to_document(&filter)?)
            .await?)
    }

    async fn find_many(
        &self,
        filter: Filter,
        sort: Option<SortBy>,
    ) -> Result<Vec<T>, DocumentRepositoryError> {
        let mut find = self.collection.find(filter_to_document(&filter)?);
        if let Some(sort) = sort {
            find = find.sort(sort_to_document(&sort));
        }
        Ok(find.await?.try_collect().await?)
    }

    async fn insert_one(&self, mut entity: T) -> Result<T, DocumentRepositoryError> {
        if entity.id().is_empty() {
            entity.set_id(Uuid::new_v4().to_string());
        }
        self.collection.insert_one(&entity).await?;
        Ok(entity)
    }

    async fn find_one_and_replace(
        &self,
        filter: Filter,
        entity: T,
    ) -> Result<Option<T>, DocumentRepositoryError> {
        Ok(self
            .collection
            .find_one_and_replace(filter_to_document(&filter)?, &entity)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete_one(&self, filter: Filter) -> Result<u64, DocumentRepositoryError> {
        Ok(self
            .collection
            .delete_one(filter_to_document(&filter)?)
            .await?
            .deleted_count)
    }
}
