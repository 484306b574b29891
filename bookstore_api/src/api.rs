use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type AuthorId = String;
pub type BookId = String;

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Struct representing an author of books sold in the bookstore
pub struct Author {
    /// Empty id means "assign one on insert"
    #[serde(rename = "_id", default)]
    pub id: AuthorId,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Struct representing a reviewer embedded in a book, correlated by name
pub struct Reviewer {
    pub name: String,
    pub institute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Apiv2Schema)]
pub struct Book {
    #[serde(rename = "_id", default)]
    pub id: BookId,
    /// Serialized as "name", the title lives under that field in the books collection
    #[serde(rename = "name")]
    pub book_name: String,
    pub price: f64,
    pub category: String,
    pub author: String,
    #[serde(default)]
    pub reviewers: Vec<Reviewer>,
}
