use anyhow::{bail, Context};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{Author, Book, Reviewer};

pub struct BookstoreApiClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BookstoreApiClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    pub async fn list_authors(&self) -> anyhow::Result<Vec<Author>> {
        let response = self
            .client
            .get(format!("{}/api/authors", self.url))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to list authors: {}", response.status())
        }
        response.json().await.context("Failed to parse authors")
    }

    pub async fn add_author(&self, author: Author) -> anyhow::Result<Author> {
        let response = self
            .client
            .post(format!("{}/api/authors", self.url))
            .json(&author)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to add author: {}", response.status())
        }
        response.json().await.context("Failed to parse author")
    }

    pub async fn get_author(&self, author_id: &str) -> anyhow::Result<Option<Author>> {
        let response = self
            .client
            .get(format!("{}/api/authors/{}", self.url, author_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            bail!("Failed to get author: {}", response.status())
        }
        Ok(Some(response.json().await.context("Failed to parse author")?))
    }

    pub async fn update_author(&self, author_id: &str, author: Author) -> anyhow::Result<Author> {
        let response = self
            .client
            .put(format!("{}/api/authors/{}", self.url, author_id))
            .json(&author)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to update author: {}", response.status())
        }
        response.json().await.context("Failed to parse author")
    }

    pub async fn delete_author(&self, author_id: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/authors/{}", self.url, author_id))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to delete author: {}", response.status())
        }
        Ok(())
    }

    pub async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        let response = self
            .client
            .get(format!("{}/api/books", self.url))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to list books: {}", response.status())
        }
        response.json().await.context("Failed to parse books")
    }

    pub async fn add_book(&self, book: Book) -> anyhow::Result<Book> {
        let response = self
            .client
            .post(format!("{}/api/books", self.url))
            .json(&book)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to add book: {}", response.status())
        }
        response.json().await.context("Failed to parse book")
    }

    pub async fn get_book(&self, book_id: &str) -> anyhow::Result<Option<Book>> {
        let response = self
            .client
            .get(format!("{}/api/books/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            bail!("Failed to get book: {}", response.status())
        }
        Ok(Some(response.json().await.context("Failed to parse book")?))
    }

    pub async fn update_book(&self, book_id: &str, book: Book) -> anyhow::Result<Book> {
        let response = self
            .client
            .put(format!("{}/api/books/{}", self.url, book_id))
            .json(&book)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to update book: {}", response.status())
        }
        response.json().await.context("Failed to parse book")
    }

    pub async fn delete_book(&self, book_id: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/books/{}", self.url, book_id))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to delete book: {}", response.status())
        }
        Ok(())
    }

    pub async fn add_reviewer(&self, book_id: &str, reviewer: Reviewer) -> anyhow::Result<Book> {
        let response = self
            .client
            .post(format!("{}/api/books/{}/reviewers", self.url, book_id))
            .json(&reviewer)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to add reviewer: {}", response.status())
        }
        response.json().await.context("Failed to parse book")
    }

    pub async fn update_reviewer(&self, book_id: &str, reviewer: Reviewer) -> anyhow::Result<Book> {
        let response = self
            .client
            .put(format!("{}/api/books/{}/reviewers", self.url, book_id))
            .json(&reviewer)
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to update reviewer: {}", response.status())
        }
        response.json().await.context("Failed to parse book")
    }

    pub async fn delete_reviewer(&self, book_id: &str, name: &str) -> anyhow::Result<Book> {
        let response = self
            .client
            .delete(format!(
                "{}/api/books/{}/reviewers/{}",
                self.url, book_id, name
            ))
            .send()
            .await?;
        if !response.status().is_success() {
            bail!("Failed to delete reviewer: {}", response.status())
        }
        response.json().await.context("Failed to parse book")
    }
}
