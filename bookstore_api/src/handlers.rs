use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{Author, Book, Reviewer};
use crate::books_repository::BookRepository;
use crate::document_repository::{DocumentRepository, Filter, SortBy};
use crate::unit_of_work::BookstoreUnitOfWork;

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_authors(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
) -> Result<HttpResponse, Error> {
    Ok(match unit_of_work
        .authors()
        .find_many(Filter::all(), Some(SortBy::ascending("name")))
        .await
    {
        Ok(authors) => HttpResponse::Ok().json(authors),
        Err(err) => {
            tracing::error!("Get all authors failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_author(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    author: web::Json<Author>,
) -> Result<HttpResponse, Error> {
    Ok(match unit_of_work.authors().insert_one(author.into_inner()).await {
        Ok(author) => HttpResponse::Created()
            .append_header((LOCATION, format!("/api/authors/{}", author.id)))
            .json(author),
        Err(err) => {
            tracing::error!("Add author failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_author(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    author_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let author_id = author_id.into_inner();
    Ok(match unit_of_work.authors().find_one(Filter::by_id(&author_id)).await {
        Ok(Some(author)) => HttpResponse::Ok().json(author),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Get author failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn update_author(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    author_id: web::Path<String>,
    author: web::Json<Author>,
) -> Result<HttpResponse, Error> {
    let author_id = author_id.into_inner();
    let author = author.into_inner();
    if author.id != author_id {
        return Ok(HttpResponse::BadRequest().finish());
    }
    Ok(match unit_of_work
        .authors()
        .find_one_and_replace(Filter::by_id(&author_id), author)
        .await
    {
        Ok(Some(author)) => HttpResponse::Ok().json(author),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Update author failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn delete_author(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    author_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let author_id = author_id.into_inner();
    Ok(match unit_of_work.authors().delete_one(Filter::by_id(&author_id)).await {
        Ok(0) => HttpResponse::NotFound().finish(),
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(err) => {
            tracing::error!("Delete author failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_all_books(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
) -> Result<HttpResponse, Error> {
    // the title is stored under "name", see the Book model
    Ok(match unit_of_work
        .books()
        .find_many(Filter::all(), Some(SortBy::ascending("name")))
        .await
    {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => {
            tracing::error!("Get all books failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_book(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    book: web::Json<Book>,
) -> Result<HttpResponse, Error> {
    Ok(match unit_of_work.books().insert_one(book.into_inner()).await {
        Ok(book) => HttpResponse::Created()
            .append_header((LOCATION, format!("/api/books/{}", book.id)))
            .json(book),
        Err(err) => {
            tracing::error!("Add book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_book(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    book_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let book_id = book_id.into_inner();
    Ok(match unit_of_work.books().find_one(Filter::by_id(&book_id)).await {
        Ok(Some(book)) => HttpResponse::Ok().json(book),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn update_book(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    book_id: web::Path<String>,
    book: web::Json<Book>,
) -> Result<HttpResponse, Error> {
    let book_id = book_id.into_inner();
    let book = book.into_inner();
    if book.id != book_id {
        return Ok(HttpResponse::BadRequest().finish());
    }
    Ok(match unit_of_work
        .books()
        .find_one_and_replace(Filter::by_id(&book_id), book)
        .await
    {
        Ok(Some(book)) => HttpResponse::Ok().json(book),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Update book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn delete_book(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    book_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let book_id = book_id.into_inner();
    Ok(match unit_of_work.books().delete_one(Filter::by_id(&book_id)).await {
        Ok(0) => HttpResponse::NotFound().finish(),
        Ok(_) => HttpResponse::NoContent().finish(),
        Err(err) => {
            tracing::error!("Delete book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_reviewer(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    book_id: web::Path<String>,
    reviewer: web::Json<Reviewer>,
) -> Result<HttpResponse, Error> {
    let book_id = book_id.into_inner();
    Ok(match unit_of_work
        .books()
        .add_reviewer(&book_id, reviewer.into_inner())
        .await
    {
        Ok(Some(book)) => HttpResponse::Ok().json(book),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Add reviewer failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn update_reviewer(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    book_id: web::Path<String>,
    reviewer: web::Json<Reviewer>,
) -> Result<HttpResponse, Error> {
    let book_id = book_id.into_inner();
    Ok(match unit_of_work
        .books()
        .update_reviewer(&book_id, reviewer.into_inner())
        .await
    {
        Ok(Some(book)) => HttpResponse::Ok().json(book),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Update reviewer failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn delete_reviewer(
    unit_of_work: Data<Arc<BookstoreUnitOfWork>>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, Error> {
    let (book_id, name) = path.into_inner();
    Ok(match unit_of_work.books().delete_reviewer(&book_id, &name).await {
        Ok(Some(book)) => HttpResponse::Ok().json(book),
        Ok(None) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Delete reviewer failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}
