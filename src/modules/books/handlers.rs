use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bookshelf_authz::Audience;
use bookshelf_db::PageRequest;
use bookshelf_http::error::AppError;
use bookshelf_http::version::AcceptVersion;
use bookshelf_view::{serialize, serialize_all, Context, Version};

use super::models::BookPayload;
use crate::catalog::views::{BookView, BOOK_VIEW};
use crate::catalog::{Author, Book, BookDraft, Validate};
use crate::modules::extract::{ListQuery, ResourceId};
use crate::modules::state::{created_response, ensure_valid, json_response, CatalogState};

async fn author_of(state: &CatalogState, book: &Book) -> Result<Vec<Author>, AppError> {
    match book.author_id {
        Some(id) => Ok(state.authors.find_authors(&[id]).await?),
        None => Ok(Vec::new()),
    }
}

async fn render(
    state: &CatalogState,
    book: &Book,
    version: Version,
    audience: Audience,
) -> Result<String, AppError> {
    let authors = author_of(state, book).await?;
    let ctx = Context::new(&[BOOK_VIEW]).with_version(version);
    let view = BookView::new(book)
        .with_author(&authors)
        .with_links(audience);
    Ok(serialize(&view, &ctx).to_string())
}

async fn render_page(
    state: &CatalogState,
    request: PageRequest,
    audience: Audience,
) -> Result<String, AppError> {
    let books = state.books.find_book_page(request).await?;
    let author_ids: Vec<i64> = books.iter().filter_map(|book| book.author_id).collect();
    let authors = state.authors.find_authors(&author_ids).await?;

    let views: Vec<_> = books
        .iter()
        .map(|book| {
            BookView::new(book)
                .with_author(&authors)
                .with_links(audience)
        })
        .collect();
    Ok(serialize_all(&views, &Context::new(&[BOOK_VIEW])).to_string())
}

/// Parse the body into a validated draft. The flag tells whether the body
/// named an author at all.
fn validated_draft(payload: BookPayload) -> Result<(BookDraft, bool), AppError> {
    let requested = payload.id_author.is_some();
    let draft = payload.into_draft();
    ensure_valid(draft.validate())?;
    Ok((draft, requested))
}

fn log_dropped_author(book: &Book, requested: bool) {
    if requested && book.author_id.is_none() {
        tracing::debug!(book_id = book.id, "author reference unresolved; book stored without author");
    }
}

/// `GET /api/books?page=&limit=`
pub async fn list_books(
    State(state): State<CatalogState>,
    audience: Audience,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let request = query.resolve(state.pagination.default_limit, &state.pagination)?;

    let body = state
        .cached_listing("books", request.page(), request.size(), audience, || {
            render_page(&state, request, audience)
        })
        .await?;

    Ok(json_response(StatusCode::OK, body))
}

/// `GET /api/books/{id}`; `comment` appears from version 2.0.
pub async fn show_book(
    State(state): State<CatalogState>,
    ResourceId(id): ResourceId,
    version: AcceptVersion,
    audience: Audience,
) -> Result<Response, AppError> {
    let book = state
        .books
        .find_book(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("book {id} not found")))?;

    let body = render(&state, &book, version.or(state.default_version), audience).await?;
    Ok(json_response(StatusCode::OK, body))
}

/// `POST /api/books`
pub async fn create_book(
    State(state): State<CatalogState>,
    version: AcceptVersion,
    audience: Audience,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let (draft, requested) = validated_draft(payload)?;

    let book = state.books.create_book(draft).await?;
    state.invalidate_listings();
    log_dropped_author(&book, requested);
    tracing::info!(book_id = book.id, author_id = ?book.author_id, "book created");

    let body = render(&state, &book, version.or(state.default_version), audience).await?;
    created_response(format!("/api/books/{}", book.id), body)
}

/// `PUT /api/books/{id}`
pub async fn update_book(
    State(state): State<CatalogState>,
    ResourceId(id): ResourceId,
    payload: Result<Json<BookPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    if state.books.find_book(id).await?.is_none() {
        return Err(AppError::not_found(format!("book {id} not found")));
    }

    let (draft, requested) = validated_draft(payload)?;
    let book = state.books.update_book(id, draft).await?;
    state.invalidate_listings();
    log_dropped_author(&book, requested);
    tracing::info!(book_id = id, author_id = ?book.author_id, "book updated");

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `DELETE /api/books/{id}`
pub async fn delete_book(
    State(state): State<CatalogState>,
    ResourceId(id): ResourceId,
) -> Result<Response, AppError> {
    state.books.delete_book(id).await?;
    state.invalidate_listings();
    tracing::info!(book_id = id, "book deleted");

    Ok(StatusCode::NO_CONTENT.into_response())
}
