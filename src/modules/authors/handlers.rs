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

use super::models::AuthorPayload;
use crate::catalog::views::{AuthorView, AUTHOR_VIEW};
use crate::catalog::{Author, Book, Validate};
use crate::modules::extract::{ListQuery, ResourceId};
use crate::modules::state::{created_response, ensure_valid, json_response, CatalogState};

fn render(author: &Author, books: &[Book], version: Version, audience: Audience) -> String {
    let ctx = Context::new(&[AUTHOR_VIEW]).with_version(version);
    let view = AuthorView::new(author)
        .with_books(books)
        .with_links(audience);
    serialize(&view, &ctx).to_string()
}

async fn load(state: &CatalogState, id: i64) -> Result<Author, AppError> {
    state
        .authors
        .find_author(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("author {id} not found")))
}

async fn render_page(
    state: &CatalogState,
    request: PageRequest,
    audience: Audience,
) -> Result<String, AppError> {
    let authors = state.authors.find_author_page(request).await?;
    let ids: Vec<i64> = authors.iter().map(|author| author.id).collect();
    let books = state.books.books_by_authors(&ids).await?;

    let views: Vec<_> = authors
        .iter()
        .map(|author| {
            AuthorView::new(author)
                .with_books(&books)
                .with_links(audience)
        })
        .collect();
    Ok(serialize_all(&views, &Context::new(&[AUTHOR_VIEW])).to_string())
}

/// `GET /api/authors?page=&limit=`
pub async fn list_authors(
    State(state): State<CatalogState>,
    audience: Audience,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let request = query.resolve(state.pagination.author_default_limit, &state.pagination)?;

    let body = state
        .cached_listing("authors", request.page(), request.size(), audience, || {
            render_page(&state, request, audience)
        })
        .await?;

    Ok(json_response(StatusCode::OK, body))
}

/// `GET /api/authors/{id}`
pub async fn show_author(
    State(state): State<CatalogState>,
    ResourceId(id): ResourceId,
    version: AcceptVersion,
    audience: Audience,
) -> Result<Response, AppError> {
    let author = load(&state, id).await?;
    let books = state.books.books_by_authors(&[id]).await?;
    Ok(json_response(
        StatusCode::OK,
        render(&author, &books, version.or(state.default_version), audience),
    ))
}

/// `POST /api/authors`
pub async fn create_author(
    State(state): State<CatalogState>,
    version: AcceptVersion,
    audience: Audience,
    payload: Result<Json<AuthorPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let draft = payload.into_draft();
    ensure_valid(draft.validate())?;

    let author = state.authors.create_author(draft).await?;
    state.invalidate_listings();
    tracing::info!(author_id = author.id, "author created");

    created_response(
        format!("/api/authors/{}", author.id),
        render(&author, &[], version.or(state.default_version), audience),
    )
}

/// `PUT /api/authors/{id}`
pub async fn update_author(
    State(state): State<CatalogState>,
    ResourceId(id): ResourceId,
    payload: Result<Json<AuthorPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    load(&state, id).await?;

    let draft = payload.into_draft();
    ensure_valid(draft.validate())?;

    state.authors.update_author(id, draft).await?;
    state.invalidate_listings();
    tracing::info!(author_id = id, "author updated");

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `DELETE /api/authors/{id}`; the author's books go with them.
pub async fn delete_author(
    State(state): State<CatalogState>,
    ResourceId(id): ResourceId,
) -> Result<Response, AppError> {
    let removal = state.authors.delete_author(id).await?;
    state.invalidate_listings();
    tracing::info!(
        author_id = id,
        cascaded_books = ?removal.cascaded_books,
        "author deleted"
    );

    Ok(StatusCode::NO_CONTENT.into_response())
}
