//! HTTP surface: the book API under `/api`, a health check and the static page.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, State},
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::Html,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ServerError;
use crate::models::{Book, BookPayload, Film, FilmPayload, LoginRequest, LoginResponse, MessageResponse};
use crate::render::{render_page, StaticPageQuery, StaticPageState};
use crate::storage::{BookStorage, FilmStorage};
use crate::user_models::User;
use crate::user_storage::UserStorage;

#[derive(Clone)]
pub struct AppState {
    pub books: Arc<BookStorage>,
    pub films: Arc<FilmStorage>,
    pub users: Arc<UserStorage>,
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/films", get(list_films).post(create_film))
        .route("/films/:id", delete(delete_film));

    Router::new()
        .route("/", get(static_page))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `Json` whose rejections answer 400 with the usual error body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ServerError))]
pub struct JsonBody<T>(pub T);

/// An authenticated administrator, resolved from the bearer token.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ServerError::MissingToken)?;

        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();
        if token.is_empty() {
            return Err(ServerError::MissingToken);
        }

        let user = state
            .users
            .user_for_token(token)
            .await
            .ok_or(ServerError::InvalidToken)?;

        if !user.is_admin {
            return Err(ServerError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn static_page(Query(query): Query<StaticPageQuery>) -> Html<String> {
    Html(render_page(&StaticPageState::from_query(&query)))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let user = state
        .users
        .verify_credentials(&payload.username, &payload.password)
        .await?
        .ok_or(ServerError::InvalidCredentials)?;

    let token = state.users.issue_token(&user).await;
    info!(username = %user.username, "Login succeeded");

    Ok(Json(LoginResponse {
        token: token.token,
        user: Some(user.public()),
    }))
}

async fn list_books(State(state): State<AppState>) -> Json<Vec<Book>> {
    Json(state.books.list_books().await)
}

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ServerError> {
    state
        .books
        .get_book(&id)
        .await
        .map(Json)
        .ok_or(ServerError::BookNotFound)
}

async fn create_book(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    JsonBody(payload): JsonBody<BookPayload>,
) -> Result<(StatusCode, Json<Book>), ServerError> {
    payload.validate().map_err(ServerError::BadRequest)?;

    let book = state.books.add_book(payload).await?;
    info!(id = %book.id, title = %book.title, by = %user.username, "Book created");

    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<BookPayload>,
) -> Result<Json<Book>, ServerError> {
    payload.validate().map_err(ServerError::BadRequest)?;

    let book = state
        .books
        .update_book(&id, payload)
        .await?
        .ok_or(ServerError::BookNotFound)?;
    info!(id = %book.id, by = %user.username, "Book updated");

    Ok(Json(book))
}

async fn delete_book(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServerError> {
    if !state.books.delete_book(&id).await? {
        return Err(ServerError::BookNotFound);
    }
    info!(id = %id, by = %user.username, "Book deleted");

    Ok(Json(MessageResponse {
        message: "Book deleted successfully".to_string(),
    }))
}

async fn list_films(State(state): State<AppState>) -> Json<Vec<Film>> {
    Json(state.films.list_films().await)
}

async fn create_film(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    JsonBody(payload): JsonBody<FilmPayload>,
) -> Result<(StatusCode, Json<Film>), ServerError> {
    payload.validate().map_err(ServerError::BadRequest)?;

    let film = state.films.add_film(payload).await?;
    info!(id = %film.id, title = %film.title, by = %user.username, "Film created");

    Ok((StatusCode::CREATED, Json(film)))
}

async fn delete_film(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServerError> {
    if !state.films.delete_film(&id).await? {
        return Err(ServerError::FilmNotFound);
    }
    info!(id = %id, by = %user.username, "Film deleted");

    Ok(Json(MessageResponse {
        message: "Film deleted successfully".to_string(),
    }))
}
