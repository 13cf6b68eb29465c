//! Client for the site API: books, films and login.

use std::future::Future;

use reqwest::{Response, StatusCode};
use thiserror::Error;

use crate::models::{Book, BookPayload, Film, FilmPayload, LoginRequest, LoginResponse};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or an unreadable body.
    #[error("error connecting to server: {0}")]
    Connectivity(String),

    /// Any non-success status; the cause is not distinguished further.
    #[error("request rejected with status {0}")]
    Rejected(StatusCode),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Rejected(status) if *status == StatusCode::UNAUTHORIZED)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Connectivity(e.to_string())
    }
}

/// Calls the controller needs from the backend.
pub trait SiteApi {
    fn list_books(&self) -> impl Future<Output = Result<Vec<Book>, ApiError>> + Send;

    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginResponse, ApiError>> + Send;

    fn create_book(
        &self,
        token: &str,
        book: &BookPayload,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn update_book(
        &self,
        token: &str,
        id: &str,
        book: &BookPayload,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_book(&self, token: &str, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn list_films(&self) -> impl Future<Output = Result<Vec<Film>, ApiError>> + Send;

    fn create_film(
        &self,
        token: &str,
        film: &FilmPayload,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_film(&self, token: &str, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// `SiteApi` over HTTP. No timeouts are configured.
#[derive(Debug, Clone)]
pub struct HttpSiteApi {
    client: reqwest::Client,
    base: String,
}

impl HttpSiteApi {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        tracing::debug!(%status, url = %response.url(), "Request rejected");
        Err(ApiError::Rejected(status))
    }
}

impl SiteApi for HttpSiteApi {
    async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
        let response = self.client.get(self.url("/books")).send().await?;
        let books: Option<Vec<Book>> = ensure_success(response)?.json().await?;
        Ok(books.unwrap_or_default())
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&request)
            .send()
            .await?;

        Ok(ensure_success(response)?.json().await?)
    }

    async fn create_book(&self, token: &str, book: &BookPayload) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/books"))
            .bearer_auth(token)
            .json(book)
            .send()
            .await?;

        ensure_success(response)?;
        Ok(())
    }

    async fn update_book(&self, token: &str, id: &str, book: &BookPayload) -> Result<(), ApiError> {
        let response = self
            .client
            .put(self.url(&format!("/books/{}", id)))
            .bearer_auth(token)
            .json(book)
            .send()
            .await?;

        ensure_success(response)?;
        Ok(())
    }

    async fn delete_book(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/books/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;

        ensure_success(response)?;
        Ok(())
    }

    async fn list_films(&self) -> Result<Vec<Film>, ApiError> {
        let response = self.client.get(self.url("/films")).send().await?;
        let films: Option<Vec<Film>> = ensure_success(response)?.json().await?;
        Ok(films.unwrap_or_default())
    }

    async fn create_film(&self, token: &str, film: &FilmPayload) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/films"))
            .bearer_auth(token)
            .json(film)
            .send()
            .await?;

        ensure_success(response)?;
        Ok(())
    }

    async fn delete_film(&self, token: &str, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/films/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;

        ensure_success(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_drops_trailing_slash() {
        let api = HttpSiteApi::new("http://localhost:8080/api/");
        assert_eq!(api.url("/books"), "http://localhost:8080/api/books");
    }

    #[test]
    fn unauthorized_detection() {
        assert!(ApiError::Rejected(StatusCode::UNAUTHORIZED).is_unauthorized());
        assert!(!ApiError::Rejected(StatusCode::BAD_REQUEST).is_unauthorized());
        assert!(!ApiError::Connectivity("refused".into()).is_unauthorized());
    }

    #[tokio::test]
    async fn unreachable_server_is_connectivity_error() {
        let api = HttpSiteApi::new("http://127.0.0.1:9/api");
        let err = api.list_books().await.unwrap_err();
        assert!(matches!(err, ApiError::Connectivity(_)));
    }
}
