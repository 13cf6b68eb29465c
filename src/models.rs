use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Book {
    pub fn new(payload: BookPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: payload.title,
            author: payload.author,
            cover_image_url: payload.cover_image_url,
            isbn: payload.isbn,
            rating: payload.rating,
            tags: payload.tags,
            created_at: Utc::now(),
        }
    }

    /// Overwrites every writable field, keeping `id` and `created_at`.
    pub fn apply(&mut self, payload: BookPayload) {
        self.title = payload.title;
        self.author = payload.author;
        self.cover_image_url = payload.cover_image_url;
        self.isbn = payload.isbn;
        self.rating = payload.rating;
        self.tags = payload.tags;
    }
}

/// Writable book fields, the body of create and update calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookPayload {
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BookPayload {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if self.author.trim().is_empty() {
            return Err("Author cannot be empty".to_string());
        }
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "Rating must be between {} and {}",
                Self::MIN_RATING,
                Self::MAX_RATING
            ));
        }
        Ok(())
    }
}

/// Edit-form model for the book modal.
#[derive(Debug, Clone, PartialEq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub cover_image_url: String,
    pub isbn: String,
    pub rating: u8,
    /// Comma separated, as typed.
    pub tags: String,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            cover_image_url: String::new(),
            isbn: String::new(),
            rating: BookPayload::MAX_RATING,
            tags: String::new(),
        }
    }
}

impl BookForm {
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            cover_image_url: book.cover_image_url.clone().unwrap_or_default(),
            isbn: book.isbn.clone().unwrap_or_default(),
            rating: book.rating,
            tags: book.tags.join(", "),
        }
    }

    pub fn into_payload(self) -> BookPayload {
        BookPayload {
            title: self.title,
            author: self.author,
            cover_image_url: non_empty(&self.cover_image_url),
            isbn: non_empty(&self.isbn),
            rating: self.rating,
            tags: split_tags(&self.tags),
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// First eight characters of an id, or all of it when shorter.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub poster_image_url: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Film {
    pub fn new(payload: FilmPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: payload.title,
            poster_image_url: payload.poster_image_url,
            rating: payload.rating,
            tags: payload.tags,
            created_at: Utc::now(),
        }
    }
}

/// Body of a film create call. Films are rated out of ten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmPayload {
    pub title: String,
    #[serde(default)]
    pub poster_image_url: Option<String>,
    pub rating: u8,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FilmPayload {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 10;

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if !(Self::MIN_RATING..=Self::MAX_RATING).contains(&self.rating) {
            return Err(format!(
                "Rating must be between {} and {}",
                Self::MIN_RATING,
                Self::MAX_RATING
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<PublicUser>,
}

/// User as exposed over the API, without the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
