use crate::models::{Book, BookPayload, Film, FilmPayload};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

const STORAGE_FILE: &str = "books.json";
const FILMS_FILE: &str = "films.json";

fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)
        .context("Failed to serialize records")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub struct BookStorage {
    path: PathBuf,
    books: RwLock<Vec<Book>>,
}

impl BookStorage {
    pub fn new(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(STORAGE_FILE);
        let books = load_records(&path)?;

        Ok(Self {
            path,
            books: RwLock::new(books),
        })
    }

    /// All books, newest first.
    pub async fn list_books(&self) -> Vec<Book> {
        let books = self.books.read().await;
        let mut listed = books.clone();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listed
    }

    pub async fn get_book(&self, id: &str) -> Option<Book> {
        let books = self.books.read().await;
        books.iter().find(|b| b.id == id).cloned()
    }

    pub async fn add_book(&self, payload: BookPayload) -> Result<Book> {
        let mut books = self.books.write().await;
        let book = Book::new(payload);
        books.push(book.clone());
        self.save_to_disk(&books)?;
        Ok(book)
    }

    /// Returns `None` when no book has this id.
    pub async fn update_book(&self, id: &str, payload: BookPayload) -> Result<Option<Book>> {
        let mut books = self.books.write().await;

        let Some(book) = books.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        book.apply(payload);
        let updated = book.clone();
        self.save_to_disk(&books)?;
        Ok(Some(updated))
    }

    /// Returns whether a book was removed.
    pub async fn delete_book(&self, id: &str) -> Result<bool> {
        let mut books = self.books.write().await;
        let before = books.len();
        books.retain(|b| b.id != id);
        if books.len() == before {
            return Ok(false);
        }
        self.save_to_disk(&books)?;
        Ok(true)
    }

    fn save_to_disk(&self, books: &[Book]) -> Result<()> {
        write_records(&self.path, books)
    }
}

/// Films in `films.json`. They are created and deleted, never edited.
pub struct FilmStorage {
    path: PathBuf,
    films: RwLock<Vec<Film>>,
}

impl FilmStorage {
    pub fn new(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(FILMS_FILE);
        let films = load_records(&path)?;

        Ok(Self {
            path,
            films: RwLock::new(films),
        })
    }

    /// All films, newest first.
    pub async fn list_films(&self) -> Vec<Film> {
        let mut listed = self.films.read().await.clone();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        listed
    }

    pub async fn add_film(&self, payload: FilmPayload) -> Result<Film> {
        let mut films = self.films.write().await;
        let film = Film::new(payload);
        films.push(film.clone());
        write_records(&self.path, &films)?;
        Ok(film)
    }

    pub async fn delete_film(&self, id: &str) -> Result<bool> {
        let mut films = self.films.write().await;
        let before = films.len();
        films.retain(|f| f.id != id);
        if films.len() == before {
            return Ok(false);
        }
        write_records(&self.path, &films)?;
        Ok(true)
    }
}
