//! State of the dynamic home page: session, tabs, modals and the library.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::api::{ApiError, SiteApi};
use crate::models::{Book, BookForm, BookPayload, Film, FilmPayload};
use crate::session::{Session, TokenStore};

pub const ERR_CONNECT: &str = "Error connecting to server";
pub const ERR_LOAD: &str = "Failed to load books";
pub const ERR_CREDENTIALS: &str = "Invalid credentials";
pub const ERR_ADD: &str = "Failed to add book";
pub const ERR_UPDATE: &str = "Failed to update book";
pub const ERR_DELETE: &str = "Failed to delete book";
pub const ERR_LOAD_FILMS: &str = "Failed to load films";
pub const ERR_ADD_FILM: &str = "Failed to add film";
pub const ERR_DELETE_FILM: &str = "Failed to delete film";

pub const ADD_BOOK_LABEL: &str = "+ Add New Book";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this book?";
pub const ADD_FILM_LABEL: &str = "+ Add New Film";
pub const DELETE_FILM_PROMPT: &str = "Are you sure you want to delete this film?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    About,
    Portfolio,
    Knowledge,
    Library,
    Films,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::About, Tab::Portfolio, Tab::Knowledge, Tab::Library, Tab::Films];

    pub fn slug(&self) -> &'static str {
        match self {
            Tab::About => "about",
            Tab::Portfolio => "portfolio",
            Tab::Knowledge => "knowledge",
            Tab::Library => "library",
            Tab::Films => "films",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::About => "01. ABOUT",
            Tab::Portfolio => "02. PORTFOLIO",
            Tab::Knowledge => "03. KNOWLEDGE",
            Tab::Library => "04. LIBRARY",
            Tab::Films => "05. CINEMA",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "about" => Ok(Tab::About),
            "portfolio" => Ok(Tab::Portfolio),
            "knowledge" => Ok(Tab::Knowledge),
            "library" => Ok(Tab::Library),
            "films" | "cinema" => Ok(Tab::Films),
            other => Err(format!(
                "Unknown tab '{}'. Use one of: about, portfolio, knowledge, library, films",
                other
            )),
        }
    }
}

/// Identifies one list fetch. Results carrying an outdated ticket are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct RefreshTicket {
    generation: u64,
}

/// What a listing tab shows.
#[derive(Debug, PartialEq)]
pub enum ListView<'a, T> {
    Loading,
    Empty { invite_add: bool },
    Items(&'a [T]),
}

pub type LibraryView<'a> = ListView<'a, Book>;
pub type FilmsView<'a> = ListView<'a, Film>;

pub struct App<A, S> {
    api: A,
    store: S,
    session: Session,
    tab: Tab,
    login_modal: bool,
    book_modal: bool,
    editing: Option<Book>,
    books: Vec<Book>,
    films: Vec<Film>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl<A: SiteApi, S: TokenStore> App<A, S> {
    /// Starts on the About tab, restoring a remembered session.
    pub fn new(api: A, store: S) -> Self {
        let token = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not read persisted token");
            None
        });

        Self {
            api,
            store,
            session: Session::restore(token),
            tab: Tab::default(),
            login_modal: false,
            book_modal: false,
            editing: None,
            books: Vec::new(),
            films: Vec::new(),
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn films(&self) -> &[Film] {
        &self.films
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn editing(&self) -> Option<&Book> {
        self.editing.as_ref()
    }

    pub fn login_modal_open(&self) -> bool {
        self.login_modal
    }

    pub fn book_modal_open(&self) -> bool {
        self.book_modal
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    // ---------- navigation ----------

    /// Switches tab. Any fetch still in flight becomes stale; entering a
    /// listing tab (library or films) hands back a ticket for a fresh one.
    pub fn select_tab(&mut self, tab: Tab) -> Option<RefreshTicket> {
        self.tab = tab;
        self.generation += 1;
        self.loading = false;
        matches!(tab, Tab::Library | Tab::Films).then(|| self.begin_refresh())
    }

    pub async fn open_tab(&mut self, tab: Tab) {
        let Some(ticket) = self.select_tab(tab) else {
            return;
        };
        match tab {
            Tab::Films => {
                let result = self.api.list_films().await;
                self.finish_films_refresh(ticket, result);
            }
            _ => {
                let result = self.api.list_books().await;
                self.finish_refresh(ticket, result);
            }
        }
    }

    // ---------- library listing ----------

    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        RefreshTicket {
            generation: self.generation,
        }
    }

    /// Applies a fetch result unless a newer fetch or a tab change
    /// superseded it. Returns whether it was applied.
    pub fn finish_refresh(&mut self, ticket: RefreshTicket, result: Result<Vec<Book>, ApiError>) -> bool {
        if !self.settle(ticket) {
            return false;
        }
        match result {
            Ok(books) => {
                debug!(count = books.len(), "Loaded books");
                self.books = books;
            }
            Err(e) => self.load_failed(e, ERR_LOAD),
        }
        true
    }

    /// Same as [`App::finish_refresh`] for the Films tab.
    pub fn finish_films_refresh(&mut self, ticket: RefreshTicket, result: Result<Vec<Film>, ApiError>) -> bool {
        if !self.settle(ticket) {
            return false;
        }
        match result {
            Ok(films) => {
                debug!(count = films.len(), "Loaded films");
                self.films = films;
            }
            Err(e) => self.load_failed(e, ERR_LOAD_FILMS),
        }
        true
    }

    fn settle(&mut self, ticket: RefreshTicket) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale list"
            );
            return false;
        }
        self.loading = false;
        true
    }

    fn load_failed(&mut self, e: ApiError, rejected: &str) {
        debug!(error = %e, "List fetch failed");
        self.error = Some(
            match e {
                ApiError::Connectivity(_) => ERR_CONNECT,
                ApiError::Rejected(_) => rejected,
            }
            .to_string(),
        );
    }

    pub async fn refresh_books(&mut self) {
        let ticket = self.begin_refresh();
        let result = self.api.list_books().await;
        self.finish_refresh(ticket, result);
    }

    pub async fn refresh_films(&mut self) {
        let ticket = self.begin_refresh();
        let result = self.api.list_films().await;
        self.finish_films_refresh(ticket, result);
    }

    pub fn library_view(&self) -> LibraryView<'_> {
        self.list_view(&self.books)
    }

    pub fn films_view(&self) -> FilmsView<'_> {
        self.list_view(&self.films)
    }

    fn list_view<'a, T>(&self, items: &'a [T]) -> ListView<'a, T> {
        if self.loading {
            ListView::Loading
        } else if items.is_empty() {
            ListView::Empty {
                invite_add: self.session.is_admin,
            }
        } else {
            ListView::Items(items)
        }
    }

    pub fn add_book_button(&self) -> Option<&'static str> {
        (self.tab == Tab::Library && self.session.is_admin).then_some(ADD_BOOK_LABEL)
    }

    pub fn add_film_button(&self) -> Option<&'static str> {
        (self.tab == Tab::Films && self.session.is_admin).then_some(ADD_FILM_LABEL)
    }

    pub fn admin_button_label(&self) -> &'static str {
        if self.session.is_admin {
            "LOGOUT"
        } else {
            "ADMIN"
        }
    }

    // ---------- session ----------

    pub fn open_login(&mut self) {
        self.login_modal = true;
    }

    pub fn close_login(&mut self) {
        self.login_modal = false;
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        self.error = None;

        match self.api.login(username, password).await {
            Ok(response) => {
                if let Err(e) = self.store.save(&response.token) {
                    warn!(error = %e, "Could not persist token");
                }
                self.session = Session {
                    token: response.token,
                    is_admin: true,
                };
                self.login_modal = false;
                true
            }
            Err(e) => {
                debug!(error = %e, "Login failed");
                self.error = Some(
                    match e {
                        ApiError::Connectivity(_) => ERR_CONNECT,
                        ApiError::Rejected(_) => ERR_CREDENTIALS,
                    }
                    .to_string(),
                );
                false
            }
        }
    }

    pub fn logout(&mut self) {
        self.session = Session::default();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Could not clear persisted token");
        }
    }

    // ---------- book modal ----------

    pub fn open_add_book(&mut self) {
        self.editing = None;
        self.book_modal = true;
    }

    pub fn open_edit_book(&mut self, book: Book) {
        self.editing = Some(book);
        self.book_modal = true;
    }

    pub fn close_book_modal(&mut self) {
        self.book_modal = false;
        self.editing = None;
    }

    pub fn book_modal_title(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Book"
        } else {
            "Add New Book"
        }
    }

    pub fn book_modal_submit_label(&self) -> &'static str {
        if self.editing.is_some() {
            "Update"
        } else {
            "Add Book"
        }
    }

    /// Form pre-filled from the book being edited, or blank.
    pub fn book_form(&self) -> BookForm {
        self.editing
            .as_ref()
            .map(BookForm::from_book)
            .unwrap_or_default()
    }

    /// Submits the modal: update when editing, create otherwise.
    pub async fn save_book(&mut self, form: BookForm) -> bool {
        let payload = form.into_payload();
        match self.editing.as_ref().map(|b| b.id.clone()) {
            Some(id) => self.update_book(&id, payload).await,
            None => self.create_book(payload).await,
        }
    }

    // ---------- writes ----------

    pub async fn create_book(&mut self, payload: BookPayload) -> bool {
        self.error = None;

        match self.api.create_book(&self.session.token, &payload).await {
            Ok(()) => {
                self.refresh_books().await;
                self.book_modal = false;
                true
            }
            Err(e) => {
                self.write_failed(e, ERR_ADD);
                false
            }
        }
    }

    pub async fn update_book(&mut self, id: &str, payload: BookPayload) -> bool {
        self.error = None;

        match self.api.update_book(&self.session.token, id, &payload).await {
            Ok(()) => {
                self.refresh_books().await;
                self.book_modal = false;
                self.editing = None;
                true
            }
            Err(e) => {
                self.write_failed(e, ERR_UPDATE);
                false
            }
        }
    }

    /// Deletes after `confirm` agrees; declining sends nothing.
    pub async fn delete_book(&mut self, id: &str, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(DELETE_PROMPT) {
            return false;
        }
        self.error = None;

        match self.api.delete_book(&self.session.token, id).await {
            Ok(()) => {
                self.refresh_books().await;
                true
            }
            Err(e) => {
                self.write_failed(e, ERR_DELETE);
                false
            }
        }
    }

    pub async fn create_film(&mut self, payload: FilmPayload) -> bool {
        self.error = None;

        match self.api.create_film(&self.session.token, &payload).await {
            Ok(()) => {
                self.refresh_films().await;
                true
            }
            Err(e) => {
                self.write_failed(e, ERR_ADD_FILM);
                false
            }
        }
    }

    /// Deletes a film after `confirm` agrees; declining sends nothing.
    pub async fn delete_film(&mut self, id: &str, confirm: impl FnOnce(&str) -> bool) -> bool {
        if !confirm(DELETE_FILM_PROMPT) {
            return false;
        }
        self.error = None;

        match self.api.delete_film(&self.session.token, id).await {
            Ok(()) => {
                self.refresh_films().await;
                true
            }
            Err(e) => {
                self.write_failed(e, ERR_DELETE_FILM);
                false
            }
        }
    }

    fn write_failed(&mut self, e: ApiError, rejected: &str) {
        debug!(error = %e, "Write failed");
        if e.is_unauthorized() && self.session.has_token() {
            warn!("Token rejected by server, signing out");
            self.logout();
        }
        self.error = Some(
            match e {
                ApiError::Connectivity(_) => ERR_CONNECT,
                ApiError::Rejected(_) => rejected,
            }
            .to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoginResponse;
    use crate::session::MemoryTokenStore;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Login(String),
        Create(String, String),
        Update(String, String),
        Delete(String, String),
        ListFilms,
        CreateFilm(String, String),
        DeleteFilm(String, String),
    }

    /// Scripted backend recording every call.
    #[derive(Clone, Default)]
    struct FakeApi {
        calls: Arc<Mutex<Vec<Call>>>,
        books: Arc<Mutex<Vec<Book>>>,
        films: Arc<Mutex<Vec<Film>>>,
        offline: bool,
        reject_writes: Option<StatusCode>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.offline {
                return Err(ApiError::Connectivity("connection refused".into()));
            }
            Ok(())
        }

        fn write(&self, call: Call) -> Result<(), ApiError> {
            self.record(call)?;
            match self.reject_writes {
                Some(status) => Err(ApiError::Rejected(status)),
                None => Ok(()),
            }
        }
    }

    impl SiteApi for FakeApi {
        async fn list_books(&self) -> Result<Vec<Book>, ApiError> {
            self.record(Call::List)?;
            Ok(self.books.lock().unwrap().clone())
        }

        async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
            self.record(Call::Login(username.to_string()))?;
            if username == "ak" && password == "secret" {
                Ok(LoginResponse {
                    token: "tok-1".into(),
                    user: None,
                })
            } else {
                Err(ApiError::Rejected(StatusCode::UNAUTHORIZED))
            }
        }

        async fn create_book(&self, token: &str, book: &BookPayload) -> Result<(), ApiError> {
            self.write(Call::Create(token.to_string(), book.title.clone()))?;
            self.books.lock().unwrap().push(Book::new(book.clone()));
            Ok(())
        }

        async fn update_book(&self, token: &str, id: &str, book: &BookPayload) -> Result<(), ApiError> {
            self.write(Call::Update(token.to_string(), id.to_string()))?;
            let mut books = self.books.lock().unwrap();
            if let Some(existing) = books.iter_mut().find(|b| b.id == id) {
                existing.apply(book.clone());
            }
            Ok(())
        }

        async fn delete_book(&self, token: &str, id: &str) -> Result<(), ApiError> {
            self.write(Call::Delete(token.to_string(), id.to_string()))?;
            self.books.lock().unwrap().retain(|b| b.id != id);
            Ok(())
        }

        async fn list_films(&self) -> Result<Vec<Film>, ApiError> {
            self.record(Call::ListFilms)?;
            Ok(self.films.lock().unwrap().clone())
        }

        async fn create_film(&self, token: &str, film: &FilmPayload) -> Result<(), ApiError> {
            self.write(Call::CreateFilm(token.to_string(), film.title.clone()))?;
            self.films.lock().unwrap().push(Film::new(film.clone()));
            Ok(())
        }

        async fn delete_film(&self, token: &str, id: &str) -> Result<(), ApiError> {
            self.write(Call::DeleteFilm(token.to_string(), id.to_string()))?;
            self.films.lock().unwrap().retain(|f| f.id != id);
            Ok(())
        }
    }

    fn film(title: &str) -> FilmPayload {
        FilmPayload {
            title: title.into(),
            poster_image_url: None,
            rating: 9,
            tags: vec!["cerebral".into()],
        }
    }

    fn payload(title: &str) -> BookPayload {
        BookPayload {
            title: title.into(),
            author: "Author".into(),
            cover_image_url: None,
            isbn: None,
            rating: 4,
            tags: vec![],
        }
    }

    fn seeded_api() -> FakeApi {
        let api = FakeApi::default();
        api.books.lock().unwrap().push(Book::new(payload("Stoner")));
        api
    }

    async fn admin_app(api: FakeApi) -> (App<FakeApi, MemoryTokenStore>, MemoryTokenStore) {
        let store = MemoryTokenStore::with_token("tok-1");
        let mut app = App::new(api, store.clone());
        app.open_tab(Tab::Library).await;
        (app, store)
    }

    #[test]
    fn starts_on_about_as_guest() {
        let app = App::new(FakeApi::default(), MemoryTokenStore::default());
        assert_eq!(app.tab(), Tab::About);
        assert!(!app.is_admin());
        assert_eq!(app.admin_button_label(), "ADMIN");
    }

    #[test]
    fn persisted_token_restores_admin() {
        let app = App::new(FakeApi::default(), MemoryTokenStore::with_token("old"));
        assert!(app.is_admin());
        assert_eq!(app.session().token, "old");
    }

    #[test]
    fn tab_parsing_and_labels() {
        assert_eq!("cinema".parse::<Tab>().unwrap(), Tab::Films);
        assert!("blog".parse::<Tab>().is_err());
        assert_eq!(Tab::Films.label(), "05. CINEMA");
        assert_eq!(Tab::ALL.len(), 5);
    }

    #[tokio::test]
    async fn valid_login_stores_token_and_shows_admin_controls() {
        let api = FakeApi::default();
        let store = MemoryTokenStore::default();
        let mut app = App::new(api, store.clone());

        app.open_login();
        assert!(app.login("ak", "secret").await);
        assert!(app.is_admin());
        assert!(!app.login_modal_open());
        assert_eq!(store.get().as_deref(), Some("tok-1"));

        app.open_tab(Tab::Library).await;
        assert_eq!(app.add_book_button(), Some(ADD_BOOK_LABEL));
        assert_eq!(app.library_view(), LibraryView::Empty { invite_add: true });
    }

    #[tokio::test]
    async fn invalid_login_keeps_guest() {
        let store = MemoryTokenStore::default();
        let mut app = App::new(FakeApi::default(), store.clone());

        app.open_login();
        assert!(!app.login("ak", "wrong").await);
        assert_eq!(app.error(), Some(ERR_CREDENTIALS));
        assert!(!app.is_admin());
        assert!(app.login_modal_open());
        assert_eq!(store.get(), None);

        app.open_tab(Tab::Library).await;
        assert_eq!(app.add_book_button(), None);
    }

    #[tokio::test]
    async fn offline_login_reports_connectivity() {
        let api = FakeApi {
            offline: true,
            ..FakeApi::default()
        };
        let mut app = App::new(api, MemoryTokenStore::default());
        assert!(!app.login("ak", "secret").await);
        assert_eq!(app.error(), Some(ERR_CONNECT));
    }

    #[tokio::test]
    async fn logout_clears_everything() {
        let (mut app, store) = admin_app(FakeApi::default()).await;
        app.logout();
        assert!(!app.is_admin());
        assert!(app.session().token.is_empty());
        assert_eq!(store.get(), None);
        assert_eq!(app.admin_button_label(), "ADMIN");
    }

    #[tokio::test]
    async fn entering_library_fetches_every_time() {
        let api = seeded_api();
        let mut app = App::new(api.clone(), MemoryTokenStore::default());

        app.open_tab(Tab::Library).await;
        app.open_tab(Tab::About).await;
        app.open_tab(Tab::Library).await;

        assert_eq!(api.calls(), vec![Call::List, Call::List]);
        assert!(matches!(app.library_view(), LibraryView::Items(books) if books.len() == 1));
    }

    #[tokio::test]
    async fn add_book_posts_with_bearer_then_refetches() {
        let api = FakeApi::default();
        let (mut app, _) = admin_app(api.clone()).await;

        app.open_add_book();
        assert_eq!(app.book_modal_title(), "Add New Book");
        let form = BookForm {
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            tags: "sci-fi, classic".into(),
            ..BookForm::default()
        };
        assert!(app.save_book(form).await);

        assert_eq!(
            api.calls(),
            vec![
                Call::List,
                Call::Create("tok-1".into(), "Dune".into()),
                Call::List
            ]
        );
        assert!(!app.book_modal_open());
        assert_eq!(app.books()[0].tags, vec!["sci-fi", "classic"]);
    }

    #[tokio::test]
    async fn edit_book_updates_and_clears_editing() {
        let api = seeded_api();
        let (mut app, _) = admin_app(api.clone()).await;
        let book = app.books()[0].clone();

        app.open_edit_book(book.clone());
        assert_eq!(app.book_modal_submit_label(), "Update");
        let mut form = app.book_form();
        assert_eq!(form.title, "Stoner");
        form.rating = 5;
        assert!(app.save_book(form).await);

        assert!(api.calls().contains(&Call::Update("tok-1".into(), book.id.clone())));
        assert!(app.editing().is_none());
        assert!(!app.book_modal_open());
        assert_eq!(app.books()[0].rating, 5);
    }

    #[tokio::test]
    async fn delete_without_confirmation_sends_nothing() {
        let api = seeded_api();
        let (mut app, _) = admin_app(api.clone()).await;
        let id = app.books()[0].id.clone();

        let mut asked = None;
        let deleted = app
            .delete_book(&id, |prompt| {
                asked = Some(prompt.to_string());
                false
            })
            .await;

        assert!(!deleted);
        assert_eq!(asked.as_deref(), Some(DELETE_PROMPT));
        assert_eq!(api.calls(), vec![Call::List]);
        assert_eq!(app.books().len(), 1);
    }

    #[tokio::test]
    async fn confirmed_delete_refetches() {
        let api = seeded_api();
        let (mut app, _) = admin_app(api.clone()).await;
        let id = app.books()[0].id.clone();

        assert!(app.delete_book(&id, |_| true).await);
        assert_eq!(api.calls().last(), Some(&Call::List));
        assert_eq!(app.library_view(), LibraryView::Empty { invite_add: true });
    }

    #[tokio::test]
    async fn rejected_write_shows_generic_notice() {
        let api = FakeApi {
            reject_writes: Some(StatusCode::BAD_REQUEST),
            ..seeded_api()
        };
        let (mut app, _) = admin_app(api.clone()).await;

        app.open_add_book();
        assert!(!app.create_book(payload("")).await);
        assert_eq!(app.error(), Some(ERR_ADD));
        assert!(app.book_modal_open());
        assert!(app.is_admin());
    }

    #[tokio::test]
    async fn unauthorized_write_signs_out() {
        let api = FakeApi {
            reject_writes: Some(StatusCode::UNAUTHORIZED),
            ..seeded_api()
        };
        let (mut app, store) = admin_app(api).await;
        let id = app.books()[0].id.clone();

        assert!(!app.delete_book(&id, |_| true).await);
        assert_eq!(app.error(), Some(ERR_DELETE));
        assert!(!app.is_admin());
        assert_eq!(store.get(), None);
        assert_eq!(app.books().len(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cache() {
        let api = seeded_api();
        let mut app = App::new(api, MemoryTokenStore::default());
        app.open_tab(Tab::Library).await;

        let ticket = app.begin_refresh();
        assert_eq!(app.library_view(), LibraryView::Loading);
        assert!(app.finish_refresh(ticket, Err(ApiError::Connectivity("down".into()))));
        assert_eq!(app.error(), Some(ERR_CONNECT));
        assert_eq!(app.books().len(), 1);

        let ticket = app.begin_refresh();
        app.finish_refresh(ticket, Err(ApiError::Rejected(StatusCode::INTERNAL_SERVER_ERROR)));
        assert_eq!(app.error(), Some(ERR_LOAD));
    }

    #[tokio::test]
    async fn leaving_library_discards_pending_fetch() {
        let mut app = App::new(FakeApi::default(), MemoryTokenStore::default());

        let ticket = app.select_tab(Tab::Library).unwrap();
        assert!(app.is_loading());
        assert!(app.select_tab(Tab::About).is_none());
        assert!(!app.is_loading());

        let late = vec![Book::new(payload("Late"))];
        assert!(!app.finish_refresh(ticket, Ok(late)));
        assert!(app.books().is_empty());
    }

    #[tokio::test]
    async fn newest_fetch_wins() {
        let mut app = App::new(FakeApi::default(), MemoryTokenStore::default());
        let first = app.begin_refresh();
        let second = app.begin_refresh();

        assert!(app.finish_refresh(second, Ok(vec![Book::new(payload("new"))])));
        assert!(!app.finish_refresh(first, Ok(vec![])));
        assert_eq!(app.books()[0].title, "new");
    }

    #[tokio::test]
    async fn films_tab_lists_films() {
        let api = FakeApi::default();
        api.films.lock().unwrap().push(Film::new(film("Stalker")));
        let mut app = App::new(api.clone(), MemoryTokenStore::default());

        app.open_tab(Tab::Films).await;
        assert_eq!(api.calls(), vec![Call::ListFilms]);
        assert!(matches!(app.films_view(), FilmsView::Items(films) if films[0].title == "Stalker"));
        assert_eq!(app.add_film_button(), None);
    }

    #[tokio::test]
    async fn admin_adds_and_deletes_films() {
        let api = FakeApi::default();
        let store = MemoryTokenStore::with_token("tok-1");
        let mut app = App::new(api.clone(), store);
        app.open_tab(Tab::Films).await;
        assert_eq!(app.add_film_button(), Some(ADD_FILM_LABEL));
        assert_eq!(app.films_view(), FilmsView::Empty { invite_add: true });

        assert!(app.create_film(film("Alien")).await);
        assert_eq!(app.films().len(), 1);
        let id = app.films()[0].id.clone();

        assert!(!app.delete_film(&id, |prompt| prompt != DELETE_FILM_PROMPT).await);
        assert!(app.delete_film(&id, |_| true).await);
        assert!(app.films().is_empty());
        assert_eq!(
            api.calls(),
            vec![
                Call::ListFilms,
                Call::CreateFilm("tok-1".into(), "Alien".into()),
                Call::ListFilms,
                Call::DeleteFilm("tok-1".into(), id),
                Call::ListFilms,
            ]
        );
    }

    #[tokio::test]
    async fn rejected_film_write_signs_out() {
        let api = FakeApi {
            reject_writes: Some(StatusCode::UNAUTHORIZED),
            ..FakeApi::default()
        };
        let store = MemoryTokenStore::with_token("stale");
        let mut app = App::new(api, store.clone());

        assert!(!app.create_film(film("Alien")).await);
        assert_eq!(app.error(), Some(ERR_ADD_FILM));
        assert!(!app.is_admin());
        assert_eq!(store.get(), None);
    }

    #[tokio::test]
    async fn film_fetch_discarded_after_tab_change() {
        let mut app = App::new(FakeApi::default(), MemoryTokenStore::default());
        let ticket = app.select_tab(Tab::Films).unwrap();
        assert!(app.select_tab(Tab::Library).is_some());

        assert!(!app.finish_films_refresh(ticket, Ok(vec![Film::new(film("Late"))])));
        assert!(app.films().is_empty());
    }
}
