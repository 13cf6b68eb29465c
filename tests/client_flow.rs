use std::sync::Arc;

use ak_in_web::api::HttpSiteApi;
use ak_in_web::app::{
    App, FilmsView, LibraryView, Tab, ADD_BOOK_LABEL, ADD_FILM_LABEL, ERR_ADD, ERR_CONNECT, ERR_CREDENTIALS,
};
use ak_in_web::models::{BookForm, FilmPayload};
use ak_in_web::server::{build_router, AppState};
use ak_in_web::session::{FileTokenStore, TokenStore};
use ak_in_web::storage::{BookStorage, FilmStorage};
use ak_in_web::user_models::User;
use ak_in_web::user_storage::UserStorage;
use tempfile::TempDir;

struct TestServer {
    base: String,
    books: Arc<BookStorage>,
    dir: TempDir,
}

async fn spawn_server() -> TestServer {
    let dir = TempDir::new().unwrap();
    let books = Arc::new(BookStorage::new(dir.path()).unwrap());
    let users = Arc::new(UserStorage::new(dir.path(), chrono::Duration::hours(1)).unwrap());
    let hash = bcrypt::hash("secret", 4).unwrap();
    users.create_user(User::new("ak".into(), hash, true)).await.unwrap();

    let app = build_router(
        AppState {
            books: books.clone(),
            films: Arc::new(FilmStorage::new(dir.path()).unwrap()),
            users,
        },
        &[],
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base: format!("http://{}/api", addr),
        books,
        dir,
    }
}

fn client(server: &TestServer) -> (App<HttpSiteApi, FileTokenStore>, FileTokenStore) {
    let store = FileTokenStore::new(server.dir.path().join(".session"));
    (App::new(HttpSiteApi::new(server.base.as_str()), store.clone()), store)
}

fn form(title: &str) -> BookForm {
    BookForm {
        title: title.into(),
        author: "Ursula K. Le Guin".into(),
        tags: "fiction, anarchism".into(),
        ..BookForm::default()
    }
}

#[tokio::test]
async fn valid_login_unlocks_library_controls() {
    let server = spawn_server().await;
    let (mut app, store) = client(&server);

    app.open_login();
    assert!(app.login("ak", "secret").await);
    assert!(app.is_admin());
    assert!(store.load().unwrap().is_some());

    app.open_tab(Tab::Library).await;
    assert_eq!(app.add_book_button(), Some(ADD_BOOK_LABEL));
    assert_eq!(app.library_view(), LibraryView::Empty { invite_add: true });
}

#[tokio::test]
async fn invalid_login_stays_guest() {
    let server = spawn_server().await;
    let (mut app, store) = client(&server);

    assert!(!app.login("ak", "wrong").await);
    assert_eq!(app.error(), Some(ERR_CREDENTIALS));
    assert!(!app.is_admin());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn add_edit_and_delete_through_the_api() {
    let server = spawn_server().await;
    let (mut app, _) = client(&server);
    assert!(app.login("ak", "secret").await);
    app.open_tab(Tab::Library).await;

    app.open_add_book();
    assert!(app.save_book(form("The Dispossessed")).await);
    assert!(!app.book_modal_open());
    assert_eq!(app.books().len(), 1);
    assert_eq!(app.books()[0].tags, vec!["fiction", "anarchism"]);

    let book = app.books()[0].clone();
    app.open_edit_book(book.clone());
    let mut edit = app.book_form();
    edit.rating = 3;
    assert!(app.save_book(edit).await);
    assert_eq!(app.books()[0].rating, 3);
    assert!(app.editing().is_none());

    assert!(!app.delete_book(&book.id, |_| false).await);
    assert_eq!(server.books.list_books().await.len(), 1);

    assert!(app.delete_book(&book.id, |_| true).await);
    assert!(server.books.list_books().await.is_empty());
    assert!(app.books().is_empty());
}

#[tokio::test]
async fn films_tab_adds_and_deletes_through_the_api() {
    let server = spawn_server().await;
    let (mut app, _) = client(&server);
    assert!(app.login("ak", "secret").await);

    app.open_tab(Tab::Films).await;
    assert_eq!(app.add_film_button(), Some(ADD_FILM_LABEL));
    assert_eq!(app.films_view(), FilmsView::Empty { invite_add: true });

    let payload = FilmPayload {
        title: "Solaris".into(),
        poster_image_url: None,
        rating: 9,
        tags: vec!["sci-fi".into()],
    };
    assert!(app.create_film(payload).await);
    assert_eq!(app.films().len(), 1);

    let id = app.films()[0].id.clone();
    assert!(app.delete_film(&id, |_| true).await);
    assert!(app.films().is_empty());
}

#[tokio::test]
async fn remembered_token_is_dropped_when_rejected() {
    let server = spawn_server().await;
    let store = FileTokenStore::new(server.dir.path().join(".session"));
    store.save("issued-before-restart").unwrap();

    let mut app = App::new(HttpSiteApi::new(server.base.as_str()), store.clone());
    assert!(app.is_admin());

    app.open_add_book();
    assert!(!app.save_book(form("Lathe of Heaven")).await);
    assert_eq!(app.error(), Some(ERR_ADD));
    assert!(!app.is_admin());
    assert_eq!(store.load().unwrap(), None);
    assert!(server.books.list_books().await.is_empty());
}

#[tokio::test]
async fn unreachable_api_reports_connectivity() {
    let dir = TempDir::new().unwrap();
    let store = FileTokenStore::new(dir.path().join(".session"));
    let mut app = App::new(HttpSiteApi::new("http://127.0.0.1:9/api"), store);

    app.open_tab(Tab::Library).await;
    assert_eq!(app.error(), Some(ERR_CONNECT));
    assert!(app.books().is_empty());
}
