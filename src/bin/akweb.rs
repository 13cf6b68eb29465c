use ak_in_web::api::HttpSiteApi;
use ak_in_web::app::{App, FilmsView, LibraryView, Tab};
use ak_in_web::catalog::{self, BOOK_TAGS, MOVIE_TAGS};
use ak_in_web::config::{ClientConfig, DEFAULT_API_BASE, DEFAULT_SESSION_FILE};
use ak_in_web::filter::Category;
use ak_in_web::format::{format_rating, star_rating};
use ak_in_web::models::{short_id, split_tags, Book, Film, FilmPayload};
use ak_in_web::render::{StaticPage, StaticPageState, NO_MATCHES};
use ak_in_web::session::FileTokenStore;
use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

type Client = App<HttpSiteApi, FileTokenStore>;

#[derive(Parser)]
#[command(name = "akweb")]
#[command(about = "AK_In_Web from the terminal: browse tabs and manage the library", long_about = None)]
struct Cli {
    #[arg(long, global = true, env = "AKWEB_API_BASE", default_value = DEFAULT_API_BASE, help = "Base URL of the book API")]
    api_base: String,

    #[arg(long, global = true, env = "AKWEB_SESSION_FILE", default_value = DEFAULT_SESSION_FILE, help = "Where the login token is kept")]
    session_file: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Log in as admin")]
    Login {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Password")]
        password: String,
    },

    #[command(about = "Log out and forget the token")]
    Logout,

    #[command(about = "Show login state")]
    Whoami,

    #[command(about = "Open a tab: about, portfolio, knowledge, library, films")]
    Tab {
        #[arg(help = "Tab name")]
        name: String,
    },

    #[command(about = "Add a book to the library (admin)")]
    Add {
        #[arg(short, long, help = "Book title")]
        title: String,

        #[arg(short, long, help = "Author name")]
        author: String,

        #[arg(short, long, help = "Cover image URL")]
        cover: Option<String>,

        #[arg(long, help = "ISBN")]
        isbn: Option<String>,

        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=5), help = "Rating, 1-5 stars")]
        rating: u8,

        #[arg(long, help = "Tags (comma-separated)")]
        tags: Option<String>,
    },

    #[command(about = "Edit a library book (admin)")]
    Edit {
        #[arg(short, long, help = "Book ID (or its first characters)")]
        id: String,

        #[arg(short, long, help = "New title")]
        title: Option<String>,

        #[arg(short, long, help = "New author")]
        author: Option<String>,

        #[arg(short, long, help = "New cover image URL")]
        cover: Option<String>,

        #[arg(long, help = "New ISBN")]
        isbn: Option<String>,

        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5), help = "New rating, 1-5 stars")]
        rating: Option<u8>,

        #[arg(long, help = "New tags (comma-separated)")]
        tags: Option<String>,
    },

    #[command(about = "Delete a library book (admin)")]
    Delete {
        #[arg(short, long, help = "Book ID (or its first characters)")]
        id: String,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Add a film to the cinema tab (admin)")]
    AddFilm {
        #[arg(short, long, help = "Film title")]
        title: String,

        #[arg(short, long, help = "Poster image URL")]
        poster: Option<String>,

        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=10), help = "Rating, 1-10")]
        rating: u8,

        #[arg(long, help = "Tags (comma-separated)")]
        tags: Option<String>,
    },

    #[command(about = "Delete a film (admin)")]
    DeleteFilm {
        #[arg(short, long, help = "Film ID (or its first characters)")]
        id: String,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Browse the static listings with tag filters")]
    Static {
        #[command(subcommand)]
        page: StaticCommand,
    },
}

#[derive(Subcommand)]
enum StaticCommand {
    #[command(about = "Books")]
    Library {
        #[arg(short, long = "tag", help = "Tag filter, repeat to combine")]
        tags: Vec<String>,
    },

    #[command(about = "Movies")]
    Cinema {
        #[arg(short, long = "tag", help = "Tag filter, repeat to combine")]
        tags: Vec<String>,
    },

    #[command(about = "Wisdom timeline")]
    Wisdom,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run_command(cli).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_command(cli: Cli) -> Result<()> {
    let config = ClientConfig::new(cli.api_base, cli.session_file);
    let mut app = App::new(
        HttpSiteApi::new(config.api_base.as_str()),
        FileTokenStore::new(&config.session_file),
    );

    match cli.command {
        Commands::Login { username, password } => login(&mut app, &username, &password).await?,
        Commands::Logout => {
            app.logout();
            println!("✅ Logged out successfully!");
        }
        Commands::Whoami => whoami(&app),
        Commands::Tab { name } => {
            let tab: Tab = name.parse().map_err(|e: String| anyhow!(e))?;
            app.open_tab(tab).await;
            print_nav(&app);
            print_tab(&app);
        }
        Commands::Add { title, author, cover, isbn, rating, tags } => {
            require_admin(&app)?;
            app.open_tab(Tab::Library).await;
            app.open_add_book();
            let mut form = app.book_form();
            form.title = title;
            form.author = author;
            form.cover_image_url = cover.unwrap_or_default();
            form.isbn = isbn.unwrap_or_default();
            form.rating = rating;
            form.tags = tags.unwrap_or_default();

            if !app.save_book(form).await {
                return Err(failure(&app));
            }
            println!("✅ Book added!");
            print_tab(&app);
        }
        Commands::Edit { id, title, author, cover, isbn, rating, tags } => {
            require_admin(&app)?;
            let book = find_book(&mut app, &id).await?;
            app.open_edit_book(book);

            let mut form = app.book_form();
            if let Some(title) = title {
                form.title = title;
            }
            if let Some(author) = author {
                form.author = author;
            }
            if let Some(cover) = cover {
                form.cover_image_url = cover;
            }
            if let Some(isbn) = isbn {
                form.isbn = isbn;
            }
            if let Some(rating) = rating {
                form.rating = rating;
            }
            if let Some(tags) = tags {
                form.tags = tags;
            }

            if !app.save_book(form).await {
                return Err(failure(&app));
            }
            println!("✅ Book updated!");
            print_tab(&app);
        }
        Commands::Delete { id, yes } => {
            require_admin(&app)?;
            let book = find_book(&mut app, &id).await?;

            let deleted = app
                .delete_book(&book.id, |prompt| yes || confirm(prompt, &book))
                .await;

            if deleted {
                println!("✅ Deleted '{}'", book.title);
                print_tab(&app);
            } else if app.error().is_some() {
                return Err(failure(&app));
            } else {
                println!("❌ Deletion cancelled");
            }
        }
        Commands::AddFilm { title, poster, rating, tags } => {
            require_admin(&app)?;
            app.open_tab(Tab::Films).await;

            let payload = FilmPayload {
                title,
                poster_image_url: poster.filter(|p| !p.trim().is_empty()),
                rating,
                tags: split_tags(&tags.unwrap_or_default()),
            };
            if !app.create_film(payload).await {
                return Err(failure(&app));
            }
            println!("✅ Film added!");
            print_tab(&app);
        }
        Commands::DeleteFilm { id, yes } => {
            require_admin(&app)?;
            let film = find_film(&mut app, &id).await?;

            let deleted = app
                .delete_film(&film.id, |prompt| yes || confirm_film(prompt, &film))
                .await;

            if deleted {
                println!("✅ Deleted '{}'", film.title);
                print_tab(&app);
            } else if app.error().is_some() {
                return Err(failure(&app));
            } else {
                println!("❌ Deletion cancelled");
            }
        }
        Commands::Static { page } => print_static(page),
    }

    Ok(())
}

fn failure(app: &Client) -> anyhow::Error {
    anyhow!(app.error().unwrap_or("Unknown error").to_string())
}

fn require_admin(app: &Client) -> Result<()> {
    if !app.is_admin() {
        bail!("You must be logged in as admin. Use: akweb login -u <username> -p <password>");
    }
    Ok(())
}

async fn login(app: &mut Client, username: &str, password: &str) -> Result<()> {
    app.open_login();
    if !app.login(username, password).await {
        return Err(failure(app));
    }

    println!("✅ Login successful!");
    println!("👤 Welcome back, {}!", username);
    println!("\n💡 Admin controls are now available on the library tab");
    Ok(())
}

fn whoami(app: &Client) {
    if app.is_admin() {
        println!("👤 Logged in as admin");
        println!("💡 Use 'akweb {}' to log out", app.admin_button_label().to_lowercase());
    } else {
        println!("❌ Not logged in");
        println!("💡 Use 'akweb login -u <username> -p <password>' to log in");
    }
}

async fn find_book(app: &mut Client, id: &str) -> Result<Book> {
    app.open_tab(Tab::Library).await;
    if app.error().is_some() {
        return Err(failure(app));
    }

    let matches: Vec<&Book> = app
        .books()
        .iter()
        .filter(|b| b.id == id || b.id.starts_with(id))
        .collect();

    match matches.as_slice() {
        [book] => Ok((*book).clone()),
        [] => bail!("Book not found with ID: {}", id),
        _ => bail!("ID prefix '{}' matches {} books, use more characters", id, matches.len()),
    }
}

async fn find_film(app: &mut Client, id: &str) -> Result<Film> {
    app.open_tab(Tab::Films).await;
    if app.error().is_some() {
        return Err(failure(app));
    }

    let matches: Vec<&Film> = app.films().iter().filter(|f| f.id.starts_with(id)).collect();

    match matches.as_slice() {
        [film] => Ok((*film).clone()),
        [] => bail!("Film not found with ID: {}", id),
        _ => bail!("ID prefix '{}' matches {} films, use more characters", id, matches.len()),
    }
}

fn confirm(prompt: &str, book: &Book) -> bool {
    println!("📕 {} by {}", book.title, book.author);
    ask(prompt)
}

fn confirm_film(prompt: &str, film: &Film) -> bool {
    println!("🎬 {} ({}/10)", film.title, film.rating);
    ask(prompt)
}

fn ask(prompt: &str) -> bool {
    print!("❓ {} (yes/no): ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }

    let answer = input.trim().to_lowercase();
    answer == "yes" || answer == "y"
}

fn print_nav(app: &Client) {
    let labels: Vec<String> = Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == app.tab() {
                format!("[{}]", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    println!("{}   ({})\n", labels.join("  "), app.admin_button_label());
}

fn print_tab(app: &Client) {
    match app.tab() {
        Tab::About => {
            println!("ABOUT THE WEBSITE\n");
            println!("> Website has 2 functions. AK's personal use and AK's portfolio.");
            println!("> If you are an employer guest please check out PORTFOLIO.");
            println!("> \"If a field doesn't fascinate me, it's only because I don't know enough about it yet.\" -AK");
        }
        Tab::Portfolio | Tab::Knowledge => {
            println!("{}\n", app.tab().label());
            println!("> Coming soon...");
        }
        Tab::Library => print_library(app),
        Tab::Films => print_films(app),
    }
    println!();
}

fn print_library(app: &Client) {
    if let Some(label) = app.add_book_button() {
        println!("{}  (akweb add -t <title> -a <author>)\n", label);
    }
    if let Some(error) = app.error() {
        println!("⚠️  {}\n", error);
    }

    match app.library_view() {
        LibraryView::Loading => println!("Loading books..."),
        LibraryView::Empty { invite_add } => {
            println!("📭 > No books yet. {}", if invite_add { "Add your first book!" } else { "" });
        }
        LibraryView::Items(books) => {
            println!("📚 Library ({})\n", books.len());

            let mut table = Table::new();
            table.add_row(Row::new(vec![
                Cell::new("ID"),
                Cell::new("Title"),
                Cell::new("Author"),
                Cell::new("Rating"),
                Cell::new("Tags"),
            ]));

            for book in books {
                table.add_row(Row::new(vec![
                    Cell::new(short_id(&book.id)),
                    Cell::new(&book.title),
                    Cell::new(&format!("by {}", book.author)),
                    Cell::new(&star_rating(book.rating)),
                    Cell::new(&book.tags.join(", ")),
                ]));
            }

            table.printstd();
        }
    }
}

fn print_films(app: &Client) {
    if let Some(label) = app.add_film_button() {
        println!("{}  (akweb add-film -t <title> -r <rating>)\n", label);
    }
    if let Some(error) = app.error() {
        println!("⚠️  {}\n", error);
    }

    match app.films_view() {
        FilmsView::Loading => println!("Loading films..."),
        FilmsView::Empty { invite_add } => {
            println!("📭 > No films yet. {}", if invite_add { "Add your first film!" } else { "" });
        }
        FilmsView::Items(films) => {
            println!("🎬 Cinema ({})\n", films.len());

            let mut table = Table::new();
            table.add_row(Row::new(vec![
                Cell::new("ID"),
                Cell::new("Title"),
                Cell::new("Rating"),
                Cell::new("Tags"),
            ]));

            for film in films {
                table.add_row(Row::new(vec![
                    Cell::new(short_id(&film.id)),
                    Cell::new(&film.title),
                    Cell::new(&format!("{}/10", film.rating)),
                    Cell::new(&film.tags.join(", ")),
                ]));
            }

            table.printstd();
        }
    }
}

fn print_static(command: StaticCommand) {
    let mut state = StaticPageState::default();

    let (category, tags) = match command {
        StaticCommand::Library { tags } => (Category::Library, tags),
        StaticCommand::Cinema { tags } => (Category::Cinema, tags),
        StaticCommand::Wisdom => {
            println!("🕰️  Wisdom\n");
            for entry in catalog::wisdom() {
                println!("◆ {}", entry.date);
                println!("  {}\n", entry.text);
            }
            return;
        }
    };

    state.change_page(match category {
        Category::Library => StaticPage::Library,
        Category::Cinema => StaticPage::Cinema,
    });

    for tag in &tags {
        if state.filters.get(category).contains(tag) {
            continue;
        }
        if !state.toggle_badge(category, tag) {
            println!("⚠️  No items tagged #{}, filter ignored", tag);
        }
    }

    print_badges(&state, category);
    println!("{}\n", state.counter(category));

    let mut table = Table::new();
    let rows: Vec<Vec<String>> = match category {
        Category::Library => state
            .filtered_books()
            .into_iter()
            .map(|b| {
                vec![
                    b.title.to_string(),
                    format!("{} • {}", b.author, b.year),
                    format_rating(b.rating),
                    b.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" "),
                    b.notes.to_string(),
                ]
            })
            .collect(),
        Category::Cinema => state
            .filtered_movies()
            .into_iter()
            .map(|m| {
                vec![
                    m.title.to_string(),
                    format!("Directed by {} • {}", m.director, m.year),
                    format_rating(m.rating),
                    m.tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" "),
                    m.notes.to_string(),
                ]
            })
            .collect(),
    };

    if rows.is_empty() {
        println!("{}", NO_MATCHES);
        return;
    }

    for row in rows {
        table.add_row(Row::new(row.iter().map(|c| Cell::new(c)).collect()));
    }
    table.printstd();
}

fn print_badges(state: &StaticPageState, category: Category) {
    let vocabulary = match category {
        Category::Library => BOOK_TAGS,
        Category::Cinema => MOVIE_TAGS,
    };
    let used = state.used_tags(category);
    let active = state.filters.get(category);

    let badges: Vec<String> = vocabulary
        .iter()
        .map(|tag| {
            if active.contains(tag) {
                format!("[#{}]", tag)
            } else if used.contains(tag) {
                format!("#{}", tag)
            } else {
                format!("(#{})", tag)
            }
        })
        .collect();

    println!("🏷️  {}", badges.join("  "));
    if !active.is_empty() {
        println!("   active: {}  (drop the --tag flags to clear)", active.active().join(" + "));
    }
}
