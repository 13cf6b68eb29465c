//! The static listings page, rendered to HTML from an explicit state object.
//!
//! Filter state travels in the query string (`page`, `library`, `cinema`,
//! tags comma separated), so every badge is a plain link to the toggled state.

use std::fmt::Write;
use std::str::FromStr;

use serde::Deserialize;

use crate::catalog::{self, StaticBook, StaticMovie, BOOK_TAGS, MOVIE_TAGS};
use crate::filter::{used_tags, Category, FilterState, Filters};
use crate::format::{format_rating, ImageSlot, BOOK_ACCENT, MOVIE_ACCENT};

pub const NO_MATCHES: &str = "[ NO_MATCHES_FOUND ]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaticPage {
    #[default]
    About,
    Library,
    Cinema,
    Wisdom,
}

impl StaticPage {
    pub const ALL: [StaticPage; 4] = [
        StaticPage::About,
        StaticPage::Library,
        StaticPage::Cinema,
        StaticPage::Wisdom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaticPage::About => "about",
            StaticPage::Library => "library",
            StaticPage::Cinema => "cinema",
            StaticPage::Wisdom => "wisdom",
        }
    }
}

impl FromStr for StaticPage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "about" => Ok(StaticPage::About),
            "library" => Ok(StaticPage::Library),
            "cinema" => Ok(StaticPage::Cinema),
            "wisdom" => Ok(StaticPage::Wisdom),
            other => Err(format!("Unknown page '{}'", other)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StaticPageQuery {
    pub page: Option<String>,
    pub library: Option<String>,
    pub cinema: Option<String>,
}

/// Everything the static page needs between clicks.
#[derive(Debug, Clone)]
pub struct StaticPageState {
    pub page: StaticPage,
    pub filters: Filters,
    books: Vec<StaticBook>,
    movies: Vec<StaticMovie>,
}

impl Default for StaticPageState {
    fn default() -> Self {
        Self {
            page: StaticPage::default(),
            filters: Filters::default(),
            books: catalog::books(),
            movies: catalog::movies(),
        }
    }
}

impl StaticPageState {
    /// Unknown pages fall back to About; unusable tags are dropped.
    pub fn from_query(query: &StaticPageQuery) -> Self {
        let mut state = Self::default();
        state.page = query
            .page
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();

        for (category, raw) in [
            (Category::Library, query.library.as_deref()),
            (Category::Cinema, query.cinema.as_deref()),
        ] {
            for tag in raw.unwrap_or_default().split(',').map(str::trim) {
                if !tag.is_empty() && !state.filters.get(category).contains(tag) {
                    state.toggle_badge(category, tag);
                }
            }
        }
        state
    }

    pub fn books(&self) -> &[StaticBook] {
        &self.books
    }

    pub fn movies(&self) -> &[StaticMovie] {
        &self.movies
    }

    pub fn change_page(&mut self, page: StaticPage) {
        self.page = page;
    }

    pub fn used_tags(&self, category: Category) -> Vec<&'static str> {
        match category {
            Category::Library => used_tags(&self.books, BOOK_TAGS),
            Category::Cinema => used_tags(&self.movies, MOVIE_TAGS),
        }
    }

    /// A badge click. Tags no item carries are disabled and ignored.
    pub fn toggle_badge(&mut self, category: Category, tag: &str) -> bool {
        if !self.used_tags(category).iter().any(|used| *used == tag) {
            return false;
        }
        self.filters.toggle(tag, category);
        true
    }

    pub fn clear(&mut self, category: Category) {
        self.filters.clear(category);
    }

    pub fn filtered_books(&self) -> Vec<&StaticBook> {
        self.filters.library.apply(&self.books)
    }

    pub fn filtered_movies(&self) -> Vec<&StaticMovie> {
        self.filters.cinema.apply(&self.movies)
    }

    pub fn counter(&self, category: Category) -> String {
        let (shown, total) = match category {
            Category::Library => (self.filtered_books().len(), self.books.len()),
            Category::Cinema => (self.filtered_movies().len(), self.movies.len()),
        };
        format!("Showing {} of {} volumes", shown, total)
    }

    /// Link to `page` carrying the given filters.
    fn href(page: StaticPage, filters: &Filters) -> String {
        let mut href = format!("?page={}", page.as_str());
        for (category, state) in [
            (Category::Library, &filters.library),
            (Category::Cinema, &filters.cinema),
        ] {
            if !state.is_empty() {
                let _ = write!(href, "&{}={}", category, encode_component(&state.active().join(",")));
            }
        }
        href
    }

    fn href_with_toggle(&self, category: Category, tag: &str) -> String {
        let mut filters = self.filters.clone();
        filters.toggle(tag, category);
        Self::href(self.page, &filters)
    }

    fn href_cleared(&self, category: Category) -> String {
        let mut filters = self.filters.clone();
        filters.clear(category);
        Self::href(self.page, &filters)
    }
}

pub fn render_page(state: &StaticPageState) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>AK_In_Web</title>\n</head>\n<body>\n<nav>\n",
    );

    for page in StaticPage::ALL {
        let active = if page == state.page { " active" } else { "" };
        let _ = writeln!(
            html,
            "<a class=\"nav-link{}\" href=\"{}\">{}</a>",
            active,
            escape(&StaticPageState::href(page, &state.filters)),
            page.as_str().to_uppercase()
        );
    }
    html.push_str("</nav>\n<main>\n");

    match state.page {
        StaticPage::About => html.push_str(
            "<section class=\"page active\" id=\"about\">\
             <p>&gt; Books, films and a little wisdom, curated by AK.</p></section>\n",
        ),
        StaticPage::Library => render_listing(&mut html, state, Category::Library),
        StaticPage::Cinema => render_listing(&mut html, state, Category::Cinema),
        StaticPage::Wisdom => render_wisdom(&mut html),
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_listing(html: &mut String, state: &StaticPageState, category: Category) {
    let (vocabulary, unused_title) = match category {
        Category::Library => (BOOK_TAGS, "No books with this tag yet"),
        Category::Cinema => (MOVIE_TAGS, "No movies with this tag yet"),
    };
    let used = state.used_tags(category);
    let active = state.filters.get(category);

    let _ = writeln!(html, "<section class=\"page active\" id=\"{}\">", category);
    let _ = writeln!(html, "<div class=\"filter-badges\" id=\"filter-badges-{}\">", category);
    for tag in vocabulary {
        render_badge(html, state, category, tag, active, used.contains(tag), unused_title);
    }
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<div class=\"counter\" id=\"counter-{}\">{}</div>",
        category,
        state.counter(category)
    );
    if !active.is_empty() {
        let _ = writeln!(
            html,
            "<a class=\"clear\" id=\"clear-{}\" href=\"{}\">CLEAR</a>",
            category,
            escape(&state.href_cleared(category))
        );
    }

    let cards: Vec<String> = match category {
        Category::Library => state.filtered_books().into_iter().map(book_card).collect(),
        Category::Cinema => state.filtered_movies().into_iter().map(movie_card).collect(),
    };

    let _ = writeln!(html, "<div class=\"cards\" id=\"{}-cards\">", category);
    if cards.is_empty() {
        let _ = writeln!(html, "<div class=\"no-matches\">{}</div>", NO_MATCHES);
    } else {
        for card in cards {
            html.push_str(&card);
        }
    }
    html.push_str("</div>\n</section>\n");
}

fn render_badge(
    html: &mut String,
    state: &StaticPageState,
    category: Category,
    tag: &str,
    active: &FilterState,
    is_used: bool,
    unused_title: &str,
) {
    if !is_used {
        let _ = writeln!(
            html,
            "<button class=\"badge unused-tag\" title=\"{}\" disabled>#{}</button>",
            unused_title,
            escape(tag)
        );
        return;
    }

    let class = if active.contains(tag) { "badge active" } else { "badge" };
    let _ = writeln!(
        html,
        "<a class=\"{}\" data-tag=\"{}\" data-type=\"{}\" href=\"{}\">#{}</a>",
        class,
        escape(tag),
        category,
        escape(&state.href_with_toggle(category, tag)),
        escape(tag)
    );
}

/// `<img>` that swaps to the placeholder once; `onerror` unhooks itself first.
fn image_tag(src: &str, title: &str, accent: &str) -> String {
    let slot = ImageSlot::new(src, title, accent);
    format!(
        "<img src=\"{}\" alt=\"{}\" class=\"card-cover\" onerror=\"this.onerror=null; this.src='{}';\">",
        escape(slot.src()),
        escape(title),
        escape(slot.fallback())
    )
}

fn tag_list(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!("<span class=\"tag\">#{}</span>", escape(t)))
        .collect()
}

fn book_card(book: &StaticBook) -> String {
    let src = format!("public/cover/{}", book.cover.unwrap_or("default-cover.webp"));
    let isbn = book
        .isbn
        .map(|isbn| format!(" • ISBN: {}", escape(isbn)))
        .unwrap_or_default();

    format!(
        "<div class=\"card\">{}<div class=\"card-content\">\
         <div class=\"card-title\">{}</div>\
         <div class=\"card-meta\">{} • {}{}</div>\
         <div class=\"card-rating\">{}</div>\
         <div class=\"card-note\">\"{}\"</div>\
         <div class=\"card-tags\">{}</div></div></div>\n",
        image_tag(&src, book.title, BOOK_ACCENT),
        escape(book.title),
        escape(book.author),
        book.year,
        isbn,
        escape(&format_rating(book.rating)),
        escape(book.notes),
        tag_list(&book.tags)
    )
}

fn movie_card(movie: &StaticMovie) -> String {
    let src = format!("public/poster/{}", movie.poster.unwrap_or("default-poster.webp"));

    format!(
        "<div class=\"card\">{}<div class=\"card-content\">\
         <div class=\"card-title\">{}</div>\
         <div class=\"card-meta\">Directed by {} • {}</div>\
         <div class=\"card-rating\">{}</div>\
         <div class=\"card-note\">\"{}\"</div>\
         <div class=\"card-tags\">{}</div></div></div>\n",
        image_tag(&src, movie.title, MOVIE_ACCENT),
        escape(movie.title),
        escape(movie.director),
        movie.year,
        escape(&format_rating(movie.rating)),
        escape(movie.notes),
        tag_list(&movie.tags)
    )
}

fn render_wisdom(html: &mut String) {
    html.push_str("<section class=\"page active\" id=\"wisdom\">\n<div class=\"timeline\">\n");
    for entry in catalog::wisdom() {
        let _ = writeln!(
            html,
            "<div class=\"timeline-entry\"><div class=\"timeline-diamond\"></div>\
             <div class=\"timeline-box\"><div class=\"timeline-date\">{}</div>\
             <div class=\"timeline-text\">{}</div></div></div>",
            escape(entry.date),
            escape(entry.text)
        );
    }
    html.push_str("</div>\n</section>\n");
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes everything outside the URL unreserved set.
fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}
