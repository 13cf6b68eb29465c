//! Hard-coded listings for the static page.

use crate::filter::{validate_tags, Tagged};

pub const BOOK_TAGS: &[&str] = &[
    "programming",
    "read in english",
    "book club",
    "project every house book",
    "mathematics",
    "philosophy",
    "podcast",
    "random",
    "want to read",
    "reading",
    "read",
];

pub const MOVIE_TAGS: &[&str] = &[
    "🇹🇷",
    "🇰🇷",
    "drama",
    "horror",
    "psychological",
    "mystery",
    "action",
    "adventure",
    "fantasy",
    "comedy",
    "documentary",
    "animated",
    "sci-fi",
    "cerebral",
    "visual-storytelling",
    "narrative",
    "artistic",
];

#[derive(Debug, Clone, PartialEq)]
pub struct StaticBook {
    pub id: u32,
    pub title: &'static str,
    pub author: &'static str,
    pub isbn: Option<&'static str>,
    pub rating: f64,
    pub year: u16,
    pub tags: Vec<String>,
    pub cover: Option<&'static str>,
    pub notes: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticMovie {
    pub id: u32,
    pub title: &'static str,
    pub director: &'static str,
    pub rating: f64,
    pub year: u16,
    pub tags: Vec<String>,
    pub poster: Option<&'static str>,
    pub notes: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WisdomEntry {
    pub date: &'static str,
    pub text: &'static str,
}

impl Tagged for StaticBook {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Tagged for StaticMovie {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

pub fn books() -> Vec<StaticBook> {
    vec![
        StaticBook {
            id: 1,
            title: "The Design of Everyday Things",
            author: "Don Norman",
            isbn: Some("9780465050659"),
            rating: 9.5,
            year: 1988,
            tags: validate_tags(&["design", "psychology", "read in english", "read"], BOOK_TAGS),
            cover: Some("design-of-everyday-things.webp"),
            notes: "Essential guide to user-centered design principles.",
        },
        StaticBook {
            id: 2,
            title: "Refactoring",
            author: "Martin Fowler",
            isbn: None,
            rating: 9.0,
            year: 1999,
            tags: validate_tags(&["programming", "best-practices", "reference", "reading"], BOOK_TAGS),
            cover: Some("refactoring.webp"),
            notes: "Techniques for restructuring code safely.",
        },
        StaticBook {
            id: 3,
            title: "Gödel, Escher, Bach",
            author: "Douglas Hofstadter",
            isbn: Some("9780465026562"),
            rating: 8.5,
            year: 1979,
            tags: validate_tags(&["mathematics", "philosophy", "want to read"], BOOK_TAGS),
            cover: None,
            notes: "Strange loops across logic, art and music.",
        },
    ]
}

pub fn movies() -> Vec<StaticMovie> {
    vec![
        StaticMovie {
            id: 1,
            title: "Shutter Island",
            director: "Martin Scorsese",
            rating: 8.5,
            year: 2010,
            tags: validate_tags(&["sci-fi", "cerebral", "artistic"], MOVIE_TAGS),
            poster: Some("shutterisland.webp"),
            notes: "Mind-bending psychological thriller set in an asylum.",
        },
        StaticMovie {
            id: 2,
            title: "Alien",
            director: "Ridley Scott",
            rating: 8.0,
            year: 1979,
            tags: validate_tags(&["sci-fi", "horror", "thriller"], MOVIE_TAGS),
            poster: Some("alien.webp"),
            notes: "A haunted house in deep space.",
        },
        StaticMovie {
            id: 3,
            title: "Stalker",
            director: "Andrei Tarkovsky",
            rating: 10.0,
            year: 1979,
            tags: validate_tags(&["sci-fi", "cerebral", "artistic"], MOVIE_TAGS),
            poster: Some("stalker.webp"),
            notes: "Contemplative journey into desire and meaning.",
        },
        StaticMovie {
            id: 4,
            title: "Parasite",
            director: "Bong Joon-ho",
            rating: 9.0,
            year: 2019,
            tags: validate_tags(&["🇰🇷", "drama", "psychological", "cerebral"], MOVIE_TAGS),
            poster: None,
            notes: "Class warfare staged as a home invasion.",
        },
    ]
}

pub fn wisdom() -> Vec<WisdomEntry> {
    vec![
        WisdomEntry {
            date: "24-Jan-2026",
            text: "The best time to plant a tree was 20 years ago. The second best time is now.",
        },
        WisdomEntry {
            date: "?-?-2026",
            text: "Coming soon...",
        },
    ]
}
