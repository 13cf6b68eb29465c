//! Tag filtering over small in-memory lists.
//!
//! Filtering is an unordered AND: an item matches when it carries every
//! active tag. The order of active tags only matters for badge layout.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::models::Book;

/// Anything carrying an ordered list of tags.
pub trait Tagged {
    fn tags(&self) -> &[String];

    fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

impl Tagged for Book {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Library,
    Cinema,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Library => "library",
            Category::Cinema => "cinema",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "library" | "books" => Ok(Category::Library),
            "cinema" | "movies" | "films" => Ok(Category::Cinema),
            other => Err(format!("Unknown category '{}'", other)),
        }
    }
}

/// Active tags of one category, in click order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    active: Vec<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = Self::new();
        for tag in tags {
            let tag = tag.into();
            if !state.contains(&tag) {
                state.active.push(tag);
            }
        }
        state
    }

    /// Removes the tag if active, otherwise appends it.
    pub fn toggle(&mut self, tag: &str) {
        if let Some(pos) = self.active.iter().position(|t| t == tag) {
            self.active.remove(pos);
        } else {
            self.active.push(tag.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.active.iter().any(|t| t == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn active(&self) -> &[String] {
        &self.active
    }

    pub fn apply<'a, T: Tagged>(&self, items: &'a [T]) -> Vec<&'a T> {
        apply(items, &self.active)
    }
}

/// One filter state per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub library: FilterState,
    pub cinema: FilterState,
}

impl Filters {
    pub fn get(&self, category: Category) -> &FilterState {
        match category {
            Category::Library => &self.library,
            Category::Cinema => &self.cinema,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut FilterState {
        match category {
            Category::Library => &mut self.library,
            Category::Cinema => &mut self.cinema,
        }
    }

    pub fn toggle(&mut self, tag: &str, category: Category) {
        self.get_mut(category).toggle(tag);
    }

    pub fn clear(&mut self, category: Category) {
        self.get_mut(category).clear();
    }
}

/// Items carrying every active tag, in source order. No active tags
/// yields the whole list.
pub fn apply<'a, T: Tagged>(items: &'a [T], active: &[String]) -> Vec<&'a T> {
    if active.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| active.iter().all(|tag| item.has_tag(tag)))
        .collect()
}

/// The part of `vocabulary` that at least one item uses, in vocabulary order.
pub fn used_tags<T: Tagged>(items: &[T], vocabulary: &[&'static str]) -> Vec<&'static str> {
    let used: HashSet<&str> = items
        .iter()
        .flat_map(|item| item.tags().iter().map(String::as_str))
        .collect();

    vocabulary
        .iter()
        .copied()
        .filter(|tag| used.contains(tag))
        .collect()
}

/// Keeps only the tags found in `vocabulary`, preserving item order.
pub fn validate_tags(item_tags: &[&str], vocabulary: &[&str]) -> Vec<String> {
    item_tags
        .iter()
        .filter(|tag| vocabulary.contains(tag))
        .map(|tag| tag.to_string())
        .collect()
}
