//! Display helpers shared by the terminal and HTML renderers.

use crate::models::BookPayload;

pub const BOOK_ACCENT: &str = "#ff6b35";
pub const MOVIE_ACCENT: &str = "#00d4ff";

/// `"AK's rating - 9/10"` for whole numbers, `"AK's rating - 8.5/10"` otherwise.
pub fn format_rating(rating: f64) -> String {
    let formatted = if rating.fract() == 0.0 {
        format!("{:.0}", rating)
    } else {
        format!("{:.1}", rating)
    };
    format!("AK's rating - {}/10", formatted)
}

/// Five-star bar for library books.
pub fn star_rating(rating: u8) -> String {
    let filled = rating.min(BookPayload::MAX_RATING) as usize;
    let empty = BookPayload::MAX_RATING as usize - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

pub fn first_letter(title: &str) -> String {
    title
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}

/// SVG data URL showing the title's first letter on a dark card. The URL
/// carries no `#` or `'`, so it can sit inside a quoted JS string.
pub fn placeholder_image(title: &str, accent: &str) -> String {
    let svg = format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='120' height='180' viewBox='0 0 120 180'>\
         <rect width='120' height='180' fill='#2a2a2a'/>\
         <text x='60' y='90' text-anchor='middle' fill='{}' font-family='VT323' font-size='24'>{}</text>\
         </svg>",
        accent,
        xml_escape(&first_letter(title))
    );
    let encoded = svg
        .replace('%', "%25")
        .replace('#', "%23")
        .replace('\'', "%27");
    format!("data:image/svg+xml;utf8,{}", encoded)
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
}

/// Cover or poster image that falls back to a placeholder once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    src: String,
    fallback: String,
    fell_back: bool,
}

impl ImageSlot {
    pub fn new(src: impl Into<String>, title: &str, accent: &str) -> Self {
        Self {
            src: src.into(),
            fallback: placeholder_image(title, accent),
            fell_back: false,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Placeholder used after a failed load; empty once swapped in.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn is_fallback(&self) -> bool {
        self.fell_back
    }

    /// Handles a load failure. Returns whether the source was swapped;
    /// a failing placeholder is left alone.
    pub fn on_error(&mut self) -> bool {
        if self.fell_back {
            return false;
        }
        self.fell_back = true;
        self.src = std::mem::take(&mut self.fallback);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_whole_number_has_no_decimals() {
        assert_eq!(format_rating(9.0), "AK's rating - 9/10");
        assert_eq!(format_rating(10.0), "AK's rating - 10/10");
    }

    #[test]
    fn rating_fraction_has_one_decimal() {
        assert_eq!(format_rating(8.5), "AK's rating - 8.5/10");
        assert_eq!(format_rating(6.7), "AK's rating - 6.7/10");
    }

    #[test]
    fn stars_fill_up_to_five() {
        assert_eq!(star_rating(3), "★★★☆☆");
        assert_eq!(star_rating(5), "★★★★★");
        assert_eq!(star_rating(9), "★★★★★");
    }

    #[test]
    fn first_letter_uppercases() {
        assert_eq!(first_letter("stalker"), "S");
        assert_eq!(first_letter(""), "?");
    }

    #[test]
    fn placeholder_encodes_hashes() {
        let url = placeholder_image("refactoring", BOOK_ACCENT);
        assert!(url.starts_with("data:image/svg+xml;utf8,"));
        assert!(url.contains("%23ff6b35"));
        assert!(!url.contains('#'));
        assert!(!url.contains('\''));
        assert!(url.contains("xmlns=%27http://www.w3.org/2000/svg%27"));
        assert!(url.contains(">R</text>"));
    }

    #[test]
    fn placeholder_escapes_markup_letters() {
        let url = placeholder_image("<untitled>", MOVIE_ACCENT);
        assert!(url.contains(">&lt;</text>"));

        let url = placeholder_image("& Sons", BOOK_ACCENT);
        assert!(url.contains(">&amp;</text>"));

        let url = placeholder_image("'Salem's Lot", BOOK_ACCENT);
        assert!(url.contains(">&apos;</text>"));

        let url = placeholder_image("%Complete", BOOK_ACCENT);
        assert!(url.contains(">%25</text>"));
        assert!(url.contains("%23ff6b35"));
    }

    #[test]
    fn image_falls_back_only_once() {
        let mut slot = ImageSlot::new("public/cover/missing.webp", "Dune", BOOK_ACCENT);
        assert!(slot.on_error());
        assert!(slot.is_fallback());
        let placeholder = slot.src().to_string();
        assert!(placeholder.contains(">D</text>"));

        assert!(!slot.on_error());
        assert_eq!(slot.src(), placeholder);
    }
}
