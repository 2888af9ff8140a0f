use serde::{Deserialize, Serialize};

/// Title the news API substitutes for deleted articles.
pub const REMOVED_TITLE: &str = "[removed]";

/// Article as listed by the news search API, before enrichment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
    pub content: String,
}

impl RawArticle {
    /// Empty and `[removed]` titles never make it into a snapshot.
    pub fn has_usable_title(&self) -> bool {
        let title = self.title.trim();
        !title.is_empty() && !title.eq_ignore_ascii_case(REMOVED_TITLE)
    }
}

/// Full article body downloaded from the publisher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedArticle {
    pub text: String,
    pub authors: Vec<String>,
    pub top_image: String,
    /// Embedded video URLs, empty when the page has none.
    pub movies: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> RawArticle {
        RawArticle {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_usable_title() {
        assert!(titled("Fed holds rates").has_usable_title());
        assert!(!titled("").has_usable_title());
        assert!(!titled("   ").has_usable_title());
        assert!(!titled("[Removed]").has_usable_title());
        assert!(!titled("[removed]").has_usable_title());
    }
}
