use crate::application::summarizer::{self, MAX_KEYWORDS, SUMMARY_SENTENCES};
use crate::domain::news::{ExtractedArticle, RawArticle};
use crate::domain::ports::{ArticleFetcher, NewsSearchProvider};
use crate::domain::snapshot::NewsItem;
use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const PREVIEW_CHARS: usize = 1000;
pub const SHORT_SUMMARY_THRESHOLD: usize = 500;
const SHORT_SUMMARY_SENTENCES: usize = 3;

/// Searches recent articles and turns the usable ones into [`NewsItem`]s.
///
/// Article downloads are sequential with a fixed pause between requests;
/// an article that fails to download is skipped without affecting the rest.
pub struct NewsEnricher {
    search: Arc<dyn NewsSearchProvider>,
    fetcher: Arc<dyn ArticleFetcher>,
    delay: Duration,
    max_articles: usize,
}

impl NewsEnricher {
    pub fn new(
        search: Arc<dyn NewsSearchProvider>,
        fetcher: Arc<dyn ArticleFetcher>,
        delay: Duration,
        max_articles: usize,
    ) -> Self {
        Self {
            search,
            fetcher,
            delay,
            max_articles,
        }
    }

    /// Articles from the day before `now`, in search order.
    pub async fn collect(&self, keywords: &[String], now: DateTime<Tz>) -> Vec<NewsItem> {
        let since = now - TimeDelta::days(1);
        let candidates = self.search.search(keywords, since).await;
        let total = candidates.len();

        let mut items = Vec::new();
        let mut requested = 0usize;
        for article in candidates {
            if items.len() >= self.max_articles {
                break;
            }
            if !article.has_usable_title() {
                debug!(url = %article.url, "Skipping article without usable title");
                continue;
            }

            if requested > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            requested += 1;

            match self.fetcher.fetch_article(&article.url).await {
                Ok(extracted) => items.push(build_item(article, extracted)),
                Err(e) => warn!(url = %article.url, error = %e, "Skipping article"),
            }
        }

        info!(candidates = total, enriched = items.len(), "News collected");
        items
    }
}

pub fn build_item(article: RawArticle, extracted: ExtractedArticle) -> NewsItem {
    let summary = summarizer::summarize(&article.title, &extracted.text, SUMMARY_SENTENCES);
    let short_summary = short_summary(&summary);

    NewsItem {
        keywords: summarizer::keywords(&extracted.text, MAX_KEYWORDS),
        text_preview: preview(&extracted.text),
        summary,
        short_summary,
        authors: extracted.authors,
        top_image: extracted.top_image,
        movies: extracted.movies,
        title: article.title,
        description: article.description,
        url: article.url,
        source: article.source,
        published_at: article.published_at,
        api_content: article.content,
    }
}

/// Whitespace-normalized text, cut at [`PREVIEW_CHARS`] characters with an
/// ellipsis when longer.
pub fn preview(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() <= PREVIEW_CHARS {
        return normalized;
    }
    let mut preview: String = normalized.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}

/// First three sentences of a summary longer than the threshold.
pub fn short_summary(summary: &str) -> Option<String> {
    if summary.chars().count() <= SHORT_SUMMARY_THRESHOLD {
        return None;
    }
    let head: Vec<&str> = summary.split(". ").take(SHORT_SUMMARY_SENTENCES).collect();
    let mut short = head.join(". ");
    if !short.ends_with('.') {
        short.push('.');
    }
    Some(short)
}
