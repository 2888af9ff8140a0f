//! Full-text article download and HTML text extraction.
//!
//! Extraction is deliberately simple: body text is the concatenation of the
//! page's `<p>` elements after scripts and styles are removed; authors and the
//! lead image come from `<meta>` tags.

use crate::config::Config;
use crate::domain::errors::SourceError;
use crate::domain::news::ExtractedArticle;
use crate::domain::ports::ArticleFetcher;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, classify_middleware_error, classify_reqwest_error,
};
use async_trait::async_trait;
use regex::Regex;
use reqwest_middleware::ClientWithMiddleware;
use std::sync::LazyLock;
use tracing::debug;

const SOURCE: &str = "article";
const MIN_PARAGRAPH_WORDS: usize = 4;
const VIDEO_HOSTS: [&str; 5] = ["youtube.com", "youtu.be", "vimeo.com", "dailymotion.com", "kewego.com"];
const VIDEO_EXTENSIONS: [&str; 3] = [".mp4", ".webm", ".m3u8"];

static NON_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script>|<style\b.*?</style>|<noscript\b.*?</noscript>|<!--.*?-->")
        .expect("valid non-content pattern")
});
static PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("valid paragraph pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));
static META: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("valid meta pattern"));
static META_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(?:property|name)\s*=\s*["']([^"']+)["']"#).expect("valid meta key pattern")
});
static EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(?:iframe|embed|video|source)\s[^>]*>").expect("valid embed pattern")
});
static SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).expect("valid src pattern")
});
static META_CONTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bcontent\s*=\s*["']([^"']*)["']"#).expect("valid meta content pattern")
});

pub struct HttpArticleFetcher {
    client: ClientWithMiddleware,
}

impl HttpArticleFetcher {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client(&config.http)?,
        })
    }
}

#[async_trait]
impl ArticleFetcher for HttpArticleFetcher {
    async fn fetch_article(&self, url: &str) -> Result<ExtractedArticle, SourceError> {
        if url.trim().is_empty() {
            return Err(SourceError::parse(SOURCE, "article has no url"));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_middleware_error(SOURCE, e))?;

        if !response.status().is_success() {
            return Err(SourceError::Status {
                source_name: SOURCE.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(SOURCE, e))?;

        let article = extract_article(&html);
        debug!(url, chars = article.text.chars().count(), "Extracted article body");
        Ok(article)
    }
}

pub fn extract_article(html: &str) -> ExtractedArticle {
    let cleaned = NON_CONTENT.replace_all(html, " ");

    let paragraphs: Vec<String> = PARAGRAPH
        .captures_iter(&cleaned)
        .filter_map(|c| c.get(1))
        .map(|m| normalize_text(&TAG.replace_all(m.as_str(), " ")))
        .filter(|p| p.split_whitespace().count() >= MIN_PARAGRAPH_WORDS)
        .collect();

    let mut authors: Vec<String> = Vec::new();
    let mut top_image = String::new();

    for tag in META.find_iter(&cleaned) {
        let tag = tag.as_str();
        let (Some(key), Some(content)) = (
            META_KEY.captures(tag).and_then(|c| c.get(1)),
            META_CONTENT.captures(tag).and_then(|c| c.get(1)),
        ) else {
            continue;
        };
        let content = decode_entities(content.as_str().trim());

        match key.as_str().to_lowercase().as_str() {
            "og:image" | "twitter:image" if top_image.is_empty() => top_image = content,
            "author" | "article:author" | "parsely-author" => {
                for name in split_authors(&content) {
                    if !authors.contains(&name) {
                        authors.push(name);
                    }
                }
            }
            _ => {}
        }
    }

    ExtractedArticle {
        text: paragraphs.join("\n\n"),
        authors,
        top_image,
        movies: extract_movies(&cleaned),
    }
}

/// Video URLs from embed tags pointing at a known host or a video file.
fn extract_movies(html: &str) -> Vec<String> {
    let mut movies: Vec<String> = Vec::new();
    for tag in EMBED.find_iter(html) {
        let Some(src) = SRC.captures(tag.as_str()).and_then(|c| c.get(1)) else {
            continue;
        };
        let src = decode_entities(src.as_str().trim());
        let lower = src.to_lowercase();
        let path = lower.split(['?', '#']).next().unwrap_or_default();

        let is_video = VIDEO_HOSTS.iter().any(|host| lower.contains(host))
            || VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext));
        if is_video && !movies.contains(&src) {
            movies.push(src);
        }
    }
    movies
}

fn split_authors(raw: &str) -> Vec<String> {
    raw.split(',')
        .flat_map(|part| part.split(" and "))
        .map(str::trim)
        .filter(|name| !name.is_empty() && !name.starts_with("http"))
        .map(str::to_string)
        .collect()
}

fn normalize_text(raw: &str) -> String {
    decode_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&rsquo;", "'")
        .replace("&lsquo;", "'")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&mdash;", "-")
        .replace("&ndash;", "-")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
