pub mod article;
pub mod newsapi;

pub use article::HttpArticleFetcher;
pub use newsapi::NewsApiClient;
