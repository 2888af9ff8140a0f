pub mod fear_greed;

pub use fear_greed::FearGreedSentimentProvider;
