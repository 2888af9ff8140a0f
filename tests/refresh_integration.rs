mod common;

use common::{Mocks, SCENARIO_TICKERS, TestEnv, start_time};
use marketpulse::domain::market::Market;
use marketpulse::domain::news::RawArticle;
use marketpulse::domain::ports::{SnapshotRepository, SystemClock};
use marketpulse::domain::quotes::CoinMarket;
use marketpulse::domain::snapshot::Volatility;
use marketpulse::infrastructure::ServiceFactory;
use marketpulse::infrastructure::mock::{
    ManualClock, MockArticleFetcher, MockCryptoMarket, MockNewsSearch, MockSentimentProvider,
};
use std::sync::Arc;

fn read_json(env: &TestEnv, file: &str) -> serde_json::Value {
    let raw = std::fs::read_to_string(env.dir.join(file)).expect("snapshot file missing");
    serde_json::from_str(&raw).expect("snapshot file is not JSON")
}

#[tokio::test]
async fn test_refresh_ranks_scenario_and_marks_missing_volatility() {
    let env = TestEnv::new(&SCENARIO_TICKERS);
    let mocks = Mocks::scenario();
    let services = ServiceFactory::create_services_with(
        env.config.clone(),
        mocks.providers(),
        Arc::new(ManualClock::new(start_time())),
    )
    .unwrap();

    let report = services.refresher.refresh_all().await;
    assert!(report.all_persisted());

    let equity = report.outcome(Market::Equity).unwrap();
    assert_eq!(equity.gainers, 1);
    assert_eq!(equity.losers, 1);
    assert!(!equity.volatility_available);
    assert!(!equity.sentiment_available);

    let stored = read_json(&env, "stock_data.json");
    assert_eq!(stored["timestamp"], "2024-06-03 16:00:00 EDT-0400");
    assert_eq!(stored["data"]["gainers"][0]["symbol"], "AAPL");
    assert_eq!(stored["data"]["gainers"][0]["company_name"], "Apple Inc.");
    assert_eq!(stored["data"]["gainers"][0]["percent_change"], 3.0);
    assert_eq!(stored["data"]["gainers"].as_array().unwrap().len(), 1);
    assert_eq!(stored["data"]["losers"][0]["symbol"], "MSFT");
    assert_eq!(stored["data"]["losers"].as_array().unwrap().len(), 1);
    assert_eq!(stored["data"]["volatility"]["vix_level"], "N/A");
    assert!(stored["data"]["greed_index"].is_null());

    // Crypto with no upstream data still produces a well-formed snapshot
    let crypto = read_json(&env, "crypto_data.json");
    assert_eq!(crypto["data"]["gainers"], serde_json::json!([]));
    assert_eq!(crypto["data"]["volatility"]["volatility_index"], "N/A");
}

#[tokio::test]
async fn test_refresh_with_seeded_crypto_and_sentiment() {
    let env = TestEnv::new(&SCENARIO_TICKERS);
    let mut mocks = Mocks::scenario();
    mocks.crypto = Arc::new(MockCryptoMarket::seeded());
    mocks.sentiment = Arc::new(
        MockSentimentProvider::new()
            .with_reading(Market::Equity, 20)
            .with_reading(Market::Crypto, 80),
    );
    let services = ServiceFactory::create_services_with(
        env.config.clone(),
        mocks.providers(),
        Arc::new(SystemClock),
    )
    .unwrap();

    services.refresher.refresh_all().await;
    let snapshot = services.store.load(Market::Crypto).unwrap().unwrap();

    let gainers: Vec<&str> = snapshot.data.gainers.iter().map(|a| a.symbol.as_str()).collect();
    let losers: Vec<&str> = snapshot.data.losers.iter().map(|a| a.symbol.as_str()).collect();
    assert_eq!(gainers, vec!["sol", "btc", "usdt"]);
    assert_eq!(losers, vec!["doge", "ada", "eth"]);
    assert!(snapshot.data.volatility.value().is_available());

    let greed = snapshot.data.greed_index.unwrap();
    assert_eq!(greed.value, 80);
    assert_eq!(greed.value_classification, "Extreme Greed");

    let equity = services.store.load(Market::Equity).unwrap().unwrap();
    assert_eq!(equity.data.greed_index.unwrap().value_classification, "Extreme Fear");
}

#[tokio::test]
async fn test_refresh_isolates_failed_articles() {
    let env = TestEnv::new(&SCENARIO_TICKERS);
    let article = |title: &str, url: &str| RawArticle {
        title: title.to_string(),
        description: String::new(),
        url: url.to_string(),
        source: "Wire".to_string(),
        published_at: "2024-06-03T12:00:00Z".to_string(),
        content: String::new(),
    };

    let mut mocks = Mocks::scenario();
    mocks.news_search = Arc::new(MockNewsSearch::new(vec![
        article("Dow climbs", "https://n.test/dow"),
        article("[Removed]", "https://n.test/removed"),
        article("Fed decision looms", "https://n.test/fed"),
    ]));
    mocks.articles = Arc::new(MockArticleFetcher::new().failing_on("https://n.test/dow"));

    let services = ServiceFactory::create_services_with(
        env.config.clone(),
        mocks.providers(),
        Arc::new(SystemClock),
    )
    .unwrap();
    let report = services.refresher.refresh_all().await;

    assert!(report.all_persisted());
    let news = services.store.load(Market::Equity).unwrap().unwrap().data.news;
    assert_eq!(news.len(), 1);
    assert_eq!(news[0].title, "Fed decision looms");
    assert!(!news[0].summary.is_empty());
    assert!(news[0].text_preview.contains("https://n.test/fed"));
    assert!(
        !mocks
            .articles
            .fetched()
            .iter()
            .any(|url| url.contains("removed"))
    );
}

#[tokio::test]
async fn test_volatility_is_read_back_as_unavailable() {
    let env = TestEnv::new(&SCENARIO_TICKERS);
    let mocks = Mocks::scenario();
    let services = ServiceFactory::create_services_with(
        env.config.clone(),
        mocks.providers(),
        Arc::new(SystemClock),
    )
    .unwrap();

    services.refresher.refresh_all().await;
    let volatility = services.dashboard.get_volatility(Market::Equity).await.unwrap();
    assert_eq!(volatility, Volatility::Unavailable);
    assert_eq!(volatility.to_string(), "N/A");
}

#[test]
fn test_refresh_from_blocking_context() {
    let env = TestEnv::new(&SCENARIO_TICKERS);
    let mocks = Mocks::scenario();
    let coins = vec![CoinMarket {
        id: "bitcoin".to_string(),
        symbol: "btc".to_string(),
        name: "Bitcoin".to_string(),
        current_price: Some(67_000.0),
        price_change_percentage_24h: Some(-2.5),
    }];
    let mut providers = mocks.providers();
    providers.crypto = Arc::new(MockCryptoMarket::new(coins, vec![100.0, 110.0, 99.0]));

    let services =
        ServiceFactory::create_services_with(env.config.clone(), providers, Arc::new(SystemClock))
            .unwrap();

    let report = tokio_test::block_on(services.refresher.refresh_all());
    let crypto = report.outcome(Market::Crypto).unwrap();
    assert!(crypto.persisted);
    assert_eq!(crypto.gainers, 0);
    assert_eq!(crypto.losers, 1);

    let stored = read_json(&env, "crypto_data.json");
    assert_eq!(stored["data"]["volatility"]["volatility_index"], 10.0);
    assert_eq!(stored["data"]["losers"][0]["price_change_percentage_24h"], -2.5);
    assert_eq!(stored["data"]["losers"][0]["name"], "Bitcoin");
    assert!(stored["data"]["losers"][0].get("percent_change").is_none());
}
