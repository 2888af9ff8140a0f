//! Pure aggregation of upstream results into snapshot sections.
//!
//! Nothing here performs I/O; given the same ordered inputs the output is
//! identical regardless of the order in which upstream calls completed.

use crate::domain::quotes::{CoinMarket, PriceChange, Quote};
use crate::domain::snapshot::{RankedAsset, Volatility};
use crate::domain::watchlist::Watchlist;
use statrs::statistics::Statistics;

/// Upper bound on each of the gainers and losers lists.
pub const MAX_MOVERS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Movers {
    pub gainers: Vec<RankedAsset>,
    pub losers: Vec<RankedAsset>,
}

/// Move between the last two closes, `None` with fewer than two points.
pub fn percent_change(closes: &[f64]) -> Option<PriceChange> {
    let [.., prev, current] = closes else {
        return None;
    };
    if *prev == 0.0 || !prev.is_finite() || !current.is_finite() {
        return None;
    }
    Some(PriceChange {
        current_price: *current,
        percent_change: (current - prev) / prev * 100.0,
    })
}

/// Attaches watchlist names to per-symbol results, keeping input order and
/// dropping symbols without a usable price change.
pub fn equity_quotes<I>(results: I, watchlist: &Watchlist) -> Vec<Quote>
where
    I: IntoIterator<Item = (String, Option<PriceChange>)>,
{
    results
        .into_iter()
        .filter_map(|(symbol, change)| {
            let change = change?;
            Some(Quote {
                name: watchlist.display_name(&symbol).to_string(),
                symbol,
                current_price: change.current_price,
                percent_change: change.percent_change,
            })
        })
        .collect()
}

pub fn crypto_quotes(coins: &[CoinMarket]) -> Vec<Quote> {
    coins.iter().filter_map(CoinMarket::to_quote).collect()
}

/// Top gainers (strictly positive, descending) and losers (strictly
/// negative, most negative first), at most [`MAX_MOVERS`] each.
pub fn rank_movers(quotes: Vec<Quote>) -> Movers {
    let mut quotes: Vec<Quote> = quotes
        .into_iter()
        .filter(|q| q.percent_change.is_finite())
        .collect();

    // Stable sorts: equal changes keep their input order
    quotes.sort_by(|a, b| b.percent_change.total_cmp(&a.percent_change));
    let gainers = quotes
        .iter()
        .take(MAX_MOVERS)
        .filter(|q| q.percent_change > 0.0)
        .map(to_ranked)
        .collect();

    quotes.sort_by(|a, b| a.percent_change.total_cmp(&b.percent_change));
    let losers = quotes
        .iter()
        .take(MAX_MOVERS)
        .filter(|q| q.percent_change < 0.0)
        .map(to_ranked)
        .collect();

    Movers { gainers, losers }
}

fn to_ranked(quote: &Quote) -> RankedAsset {
    RankedAsset {
        symbol: quote.symbol.clone(),
        name: quote.name.clone(),
        current_price: quote.current_price,
        percent_change: quote.percent_change,
    }
}

/// Latest value of an index series.
pub fn latest_level(closes: &[f64]) -> Volatility {
    Volatility::from(closes.last().copied())
}

/// Population standard deviation of day-over-day returns, in percent,
/// rounded to two decimals.
pub fn realized_volatility(prices: &[f64]) -> Volatility {
    if prices.len() < 2 || prices.iter().any(|p| !p.is_finite() || *p == 0.0) {
        return Volatility::Unavailable;
    }

    let returns: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect();
    let std_dev = returns.iter().population_std_dev();
    Volatility::from(Some((std_dev * 100.0 * 100.0).round() / 100.0))
}
