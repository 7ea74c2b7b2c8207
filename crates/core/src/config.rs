use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub history: HistoryConfig,
    pub venue: VenueConfig,
    pub qualification: QualificationConfig,
    pub coins: CoinList,
}

/// Tunables of the regime simulation that are not part of the horizon table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed applied once at the start of every resampling call.
    pub seed: u64,
    /// Momentum samples required before a simulation is attempted.
    pub min_momentum_samples: usize,
    /// Upper bound on bins selected by dynamic expansion.
    pub max_expansion_bins: usize,
    /// Fraction of all bins at which dynamic expansion stops.
    pub expansion_coverage: f64,
    /// Extra overlapping windows taken after each base window.
    pub max_overlap_windows: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            min_momentum_samples: 100,
            max_expansion_bins: 10,
            expansion_coverage: 0.30,
            max_overlap_windows: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub cryptocompare_url: String,
    pub coingecko_url: String,
    /// Hours requested from the paged hourly provider.
    pub lookback_hours: usize,
    /// Days requested from the market-chart provider.
    pub lookback_days: u32,
    /// First provider returning at least this many observations wins.
    pub min_observations: usize,
    pub timeout_secs: u64,
    pub page_size: usize,
    pub page_delay_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            cryptocompare_url: "https://min-api.cryptocompare.com".to_string(),
            coingecko_url: "https://api.coingecko.com".to_string(),
            lookback_hours: 35_040,
            lookback_days: 365,
            min_observations: 1000,
            timeout_secs: 15,
            page_size: 2000,
            page_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueConfig {
    pub gamma_url: String,
    pub clob_url: String,
    pub event_timeout_secs: u64,
    pub quote_timeout_secs: u64,
    /// Daily slugs probed when looking for the closest open event.
    pub days_ahead: u32,
    pub requests_per_minute: u32,
}

impl Default for VenueConfig {
    fn default() -> Self {
        Self {
            gamma_url: "https://gamma-api.polymarket.com".to_string(),
            clob_url: "https://clob.polymarket.com".to_string(),
            event_timeout_secs: 10,
            quote_timeout_secs: 5,
            days_ahead: 30,
            requests_per_minute: 120,
        }
    }
}

/// Thresholds a candidate operation must clear to be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationConfig {
    pub max_entry_price: f64,
    pub min_success_prob: f64,
    pub min_edge_ratio: f64,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            max_entry_price: 0.989,
            min_success_prob: 0.015,
            min_edge_ratio: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinConfig {
    pub name: String,
    pub symbol: String,
    pub slug_above: String,
    pub slug_price: String,
    pub pattern_above: String,
    pub pattern_price: String,
    pub coingecko_id: String,
}

impl CoinConfig {
    fn preset(name: &str, symbol: &str, slug: &str, title: &str, coingecko_id: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            slug_above: format!("{slug}-above-on"),
            slug_price: format!("{slug}-price-on"),
            pattern_above: format!("{title} above"),
            pattern_price: format!("{title} price on"),
            coingecko_id: coingecko_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoinList(pub Vec<CoinConfig>);

impl Default for CoinList {
    fn default() -> Self {
        Self(vec![
            CoinConfig::preset("BITCOIN", "BTC", "bitcoin", "Bitcoin", "bitcoin"),
            CoinConfig::preset("ETHEREUM", "ETH", "ethereum", "Ethereum", "ethereum"),
            CoinConfig::preset("SOLANA", "SOL", "solana", "Solana", "solana"),
            CoinConfig::preset("XRP", "XRP", "xrp", "XRP", "ripple"),
        ])
    }
}

impl CoinList {
    #[must_use]
    pub fn find(&self, symbol: &str) -> Option<&CoinConfig> {
        self.0.iter().find(|c| c.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoinConfig> {
        self.0.iter()
    }
}
