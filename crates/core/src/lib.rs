pub mod config;
pub mod config_loader;
pub mod provider;
pub mod series;

pub use config::{
    AppConfig, CoinConfig, CoinList, EngineConfig, HistoryConfig, QualificationConfig, VenueConfig,
};
pub use config_loader::ConfigLoader;
pub use provider::{PriceHistoryProvider, ProviderError};
pub use series::{PriceObservation, PriceSeries};
