//! Domain types for the golden candle engine.

pub mod candle;
pub mod history;
pub mod ids;
pub mod market;

pub use candle::Candle;
pub use history::CandleHistory;
pub use ids::PositionId;
pub use market::{AccountSnapshot, MarketQuote, TradeDirection};
