//! Core business logic: rate cache, rate resolution and alert evaluation

pub mod alert;
pub mod cache;
pub mod clock;
pub mod config;
pub mod currency;
pub mod decimal;
pub mod engine;
pub mod error;
pub mod log;
pub mod notify;
pub mod rate;
pub mod service;

// Re-export main types for cleaner imports
pub use alert::{AlertCondition, AlertId, AlertStore, NewAlert, RateAlert};
pub use cache::{RateCache, RateCacheConfig, RateCacheEntry};
pub use clock::{Clock, ManualClock, SystemClock};
pub use currency::{CurrencyCode, CurrencyValidator, StaticCurrencyValidator};
pub use engine::{AlertEngine, SweepSummary};
pub use error::{EngineError, ProviderError, RateError};
pub use notify::{AuditSink, Notification, NotificationSink};
pub use rate::{Conversion, PairRate, ProviderRate, RateProvider};
pub use service::RateService;
