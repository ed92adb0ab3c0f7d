/// App context
pub mod app_context;
/// Logger
pub mod logger;
/// Amount formatting
pub mod units;
