//! Infrastructure 模块
//!
//! 事件总线与日志协作方。

pub mod event_bus;
pub mod logging;

pub use event_bus::{ticker_channel, wallet_channel, EventBus, Subscriber};
pub use logging::{init_logging, logger, set_logger, Logger, TracingLogger};
