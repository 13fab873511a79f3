//! 进程内事件总线
//!
//! 字符串命名通道，同步派发，发后即忘。总线在构造期显式传入每个
//! 钱包实体/通知器（不做进程级全局单例），但通道命名约定保持外部
//! 订阅方可依赖的线上契约：`${ticker}(-${walletId})?::<event-suffix>`。

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;

/// 订阅回调
///
/// 订阅方在事件发出的同一逻辑轮次内执行；总线不做排队与背压。
pub type Subscriber = Box<dyn Fn(&Value) + Send + Sync>;

/// 事件总线
#[derive(Default)]
pub struct EventBus {
    channels: RwLock<HashMap<String, Vec<Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 订阅命名通道
    pub fn subscribe(&self, channel: impl Into<String>, subscriber: Subscriber) {
        let mut channels = self.channels.write().expect("event bus lock poisoned");
        channels.entry(channel.into()).or_default().push(subscriber);
    }

    /// 同步派发事件，返回实际送达的订阅方数量
    ///
    /// 无人订阅不是错误；派发按订阅顺序进行，总线不重排不去重。
    pub fn emit(&self, channel: &str, payload: &Value) -> usize {
        let channels = self.channels.read().expect("event bus lock poisoned");
        let Some(subscribers) = channels.get(channel) else {
            tracing::trace!(channel = %channel, "event emitted with no subscribers");
            return 0;
        };
        for subscriber in subscribers {
            subscriber(payload);
        }
        subscribers.len()
    }
}

/// 钱包级通道名：`${ticker}-${walletId}::<suffix>`
pub fn wallet_channel(ticker: &str, wallet_id: &str, suffix: &str) -> String {
    format!("{}-{}::{}", ticker, wallet_id, suffix)
}

/// 币种级通道名：`${ticker}::<suffix>`
pub fn ticker_channel(ticker: &str, suffix: &str) -> String {
    format!("{}::{}", ticker, suffix)
}
