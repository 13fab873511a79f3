//! 交易生命周期通知器
//!
//! 把浏览器/套接字层产出的原始入站事件路由为按钱包身份定向的
//! 类型化通知。通知器只路由、不持久化交易状态：普通转账走
//! `unconfirmed → confirmed`，质押语义链另有独立的标签事件
//! （reward / unfreeze / freeze / vote），与确认事件正交。

use std::sync::Arc;

use serde_json::{json, Value};

use crate::infrastructure::event_bus::{ticker_channel, wallet_channel, EventBus};

/// 生命周期事件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Receive,
    Confirm,
    Reward,
    Unfreeze,
    Freeze,
    Vote,
}

impl EventKind {
    /// 识别后端传来的事件种类字符串
    ///
    /// 未识别的种类返回 None：调用方可能传入对订阅方无意义的
    /// 后端专有种类，容忍策略是静默忽略。
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "receive" => Some(Self::Receive),
            "confirm" => Some(Self::Confirm),
            "reward" => Some(Self::Reward),
            "unfreeze" => Some(Self::Unfreeze),
            "freeze" => Some(Self::Freeze),
            "vote" => Some(Self::Vote),
            _ => None,
        }
    }

}

/// 生命周期通知器
///
/// 总线在构造期显式传入；派发同步、发后即忘、按送达顺序进行。
pub struct LifecycleNotifier {
    bus: Arc<EventBus>,
}

impl LifecycleNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// 路由一条入站事件
    ///
    /// - `receive` → `${ticker}-${walletId}::new-socket-tx`，载荷 `{ unconfirmedTx }`
    /// - `confirm` → `${ticker}::confirmed-socket-tx`，载荷 `(walletId, tx, ticker, hash)`
    /// - `reward | unfreeze | freeze | vote` → `${ticker}::confirmed-<kind>`，载荷为交易（缺省为空记录）
    /// - 未识别种类 → 不发出任何事件
    pub fn notify(
        &self,
        kind: &str,
        tx: Option<&Value>,
        wallet_id: &str,
        ticker: &str,
        hash: &str,
    ) {
        let Some(kind) = EventKind::parse(kind) else {
            tracing::debug!(kind = %kind, ticker = %ticker, "ignoring unrecognized lifecycle event kind");
            return;
        };

        match kind {
            EventKind::Receive => {
                let channel = wallet_channel(ticker, wallet_id, "new-socket-tx");
                let payload = json!({ "unconfirmedTx": tx.cloned().unwrap_or(Value::Null) });
                self.bus.emit(&channel, &payload);
            }
            EventKind::Confirm => {
                let channel = ticker_channel(ticker, "confirmed-socket-tx");
                let payload = json!({
                    "walletId": wallet_id,
                    "tx": tx.cloned().unwrap_or(Value::Null),
                    "ticker": ticker,
                    "hash": hash,
                });
                self.bus.emit(&channel, &payload);
            }
            EventKind::Reward => self.emit_tagged(ticker, "confirmed-reward", tx),
            EventKind::Unfreeze => self.emit_tagged(ticker, "confirmed-unfreeze", tx),
            EventKind::Freeze => self.emit_tagged(ticker, "confirmed-freeze", tx),
            EventKind::Vote => self.emit_tagged(ticker, "confirmed-vote", tx),
        }
        tracing::trace!(ticker = %ticker, wallet_id = %wallet_id, hash = %hash, "lifecycle event routed");
    }

    /// 标签事件走币种级通道；交易缺省时发空记录
    fn emit_tagged(&self, ticker: &str, suffix: &str, tx: Option<&Value>) {
        let channel = ticker_channel(ticker, suffix);
        let payload = tx.cloned().unwrap_or_else(|| json!({}));
        self.bus.emit(&channel, &payload);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_bus() -> (Arc<EventBus>, Arc<Mutex<Vec<(String, Value)>>>) {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        (bus, seen)
    }

    fn record_on(bus: &EventBus, channel: &str, seen: &Arc<Mutex<Vec<(String, Value)>>>) {
        let seen = seen.clone();
        let name = channel.to_string();
        bus.subscribe(
            channel,
            Box::new(move |payload| {
                seen.lock().unwrap().push((name.clone(), payload.clone()));
            }),
        );
    }

    #[test]
    fn test_receive_event_contract() {
        let (bus, seen) = recording_bus();
        record_on(&bus, "ATOM-w1::new-socket-tx", &seen);

        let notifier = LifecycleNotifier::new(bus);
        let tx = json!({ "txhash": "H1" });
        notifier.notify("receive", Some(&tx), "w1", "ATOM", "H1");

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "ATOM-w1::new-socket-tx");
        assert_eq!(events[0].1["unconfirmedTx"]["txhash"], "H1");
    }

    #[test]
    fn test_confirm_event_contract() {
        let (bus, seen) = recording_bus();
        record_on(&bus, "ATOM::confirmed-socket-tx", &seen);

        let notifier = LifecycleNotifier::new(bus);
        let tx = json!({ "txhash": "H2" });
        notifier.notify("confirm", Some(&tx), "w1", "ATOM", "H2");

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        let payload = &events[0].1;
        assert_eq!(payload["walletId"], "w1");
        assert_eq!(payload["ticker"], "ATOM");
        assert_eq!(payload["hash"], "H2");
        assert_eq!(payload["tx"]["txhash"], "H2");
    }

    #[test]
    fn test_tagged_events_and_empty_record() {
        let (bus, seen) = recording_bus();
        record_on(&bus, "ATOM::confirmed-reward", &seen);
        record_on(&bus, "ATOM::confirmed-freeze", &seen);
        record_on(&bus, "ATOM::confirmed-unfreeze", &seen);
        record_on(&bus, "ATOM::confirmed-vote", &seen);

        let notifier = LifecycleNotifier::new(bus);
        let tx = json!({ "txhash": "H3" });
        notifier.notify("reward", Some(&tx), "w1", "ATOM", "H3");
        // 交易缺省时发空记录
        notifier.notify("freeze", None, "w1", "ATOM", "");
        notifier.notify("unfreeze", None, "w1", "ATOM", "");
        notifier.notify("vote", Some(&tx), "w1", "ATOM", "H3");

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].0, "ATOM::confirmed-reward");
        assert_eq!(events[0].1["txhash"], "H3");
        assert_eq!(events[1].1, json!({}));
        assert_eq!(events[2].0, "ATOM::confirmed-unfreeze");
        assert_eq!(events[3].0, "ATOM::confirmed-vote");
    }

    #[test]
    fn test_unknown_kind_is_silent_noop() {
        let (bus, seen) = recording_bus();
        record_on(&bus, "ATOM::confirmed-socket-tx", &seen);
        record_on(&bus, "ATOM-w1::new-socket-tx", &seen);

        let notifier = LifecycleNotifier::new(bus);
        notifier.notify("unknown-kind", None, "w1", "ATOM", "H4");

        assert!(seen.lock().unwrap().is_empty());
    }
}
