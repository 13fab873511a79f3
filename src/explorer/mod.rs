//! 浏览器适配层
//!
//! 把"广播已签名交易"与"拉取交易/交易列表"归一化到一个后端形态之上。
//! 两种可互换的适配器策略（全节点 RPC / 托管索引器）按链配置在运行时
//! 选择。网络传输本身是外部协作方，核心层只约定请求/响应契约。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::{FormatContext, TxFormatter};
use crate::domain::chain_config::{ExplorerConfig, ExplorerKind};
use crate::domain::transaction::NormalizedTransaction;
use crate::domain::wallet::BalanceSummary;
use crate::error::{WalletError, WalletResult};

pub mod indexer;
pub mod node;

pub use indexer::IndexerExplorer;
pub use node::NodeExplorer;

// ============ 请求/响应契约 ============

/// 传输调用描述符
///
/// 对节点适配器，`method` 是 JSON-RPC 方法名；对索引器适配器，
/// `method` 是资源路径，`params` 携带查询参数。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcCall {
    pub endpoint: String,
    pub method: String,
    pub params: Value,
}

/// 广播结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    pub txid: String,
}

/// 交易列表请求
#[derive(Debug, Clone, Default)]
pub struct TxListRequest {
    pub address: String,
    /// 合约地址 -> 代币符号（列表归一化时解析代币交易）
    pub tokens: std::collections::HashMap<String, String>,
    /// 拉取上限（None 表示适配器默认值）
    pub limit: Option<u32>,
}

/// 惰性、有限、可重启的归一化交易序列
///
/// 每次调用 `get_transaction_list` 重新拉取；适配器不保留服务端游标。
pub type TxStream<'a> = BoxStream<'a, WalletResult<NormalizedTransaction>>;

// ============ 外部协作方 ============

/// 网络传输（外部协作方）
///
/// 给定调用描述符返回原始响应；核心层不提供任何实现。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, call: &RpcCall) -> anyhow::Result<Value>;
}

// ============ 适配器契约 ============

/// 浏览器适配器
#[async_trait]
pub trait Explorer: Send + Sync {
    /// 广播已签名交易并归一化响应为 `{ txid }`
    async fn send_raw_transaction(&self, raw_tx_hex: &str) -> WalletResult<Broadcast>;

    /// 拉取单笔交易并归一化
    async fn get_transaction(
        &self,
        address: &str,
        hash: &str,
        tokens: &std::collections::HashMap<String, String>,
    ) -> WalletResult<NormalizedTransaction>;

    /// 拉取交易列表（惰性序列，见 [`TxStream`]）
    async fn get_transaction_list(&self, request: TxListRequest) -> WalletResult<TxStream<'_>>;

    /// 原生币与代币余额
    async fn get_balance(
        &self,
        address: &str,
        tokens: &[String],
    ) -> WalletResult<BalanceSummary>;
}

/// 按链配置选择适配器策略
pub fn build_explorer(
    config: &ExplorerConfig,
    ticker: &str,
    transport: Arc<dyn Transport>,
    formatter: Arc<dyn TxFormatter>,
) -> Arc<dyn Explorer> {
    match config.kind {
        ExplorerKind::Node => Arc::new(NodeExplorer::new(
            config.clone(),
            ticker,
            transport,
            formatter,
        )),
        ExplorerKind::Indexer => Arc::new(IndexerExplorer::new(
            config.clone(),
            ticker,
            transport,
            formatter,
        )),
    }
}

// ============ 共享工具 ============

/// 带超时的传输调用
///
/// 超时以传输层故障（External）上抛，不保留任何部分状态。
pub(crate) async fn request_with_timeout(
    transport: &dyn Transport,
    call: &RpcCall,
    timeout_ms: u64,
) -> WalletResult<Value> {
    match tokio::time::timeout(Duration::from_millis(timeout_ms), transport.request(call)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(WalletError::external_with("transport request failed", e)),
        Err(_) => Err(WalletError::external(format!(
            "transport request timed out after {}ms: {}",
            timeout_ms, call.method
        ))),
    }
}

/// 归一化上下文构造
pub(crate) fn format_context(
    address: &str,
    ticker: &str,
    tokens: &std::collections::HashMap<String, String>,
) -> FormatContext {
    FormatContext {
        address: address.to_string(),
        ticker: ticker.to_string(),
        tokens: tokens.clone(),
    }
}

/// 余额字段解析：后端以字符串或数值返回
pub(crate) fn parse_amount(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap_or_default(),
        Value::Number(n) => n.to_string().parse().unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct SlowTransport;

    #[async_trait]
    impl Transport for SlowTransport {
        async fn request(&self, _call: &RpcCall) -> anyhow::Result<Value> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(json!(null))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_as_external() {
        let call = RpcCall {
            endpoint: "https://node.example".into(),
            method: "getbalance".into(),
            params: json!([]),
        };
        let err = request_with_timeout(&SlowTransport, &call, 100)
            .await
            .unwrap_err();
        assert!(err.is_external());
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_parse_amount_forms() {
        assert_eq!(parse_amount(&json!("10.5")), "10.5".parse().unwrap());
        assert_eq!(parse_amount(&json!(3)), "3".parse().unwrap());
        assert_eq!(parse_amount(&json!(null)), Decimal::ZERO);
    }
}
