//! 全节点 RPC 适配器
//!
//! 直连链节点，响应形态最小化。广播路径复用节点收发能力单元的
//! 纯格式化逻辑；代币余额逐合约查询。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use crate::capability::{NodeSendUnit, TxFormatter};
use crate::domain::chain_config::ExplorerConfig;
use crate::domain::transaction::{NormalizedTransaction, RawTransaction};
use crate::domain::wallet::BalanceSummary;
use crate::error::{WalletError, WalletResult};

use super::{
    format_context, parse_amount, request_with_timeout, Broadcast, Explorer, RpcCall, Transport,
    TxListRequest, TxStream,
};

/// 全节点适配器
pub struct NodeExplorer {
    config: ExplorerConfig,
    ticker: String,
    transport: Arc<dyn Transport>,
    formatter: Arc<dyn TxFormatter>,
    send_unit: NodeSendUnit,
}

impl NodeExplorer {
    pub fn new(
        config: ExplorerConfig,
        ticker: &str,
        transport: Arc<dyn Transport>,
        formatter: Arc<dyn TxFormatter>,
    ) -> Self {
        let send_unit = NodeSendUnit::new(config.base_url.clone());
        Self {
            config,
            ticker: ticker.to_string(),
            transport,
            formatter,
            send_unit,
        }
    }

    fn call(&self, method: &str, params: Value) -> RpcCall {
        RpcCall {
            endpoint: self.config.base_url.clone(),
            method: method.to_string(),
            params,
        }
    }

    async fn request(&self, call: &RpcCall) -> WalletResult<Value> {
        request_with_timeout(
            self.transport.as_ref(),
            call,
            self.config.request_timeout_ms,
        )
        .await
    }

    /// 取 JSON-RPC `result`，缺失即远端畸形响应
    fn unwrap_result(response: Value, method: &str) -> WalletResult<Value> {
        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            return Err(WalletError::external(format!(
                "node rpc error for {}: {}",
                method, error
            )));
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| {
                WalletError::external(format!("malformed node response for {}: missing result", method))
            })
    }
}

#[async_trait]
impl Explorer for NodeExplorer {
    async fn send_raw_transaction(&self, raw_tx_hex: &str) -> WalletResult<Broadcast> {
        let call = self.send_unit.send_transaction_params(raw_tx_hex)?;
        let response = self.request(&call).await?;
        let broadcast = self.send_unit.modify_send_transaction_response(&response)?;
        tracing::info!(
            ticker = %self.ticker,
            txid = %broadcast.txid,
            "raw transaction broadcast via node rpc"
        );
        Ok(broadcast)
    }

    async fn get_transaction(
        &self,
        address: &str,
        hash: &str,
        tokens: &HashMap<String, String>,
    ) -> WalletResult<NormalizedTransaction> {
        let call = self.call("getrawtransaction", json!([hash, true]));
        let response = self.request(&call).await?;
        let raw = Self::unwrap_result(response, "getrawtransaction")?;
        let ctx = format_context(address, &self.ticker, tokens);
        self.formatter.format(&RawTransaction::new(raw), &ctx)
    }

    async fn get_transaction_list(&self, request: TxListRequest) -> WalletResult<TxStream<'_>> {
        let limit = request.limit.unwrap_or(self.config.page_size);
        let call = self.call(
            "getaddresstransactions",
            json!({ "address": request.address, "limit": limit }),
        );
        let response = self.request(&call).await?;
        let items = Self::unwrap_result(response, "getaddresstransactions")?
            .as_array()
            .cloned()
            .ok_or_else(|| {
                WalletError::external("malformed node response: transaction list is not an array")
            })?;

        // 归一化按需进行；重新调用即重新拉取
        let formatter = self.formatter.clone();
        let ctx = format_context(&request.address, &self.ticker, &request.tokens);
        let stream = futures::stream::iter(items)
            .map(move |item| formatter.format(&RawTransaction::new(item), &ctx));
        Ok(stream.boxed())
    }

    async fn get_balance(
        &self,
        address: &str,
        tokens: &[String],
    ) -> WalletResult<BalanceSummary> {
        let call = self.call("getaddressbalance", json!([address]));
        let response = self.request(&call).await?;
        let result = Self::unwrap_result(response, "getaddressbalance")?;
        let native = parse_amount(result.get("balance").unwrap_or(&result));

        let mut summary = BalanceSummary {
            native,
            tokens: HashMap::new(),
        };
        for contract in tokens {
            let call = self.call("gettokenbalance", json!([address, contract]));
            let response = self.request(&call).await?;
            let result = Self::unwrap_result(response, "gettokenbalance")?;
            summary
                .tokens
                .insert(contract.clone(), parse_amount(&result));
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::BaseFormatter;
    use crate::domain::chain_config::ExplorerKind;
    use std::sync::Mutex;

    /// 录制式传输桩：按方法名返回预置响应
    struct StubTransport {
        responses: Mutex<HashMap<String, Value>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubTransport {
        fn new(responses: Vec<(&str, Value)>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v))
                        .collect(),
                ),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn request(&self, call: &RpcCall) -> anyhow::Result<Value> {
            self.calls.lock().unwrap().push(call.method.clone());
            self.responses
                .lock()
                .unwrap()
                .get(&call.method)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no stub for {}", call.method))
        }
    }

    fn explorer(transport: Arc<StubTransport>) -> NodeExplorer {
        NodeExplorer::new(
            ExplorerConfig {
                kind: ExplorerKind::Node,
                base_url: "https://node.example".into(),
                request_timeout_ms: 5_000,
                page_size: 25,
            },
            "BTC",
            transport,
            Arc::new(BaseFormatter),
        )
    }

    #[tokio::test]
    async fn test_broadcast_normalizes_txid() {
        let transport = StubTransport::new(vec![(
            "sendrawtransaction",
            json!({ "result": "abc123" }),
        )]);
        let broadcast = explorer(transport)
            .send_raw_transaction("deadbeef")
            .await
            .unwrap();
        assert_eq!(broadcast.txid, "abc123");
    }

    #[tokio::test]
    async fn test_rpc_error_is_external() {
        let transport = StubTransport::new(vec![(
            "getrawtransaction",
            json!({ "error": { "code": -5, "message": "not found" } }),
        )]);
        let err = explorer(transport)
            .get_transaction("me", "deadbeef", &HashMap::new())
            .await
            .unwrap_err();
        assert!(err.is_external());
    }

    #[tokio::test]
    async fn test_transaction_list_restartable() {
        let transport = StubTransport::new(vec![(
            "getaddresstransactions",
            json!({ "result": [
                { "txid": "t1", "from": "other", "to": "me", "amount": "1" },
                { "txid": "t2", "from": "me", "to": "other", "amount": "2" }
            ]}),
        )]);
        let explorer = explorer(transport.clone());
        let request = TxListRequest {
            address: "me".into(),
            ..Default::default()
        };

        let stream = explorer.get_transaction_list(request.clone()).await.unwrap();
        let first: Vec<_> = stream.collect().await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].as_ref().unwrap().txid, "t1");

        // 重新调用即重新拉取
        let stream = explorer.get_transaction_list(request).await.unwrap();
        let second: Vec<_> = stream.collect().await;
        assert_eq!(second.len(), 2);
        assert_eq!(
            transport
                .calls
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.as_str() == "getaddresstransactions")
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_balance_with_tokens() {
        let transport = StubTransport::new(vec![
            ("getaddressbalance", json!({ "result": { "balance": "100.5" } })),
            ("gettokenbalance", json!({ "result": "7" })),
        ]);
        let summary = explorer(transport)
            .get_balance("me", &["contract-1".to_string()])
            .await
            .unwrap();
        assert_eq!(summary.native, "100.5".parse().unwrap());
        assert_eq!(summary.tokens["contract-1"], "7".parse().unwrap());
    }
}
