//! 托管索引器适配器
//!
//! 索引器响应比全节点丰富（携带分页与代币明细）。交易列表按页
//! 惰性拉取：下一页只有在消费到时才会发起请求；重新调用即从第一页
//! 重新开始，适配器不保留服务端游标。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};

use crate::capability::TxFormatter;
use crate::domain::chain_config::ExplorerConfig;
use crate::domain::transaction::{NormalizedTransaction, RawTransaction};
use crate::domain::wallet::BalanceSummary;
use crate::error::{WalletError, WalletResult};

use super::{
    format_context, parse_amount, request_with_timeout, Broadcast, Explorer, RpcCall, Transport,
    TxListRequest, TxStream,
};

/// 托管索引器适配器
pub struct IndexerExplorer {
    config: ExplorerConfig,
    ticker: String,
    transport: Arc<dyn Transport>,
    formatter: Arc<dyn TxFormatter>,
}

impl IndexerExplorer {
    pub fn new(
        config: ExplorerConfig,
        ticker: &str,
        transport: Arc<dyn Transport>,
        formatter: Arc<dyn TxFormatter>,
    ) -> Self {
        Self {
            config,
            ticker: ticker.to_string(),
            transport,
            formatter,
        }
    }

    fn call(&self, path: String, params: Value) -> RpcCall {
        RpcCall {
            endpoint: self.config.base_url.clone(),
            method: path,
            params,
        }
    }

    /// 索引器数据载荷：顶层即数据，或包在 `data` 字段里
    fn unwrap_data(response: Value, path: &str) -> WalletResult<Value> {
        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            return Err(WalletError::external(format!(
                "indexer error for {}: {}",
                path, error
            )));
        }
        Ok(response.get("data").cloned().unwrap_or(response))
    }
}

#[async_trait]
impl Explorer for IndexerExplorer {
    async fn send_raw_transaction(&self, raw_tx_hex: &str) -> WalletResult<Broadcast> {
        let stripped = raw_tx_hex.strip_prefix("0x").unwrap_or(raw_tx_hex);
        if stripped.is_empty() || hex::decode(stripped).is_err() {
            return Err(WalletError::internal("invalid raw transaction hex"));
        }

        let call = self.call(
            "transactions/broadcast".to_string(),
            json!({ "rawTx": raw_tx_hex }),
        );
        let response = request_with_timeout(
            self.transport.as_ref(),
            &call,
            self.config.request_timeout_ms,
        )
        .await?;
        let data = Self::unwrap_data(response, "transactions/broadcast")?;
        let txid = data
            .get("txid")
            .or_else(|| data.get("hash"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                WalletError::external("malformed broadcast response: missing txid field")
            })?;
        tracing::info!(
            ticker = %self.ticker,
            txid = %txid,
            "raw transaction broadcast via indexer"
        );
        Ok(Broadcast {
            txid: txid.to_string(),
        })
    }

    async fn get_transaction(
        &self,
        address: &str,
        hash: &str,
        tokens: &HashMap<String, String>,
    ) -> WalletResult<NormalizedTransaction> {
        let call = self.call(format!("transactions/{}", hash), json!({ "address": address }));
        let response = request_with_timeout(
            self.transport.as_ref(),
            &call,
            self.config.request_timeout_ms,
        )
        .await?;
        let data = Self::unwrap_data(response, "transaction fetch")?;
        let ctx = format_context(address, &self.ticker, tokens);
        self.formatter.format(&RawTransaction::new(data), &ctx)
    }

    async fn get_transaction_list(&self, request: TxListRequest) -> WalletResult<TxStream<'_>> {
        let transport = self.transport.clone();
        let formatter = self.formatter.clone();
        let base_url = self.config.base_url.clone();
        let timeout_ms = self.config.request_timeout_ms;
        let page_size = self.config.page_size;
        let limit = request.limit;
        let path = format!("address/{}/transactions", request.address);
        let ctx = format_context(&request.address, &self.ticker, &request.tokens);

        // 逐页惰性拉取：状态机 (下一页号, 已产出条数, 是否终止)
        let stream = futures::stream::unfold(
            (1u32, 0u32, false),
            move |(page, yielded, done)| {
                let transport = transport.clone();
                let formatter = formatter.clone();
                let base_url = base_url.clone();
                let path = path.clone();
                let ctx = ctx.clone();
                async move {
                    if done {
                        return None;
                    }
                    if let Some(limit) = limit {
                        if yielded >= limit {
                            return None;
                        }
                    }

                    let call = RpcCall {
                        endpoint: base_url,
                        method: path,
                        params: json!({ "page": page, "pageSize": page_size }),
                    };
                    let response =
                        match request_with_timeout(transport.as_ref(), &call, timeout_ms).await {
                            Ok(response) => response,
                            Err(e) => return Some((vec![Err(e)], (page, yielded, true))),
                        };
                    let data = match Self::unwrap_data(response, "address transactions") {
                        Ok(data) => data,
                        Err(e) => return Some((vec![Err(e)], (page, yielded, true))),
                    };

                    let items = data
                        .get("items")
                        .and_then(Value::as_array)
                        .cloned()
                        .unwrap_or_default();
                    if items.is_empty() {
                        return None;
                    }

                    let remaining = limit
                        .map(|l| (l - yielded) as usize)
                        .unwrap_or(usize::MAX);
                    let exhausted = items.len() < page_size as usize;
                    let batch: Vec<WalletResult<NormalizedTransaction>> = items
                        .into_iter()
                        .take(remaining)
                        .map(|item| formatter.format(&RawTransaction::new(item), &ctx))
                        .collect();
                    let yielded = yielded + batch.len() as u32;
                    Some((batch, (page + 1, yielded, exhausted)))
                }
            },
        )
        .flat_map(futures::stream::iter);

        Ok(stream.boxed())
    }

    async fn get_balance(
        &self,
        address: &str,
        tokens: &[String],
    ) -> WalletResult<BalanceSummary> {
        let call = self.call(format!("address/{}/balance", address), json!({}));
        let response = request_with_timeout(
            self.transport.as_ref(),
            &call,
            self.config.request_timeout_ms,
        )
        .await?;
        let data = Self::unwrap_data(response, "address balance")?;

        let native = parse_amount(data.get("balance").unwrap_or(&Value::Null));
        let mut summary = BalanceSummary {
            native,
            tokens: HashMap::new(),
        };
        // 索引器在同一响应中携带代币明细
        if let Some(entries) = data.get("tokens").and_then(Value::as_array) {
            for entry in entries {
                let contract = entry.get("contract").and_then(Value::as_str);
                if let Some(contract) = contract {
                    if tokens.is_empty() || tokens.iter().any(|c| c == contract) {
                        summary.tokens.insert(
                            contract.to_string(),
                            parse_amount(entry.get("balance").unwrap_or(&Value::Null)),
                        );
                    }
                }
            }
        }
        Ok(summary)
    }
}
