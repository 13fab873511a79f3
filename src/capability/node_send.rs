//! 节点直连收发能力
//!
//! 纯格式化单元：构造全节点 RPC 调用描述符并归一化其响应，
//! 自身不发起任何网络调用。

use serde_json::{json, Value};

use crate::error::{WalletError, WalletResult};
use crate::explorer::{Broadcast, RpcCall};

/// 节点收发单元
#[derive(Debug, Clone)]
pub struct NodeSendUnit {
    node_url: String,
}

impl NodeSendUnit {
    pub fn new(node_url: impl Into<String>) -> Self {
        Self {
            node_url: node_url.into(),
        }
    }

    /// 广播目标 URL
    pub fn send_transaction_url(&self) -> &str {
        &self.node_url
    }

    /// 构造 `sendrawtransaction` RPC 调用描述符
    ///
    /// hex 在出站前做结构校验，畸形输入属于集成错误。
    pub fn send_transaction_params(&self, raw_tx_hex: &str) -> WalletResult<RpcCall> {
        let stripped = raw_tx_hex.strip_prefix("0x").unwrap_or(raw_tx_hex);
        if stripped.is_empty() {
            return Err(WalletError::internal("empty raw transaction hex"));
        }
        hex::decode(stripped)
            .map_err(|e| WalletError::internal_with("invalid raw transaction hex", e))?;

        Ok(RpcCall {
            endpoint: self.node_url.clone(),
            method: "sendrawtransaction".to_string(),
            params: json!([raw_tx_hex]),
        })
    }

    /// 归一化节点广播响应为 `{ txid }`
    ///
    /// 期望 `result` 字段携带交易 id；缺失即远端返回畸形数据。
    pub fn modify_send_transaction_response(&self, response: &Value) -> WalletResult<Broadcast> {
        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            return Err(WalletError::external(format!(
                "node rejected transaction: {}",
                error
            )));
        }
        let txid = response
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                WalletError::external("malformed broadcast response: missing result field")
            })?;
        Ok(Broadcast {
            txid: txid.to_string(),
        })
    }
}
