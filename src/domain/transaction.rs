//! 交易领域模型
//!
//! 把各家后端（全节点 RPC / 托管索引器）的原生交易载荷归一化为
//! 统一的语义交易模型。原始载荷对核心层保持不透明，只有分类器
//! 需要检查的少数字段（消息类型标签、地址、金额）会被读取。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 归一化交易语义类别（闭合枚举）
///
/// 不变量：每笔原始交易恰好映射到一个类别；未知原生类型一律回落为 `Transfer`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TxCategory {
    Transfer,
    TransferNft,
    MintNft,
    Stake,
    Unstake,
    Restake,
    Withdraw,
    Reward,
    Vote,
    Freeze,
    Buy,
    Exchange,
}

impl Default for TxCategory {
    fn default() -> Self {
        Self::Transfer
    }
}

/// 后端原生交易载荷
///
/// 对核心层不透明：除分类器检查的字段外不做任何解释。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction(pub Value);

impl RawTransaction {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// 取多消息交易的消息数组
    ///
    /// 兼容两种常见包裹层级：`tx.body.messages` 与顶层 `messages`。
    pub fn messages(&self) -> Option<&Vec<Value>> {
        self.0
            .pointer("/tx/body/messages")
            .or_else(|| self.0.pointer("/body/messages"))
            .or_else(|| self.0.get("messages"))
            .and_then(Value::as_array)
    }

    /// 取第一条消息的原生类型标签（完整点分路径）
    pub fn first_message_type(&self) -> Option<&str> {
        let first = self.messages()?.first()?;
        first
            .get("@type")
            .or_else(|| first.get("type"))
            .and_then(Value::as_str)
    }

    /// 取交易哈希（后端字段名不一，依次尝试）
    pub fn hash(&self) -> Option<&str> {
        self.0
            .get("txhash")
            .or_else(|| self.0.get("txid"))
            .or_else(|| self.0.get("hash"))
            .and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

/// 归一化交易
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTransaction {
    /// 交易标识
    pub txid: String,
    /// 语义类别
    pub tx_type: TxCategory,
    /// 相对查询地址涉及的对手方地址
    pub addresses_involved: Vec<String>,
    /// 金额（最小可读单位）
    pub amount: Decimal,
    /// 是否已确认
    pub confirmed: bool,
    /// 所属币种符号
    pub ticker: String,
    /// 链上哈希
    pub hash: String,
    /// 上链时间（后端提供时）
    #[serde(default)]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
}
