//! 链交易分型能力（Cosmos 委托质押链家族）
//!
//! 把后端原生消息类型标签映射为归一化语义类别。多消息交易只看
//! 第一条消息；零消息交易回落为 `Transfer`。

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::capability::{FormatContext, TxFormatter};
use crate::domain::transaction::{NormalizedTransaction, RawTransaction, TxCategory};
use crate::error::WalletResult;

/// 原生类型 -> 语义类别固定映射表
static COSMOS_TX_TYPES: Lazy<HashMap<&'static str, TxCategory>> = Lazy::new(|| {
    HashMap::from([
        ("MsgSend", TxCategory::Transfer),
        ("MsgMultiSend", TxCategory::Transfer),
        ("MsgDelegate", TxCategory::Stake),
        ("MsgUndelegate", TxCategory::Unstake),
        ("MsgBeginRedelegate", TxCategory::Restake),
        ("MsgWithdrawDelegationReward", TxCategory::Reward),
        ("MsgWithdrawDelegatorReward", TxCategory::Reward),
        ("MsgWithdrawValidatorCommission", TxCategory::Reward),
        ("MsgVote", TxCategory::Vote),
        ("MsgTransfer", TxCategory::Transfer),
    ])
});

/// Cosmos 家族分型单元
///
/// 无状态：除装饰的格式化器外不持有任何东西。
pub struct CosmosTypingUnit;

impl CosmosTypingUnit {
    /// 提取第一条消息的原生类型标签
    ///
    /// 标签是点分路径（如 `/cosmos.staking.v1beta1.MsgDelegate`），
    /// 取最后一段。
    pub fn transaction_native_type(raw: &RawTransaction) -> Option<String> {
        raw.first_message_type()
            .and_then(|tag| tag.rsplit('.').next().map(str::to_string))
            // 无点分层级的标签（如 `cosmos-sdk/MsgVote`）取 `/` 后的一段
            .map(|tag| tag.rsplit('/').next().unwrap_or(&tag).to_string())
    }

    /// 原生类型 -> 语义类别，未命中映射表回落 `Transfer`
    pub fn transaction_type(raw: &RawTransaction) -> TxCategory {
        Self::transaction_native_type(raw)
            .and_then(|native| COSMOS_TX_TYPES.get(native.as_str()).copied())
            .unwrap_or_default()
    }
}

/// 纯分类函数：Cosmos 家族
pub fn classify(raw: &RawTransaction) -> TxCategory {
    CosmosTypingUnit::transaction_type(raw)
}

/// 分型装饰器
///
/// 其余字段总是委托被包裹的前一层补齐，只叠加 `tx_type`。
pub struct CosmosTypingFormatter {
    base: Box<dyn TxFormatter>,
}

impl CosmosTypingFormatter {
    pub fn new(base: Box<dyn TxFormatter>) -> Self {
        Self { base }
    }
}

impl TxFormatter for CosmosTypingFormatter {
    fn format(
        &self,
        raw: &RawTransaction,
        ctx: &FormatContext,
    ) -> WalletResult<NormalizedTransaction> {
        let mut tx = self.base.format(raw, ctx)?;
        tx.tx_type = CosmosTypingUnit::transaction_type(raw);
        Ok(tx)
    }
}
