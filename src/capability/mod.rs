//! 能力单元组合
//!
//! 钱包行为由独立定义的能力单元在装配期组合而成。原始设计的
//! 线性 mixin 链在这里落为两件事：
//!
//! 1. 类型化的 Provider 注册表：取代对任意方法的运行期存在性探测，
//!    前置条件在装配期校验，缺失即 Internal 错误；
//! 2. 格式化器管道：每个分型单元是对 `Box<dyn TxFormatter>` 的装饰器，
//!    后挂载者可见并调用先挂载者（显式传入的委托），反向不可见，
//!    组合严格线性，同名操作"后挂载者胜出且可回调前者"。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::transaction::{NormalizedTransaction, RawTransaction, TxCategory};
use crate::error::{WalletError, WalletResult};

pub mod chain_typing;
pub mod nft;
pub mod node_send;

pub use chain_typing::CosmosTypingUnit;
pub use nft::{NftBookkeeping, NftCapability, NftProvider, NftRecord, NftTransfer};
pub use node_send::NodeSendUnit;

// ============ Provider 注册表 ============

/// Provider 键
///
/// 能力单元的前置依赖按键声明，装配期逐键校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKey {
    NftMintUrl,
    NftGet,
    NftSend,
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NftMintUrl => "nft-mint-url",
            Self::NftGet => "nft-get",
            Self::NftSend => "nft-send",
        };
        f.write_str(name)
    }
}

/// 类型化 Provider 注册表
///
/// 装配期填充；能力单元通过 `require_*` 声明前置依赖，
/// 缺失时在任何操作可被调用之前失败。
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    nft: Option<Arc<dyn nft::NftProvider>>,
    nft_bookkeeping: Option<Arc<dyn nft::NftBookkeeping>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nft(mut self, provider: Arc<dyn nft::NftProvider>) -> Self {
        self.nft = Some(provider);
        self
    }

    pub fn with_nft_bookkeeping(mut self, hook: Arc<dyn nft::NftBookkeeping>) -> Self {
        self.nft_bookkeeping = Some(hook);
        self
    }

    pub fn contains(&self, key: ProviderKey) -> bool {
        match key {
            ProviderKey::NftMintUrl | ProviderKey::NftGet | ProviderKey::NftSend => {
                self.nft.is_some()
            }
        }
    }

    /// NFT 能力的前置依赖校验
    pub(crate) fn require_nft(
        &self,
        keys: &[ProviderKey],
    ) -> WalletResult<Arc<dyn nft::NftProvider>> {
        for key in keys {
            if !self.contains(*key) {
                return Err(WalletError::internal(format!(
                    "capability applied to incompatible base: missing provider '{}'",
                    key
                )));
            }
        }
        self.nft.clone().ok_or_else(|| {
            WalletError::internal("capability applied to incompatible base: no nft provider")
        })
    }

    pub(crate) fn nft_bookkeeping(&self) -> Option<Arc<dyn nft::NftBookkeeping>> {
        self.nft_bookkeeping.clone()
    }
}

// ============ 格式化器管道 ============

/// 归一化上下文：相对哪个地址、哪个币种解释原始载荷
#[derive(Debug, Clone, Default)]
pub struct FormatContext {
    pub address: String,
    pub ticker: String,
    /// 合约地址 -> 代币符号
    pub tokens: HashMap<String, String>,
}

/// 交易格式化器
///
/// 分型能力单元以装饰器形式叠加：持有前一层的 `Box<dyn TxFormatter>`，
/// 自己不拥有的字段总是调用前一层补齐（真正的覆盖而非替换）。
pub trait TxFormatter: Send + Sync {
    fn format(
        &self,
        raw: &RawTransaction,
        ctx: &FormatContext,
    ) -> WalletResult<NormalizedTransaction>;
}

/// 基础格式化器：与链家族无关的字段提取
///
/// 管道最底层；分型单元在其输出上叠加 `tx_type`。
pub struct BaseFormatter;

impl BaseFormatter {
    /// 从原始载荷收集相对查询地址的对手方地址
    fn involved_addresses(raw: &RawTransaction, own_address: &str) -> Vec<String> {
        const ADDRESS_FIELDS: [&str; 6] = [
            "from",
            "to",
            "sender",
            "recipient",
            "from_address",
            "to_address",
        ];
        let mut found: Vec<String> = Vec::new();
        let mut scan = |obj: &Value| {
            for field in ADDRESS_FIELDS {
                if let Some(addr) = obj.get(field).and_then(Value::as_str) {
                    if addr != own_address && !found.iter().any(|a| a == addr) {
                        found.push(addr.to_string());
                    }
                }
            }
        };
        scan(raw.as_value());
        if let Some(messages) = raw.messages() {
            for message in messages {
                scan(message);
            }
        }
        found
    }

    fn amount(raw: &Value) -> Decimal {
        let candidate = raw
            .get("amount")
            .or_else(|| raw.get("value"))
            .or_else(|| raw.pointer("/tx/body/messages/0/amount"));
        match candidate {
            Some(Value::String(s)) => s.parse().unwrap_or_default(),
            Some(Value::Number(n)) => n.to_string().parse().unwrap_or_default(),
            _ => Decimal::ZERO,
        }
    }

    fn timestamp(raw: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
        raw.get("timestamp")
            .or_else(|| raw.get("time"))
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    fn confirmed(raw: &Value) -> bool {
        if let Some(flag) = raw.get("confirmed").and_then(Value::as_bool) {
            return flag;
        }
        // 高度已落块即视为确认
        raw.get("height")
            .or_else(|| raw.get("block_height"))
            .and_then(Value::as_u64)
            .map(|h| h > 0)
            .unwrap_or(false)
    }
}

impl TxFormatter for BaseFormatter {
    fn format(
        &self,
        raw: &RawTransaction,
        ctx: &FormatContext,
    ) -> WalletResult<NormalizedTransaction> {
        let hash = raw
            .hash()
            .ok_or_else(|| WalletError::external("malformed raw transaction: missing hash"))?
            .to_string();

        Ok(NormalizedTransaction {
            txid: hash.clone(),
            tx_type: TxCategory::Transfer,
            addresses_involved: Self::involved_addresses(raw, &ctx.address),
            amount: Self::amount(raw.as_value()),
            confirmed: Self::confirmed(raw.as_value()),
            ticker: ctx.ticker.clone(),
            hash,
            timestamp: Self::timestamp(raw.as_value()),
        })
    }
}

/// 按链家族构建格式化器管道
///
/// 组合顺序固定：基础格式化器在底，分型单元按家族叠加。
pub fn build_formatter(family: crate::domain::ChainFamily) -> Arc<dyn TxFormatter> {
    let base: Box<dyn TxFormatter> = Box::new(BaseFormatter);
    match family {
        crate::domain::ChainFamily::Cosmos => {
            Arc::new(chain_typing::CosmosTypingFormatter::new(base))
        }
        _ => Arc::from(base),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_formatter_fields() {
        let raw = RawTransaction::new(json!({
            "txhash": "AB12",
            "from": "me",
            "to": "them",
            "amount": "12.5",
            "height": 100
        }));
        let ctx = FormatContext {
            address: "me".into(),
            ticker: "BTC".into(),
            ..Default::default()
        };
        let tx = BaseFormatter.format(&raw, &ctx).unwrap();
        assert_eq!(tx.txid, "AB12");
        assert_eq!(tx.hash, "AB12");
        assert_eq!(tx.addresses_involved, vec!["them".to_string()]);
        assert_eq!(tx.amount, "12.5".parse().unwrap());
        assert!(tx.confirmed);
        assert_eq!(tx.tx_type, TxCategory::Transfer);
    }

    #[test]
    fn test_missing_hash_is_external() {
        let raw = RawTransaction::new(json!({ "from": "a" }));
        let err = BaseFormatter
            .format(&raw, &FormatContext::default())
            .unwrap_err();
        assert!(err.is_external());
    }

    #[test]
    fn test_registry_missing_provider() {
        let registry = ProviderRegistry::new();
        let err = registry
            .require_nft(&[ProviderKey::NftGet, ProviderKey::NftSend])
            .map(|_| ())
            .unwrap_err();
        assert!(err.is_internal());
        assert!(err.to_string().contains("nft-get"));
    }
}
