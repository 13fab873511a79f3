//! 多链配置模块
//!
//! 定义支持的链家族、浏览器后端与链级配置，并提供由远端配置
//! 载荷构建的链注册表。配置对核心层只读。

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{WalletError, WalletResult};

/// 链协议家族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    /// UTXO 链 (Bitcoin 系列)
    Utxo,
    /// EVM 账户链 (Ethereum 系列)
    Evm,
    /// Cosmos 系列（委托质押链家族）
    Cosmos,
}

/// 浏览器后端形态
///
/// 同一条逻辑链在不同部署下可能接全节点或托管索引器，
/// 因此在运行时按链配置选择，而非编译期固定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplorerKind {
    /// 全节点直连 RPC（响应最小化）
    Node,
    /// 托管索引器（响应更丰富，可分页）
    Indexer,
}

/// 浏览器端点配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    pub kind: ExplorerKind,
    pub base_url: String,
    /// 单次请求超时（毫秒）
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// 索引器分页大小
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_page_size() -> u32 {
    50
}

/// 费用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeeConfig {
    /// 默认费用（最小可读单位）
    #[serde(default)]
    pub default_fee: Decimal,
    /// UTXO 链按字节费率
    #[serde(default)]
    pub fee_per_byte: Option<Decimal>,
    /// EVM 链 gas 限额
    #[serde(default)]
    pub gas_limit: Option<u64>,
    /// EVM 链 gas 价格
    #[serde(default)]
    pub gas_price: Option<Decimal>,
}

/// 链功能开关
///
/// 装配层据此决定挂载哪些能力单元。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChainFeatures {
    #[serde(default)]
    pub nft: bool,
    #[serde(default)]
    pub staking: bool,
}

/// 链配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// 全局唯一标识
    pub id: String,
    /// 链符号 (BTC, ETH, ATOM, ...)
    pub ticker: String,
    /// 链名称
    pub name: String,
    /// 协议家族
    pub family: ChainFamily,
    /// 小数位数
    pub decimals: u8,
    /// 派生路径
    pub derivation_path: String,
    /// EVM 链 ID（其他家族为空）
    #[serde(default)]
    pub chain_id: Option<i64>,
    /// 网络标识 (mainnet / testnet)
    #[serde(default)]
    pub network: Option<String>,
    /// 费用配置
    #[serde(default)]
    pub fee: FeeConfig,
    /// 功能开关
    #[serde(default)]
    pub features: ChainFeatures,
    /// 浏览器端点
    pub explorer: ExplorerConfig,
}

/// 链注册表
///
/// 由配置载荷构建，按 id 与 ticker 双索引。
#[derive(Debug, Default)]
pub struct ChainRegistry {
    by_id: HashMap<String, ChainConfig>,
    id_by_ticker: HashMap<String, String>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由配置集合载荷构建注册表
    ///
    /// 载荷为链配置对象数组（配置协作方 `get("chains")` 的返回形态）。
    pub fn from_payload(payload: &Value) -> WalletResult<Self> {
        let entries = payload
            .as_array()
            .ok_or_else(|| WalletError::external("malformed chain config payload: not a list"))?;

        let mut registry = Self::new();
        for entry in entries {
            let config: ChainConfig = serde_json::from_value(entry.clone())
                .map_err(|e| WalletError::external_with("malformed chain config entry", e))?;
            registry.register(config)?;
        }
        Ok(registry)
    }

    /// 注册一条链
    ///
    /// id 冲突视为装配错误。
    pub fn register(&mut self, config: ChainConfig) -> WalletResult<()> {
        if self.by_id.contains_key(&config.id) {
            return Err(WalletError::internal(format!(
                "duplicate chain id in registry: {}",
                config.id
            )));
        }
        self.id_by_ticker
            .insert(normalize_ticker(&config.ticker), config.id.clone());
        self.by_id.insert(config.id.clone(), config);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&ChainConfig> {
        self.by_id.get(id)
    }

    pub fn get_by_ticker(&self, ticker: &str) -> Option<&ChainConfig> {
        self.id_by_ticker
            .get(&normalize_ticker(ticker))
            .and_then(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// 符号归一化：大小写与空白不参与索引
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}
