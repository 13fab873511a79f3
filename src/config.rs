//! 配置协作方
//!
//! 费率表、代币列表、禁用代币列表等远端配置的获取与缓存由外部
//! 协作方承担，核心层只依赖这里规定的只读接口：异步获取，新鲜度
//! 不做保证（"最后一次成功获取"即可用）。内存实现用于测试与
//! 无远端部署。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{WalletError, WalletResult};

/// 配置协作方接口
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// 登记一个配置 id，供协作方后台拉取
    async fn register(&self, id: &str) -> WalletResult<()>;

    /// 获取配置载荷（列表或记录）
    async fn get(&self, id: &str) -> WalletResult<Value>;

    /// 取本地缓存的载荷；从未成功获取过则为空
    async fn get_local(&self, id: &str) -> Option<Value>;
}

/// 内存配置实现
#[derive(Default)]
pub struct MemoryConfigProvider {
    entries: RwLock<HashMap<String, Value>>,
    registered: RwLock<HashSet<String>>,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一条配置
    pub async fn seed(&self, id: &str, payload: Value) {
        self.entries
            .write()
            .await
            .insert(id.to_string(), payload);
    }
}

#[async_trait]
impl ConfigProvider for MemoryConfigProvider {
    async fn register(&self, id: &str) -> WalletResult<()> {
        self.registered.write().await.insert(id.to_string());
        Ok(())
    }

    async fn get(&self, id: &str) -> WalletResult<Value> {
        self.entries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| WalletError::external(format!("config payload unavailable: {}", id)))
    }

    async fn get_local(&self, id: &str) -> Option<Value> {
        self.entries.read().await.get(id).cloned()
    }
}

// ============ 配置 id 约定 ============

/// 链集合配置 id
pub const CHAINS_CONFIG_ID: &str = "chains";

/// 费率表配置 id
pub fn fee_config_id(ticker: &str) -> String {
    format!("fees-{}", ticker.to_lowercase())
}

/// 代币列表配置 id
pub fn tokens_config_id(ticker: &str) -> String {
    format!("tokens-{}", ticker.to_lowercase())
}

/// 禁用代币列表配置 id
pub fn banned_tokens_config_id(ticker: &str) -> String {
    format!("banned-tokens-{}", ticker.to_lowercase())
}

/// 从禁用列表载荷解析合约集合
pub fn banned_contracts(payload: &Value) -> HashSet<String> {
    payload
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_provider_roundtrip() {
        let provider = MemoryConfigProvider::new();
        provider.register("fees-btc").await.unwrap();

        // 未拉取前远端获取失败、本地为空
        assert!(provider.get("fees-btc").await.unwrap_err().is_external());
        assert!(provider.get_local("fees-btc").await.is_none());

        provider.seed("fees-btc", json!({ "default_fee": "0.0001" })).await;
        assert_eq!(
            provider.get("fees-btc").await.unwrap()["default_fee"],
            "0.0001"
        );
        assert!(provider.get_local("fees-btc").await.is_some());
    }

    #[test]
    fn test_config_id_conventions() {
        assert_eq!(fee_config_id("BTC"), "fees-btc");
        assert_eq!(tokens_config_id("Eth"), "tokens-eth");
        assert_eq!(banned_tokens_config_id("ATOM"), "banned-tokens-atom");
    }

    #[test]
    fn test_banned_contracts_parsing() {
        let set = banned_contracts(&json!(["0xbad", "0xworse"]));
        assert!(set.contains("0xbad"));
        assert_eq!(banned_contracts(&json!({"not": "a list"})).len(), 0);
    }
}
