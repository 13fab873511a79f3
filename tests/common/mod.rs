//! 集成测试公共桩
//!
//! 确定性的派生器/签名器与录制式传输桩，外加链配置构造工具。

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use omniwallet::domain::chain_config::{
    ChainConfig, ChainFamily, ChainFeatures, ExplorerConfig, ExplorerKind, FeeConfig,
};
use omniwallet::domain::derivation::{KeyDeriver, TxSigner};
use omniwallet::domain::wallet::{DerivedKeys, TxPlan};
use omniwallet::error::WalletResult;
use omniwallet::explorer::{RpcCall, Transport};

/// 确定性派生器：地址/密钥是种子与路径的哈希指纹
pub struct HashDeriver;

#[async_trait]
impl KeyDeriver for HashDeriver {
    async fn derive(&self, seed: &[u8], path: &str) -> WalletResult<DerivedKeys> {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(path.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Ok(DerivedKeys {
            address: format!("addr{}", &digest[..16]),
            public_key: format!("pub{}", &digest[16..48]),
            private_key: Zeroizing::new(format!("prv{}", &digest[48..])),
        })
    }
}

/// 确定性签名器：把交易计划编码成 hex 伪签名
pub struct EchoSigner;

#[async_trait]
impl TxSigner for EchoSigner {
    async fn sign(&self, plan: &TxPlan, keys: &DerivedKeys) -> WalletResult<String> {
        let blob = format!(
            "{}|{}|{}|{}|{}|{}",
            plan.ticker,
            plan.from,
            plan.to,
            plan.amount,
            plan.fee,
            keys.public_key
        );
        Ok(hex::encode(blob))
    }
}

/// 录制式传输桩：按方法/路径返回预置响应并记录调用
pub struct StubTransport {
    responses: Mutex<HashMap<String, Value>>,
    pub calls: Mutex<Vec<RpcCall>>,
}

impl StubTransport {
    pub fn new(responses: Vec<(&str, Value)>) -> Arc<Self> {
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

    pub fn method_calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn request(&self, call: &RpcCall) -> anyhow::Result<Value> {
        self.calls.lock().unwrap().push(call.clone());
        self.responses
            .lock()
            .unwrap()
            .get(&call.method)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no stub response for {}", call.method))
    }
}

/// 节点后端的 UTXO 链配置
pub fn btc_config() -> ChainConfig {
    ChainConfig {
        id: "bitcoin".into(),
        ticker: "BTC".into(),
        name: "Bitcoin".into(),
        family: ChainFamily::Utxo,
        decimals: 8,
        derivation_path: "m/84'/0'/0'/0/0".into(),
        chain_id: None,
        network: Some("mainnet".into()),
        fee: FeeConfig {
            default_fee: "0.0001".parse().unwrap(),
            ..Default::default()
        },
        features: ChainFeatures::default(),
        explorer: ExplorerConfig {
            kind: ExplorerKind::Node,
            base_url: "https://btc-node.example".into(),
            request_timeout_ms: 5_000,
            page_size: 25,
        },
    }
}

/// 索引器后端的 Cosmos 链配置（质押 + NFT）
pub fn atom_config() -> ChainConfig {
    ChainConfig {
        id: "cosmos".into(),
        ticker: "ATOM".into(),
        name: "Cosmos Hub".into(),
        family: ChainFamily::Cosmos,
        decimals: 6,
        derivation_path: "m/44'/118'/0'/0/0".into(),
        chain_id: None,
        network: Some("mainnet".into()),
        fee: FeeConfig {
            default_fee: "0.0025".parse().unwrap(),
            ..Default::default()
        },
        features: ChainFeatures {
            nft: true,
            staking: true,
        },
        explorer: ExplorerConfig {
            kind: ExplorerKind::Indexer,
            base_url: "https://atom-indexer.example".into(),
            request_timeout_ms: 5_000,
            page_size: 50,
        },
    }
}

/// BIP39 合法种子（16 字节起步）
pub fn seed() -> Vec<u8> {
    vec![7u8; 32]
}

pub const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// 节点后端的常用桩响应
pub fn node_responses() -> Vec<(&'static str, Value)> {
    vec![
        ("sendrawtransaction", json!({ "result": "node-tx-1" })),
        (
            "getaddressbalance",
            json!({ "result": { "balance": "42.5" } }),
        ),
        ("gettokenbalance", json!({ "result": "13" })),
        (
            "getrawtransaction",
            json!({ "result": { "txid": "t1", "from": "other", "amount": "5", "height": 10 } }),
        ),
        (
            "getaddresstransactions",
            json!({ "result": [
                { "txid": "t1", "from": "other", "to": "me", "amount": "1", "height": 10 },
                { "txid": "t2", "from": "me", "to": "other", "amount": "2" }
            ]}),
        ),
    ]
}
