//! Coin 钱包实体
//!
//! 链绑定的组合对象：身份 + 链配置 + 独占持有的派生密钥 + 绑定的
//! 浏览器适配器与能力单元。身份构造后不可变，`address` 在密钥装载
//! 完成时设置一次。
//!
//! 并发约定：同一实体上的 `create_transaction` / `send_transaction`
//! 不由核心层串行化，交错调用是安全的；需要严格按序发送的调用方
//! 自行在外部排队。

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use serde_json::Value;

use crate::capability::NftCapability;
use crate::config::{fee_config_id, ConfigProvider};
use crate::domain::chain_config::ChainConfig;
use crate::domain::derivation::{validate_phrase, validate_seed, KeyDeriver, TxSigner};
use crate::domain::transaction::NormalizedTransaction;
use crate::domain::wallet::{
    BalanceSummary, CreateTxParams, DerivedKeys, TxPlan, WalletIdentity,
};
use crate::error::{WalletError, WalletResult};
use crate::explorer::{Broadcast, Explorer, TxListRequest, TxStream};
use crate::infrastructure::event_bus::EventBus;
use crate::service::notifier::LifecycleNotifier;

/// 已登记代币元数据
#[derive(Debug, Clone)]
pub(crate) struct TokenMeta {
    pub ticker: String,
    pub decimals: u8,
}

/// Coin 钱包实体
pub struct Coin {
    identity: RwLock<WalletIdentity>,
    config: ChainConfig,
    explorer: Arc<dyn Explorer>,
    deriver: Arc<dyn KeyDeriver>,
    signer: Arc<dyn TxSigner>,
    /// 派生密钥：实体生命周期内独占持有
    keys: RwLock<Option<DerivedKeys>>,
    config_provider: Arc<dyn ConfigProvider>,
    nft: Option<NftCapability>,
    /// 合约地址 -> 代币元数据
    tokens: RwLock<HashMap<String, TokenMeta>>,
    notifier: LifecycleNotifier,
}

// 密钥材料不进入 Debug 输出
impl std::fmt::Debug for Coin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coin")
            .field("identity", &self.identity())
            .field(
                "keys",
                &if self.keys.read().expect("keys lock poisoned").is_some() {
                    "<loaded>"
                } else {
                    "<none>"
                },
            )
            .finish_non_exhaustive()
    }
}

impl Coin {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        identity: WalletIdentity,
        config: ChainConfig,
        explorer: Arc<dyn Explorer>,
        deriver: Arc<dyn KeyDeriver>,
        signer: Arc<dyn TxSigner>,
        config_provider: Arc<dyn ConfigProvider>,
        nft: Option<NftCapability>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            identity: RwLock::new(identity),
            config,
            explorer,
            deriver,
            signer,
            keys: RwLock::new(None),
            config_provider,
            nft,
            tokens: RwLock::new(HashMap::new()),
            notifier: LifecycleNotifier::new(bus),
        }
    }

    pub fn identity(&self) -> WalletIdentity {
        self.identity.read().expect("identity lock poisoned").clone()
    }

    pub fn id(&self) -> String {
        self.identity().id
    }

    pub fn ticker(&self) -> String {
        self.identity().ticker
    }

    pub fn decimals(&self) -> u8 {
        self.config.decimals
    }

    pub fn chain_config(&self) -> &ChainConfig {
        &self.config
    }

    /// 当前地址；密钥未装载前为空
    pub fn address(&self) -> Option<String> {
        self.identity.read().expect("identity lock poisoned").address.clone()
    }

    pub fn nft(&self) -> Option<&NftCapability> {
        self.nft.as_ref()
    }

    // ============ 密钥装载 ============

    /// 从种子按链配置的派生路径装载密钥
    ///
    /// 对同一种子幂等；成功后把 `address` 作为可观察副作用设置到身份上。
    /// 结构非法的种子/助记词以派生错误（Internal）失败。
    pub async fn load_wallet(
        &self,
        seed: &[u8],
        mnemonic_phrase: &str,
    ) -> WalletResult<DerivedKeys> {
        validate_seed(seed)?;
        if !mnemonic_phrase.is_empty() {
            validate_phrase(mnemonic_phrase)?;
        }

        let keys = self
            .deriver
            .derive(seed, &self.config.derivation_path)
            .await?;

        {
            let mut identity = self.identity.write().expect("identity lock poisoned");
            identity.address = Some(keys.address.clone());
        }
        *self.keys.write().expect("keys lock poisoned") = Some(keys.clone());

        tracing::info!(
            wallet_id = %self.id(),
            ticker = %self.ticker(),
            address = %keys.address,
            "wallet keys loaded"
        );
        Ok(keys)
    }

    fn loaded_keys(&self) -> WalletResult<DerivedKeys> {
        self.keys
            .read()
            .expect("keys lock poisoned")
            .clone()
            .ok_or_else(|| WalletError::internal("wallet keys not loaded"))
    }

    // ============ 代币登记 ============

    pub(crate) fn register_token(&self, contract: &str, meta: TokenMeta) -> WalletResult<()> {
        let mut tokens = self.tokens.write().expect("tokens lock poisoned");
        if tokens.contains_key(contract) {
            return Err(WalletError::internal(format!(
                "token contract already registered: {}",
                contract
            )));
        }
        tokens.insert(contract.to_string(), meta);
        Ok(())
    }

    pub(crate) fn token_meta(&self, contract: &str) -> Option<TokenMeta> {
        self.tokens
            .read()
            .expect("tokens lock poisoned")
            .get(contract)
            .cloned()
    }

    /// 合约地址 -> 代币符号（交易归一化上下文）
    pub fn token_map(&self) -> HashMap<String, String> {
        self.tokens
            .read()
            .expect("tokens lock poisoned")
            .iter()
            .map(|(contract, meta)| (contract.clone(), meta.ticker.clone()))
            .collect()
    }

    fn token_contracts(&self) -> Vec<String> {
        self.tokens
            .read()
            .expect("tokens lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    // ============ 交易 ============

    /// 构建并签名转账/合约调用
    ///
    /// 负数与非数值金额、未知合约引用在进入签名前拒绝。
    pub async fn create_transaction(&self, params: CreateTxParams) -> WalletResult<String> {
        let amount = params.validated_amount()?;

        let ticker = match &params.contract {
            Some(contract) => {
                let meta = self.token_meta(contract).ok_or_else(|| {
                    WalletError::internal(format!("unknown contract reference: {}", contract))
                })?;
                meta.ticker
            }
            None => self.ticker(),
        };

        let keys = self.loaded_keys()?;
        let fee = match params.fee {
            Some(fee) => fee,
            None => self.get_fee(None).await?,
        };

        let plan = TxPlan {
            ticker,
            from: keys.address.clone(),
            to: params.address.clone(),
            amount,
            fee,
            memo: params.memo.clone(),
            contract: params.contract.clone(),
            gas_limit: params.gas_limit.or(self.config.fee.gas_limit),
            gas_price: params.gas_price.or(self.config.fee.gas_price),
        };
        self.signer.sign(&plan, &keys).await
    }

    /// 广播已签名交易（委托给绑定的浏览器适配器）
    pub async fn send_transaction(&self, raw_tx: &str) -> WalletResult<Broadcast> {
        self.explorer.send_raw_transaction(raw_tx).await
    }

    /// 拉取并归一化单笔交易
    pub async fn get_transaction(&self, hash: &str) -> WalletResult<NormalizedTransaction> {
        let address = self.address().unwrap_or_default();
        self.explorer
            .get_transaction(&address, hash, &self.token_map())
            .await
    }

    /// 拉取交易列表（惰性序列，重新调用即重新拉取）
    pub async fn get_transaction_list(&self, limit: Option<u32>) -> WalletResult<TxStream<'_>> {
        let address = self.address().unwrap_or_default();
        self.explorer
            .get_transaction_list(TxListRequest {
                address,
                tokens: self.token_map(),
                limit,
            })
            .await
    }

    // ============ 余额与费用 ============

    /// 原生币 + 已登记代币余额
    pub async fn get_native_and_token_balance(&self) -> WalletResult<BalanceSummary> {
        let address = self
            .address()
            .ok_or_else(|| WalletError::internal("wallet keys not loaded"))?;
        self.explorer
            .get_balance(&address, &self.token_contracts())
            .await
    }

    /// 费用估算
    ///
    /// 优先级：调用方覆盖 > 配置协作方缓存的费率表 > 链配置默认值。
    pub async fn get_fee(&self, params: Option<&CreateTxParams>) -> WalletResult<Decimal> {
        if let Some(fee) = params.and_then(|p| p.fee) {
            return Ok(fee);
        }

        let config_id = fee_config_id(&self.ticker());
        if let Some(payload) = self.config_provider.get_local(&config_id).await {
            // 费率表以字符串或数值形态给出
            if let Some(entry) = payload.get("default_fee") {
                let parsed = match entry {
                    Value::String(s) => s.parse::<Decimal>().ok(),
                    Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
                    _ => None,
                };
                match parsed {
                    Some(fee) => return Ok(fee),
                    None => tracing::warn!(
                        config_id = %config_id,
                        "malformed fee table entry, using chain default"
                    ),
                }
            }
        }
        Ok(self.config.fee.default_fee)
    }

    // ============ 生命周期事件 ============

    pub(crate) fn notifier(&self) -> &LifecycleNotifier {
        &self.notifier
    }

    /// 把原始入站事件喂给通知器（以本实体身份定向）
    pub fn notify(&self, kind: &str, tx: Option<&Value>, hash: &str) {
        let identity = self.identity();
        self.notifier
            .notify(kind, tx, &identity.id, &identity.ticker, hash);
    }
}
