//! 钱包装配
//!
//! 把链配置、外部协作方与能力单元组合成具体的 Coin / Token 实体。
//! 能力单元的前置依赖在这里校验：挂到不兼容基座上的单元在任何
//! 操作被调用之前就以 Internal 错误失败。

use std::sync::Arc;

use crate::capability::{build_formatter, NftCapability, ProviderRegistry};
use crate::config::{banned_contracts, banned_tokens_config_id, fee_config_id, ConfigProvider};
use crate::domain::chain_config::ChainConfig;
use crate::domain::derivation::{KeyDeriver, TxSigner};
use crate::domain::wallet::{TokenSource, WalletIdentity};
use crate::error::{WalletError, WalletResult};
use crate::explorer::{build_explorer, Transport};
use crate::infrastructure::event_bus::EventBus;
use crate::service::coin::{Coin, TokenMeta};
use crate::service::token::Token;

/// 装配素材：具体链模块与宿主注入的协作方
pub struct AssemblyParts {
    pub transport: Arc<dyn Transport>,
    pub deriver: Arc<dyn KeyDeriver>,
    pub signer: Arc<dyn TxSigner>,
    pub providers: ProviderRegistry,
    pub config_provider: Arc<dyn ConfigProvider>,
    pub bus: Arc<EventBus>,
}

/// 代币启用参数
#[derive(Debug, Clone)]
pub struct TokenParams {
    pub ticker: String,
    pub name: String,
    pub contract: String,
    pub decimals: u8,
    pub source: TokenSource,
}

/// 装配 Coin 实体
///
/// 格式化器管道与浏览器适配器按链配置构建；`features.nft` 打开时
/// 挂载 NFT 能力（Provider 缺失即失败）。费率表配置 id 顺带登记
/// 给配置协作方做后台拉取。
pub async fn assemble_coin(config: ChainConfig, parts: AssemblyParts) -> WalletResult<Arc<Coin>> {
    let nft = if config.features.nft {
        Some(NftCapability::attach(&parts.providers)?)
    } else {
        None
    };

    let formatter = build_formatter(config.family);
    let explorer = build_explorer(&config.explorer, &config.ticker, parts.transport, formatter);

    parts
        .config_provider
        .register(&fee_config_id(&config.ticker))
        .await?;

    let identity = WalletIdentity {
        id: config.id.clone(),
        ticker: config.ticker.clone(),
        name: config.name.clone(),
        address: None,
        network: config.network.clone(),
        chain_id: config.chain_id,
        contract: None,
        parent: None,
    };

    tracing::debug!(
        wallet_id = %identity.id,
        ticker = %identity.ticker,
        family = ?config.family,
        explorer = ?config.explorer.kind,
        nft = config.features.nft,
        "coin assembled"
    );

    Ok(Arc::new(Coin::new(
        identity,
        config,
        explorer,
        parts.deriver,
        parts.signer,
        parts.config_provider,
        nft,
        parts.bus,
    )))
}

/// 在宿主 Coin 上启用代币
///
/// 合约须非空且未被禁用列表命中；登记后 `contract` / `ticker` /
/// `parent` 不再可变。
pub async fn attach_token(
    parent: &Arc<Coin>,
    params: TokenParams,
    config_provider: &Arc<dyn ConfigProvider>,
) -> WalletResult<Arc<Token>> {
    if params.contract.trim().is_empty() {
        return Err(WalletError::internal("token contract must not be empty"));
    }

    let parent_identity = parent.identity();
    if let Some(payload) = config_provider
        .get_local(&banned_tokens_config_id(&parent_identity.ticker))
        .await
    {
        if banned_contracts(&payload).contains(&params.contract) {
            return Err(WalletError::internal(format!(
                "token contract is banned: {}",
                params.contract
            )));
        }
    }

    parent.register_token(
        &params.contract,
        TokenMeta {
            ticker: params.ticker.clone(),
            decimals: params.decimals,
        },
    )?;

    let identity = WalletIdentity {
        id: format!("{}-{}", parent_identity.id, params.contract),
        ticker: params.ticker,
        name: params.name,
        address: None,
        network: parent_identity.network.clone(),
        chain_id: parent_identity.chain_id,
        contract: Some(params.contract.clone()),
        parent: Some(parent_identity.id),
    };

    tracing::debug!(
        wallet_id = %identity.id,
        ticker = %identity.ticker,
        source = ?params.source,
        "token attached"
    );

    Ok(Arc::new(Token::new(
        identity,
        params.contract,
        params.source,
        params.decimals,
        parent.clone(),
    )))
}
