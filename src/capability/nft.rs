//! NFT 能力单元
//!
//! 依赖 Provider 注册表中的 NFT 服务（`nft-mint-url` / `nft-get` /
//! `nft-send` 三个键）。前置依赖在装配期校验，缺失即 Internal 错误，
//! 任何操作都不会被调用到。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::capability::{ProviderKey, ProviderRegistry};
use crate::error::{WalletError, WalletResult};

/// NFT 代币记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftRecord {
    pub contract: String,
    pub token_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// 服务端标记的疑似垃圾资产
    #[serde(default)]
    pub spam: bool,
}

/// NFT 转移结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftTransfer {
    pub tx: Value,
    pub contract: String,
    pub token_id: String,
    pub to_address: String,
}

/// NFT 转移请求
#[derive(Debug, Clone)]
pub struct NftTransferRequest {
    pub contract: String,
    pub token_id: String,
    pub to_address: String,
    pub options: Value,
}

/// NFT 服务（外部协作方）
#[async_trait]
pub trait NftProvider: Send + Sync {
    /// NFT 详情页 URL（纯格式化）
    fn info_url(&self, contract: &str, token_id: &str) -> String;

    /// 拉取地址持有的 NFT 列表
    async fn list(&self, address: &str) -> anyhow::Result<Vec<NftRecord>>;

    /// 构造并广播 NFT 转移交易，返回后端交易载荷
    async fn send(&self, request: &NftTransferRequest) -> anyhow::Result<Value>;
}

/// 广播成功后的本地记账钩子（外部协作方，可缺省）
#[async_trait]
pub trait NftBookkeeping: Send + Sync {
    async fn record_transfer(&self, transfer: &NftTransfer) -> anyhow::Result<()>;
}

/// NFT 能力
pub struct NftCapability {
    provider: Arc<dyn NftProvider>,
    bookkeeping: Option<Arc<dyn NftBookkeeping>>,
}

impl std::fmt::Debug for NftCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NftCapability")
            .field("bookkeeping", &self.bookkeeping.is_some())
            .finish_non_exhaustive()
    }
}

impl NftCapability {
    /// 装配：校验前置 Provider，缺失即失败
    pub fn attach(registry: &ProviderRegistry) -> WalletResult<Self> {
        let provider = registry.require_nft(&[
            ProviderKey::NftMintUrl,
            ProviderKey::NftGet,
            ProviderKey::NftSend,
        ])?;
        Ok(Self {
            provider,
            bookkeeping: registry.nft_bookkeeping(),
        })
    }

    /// NFT 详情页 URL
    pub fn get_nft_info_url(&self, contract: &str, token_id: &str) -> String {
        self.provider.info_url(contract, token_id)
    }

    /// 持有的 NFT 列表
    ///
    /// `is_spam_enabled` 为假时过滤服务端标记的垃圾资产。
    pub async fn get_nft_list(
        &self,
        address: &str,
        is_spam_enabled: bool,
    ) -> WalletResult<Vec<NftRecord>> {
        let records = self
            .provider
            .list(address)
            .await
            .map_err(|e| WalletError::external_with("nft provider list failed", e))?;
        if is_spam_enabled {
            return Ok(records);
        }
        Ok(records.into_iter().filter(|r| !r.spam).collect())
    }

    /// NFT 转移
    ///
    /// 广播即权威：广播成功后本地记账失败会以 Internal 错误上报，
    /// 但不回滚已广播的转移——调用方看到 Internal 错误时链上转移
    /// 可能已经生效，错误消息中带有交易载荷信息。
    pub async fn transfer_nft(
        &self,
        contract: &str,
        token_id: &str,
        to_address: &str,
        options: Value,
    ) -> WalletResult<NftTransfer> {
        let request = NftTransferRequest {
            contract: contract.to_string(),
            token_id: token_id.to_string(),
            to_address: to_address.to_string(),
            options,
        };
        let tx = self
            .provider
            .send(&request)
            .await
            .map_err(|e| WalletError::external_with("nft transfer broadcast failed", e))?;

        let transfer = NftTransfer {
            tx,
            contract: request.contract,
            token_id: request.token_id,
            to_address: request.to_address,
        };

        if let Some(bookkeeping) = &self.bookkeeping {
            if let Err(e) = bookkeeping.record_transfer(&transfer).await {
                tracing::warn!(
                    contract = %transfer.contract,
                    token_id = %transfer.token_id,
                    error = %e,
                    "nft transfer broadcast succeeded but local bookkeeping failed"
                );
                return Err(WalletError::internal(format!(
                    "nft bookkeeping failed after broadcast (transfer not rolled back, tx: {}): {}",
                    transfer.tx, e
                )));
            }
        }

        Ok(transfer)
    }
}
