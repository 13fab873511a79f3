//! Token 钱包实体
//!
//! 身份上 `parent` 指向宿主 Coin；不持有密钥，地址与签名全部委托
//! 父实体。自己的 `ticker` / `contract` / `decimal` 独立于父实体，
//! 构造后不可变。

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::wallet::{CreateTxParams, TokenSource, WalletIdentity};
use crate::error::{WalletError, WalletResult};
use crate::explorer::Broadcast;
use crate::service::coin::Coin;

/// Token 钱包实体
pub struct Token {
    identity: WalletIdentity,
    contract: String,
    source: TokenSource,
    decimals: u8,
    parent: Arc<Coin>,
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("identity", &self.identity)
            .field("source", &self.source)
            .field("decimals", &self.decimals)
            .finish_non_exhaustive()
    }
}

impl Token {
    pub(crate) fn new(
        identity: WalletIdentity,
        contract: String,
        source: TokenSource,
        decimals: u8,
        parent: Arc<Coin>,
    ) -> Self {
        Self {
            identity,
            contract,
            source,
            decimals,
            parent,
        }
    }

    pub fn identity(&self) -> &WalletIdentity {
        &self.identity
    }

    pub fn id(&self) -> &str {
        &self.identity.id
    }

    pub fn ticker(&self) -> &str {
        &self.identity.ticker
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn source(&self) -> TokenSource {
        self.source
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn parent(&self) -> &Arc<Coin> {
        &self.parent
    }

    /// 地址委托给父 Coin
    pub fn address(&self) -> Option<String> {
        self.parent.address()
    }

    /// 构建并签名代币转账
    ///
    /// 合约强制为本代币的合约；参数中携带其他合约视为集成错误。
    pub async fn create_transaction(&self, mut params: CreateTxParams) -> WalletResult<String> {
        match &params.contract {
            Some(contract) if contract != self.contract() => {
                return Err(WalletError::internal(format!(
                    "token {} cannot sign for foreign contract {}",
                    self.ticker(),
                    contract
                )));
            }
            _ => params.contract = Some(self.contract().to_string()),
        }
        self.parent.create_transaction(params).await
    }

    /// 广播委托给父 Coin 绑定的浏览器适配器
    pub async fn send_transaction(&self, raw_tx: &str) -> WalletResult<Broadcast> {
        self.parent.send_transaction(raw_tx).await
    }

    /// 本代币余额（从父实体的余额汇总中取本合约条目）
    pub async fn get_balance(&self) -> WalletResult<Decimal> {
        let summary = self.parent.get_native_and_token_balance().await?;
        Ok(summary
            .tokens
            .get(self.contract())
            .copied()
            .unwrap_or(Decimal::ZERO))
    }

    /// 费用以父链币种估算
    pub async fn get_fee(&self, params: Option<&CreateTxParams>) -> WalletResult<Decimal> {
        self.parent.get_fee(params).await
    }

    /// 生命周期事件以本代币身份定向
    pub fn notify(&self, kind: &str, tx: Option<&Value>, hash: &str) {
        self.parent
            .notifier()
            .notify(kind, tx, &self.identity.id, &self.identity.ticker, hash);
    }
}
