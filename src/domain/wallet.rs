//! 钱包领域模型
//!
//! 钱包身份、代币来源、交易创建参数与派生密钥材料。
//! 身份在构造后不可变，唯一例外是 `address`：密钥装载完成时设置一次。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::{WalletError, WalletResult};

/// 钱包身份
///
/// `id` 对每条已配置的链/代币全局唯一；`parent` 把 Token 关联到宿主 Coin。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletIdentity {
    pub id: String,
    pub ticker: String,
    pub name: String,
    /// 密钥装载后设置一次
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub chain_id: Option<i64>,
    /// 代币合约地址（仅 Token）
    #[serde(default)]
    pub contract: Option<String>,
    /// 宿主 Coin 的钱包 id（仅 Token）
    #[serde(default)]
    pub parent: Option<String>,
}

/// 代币启用来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    /// 官方代币列表
    List,
    /// 用户自行启用
    User,
    /// 用户自定义合约
    Custom,
}

/// 交易创建参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTxParams {
    /// 收款地址
    pub address: String,
    /// 金额（字符串形态，进入签名前校验）
    pub amount: String,
    #[serde(default)]
    pub memo: Option<String>,
    /// 代币合约（原生转账为空）
    #[serde(default)]
    pub contract: Option<String>,
    /// 费用覆盖
    #[serde(default)]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub gas_limit: Option<u64>,
    #[serde(default)]
    pub gas_price: Option<Decimal>,
}

impl CreateTxParams {
    /// 金额校验：非数值与负数在签名前拒绝
    pub fn validated_amount(&self) -> WalletResult<Decimal> {
        let amount: Decimal = self
            .amount
            .trim()
            .parse()
            .map_err(|_| WalletError::internal(format!("non-numeric amount: {:?}", self.amount)))?;
        if amount.is_sign_negative() {
            return Err(WalletError::internal(format!(
                "negative amount rejected: {}",
                amount
            )));
        }
        Ok(amount)
    }
}

/// 派生密钥材料
///
/// Coin 在其生命周期内独占持有；私钥在丢弃时清零，且不进入日志。
#[derive(Clone)]
pub struct DerivedKeys {
    pub address: String,
    /// 公钥 (hex)
    pub public_key: String,
    /// 私钥 (hex)，仅交给签名器使用
    pub private_key: Zeroizing<String>,
}

impl std::fmt::Debug for DerivedKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeys")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// 待签名交易计划
///
/// `create_transaction` 校验通过后的产物，交给链模块的签名器。
#[derive(Debug, Clone)]
pub struct TxPlan {
    pub ticker: String,
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub memo: Option<String>,
    pub contract: Option<String>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<Decimal>,
}

/// 原生币 + 代币余额汇总
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    pub native: Decimal,
    /// 合约地址 -> 余额
    pub tokens: std::collections::HashMap<String, Decimal>,
}
