//! 密钥派生与签名接口
//!
//! 核心层不实现椭圆曲线运算：派生与签名是具体链模块注入的能力。
//! 这里只规定核心需要的接口形态，以及种子/助记词的结构性校验。

use async_trait::async_trait;
use bip39::{Language, Mnemonic};

use crate::domain::wallet::{DerivedKeys, TxPlan};
use crate::error::{WalletError, WalletResult};

/// BIP39 种子最小字节数（128 bit 熵）
const MIN_SEED_LEN: usize = 16;

/// 密钥派生器
///
/// 由具体链模块提供；对同一种子必须是确定性的。
/// 派生可能计算量较大，按异步工作单元建模。
#[async_trait]
pub trait KeyDeriver: Send + Sync {
    /// 按链配置的派生路径从种子派生地址与密钥材料
    async fn derive(&self, seed: &[u8], path: &str) -> WalletResult<DerivedKeys>;
}

/// 交易签名器
///
/// 由具体链模块提供。签名一旦开始即运行至完成或失败，
/// 核心层不向进行中的签名传播取消。
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// 对交易计划签名，返回可广播的原始交易（hex）
    async fn sign(&self, plan: &TxPlan, keys: &DerivedKeys) -> WalletResult<String>;
}

/// 种子结构性校验
///
/// 过短的种子无法承载该曲线/路径的派生输入，属于集成错误。
pub fn validate_seed(seed: &[u8]) -> WalletResult<()> {
    if seed.len() < MIN_SEED_LEN {
        return Err(WalletError::internal(format!(
            "seed too short for derivation: {} bytes",
            seed.len()
        )));
    }
    Ok(())
}

/// 助记词结构性校验（BIP39 英文词表）
pub fn validate_phrase(phrase: &str) -> WalletResult<()> {
    Mnemonic::parse_in(Language::English, phrase)
        .map(|_| ())
        .map_err(|e| WalletError::internal_with("invalid mnemonic phrase", e))
}
