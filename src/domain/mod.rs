//! Domain 模块
//!
//! 链配置、钱包身份、交易模型与派生/签名接口。

pub mod chain_config;
pub mod derivation;
pub mod transaction;
pub mod wallet;

// 重新导出常用类型
pub use chain_config::{
    ChainConfig, ChainFamily, ChainFeatures, ChainRegistry, ExplorerConfig, ExplorerKind,
    FeeConfig,
};
pub use derivation::{KeyDeriver, TxSigner};
pub use transaction::{NormalizedTransaction, RawTransaction, TxCategory};
pub use wallet::{
    BalanceSummary, CreateTxParams, DerivedKeys, TokenSource, TxPlan, WalletIdentity,
};
