//! OmniWallet - 多协议钱包核心
//!
//! 用一套统一接口覆盖异构链协议（UTXO / EVM 账户链 / Cosmos 系），
//! 宿主应用通过它创建、装载、查询钱包并驱动交易。钱包行为由独立的
//! 能力单元在装配期组合；各家后端的线上格式归一化为统一的交易
//! 生命周期模型，并通过进程内事件总线异步通知订阅方。
//!
//! 密码学签名、网络传输、持久化与远端配置获取都是外部协作方，
//! 核心层只约定接口。

pub mod capability;
pub mod config;
pub mod domain;
pub mod error;
pub mod explorer;
pub mod infrastructure;
pub mod service;

// 重新导出常用类型
pub use error::{WalletError, WalletResult};

// 统一模块导出
pub mod prelude {
    pub use crate::{
        capability::{NftCapability, NftProvider, ProviderKey, ProviderRegistry},
        config::{ConfigProvider, MemoryConfigProvider},
        domain::{
            ChainConfig, ChainFamily, ChainRegistry, CreateTxParams, NormalizedTransaction,
            RawTransaction, TokenSource, TxCategory, WalletIdentity,
        },
        error::{WalletError, WalletResult},
        explorer::{Broadcast, Explorer, RpcCall, Transport},
        infrastructure::{EventBus, Logger},
        service::{
            assemble_coin, attach_token, AssemblyParts, Coin, LifecycleNotifier, Token,
            TokenParams,
        },
    };
}
