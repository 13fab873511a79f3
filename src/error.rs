//! 统一错误类型
//!
//! 两类错误边界：External（远端系统故障）与 Internal（集成/编程错误）。
//! External 错误总是原样上抛给触发操作的调用方，核心层不做静默重试；
//! Internal 错误对触发它的操作是致命的，表示装配或输入不符合约定。

use thiserror::Error;

/// 钱包核心统一错误
#[derive(Debug, Error)]
pub enum WalletError {
    /// 可归因于远端系统的故障：节点/浏览器 RPC 失败、远端返回畸形数据、NFT 服务失败
    #[error("external service failure: {0}")]
    External(String),

    /// 编程/集成错误：能力单元装配到不兼容的基座、派生输入非法、参数不符合约定
    #[error("internal integration error: {0}")]
    Internal(String),
}

impl WalletError {
    /// 构造 External 错误
    pub fn external(message: impl Into<String>) -> Self {
        Self::External(message.into())
    }

    /// 构造 External 错误，附带底层原因
    pub fn external_with(context: &str, cause: impl std::fmt::Display) -> Self {
        Self::External(format!("{}: {}", context, cause))
    }

    /// 构造 Internal 错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// 构造 Internal 错误，附带底层原因
    pub fn internal_with(context: &str, cause: impl std::fmt::Display) -> Self {
        Self::Internal(format!("{}: {}", context, cause))
    }

    /// 是否为远端故障
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// 是否为集成错误
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

/// 核心层统一 Result 别名
pub type WalletResult<T> = Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_taxonomy() {
        let e = WalletError::external("rpc node unreachable");
        assert!(e.is_external());
        assert!(!e.is_internal());

        let e = WalletError::internal_with("capability assembly failed", "missing provider");
        assert!(e.is_internal());
        assert!(e.to_string().contains("missing provider"));
    }
}
