//! Service 模块
//!
//! 钱包实体、装配与生命周期通知。

pub mod assembly;
pub mod coin;
pub mod notifier;
pub mod token;

// 重新导出常用类型
pub use assembly::{assemble_coin, attach_token, AssemblyParts, TokenParams};
pub use coin::Coin;
pub use notifier::{EventKind, LifecycleNotifier};
pub use token::Token;
