//! 日志协作方
//!
//! 核心层内部统一走 `tracing` 结构化日志；对宿主暴露一个可在运行时
//! 替换的 Logger 协作方（默认实现转发到 tracing 控制台输出）。
//! 核心逻辑的正确性不依赖任何日志副作用。

use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

/// 日志协作方
pub trait Logger: Send + Sync {
    fn log(&self, record: &str);
    fn error(&self, record: &str);
    fn warn(&self, record: &str);

    /// 关联用户标识（可选实现）
    fn set_user_id(&self, _id: &str) {}
}

/// 默认实现：转发到 tracing
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, record: &str) {
        tracing::info!(target: "omniwallet", "{}", record);
    }

    fn error(&self, record: &str) {
        tracing::error!(target: "omniwallet", "{}", record);
    }

    fn warn(&self, record: &str) {
        tracing::warn!(target: "omniwallet", "{}", record);
    }
}

static LOGGER: Lazy<RwLock<Arc<dyn Logger>>> =
    Lazy::new(|| RwLock::new(Arc::new(TracingLogger)));

/// 当前 Logger
pub fn logger() -> Arc<dyn Logger> {
    LOGGER.read().expect("logger lock poisoned").clone()
}

/// 运行时替换 Logger
pub fn set_logger(new_logger: Arc<dyn Logger>) {
    *LOGGER.write().expect("logger lock poisoned") = new_logger;
}

/// 初始化 tracing 订阅器
///
/// level 形如 "info" / "omniwallet=debug"；重复初始化静默忽略。
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLogger {
        warns: AtomicUsize,
    }

    impl Logger for CountingLogger {
        fn log(&self, _record: &str) {}
        fn error(&self, _record: &str) {}
        fn warn(&self, _record: &str) {
            self.warns.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_logger_swappable_at_runtime() {
        let counting = Arc::new(CountingLogger {
            warns: AtomicUsize::new(0),
        });
        set_logger(counting.clone());
        logger().warn("fee table stale");
        assert_eq!(counting.warns.load(Ordering::SeqCst), 1);
        // 恢复默认，避免影响其他用例
        set_logger(Arc::new(TracingLogger));
    }
}
