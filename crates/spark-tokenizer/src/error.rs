//! # error 模块说明
//!
//! 切帧器对外暴露的错误语义。错误码遵循 `<领域>.<语义>` 约定，
//! 与编解码层共享同一套检索口径。

use thiserror::Error;

/// 稳定错误码常量。
pub mod codes {
    /// 累积缓冲在遇到分隔符之前超出了配置的上限。
    pub const PROTOCOL_BUDGET_EXCEEDED: &str = "protocol.budget_exceeded";
    /// 构造切帧器时给出了空分隔符。
    pub const CONFIG_EMPTY_DELIMITER: &str = "config.empty_delimiter";
}

/// 切帧器错误域。
///
/// # 契约说明（What）
/// - `EmptyDelimiter`：仅在构造阶段出现，分隔符至少需要一个字节；
/// - `BufferOverflow`：`len` 为尚未遇到分隔符的尾部长度，`limit` 为当时生效的上限。
///   出错时尾部之前的完整记录已经产出，尾部本身保留在缓冲中、不截断；
///   调用方可以放宽上限后以空块重试，或直接丢弃该流。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TokenizerError {
    /// 分隔符为空。
    #[error("delimiter must contain at least one byte")]
    EmptyDelimiter,

    /// 尾部数据超过 `size_limit` 仍未出现分隔符。
    #[error("pending input of {len} bytes exceeds size limit {limit} before a delimiter")]
    BufferOverflow { len: usize, limit: usize },
}

impl TokenizerError {
    /// 返回稳定错误码，便于日志与指标聚合。
    pub fn code(&self) -> &'static str {
        match self {
            TokenizerError::EmptyDelimiter => codes::CONFIG_EMPTY_DELIMITER,
            TokenizerError::BufferOverflow { .. } => codes::PROTOCOL_BUDGET_EXCEEDED,
        }
    }
}
