//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 汇总编解码层的错误语义：配置校验、字符集标签、模板渲染，以及透传自切帧器的上限错误；
//! - 每个枚举都提供 `code()`，返回 `<领域>.<语义>` 形式的稳定错误码，便于日志检索与告警聚合。
//!
//! ## 设计要求（What）
//! - 全部派生 `thiserror::Error`，可直接参与 `?` 传播；
//! - 运行期的非法字节不在此列：字符集转换采用替换策略并记录告警，不中断整条流。

use thiserror::Error;

pub use spark_tokenizer::TokenizerError;

/// 稳定错误码常量。
pub mod codes {
    pub use spark_tokenizer::codes::{CONFIG_EMPTY_DELIMITER, PROTOCOL_BUDGET_EXCEEDED};

    /// 配置了无法识别的字符集标签。
    pub const CONFIG_INVALID_CHARSET: &str = "config.invalid_charset";
    /// `size_limit` 被配置为 0。
    pub const CONFIG_ZERO_SIZE_LIMIT: &str = "config.zero_size_limit";
    /// 配置文本无法解析。
    pub const CONFIG_PARSE: &str = "config.parse";
    /// 编码模板引用了记录中不存在的字段。
    pub const CODEC_FORMAT_MISSING_FIELD: &str = "codec.format_missing_field";
}

/// 字符集标签解析失败。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CharsetError {
    /// 标签不在 WHATWG Encoding 标准的已知列表中。
    #[error("unknown charset label `{label}`")]
    UnknownLabel { label: String },
}

impl CharsetError {
    pub fn code(&self) -> &'static str {
        match self {
            CharsetError::UnknownLabel { .. } => codes::CONFIG_INVALID_CHARSET,
        }
    }
}

/// 编码模板渲染失败。
///
/// `field` 保留模板中的原始引用文本（例如 `[host][name]`），调用方据此决定中止还是替换占位符。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FormatError {
    #[error("format references missing field `{field}`")]
    MissingField { field: String },
}

impl FormatError {
    pub fn code(&self) -> &'static str {
        match self {
            FormatError::MissingField { .. } => codes::CODEC_FORMAT_MISSING_FIELD,
        }
    }
}

/// 构造编解码器时的配置错误。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("delimiter must not be empty")]
    EmptyDelimiter,

    #[error("size_limit must be greater than zero")]
    ZeroSizeLimit,

    #[error(transparent)]
    Charset(#[from] CharsetError),

    #[error("failed to parse line codec configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::EmptyDelimiter => codes::CONFIG_EMPTY_DELIMITER,
            ConfigError::ZeroSizeLimit => codes::CONFIG_ZERO_SIZE_LIMIT,
            ConfigError::Charset(err) => err.code(),
            ConfigError::Parse(_) => codes::CONFIG_PARSE,
        }
    }
}

/// 解码与编码路径上的运行期错误。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CodecError {
    /// 切帧器报告的错误，目前只有尾部超限。
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

impl CodecError {
    pub fn code(&self) -> &'static str {
        match self {
            CodecError::Tokenizer(err) => err.code(),
            CodecError::Format(err) => err.code(),
        }
    }
}
