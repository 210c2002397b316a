//! `spark-codec-line` 提供基于分隔符分帧的文本编解码器。
//!
//! # 使用概览（How）
//! - 通过 [`LineCodecConfig`] 描述分隔符、源字符集、编码模板与解码上限，调用 `build` 得到 [`LineCodec`]；
//! - 解码端逐块调用 [`LineCodec::decode`]，每条完整记录以 `message` 字段包装成 [`Event`] 同步回调，
//!   流结束时调用一次 [`LineCodec::flush`] 取回残留记录；
//! - 编码端调用 [`LineCodec::encode`]，输出追加分隔符后的 `Bytes`。
//!
//! # 合约说明（What）
//! - 分帧逻辑完全委托给 `spark-tokenizer`，本 crate 只负责字符集转换、事件构造与模板渲染；
//! - 错误均提供稳定错误码（见 [`codes`]），与切帧器共享 `protocol.budget_exceeded` 等码值；
//! - 日志通过 `tracing` 输出，订阅器由宿主安装。
//!
//! # 风险提示与后续（Trade-offs）
//! - 分隔符协议不包含转义策略，记录文本若包含分隔符，应改用长度前缀等协议；
//! - 默认不限制累积缓冲长度，面对不可信输入时请配置 `size_limit`。

mod charset;
mod config;
mod error;
mod event;
mod line;
mod template;

pub use crate::charset::Charset;
pub use crate::config::LineCodecConfig;
pub use crate::error::{CharsetError, CodecError, ConfigError, FormatError, TokenizerError, codes};
pub use crate::event::{Encodable, Event, FieldSource, MESSAGE_FIELD};
pub use crate::line::LineCodec;
pub use crate::template::Template;
