//! `spark-tokenizer` 提供面向无界字节流的增量分隔符切帧器。
//!
//! # 模块定位（Why）
//! - 上游以任意大小、任意边界投递字节块，分隔符或多字节字符都可能被拆到两个块中；
//!   本 crate 负责在这种输入下只产出完整记录，并把未完成的尾部留在累积缓冲里。
//! - 作为编解码层的叶子组件，不感知字符集与事件语义，`spark-codec-line` 在其上叠加文本转换。
//!
//! # 设计概要（How）
//! - [`DelimitedTokenizer`] 以 `bytes::BytesMut` 作为累积缓冲，切出的记录通过
//!   `split_to(..).freeze()` 以 `Bytes` 形式零拷贝交给调用方；
//! - [`DelimitedTokenizer::extract`] 返回惰性迭代器 [`Extract`]，按流序逐条产出记录；
//! - 可选的 `size_limit` 约束“尚未遇到分隔符的尾部”长度；超限时完整记录照常产出，
//!   迭代器以 [`TokenizerError::BufferOverflow`] 结束。
//!
//! # 风险提示（Trade-offs）
//! - 默认**不设上限**：若输入流始终不含分隔符，累积缓冲会无界增长。面对不可信输入时，
//!   调用方应显式配置 `size_limit`。

mod error;
mod tokenizer;

pub use error::{TokenizerError, codes};
pub use tokenizer::{DEFAULT_DELIMITER, DelimitedTokenizer, Extract};
