use encoding_rs::{Encoding, UTF_8};
use tracing::warn;

use crate::error::CharsetError;

/// 源字符集，负责把切帧得到的原始字节转换为 UTF-8 文本。
///
/// # 契约说明（What）
/// - 标签遵循 WHATWG Encoding 标准（`UTF-8`、`cp1252`、`ISO-8859-1`、`Shift_JIS` 等），大小写不敏感；
/// - [`convert`](Self::convert) 是纯函数，不依赖切帧器状态；
/// - 非法字节序列替换为 U+FFFD 并记录一条 `warn` 日志，单条畸形记录不会中断整条流。
///
/// # 风险提示（Trade-offs）
/// - 按 WHATWG 标准，`ISO-8859-1`/`latin1` 映射到 `windows-1252`，两者在 0x80..0x9F 区间的解释不同。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Charset {
    encoding: &'static Encoding,
}

impl Default for Charset {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}

impl Charset {
    /// 按标签查找字符集。
    pub fn for_label(label: &str) -> Result<Self, CharsetError> {
        Encoding::for_label(label.as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| CharsetError::UnknownLabel {
                label: label.to_owned(),
            })
    }

    /// 规范名称，例如 `UTF-8`、`windows-1252`。
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// 将原始字节转换为文本。
    pub fn convert(&self, raw: &[u8]) -> String {
        let (text, had_errors) = self.encoding.decode_without_bom_handling(raw);
        if had_errors {
            warn!(
                charset = self.name(),
                len = raw.len(),
                "record contains bytes invalid for the configured charset, replaced with U+FFFD"
            );
        }
        text.into_owned()
    }
}
