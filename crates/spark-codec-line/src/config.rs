use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, line::LineCodec};

/// 行编解码器的配置面。
///
/// # 契约说明（What）
/// - `delimiter`：记录分隔符，默认单个空字节 `"\u0000"`，不得为空；
/// - `charset`：解码时的源字符集标签，默认 `UTF-8`；编码输出始终为 UTF-8；
/// - `format`：编码模板，仅对具备字段查找能力的记录生效，缺省时使用记录的默认文本；
/// - `size_limit`：解码时尾部累积上限（字节），缺省表示不设上限，配置为 0 视为错误。
///
/// # 使用方式（How）
/// - 可通过 [`from_toml_str`](Self::from_toml_str) 从 TOML 片段加载，未出现的字段取默认值，未知字段报错；
/// - 也可从 [`Default`] 出发链式调用 `with_*`，最后 [`build`](Self::build) 校验并构造编解码器。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LineCodecConfig {
    pub delimiter: String,
    pub charset: String,
    pub format: Option<String>,
    pub size_limit: Option<usize>,
}

impl Default for LineCodecConfig {
    fn default() -> Self {
        Self {
            delimiter: "\0".to_owned(),
            charset: "UTF-8".to_owned(),
            format: None,
            size_limit: None,
        }
    }
}

impl LineCodecConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// 校验配置并构造编解码器。
    pub fn build(&self) -> Result<LineCodec, ConfigError> {
        LineCodec::from_config(self)
    }
}
