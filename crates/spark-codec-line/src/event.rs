use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 解码时承载文本的约定字段名。
pub const MESSAGE_FIELD: &str = "message";

/// 以字段名为键的结构化记录。
///
/// # 契约说明（What）
/// - 解码路径产出的事件至少包含 [`MESSAGE_FIELD`]；
/// - 字段值为任意 JSON 值，嵌套对象可通过路径查找；
/// - `Display` 输出 `message` 字段的文本，缺失时输出全部字段的紧凑 JSON。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event {
    fields: Map<String, Value>,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以 `message` 字段构造事件。
    pub fn with_message(text: impl Into<String>) -> Self {
        let mut event = Self::new();
        event.insert(MESSAGE_FIELD, Value::String(text.into()));
        event
    }

    pub fn message(&self) -> Option<&str> {
        self.fields.get(MESSAGE_FIELD).and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// 写入字段，返回被覆盖的旧值。
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for Event {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => f.write_str(message),
            None => {
                let json = serde_json::to_string(&self.fields).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
        }
    }
}

/// 支持按字段路径查找的记录能力。
pub trait FieldSource {
    /// 按路径逐层查找，`path` 至少包含一个分量。
    fn lookup(&self, path: &[String]) -> Option<&Value>;
}

impl FieldSource for Event {
    fn lookup(&self, path: &[String]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.fields.get(first)?, |value, key| value.get(key))
    }
}

/// 可被编码的记录。
///
/// 编码时只在这里判定一次记录是否具备字段查找能力：返回 `Some` 的记录才会经过模板渲染，
/// 其余记录一律使用 `Display` 文本。
pub trait Encodable: fmt::Display {
    fn field_source(&self) -> Option<&dyn FieldSource> {
        None
    }
}

impl Encodable for Event {
    fn field_source(&self) -> Option<&dyn FieldSource> {
        Some(self)
    }
}

impl Encodable for str {}

impl Encodable for String {}
