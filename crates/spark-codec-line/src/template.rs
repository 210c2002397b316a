use serde_json::Value;

use crate::{error::FormatError, event::FieldSource};

/// 字段引用模板，例如 `%{host} %{[log][level]}: %{message}`。
///
/// # 语法（What）
/// - `%{name}` 引用顶层字段；`%{[outer][inner]}` 逐层引用嵌套对象；
/// - 找不到结尾 `}` 的 `%{`，以及空引用 `%{}`，按字面文本保留；
/// - 字符串原样输出，数字与布尔按 `Display` 输出，对象与数组输出紧凑 JSON，`null` 输出空文本。
///
/// # 逻辑（How）
/// - 构造时一次性解析为字面片段与字段引用的序列，渲染时只做查找与拼接。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    source: String,
    parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Part {
    Literal(String),
    Field(FieldRef),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct FieldRef {
    raw: String,
    path: Vec<String>,
}

impl FieldRef {
    fn parse(raw: &str) -> Self {
        let path = parse_bracket_path(raw).unwrap_or_else(|| vec![raw.to_owned()]);
        Self {
            raw: raw.to_owned(),
            path,
        }
    }
}

/// 解析 `[a][b]` 形式的路径；不符合该形式时返回 `None`，由调用方按顶层字段名处理。
fn parse_bracket_path(raw: &str) -> Option<Vec<String>> {
    let mut rest = raw.strip_prefix('[')?;
    let mut path = Vec::new();
    loop {
        let end = rest.find(']')?;
        let segment = &rest[..end];
        if segment.is_empty() || segment.contains('[') {
            return None;
        }
        path.push(segment.to_owned());
        rest = &rest[end + 1..];
        if rest.is_empty() {
            return Some(path);
        }
        rest = rest.strip_prefix('[')?;
    }
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(open) = rest.find("%{") {
            let after = &rest[open + 2..];
            let Some(close) = after.find('}') else {
                break;
            };
            let name = &after[..close];
            literal.push_str(&rest[..open]);
            if name.is_empty() {
                literal.push_str("%{}");
            } else {
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                parts.push(Part::Field(FieldRef::parse(name)));
            }
            rest = &after[close + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }

        Self {
            source: source.to_owned(),
            parts,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 以记录字段渲染模板，首个缺失字段即返回 [`FormatError::MissingField`]。
    pub fn render(&self, fields: &dyn FieldSource) -> Result<String, FormatError> {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Field(field) => {
                    let value =
                        fields
                            .lookup(&field.path)
                            .ok_or_else(|| FormatError::MissingField {
                                field: field.raw.clone(),
                            })?;
                    push_value(&mut out, value);
                }
            }
        }
        Ok(out)
    }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(text) => out.push_str(text),
        other => out.push_str(&other.to_string()),
    }
}
