use core::num::NonZeroUsize;

use bytes::{BufMut, Bytes, BytesMut};
use spark_tokenizer::{DelimitedTokenizer, TokenizerError};
use tracing::{debug, warn};

use crate::{
    charset::Charset,
    config::LineCodecConfig,
    error::{CodecError, ConfigError},
    event::{Encodable, Event},
    template::Template,
};

/// 基于分隔符的文本编解码器。
///
/// # 设计动机（Why）
/// - 日志流、消息总线常以固定分隔符（默认空字节）切分文本记录，上游投递的字节块与记录边界无关；
/// - 解码端复用 [`DelimitedTokenizer`] 处理跨块拼接，本类型只负责字符集转换与事件构造。
///
/// # 行为概览（How）
/// - `decode`：把字节块交给切帧器，每条完整记录经 [`Charset`] 转换后以 `message` 字段包装为 [`Event`]，
///   在返回前按流序同步回调；
/// - `flush`：流结束时取出切帧器中残留的不完整记录，原始字节非空即回调一次；
/// - `encode`：无状态，按模板或默认文本渲染记录，追加分隔符后一次性回调 [`Bytes`]。
///
/// # 契约说明（What）
/// - **线程模型**：`decode`/`flush` 需要 `&mut self`，同一条流上的调用天然串行；`encode` 只读，可并发调用；
/// - **生命周期**：每条解码流对应一个实例，流关闭前调用一次 `flush`；
/// - **资源风险**：未配置 `size_limit` 时，不含分隔符的输入会使累积缓冲无界增长。
///
/// # 权衡与风险（Trade-offs）
/// - 分隔符不做转义，记录文本中出现分隔符时，编码结果在解码端会被切成多条记录。
#[derive(Debug)]
pub struct LineCodec {
    tokenizer: DelimitedTokenizer,
    charset: Charset,
    format: Option<Template>,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// 空字节分隔、UTF-8、无模板、无上限的编解码器。
    pub fn new() -> Self {
        Self {
            tokenizer: DelimitedTokenizer::default(),
            charset: Charset::default(),
            format: None,
        }
    }

    /// 校验配置并构造编解码器，通常经由 [`LineCodecConfig::build`] 调用。
    pub fn from_config(config: &LineCodecConfig) -> Result<Self, ConfigError> {
        let mut tokenizer = DelimitedTokenizer::new(config.delimiter.as_bytes())
            .map_err(|_| ConfigError::EmptyDelimiter)?;
        if let Some(limit) = config.size_limit {
            let limit = NonZeroUsize::new(limit).ok_or(ConfigError::ZeroSizeLimit)?;
            tokenizer.set_size_limit(Some(limit));
        }
        let charset = Charset::for_label(&config.charset)?;
        let format = config.format.as_deref().map(Template::parse);

        debug!(
            delimiter = ?config.delimiter,
            charset = charset.name(),
            format = config.format.as_deref(),
            size_limit = config.size_limit,
            "line codec configured"
        );

        Ok(Self {
            tokenizer,
            charset,
            format,
        })
    }

    pub fn delimiter(&self) -> &[u8] {
        self.tokenizer.delimiter()
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn format(&self) -> Option<&Template> {
        self.format.as_ref()
    }

    /// 已缓冲、尚未形成完整记录的字节数。
    pub fn buffered_len(&self) -> usize {
        self.tokenizer.buffered_len()
    }

    pub fn size_limit(&self) -> Option<NonZeroUsize> {
        self.tokenizer.size_limit()
    }

    /// 调整解码缓冲的尾部上限。
    ///
    /// 收到 [`CodecError::Tokenizer`] 后放宽上限，再以空块调用 [`decode`](Self::decode)
    /// 即可继续当前流；不打算继续时改用 [`reset`](Self::reset)。
    pub fn set_size_limit(&mut self, limit: Option<NonZeroUsize>) {
        self.tokenizer.set_size_limit(limit);
    }

    /// 丢弃解码缓冲，常用于 [`CodecError::Tokenizer`] 之后放弃当前流的残留数据。
    pub fn reset(&mut self) {
        self.tokenizer.clear();
    }

    /// 解码一个字节块。
    ///
    /// 尾部超出 `size_limit` 时，先回调其之前的全部完整记录，再返回 [`CodecError::Tokenizer`]；
    /// 超长的尾部本身不会被回调。
    pub fn decode<F>(&mut self, chunk: &[u8], mut emit: F) -> Result<(), CodecError>
    where
        F: FnMut(Event),
    {
        let charset = self.charset;
        for record in self.tokenizer.extract(chunk) {
            let raw = record.inspect_err(|err| {
                if let TokenizerError::BufferOverflow { len, limit } = err {
                    warn!(len, limit, "line codec buffer exceeded size limit before a delimiter");
                }
            })?;
            emit(Event::with_message(charset.convert(&raw)));
        }
        Ok(())
    }

    /// 流结束时回调残留的不完整记录。
    ///
    /// 判定依据是原始字节非空，而非转换后的文本非空。
    pub fn flush<F>(&mut self, emit: F)
    where
        F: FnOnce(Event),
    {
        if let Some(remainder) = self.tokenizer.flush() {
            debug!(len = remainder.len(), "flushing trailing partial record");
            emit(Event::with_message(self.charset.convert(&remainder)));
        }
    }

    /// 编码一条记录，输出以分隔符结尾的字节序列。
    pub fn encode<R, F>(&self, record: &R, emit: F) -> Result<(), CodecError>
    where
        R: Encodable + ?Sized,
        F: FnOnce(Bytes),
    {
        let text = match (&self.format, record.field_source()) {
            (Some(template), Some(fields)) => template.render(fields)?,
            _ => record.to_string(),
        };

        let delimiter = self.tokenizer.delimiter();
        let mut frame = BytesMut::with_capacity(text.len() + delimiter.len());
        frame.put_slice(text.as_bytes());
        frame.put_slice(delimiter);
        emit(frame.freeze());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;
    use tracing_test::traced_test;

    fn decode_all(codec: &mut LineCodec, chunks: &[&[u8]]) -> Vec<String> {
        let mut messages = Vec::new();
        for chunk in chunks {
            codec
                .decode(chunk, |event| messages.push(event.to_string()))
                .expect("decode succeeds");
        }
        codec.flush(|event| messages.push(event.to_string()));
        messages
    }

    #[test]
    fn decode_emits_message_events_in_order() {
        let mut codec = LineCodec::new();
        let mut events = Vec::new();
        codec
            .decode(b"first\0second\0thi", |event| events.push(event))
            .expect("decode succeeds");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message(), Some("first"));
        assert_eq!(events[1].message(), Some("second"));
        assert_eq!(codec.buffered_len(), 3);
    }

    #[test]
    fn multi_byte_character_split_across_chunks() {
        let mut codec = LineCodec::new();
        let text = "naïve\0".as_bytes();
        let (head, tail) = text.split_at(3);
        assert_eq!(decode_all(&mut codec, &[head, tail]), ["naïve"]);
    }

    #[test]
    fn flush_emits_raw_remainder_even_if_converted_text_is_blank() {
        let mut codec = LineCodec::new();
        assert_eq!(
            decode_all(&mut codec, &[b"a\0".as_slice(), b"  ".as_slice()]),
            ["a", "  "]
        );

        let mut flushed = Vec::new();
        codec.flush(|event| flushed.push(event));
        assert!(flushed.is_empty(), "second flush emits nothing");
    }

    #[test]
    #[traced_test]
    fn overflow_is_propagated_and_logged() {
        let mut codec = LineCodecConfig::default()
            .with_size_limit(4)
            .build()
            .expect("valid config");
        let mut emitted = Vec::new();
        let err = codec
            .decode(b"ok\0overflowing", |event| emitted.push(event.to_string()))
            .expect_err("tail exceeds limit");
        assert_eq!(err.code(), codes::PROTOCOL_BUDGET_EXCEEDED);
        assert_eq!(emitted, ["ok"]);
        assert!(logs_contain("exceeded size limit"));

        codec.reset();
        assert_eq!(codec.buffered_len(), 0);
    }

    #[test]
    fn raising_limit_resumes_stream_after_overflow() {
        let mut codec = LineCodecConfig::default()
            .with_size_limit(4)
            .build()
            .expect("valid config");
        assert!(codec.decode(b"overflowing", |_| {}).is_err());
        assert_eq!(codec.buffered_len(), 11);

        codec.set_size_limit(None);
        assert_eq!(codec.size_limit(), None);
        assert_eq!(decode_all(&mut codec, &[b"\0next".as_slice()]), ["overflowing", "next"]);
    }

    #[test]
    fn delimiter_is_shared_with_tokenizer() {
        let codec = LineCodecConfig::default()
            .with_delimiter("<|>")
            .build()
            .expect("valid config");
        assert_eq!(codec.delimiter(), b"<|>");
        assert_eq!(LineCodec::new().delimiter(), b"\0");

        let mut frame = Bytes::new();
        codec
            .encode("x", |bytes| frame = bytes)
            .expect("encode succeeds");
        assert_eq!(&frame[..], b"x<|>");
    }

    #[test]
    fn encode_appends_delimiter_once() {
        let codec = LineCodec::new();
        let mut out = Vec::new();
        codec
            .encode("hello", |bytes| out.push(bytes))
            .expect("encode succeeds");
        assert_eq!(out, [Bytes::from_static(b"hello\0")]);
    }

    #[test]
    fn encode_renders_template_for_events_only() {
        let codec = LineCodecConfig::default()
            .with_delimiter("\n")
            .with_format("%{host}: %{message}")
            .build()
            .expect("valid config");

        let mut event = Event::with_message("up");
        event.insert("host", "web-1");
        let mut out = BytesMut::new();
        codec
            .encode(&event, |bytes| out.extend_from_slice(&bytes))
            .expect("template renders");
        codec
            .encode("plain %{host}", |bytes| out.extend_from_slice(&bytes))
            .expect("plain text bypasses template");
        assert_eq!(&out[..], b"web-1: up\nplain %{host}\n");
    }

    #[test]
    fn encode_missing_field_emits_nothing() {
        let codec = LineCodecConfig::default()
            .with_format("%{host}")
            .build()
            .expect("valid config");
        let mut called = false;
        let err = codec
            .encode(&Event::with_message("x"), |_| called = true)
            .expect_err("host is missing");
        assert_eq!(err.code(), codes::CODEC_FORMAT_MISSING_FIELD);
        assert!(!called);
    }

    #[test]
    fn codec_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LineCodec>();
    }
}
