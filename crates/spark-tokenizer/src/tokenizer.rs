use core::{iter::FusedIterator, num::NonZeroUsize};

use bytes::{Buf, Bytes, BytesMut};

use crate::error::TokenizerError;

/// 默认分隔符：单个空字节。
pub const DEFAULT_DELIMITER: &[u8] = b"\0";

/// 基于分隔符的增量切帧器。
///
/// # 设计初衷（Why）
/// - 字节流可能在任意位置被切块，分隔符的前半段可能落在上一块、后半段落在下一块；
///   切帧器必须跨调用保留状态，才能只产出完整记录。
///
/// # 核心机制（How）
/// - `buffer` 保存上一个已产出分隔符之后的全部字节；
/// - `search_from` 记录“此前不可能出现分隔符起点”的偏移。追加新块后从
///   `旧长度 - (分隔符长度 - 1)` 继续扫描，既能命中跨块分隔符，也避免在长期无分隔符的流上重复扫描；
/// - 记录通过 `split_to(pos).freeze()` 切出，随后 `advance` 跳过分隔符本身。
///
/// # 契约说明（What）
/// - **不变式**：[`Extract`] 被完整消费后，`buffer` 中不包含任何完整的分隔符；
/// - **线程模型**：同一实例的调用需严格串行（由 `&mut self` 保证）；不同实例之间无共享状态，
///   可分别在不同线程上处理各自的流；
/// - **资源风险**：`size_limit` 默认为 `None`，即累积缓冲无上限。
///
/// # 风险提示（Trade-offs）
/// - 多字节分隔符采用 `windows` 朴素匹配，复杂度为 `O(n * m)`；分隔符通常只有一两个字节，足够使用。
#[derive(Clone, Debug)]
pub struct DelimitedTokenizer {
    delimiter: Bytes,
    buffer: BytesMut,
    size_limit: Option<NonZeroUsize>,
    search_from: usize,
}

impl Default for DelimitedTokenizer {
    fn default() -> Self {
        Self {
            delimiter: Bytes::from_static(DEFAULT_DELIMITER),
            buffer: BytesMut::new(),
            size_limit: None,
            search_from: 0,
        }
    }
}

impl DelimitedTokenizer {
    /// 以给定分隔符创建切帧器，分隔符为空时返回 [`TokenizerError::EmptyDelimiter`]。
    pub fn new(delimiter: impl AsRef<[u8]>) -> Result<Self, TokenizerError> {
        let delimiter = delimiter.as_ref();
        if delimiter.is_empty() {
            return Err(TokenizerError::EmptyDelimiter);
        }
        Ok(Self {
            delimiter: Bytes::copy_from_slice(delimiter),
            ..Self::default()
        })
    }

    /// 设置尾部长度上限并返回自身，便于链式构造。
    pub fn with_size_limit(mut self, limit: NonZeroUsize) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// 当前使用的分隔符。
    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    pub fn size_limit(&self) -> Option<NonZeroUsize> {
        self.size_limit
    }

    /// 调整尾部长度上限。
    ///
    /// 在收到 [`TokenizerError::BufferOverflow`] 后放宽上限，再以空块调用
    /// [`extract`](Self::extract)，即可继续处理溢出时滞留在缓冲中的尾部。
    pub fn set_size_limit(&mut self, limit: Option<NonZeroUsize>) {
        self.size_limit = limit;
    }

    /// 已缓冲但尚未产出的字节数。
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// 丢弃累积缓冲，切帧器回到初始状态。
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.search_from = 0;
    }

    /// 追加一个字节块，并返回按流序产出完整记录的惰性迭代器。
    ///
    /// # 契约说明（What）
    /// - `chunk` 可以为空，也可以任意大；与分隔符、字符边界均无对齐要求；
    /// - 迭代器按分隔符出现的顺序返回记录，记录不含分隔符本身；连续的两个分隔符产出空记录；
    /// - 迭代器未消费完即被丢弃时，剩余记录留在缓冲中，由下一次调用优先产出；
    /// - 配置了 `size_limit` 时，完整记录照常先行产出；全部产出后若尾部长度仍超过上限，
    ///   迭代器以一次 [`TokenizerError::BufferOverflow`] 结束。尾部留在缓冲中，不做截断。
    pub fn extract(&mut self, chunk: &[u8]) -> Extract<'_> {
        self.buffer.extend_from_slice(chunk);
        Extract {
            tokenizer: self,
            finished: false,
        }
    }

    /// 流结束时取出剩余的不完整记录。
    ///
    /// 缓冲非空时整体返回并清空；缓冲为空时返回 `None`，不会合成空的尾记录。
    /// 再次调用自然返回 `None`。
    pub fn flush(&mut self) -> Option<Bytes> {
        self.search_from = 0;
        if self.buffer.is_empty() {
            return None;
        }
        Some(self.buffer.split().freeze())
    }

    fn next_record(&mut self) -> Option<Result<Bytes, TokenizerError>> {
        if let Some(pos) = self.find_delimiter(self.search_from) {
            let record = self.buffer.split_to(pos).freeze();
            self.buffer.advance(self.delimiter.len());
            self.search_from = 0;
            return Some(Ok(record));
        }
        self.search_from = self.resume_offset();
        self.check_tail().err().map(Err)
    }

    // 缓冲中已没有完整分隔符，剩余字节即为尾部。
    fn check_tail(&self) -> Result<(), TokenizerError> {
        match self.size_limit {
            Some(limit) if self.buffer.len() > limit.get() => Err(TokenizerError::BufferOverflow {
                len: self.buffer.len(),
                limit: limit.get(),
            }),
            _ => Ok(()),
        }
    }

    fn find_delimiter(&self, from: usize) -> Option<usize> {
        let haystack = &self.buffer[from..];
        let found = match &self.delimiter[..] {
            [byte] => haystack.iter().position(|candidate| candidate == byte),
            needle => haystack
                .windows(needle.len())
                .position(|window| window == needle),
        };
        found.map(|pos| from + pos)
    }

    // 分隔符的前 `len - 1` 个字节可能已在缓冲末尾，需要和下一块一起重新扫描。
    fn resume_offset(&self) -> usize {
        self.buffer
            .len()
            .saturating_sub(self.delimiter.len() - 1)
    }
}

/// [`DelimitedTokenizer::extract`] 返回的惰性记录迭代器。
///
/// 产出 `Ok(record)` 直到缓冲中不再有完整分隔符；尾部超限时最后产出一个 `Err`，随后结束。
#[derive(Debug)]
pub struct Extract<'a> {
    tokenizer: &'a mut DelimitedTokenizer,
    finished: bool,
}

impl Iterator for Extract<'_> {
    type Item = Result<Bytes, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.tokenizer.next_record();
        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
        }
        item
    }
}

impl FusedIterator for Extract<'_> {}
