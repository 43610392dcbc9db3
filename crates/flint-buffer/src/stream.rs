use alloc::collections::VecDeque;

use flint_core::{FlintError, Result};

use crate::buffer::DataBuffer;
use crate::pool::BufferPool;

/// `StreamReader` 把一串独立到达的缓冲分块拼成单一逻辑字节流。
///
/// # 模块角色（Why）
/// - 协议消息的到达边界与消息边界无关：一次读入可能只覆盖半个头部，
///   也可能带着下一条消息的前缀。解码器需要的是“逻辑上连续”的游标，
///   而不是逐分块自理边界。
/// - 零拷贝优先：请求的字节段落落在队首分块内时（高消息率下的常态），
///   读取是一次有界切片或索引访问，不分配、不复制；只有跨分块的段落
///   才触发唯一一次有界合并复制。
///
/// # 核心机制（How）
/// - `VecDeque<DataBuffer>` 维护严格 FIFO 的分块队列，`total_available`
///   与各分块剩余量之和保持恒等；消费型读取把分块排空的瞬间将其逐出，
///   池属存储经 Drop 租约自动回流；
/// - 多字节整数的拼装在快慢两条路径上统一按**网络字节序（大端）**，
///   与任何分块自身声明的字节序无关；
/// - 跨分块合并的目标缓冲取自构造时注入的 [`BufferPool`]。
///
/// # 契约说明（What）
/// - 单一所有者值：跨线程共享需整体同步或所有权移交；
/// - 任何数据不足的失败都不消费、不推进任何游标；
/// - [`Self::release`] 按值消耗读取器并排空余量；直接丢弃读取器
///   具有相同效果，“恰好一次”由移动语义保证。
pub struct StreamReader {
    chunks: VecDeque<DataBuffer>,
    total_available: usize,
    pool: BufferPool,
}

impl StreamReader {
    /// 创建空读取器；`pool` 供跨分块合并路径取用目标缓冲。
    pub fn new(pool: BufferPool) -> Self {
        Self {
            chunks: VecDeque::new(),
            total_available: 0,
            pool,
        }
    }

    /// 追加一个分块并接管其所有权；空分块当场丢弃。
    pub fn append(&mut self, chunk: DataBuffer) {
        let remaining = chunk.remaining();
        if remaining == 0 {
            return;
        }
        self.total_available += remaining;
        self.chunks.push_back(chunk);
    }

    /// 当前可读的逻辑字节总量，O(1)。
    pub fn available(&self) -> usize {
        self.total_available
    }

    /// 无消费读取偏移 `offset` 处的单字节。
    pub fn peek_byte(&self, mut offset: usize) -> Result<u8> {
        if offset >= self.total_available {
            return Err(FlintError::insufficient_data(
                offset + 1,
                self.total_available,
            ));
        }
        for chunk in &self.chunks {
            let remaining = chunk.remaining();
            if offset < remaining {
                return chunk.get_u8(chunk.position() + offset);
            }
            offset -= remaining;
        }
        // `total_available` 恒等于分块剩余量之和，走到这里即不变量破裂。
        unreachable!("total_available 与分块剩余量之和失配")
    }

    /// 无消费读取流头部的 16 位整数（网络字节序）。
    pub fn peek_u16(&self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.peek_word()?))
    }

    /// 无消费读取流头部的 32 位整数（网络字节序）。
    pub fn peek_u32(&self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.peek_word()?))
    }

    fn peek_word<const N: usize>(&self) -> Result<[u8; N]> {
        if self.total_available < N {
            return Err(FlintError::insufficient_data(N, self.total_available));
        }
        let mut word = [0u8; N];
        if let Some(front) = self.chunks.front() {
            if front.remaining() >= N {
                // 快路径：段落整体落在队首分块，逐字节有界索引读。
                let base = front.position();
                for (i, byte) in word.iter_mut().enumerate() {
                    *byte = front.get_u8(base + i)?;
                }
                return Ok(word);
            }
        }
        for (i, byte) in word.iter_mut().enumerate() {
            *byte = self.peek_byte(i)?;
        }
        Ok(word)
    }

    /// 消费单字节。
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.total_available == 0 {
            return Err(FlintError::insufficient_data(1, 0));
        }
        let value = match self.chunks.front_mut() {
            Some(front) => front.read_u8()?,
            None => unreachable!("total_available 非零时队列不可能为空"),
        };
        self.total_available -= 1;
        self.evict_drained();
        Ok(value)
    }

    /// 消费 16 位整数（网络字节序）。
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.take_word()?))
    }

    /// 消费 32 位整数（网络字节序）。
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.take_word()?))
    }

    /// 消费 64 位整数（网络字节序）。
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.take_word()?))
    }

    fn take_word<const N: usize>(&mut self) -> Result<[u8; N]> {
        if self.total_available < N {
            return Err(FlintError::insufficient_data(N, self.total_available));
        }
        let mut word = [0u8; N];
        let fast = match self.chunks.front_mut() {
            Some(front) if front.remaining() >= N => {
                // 快路径：一次定宽读出，随后逐出排空的分块。
                front.copy_into_slice(&mut word)?;
                true
            }
            _ => false,
        };
        if fast {
            self.total_available -= N;
            self.evict_drained();
            return Ok(word);
        }
        for byte in &mut word {
            *byte = self.read_u8()?;
        }
        Ok(word)
    }

    /// 消费 `size` 字节并作为一个读模式缓冲返回。
    ///
    /// 段落落在队首分块内时返回共享存储的零拷贝切片；跨分块时从池中
    /// 取一块合并目标，按序复制各分块的重叠区间（整条流上唯一的复制
    /// 路径），排空的分块随手逐出。
    pub fn read_buffer(&mut self, size: usize) -> Result<DataBuffer> {
        if size > self.total_available {
            return Err(FlintError::insufficient_data(size, self.total_available));
        }
        if let Some(front) = self.chunks.front_mut() {
            if front.remaining() >= size {
                let slice = front.read_bytes(size)?;
                self.total_available -= size;
                self.evict_drained();
                return Ok(slice);
            }
        }
        let mut merged = self.pool.acquire(size)?;
        let mut written = 0;
        while written < size {
            let take = match self.chunks.front_mut() {
                Some(front) => {
                    let take = front.remaining().min(size - written);
                    merged.write_bytes(&front.window()[..take])?;
                    front.advance(take)?;
                    take
                }
                None => unreachable!("余量校验通过后队列不可能提前排空"),
            };
            written += take;
            self.total_available -= take;
            self.evict_drained();
        }
        merged.reset_for_read();
        Ok(merged)
    }

    /// 消费并丢弃 `count` 字节，不物化内容。
    pub fn skip(&mut self, count: usize) -> Result<()> {
        if count > self.total_available {
            return Err(FlintError::insufficient_data(count, self.total_available));
        }
        let mut left = count;
        while left > 0 {
            match self.chunks.front_mut() {
                Some(front) => {
                    let take = front.remaining().min(left);
                    front.advance(take)?;
                    left -= take;
                    self.total_available -= take;
                }
                None => unreachable!("余量校验通过后队列不可能提前排空"),
            }
            self.evict_drained();
        }
        Ok(())
    }

    /// 无消费地把流头部与候选模式对齐比较。
    ///
    /// `None` 表示完整匹配；`Some(i)` 为首个差异字节的偏移；可读余量
    /// 不足以比完整条模式时，先在可比范围内找差异，没有差异则返回
    /// `Some(可读余量)`。
    ///
    /// 模式整体落在队首分块时按 8/4/2/1 字节递减步长比较：大端装载、
    /// 异或后用前导零位计数直接定位步长内的首个差异字节；跨分块时
    /// 退化为逐字节比较。
    pub fn peek_mismatch(&self, pattern: &[u8]) -> Option<usize> {
        let comparable = pattern.len().min(self.total_available);
        if let Some(front) = self.chunks.front() {
            if front.remaining() >= comparable {
                let window = &front.window()[..comparable];
                if let Some(index) = stride_mismatch(window, &pattern[..comparable]) {
                    return Some(index);
                }
                return (comparable < pattern.len()).then_some(comparable);
            }
        }
        for i in 0..comparable {
            match self.peek_byte(i) {
                Ok(byte) if byte == pattern[i] => {}
                _ => return Some(i),
            }
        }
        (comparable < pattern.len()).then_some(comparable)
    }

    /// 流头部是否与模式完整匹配（余量不足视为不匹配）。
    pub fn peek_matches(&self, pattern: &[u8]) -> bool {
        self.peek_mismatch(pattern).is_none()
    }

    /// 按值消耗读取器并排空所有剩余分块，池属存储经租约回流。
    pub fn release(self) {
        // 字段析构完成全部归还动作，移动语义保证只发生一次。
    }

    fn evict_drained(&mut self) {
        while let Some(front) = self.chunks.front() {
            if front.remaining() > 0 {
                break;
            }
            self.chunks.pop_front();
        }
    }
}

impl core::fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StreamReader")
            .field("chunks", &self.chunks.len())
            .field("available", &self.total_available)
            .finish()
    }
}

/// 在两个等长切片上定位首个差异字节，步长从 8 字节递减到 1 字节。
///
/// 大端装载让步长内的第 0 个字节落在最高位，两词异或后
/// `leading_zeros() / 8` 即是步长内首个差异字节的下标。
fn stride_mismatch(window: &[u8], pattern: &[u8]) -> Option<usize> {
    debug_assert_eq!(window.len(), pattern.len());
    let mut offset = 0;
    let len = window.len();

    while len - offset >= 8 {
        let diff = load_be::<8, u64>(&window[offset..]) ^ load_be::<8, u64>(&pattern[offset..]);
        if diff != 0 {
            return Some(offset + (diff.leading_zeros() / 8) as usize);
        }
        offset += 8;
    }
    if len - offset >= 4 {
        let diff = load_be::<4, u32>(&window[offset..]) ^ load_be::<4, u32>(&pattern[offset..]);
        if diff != 0 {
            return Some(offset + (diff.leading_zeros() / 8) as usize);
        }
        offset += 4;
    }
    if len - offset >= 2 {
        let diff = load_be::<2, u16>(&window[offset..]) ^ load_be::<2, u16>(&pattern[offset..]);
        if diff != 0 {
            return Some(offset + (diff.leading_zeros() / 8) as usize);
        }
        offset += 2;
    }
    if len - offset >= 1 && window[offset] != pattern[offset] {
        return Some(offset);
    }
    None
}

fn load_be<const N: usize, T: From<u8> + core::ops::Shl<u32, Output = T> + core::ops::BitOr<Output = T>>(
    bytes: &[u8],
) -> T {
    let mut value = T::from(bytes[0]);
    for &byte in &bytes[1..N] {
        value = (value << 8) | T::from(byte);
    }
    value
}
