use alloc::borrow::Cow;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ptr;
use core::slice;

use bytes::Bytes;
use flint_core::{
    AllocationZone, ByteOrder, FlintError, RawRegion, Result, TextEncoding, codes,
};

use crate::region::{HeapRegion, Region, SharedRegion};

/// `RegionRecycler` 描述缓冲生命周期结束时的存储回收入口。
///
/// # 设计初衷（Why）
/// - 池化缓冲的归还不能依赖调用方显式调用：分块流读取器在排空时直接丢弃
///   分块，若回收必须显式触发，容量就会静默流失。
/// - 把回收钩子挂接在 [`DataBuffer`] 的 `Drop` 上，经 trait 对象与池解耦，
///   缓冲层不需要知道池的具体类型。
///
/// # 契约定义（What）
/// - `reclaim` 收到的是存储区域的一份克隆引用；实现可按引用计数判定该区域
///   是否仍被切片别名，进而决定“重新上架”还是“仅更新统计”；
/// - **前置条件**：实现必须线程安全，且调用过程中不得 panic——
///   钩子运行在 `Drop` 路径上。
pub trait RegionRecycler: Send + Sync + 'static {
    /// 接收一块生命周期结束的存储区域。
    fn reclaim(&self, region: Arc<Region>);
}

/// `DataBuffer` 是缓冲基底的核心类型：跨后端统一的类型化读写游标。
///
/// # 设计动机（Why）
/// - 协议与编解码代码需要对一段字节执行定宽整数、原始字节串、长度前缀
///   文本的读写，而不关心字节来自托管堆、堆外内存还是外部共享序列；
///   本类型把“游标 + 字节序 + 区位”收敛为一个单一可变值。
/// - 切片与转换的零拷贝规则是分块流读取器快路径的根基：
///   `slice`/`read_bytes` 与父缓冲共享同一 `Arc<Region>`，无任何复制。
///
/// # 游标契约（What）
/// - 不变量：`0 <= position <= limit <= capacity`，容量创建后固定；
/// - **写模式**：`limit == capacity`，游标随写入推进，越过 `limit` 的写入
///   返回 `buffer.overflow`，从不静默扩容；
/// - **读模式**：`limit` 标记有效数据末端，游标随消费推进，越过 `limit`
///   的读取返回 `stream.insufficient_data` 且不推进游标；
/// - [`Self::reset_for_read`] / [`Self::reset_for_write`] 是无条件的模式
///   切换，属于文档化使用约定，运行时不跟踪所处模式。
///
/// # 所有权与别名（Trade-offs）
/// - 同一 `Arc<Region>` 可被父缓冲与多个切片共享；写入互斥由单一所有者
///   契约保证（任一时刻最多一个逻辑所有者持有 `&mut` 并写入），
///   跨线程共享需要整体同步或所有权移交。
/// - 池签发的缓冲携带回收租约；`Drop` 时经 [`RegionRecycler`] 自动归还，
///   切片从不携带租约。
pub struct DataBuffer {
    region: Arc<Region>,
    start: usize,
    capacity: usize,
    position: usize,
    limit: usize,
    order: ByteOrder,
    zone: AllocationZone,
    lease: Option<Arc<dyn RegionRecycler>>,
}

impl DataBuffer {
    /// 按区位策略分配一个写模式缓冲（`position = 0`，`limit = capacity = len`）。
    pub fn allocate(len: usize, zone: AllocationZone, order: ByteOrder) -> Result<Self> {
        let region = Region::allocate(&zone, len)?;
        Ok(Self {
            region,
            start: 0,
            capacity: len,
            position: 0,
            limit: len,
            order,
            zone,
            lease: None,
        })
    }

    /// 托管堆上的便捷分配，不会失败。
    pub fn heap(len: usize, order: ByteOrder) -> Self {
        Self {
            region: Arc::new(Region::Heap(HeapRegion::zeroed(len))),
            start: 0,
            capacity: len,
            position: 0,
            limit: len,
            order,
            zone: AllocationZone::Heap,
            lease: None,
        }
    }

    /// 零拷贝接管既有字节，返回覆盖全部内容的读模式缓冲。
    pub fn wrap(data: Vec<u8>, order: ByteOrder) -> Self {
        let len = data.len();
        Self {
            region: Arc::new(Region::Heap(HeapRegion::from_vec(data))),
            start: 0,
            capacity: len,
            position: 0,
            limit: len,
            order,
            zone: AllocationZone::Heap,
            lease: None,
        }
    }

    /// 零拷贝包装一段只读共享字节（生态互操作入口；网络读取天然是 `Bytes`）。
    ///
    /// 返回读模式缓冲；任何写请求都会得到 `buffer.read_only`。
    pub fn wrap_shared(bytes: Bytes, order: ByteOrder) -> Self {
        let len = bytes.len();
        Self {
            region: Arc::new(Region::Shared(SharedRegion::new(bytes))),
            start: 0,
            capacity: len,
            position: 0,
            limit: len,
            order,
            zone: AllocationZone::Heap,
            lease: None,
        }
    }

    /// 池签发缓冲的内部构造器：写模式 + 回收租约。
    pub(crate) fn pooled(
        region: Arc<Region>,
        zone: AllocationZone,
        order: ByteOrder,
        lease: Arc<dyn RegionRecycler>,
    ) -> Self {
        let capacity = region.len();
        Self {
            region,
            start: 0,
            capacity,
            position: 0,
            limit: capacity,
            order,
            zone,
            lease: Some(lease),
        }
    }

    pub(crate) fn region_arc(&self) -> &Arc<Region> {
        &self.region
    }

    /// 剩余窗口起点在底层区域中的绝对偏移。
    pub(crate) fn absolute_position(&self) -> usize {
        self.start + self.position
    }

    /// 租约回收器的黑盒身份，供池校验“这是不是我签发的缓冲”。
    pub(crate) fn lease_identity(&self) -> Option<*const ()> {
        self.lease
            .as_ref()
            .map(|lease| Arc::as_ptr(lease) as *const ())
    }

    // ---- 游标 ----

    /// 下一次访问的偏移。
    pub fn position(&self) -> usize {
        self.position
    }

    /// 有效 / 可读区域的排他上界。
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 创建时固定的容量。
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 剩余可访问字节数（`limit - position`）。
    pub fn remaining(&self) -> usize {
        self.limit - self.position
    }

    /// 创建时固定的字节序。
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// 缓冲创建时选用的分配区位。
    pub fn zone(&self) -> &AllocationZone {
        &self.zone
    }

    /// 是否携带池回收租约。
    pub fn is_pooled(&self) -> bool {
        self.lease.is_some()
    }

    /// 底层存储是否具备跨进程共享能力（仅自定义后端可能为真）。
    pub fn is_shared_memory(&self) -> bool {
        self.region.is_shared_memory()
    }

    /// 堆外后端的本地地址（含当前 `start` 偏移）；托管后端返回 `None`。
    pub fn native_address(&self) -> Option<usize> {
        self.region.native_address().map(|addr| addr + self.start)
    }

    /// 移动游标；新位置越过 `limit` 视为编程错误。
    pub fn set_position(&mut self, position: usize) -> Result<()> {
        if position > self.limit {
            return Err(FlintError::index_out_of_range(
                "position",
                position,
                self.limit,
            ));
        }
        self.position = position;
        Ok(())
    }

    /// 调整有效数据上界；越过容量视为编程错误，游标随之下调以维持不变量。
    pub fn set_limit(&mut self, limit: usize) -> Result<()> {
        if limit > self.capacity {
            return Err(FlintError::index_out_of_range("limit", limit, self.capacity));
        }
        self.limit = limit;
        if self.position > limit {
            self.position = limit;
        }
        Ok(())
    }

    /// 切换到读模式：`limit = position`，`position = 0`。无条件执行。
    pub fn reset_for_read(&mut self) {
        self.limit = self.position;
        self.position = 0;
    }

    /// 切换到写模式：`position = 0`，`limit = capacity`。无条件执行。
    pub fn reset_for_write(&mut self) {
        self.position = 0;
        self.limit = self.capacity;
    }

    /// 前移游标、丢弃对应数据；超出剩余量时不推进并返回数据不足。
    pub fn advance(&mut self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(FlintError::insufficient_data(count, self.remaining()));
        }
        self.position += count;
        Ok(())
    }

    // ---- 原始访问 ----
    //
    // 所有字节访问统一经由下列裸指针助手，边界先行校验；
    // 不持有跨语句的 `&mut` 引用，避免与共享切片的只读借用冲突。

    #[inline]
    fn base(&self) -> *const u8 {
        // SAFETY: `start + capacity <= region.len()` 由构造器保证。
        unsafe { self.region.as_ptr().add(self.start) }
    }

    #[inline]
    fn writable_base(&self) -> Result<*mut u8> {
        match self.region.as_mut_ptr() {
            // SAFETY: 同 `base`。
            Some(ptr) => Ok(unsafe { ptr.add(self.start) }),
            None => Err(FlintError::new(
                codes::BUFFER_READ_ONLY,
                "底层存储为只读，无法执行写入",
            )),
        }
    }

    /// 当前可读窗口 `[position, limit)` 的切片视图。
    pub fn window(&self) -> &[u8] {
        // SAFETY: 窗口落在区域界内；内容互斥由单一所有者契约保证。
        unsafe { slice::from_raw_parts(self.base().add(self.position), self.remaining()) }
    }

    fn full_span(&self) -> &[u8] {
        // SAFETY: 同 `window`，范围为 `[0, capacity)`。
        unsafe { slice::from_raw_parts(self.base(), self.capacity) }
    }

    // ---- 游标读 ----

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        if self.remaining() < N {
            return Err(FlintError::insufficient_data(N, self.remaining()));
        }
        let mut out = [0u8; N];
        // SAFETY: 上方已校验 `position + N <= limit <= capacity`。
        unsafe {
            ptr::copy_nonoverlapping(self.base().add(self.position), out.as_mut_ptr(), N);
        }
        self.position += N;
        Ok(out)
    }

    /// 读取单字节并推进游标。
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    /// 读取有符号单字节并推进游标。
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// 按缓冲字节序读取 16 位无符号整数。
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.order.decode_u16(self.take_array()?))
    }

    /// 按缓冲字节序读取 16 位有符号整数。
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.order.decode_i16(self.take_array()?))
    }

    /// 按缓冲字节序读取 32 位无符号整数。
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.order.decode_u32(self.take_array()?))
    }

    /// 按缓冲字节序读取 32 位有符号整数。
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.order.decode_i32(self.take_array()?))
    }

    /// 按缓冲字节序读取 64 位无符号整数。
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(self.order.decode_u64(self.take_array()?))
    }

    /// 按缓冲字节序读取 64 位有符号整数。
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(self.order.decode_i64(self.take_array()?))
    }

    /// 按缓冲字节序读取 IEEE 754 单精度浮点。
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.order.decode_f32(self.take_array()?))
    }

    /// 按缓冲字节序读取 IEEE 754 双精度浮点。
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(self.order.decode_f64(self.take_array()?))
    }

    /// 将 `dst.len()` 字节复制到目标切片并推进游标；不足时不消费。
    pub fn copy_into_slice(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.remaining() {
            return Err(FlintError::insufficient_data(dst.len(), self.remaining()));
        }
        // SAFETY: 长度已校验；目标切片与缓冲不重叠（`&mut` 独占）。
        unsafe {
            ptr::copy_nonoverlapping(
                self.base().add(self.position),
                dst.as_mut_ptr(),
                dst.len(),
            );
        }
        self.position += dst.len();
        Ok(())
    }

    /// 消费 `len` 字节并以零拷贝切片的形式返回（读模式，覆盖被消费区间）。
    pub fn read_bytes(&mut self, len: usize) -> Result<DataBuffer> {
        if len > self.remaining() {
            return Err(FlintError::insufficient_data(len, self.remaining()));
        }
        let view = self.view(self.position, len);
        self.position += len;
        Ok(view)
    }

    /// 读取长度前缀（u16，按缓冲字节序）文本。
    ///
    /// 失败路径绝不推进游标：长度或负载不足返回数据不足，
    /// 字节序列对编码无效返回 `buffer.text_decode`。
    pub fn read_text(&mut self, encoding: TextEncoding) -> Result<String> {
        if self.remaining() < 2 {
            return Err(FlintError::insufficient_data(2, self.remaining()));
        }
        let window = self.window();
        let len = self
            .order
            .decode_u16([window[0], window[1]]) as usize;
        let total = 2 + len;
        if self.remaining() < total {
            return Err(FlintError::insufficient_data(total, self.remaining()));
        }
        let text = encoding.decode(&window[2..total])?;
        self.position += total;
        Ok(text)
    }

    // ---- 游标写 ----

    fn put_slice(&mut self, src: &[u8]) -> Result<()> {
        let base = self.writable_base()?;
        let writable = self.remaining();
        if src.len() > writable {
            return Err(FlintError::overflow(src.len(), writable));
        }
        // SAFETY: 长度已校验；来源切片与缓冲不重叠（写入方独占 `&mut self`）。
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), base.add(self.position), src.len());
        }
        self.position += src.len();
        Ok(())
    }

    /// 写入单字节并推进游标。
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.put_slice(&[value])
    }

    /// 写入有符号单字节并推进游标。
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// 按缓冲字节序写入 16 位无符号整数。
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        let bytes = self.order.encode_u16(value);
        self.put_slice(&bytes)
    }

    /// 按缓冲字节序写入 16 位有符号整数。
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        let bytes = self.order.encode_i16(value);
        self.put_slice(&bytes)
    }

    /// 按缓冲字节序写入 32 位无符号整数。
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        let bytes = self.order.encode_u32(value);
        self.put_slice(&bytes)
    }

    /// 按缓冲字节序写入 32 位有符号整数。
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        let bytes = self.order.encode_i32(value);
        self.put_slice(&bytes)
    }

    /// 按缓冲字节序写入 64 位无符号整数。
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        let bytes = self.order.encode_u64(value);
        self.put_slice(&bytes)
    }

    /// 按缓冲字节序写入 64 位有符号整数。
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        let bytes = self.order.encode_i64(value);
        self.put_slice(&bytes)
    }

    /// 按缓冲字节序写入 IEEE 754 单精度浮点。
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        let bytes = self.order.encode_f32(value);
        self.put_slice(&bytes)
    }

    /// 按缓冲字节序写入 IEEE 754 双精度浮点。
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        let bytes = self.order.encode_f64(value);
        self.put_slice(&bytes)
    }

    /// 写入原始字节串并推进游标。
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<()> {
        self.put_slice(src)
    }

    /// 写入长度前缀（u16，按缓冲字节序）文本。
    ///
    /// 先整体校验编码可表示性与剩余空间，再执行写入，绝不写出半截帧。
    pub fn write_text(&mut self, text: &str, encoding: TextEncoding) -> Result<()> {
        let payload = encoding.encode(text)?;
        let Ok(len) = u16::try_from(payload.len()) else {
            return Err(FlintError::new(
                codes::BUFFER_OVERFLOW,
                "文本负载超出 u16 长度前缀的表达范围（65535 字节）",
            ));
        };
        let total = 2 + payload.len();
        let writable = self.remaining();
        if total > writable {
            return Err(FlintError::overflow(total, writable));
        }
        let prefix = self.order.encode_u16(len);
        self.put_slice(&prefix)?;
        self.put_slice(payload)
    }

    // ---- 索引访问（不动游标，仅按容量校验） ----

    fn get_array_at<const N: usize>(&self, index: usize) -> Result<[u8; N]> {
        let Some(end) = index.checked_add(N) else {
            return Err(FlintError::index_out_of_range("index", index, self.capacity));
        };
        if end > self.capacity {
            return Err(FlintError::index_out_of_range("index", index, self.capacity));
        }
        let mut out = [0u8; N];
        // SAFETY: `index + N <= capacity` 已校验。
        unsafe {
            ptr::copy_nonoverlapping(self.base().add(index), out.as_mut_ptr(), N);
        }
        Ok(out)
    }

    fn put_array_at(&mut self, index: usize, src: &[u8]) -> Result<()> {
        let base = self.writable_base()?;
        let Some(end) = index.checked_add(src.len()) else {
            return Err(FlintError::index_out_of_range("index", index, self.capacity));
        };
        if end > self.capacity {
            return Err(FlintError::index_out_of_range("index", index, self.capacity));
        }
        // SAFETY: `index + src.len() <= capacity` 已校验。
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), base.add(index), src.len());
        }
        Ok(())
    }

    /// 在显式偏移处读取单字节；按容量而非 `limit` 校验（调用方自负窗口语义）。
    pub fn get_u8(&self, index: usize) -> Result<u8> {
        Ok(self.get_array_at::<1>(index)?[0])
    }

    /// 在显式偏移处按缓冲字节序读取 16 位无符号整数。
    pub fn get_u16(&self, index: usize) -> Result<u16> {
        Ok(self.order.decode_u16(self.get_array_at(index)?))
    }

    /// 在显式偏移处按缓冲字节序读取 32 位无符号整数。
    pub fn get_u32(&self, index: usize) -> Result<u32> {
        Ok(self.order.decode_u32(self.get_array_at(index)?))
    }

    /// 在显式偏移处按缓冲字节序读取 64 位无符号整数。
    pub fn get_u64(&self, index: usize) -> Result<u64> {
        Ok(self.order.decode_u64(self.get_array_at(index)?))
    }

    /// 在显式偏移处写入单字节；不动游标。
    pub fn put_u8(&mut self, index: usize, value: u8) -> Result<()> {
        self.put_array_at(index, &[value])
    }

    /// 在显式偏移处按缓冲字节序写入 16 位无符号整数。
    pub fn put_u16(&mut self, index: usize, value: u16) -> Result<()> {
        let bytes = self.order.encode_u16(value);
        self.put_array_at(index, &bytes)
    }

    /// 在显式偏移处按缓冲字节序写入 32 位无符号整数。
    pub fn put_u32(&mut self, index: usize, value: u32) -> Result<()> {
        let bytes = self.order.encode_u32(value);
        self.put_array_at(index, &bytes)
    }

    /// 在显式偏移处按缓冲字节序写入 64 位无符号整数。
    pub fn put_u64(&mut self, index: usize, value: u64) -> Result<()> {
        let bytes = self.order.encode_u64(value);
        self.put_array_at(index, &bytes)
    }

    // ---- 切片与转换 ----

    fn view(&self, offset: usize, len: usize) -> DataBuffer {
        DataBuffer {
            region: Arc::clone(&self.region),
            start: self.start + offset,
            capacity: len,
            position: 0,
            limit: len,
            order: self.order,
            zone: self.zone.clone(),
            lease: None,
        }
    }

    /// 返回 `[position, limit)` 的零拷贝读视图，父缓冲游标不动。
    ///
    /// 切片与父缓冲共享存储（背引用关系而非所有权转移），存活期内
    /// 父缓冲的写入对切片可见；切片面向读取，不携带池租约。
    pub fn slice(&self) -> DataBuffer {
        self.view(self.position, self.remaining())
    }

    /// 导出剩余字节为托管字节序列。
    ///
    /// 零拷贝（`Cow::Borrowed`）当且仅当后端本身是托管字节序列、
    /// `position == 0` 且剩余量覆盖该序列全长；其余情形复制剩余字节。
    /// 调用前后 `position`/`limit` 不变（硬性契约）。
    pub fn to_byte_array(&self) -> Cow<'_, [u8]> {
        let full_window = self.start == 0
            && self.position == 0
            && self.limit == self.region.len();
        if self.region.is_managed() && full_window {
            Cow::Borrowed(self.full_span())
        } else {
            Cow::Owned(self.window().to_vec())
        }
    }

    /// 导出剩余字节为只读原生内存视图。
    ///
    /// 后端已具备本地地址（堆外 / 自定义原生后端）时为零拷贝子区间视图；
    /// 否则分配一块新的原生内存并复制剩余字节。
    /// 调用前后 `position`/`limit` 不变（硬性契约）。
    pub fn to_native_data(&self) -> crate::native::NativeData {
        crate::native::NativeData::from_buffer(self)
    }

    /// 导出剩余字节为可变原生内存视图。
    ///
    /// 仅当后端本身是可写的原生内存时为零拷贝——此时写入对源缓冲可见；
    /// 其余情形复制，写入不会回传。调用前后 `position`/`limit` 不变。
    pub fn to_native_data_mut(&self) -> crate::native::NativeDataMut {
        crate::native::NativeDataMut::from_buffer(self)
    }

    // ---- 批量助手 ----

    /// 以 4 字节滚动异或密钥就地掩码剩余字节。
    ///
    /// 密钥先旋转，使密钥的第 `mask_offset % 4` 字节对齐数据第 0 字节，
    /// 之后按 4 字节步进处理、尾部逐字节收尾；对相同的
    /// `(mask, mask_offset, data)` 三元组产出逐字节一致的结果
    /// （负载掩码协议（如帧掩码）依赖该约定）。游标不动。
    pub fn xor_mask(&mut self, mask: [u8; 4], mask_offset: usize) -> Result<()> {
        let base = self.writable_base()?;
        let rotation = mask_offset % 4;
        let key = [
            mask[rotation],
            mask[(rotation + 1) % 4],
            mask[(rotation + 2) % 4],
            mask[(rotation + 3) % 4],
        ];
        // SAFETY: 窗口界内且写入方独占 `&mut self`。
        let data =
            unsafe { slice::from_raw_parts_mut(base.add(self.position), self.remaining()) };
        let mut words = data.chunks_exact_mut(4);
        for word in &mut words {
            for (byte, k) in word.iter_mut().zip(key) {
                *byte ^= k;
            }
        }
        for (i, byte) in words.into_remainder().iter_mut().enumerate() {
            *byte ^= key[i % 4];
        }
        Ok(())
    }

    /// 以给定值填充剩余字节；游标不动。
    pub fn fill(&mut self, value: u8) -> Result<()> {
        let base = self.writable_base()?;
        // SAFETY: 窗口界内且写入方独占 `&mut self`。
        unsafe {
            ptr::write_bytes(base.add(self.position), value, self.remaining());
        }
        Ok(())
    }

    /// 在剩余字节中查找首个目标字节，返回相对 `position` 的偏移。
    pub fn index_of(&self, byte: u8) -> Option<usize> {
        self.window().iter().position(|&b| b == byte)
    }

    /// 判定两个缓冲的剩余窗口内容是否一致。
    pub fn content_equals(&self, other: &DataBuffer) -> bool {
        // 同一存储、同一窗口时直接短路，免去逐字节比较。
        if Arc::ptr_eq(&self.region, &other.region)
            && self.start + self.position == other.start + other.position
            && self.remaining() == other.remaining()
        {
            return true;
        }
        self.window() == other.window()
    }

    /// 定位两个剩余窗口的首个差异。
    ///
    /// `None` 表示两窗口完全一致；`Some(i)` 为首个差异字节的偏移，
    /// 当一个窗口是另一个的严格前缀时返回较短窗口的长度。
    pub fn mismatch(&self, other: &DataBuffer) -> Option<usize> {
        let mine = self.window();
        let theirs = other.window();
        let shared = mine.len().min(theirs.len());
        for i in 0..shared {
            if mine[i] != theirs[i] {
                return Some(i);
            }
        }
        if mine.len() == theirs.len() {
            None
        } else {
            Some(shared)
        }
    }
}

impl Drop for DataBuffer {
    fn drop(&mut self) {
        // 池签发的缓冲在此归还存储；切片与非池缓冲无租约，直接释放。
        if let Some(lease) = self.lease.take() {
            lease.reclaim(Arc::clone(&self.region));
        }
    }
}

/// 相等性覆盖整个存储窗口而非仅剩余区间：
/// `position`、`limit`、`capacity` 与 `[0, capacity)` 的每个字节全部一致。
impl PartialEq for DataBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.limit == other.limit
            && self.capacity == other.capacity
            && self.full_span() == other.full_span()
    }
}

impl Eq for DataBuffer {}

impl fmt::Debug for DataBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBuffer")
            .field("zone", &self.zone.label())
            .field("order", &self.order)
            .field("position", &self.position)
            .field("limit", &self.limit)
            .field("capacity", &self.capacity)
            .field("pooled", &self.is_pooled())
            .finish()
    }
}
