use alloc::alloc::{Layout, alloc_zeroed, dealloc};
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::ptr::NonNull;

use bytes::Bytes;
use flint_core::{AllocationZone, RawRegion, Result};

/// `Region` 是内建存储后端的封闭变体集合。
///
/// # 设计背景（Why）
/// - 缓冲游标逻辑对所有后端一视同仁，唯一的差异点是“这段字节从哪来、
///   能不能写、有没有本地地址”。把差异收敛为一个封闭枚举，
///   游标层只经由 [`RawRegion`] 能力面派发，新增后端不影响上层语义。
/// - `Custom` 变体以 `Arc<dyn RawRegion>` 接纳外部后端（NUMA、大页、真实
///   跨进程映射等），封闭集合之外的扩展无需改动本模块。
///
/// # 并发纪律（Safety）
/// - 区域内容的互斥由上层的单一所有者契约保证：任一时刻最多一个逻辑所有者
///   通过 `&mut DataBuffer` 发起写入，切片只做读取。本模块只负责
///   指针在区域存活期间的有效性，不提供内部同步。
pub enum Region {
    Heap(HeapRegion),
    Native(NativeRegion),
    Shared(SharedRegion),
    Custom(Arc<dyn RawRegion>),
}

impl Region {
    /// 按区位策略分配恰好 `len` 字节的区域。
    ///
    /// `SharedMemory` 在当前运行时没有内建跨进程映射，回退为堆外分配；
    /// 真实的共享内存后端经 `AllocationZone::Custom` 注入。
    pub fn allocate(zone: &AllocationZone, len: usize) -> Result<Arc<Region>> {
        Ok(match zone {
            AllocationZone::Heap => Arc::new(Region::Heap(HeapRegion::zeroed(len))),
            AllocationZone::Direct | AllocationZone::SharedMemory => {
                Arc::new(Region::Native(NativeRegion::allocate(len)))
            }
            AllocationZone::Custom(factory) => Arc::new(Region::Custom(factory.allocate(len)?)),
        })
    }

    /// 是否为“托管字节序列”后端（决定 `to_byte_array` 的零拷贝资格）。
    pub fn is_managed(&self) -> bool {
        matches!(self, Region::Heap(_) | Region::Shared(_))
    }
}

impl RawRegion for Region {
    fn len(&self) -> usize {
        match self {
            Region::Heap(region) => region.len(),
            Region::Native(region) => region.len(),
            Region::Shared(region) => region.len(),
            Region::Custom(region) => region.len(),
        }
    }

    fn as_ptr(&self) -> *const u8 {
        match self {
            Region::Heap(region) => region.as_ptr(),
            Region::Native(region) => region.as_ptr(),
            Region::Shared(region) => region.as_ptr(),
            Region::Custom(region) => region.as_ptr(),
        }
    }

    fn as_mut_ptr(&self) -> Option<*mut u8> {
        match self {
            Region::Heap(region) => region.as_mut_ptr(),
            Region::Native(region) => region.as_mut_ptr(),
            Region::Shared(region) => region.as_mut_ptr(),
            Region::Custom(region) => region.as_mut_ptr(),
        }
    }

    fn native_address(&self) -> Option<usize> {
        match self {
            Region::Heap(_) | Region::Shared(_) => None,
            Region::Native(region) => region.native_address(),
            Region::Custom(region) => region.native_address(),
        }
    }

    fn is_shared_memory(&self) -> bool {
        match self {
            Region::Custom(region) => region.is_shared_memory(),
            _ => false,
        }
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Region::Heap(_) => "Region::Heap",
            Region::Native(_) => "Region::Native",
            Region::Shared(_) => "Region::Shared",
            Region::Custom(_) => "Region::Custom",
        };
        write!(f, "{label}(len = {})", RawRegion::len(self))
    }
}

/// 托管堆区域：一段定长的堆上字节序列。
///
/// 内部以裸指针持有 `Box<[u8]>` 的所有权，使多个零拷贝视图（父缓冲与其切片）
/// 可以经 `Arc<Region>` 共享同一段可写存储；`Box` 的独占借用模型无法表达
/// 这种受契约约束的别名共享。
pub struct HeapRegion {
    ptr: NonNull<u8>,
    len: usize,
}

impl HeapRegion {
    /// 分配 `len` 字节并清零。
    pub fn zeroed(len: usize) -> Self {
        Self::from_boxed(vec![0u8; len].into_boxed_slice())
    }

    /// 零拷贝接管既有字节的所有权。
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::from_boxed(data.into_boxed_slice())
    }

    fn from_boxed(boxed: Box<[u8]>) -> Self {
        let len = boxed.len();
        let raw = Box::into_raw(boxed);
        // SAFETY: `Box::into_raw` 产出的指针非空，且在重新装箱前始终有效。
        let ptr = unsafe { NonNull::new_unchecked(raw.cast::<u8>()) };
        Self { ptr, len }
    }
}

impl Drop for HeapRegion {
    fn drop(&mut self) {
        // SAFETY: `ptr`/`len` 来自 `Box::into_raw`，此处重新装箱归还所有权，
        // 且 `Drop` 保证只执行一次。
        unsafe {
            drop(Box::from_raw(core::ptr::slice_from_raw_parts_mut(
                self.ptr.as_ptr(),
                self.len,
            )));
        }
    }
}

// SAFETY: 区域仅是一段定长字节的所有权载体，跨线程移动与共享本身不构成
// 数据竞争；内容写入的互斥由上层单一所有者契约保证（见模块文档）。
unsafe impl Send for HeapRegion {}
unsafe impl Sync for HeapRegion {}

impl RawRegion for HeapRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    fn as_mut_ptr(&self) -> Option<*mut u8> {
        Some(self.ptr.as_ptr())
    }
}

/// 堆外区域：绕过托管分配器的原生内存块，可取得供本地 I/O 使用的地址。
pub struct NativeRegion {
    ptr: NonNull<u8>,
    len: usize,
}

/// 堆外分配的对齐粒度；与常见本地 I/O 接口的最小对齐要求一致。
const NATIVE_ALIGN: usize = 8;

impl NativeRegion {
    /// 分配 `len` 字节的堆外内存并清零。
    ///
    /// 容量受 `isize::MAX` 约束；越界属于调用方缺陷，直接快速失败。
    pub fn allocate(len: usize) -> Self {
        if len == 0 {
            return Self {
                ptr: NonNull::dangling(),
                len: 0,
            };
        }
        let layout = Layout::from_size_align(len, NATIVE_ALIGN).expect("分配大小超出平台上限");
        // SAFETY: `layout` 非零尺寸；分配失败由 `handle_alloc_error` 终止。
        let raw = unsafe { alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw) else {
            alloc::alloc::handle_alloc_error(layout)
        };
        Self { ptr, len }
    }
}

impl Drop for NativeRegion {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        // SAFETY: `ptr` 由相同 layout 的 `alloc_zeroed` 产出，仅释放一次。
        unsafe {
            dealloc(
                self.ptr.as_ptr(),
                Layout::from_size_align(self.len, NATIVE_ALIGN).expect("布局与分配时一致"),
            );
        }
    }
}

// SAFETY: 同 `HeapRegion`——所有权载体本身无共享可变状态，
// 写入互斥由上层契约保证。
unsafe impl Send for NativeRegion {}
unsafe impl Sync for NativeRegion {}

impl RawRegion for NativeRegion {
    fn len(&self) -> usize {
        self.len
    }

    fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    fn as_mut_ptr(&self) -> Option<*mut u8> {
        Some(self.ptr.as_ptr())
    }

    fn native_address(&self) -> Option<usize> {
        Some(self.ptr.as_ptr() as usize)
    }
}

/// 只读共享区域：对 `bytes::Bytes` 的零拷贝包装。
///
/// 网络栈的读取结果天然以 `Bytes` 形态到达；直接包装即可进入缓冲契约，
/// 代价是失去写能力——`as_mut_ptr` 返回 `None`，上层会把写请求映射为
/// `buffer.read_only` 错误。
pub struct SharedRegion {
    bytes: Bytes,
}

impl SharedRegion {
    /// 零拷贝包装一段只读共享字节。
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl RawRegion for SharedRegion {
    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn as_ptr(&self) -> *const u8 {
        self.bytes.as_ptr()
    }

    fn as_mut_ptr(&self) -> Option<*mut u8> {
        None
    }
}
