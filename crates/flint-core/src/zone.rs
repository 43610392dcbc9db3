use alloc::sync::Arc;
use core::fmt;

use crate::error::Result;
use crate::region::RawRegion;

/// 自定义分配工厂：`AllocationZone::Custom` 的扩展点。
///
/// # 设计背景（Why）
/// - 内建区位之外的存储策略（NUMA 绑定、大页、RDMA 注册内存等）差异过大，
///   不适合收进封闭集合；以工厂 trait 对象的形式交给调用方，
///   核心只消费其产物的 [`RawRegion`] 能力面。
///
/// # 契约说明（What）
/// - **前置条件**：实现必须线程安全（`Send + Sync`），且返回区域的 `len()`
///   恰好等于请求的 `len`——缓冲容量由此固定，不允许“多给”；
/// - **后置条件**：返回的区域在其 `Arc` 存活期间保持指针有效。
pub trait RegionFactory: Send + Sync + 'static {
    /// 分配一个恰好 `len` 字节的存储区域。
    fn allocate(&self, len: usize) -> Result<Arc<dyn RawRegion>>;
}

/// 分配区位策略：缓冲创建时选定存储后端的不透明能力标签。
///
/// # 设计背景（Why）
/// - 核心把区位当作**配置**而非实现：同一套游标与类型化读写逻辑，
///   按区位落到不同后端上，上层协议代码完全无感。
///
/// # 契约说明（What）
/// - `Heap`：托管堆字节序列，由分配器 / 回收器治理；
/// - `Direct`：堆外原生内存，可取得本地地址以支撑零拷贝原生 I/O；
/// - `SharedMemory`：跨进程共享内存；当前运行时未内建映射支持时
///   回退为 `Direct`（真实的跨进程后端属外部协作者，经 `Custom` 注入）；
/// - `Custom`：调用方自带的分配工厂。
#[derive(Clone, Default)]
pub enum AllocationZone {
    #[default]
    Heap,
    Direct,
    SharedMemory,
    Custom(Arc<dyn RegionFactory>),
}

impl AllocationZone {
    /// 区位标签名，供统计与排障输出使用。
    pub fn label(&self) -> &'static str {
        match self {
            AllocationZone::Heap => "heap",
            AllocationZone::Direct => "direct",
            AllocationZone::SharedMemory => "shared_memory",
            AllocationZone::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for AllocationZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
