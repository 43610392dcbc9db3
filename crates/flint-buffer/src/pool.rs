use alloc::collections::BTreeMap;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use spin::Mutex;

use flint_core::{AllocationZone, ByteOrder, FlintError, RawRegion, Result, codes};

use crate::buffer::{DataBuffer, RegionRecycler};
use crate::region::Region;

/// 池的装配参数。
///
/// `max_idle_per_bucket` 限制单一容量桶的闲置存量，超额归还直接释放，
/// 防止一次突发流量把峰值内存永久钉在池里。
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// 池签发缓冲的分配区位。
    pub zone: AllocationZone,
    /// 池签发缓冲的默认字节序。
    pub order: ByteOrder,
    /// 每个容量桶保留的最大闲置区域数。
    pub max_idle_per_bucket: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            zone: AllocationZone::Heap,
            order: ByteOrder::BigEndian,
            max_idle_per_bucket: 64,
        }
    }
}

/// 池行为的一次性统计快照，字段间不保证原子一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// 累计新分配的存储区域数。
    pub allocated: u64,
    /// 累计从闲置桶复用的次数。
    pub reused: u64,
    /// 累计成功归还（重新上架）的次数。
    pub recycled: u64,
    /// 因切片别名仍存活而无法上架、仅计数放行的次数。
    pub lost: u64,
    /// 因桶已满而直接释放的归还次数。
    pub discarded: u64,
    /// 当前在外流通的池签发缓冲数。
    pub outstanding: usize,
    /// 当前闲置待复用的区域总数。
    pub idle: usize,
}

/// `BufferPool` 按容量分桶回收存储区域，摊薄热路径上的分配成本。
///
/// # 模块角色（Why）
/// - 分块流处理的每个分块都是一次缓冲分配；池把这些短命分配折叠成
///   自由链表的取还，是吞吐敏感路径的主要去分配手段。
/// - 归还走 [`DataBuffer`] 的 `Drop` 租约而非显式调用，分块被流读取器
///   排空丢弃时容量自动回流。
///
/// # 核心机制（How）
/// - `spin::Mutex<BTreeMap<容量, Vec<Arc<Region>>>>` 维护按**精确容量**
///   分桶的自由链表；取用只命中同容量桶，避免“大块配小活”的内存放大；
/// - 归还与复用两端都以 `Arc` 强引用计数判定存储是否仍被切片别名：
///   归还侧计数大于 2（回收钩子的克隆 + 缓冲自身）说明有切片存活，
///   只能计入 `lost` 放行；复用侧再次确认计数为 1 才签发；
/// - `PoolMetrics` 全部走 `Relaxed` 原子计数，快照仅用于观测。
///
/// # 契约说明（What）
/// - **线程安全**：池可克隆、可跨线程共享；单个缓冲仍是单一所有者值；
/// - **后置条件**：`acquire(len)` 返回写模式缓冲，`capacity == len`，
///   内容为既往复用残留，调用方按写模式覆盖后使用；
/// - 显式 `release` 只接受本池签发的缓冲，异池归还返回
///   `pool.foreign_release` 且不产生任何回收副作用。
///
/// # 设计权衡（Trade-offs）
/// - 自旋锁沿用缓冲层“临界区极短”的前提，不引入操作系统互斥量；
/// - 别名存活导致的 `lost` 是统计性降级而非错误：正确性不受影响，
///   只是那块存储脱离了池的管辖。
#[derive(Clone)]
pub struct BufferPool {
    shared: Arc<PoolShared>,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl BufferPool {
    /// 按配置装配一个空池。
    pub fn new(config: PoolConfig) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                config,
                buckets: Mutex::new(BTreeMap::new()),
                metrics: PoolMetrics::default(),
            }),
        }
    }

    /// 取用一个容量精确为 `len` 的写模式缓冲。
    ///
    /// 优先复用同容量闲置区域，未命中时按池区位新分配；
    /// 复用内容不清零，写模式游标保证调用方先写后读。
    pub fn acquire(&self, len: usize) -> Result<DataBuffer> {
        let region = match self.shared.checkout(len) {
            Some(region) => {
                self.shared.metrics.reused.fetch_add(1, Ordering::Relaxed);
                region
            }
            None => {
                let region = Region::allocate(&self.shared.config.zone, len)?;
                self.shared.metrics.allocated.fetch_add(1, Ordering::Relaxed);
                region
            }
        };
        self.shared.metrics.outstanding.fetch_add(1, Ordering::Relaxed);
        let recycler: Arc<dyn RegionRecycler> = self.shared.clone();
        Ok(DataBuffer::pooled(
            region,
            self.shared.config.zone.clone(),
            self.shared.config.order,
            recycler,
        ))
    }

    /// 显式归还一个池签发缓冲。
    ///
    /// 按值接收即消耗所有权，同一缓冲无法归还第二次。
    /// 异池（或非池）缓冲返回 `pool.foreign_release`，本池统计不受影响；
    /// 缓冲自身仍按其原有租约释放（各回各家）。
    pub fn release(&self, buffer: DataBuffer) -> Result<()> {
        let ours = Arc::as_ptr(&self.shared) as *const ();
        match buffer.lease_identity() {
            Some(identity) if identity == ours => Ok(()),
            _ => Err(FlintError::new(
                codes::POOL_FOREIGN_RELEASE,
                "缓冲并非本池签发，拒绝归还",
            )),
        }
    }

    /// 清空全部闲置桶，返回被释放的区域数。
    pub fn release_all(&self) -> usize {
        let mut buckets = self.shared.buckets.lock();
        let drained: usize = buckets.values().map(Vec::len).sum();
        buckets.clear();
        drained
    }

    /// 读取统计快照。
    pub fn stats(&self) -> PoolStats {
        self.shared.snapshot()
    }
}

impl fmt::Debug for BufferPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("zone", &self.shared.config.zone.label())
            .field("stats", &self.shared.snapshot())
            .finish()
    }
}

struct PoolShared {
    config: PoolConfig,
    buckets: Mutex<BTreeMap<usize, Vec<Arc<Region>>>>,
    metrics: PoolMetrics,
}

impl PoolShared {
    /// 从同容量桶取出一块确认无别名的区域。
    fn checkout(&self, len: usize) -> Option<Arc<Region>> {
        let mut buckets = self.buckets.lock();
        let bucket = buckets.get_mut(&len)?;
        while let Some(region) = bucket.pop() {
            // 上架后又冒出的别名（归还窗口内克隆的切片）在此兜底剔除。
            if Arc::strong_count(&region) == 1 {
                if bucket.is_empty() {
                    buckets.remove(&len);
                }
                return Some(region);
            }
            self.metrics.lost.fetch_add(1, Ordering::Relaxed);
        }
        buckets.remove(&len);
        None
    }

    fn snapshot(&self) -> PoolStats {
        let idle = self.buckets.lock().values().map(Vec::len).sum();
        PoolStats {
            allocated: self.metrics.allocated.load(Ordering::Relaxed),
            reused: self.metrics.reused.load(Ordering::Relaxed),
            recycled: self.metrics.recycled.load(Ordering::Relaxed),
            lost: self.metrics.lost.load(Ordering::Relaxed),
            discarded: self.metrics.discarded.load(Ordering::Relaxed),
            outstanding: self.metrics.outstanding.load(Ordering::Relaxed),
            idle,
        }
    }
}

impl RegionRecycler for PoolShared {
    fn reclaim(&self, region: Arc<Region>) {
        decrease_outstanding(&self.metrics.outstanding);
        // 此刻持有者应只剩回收钩子的克隆与正在析构的缓冲两份引用；
        // 更多引用意味着零拷贝切片仍指着这块存储，不能重新签发。
        if Arc::strong_count(&region) > 2 {
            self.metrics.lost.fetch_add(1, Ordering::Relaxed);
            return;
        }
        let len = region.len();
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(len).or_default();
        if bucket.len() >= self.config.max_idle_per_bucket {
            self.metrics.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        }
        bucket.push(region);
        self.metrics.recycled.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Default)]
struct PoolMetrics {
    allocated: AtomicU64,
    reused: AtomicU64,
    recycled: AtomicU64,
    lost: AtomicU64,
    discarded: AtomicU64,
    outstanding: AtomicUsize,
}

fn decrease_outstanding(target: &AtomicUsize) {
    let _ = target.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |prev| {
        Some(prev.saturating_sub(1))
    });
}
