/// `RawRegion` 定义存储后端必须提供的原始能力面。
///
/// # 设计背景（Why）
/// - 缓冲游标（position/limit/capacity）与类型化读写属于上层的统一逻辑，
///   真正随运行时变化的只有“一段可寻址字节”的获取方式：托管堆、堆外分配、
///   跨进程映射，乃至调用方自带的存储。
/// - 内建后端构成封闭变体集合，经由本 trait 的能力面统一派发；
///   `AllocationZone::Custom` 则以 `Arc<dyn RawRegion>` 接纳外部后端，
///   封闭集合之外的扩展不需要修改核心。
///
/// # 契约说明（What）
/// - **`len`**：区域字节数，构造后不变（缓冲容量固定由此而来）；
/// - **`as_ptr`**：区域首字节的只读指针，在区域存活期间始终有效；
/// - **`as_mut_ptr`**：可写指针；只读后端（如包装的共享字节序列）返回 `None`，
///   上层据此将变更请求映射为 `buffer.read_only` 错误；
/// - **`native_address`**：堆外 / 原生内存后端返回可交给本地 I/O 的地址，
///   托管堆返回 `None`，上层据此决定原生视图转换走零拷贝还是复制路径；
/// - **`is_shared_memory`**：跨进程共享能力标志，默认 `false`。
///
/// # 安全契约（Safety）
/// - 实现必须保证两个指针在 `self` 存活期间指向同一段至少 `len` 字节的内存；
/// - 内存的并发纪律由上层的单一所有者契约约束：任一时刻最多一个逻辑所有者
///   发起写入，实现本身不要求内部同步。
pub trait RawRegion: Send + Sync + 'static {
    /// 区域字节数，构造后恒定。
    fn len(&self) -> usize;

    /// 区域首字节的只读指针。
    fn as_ptr(&self) -> *const u8;

    /// 可写指针；只读后端返回 `None`。
    fn as_mut_ptr(&self) -> Option<*mut u8>;

    /// 堆外 / 原生内存后端的本地地址；托管后端返回 `None`。
    fn native_address(&self) -> Option<usize> {
        None
    }

    /// 是否具备跨进程共享能力。
    fn is_shared_memory(&self) -> bool {
        false
    }

    /// 区域是否为空。
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
