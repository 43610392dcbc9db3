#![cfg_attr(not(feature = "std"), no_std)]

//! `flint-buffer` 落地缓冲基底的全部实体类型。
//!
//! # 模块定位（Why）
//! - 为 `flint-core` 的区域与区位契约提供具体实现：托管堆、堆外、
//!   共享字节三种内建区域，外加调用方自定义区域的接入点。
//! - 面向协议解码的三件套在此汇合：类型化游标缓冲 [`DataBuffer`]、
//!   容量分桶回收池 [`BufferPool`]、分块零拷贝流读取器 [`StreamReader`]。
//!
//! # 设计概要（How）
//! - `region` 模块以封闭变体集合实现 `flint-core::RawRegion`，
//!   核心路径只经由能力接口分发；
//! - `buffer` 模块把“游标 + 字节序 + 零拷贝切片/转换”收敛为单一可变值，
//!   并经 `RegionRecycler` 钩子在 `Drop` 阶段对接池回收；
//! - `stream` 模块在分块队列之上提供快慢路径分明的逻辑流游标，
//!   跨分块合并的目标缓冲取自注入的池。
//!
//! # 命名约定（Consistency）
//! - 延续 `flint-core` 的术语：`Region`/`Zone`/`Order`，
//!   读写两种游标模式统一称 READ / WRITE，避免调用端二次翻译。

extern crate alloc;

mod buffer;
mod native;
mod pool;
mod region;
mod stream;

pub use buffer::{DataBuffer, RegionRecycler};
pub use native::{NativeData, NativeDataMut};
pub use pool::{BufferPool, PoolConfig, PoolStats};
pub use region::{HeapRegion, NativeRegion, Region, SharedRegion};
pub use stream::StreamReader;
