#![cfg_attr(not(feature = "std"), no_std)]

//! `flint-core` 定义跨运行时二进制缓冲区基底的核心契约。
//!
//! # 模块定位（Why）
//! - 协议与编解码实现需要在托管堆、堆外内存、跨进程共享内存之间自由切换，
//!   却不应感知具体的分配与映射细节；本 crate 把这些差异收敛为一组稳定契约。
//! - 具体的缓冲实现（见 `flint-buffer`）只消费这里定义的能力面，
//!   使上层代码可以在不同存储后端之间零成本迁移。
//!
//! # 契约划分（How）
//! - [`error`]：稳定错误域，`<域>.<语义>` 错误码贯穿所有层；
//! - [`order`]：字节序策略，缓冲创建时固定；
//! - [`zone`]：分配区位策略（托管堆 / 堆外 / 共享内存 / 自定义工厂）；
//! - [`region`]：存储后端必须提供的原始能力面（长度、指针、原生地址、共享标志）；
//! - [`text`]：长度前缀文本所支持的编码集合。
//!
//! # 命名约定（Consistency）
//! - 缓冲游标相关术语（position/limit/capacity/remaining）沿用主流缓冲模型
//!   （Netty `ByteBuf`、NIO `ByteBuffer`、Tokio `bytes`）的通用词汇，
//!   避免引入仅此项目可懂的行话。

extern crate alloc;

pub mod error;
pub mod order;
pub mod region;
pub mod text;
pub mod zone;

pub use error::{FlintError, Result, codes};
pub use order::ByteOrder;
pub use region::RawRegion;
pub use text::TextEncoding;
pub use zone::{AllocationZone, RegionFactory};
