//! `pool_contract` 集成测试：验证 `BufferPool` 在公开 API 下的取还协议。
//!
//! # 测试目标（Why）
//! - 回收路径一旦失效，池会退化成纯分配器且毫无征兆，只能靠统计与
//!   复用痕迹在测试里钉死；
//! - 显式 `release` 与 Drop 租约两条归还路径必须汇入同一套统计。
//!
//! # 结构安排（How）
//! - `acquire_release_acquire_reuses_the_same_storage`：以残留字节证明
//!   第二次取用命中了同一块存储，且游标已重置为写模式；
//! - 其余用例覆盖异池归还、堆外池、切片别名降级与整池排空。

use flint_buffer::{BufferPool, PoolConfig};
use flint_core::{AllocationZone, ByteOrder, codes};

/// 先写入标记、归还，再取用同容量缓冲：命中同一块存储时标记仍在。
#[test]
fn acquire_release_acquire_reuses_the_same_storage() {
    let pool = BufferPool::default();
    let mut first = pool.acquire(32).expect("首次取用");
    first.write_bytes(b"MARK").expect("写入标记");
    pool.release(first).expect("归还");

    let second = pool.acquire(32).expect("二次取用");
    assert_eq!((second.position(), second.limit()), (0, 32), "写模式重置");
    let mut marker = [0u8; 4];
    for (i, byte) in marker.iter_mut().enumerate() {
        *byte = second.get_u8(i).expect("读取残留");
    }
    assert_eq!(&marker, b"MARK", "复用的是同一块存储");

    let stats = pool.stats();
    assert_eq!(stats.allocated, 1);
    assert_eq!(stats.reused, 1);
}

#[test]
fn foreign_release_fails_and_buffer_still_goes_home() {
    let issuer = BufferPool::default();
    let stranger = BufferPool::default();

    let buffer = issuer.acquire(16).expect("取用");
    let err = stranger.release(buffer).unwrap_err();
    assert_eq!(err.code(), codes::POOL_FOREIGN_RELEASE);

    // 拒收不没收：缓冲仍按自己的租约回到签发池。
    assert_eq!(issuer.stats().recycled, 1);
    assert_eq!(stranger.stats().recycled, 0);
}

/// 堆外池签发的缓冲携带可观测的本地地址，复用同样成立。
#[test]
fn direct_zone_pool_issues_addressable_buffers() {
    let pool = BufferPool::new(PoolConfig {
        zone: AllocationZone::Direct,
        order: ByteOrder::BigEndian,
        ..PoolConfig::default()
    });
    let address = {
        let buffer = pool.acquire(64).expect("取用");
        buffer.native_address().expect("堆外缓冲必有地址")
    };
    let again = pool.acquire(64).expect("复用");
    assert_eq!(
        again.native_address().expect("堆外缓冲必有地址"),
        address,
        "复用命中同一块堆外存储"
    );
}

#[test]
fn live_slice_blocks_recycling() {
    let pool = BufferPool::default();
    let mut buffer = pool.acquire(8).expect("取用");
    buffer.write_bytes(&[9; 8]).expect("填充");
    buffer.reset_for_read();
    let slice = buffer.slice();

    pool.release(buffer).expect("归还");
    let stats = pool.stats();
    assert_eq!(stats.lost, 1, "别名存活的存储只计数放行");
    assert_eq!(stats.idle, 0);

    // 存储的生命期由切片接管，内容持续有效。
    assert_eq!(slice.window(), &[9; 8]);
}

#[test]
fn release_all_is_the_terminal_drain() {
    let pool = BufferPool::new(PoolConfig {
        zone: AllocationZone::Direct,
        order: ByteOrder::BigEndian,
        ..PoolConfig::default()
    });
    drop(pool.acquire(8).expect("取用"));
    drop(pool.acquire(8).expect("取用"));
    drop(pool.acquire(24).expect("取用"));

    let drained = pool.release_all();
    assert!(drained >= 2, "至少两块闲置存储被释放");
    assert_eq!(pool.stats().idle, 0);
}
