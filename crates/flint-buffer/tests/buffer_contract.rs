//! `buffer_contract` 集成测试：从外部 crate 视角验证 `DataBuffer` 的游标契约。
//!
//! # 测试目标（Why）
//! - 游标不变量、两种模式的切换语义、类型化读写与切片/转换的零拷贝规则
//!   是上层编解码的全部地基，任何回归都会以“解出错数据”的形式远端爆炸；
//! - 三个转换操作的“位置不变性”是硬性契约而非优化细节，单独成组验证。
//!
//! # 结构安排（How）
//! - 游标与模式：`cursor_bounds_are_validated`、`reset_switches_regimes`；
//! - 转换族：`conversions_preserve_cursor`、`to_byte_array_zero_copy_identity`;
//! - 区位族：堆外地址暴露、共享内存降级、自定义区域工厂注入；
//! - 批量助手：`xor_mask_matches_reference_convention` 以预先算好的
//!   字节串校验掩码约定的逐字节一致性。

use std::borrow::Cow;
use std::sync::Arc;

use flint_buffer::{DataBuffer, HeapRegion, Region};
use flint_core::{
    AllocationZone, ByteOrder, RawRegion, Result, RegionFactory, TextEncoding, codes,
};

/// 填好负载并翻转为读模式的便捷构造。
fn readable(data: &[u8], order: ByteOrder) -> DataBuffer {
    DataBuffer::wrap(data.to_vec(), order)
}

#[test]
fn cursor_bounds_are_validated() {
    let mut buffer = DataBuffer::heap(8, ByteOrder::BigEndian);
    assert_eq!(buffer.capacity(), 8);
    assert_eq!(buffer.limit(), 8, "写模式下 limit 等于容量");

    let err = buffer.set_limit(9).unwrap_err();
    assert_eq!(err.code(), codes::BUFFER_INDEX_OUT_OF_RANGE);

    buffer.set_position(5).expect("界内移动");
    let err = buffer.set_position(9).unwrap_err();
    assert_eq!(err.code(), codes::BUFFER_INDEX_OUT_OF_RANGE);
    assert_eq!(buffer.position(), 5, "失败的移动不得改变游标");

    // limit 收缩时游标随之下调，维持 position <= limit。
    buffer.set_limit(3).expect("收缩 limit");
    assert_eq!(buffer.position(), 3);
}

#[test]
fn reset_switches_regimes() {
    let mut buffer = DataBuffer::heap(16, ByteOrder::BigEndian);
    buffer.write_u64(42).expect("写入");
    buffer.reset_for_read();
    assert_eq!((buffer.position(), buffer.limit()), (0, 8));

    buffer.reset_for_write();
    assert_eq!((buffer.position(), buffer.limit()), (0, 16));
}

/// 两种字节序下，byte/short/int/long 的写读往返必须逐值还原。
#[test]
fn typed_roundtrip_in_both_orders() {
    for order in [ByteOrder::BigEndian, ByteOrder::LittleEndian] {
        let mut buffer = DataBuffer::heap(64, order);
        buffer.write_u8(0x7F).expect("u8");
        buffer.write_i16(-513).expect("i16");
        buffer.write_u32(0xCAFE_BABE).expect("u32");
        buffer.write_i64(i64::MIN + 7).expect("i64");
        buffer.write_f64(1234.5678).expect("f64");

        buffer.reset_for_read();
        assert_eq!(buffer.read_u8().expect("u8"), 0x7F);
        assert_eq!(buffer.read_i16().expect("i16"), -513);
        assert_eq!(buffer.read_u32().expect("u32"), 0xCAFE_BABE);
        assert_eq!(buffer.read_i64().expect("i64"), i64::MIN + 7);
        assert_eq!(buffer.read_f64().expect("f64"), 1234.5678);
    }
}

/// 三个转换操作前后 position/limit 必须逐位一致（硬性契约）。
#[test]
fn conversions_preserve_cursor() {
    let mut buffer = readable(b"conversion payload", ByteOrder::BigEndian);
    buffer.advance(4).expect("制造非零 position");
    let before = (buffer.position(), buffer.limit());

    let _ = buffer.to_byte_array();
    assert_eq!((buffer.position(), buffer.limit()), before);

    let _ = buffer.to_native_data();
    assert_eq!((buffer.position(), buffer.limit()), before);

    let _ = buffer.to_native_data_mut();
    assert_eq!((buffer.position(), buffer.limit()), before);
}

#[test]
fn to_byte_array_zero_copy_identity() {
    let buffer = readable(b"whole window", ByteOrder::BigEndian);
    match buffer.to_byte_array() {
        Cow::Borrowed(view) => {
            assert_eq!(view, b"whole window");
            // 借用视图与缓冲窗口指向同一存储。
            assert_eq!(view.as_ptr(), buffer.window().as_ptr());
        }
        Cow::Owned(_) => panic!("整窗托管缓冲必须走零拷贝路径"),
    }

    let mut offset = readable(b"whole window", ByteOrder::BigEndian);
    offset.advance(6).expect("推进");
    match offset.to_byte_array() {
        Cow::Owned(copy) => assert_eq!(copy, b"window"),
        Cow::Borrowed(_) => panic!("非整窗导出必须复制"),
    }
}

#[test]
fn direct_zone_exposes_native_address() {
    let buffer = DataBuffer::allocate(32, AllocationZone::Direct, ByteOrder::BigEndian)
        .expect("堆外分配");
    let address = buffer.native_address().expect("堆外缓冲必有本地地址");
    assert_ne!(address, 0);

    let heap = DataBuffer::heap(32, ByteOrder::BigEndian);
    assert!(heap.native_address().is_none(), "托管堆不暴露地址");
}

#[test]
fn shared_memory_zone_degrades_to_direct() {
    let buffer = DataBuffer::allocate(16, AllocationZone::SharedMemory, ByteOrder::BigEndian)
        .expect("共享内存区位分配");
    assert!(
        buffer.native_address().is_some(),
        "无跨进程映射支持时降级为堆外分配"
    );
}

/// 自定义区位经 `RegionFactory` 注入调用方自备的存储。
#[test]
fn custom_zone_dispatches_through_factory() {
    struct VecFactory;

    impl RegionFactory for VecFactory {
        fn allocate(&self, len: usize) -> Result<Arc<dyn RawRegion>> {
            Ok(Arc::new(Region::Heap(HeapRegion::zeroed(len))))
        }
    }

    let zone = AllocationZone::Custom(Arc::new(VecFactory));
    let mut buffer =
        DataBuffer::allocate(8, zone, ByteOrder::BigEndian).expect("自定义区位分配");
    buffer.write_u32(7).expect("写入");
    buffer.reset_for_read();
    assert_eq!(buffer.read_u32().expect("读取"), 7);
    assert!(!buffer.is_shared_memory(), "未声明共享能力的后端默认为否");
}

#[test]
fn indexed_access_ignores_limit_but_not_capacity() {
    let mut buffer = DataBuffer::heap(8, ByteOrder::BigEndian);
    buffer.write_u16(0xAAAA).expect("写入");
    buffer.reset_for_read();
    assert_eq!(buffer.limit(), 2);

    // 索引访问允许越过 limit，只按容量校验。
    buffer.put_u32(4, 0x0102_0304).expect("limit 之外的索引写");
    assert_eq!(buffer.get_u32(4).expect("索引读"), 0x0102_0304);
    assert_eq!(buffer.position(), 0, "索引访问不得推进游标");

    let err = buffer.get_u32(6).unwrap_err();
    assert_eq!(err.code(), codes::BUFFER_INDEX_OUT_OF_RANGE);
}

/// 与参照实现逐字节对齐的掩码校验：key 从 `mask_offset % 4` 开始滚动。
#[test]
fn xor_mask_matches_reference_convention() {
    let mut buffer = readable(&[0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF], ByteOrder::BigEndian);
    buffer
        .xor_mask([0x11, 0x22, 0x33, 0x44], 1)
        .expect("掩码");
    // key 对齐后为 [0x22, 0x33, 0x44, 0x11]，尾部两字节继续滚动。
    assert_eq!(
        buffer.window(),
        &[0x22, 0x33, 0x44, 0x11, 0xFF ^ 0x22, 0xFF ^ 0x33]
    );

    // 同参数再施加一次即还原，掩码是对合运算。
    buffer.xor_mask([0x11, 0x22, 0x33, 0x44], 1).expect("还原");
    assert_eq!(buffer.window(), &[0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF]);
}

#[test]
fn fill_index_of_and_equality_helpers() {
    let mut buffer = DataBuffer::heap(6, ByteOrder::BigEndian);
    buffer.fill(0xEE).expect("填充");
    buffer.put_u8(3, 0x0A).expect("植入目标字节");
    buffer.reset_for_read();
    buffer.set_limit(6).expect("覆盖全容量");

    assert_eq!(buffer.index_of(0x0A), Some(3));
    assert_eq!(buffer.index_of(0x0B), None);

    let same = readable(&[0xEE, 0xEE, 0xEE, 0x0A, 0xEE, 0xEE], ByteOrder::BigEndian);
    assert!(buffer.content_equals(&same));
    assert_eq!(buffer.mismatch(&same), None);

    let differs = readable(&[0xEE, 0xEE, 0xEE, 0x0B, 0xEE, 0xEE], ByteOrder::BigEndian);
    assert_eq!(buffer.mismatch(&differs), Some(3));

    let shorter = readable(&[0xEE, 0xEE], ByteOrder::BigEndian);
    assert_eq!(buffer.mismatch(&shorter), Some(2), "严格前缀返回较短长度");
}

#[test]
fn text_rejects_non_ascii_under_ascii_encoding() {
    let mut buffer = DataBuffer::heap(32, ByteOrder::BigEndian);
    let err = buffer.write_text("héllo", TextEncoding::Ascii).unwrap_err();
    assert_eq!(err.code(), codes::BUFFER_UNSUPPORTED_CONVERSION);
    assert_eq!(buffer.position(), 0, "失败的写入不得推进游标");

    buffer.write_text("héllo", TextEncoding::Utf8).expect("UTF-8 写入");
    buffer.reset_for_read();
    assert_eq!(
        buffer.read_text(TextEncoding::Utf8).expect("读取"),
        "héllo"
    );
}

#[test]
fn invalid_utf8_payload_fails_without_consuming() {
    let mut buffer = DataBuffer::heap(8, ByteOrder::BigEndian);
    buffer.write_u16(2).expect("长度前缀");
    buffer.write_bytes(&[0xC3, 0x28]).expect("非法 UTF-8 序列");
    buffer.reset_for_read();

    let err = buffer.read_text(TextEncoding::Utf8).unwrap_err();
    assert_eq!(err.code(), codes::BUFFER_TEXT_DECODE);
    assert_eq!(buffer.position(), 0);
}
