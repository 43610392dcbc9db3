use criterion::{Criterion, black_box};
use std::{env, time::Duration};

use flint_buffer::{BufferPool, DataBuffer, StreamReader};
use flint_core::ByteOrder;

/// 缓冲往返基准：池化取用、类型化写读、归还的整条热路径。
///
/// # 设计背景（Why）
/// - 池与游标是每条消息都要走一遍的路径，任何回归都会线性放大；
/// - 以 1 KiB 负载模拟典型协议帧，便于与历史数据对齐比较。
fn bench_pooled_roundtrip(c: &mut Criterion) {
    let pool = BufferPool::default();
    c.bench_function("pooled_roundtrip", |b| {
        b.iter(|| {
            let mut buffer = pool.acquire(1024).unwrap();
            for i in 0..128 {
                buffer.write_u64(i).unwrap();
            }
            buffer.reset_for_read();
            let mut sum = 0u64;
            while buffer.remaining() >= 8 {
                sum = sum.wrapping_add(buffer.read_u64().unwrap());
            }
            black_box(sum)
        });
    });
}

/// 流读取基准：同一负载分别走单分块零拷贝路径与跨分块合并路径，
/// 两者的差值就是合并复制的真实成本。
fn bench_stream_paths(c: &mut Criterion) {
    let payload = vec![0xA5u8; 1024];

    c.bench_function("stream_single_chunk", |b| {
        b.iter(|| {
            let mut reader = StreamReader::new(BufferPool::default());
            reader.append(DataBuffer::wrap(payload.clone(), ByteOrder::BigEndian));
            let out = reader.read_buffer(1024).unwrap();
            black_box(out.remaining())
        });
    });

    c.bench_function("stream_cross_chunk_merge", |b| {
        let pool = BufferPool::default();
        b.iter(|| {
            let mut reader = StreamReader::new(pool.clone());
            for piece in payload.chunks(96) {
                reader.append(DataBuffer::wrap(piece.to_vec(), ByteOrder::BigEndian));
            }
            let out = reader.read_buffer(1024).unwrap();
            black_box(out.remaining())
        });
    });
}

/// 模式比较基准：步长比较在长模式上的收益来自按字比较与前导零定位。
fn bench_pattern_probe(c: &mut Criterion) {
    let data = vec![0x42u8; 512];
    let mut pattern = data.clone();
    pattern[511] ^= 1;

    c.bench_function("peek_mismatch_last_byte", |b| {
        let mut reader = StreamReader::new(BufferPool::default());
        reader.append(DataBuffer::wrap(data.clone(), ByteOrder::BigEndian));
        b.iter(|| black_box(reader.peek_mismatch(&pattern)));
    });
}

fn main() {
    let mut quick_mode = false;
    for arg in env::args().skip(1) {
        if arg == "--quick" {
            quick_mode = true;
        }
    }

    let mut criterion = Criterion::default();
    if quick_mode {
        criterion = criterion
            .sample_size(10)
            .warm_up_time(Duration::from_millis(100))
            .measurement_time(Duration::from_millis(250));
    }

    bench_pooled_roundtrip(&mut criterion);
    bench_stream_paths(&mut criterion);
    bench_pattern_probe(&mut criterion);
    criterion.final_summary();
}
