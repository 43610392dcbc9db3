/// 字节序策略，缓冲创建时固定、生命周期内不变。
///
/// # 设计背景（Why）
/// - 协议字段的字节序属于缓冲的创建期配置而非逐次调用参数：
///   解码一条消息时所有定宽整数共享同一字节序，逐调用传参只会制造不一致。
/// - 与运行时字节序无关：两种取值都显式按字节重组，不依赖宿主端序。
///
/// # 契约说明（What）
/// - `encode_*` / `decode_*` 对定宽整数与按位浮点执行无分配的字节重排；
/// - 浮点统一走 IEEE 754 位模式（`to_bits`/`from_bits`），不做数值转换。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    /// 网络字节序；协议场景的默认取值。
    #[default]
    BigEndian,
    LittleEndian,
}

macro_rules! order_codec {
    ($encode:ident, $decode:ident, $ty:ty, $n:literal) => {
        /// 按当前字节序编码为定宽字节数组。
        pub fn $encode(self, value: $ty) -> [u8; $n] {
            match self {
                ByteOrder::BigEndian => value.to_be_bytes(),
                ByteOrder::LittleEndian => value.to_le_bytes(),
            }
        }

        /// 按当前字节序从定宽字节数组解码。
        pub fn $decode(self, bytes: [u8; $n]) -> $ty {
            match self {
                ByteOrder::BigEndian => <$ty>::from_be_bytes(bytes),
                ByteOrder::LittleEndian => <$ty>::from_le_bytes(bytes),
            }
        }
    };
}

impl ByteOrder {
    order_codec!(encode_u16, decode_u16, u16, 2);
    order_codec!(encode_i16, decode_i16, i16, 2);
    order_codec!(encode_u32, decode_u32, u32, 4);
    order_codec!(encode_i32, decode_i32, i32, 4);
    order_codec!(encode_u64, decode_u64, u64, 8);
    order_codec!(encode_i64, decode_i64, i64, 8);

    /// 按 IEEE 754 位模式编码单精度浮点。
    pub fn encode_f32(self, value: f32) -> [u8; 4] {
        self.encode_u32(value.to_bits())
    }

    /// 按 IEEE 754 位模式解码单精度浮点。
    pub fn decode_f32(self, bytes: [u8; 4]) -> f32 {
        f32::from_bits(self.decode_u32(bytes))
    }

    /// 按 IEEE 754 位模式编码双精度浮点。
    pub fn encode_f64(self, value: f64) -> [u8; 8] {
        self.encode_u64(value.to_bits())
    }

    /// 按 IEEE 754 位模式解码双精度浮点。
    pub fn decode_f64(self, bytes: [u8; 8]) -> f64 {
        f64::from_bits(self.decode_u64(bytes))
    }
}
