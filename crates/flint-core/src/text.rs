use alloc::format;
use alloc::string::String;

use crate::error::{FlintError, Result, codes};

/// 长度前缀文本支持的编码集合。
///
/// # 设计背景（Why）
/// - 缓冲层只内建协议场景最常见的两种编码：UTF-8（互联网协议默认）与
///   ASCII（遗留协议头部常见的七位子集）。完整字符集表属外部协作者，
///   不在核心范围内。
///
/// # 契约说明（What）
/// - `encode` 校验文本可被目标编码表示，失败返回
///   [`codes::BUFFER_UNSUPPORTED_CONVERSION`]，绝不写出半截数据；
/// - `decode` 校验字节序列对目标编码有效，失败返回
///   [`codes::BUFFER_TEXT_DECODE`]，与“数据不足”严格区分，
///   便于调用方选择降级路径。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextEncoding {
    #[default]
    Utf8,
    Ascii,
}

impl TextEncoding {
    /// 校验 `text` 可被当前编码表示，返回其字节视图。
    ///
    /// Rust 字符串本身即 UTF-8，因此两种编码都无需转码，只需校验。
    pub fn encode<'a>(self, text: &'a str) -> Result<&'a [u8]> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes()),
            TextEncoding::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes())
                } else {
                    Err(FlintError::new(
                        codes::BUFFER_UNSUPPORTED_CONVERSION,
                        "ASCII 编码无法表示非 ASCII 文本",
                    ))
                }
            }
        }
    }

    /// 校验并解码字节序列为 `String`。
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|err| {
                FlintError::new(
                    codes::BUFFER_TEXT_DECODE,
                    format!("字节序列不是有效 UTF-8：{err}"),
                )
            }),
            TextEncoding::Ascii => {
                if bytes.is_ascii() {
                    // ASCII 是 UTF-8 的子集，校验通过后按 UTF-8 路径构造。
                    TextEncoding::Utf8.decode(bytes)
                } else {
                    Err(FlintError::new(
                        codes::BUFFER_TEXT_DECODE,
                        "字节序列含 0x80 以上字节，不是有效 ASCII",
                    ))
                }
            }
        }
    }
}
