use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use core::error::Error;
use core::fmt;

/// `FlintError` 是缓冲基底全部可观察错误的最终形态。
///
/// # 设计背景（Why）
/// - 缓冲层的失败语义很少：要么是“数据还不够”（可恢复，等待更多输入即可），
///   要么是编程错误（越界、溢出），要么是能力缺失（只读存储、编码不支持）。
///   用稳定字符串错误码区分这些语义，调用方无需解析消息文本即可决策。
/// - 需要兼容 `no_std + alloc` 场景，因此不依赖 `std::error::Error`，
///   而是基于 `core::error::Error` 构建轻量错误链。
///
/// # 契约说明（What）
/// - `code`：`'static` 稳定错误码，遵循 `<域>.<语义>` 约定（见 [`codes`]）；
/// - `message`：面向排障人员的描述，不承载机读语义；
/// - `cause`：可选底层原因，通过 `source()` 暴露完整链路。
///
/// # 设计取舍（Trade-offs）
/// - 消息采用 `Cow<'static, str>`：静态文案零分配，动态上下文才触发堆分配；
/// - 不内置重试建议或分类矩阵——缓冲层唯一可恢复的错误是
///   [`codes::STREAM_INSUFFICIENT_DATA`]，用 [`Self::is_insufficient_data`]
///   判定即可，其余一律视为调用方缺陷，快速失败。
#[derive(Debug)]
pub struct FlintError {
    code: &'static str,
    message: Cow<'static, str>,
    cause: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl FlintError {
    /// 以稳定错误码与描述构造错误。
    ///
    /// # 契约
    /// - **前置条件**：`code` 必须来自 [`codes`] 模块或遵循 `<域>.<语义>` 约定；
    /// - **后置条件**：返回值拥有独立所有权，`Send + Sync + 'static`，初始不含 `cause`。
    pub fn new(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// 附带底层原因并返回新错误，保持 `source()` 链路可回溯。
    pub fn with_cause(mut self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// 构造“可读数据不足”错误，携带请求量与实际量，便于解码器打印差额。
    ///
    /// 这是缓冲层唯一约定为可恢复的错误：调用方在取得更多输入后重试即可，
    /// 任何返回该错误的操作都保证未推进任何游标。
    pub fn insufficient_data(requested: usize, available: usize) -> Self {
        Self::new(
            codes::STREAM_INSUFFICIENT_DATA,
            format!("需要 {requested} 字节，当前仅有 {available} 字节可读"),
        )
    }

    /// 构造“索引越界”错误：position/limit/索引访问落在 `[0, capacity]` 之外。
    pub fn index_out_of_range(what: &'static str, value: usize, capacity: usize) -> Self {
        Self::new(
            codes::BUFFER_INDEX_OUT_OF_RANGE,
            format!("{what} = {value} 超出容量上界 {capacity}"),
        )
    }

    /// 构造“写入溢出”错误：游标写请求超出 `limit`，缓冲容量固定、从不静默扩容。
    pub fn overflow(requested: usize, writable: usize) -> Self {
        Self::new(
            codes::BUFFER_OVERFLOW,
            format!("写入 {requested} 字节超出剩余可写空间 {writable}"),
        )
    }

    /// 判定当前错误是否为可恢复的“数据不足”。
    pub fn is_insufficient_data(&self) -> bool {
        self.code == codes::STREAM_INSUFFICIENT_DATA
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 获取描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 获取底层原因。
    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }
}

impl fmt::Display for FlintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for FlintError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_ref()
            .map(|boxed| boxed.as_ref() as &(dyn Error + 'static))
    }
}

/// 统一返回值别名，默认错误类型为 [`FlintError`]。
pub type Result<T, E = FlintError> = core::result::Result<T, E>;

/// 缓冲基底的稳定错误码集合。
///
/// # 设计背景（Why）
/// - 错误码是调用方分支决策的唯一依据：协议解码器只关心
///   [`STREAM_INSUFFICIENT_DATA`]（等更多字节），其余码值统一按致命错误上抛。
/// - 码值遵循 `<域>.<语义>` 命名，便于在跨组件日志中检索与聚合。
///
/// # 契约说明（What）
/// - 码值一经发布即冻结；新增语义必须新增码值，不得复用既有码值。
pub mod codes {
    /// 读 / 预读 / 跳过请求的字节数超过当前可用量；可恢复，且保证未推进任何游标。
    pub const STREAM_INSUFFICIENT_DATA: &str = "stream.insufficient_data";
    /// position / limit / 索引访问落在 `[0, capacity]` 之外；编程错误，快速失败。
    pub const BUFFER_INDEX_OUT_OF_RANGE: &str = "buffer.index_out_of_range";
    /// 游标写入超出 `limit`；缓冲容量固定，从不静默扩容。
    pub const BUFFER_OVERFLOW: &str = "buffer.overflow";
    /// 通过只读存储（如包装的共享字节序列）发起变更。
    pub const BUFFER_READ_ONLY: &str = "buffer.read_only";
    /// 请求的文本编码无法表示给定数据（例如 ASCII 编码遇到非 ASCII 负载）。
    pub const BUFFER_UNSUPPORTED_CONVERSION: &str = "buffer.unsupported_conversion";
    /// 长度前缀文本的字节序列对请求的编码无效。
    pub const BUFFER_TEXT_DECODE: &str = "buffer.text_decode";
    /// 向并非签发该缓冲的池执行归还。
    pub const POOL_FOREIGN_RELEASE: &str = "pool.foreign_release";
}

const _: fn() = || {
    fn assert_error_traits<T: Error + Send + Sync + 'static>() {}
    assert_error_traits::<FlintError>();
};
