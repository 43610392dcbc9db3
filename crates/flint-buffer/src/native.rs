use alloc::sync::Arc;
use core::fmt;
use core::slice;

use flint_core::RawRegion;

use crate::buffer::DataBuffer;
use crate::region::{NativeRegion, Region};

/// `NativeData` 是一段原生内存的只读视图：稳定地址 + 长度。
///
/// # 设计初衷（Why）
/// - 与 I/O 驱动、外部库交互时需要一个在视图存活期内不被移动回收的
///   本地地址；托管字节序列无法提供该保证。
/// - 视图持有底层区域的共享引用，存活期内地址始终有效。
///
/// # 零拷贝条件（What）
/// - 源缓冲后端已具备本地地址时，视图直接指向源的剩余窗口子区间；
/// - 否则在堆外分配等长内存并复制剩余字节，视图拥有该副本。
pub struct NativeData {
    region: Arc<Region>,
    offset: usize,
    len: usize,
    copied: bool,
}

impl NativeData {
    pub(crate) fn from_buffer(buffer: &DataBuffer) -> Self {
        let len = buffer.remaining();
        match buffer.region_arc().native_address() {
            Some(_) => Self {
                region: Arc::clone(buffer.region_arc()),
                offset: buffer.absolute_position(),
                len,
                copied: false,
            },
            None => Self {
                region: copy_to_native(buffer.window()),
                offset: 0,
                len,
                copied: true,
            },
        }
    }

    /// 视图首字节的本地地址；`len == 0` 时地址仍合法但不可解引用。
    pub fn address(&self) -> usize {
        // 构造器保证 `region` 一定具备本地地址。
        match self.region.native_address() {
            Some(addr) => addr + self.offset,
            None => unreachable!("原生视图的底层区域必然可寻址"),
        }
    }

    /// 视图覆盖的字节数。
    pub fn len(&self) -> usize {
        self.len
    }

    /// 视图是否为空。
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 视图是源窗口的零拷贝引用，还是独立副本。
    pub fn is_copy(&self) -> bool {
        self.copied
    }

    /// 以切片形式借出视图内容。
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `offset + len` 落在区域界内，由构造器保证。
        unsafe { slice::from_raw_parts(self.region.as_ptr().add(self.offset), self.len) }
    }
}

impl fmt::Debug for NativeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeData")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("len", &self.len)
            .field("copied", &self.copied)
            .finish()
    }
}

/// `NativeDataMut` 是一段原生内存的可变视图。
///
/// 零拷贝仅在源后端本身是可写原生内存时成立，此时写入对源缓冲可见；
/// 其余情形复制，写入停留在副本里，不会回传。调用方通过
/// [`Self::is_copy`] 区分两种情形。
pub struct NativeDataMut {
    region: Arc<Region>,
    offset: usize,
    len: usize,
    copied: bool,
}

impl NativeDataMut {
    pub(crate) fn from_buffer(buffer: &DataBuffer) -> Self {
        let len = buffer.remaining();
        let zero_copy = buffer.region_arc().native_address().is_some()
            && buffer.region_arc().as_mut_ptr().is_some();
        if zero_copy {
            Self {
                region: Arc::clone(buffer.region_arc()),
                offset: buffer.absolute_position(),
                len,
                copied: false,
            }
        } else {
            Self {
                region: copy_to_native(buffer.window()),
                offset: 0,
                len,
                copied: true,
            }
        }
    }

    /// 视图首字节的本地地址。
    pub fn address(&self) -> usize {
        match self.region.native_address() {
            Some(addr) => addr + self.offset,
            None => unreachable!("原生视图的底层区域必然可寻址"),
        }
    }

    /// 视图覆盖的字节数。
    pub fn len(&self) -> usize {
        self.len
    }

    /// 视图是否为空。
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 视图是源窗口的零拷贝引用（写入回传），还是独立副本（写入不回传）。
    pub fn is_copy(&self) -> bool {
        self.copied
    }

    /// 以切片形式借出视图内容。
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: 同 `NativeData::as_slice`。
        unsafe { slice::from_raw_parts(self.region.as_ptr().add(self.offset), self.len) }
    }

    /// 以可变切片形式借出视图内容。
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // 构造器保证零拷贝路径的区域可写，副本路径的区域是新分配的堆外内存。
        match self.region.as_mut_ptr() {
            // SAFETY: 界内且 `&mut self` 独占本视图。
            Some(ptr) => unsafe { slice::from_raw_parts_mut(ptr.add(self.offset), self.len) },
            None => unreachable!("可变原生视图的底层区域必然可写"),
        }
    }
}

impl fmt::Debug for NativeDataMut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeDataMut")
            .field("address", &format_args!("{:#x}", self.address()))
            .field("len", &self.len)
            .field("copied", &self.copied)
            .finish()
    }
}

fn copy_to_native(window: &[u8]) -> Arc<Region> {
    let region = NativeRegion::allocate(window.len());
    if !window.is_empty() {
        match region.as_mut_ptr() {
            // SAFETY: 新区域与来源窗口等长且互不重叠。
            Some(dst) => unsafe {
                core::ptr::copy_nonoverlapping(window.as_ptr(), dst, window.len());
            },
            None => unreachable!("新分配的堆外区域必然可写"),
        }
    }
    Arc::new(Region::Native(region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flint_core::{AllocationZone, ByteOrder};

    #[test]
    fn heap_buffer_exports_a_native_copy() {
        let mut buffer = DataBuffer::heap(8, ByteOrder::BigEndian);
        buffer.write_bytes(b"flint").expect("填充");
        buffer.reset_for_read();

        let view = buffer.to_native_data();
        assert!(view.is_copy());
        assert_eq!(view.as_slice(), b"flint");
        assert_ne!(view.address(), 0);
        assert_eq!(buffer.position(), 0, "导出不得扰动游标");
    }

    #[test]
    fn direct_buffer_exports_zero_copy_and_writes_propagate() {
        let mut buffer = DataBuffer::allocate(8, AllocationZone::Direct, ByteOrder::BigEndian)
            .expect("堆外分配");
        buffer.write_bytes(&[0; 8]).expect("填充");
        buffer.reset_for_read();

        let mut view = buffer.to_native_data_mut();
        assert!(!view.is_copy());
        assert_eq!(
            view.address(),
            buffer.native_address().expect("堆外缓冲必有地址")
        );
        view.as_mut_slice()[0] = 0xAB;
        assert_eq!(buffer.read_u8().expect("读取"), 0xAB);
    }
}
