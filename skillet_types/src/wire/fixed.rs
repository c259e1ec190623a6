use crate::ByteOrder;
use std::mem;

/// A number with a fixed-width wire representation in either byte order.
pub trait FixedWidth: Copy {
    const WIDTH: usize;

    /// `out` is exactly `WIDTH` bytes long.
    fn put(self, order: ByteOrder, out: &mut [u8]);

    /// `bytes` is exactly `WIDTH` bytes long.
    fn get(order: ByteOrder, bytes: &[u8]) -> Self;
}

macro_rules! impl_fixed_width {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FixedWidth for $ty {
                const WIDTH: usize = mem::size_of::<$ty>();

                fn put(self, order: ByteOrder, out: &mut [u8]) {
                    match order {
                        ByteOrder::Big => out.copy_from_slice(&self.to_be_bytes()),
                        ByteOrder::Little => out.copy_from_slice(&self.to_le_bytes()),
                    }
                }

                fn get(order: ByteOrder, bytes: &[u8]) -> Self {
                    let mut arr = [0u8; mem::size_of::<$ty>()];
                    arr.copy_from_slice(bytes);
                    match order {
                        ByteOrder::Big => <$ty>::from_be_bytes(arr),
                        ByteOrder::Little => <$ty>::from_le_bytes(arr),
                    }
                }
            }
        )*
    };
}
impl_fixed_width!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
