//! LEB128 varints, with zig-zag mapping for signed integers.

/// Longest LEB128 encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

pub fn zigzag_encode(i: i64) -> u64 {
    ((i << 1) ^ (i >> 63)) as u64
}

pub fn zigzag_decode(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

pub fn varint_len(mut u: u64) -> usize {
    let mut len = 1;
    while u >= 0x80 {
        u >>= 7;
        len += 1;
    }
    len
}

/// Fills `out`, which must be exactly [`varint_len`] bytes long.
pub(crate) fn put_varint(mut u: u64, out: &mut [u8]) {
    let last = out.len() - 1;
    for (i, byte) in out.iter_mut().enumerate() {
        let low = (u & 0x7f) as u8;
        u >>= 7;
        *byte = if i == last { low } else { low | 0x80 };
    }
}
