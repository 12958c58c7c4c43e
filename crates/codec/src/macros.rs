/// Copies the provided slice into $ty using $ty::from_be_bytes and advances the buffer.
#[macro_export]
macro_rules! from_be_bytes_slice_and_advance_buf {
    ($ty: ty, $slice: expr) => {{ $crate::from_be_bytes_slice_and_advance_buf!($ty, ::std::mem::size_of::<$ty>(), $slice) }};
    ($ty:ty, $size: expr, $slice: expr) => {{
        let mut arr = [0u8; ::std::mem::size_of::<$ty>()];
        let size = $size;
        let size_of = ::std::mem::size_of::<$ty>();
        arr[size_of - size..].copy_from_slice(&$slice[0..size]);
        ::alloy_primitives::bytes::Buf::advance($slice, size);
        <$ty>::from_be_bytes(arr)
    }};
}

/// Copies `$size` bytes of the provided slice into $ty using $ty::from_slice and advances the
/// buffer.
#[macro_export]
macro_rules! from_slice_and_advance_buf {
    ($ty:ty, $size: expr, $slice: expr) => {{
        let size = $size;
        let value = <$ty>::from_slice(&$slice[0..size]);
        ::alloy_primitives::bytes::Buf::advance($slice, size);
        value
    }};
}

/// Writes the low `$size` bytes of `$value` in big endian into the buffer, erroring with
/// [`crate::EncodingError::FieldOverflow`] if the value does not fit.
#[macro_export]
macro_rules! put_be_bytes_checked {
    ($buf: expr, $value: expr, $size: expr, $field: expr) => {{
        let value = $value as u64;
        let size: usize = $size;
        if size < 8 && value >> (size * 8) != 0 {
            return Err($crate::EncodingError::FieldOverflow { field: $field, value, bytes: size }
                .into())
        }
        $buf.extend_from_slice(&value.to_be_bytes()[8 - size..]);
    }};
}
