//! Alignment arithmetic for sizes and addresses.
//!
//! All functions are branch-free bit manipulations over `usize`. Operations that take an
//! `alignment` require it to be a power of two; this is checked with `debug_assert!` only,
//! and the result is unspecified in release builds when the requirement is violated.

/// Default alignment used for host memory allocations: the alignment of the platform's
/// `max_align_t`.
#[cfg(unix)]
pub const DEFAULT_HOST_ALIGNMENT: usize = std::mem::align_of::<libc::max_align_t>();

/// Default alignment used for host memory allocations.
#[cfg(not(unix))]
pub const DEFAULT_HOST_ALIGNMENT: usize = 16;

/// Default alignment used for device memory allocations.
pub const CUDA_ALLOCATION_ALIGNMENT: usize = 256;

/// Returns whether `value` is a power of two.
///
/// Zero is not a power of two.
///
/// ```
/// use memres_align::is_pow2;
///
/// assert!(!is_pow2(0));
/// assert!(is_pow2(1));
/// assert!(!is_pow2(3));
/// assert!(is_pow2(256));
/// ```
#[inline]
pub const fn is_pow2(value: usize) -> bool {
    value != 0 && (value & (value - 1)) == 0
}

/// Returns whether `alignment` is a valid memory alignment.
#[inline]
pub const fn is_supported_alignment(alignment: usize) -> bool {
    is_pow2(alignment)
}

/// Aligns a number up to the next multiple of the specified alignment.
///
/// Returns the smallest multiple of `alignment` that is greater than or equal to `n`.
/// If the input is already aligned, it is returned unchanged.
///
/// # Examples
///
/// ```
/// use memres_align::align_up;
///
/// assert_eq!(align_up(0, 8), 0);
/// assert_eq!(align_up(1, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// assert_eq!(align_up(100, 256), 256);
/// ```
///
/// # Panics
///
/// Panics in debug builds if `alignment` is not a power of two, or if `n` is within
/// `alignment - 1` of `usize::MAX` so that the rounded value is not representable.
/// Release builds wrap in that case.
#[inline]
pub fn align_up(n: usize, alignment: usize) -> usize {
    debug_assert!(is_supported_alignment(alignment));
    debug_assert!(
        n <= usize::MAX - (alignment - 1),
        "align_up({n}, {alignment}) overflows usize"
    );
    (n + alignment - 1) & !(alignment - 1)
}

/// Aligns a number down to the previous multiple of the specified alignment.
///
/// Returns the largest multiple of `alignment` that is less than or equal to `n`.
///
/// # Examples
///
/// ```
/// use memres_align::align_down;
///
/// assert_eq!(align_down(0, 8), 0);
/// assert_eq!(align_down(7, 8), 0);
/// assert_eq!(align_down(9, 8), 8);
/// assert_eq!(align_down(511, 256), 256);
/// ```
///
/// # Panics
///
/// Panics in debug builds if `alignment` is not a power of two.
#[inline]
pub fn align_down(n: usize, alignment: usize) -> usize {
    debug_assert!(is_supported_alignment(alignment));
    n & !(alignment - 1)
}

/// Checks whether `n` is an exact multiple of `alignment`.
///
/// # Panics
///
/// Panics in debug builds if `alignment` is not a power of two.
#[inline]
pub fn is_aligned(n: usize, alignment: usize) -> bool {
    debug_assert!(is_supported_alignment(alignment));
    (n & (alignment - 1)) == 0
}

/// Checks whether the address of `ptr` is a multiple of `alignment`.
#[inline]
pub fn is_pointer_aligned<T: ?Sized>(ptr: *const T, alignment: usize) -> bool {
    is_aligned(ptr.cast::<u8>() as usize, alignment)
}

/// Checks whether the address of `ptr` satisfies [`CUDA_ALLOCATION_ALIGNMENT`].
#[inline]
pub fn is_pointer_aligned_default<T: ?Sized>(ptr: *const T) -> bool {
    is_pointer_aligned(ptr, CUDA_ALLOCATION_ALIGNMENT)
}
