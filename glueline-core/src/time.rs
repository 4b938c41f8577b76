//! Millisecond timestamps
//!
//! Timestamps are `u32` milliseconds since boot and wrap after about
//! 49.7 days. Durations use wrapping subtraction; deadlines compare the
//! wrapped difference as signed. Both are exact across the wrap as long as
//! the two instants are less than 2^31 ms apart.

/// Milliseconds from `since` to `now`
#[inline]
pub fn elapsed_ms(now_ms: u32, since_ms: u32) -> u32 {
    now_ms.wrapping_sub(since_ms)
}

/// Deadline `now + duration`, wrapping
#[inline]
pub fn deadline_after(now_ms: u32, duration_ms: u32) -> u32 {
    now_ms.wrapping_add(duration_ms)
}

/// True once `now` is strictly later than `deadline`
#[inline]
pub fn has_passed(now_ms: u32, deadline_ms: u32) -> bool {
    (now_ms.wrapping_sub(deadline_ms) as i32) > 0
}
