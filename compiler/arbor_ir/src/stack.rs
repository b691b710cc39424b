//! Stack growth for recursive tree walks.
//!
//! Trees built programmatically can be arbitrarily deep (a left-leaning chain
//! of a hundred thousand additions is a single `fold`). The visitor, the
//! compiler and the printer all recurse per node, so each recursive step runs
//! under [`ensure_sufficient_stack`].

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 64 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if fewer than `RED_ZONE` bytes remain.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_recursion() {
        fn depth(n: u64) -> u64 {
            ensure_sufficient_stack(|| if n == 0 { 0 } else { depth(n - 1) + 1 })
        }

        assert_eq!(depth(100_000), 100_000);
    }

    #[test]
    fn test_passes_result_through() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(7));
        assert_eq!(result, Ok(7));
    }
}
