use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared interrupt flag, checked before every remote mutation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancelToken::new();
        let handler = token.clone();
        assert!(!token.is_cancelled());
        handler.cancel();
        assert!(token.is_cancelled());
    }
}
