//! Account number allocation

/// Hands out strictly increasing account numbers, one per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountNumberAllocator {
    next: u32,
}

impl Default for AccountNumberAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountNumberAllocator {
    /// Start at 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Continue after the highest number already in use
    pub fn starting_after(max_existing: u32) -> Self {
        Self { next: max_existing + 1 }
    }

    /// Number the next call to `allocate` returns
    pub fn peek(&self) -> u32 {
        self.next
    }

    pub fn allocate(&mut self) -> u32 {
        let number = self.next;
        self.next += 1;
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_from_one() {
        let mut allocator = AccountNumberAllocator::new();
        let numbers: Vec<u32> = (0..5).map(|_| allocator.allocate()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_continues_after_existing() {
        let mut allocator = AccountNumberAllocator::starting_after(41);
        assert_eq!(allocator.peek(), 42);
        assert_eq!(allocator.allocate(), 42);
        assert_eq!(allocator.allocate(), 43);
    }
}
