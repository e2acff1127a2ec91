use std::{collections::VecDeque, fmt::Display};

use alloy::primitives::U256;

use super::{constants::STACK_LIMIT, error::VmError};

/// The [`Stack`] struct represents the EVM stack.
/// It is a LIFO data structure of at most [`STACK_LIMIT`] words.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Stack {
    /// The stack words.
    ///
    /// The front of the deque represents the top of the stack.
    pub stack: VecDeque<U256>,
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

impl Stack {
    /// Creates a new [`Stack`].
    ///
    /// ```
    /// use ferret_vm::core::stack::Stack;
    ///
    /// let stack = Stack::new();
    /// assert_eq!(stack.size(), 0);
    /// ```
    pub fn new() -> Stack {
        Stack { stack: VecDeque::with_capacity(64) }
    }

    /// Push a value onto the stack.
    ///
    /// ```
    /// use ferret_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).expect("stack has room");
    /// assert_eq!(stack.size(), 1);
    /// ```
    pub fn push(&mut self, value: U256) -> Result<(), VmError> {
        if self.stack.len() >= STACK_LIMIT {
            return Err(VmError::StackLimitExceeded);
        }
        self.stack.push_front(value);
        Ok(())
    }

    /// Pop a value off the stack.
    ///
    /// ```
    /// use ferret_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).expect("stack has room");
    ///
    /// assert_eq!(stack.pop(), Ok(U256::from(0x00)));
    /// assert!(stack.pop().is_err());
    /// ```
    pub fn pop(&mut self) -> Result<U256, VmError> {
        self.stack.pop_front().ok_or(VmError::StackUnderrun)
    }

    /// Pop n values off the stack, top first.
    ///
    /// ```
    /// use ferret_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// for i in 0..3u8 {
    ///     stack.push(U256::from(i)).expect("stack has room");
    /// }
    ///
    /// // stack is now [0x02, 0x01, 0x00]
    /// let values = stack.pop_n(2).expect("enough values");
    /// assert_eq!(values, vec![U256::from(2), U256::from(1)]);
    /// assert_eq!(stack.size(), 1);
    /// ```
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<U256>, VmError> {
        if self.stack.len() < n {
            return Err(VmError::StackUnderrun);
        }
        Ok(self.stack.drain(0..n).collect())
    }

    /// Swap the top value and the nth value on the stack.
    ///
    /// ```
    /// use ferret_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x00)).expect("stack has room");
    /// stack.push(U256::from(0x01)).expect("stack has room");
    ///
    /// // stack is now [0x01, 0x00]
    /// stack.swap(1).expect("enough values");
    ///
    /// // stack is now [0x00, 0x01]
    /// assert_eq!(stack.peek(0), Ok(U256::from(0x00)));
    /// assert_eq!(stack.peek(1), Ok(U256::from(0x01)));
    /// ```
    pub fn swap(&mut self, n: usize) -> Result<(), VmError> {
        if n >= self.stack.len() {
            return Err(VmError::StackUnderrun);
        }
        self.stack.swap(0, n);
        Ok(())
    }

    /// Duplicate the nth value on the stack, 1-indexed.
    ///
    /// ```
    /// use ferret_vm::core::stack::Stack;
    /// use alloy::primitives::U256;
    ///
    /// let mut stack = Stack::new();
    /// stack.push(U256::from(0x01)).expect("stack has room");
    /// stack.push(U256::from(0x02)).expect("stack has room");
    ///
    /// stack.dup(2).expect("enough values");
    /// assert_eq!(stack.peek(0), Ok(U256::from(0x01)));
    /// assert_eq!(stack.size(), 3);
    /// ```
    pub fn dup(&mut self, n: usize) -> Result<(), VmError> {
        let value = n.checked_sub(1).and_then(|i| self.stack.get(i)).copied();
        self.push(value.ok_or(VmError::StackUnderrun)?)
    }

    /// Peek at the value `index` slots below the top of the stack.
    pub fn peek(&self, index: usize) -> Result<U256, VmError> {
        self.stack.get(index).copied().ok_or(VmError::StackUnderrun)
    }

    /// Gets the current size of the stack.
    pub fn size(&self) -> usize {
        self.stack.len()
    }

    /// Check if the stack is empty.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

impl Display for Stack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let words = self.stack.iter().map(|word| format!("{word:#x}")).collect::<Vec<_>>();
        write!(f, "[{}]", words.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = Stack::new();
        stack.push(U256::from(1)).expect("push");
        stack.push(U256::from(2)).expect("push");

        assert_eq!(stack.pop(), Ok(U256::from(2)));
        assert_eq!(stack.pop(), Ok(U256::from(1)));
        assert_eq!(stack.pop(), Err(VmError::StackUnderrun));
    }

    #[test]
    fn test_push_past_limit() {
        let mut stack = Stack::new();
        for i in 0..STACK_LIMIT {
            stack.push(U256::from(i)).expect("push");
        }

        assert_eq!(stack.push(U256::ZERO), Err(VmError::StackLimitExceeded));
        assert_eq!(stack.size(), STACK_LIMIT);
    }

    #[test]
    fn test_pop_n_underrun_leaves_stack_untouched() {
        let mut stack = Stack::new();
        stack.push(U256::from(1)).expect("push");

        assert_eq!(stack.pop_n(2), Err(VmError::StackUnderrun));
        assert_eq!(stack.size(), 1);
    }

    #[test]
    fn test_swap_and_dup_out_of_range() {
        let mut stack = Stack::new();
        stack.push(U256::from(1)).expect("push");

        assert_eq!(stack.swap(1), Err(VmError::StackUnderrun));
        assert_eq!(stack.dup(2), Err(VmError::StackUnderrun));
        assert_eq!(stack.dup(0), Err(VmError::StackUnderrun));
    }

    #[test]
    fn test_display() {
        let mut stack = Stack::new();
        stack.push(U256::from(1)).expect("push");
        stack.push(U256::from(255)).expect("push");
        assert_eq!(stack.to_string(), "[0xff, 0x1]");
    }
}
