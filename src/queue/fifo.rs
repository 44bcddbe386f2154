use crate::request::Request;
use std::collections::VecDeque;

/// Single FIFO queue with an optional length bound
#[derive(Debug, Clone, Default)]
pub struct FifoQueue {
    items: VecDeque<Request>,
    max_size: Option<usize>,
    admitted: u64,
}

impl FifoQueue {
    pub fn new(max_size: Option<usize>) -> Self {
        Self {
            items: VecDeque::new(),
            max_size,
            admitted: 0,
        }
    }

    /// Append `request`, or hand it back if the queue is at its bound
    pub fn enqueue(&mut self, request: Request) -> Result<(), Request> {
        if self.is_full() {
            return Err(request);
        }
        self.items.push_back(request);
        self.admitted += 1;
        Ok(())
    }

    pub fn dequeue(&mut self) -> Option<Request> {
        self.items.pop_front()
    }

    pub fn peek(&self) -> Option<&Request> {
        self.items.front()
    }

    pub fn is_full(&self) -> bool {
        self.max_size
            .map(|max| self.items.len() >= max)
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    /// Lifetime count of accepted requests
    pub fn admitted(&self) -> u64 {
        self.admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = FifoQueue::new(None);
        for i in 0..5 {
            queue.enqueue(Request::new(format!("r{}", i), i as f64, 1.0)).unwrap();
        }
        assert_eq!(queue.peek().unwrap().request_id, "r0");
        let order: Vec<_> = std::iter::from_fn(|| queue.dequeue())
            .map(|r| r.request_id)
            .collect();
        assert_eq!(order, vec!["r0", "r1", "r2", "r3", "r4"]);
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_max_size() {
        let mut queue = FifoQueue::new(Some(2));
        assert!(queue.enqueue(Request::new("a", 0.0, 1.0)).is_ok());
        assert!(queue.enqueue(Request::new("b", 0.0, 1.0)).is_ok());
        assert!(queue.is_full());

        let rejected = queue.enqueue(Request::new("c", 0.0, 1.0)).unwrap_err();
        assert_eq!(rejected.request_id, "c");
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.admitted(), 2);

        queue.dequeue();
        assert!(!queue.is_full());
        assert!(queue.enqueue(Request::new("d", 0.0, 1.0)).is_ok());
    }

    #[test]
    fn test_unbounded_never_full() {
        let mut queue = FifoQueue::new(None);
        for i in 0..1000 {
            queue.enqueue(Request::new(i.to_string(), 0.0, 1.0)).unwrap();
        }
        assert!(!queue.is_full());
        assert_eq!(queue.admitted(), 1000);
    }
}
