use super::fifo::FifoQueue;
use crate::request::Request;
use rand::{rngs::StdRng, Rng};

/// Which of the two priority sequences a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueClass {
    Expedited,
    Standard,
}

/// Expedited/standard queue pair with biased random selection.
///
/// Short requests (service duration below the threshold) go to the expedited
/// queue. Each dequeue prefers the expedited queue with probability `bias`
/// and falls back to the other queue when the preferred one is empty.
#[derive(Debug, Clone)]
pub struct PriorityQueues {
    expedited: FifoQueue,
    standard: FifoQueue,
    threshold: f64,
    bias: f64,
    rng: StdRng,
}

impl PriorityQueues {
    pub fn new(threshold: f64, bias: f64, rng: StdRng) -> Self {
        Self {
            expedited: FifoQueue::new(None),
            standard: FifoQueue::new(None),
            threshold,
            bias,
            rng,
        }
    }

    /// Requests without a usable duration are treated as standard
    pub fn classify(&self, request: &Request) -> QueueClass {
        if request.has_usable_duration() && request.service_duration < self.threshold {
            QueueClass::Expedited
        } else {
            QueueClass::Standard
        }
    }

    pub fn enqueue(&mut self, request: Request) -> Result<(), Request> {
        match self.classify(&request) {
            QueueClass::Expedited => self.expedited.enqueue(request),
            QueueClass::Standard => self.standard.enqueue(request),
        }
    }

    pub fn dequeue(&mut self) -> Option<Request> {
        if self.is_empty() {
            return None;
        }

        let prefer_expedited = self.rng.gen::<f64>() < self.bias;
        let (preferred, other) = if prefer_expedited {
            (&mut self.expedited, &mut self.standard)
        } else {
            (&mut self.standard, &mut self.expedited)
        };
        preferred.dequeue().or_else(|| other.dequeue())
    }

    pub fn is_empty(&self) -> bool {
        self.expedited.is_empty() && self.standard.is_empty()
    }

    pub fn len(&self) -> usize {
        self.expedited.len() + self.standard.len()
    }

    pub fn len_of(&self, class: QueueClass) -> usize {
        match class {
            QueueClass::Expedited => self.expedited.len(),
            QueueClass::Standard => self.standard.len(),
        }
    }

    pub fn peek(&self, class: QueueClass) -> Option<&Request> {
        match class {
            QueueClass::Expedited => self.expedited.peek(),
            QueueClass::Standard => self.standard.peek(),
        }
    }

    /// Lifetime admitted count for one sequence
    pub fn admitted(&self, class: QueueClass) -> u64 {
        match class {
            QueueClass::Expedited => self.expedited.admitted(),
            QueueClass::Standard => self.standard.admitted(),
        }
    }
}
