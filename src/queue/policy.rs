use super::fifo::FifoQueue;
use super::priority::{PriorityQueues, QueueClass};
use crate::config::QueueConfig;
use crate::error::SimError;
use crate::request::Request;
use rand::rngs::StdRng;

/// Queueing discipline for admitted requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueDiscipline {
    /// Single arrival-ordered queue, optionally bounded
    Fifo,
    /// Expedited/standard pair with biased selection
    Priority,
}

impl QueueDiscipline {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fifo" | "bounded_fifo" => Ok(QueueDiscipline::Fifo),
            "priority" => Ok(QueueDiscipline::Priority),
            _ => Err(format!("Unknown queue policy: {}", s)),
        }
    }
}

/// Queue strategy held by the simulator; the worker pool pulls from it
#[derive(Debug, Clone)]
pub enum QueuePolicy {
    Fifo(FifoQueue),
    Priority(PriorityQueues),
}

impl QueuePolicy {
    pub fn fifo(max_size: Option<usize>) -> Self {
        QueuePolicy::Fifo(FifoQueue::new(max_size))
    }

    pub fn priority(threshold: f64, bias: f64, rng: StdRng) -> Self {
        QueuePolicy::Priority(PriorityQueues::new(threshold, bias, rng))
    }

    /// Build the configured strategy. `rng` is only consumed by the priority policy.
    pub fn from_config(config: &QueueConfig, rng: StdRng) -> Result<Self, SimError> {
        let discipline = QueueDiscipline::from_str(&config.policy).map_err(SimError::Configuration)?;
        Ok(match discipline {
            QueueDiscipline::Fifo => Self::fifo(config.max_size),
            QueueDiscipline::Priority => {
                Self::priority(config.priority_threshold, config.priority_bias, rng)
            }
        })
    }

    pub fn discipline(&self) -> QueueDiscipline {
        match self {
            QueuePolicy::Fifo(_) => QueueDiscipline::Fifo,
            QueuePolicy::Priority(_) => QueueDiscipline::Priority,
        }
    }

    /// Place `request` in the right queue. A full bounded queue hands it back.
    pub fn classify_and_enqueue(&mut self, request: Request) -> Result<(), Request> {
        match self {
            QueuePolicy::Fifo(queue) => queue.enqueue(request),
            QueuePolicy::Priority(queues) => queues.enqueue(request),
        }
    }

    /// Remove the next request to serve, if any
    pub fn select_and_dequeue(&mut self) -> Option<Request> {
        match self {
            QueuePolicy::Fifo(queue) => queue.dequeue(),
            QueuePolicy::Priority(queues) => queues.dequeue(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            QueuePolicy::Fifo(queue) => queue.len(),
            QueuePolicy::Priority(queues) => queues.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            QueuePolicy::Fifo(queue) => queue.is_empty(),
            QueuePolicy::Priority(queues) => queues.is_empty(),
        }
    }

    /// Depth of the expedited queue. Always zero for the single FIFO.
    pub fn expedited_depth(&self) -> usize {
        match self {
            QueuePolicy::Fifo(_) => 0,
            QueuePolicy::Priority(queues) => queues.len_of(QueueClass::Expedited),
        }
    }

    /// Depth of the standard queue; the single FIFO counts as standard
    pub fn standard_depth(&self) -> usize {
        match self {
            QueuePolicy::Fifo(queue) => queue.len(),
            QueuePolicy::Priority(queues) => queues.len_of(QueueClass::Standard),
        }
    }

    pub fn expedited_admitted(&self) -> u64 {
        match self {
            QueuePolicy::Fifo(_) => 0,
            QueuePolicy::Priority(queues) => queues.admitted(QueueClass::Expedited),
        }
    }

    pub fn standard_admitted(&self) -> u64 {
        match self {
            QueuePolicy::Fifo(queue) => queue.admitted(),
            QueuePolicy::Priority(queues) => queues.admitted(QueueClass::Standard),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_discipline_from_str() {
        assert_eq!(QueueDiscipline::from_str("fifo").unwrap(), QueueDiscipline::Fifo);
        assert_eq!(QueueDiscipline::from_str("FIFO").unwrap(), QueueDiscipline::Fifo);
        assert_eq!(
            QueueDiscipline::from_str("bounded_fifo").unwrap(),
            QueueDiscipline::Fifo
        );
        assert_eq!(
            QueueDiscipline::from_str("Priority").unwrap(),
            QueueDiscipline::Priority
        );
        assert!(QueueDiscipline::from_str("lifo").is_err());
    }

    #[test]
    fn test_from_config() {
        let rng = StdRng::seed_from_u64(0);
        let policy = QueuePolicy::from_config(&QueueConfig::default(), rng.clone()).unwrap();
        assert_eq!(policy.discipline(), QueueDiscipline::Priority);

        let config = QueueConfig {
            policy: "fifo".to_string(),
            max_size: Some(3),
            ..QueueConfig::default()
        };
        let policy = QueuePolicy::from_config(&config, rng.clone()).unwrap();
        assert_eq!(policy.discipline(), QueueDiscipline::Fifo);

        let config = QueueConfig {
            policy: "random".to_string(),
            ..QueueConfig::default()
        };
        assert!(QueuePolicy::from_config(&config, rng).is_err());
    }

    #[test]
    fn test_bounded_fifo_rejects_when_full() {
        let mut policy = QueuePolicy::fifo(Some(1));
        assert!(policy.classify_and_enqueue(Request::new("a", 0.0, 1.0)).is_ok());
        let rejected = policy
            .classify_and_enqueue(Request::new("b", 0.0, 1.0))
            .unwrap_err();
        assert_eq!(rejected.request_id, "b");
        assert_eq!(policy.len(), 1);
        assert_eq!(policy.standard_depth(), 1);
        assert_eq!(policy.expedited_depth(), 0);
        assert_eq!(policy.standard_admitted(), 1);
    }

    #[test]
    fn test_priority_depths() {
        let mut policy = QueuePolicy::priority(20.0, 0.8, StdRng::seed_from_u64(3));
        policy.classify_and_enqueue(Request::new("short", 0.0, 2.0)).unwrap();
        policy.classify_and_enqueue(Request::new("long", 0.0, 30.0)).unwrap();
        policy.classify_and_enqueue(Request::new("long2", 0.0, 60.0)).unwrap();

        assert_eq!(policy.expedited_depth(), 1);
        assert_eq!(policy.standard_depth(), 2);
        assert_eq!(policy.expedited_admitted(), 1);
        assert_eq!(policy.standard_admitted(), 2);

        let mut drained = 0;
        while policy.select_and_dequeue().is_some() {
            drained += 1;
        }
        assert_eq!(drained, 3);
        assert!(policy.is_empty());
        assert!(policy.select_and_dequeue().is_none());
    }
}
