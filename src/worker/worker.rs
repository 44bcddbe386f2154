use crate::gateway::Gateway;
use crate::queue::QueuePolicy;
use crate::request::Request;
use log::debug;

/// A single processing slot that holds at most one request at a time
#[derive(Debug, Clone)]
pub struct Worker {
    id: usize,

    /// Request being processed, if any
    current_task: Option<Request>,

    /// Simulated time the current task finishes
    busy_until: f64,

    /// Accumulated service time of completed tasks
    pub busy_time: f64,

    pub tasks_completed: u64,
}

impl Worker {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            current_task: None,
            busy_until: 0.0,
            busy_time: 0.0,
            tasks_completed: 0,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether the worker is still processing at time `t`
    pub fn is_busy(&self, t: f64) -> bool {
        self.current_task.is_some() && t < self.busy_until
    }

    /// Whether a task is attached, finished or not
    pub fn has_task(&self) -> bool {
        self.current_task.is_some()
    }

    pub fn current_task(&self) -> Option<&Request> {
        self.current_task.as_ref()
    }

    /// Completion time of the attached task
    pub fn busy_until(&self) -> Option<f64> {
        self.current_task.as_ref().map(|_| self.busy_until)
    }

    /// Step the worker at `now`.
    ///
    /// A finished task is stamped with its completion time and returned. An
    /// idle worker pulls the next request from `queue`, routes it through the
    /// gateway and holds it for its full service duration whatever the gateway
    /// outcome.
    pub fn advance(
        &mut self,
        now: f64,
        queue: &mut QueuePolicy,
        gateway: &mut Gateway,
    ) -> Option<Request> {
        if self.current_task.is_some() {
            if now < self.busy_until {
                return None;
            }
            let mut task = self.current_task.take()?;
            task.mark_completed(self.busy_until);
            self.busy_time += task.service_duration;
            self.tasks_completed += 1;
            debug!(
                "Worker {} completed {} at t={:.2} (endpoint: {:?})",
                self.id, task.request_id, self.busy_until, task.endpoint_used
            );
            return Some(task);
        }

        let mut task = queue.select_and_dequeue()?;
        task.mark_started(now);
        let outcome = gateway.attempt(&mut task, now);
        self.busy_until = now + task.service_duration;
        debug!(
            "Worker {} started {} at t={:.2}, busy until {:.2} ({:?})",
            self.id, task.request_id, now, self.busy_until, outcome
        );
        self.current_task = Some(task);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gateway(rate_limit: usize, fault_probability: f64) -> Gateway {
        Gateway::new(2, rate_limit, 60.0, fault_probability, StdRng::seed_from_u64(0))
    }

    fn queue_with(requests: &[(&str, f64, f64)]) -> QueuePolicy {
        let mut queue = QueuePolicy::fifo(None);
        for &(id, arrival, duration) in requests {
            let mut request = Request::new(id, arrival, duration);
            request.mark_enqueued(arrival);
            queue.classify_and_enqueue(request).unwrap();
        }
        queue
    }

    #[test]
    fn test_idle_worker_with_empty_queue() {
        let mut worker = Worker::new(0);
        let mut queue = QueuePolicy::fifo(None);
        let mut gw = gateway(10, 0.0);

        assert!(worker.advance(0.0, &mut queue, &mut gw).is_none());
        assert!(!worker.has_task());
        assert!(!worker.is_busy(0.0));
        assert!(worker.busy_until().is_none());
    }

    #[test]
    fn test_dispatch_then_complete() {
        let mut worker = Worker::new(0);
        let mut queue = queue_with(&[("a", 0.0, 2.0)]);
        let mut gw = gateway(10, 0.0);

        assert!(worker.advance(0.5, &mut queue, &mut gw).is_none());
        assert!(worker.is_busy(0.5));
        assert!(worker.is_busy(2.4));
        assert!(!worker.is_busy(2.5));
        assert_eq!(worker.busy_until(), Some(2.5));
        let held = worker.current_task().unwrap();
        assert_eq!(held.status, RequestStatus::InService);
        assert_eq!(held.service_start_time, Some(0.5));
        assert_eq!(held.endpoint_used, Some(0));

        // Not finished yet
        assert!(worker.advance(1.0, &mut queue, &mut gw).is_none());

        // Late call still stamps the scheduled completion time
        let done = worker.advance(3.0, &mut queue, &mut gw).unwrap();
        assert_eq!(done.completion_time, Some(2.5));
        assert_eq!(done.status, RequestStatus::Completed);
        assert!(!worker.has_task());
        assert_eq!(worker.tasks_completed, 1);
        assert_eq!(worker.busy_time, 2.0);
    }

    #[test]
    fn test_completion_and_dispatch_are_separate_steps() {
        let mut worker = Worker::new(0);
        let mut queue = queue_with(&[("a", 0.0, 1.0), ("b", 0.0, 1.0)]);
        let mut gw = gateway(10, 0.0);

        worker.advance(0.0, &mut queue, &mut gw);
        let first = worker.advance(1.0, &mut queue, &mut gw).unwrap();
        assert_eq!(first.request_id, "a");
        assert!(!worker.has_task());

        assert!(worker.advance(1.0, &mut queue, &mut gw).is_none());
        let second = worker.current_task().unwrap();
        assert_eq!(second.request_id, "b");
        assert_eq!(second.service_start_time, Some(1.0));
    }

    #[test]
    fn test_exhausted_gateway_still_holds_task() {
        let mut worker = Worker::new(0);
        let mut queue = queue_with(&[("a", 0.0, 4.0)]);
        let mut gw = gateway(10, 1.0);

        worker.advance(0.0, &mut queue, &mut gw);
        let held = worker.current_task().unwrap();
        assert!(held.endpoint_used.is_none());
        assert!(held.remote_fault);

        let done = worker.advance(4.0, &mut queue, &mut gw).unwrap();
        assert_eq!(done.completion_time, Some(4.0));
        assert!(done.remote_fault);
    }

    #[test]
    fn test_zero_duration_task() {
        let mut worker = Worker::new(0);
        let mut queue = queue_with(&[("a", 0.0, 0.0)]);
        let mut gw = gateway(10, 0.0);

        worker.advance(0.0, &mut queue, &mut gw);
        assert!(worker.has_task());
        assert!(!worker.is_busy(0.0));

        let done = worker.advance(0.0, &mut queue, &mut gw).unwrap();
        assert_eq!(done.completion_time, Some(0.0));
    }
}
