use super::status::RequestStatus;
use crate::gateway::EndpointId;

/// Completion time reported for requests rejected at admission
pub const REJECTED_SENTINEL: f64 = -1.0;

/// Request represents a single unit of work in the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Opaque user/request identifier
    pub request_id: String,

    /// Arrival time (simulated time)
    pub arrival_time: f64,

    /// Simulated processing time required
    pub service_duration: f64,

    /// Request status
    pub status: RequestStatus,

    /// Time the driver admitted (or rejected) the request
    pub enqueue_time: Option<f64>,

    /// Time a worker began processing
    pub service_start_time: Option<f64>,

    /// Time processing ended
    pub completion_time: Option<f64>,

    /// Endpoint that ultimately served the request
    pub endpoint_used: Option<EndpointId>,

    /// Last gateway attempt ended in a simulated server error
    pub remote_fault: bool,
}

impl Request {
    /// Create a new request
    pub fn new(request_id: impl Into<String>, arrival_time: f64, service_duration: f64) -> Self {
        Self {
            request_id: request_id.into(),
            arrival_time,
            service_duration,
            status: RequestStatus::Pending,
            enqueue_time: None,
            service_start_time: None,
            completion_time: None,
            endpoint_used: None,
            remote_fault: false,
        }
    }

    /// Whether the service duration can drive classification and timing
    pub fn has_usable_duration(&self) -> bool {
        self.service_duration.is_finite() && self.service_duration >= 0.0
    }

    pub fn is_rejected(&self) -> bool {
        self.status == RequestStatus::Rejected
    }

    /// Time spent waiting between admission and the start of service
    pub fn queuing_time(&self) -> Option<f64> {
        match (self.enqueue_time, self.service_start_time) {
            (Some(enqueued), Some(started)) if started >= enqueued => Some(started - enqueued),
            _ => None,
        }
    }

    /// Time from arrival to completion
    pub fn latency(&self) -> Option<f64> {
        self.completion_time.map(|done| done - self.arrival_time)
    }

    /// Completion time, or [`REJECTED_SENTINEL`] for rejected requests
    pub fn completion_time_or_sentinel(&self) -> f64 {
        if self.is_rejected() {
            REJECTED_SENTINEL
        } else {
            self.completion_time.unwrap_or(REJECTED_SENTINEL)
        }
    }

    /// Mark the request as admitted into a queue
    pub fn mark_enqueued(&mut self, current_time: f64) {
        self.enqueue_time = Some(current_time);
        self.status = RequestStatus::Queued;
    }

    /// Mark the request as turned away at admission
    pub fn mark_rejected(&mut self, current_time: f64) {
        self.enqueue_time = Some(current_time);
        self.completion_time = None;
        self.status = RequestStatus::Rejected;
    }

    /// Mark the request as picked up by a worker
    pub fn mark_started(&mut self, current_time: f64) {
        self.service_start_time = Some(current_time);
        self.remote_fault = false;
        self.status = RequestStatus::InService;
    }

    /// Mark the request as finished
    pub fn mark_completed(&mut self, completion_time: f64) {
        self.completion_time = Some(completion_time);
        self.status = RequestStatus::Completed;
    }
}
