/// Request status in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    /// Request has not arrived yet
    Pending,
    /// Request is waiting in a queue
    Queued,
    /// Request is held by a worker
    InService,
    /// Request finished processing (whether or not an endpoint served it)
    Completed,
    /// Request was turned away at admission
    Rejected,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "Pending"),
            RequestStatus::Queued => write!(f, "Queued"),
            RequestStatus::InService => write!(f, "InService"),
            RequestStatus::Completed => write!(f, "Completed"),
            RequestStatus::Rejected => write!(f, "Rejected"),
        }
    }
}
