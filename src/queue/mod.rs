pub mod fifo;
pub mod policy;
pub mod priority;

pub use fifo::FifoQueue;
pub use policy::{QueueDiscipline, QueuePolicy};
pub use priority::{PriorityQueues, QueueClass};
