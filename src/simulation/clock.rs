/// Simulated time, only ever moved forward by the driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    now: f64,
}

impl Clock {
    pub fn new(start: f64) -> Self {
        Self { now: start }
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move to `t`. Returns false and leaves the clock alone unless `t` is
    /// strictly later than the current time.
    pub fn advance_to(&mut self, t: f64) -> bool {
        if t > self.now {
            self.now = t;
            true
        } else {
            false
        }
    }
}
