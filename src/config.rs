/// Construction-time settings for a [`Graph`](crate::Graph).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphConfig {
    /// Number of node slots to reserve up front.
    pub capacity: usize,
    /// Zero every gradient in the graph before seeding a backward pass.
    ///
    /// Off by default: gradients accumulate across passes until
    /// [`Graph::reset_gradients`](crate::Graph::reset_gradients) is called.
    pub zero_grad_on_backward: bool,
}

impl GraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn zero_grad_on_backward(mut self, enabled: bool) -> Self {
        self.zero_grad_on_backward = enabled;
        self
    }
}
