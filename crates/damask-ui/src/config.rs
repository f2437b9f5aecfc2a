/// Tunables for a [`crate::Ui`] context.
///
/// ```rust,ignore
/// let config = UiConfig::default().dirty_capacity(16).stack_depth(32);
/// let ui = Ui::new(config, 800, 600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    /// Maximum number of damage rectangles kept between redraws (at least 1).
    pub dirty_capacity: usize,
    /// Depth of each canvas clip/offset stack.
    pub stack_depth: usize,
    /// Maximum number of live widgets; creation fails beyond this.
    pub max_widgets: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            dirty_capacity: 10,
            stack_depth: 10,
            max_widgets: 65_536,
        }
    }
}

impl UiConfig {
    pub fn dirty_capacity(mut self, n: usize) -> Self {
        self.dirty_capacity = n.max(1);
        self
    }

    pub fn stack_depth(mut self, n: usize) -> Self {
        self.stack_depth = n;
        self
    }

    pub fn max_widgets(mut self, n: usize) -> Self {
        self.max_widgets = n;
        self
    }
}
