use std::time::Duration;

/// Configuration for test execution
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Deadline for a single test, measured from the moment it starts
    /// (default: 5 seconds)
    pub step_timeout: Duration,

    /// Pause before each test in a suite so notifications from the previous
    /// test can drain (default: 1 second)
    pub settle_interval: Duration,

    /// Tolerance when comparing playback positions (default: 200ms)
    pub position_leniency_ms: i64,

    /// Deadline for capturing a browse tree (default: 5 seconds)
    pub browse_timeout: Duration,

    /// Deepest browse tree the depth check accepts (default: 3)
    pub max_browse_depth: usize,

    /// Largest all-browsable root the structure check accepts (default: 4)
    pub max_root_browsable_items: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(5),
            settle_interval: Duration::from_secs(1),
            position_leniency_ms: 200,
            browse_timeout: Duration::from_secs(5),
            max_browse_depth: 3,
            max_root_browsable_items: 4,
        }
    }
}

impl TestConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> TestConfigBuilder {
        TestConfigBuilder::default()
    }
}

/// Builder for `TestConfig`
#[derive(Debug, Clone, Default)]
pub struct TestConfigBuilder {
    config: TestConfig,
}

impl TestConfigBuilder {
    /// Set the per-test deadline
    #[must_use]
    pub fn step_timeout(mut self, timeout: Duration) -> Self {
        self.config.step_timeout = timeout;
        self
    }

    /// Set the settle interval between suite tests
    #[must_use]
    pub fn settle_interval(mut self, interval: Duration) -> Self {
        self.config.settle_interval = interval;
        self
    }

    /// Set the position tolerance in milliseconds
    #[must_use]
    pub fn position_leniency_ms(mut self, leniency: i64) -> Self {
        self.config.position_leniency_ms = leniency;
        self
    }

    /// Set the browse capture deadline
    #[must_use]
    pub fn browse_timeout(mut self, timeout: Duration) -> Self {
        self.config.browse_timeout = timeout;
        self
    }

    /// Set the maximum accepted browse depth
    #[must_use]
    pub fn max_browse_depth(mut self, depth: usize) -> Self {
        self.config.max_browse_depth = depth;
        self
    }

    /// Set the maximum number of browsable root items
    #[must_use]
    pub fn max_root_browsable_items(mut self, count: usize) -> Self {
        self.config.max_root_browsable_items = count;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> TestConfig {
        self.config
    }
}
