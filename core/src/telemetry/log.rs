use log::{info, warn};

/// Component-tagged front end over the `log` facade.
#[derive(Debug, Clone, Copy)]
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!(target: "gapfillcore", "[{}] {}", self.component, message);
    }

    pub fn warn(&self, message: &str) {
        warn!(target: "gapfillcore", "[{}] {}", self.component, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("core")
    }
}
