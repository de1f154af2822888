use log::warn;

/// Collects warnings raised while analyzing and validating a table.
///
/// Every warning is also forwarded to the `log` facade; the retained copies
/// end up in the ingestion report.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warnings: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}
