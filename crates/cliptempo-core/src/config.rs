//! Pipeline configuration.

use crate::{Error, Result};

/// Tuning shared by the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Upper bound on loop iterations inside a single `read` (default: 2000).
    /// Exceeding it is reported as a warning and the partial result returned.
    pub max_iterations: usize,
    /// Consecutive zero-sample pulls before a wrapped source is treated as
    /// exhausted (default: 5).
    pub debounce_threshold: u32,
    /// Input staging block size in frames (default: 8192). The output
    /// staging buffer is twice this.
    pub staging_frames: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            debounce_threshold: 5,
            staging_frames: 8192,
        }
    }
}

impl PipelineConfig {
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn debounce_threshold(mut self, reads: u32) -> Self {
        self.debounce_threshold = reads;
        self
    }

    pub fn staging_frames(mut self, frames: usize) -> Self {
        self.staging_frames = frames;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfig(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.debounce_threshold == 0 {
            return Err(Error::InvalidConfig(
                "debounce_threshold must be at least 1".to_string(),
            ));
        }
        if self.staging_frames == 0 {
            return Err(Error::InvalidConfig(
                "staging_frames must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_iterations, 2000);
        assert_eq!(config.debounce_threshold, 5);
        assert_eq!(config.staging_frames, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_setters() {
        let config = PipelineConfig::default()
            .max_iterations(10)
            .debounce_threshold(2)
            .staging_frames(64);
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.debounce_threshold, 2);
        assert_eq!(config.staging_frames, 64);
    }

    #[test]
    fn test_zero_fields_rejected() {
        assert!(PipelineConfig::default().max_iterations(0).validate().is_err());
        assert!(PipelineConfig::default().debounce_threshold(0).validate().is_err());
        assert!(PipelineConfig::default().staging_frames(0).validate().is_err());
    }
}
