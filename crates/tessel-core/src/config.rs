use crate::{logging, profiling};

/// Process-level configuration for applications embedding Tessel.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Explicit `tracing` filter. `None` defers to `RUST_LOG`.
    pub log_filter: Option<String>,
    pub profiling: ProfilingMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProfilingMode {
    /// Profiling scopes stay inert
    #[default]
    Off,
    /// Scopes are recorded in-process
    On,
    /// Scopes are recorded and served to external tools such as 'puffin_viewer'
    #[cfg(feature = "profiling")]
    WithWebserver,
}

impl Config {
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    pub fn with_profiling(mut self, mode: ProfilingMode) -> Self {
        self.profiling = mode;
        self
    }

    /// Install the logging subscriber and switch on profiling as configured.
    pub fn apply(&self) {
        match &self.log_filter {
            Some(filter) => logging::init_with_filter(filter),
            None => logging::init(),
        }

        match self.profiling {
            ProfilingMode::Off => {}
            ProfilingMode::On => profiling::init_profiling(profiling::ProfilingBackend::InProcess),
            #[cfg(feature = "profiling")]
            ProfilingMode::WithWebserver => {
                profiling::init_profiling(profiling::ProfilingBackend::PuffinHttp)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_quiet() {
        let config = Config::default();
        assert!(config.log_filter.is_none());
        assert_eq!(config.profiling, ProfilingMode::Off);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::default()
            .with_log_filter("tessel_render=debug")
            .with_profiling(ProfilingMode::On);
        assert_eq!(config.log_filter.as_deref(), Some("tessel_render=debug"));
        assert_eq!(config.profiling, ProfilingMode::On);
    }
}
