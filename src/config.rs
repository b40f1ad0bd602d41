use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

/// Every policy constant the engines use, passed in explicitly
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub heat: HeatThresholds,
    #[serde(default)]
    pub capacity: CapacityConfig,
}

/// Fallback effort (person-days) for lines without an explicit estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortPolicy {
    pub gateway: f64,
    pub milestone: f64,
    /// Multiplier on a task's duration in days; the result is rounded up and floored at 1
    pub task_factor: f64,
    /// Used when a line carries no date at all
    pub undated: f64,
}

impl Default for EffortPolicy {
    fn default() -> Self {
        Self {
            gateway: 0.5,
            milestone: 1.0,
            task_factor: 0.5,
            undated: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixConfig {
    /// Days of capacity a single cell represents
    pub time_window_days: f64,
    /// Person-days available per day of the window
    pub daily_capacity: f64,
    /// Requirement previews kept per milestone cell
    pub preview_limit: usize,
    #[serde(default)]
    pub effort: EffortPolicy,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            time_window_days: 30.0,
            daily_capacity: 1.0,
            preview_limit: 5,
            effort: EffortPolicy::default(),
        }
    }
}

/// Upper bounds (exclusive) of the low, normal and high heat buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatThresholds {
    pub low: f64,
    pub normal: f64,
    pub high: f64,
}

impl Default for HeatThresholds {
    fn default() -> Self {
        Self {
            low: 0.3,
            normal: 0.6,
            high: 0.85,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Share of calendar days treated as working days
    pub working_day_ratio: f64,
    /// Load percentage above which a lane is overloaded
    pub overload_percent: f64,
    /// Load percentage below which a lane with tasks is idle
    pub idle_percent: f64,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            working_day_ratio: 0.7,
            overload_percent: 100.0,
            idle_percent: 20.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("config").required(false));

        // Add environment variables with prefix "TIMELINE_", e.g. TIMELINE_SERVER__PORT
        config = config.add_source(
            config::Environment::with_prefix("TIMELINE")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
