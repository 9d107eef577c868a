/// Simulator configuration
use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stride_reels::FeedConfig;

const DEFAULT_CONFIG_FILE: &str = "reel-sim.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default = "default_viewer")]
    pub viewer: ViewerSettings,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default = "default_sim")]
    pub sim: SimSettings,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerSettings {
    /// Backend base URL; unused when a fixture is given
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ViewerSettings {
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Authors whose reels the viewer sees besides their own
    #[serde(default)]
    pub following: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimSettings {
    #[serde(default)]
    pub fixture: Option<PathBuf>,

    #[serde(default = "default_steps")]
    pub steps: usize,

    #[serde(default = "default_viewport_height_px")]
    pub viewport_height_px: f32,
}

impl SimConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `reel-sim.toml` in the
    /// working directory is read when present. Environment variables
    /// prefixed with `STRIDE_` override both, with `__` between sections
    /// (e.g. `STRIDE_SERVER__ACCESS_TOKEN`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("STRIDE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("viewer.following")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.viewer.user_id.trim().is_empty() {
            return Err(SimError::Config(
                "viewer.user_id is required (set STRIDE_VIEWER__USER_ID)".to_string(),
            ));
        }

        if self.sim.fixture.is_none() && self.server.url.is_none() {
            return Err(SimError::Config(
                "either sim.fixture or server.url must be set".to_string(),
            ));
        }

        if self.feed.item_height_px <= 0.0 || self.sim.viewport_height_px <= 0.0 {
            return Err(SimError::Config(
                "item and viewport heights must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_viewer() -> ViewerSettings {
    ViewerSettings {
        user_id: default_user_id(),
        following: vec![],
    }
}

fn default_user_id() -> String {
    "me".to_string()
}

fn default_sim() -> SimSettings {
    SimSettings {
        fixture: None,
        steps: default_steps(),
        viewport_height_px: default_viewport_height_px(),
    }
}

fn default_steps() -> usize {
    5
}

fn default_viewport_height_px() -> f32 {
    844.0
}

impl Default for ViewerSettings {
    fn default() -> Self {
        default_viewer()
    }
}

impl Default for SimSettings {
    fn default() -> Self {
        default_sim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn file_values_fill_nested_sections() {
        let file = write_config(
            r#"
            [viewer]
            user_id = "runner-7"
            following = ["ana", "bo"]

            [feed]
            dwell_ms = 120

            [sim]
            fixture = "fixtures/reels.json"
            steps = 3
            "#,
        );

        let config = SimConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.viewer.user_id, "runner-7");
        assert_eq!(config.viewer.following, vec!["ana", "bo"]);
        assert_eq!(config.feed.dwell_ms, 120);
        assert_eq!(config.feed.item_height_px, 844.0);
        assert_eq!(config.sim.steps, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = SimConfig::load(Some(Path::new("/nonexistent/reel-sim.toml")));
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn requires_a_source_of_reels() {
        let config = SimConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.url"));
    }

    #[test]
    fn rejects_blank_viewer() {
        let mut config = SimConfig::default();
        config.server.url = Some("http://localhost:8080".into());
        config.viewer.user_id = "  ".into();
        assert!(config.validate().is_err());
    }
}
