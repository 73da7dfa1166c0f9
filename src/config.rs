use std::path::PathBuf;

use crate::logging::LoggingConfig;

/// Environment variable overriding [`AppConfig::shader_dir`].
pub const SHADER_DIR_ENV: &str = "TRIGON_SHADER_DIR";

/// Configuration for the playground window and its folders.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Where `shader.vert.wgsl` and `shader.frag.wgsl` live.
    pub shader_dir: PathBuf,
    /// F11 output.
    pub screenshot_dir: PathBuf,
    /// F10 output.
    pub dump_dir: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Trigon".to_string(),
            width: 1280,
            height: 720,
            shader_dir: PathBuf::from("shaders"),
            screenshot_dir: PathBuf::from("screenshots"),
            dump_dir: PathBuf::from("shader_dump"),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, with the shader directory taken from `TRIGON_SHADER_DIR` if set.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = var(SHADER_DIR_ENV).filter(|d| !d.is_empty()) {
            self.shader_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    pub fn screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    pub fn dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dir.into();
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::new();
        assert_eq!(config.title, "Trigon");
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.shader_dir, PathBuf::from("shaders"));
    }

    #[test]
    fn builder_overrides() {
        let config = AppConfig::new()
            .title("Plasma")
            .size(640, 480)
            .shader_dir("/tmp/plasma")
            .dump_dir("dumps");
        assert_eq!(config.title, "Plasma");
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.shader_dir, PathBuf::from("/tmp/plasma"));
        assert_eq!(config.dump_dir, PathBuf::from("dumps"));
        assert_eq!(config.screenshot_dir, PathBuf::from("screenshots"));
    }

    #[test]
    fn env_overrides_shader_dir() {
        let config = AppConfig::new().with_env(|key| {
            (key == SHADER_DIR_ENV).then(|| "/srv/shaders".to_string())
        });
        assert_eq!(config.shader_dir, PathBuf::from("/srv/shaders"));

        let config = AppConfig::new().with_env(|_| Some(String::new()));
        assert_eq!(config.shader_dir, PathBuf::from("shaders"));
    }
}
