use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ClipError, ClipResult};

/// Name of the credentials file looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "config.cfg";

/// Main configuration structure for the clipthat application
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Remote service credentials
    pub auth: AuthConfig,
    /// Upload limits and polling cadence
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Gfycat API credentials
    pub gfycat: GfycatAuth,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GfycatAuth {
    /// OAuth client id issued by gfycat
    pub client_id: String,
    /// OAuth client secret issued by gfycat
    pub client_secret: String,
    /// Account username; only needed for non-anonymous uploads
    #[serde(default)]
    pub username: Option<String>,
    /// Account password; only needed for non-anonymous uploads
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Longest clip the remote service accepts, in seconds
    pub max_clip_seconds: f64,
    /// Delay between encode-status polls, in seconds
    pub poll_interval_secs: f64,
    /// Status checks before giving up on the remote encode
    pub max_poll_attempts: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_clip_seconds: 60.0,
            poll_interval_secs: 1.0,
            max_poll_attempts: 600,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    pub fn from_file(path: &Path) -> ClipResult<Self> {
        if !path.is_file() {
            return Err(ClipError::ConfigMissing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ClipError::ConfigInvalid(e.to_string()))
    }

    /// Save configuration to a TOML file
    ///
    /// # Arguments
    /// * `path` - Path where the configuration will be saved
    pub fn save_to_file(&self, path: &Path) -> ClipResult<()> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ClipError::ConfigInvalid(e.to_string()))?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Resolve the credentials file location
    ///
    /// A `--config` flag wins; otherwise `./config.cfg` is used when present,
    /// falling back to the platform config directory.
    pub fn resolve_path(cli_path: Option<PathBuf>) -> PathBuf {
        if let Some(path) = cli_path {
            return path;
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return local;
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("clipthat")
            .join("config.toml")
    }

    /// Credentials for a non-anonymous upload; errors when the config file
    /// only carries client credentials
    pub fn user_identity(&self) -> ClipResult<(&str, &str)> {
        match (
            self.auth.gfycat.username.as_deref(),
            self.auth.gfycat.password.as_deref(),
        ) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(ClipError::ConfigInvalid(
                "username and password are required unless --anon is set".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample_config() -> Config {
        Config {
            auth: AuthConfig {
                gfycat: GfycatAuth {
                    client_id: "id".to_string(),
                    client_secret: "secret".to_string(),
                    username: Some("user".to_string()),
                    password: Some("pass".to_string()),
                },
            },
            upload: UploadConfig::default(),
        }
    }

    #[test]
    fn test_default_upload_settings() {
        let upload = UploadConfig::default();
        assert_eq!(upload.max_clip_seconds, 60.0);
        assert_eq!(upload.poll_interval_secs, 1.0);
        assert_eq!(upload.max_poll_attempts, 600);
    }

    #[test]
    fn test_config_save_and_load() -> ClipResult<()> {
        let config = sample_config();

        let temp_file = NamedTempFile::new()?;
        config.save_to_file(temp_file.path())?;

        let loaded = Config::from_file(temp_file.path())?;
        assert_eq!(loaded.auth.gfycat.client_id, "id");
        assert_eq!(loaded.auth.gfycat.username.as_deref(), Some("user"));
        assert_eq!(loaded.upload.max_poll_attempts, 600);

        Ok(())
    }

    #[test]
    fn test_missing_file_is_config_missing() {
        let err = Config::from_file(Path::new("/no/such/config.cfg")).unwrap_err();
        assert!(matches!(err, ClipError::ConfigMissing(_)));
    }

    #[test]
    fn test_upload_section_is_optional() -> ClipResult<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(
            temp_file.path(),
            "[auth.gfycat]\nclient_id = \"id\"\nclient_secret = \"secret\"\n",
        )?;

        let loaded = Config::from_file(temp_file.path())?;
        assert_eq!(loaded.upload.max_clip_seconds, 60.0);
        assert!(loaded.auth.gfycat.username.is_none());
        assert!(matches!(
            loaded.user_identity(),
            Err(ClipError::ConfigInvalid(_))
        ));

        Ok(())
    }

    #[test]
    fn test_garbage_file_is_config_invalid() -> ClipResult<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(temp_file.path(), "not even = [ toml")?;

        let err = Config::from_file(temp_file.path()).unwrap_err();
        assert!(matches!(err, ClipError::ConfigInvalid(_)));

        Ok(())
    }

    #[test]
    fn test_cli_flag_wins_path_resolution() {
        let path = Config::resolve_path(Some(PathBuf::from("/tmp/creds.toml")));
        assert_eq!(path, PathBuf::from("/tmp/creds.toml"));
    }
}
