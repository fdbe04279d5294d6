//! Run configuration: where lists live, how to talk HTTP, and credentials.
//!
//! Everything is explicit and passed down to whoever needs it. An optional
//! TOML file provides defaults; command-line arguments and environment
//! variables take precedence over it.
//!
//! ```toml
//! root = "list"
//!
//! [http]
//! user_agent = "Mozilla/5.0"
//! timeout_secs = 30
//! page_delay_min_ms = 1000
//! page_delay_max_ms = 3000
//! ```

use crate::error::*;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ROOT_ENV: &str = "GAMELISTS_ROOT";
pub const OPENAI_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_ROOT: &str = "list";
pub const COVERS_DIR: &str = "covers";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

/// Headers and pacing used for every request to a source site.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    /// Bounds of the random pause between two pages of the same list.
    pub page_delay_min_ms: u64,
    pub page_delay_max_ms: u64
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            user_agent: DEFAULT_USER_AGENT.into(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into(),
            accept_language: "en-US,en;q=0.9".into(),
            timeout_secs: 30,
            page_delay_min_ms: 1000,
            page_delay_max_ms: 3000
        }
    }
}

impl HttpConfig {
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The delay range with its bounds in order.
    pub fn page_delay_ms(&self) -> (u64, u64) {
        if self.page_delay_min_ms <= self.page_delay_max_ms {
            (self.page_delay_min_ms, self.page_delay_max_ms)
        } else {
            (self.page_delay_max_ms, self.page_delay_min_ms)
        }
    }
}

/// Contents of the optional configuration file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub root: Option<PathBuf>,
    pub http: HttpConfig
}

impl FileConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding one subdirectory per list.
    pub root: PathBuf,
    pub http: HttpConfig,
    openai_api_key: Option<String>
}

impl Settings {
    /// Loads the configuration file (if any) and applies the environment.
    pub fn load(config_path: Option<&Path>, root_arg: Option<PathBuf>) -> Result<Self> {
        let file = match config_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default()
        };

        Ok(Self::resolve(
            file,
            root_arg,
            env::var(ROOT_ENV).ok(),
            env::var(OPENAI_KEY_ENV).ok()
        ))
    }

    /// Precedence for the root: argument, environment, file, `list`.
    pub fn resolve(
        file: FileConfig,
        root_arg: Option<PathBuf>,
        env_root: Option<String>,
        openai_api_key: Option<String>
    ) -> Self {
        let root = root_arg
            .or_else(|| env_root.filter(|r| !r.trim().is_empty()).map(PathBuf::from))
            .or(file.root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));

        Settings {
            root,
            http: file.http,
            openai_api_key: openai_api_key.filter(|k| !k.trim().is_empty())
        }
    }

    pub fn list_dir(&self, list: &str) -> PathBuf {
        self.root.join(list)
    }

    /// The shared cover folder, next to the root rather than inside it so it
    /// is never mistaken for a list.
    pub fn covers_dir(&self) -> PathBuf {
        match self.root.parent() {
            Some(parent) => parent.join(COVERS_DIR),
            None => PathBuf::from(COVERS_DIR)
        }
    }

    pub fn openai_api_key(&self) -> Result<&str> {
        match self.openai_api_key {
            Some(ref key) => Ok(key.as_str()),
            None => bail!(ErrorKind::MissingEnvVar(OPENAI_KEY_ENV.into()))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let file: FileConfig = toml::from_str(
            "root = \"data/lists\"\n[http]\ntimeout_secs = 5\npage_delay_max_ms = 10\n"
        )
        .unwrap();

        assert_eq!(file.root, Some(PathBuf::from("data/lists")));
        assert_eq!(file.http.timeout(), Duration::from_secs(5));
        assert_eq!(file.http.page_delay_ms(), (10, 1000));
        assert_eq!(file.http.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn root_precedence() {
        let file = FileConfig {
            root: Some(PathBuf::from("from_file")),
            ..Default::default()
        };

        let s = Settings::resolve(file.clone(), Some("from_arg".into()), Some("from_env".into()), None);
        assert_eq!(s.root, PathBuf::from("from_arg"));

        let s = Settings::resolve(file.clone(), None, Some("from_env".into()), None);
        assert_eq!(s.root, PathBuf::from("from_env"));

        let s = Settings::resolve(file, None, Some(" ".into()), None);
        assert_eq!(s.root, PathBuf::from("from_file"));

        let s = Settings::resolve(FileConfig::default(), None, None, None);
        assert_eq!(s.list_dir("best"), PathBuf::from("list").join("best"));
        assert_eq!(s.covers_dir(), PathBuf::from("covers"));

        let s = Settings::resolve(FileConfig::default(), Some("data/list".into()), None, None);
        assert_eq!(s.covers_dir(), PathBuf::from("data").join("covers"));
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let s = Settings::resolve(FileConfig::default(), None, None, Some("".into()));
        let err = s.openai_api_key().unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Config);

        let s = Settings::resolve(FileConfig::default(), None, None, Some("sk-test".into()));
        assert_eq!(s.openai_api_key().unwrap(), "sk-test");
    }
}
