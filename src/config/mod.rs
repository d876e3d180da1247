use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "https://waydown-backend-0w9y.onrender.com";
pub const PROJECT_CONFIG_DIR: &str = ".waydown";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub chat_webhook_url: Option<String>,
    pub log_level: String,
    pub log_file: PathBuf,
    pub http: HttpConfig,
    pub search: SearchConfig,
    pub community: CommunityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            chat_webhook_url: None,
            log_level: "info".to_string(),
            log_file: PathBuf::from("./waydown.log"),
            http: HttpConfig::default(),
            search: SearchConfig::default(),
            community: CommunityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HttpConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub suggest_timeout_ms: u64,
    pub search_timeout_ms: u64,
    pub suggestions_path: String,
    pub search_path: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            suggest_timeout_ms: 5_000,
            search_timeout_ms: 5_000,
            suggestions_path: "/api/spots/search/suggestions".to_string(),
            search_path: "/api/spots/search".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn suggest_timeout(&self) -> Duration {
        Duration::from_millis(self.suggest_timeout_ms)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommunityConfig {
    pub popular_users_limit: usize,
    pub trending_tags_limit: usize,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            popular_users_limit: 4,
            trending_tags_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub chat_webhook_url: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub http: Option<PartialHttpConfig>,
    pub search: Option<PartialSearchConfig>,
    pub community: Option<PartialCommunityConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PartialHttpConfig {
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PartialSearchConfig {
    pub debounce_ms: Option<u64>,
    pub suggest_timeout_ms: Option<u64>,
    pub search_timeout_ms: Option<u64>,
    pub suggestions_path: Option<String>,
    pub search_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PartialCommunityConfig {
    pub popular_users_limit: Option<usize>,
    pub trending_tags_limit: Option<usize>,
}

impl FileConfig {
    /// Layers `self` over `lower`: any field set here wins, the rest falls
    /// through to `lower`.
    pub fn over(self, lower: FileConfig) -> FileConfig {
        FileConfig {
            base_url: self.base_url.or(lower.base_url),
            token: self.token.or(lower.token),
            chat_webhook_url: self.chat_webhook_url.or(lower.chat_webhook_url),
            log_level: self.log_level.or(lower.log_level),
            log_file: self.log_file.or(lower.log_file),
            http: match (self.http, lower.http) {
                (Some(h), Some(l)) => Some(PartialHttpConfig {
                    connect_timeout_ms: h.connect_timeout_ms.or(l.connect_timeout_ms),
                    request_timeout_ms: h.request_timeout_ms.or(l.request_timeout_ms),
                }),
                (h, l) => h.or(l),
            },
            search: match (self.search, lower.search) {
                (Some(s), Some(l)) => Some(PartialSearchConfig {
                    debounce_ms: s.debounce_ms.or(l.debounce_ms),
                    suggest_timeout_ms: s.suggest_timeout_ms.or(l.suggest_timeout_ms),
                    search_timeout_ms: s.search_timeout_ms.or(l.search_timeout_ms),
                    suggestions_path: s.suggestions_path.or(l.suggestions_path),
                    search_path: s.search_path.or(l.search_path),
                }),
                (s, l) => s.or(l),
            },
            community: match (self.community, lower.community) {
                (Some(c), Some(l)) => Some(PartialCommunityConfig {
                    popular_users_limit: c.popular_users_limit.or(l.popular_users_limit),
                    trending_tags_limit: c.trending_tags_limit.or(l.trending_tags_limit),
                }),
                (c, l) => c.or(l),
            },
        }
    }
}

/// Values given on the command line. They beat env vars and config files.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub token: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn load(cli: CliOverrides) -> Result<Self> {
        let project_root = std::env::current_dir().context("resolve current dir")?;
        let project_cfg = load_project_config(&project_root).unwrap_or_default();
        let file_cfg = load_file_config().unwrap_or_default();
        Ok(Self::resolve(cli, project_cfg.over(file_cfg)))
    }

    /// Precedence: CLI > env > merged file config > defaults.
    pub fn resolve(cli: CliOverrides, file_cfg: FileConfig) -> Self {
        let defaults = AppConfig::default();
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let base_url = cli
            .base_url
            .or_else(|| env("WAYDOWN_BASE_URL"))
            .or(file_cfg.base_url)
            .unwrap_or(defaults.base_url);
        let token = cli
            .token
            .or_else(|| env("WAYDOWN_TOKEN"))
            .or(file_cfg.token);
        let chat_webhook_url = env("WAYDOWN_CHAT_WEBHOOK_URL").or(file_cfg.chat_webhook_url);
        let log_level = cli
            .log_level
            .or_else(|| env("WAYDOWN_LOG"))
            .or(file_cfg.log_level)
            .unwrap_or(defaults.log_level);
        let log_file = cli
            .log_file
            .or(file_cfg.log_file)
            .unwrap_or(defaults.log_file);

        let http = match file_cfg.http {
            Some(p) => HttpConfig {
                connect_timeout_ms: p
                    .connect_timeout_ms
                    .unwrap_or(defaults.http.connect_timeout_ms),
                request_timeout_ms: p
                    .request_timeout_ms
                    .unwrap_or(defaults.http.request_timeout_ms),
            },
            None => defaults.http,
        };

        let search = match file_cfg.search {
            Some(p) => SearchConfig {
                debounce_ms: p.debounce_ms.unwrap_or(defaults.search.debounce_ms),
                suggest_timeout_ms: p
                    .suggest_timeout_ms
                    .unwrap_or(defaults.search.suggest_timeout_ms),
                search_timeout_ms: p
                    .search_timeout_ms
                    .unwrap_or(defaults.search.search_timeout_ms),
                suggestions_path: p
                    .suggestions_path
                    .unwrap_or(defaults.search.suggestions_path),
                search_path: p.search_path.unwrap_or(defaults.search.search_path),
            },
            None => defaults.search,
        };

        let community = match file_cfg.community {
            Some(p) => CommunityConfig {
                popular_users_limit: p
                    .popular_users_limit
                    .unwrap_or(defaults.community.popular_users_limit),
                trending_tags_limit: p
                    .trending_tags_limit
                    .unwrap_or(defaults.community.trending_tags_limit),
            },
            None => defaults.community,
        };

        Self {
            base_url,
            token,
            chat_webhook_url,
            log_level,
            log_file,
            http,
            search,
            community,
        }
    }
}

pub fn load_file_config() -> Result<FileConfig> {
    fn candidate_paths() -> Vec<PathBuf> {
        let mut v = Vec::new();
        if let Ok(p) = std::env::var("WAYDOWN_CONFIG") {
            v.push(PathBuf::from(p));
        }
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            v.push(Path::new(&xdg_home).join("waydown/config.toml"));
        } else if let Some(dir) = dirs::config_dir() {
            v.push(dir.join("waydown/config.toml"));
        }
        v
    }

    for p in candidate_paths() {
        if p.exists() {
            let s = fs::read_to_string(&p)
                .with_context(|| format!("read config file: {}", p.display()))?;
            match toml::from_str::<FileConfig>(&s) {
                Ok(cfg) => {
                    info!(path=%p.display(), "loaded config file");
                    return Ok(cfg);
                }
                Err(e) => {
                    warn!(path=%p.display(), error=%e.to_string(), "parse config failed");
                    continue;
                }
            }
        }
    }
    Ok(FileConfig::default())
}

/// Load project-specific configuration from .waydown/config.toml
pub fn load_project_config(project_root: &Path) -> Result<FileConfig> {
    let path = project_root.join(PROJECT_CONFIG_DIR).join("config.toml");
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let s = fs::read_to_string(&path)
        .with_context(|| format!("read project config file: {}", path.display()))?;
    match toml::from_str::<FileConfig>(&s) {
        Ok(cfg) => {
            info!(path=%path.display(), "loaded project config file");
            Ok(cfg)
        }
        Err(e) => {
            warn!(path=%path.display(), error=%e.to_string(), "parse project config failed");
            Ok(FileConfig::default())
        }
    }
}
