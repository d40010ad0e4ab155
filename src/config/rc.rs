use crate::search::{DEFAULT_MAX_MATCHES, PatternFlags};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const HISTORY_LIMIT_RANGE: (usize, usize) = (1, 100);
pub const MAX_MATCHES_RANGE: (usize, usize) = (1, 10_000);
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct RcConfig {
    pub history_limit: usize,
    pub max_matches: usize,
    pub flags: PatternFlags,
    pub history_file: Option<PathBuf>,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_matches: DEFAULT_MAX_MATCHES,
            flags: PatternFlags::global(),
            history_file: None,
        }
    }
}

impl RcConfig {
    pub fn set_history_limit(&mut self, value: usize) {
        self.history_limit = clamp(value, HISTORY_LIMIT_RANGE);
    }

    pub fn set_max_matches(&mut self, value: usize) {
        self.max_matches = clamp(value, MAX_MATCHES_RANGE);
    }

    /// History file from the rc file, else `~/.markfind_history.json`.
    pub fn history_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.history_file {
            return Some(path.clone());
        }
        env::var("HOME")
            .ok()
            .map(|home| Path::new(&home).join(".markfind_history.json"))
    }
}

pub fn clamp(value: usize, (low, high): (usize, usize)) -> usize {
    value.clamp(low, high)
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .markfindrc in:
    /// 1. Current directory
    /// 2. Home directory (~/.markfindrc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(".markfindrc");
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(".markfindrc");
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    pub fn load_config() -> RcConfig {
        match Self::get_rc_path() {
            Some(path) => Self::load_from(&path),
            None => RcConfig::default(),
        }
    }

    pub fn load_from(path: &Path) -> RcConfig {
        let mut config = RcConfig::default();
        match fs::read_to_string(path) {
            Ok(content) => Self::parse_config_content(&content, &mut config),
            Err(e) => log::warn!("could not read {}: {e}", path.display()),
        }
        config
    }

    fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Remove inline comments
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        let setting = line.strip_prefix("set ").map(str::trim).unwrap_or(line);
        let Some((key, value)) = setting.split_once('=') else {
            log::debug!("ignoring rc line without a value: {line}");
            return;
        };
        let (key, value) = (key.trim(), value.trim());

        match key {
            "history_limit" | "historylimit" => {
                if let Ok(limit) = value.parse::<usize>() {
                    config.set_history_limit(limit);
                }
            }
            "max_matches" | "maxmatches" => {
                if let Ok(max) = value.parse::<usize>() {
                    config.set_max_matches(max);
                }
            }
            "flags" => match PatternFlags::parse(value) {
                Ok(flags) => config.flags = flags,
                Err(e) => log::warn!("ignoring rc flags '{value}': {e}"),
            },
            "history_file" | "historyfile" => {
                if !value.is_empty() {
                    config.history_file = Some(PathBuf::from(value));
                }
            }
            _ => log::debug!("unknown rc setting: {key}"),
        }
    }

    /// Generate a sample RC file content
    pub fn generate_sample_rc() -> String {
        r#"# markfind configuration file (.markfindrc)
# Lines starting with # or " are comments

set history_limit=20     # Remembered patterns (1-100)
set max_matches=1000     # Matches highlighted per search (1-10000)
set flags=g              # Default flags: g i m s u

# Alternative key=value syntax:
# history_file=/home/me/.markfind_history.json
"#
        .to_string()
    }
}
