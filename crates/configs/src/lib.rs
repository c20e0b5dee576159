use anyhow::Result;
use serde::Deserialize;
use anyhow::{anyhow, Context};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub election: ElectionConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 5000, worker_threads: Some(4) }
    }
}

/// Where the voter ledger lives on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_voters_file")]
    pub voters_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir(), voters_file: default_voters_file() }
    }
}

/// Ballot options. `abstain` must also appear in `candidates`; it is appended
/// during normalization when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct ElectionConfig {
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,
    #[serde(default = "default_abstain")]
    pub abstain: String,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self { candidates: default_candidates(), abstain: default_abstain() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { allowed_extensions: default_allowed_extensions() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrontendConfig {
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self { static_dir: default_static_dir() }
    }
}

fn default_data_dir() -> String { "data".into() }
fn default_voters_file() -> String { "data/voters_database.json".into() }
fn default_candidates() -> Vec<String> {
    vec!["Candidate A".into(), "Candidate B".into(), "Candidate C".into(), "NOTA".into()]
}
fn default_abstain() -> String { "NOTA".into() }
fn default_allowed_extensions() -> Vec<String> {
    vec!["wsq".into(), "jpg".into(), "jpeg".into(), "png".into()]
}
fn default_static_dir() -> String { "static".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<AppConfig> {
    load_from_file(&config_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file if present, otherwise defaults with env overrides applied.
    /// Only an absent file falls back to defaults; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load_or_default() -> Result<Self> {
        Self::load_or_default_from(&config_path())
    }

    pub fn load_or_default_from(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str::<AppConfig>(&content).with_context(|| format!("parsing config file {path}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(anyhow::Error::new(e).context(format!("reading config file {path}"))),
        };
        cfg.apply_env_overrides();
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        self.election.normalize_and_validate()?;
        self.upload.normalize_and_validate()?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Ok(file) = std::env::var("VOTERS_FILE") {
            self.storage.voters_file = file;
        }
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        if self.voters_file.trim().is_empty() {
            return Err(anyhow!("storage.voters_file is empty"));
        }
        Ok(())
    }
}

impl ElectionConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        for c in self.candidates.iter_mut() {
            *c = c.trim().to_string();
        }
        self.abstain = self.abstain.trim().to_string();
        if self.abstain.is_empty() {
            return Err(anyhow!("election.abstain must name the abstention option"));
        }
        if self.candidates.iter().any(|c| c.is_empty()) {
            return Err(anyhow!("election.candidates contains an empty label"));
        }
        if !self.candidates.contains(&self.abstain) {
            self.candidates.push(self.abstain.clone());
        }
        if self.candidates.len() < 2 {
            return Err(anyhow!("election.candidates needs at least one option besides abstention"));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.candidates.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(anyhow!("election.candidates lists {dup:?} twice"));
        }
        Ok(())
    }
}

impl UploadConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        self.allowed_extensions = self
            .allowed_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        if self.allowed_extensions.is_empty() {
            return Err(anyhow!("upload.allowed_extensions must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.election.candidates.len(), 4);
        assert_eq!(cfg.election.abstain, "NOTA");
        assert_eq!(cfg.upload.allowed_extensions, vec!["wsq", "jpg", "jpeg", "png"]);
    }

    #[test]
    fn parses_toml_and_appends_abstain() {
        let src = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [election]
            candidates = ["Alice", "Bob"]
            abstain = "None of the above"

            [upload]
            allowed_extensions = [".PNG", "wsq"]
        "#;
        let mut cfg: AppConfig = toml::from_str(src).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.election.candidates, vec!["Alice", "Bob", "None of the above"]);
        assert_eq!(cfg.upload.allowed_extensions, vec!["png", "wsq"]);
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.storage.voters_file, "data/voters_database.json");
    }

    #[test]
    fn rejects_duplicate_candidates() {
        let mut cfg = AppConfig::default();
        cfg.election.candidates = vec!["A".into(), "A".into(), "NOTA".into()];
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn rejects_ballot_with_only_abstain() {
        let mut cfg = AppConfig::default();
        cfg.election.candidates = vec![];
        assert!(cfg.normalize_and_validate().is_err());
    }

    fn scratch_file(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("configs_{tag}_{}.toml", std::process::id()))
    }

    #[test]
    fn malformed_config_file_is_an_error_not_defaults() {
        let path = scratch_file("malformed");
        std::fs::write(
            &path,
            "[election]\ncandidates = [\"Alice\", \"Bob\"\n[storage]\nvoters_file = \"/srv/real_ledger.json\"\n",
        )
        .unwrap();
        let res = AppConfig::load_or_default_from(path.to_str().unwrap());
        let _ = std::fs::remove_file(&path);
        assert!(res.is_err());
    }

    #[test]
    fn absent_config_file_falls_back_to_defaults() {
        let path = scratch_file("absent");
        let cfg = AppConfig::load_or_default_from(path.to_str().unwrap()).unwrap();
        assert!(cfg.election.candidates.contains(&"NOTA".to_string()));
    }

    #[test]
    fn present_config_file_is_used() {
        let path = scratch_file("present");
        std::fs::write(&path, "[election]\ncandidates = [\"Alice\", \"Bob\"]\n").unwrap();
        let cfg = AppConfig::load_or_default_from(path.to_str().unwrap()).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(cfg.election.candidates, vec!["Alice", "Bob", "NOTA"]);
    }

    #[test]
    fn rejects_zero_port() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }
}
