use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use papercuts_core::config::ClientConfig;

/// JSON file holding a [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> anyhow::Result<ClientConfig> {
        let bytes = fs::read(&self.path)
            .with_context(|| format!("read config: {}", self.path.display()))?;
        let cfg: ClientConfig = serde_json::from_slice(&bytes).context("decode config JSON")?;
        Ok(cfg)
    }

    pub fn save(&self, cfg: &ClientConfig) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(cfg).context("encode config JSON")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create config directory: {}", parent.display()))?;
        }

        // Write to a sibling temp file, then swap it in.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).with_context(|| format!("write temp: {}", tmp.display()))?;
        replace_file(&tmp, &self.path)
    }
}

fn replace_file(tmp: &Path, dst: &Path) -> anyhow::Result<()> {
    let backup = dst.with_extension("bak");

    if dst.exists() {
        let _ = fs::remove_file(&backup);
        fs::rename(dst, &backup)
            .with_context(|| format!("rename {} -> {}", dst.display(), backup.display()))?;
    }

    if let Err(e) = fs::rename(tmp, dst) {
        if backup.exists() {
            let _ = fs::rename(&backup, dst);
        }
        let _ = fs::remove_file(tmp);
        return Err(anyhow::Error::new(e)
            .context(format!("rename {} -> {}", tmp.display(), dst.display())));
    }

    let _ = fs::remove_file(&backup);
    Ok(())
}

/// Effective configuration: defaults, then the file (if given and present), then the
/// environment.
pub fn resolve_config(store: Option<&ConfigStore>) -> anyhow::Result<ClientConfig> {
    resolve_config_with(store, |key| std::env::var(key).ok())
}

pub fn resolve_config_with<F>(store: Option<&ConfigStore>, lookup: F) -> anyhow::Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let base = match store {
        Some(store) if store.exists() => store.load()?,
        Some(store) => {
            log::debug!("no config file at {}; using defaults", store.path().display());
            ClientConfig::default()
        }
        None => ClientConfig::default(),
    };
    let cfg = base.with_overrides(lookup);
    log::debug!("resolved config: {} mode, base {}", cfg.mode_label(), cfg.api_base);
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use papercuts_core::config::{ENV_API_URL, ENV_USE_MOCK};

    #[test]
    fn round_trips_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("nested").join("papercuts.json"));

        let cfg = ClientConfig {
            api_base: "https://pdf.example.com/api".into(),
            use_mock: true,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);

        // Overwrite leaves no temp or backup behind.
        store.save(&ClientConfig::default()).unwrap();
        assert_eq!(store.load().unwrap(), ClientConfig::default());
        let names: Vec<_> = fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("papercuts.json"));
        store
            .save(&ClientConfig {
                api_base: "http://file.local/api".into(),
                use_mock: false,
            })
            .unwrap();

        let cfg = resolve_config_with(Some(&store), |k| match k {
            ENV_USE_MOCK => Some("YES".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.api_base, "http://file.local/api");
        assert!(cfg.use_mock);

        let cfg = resolve_config_with(Some(&store), |k| {
            (k == ENV_API_URL).then(|| "http://env.local/api".to_string())
        })
        .unwrap();
        assert_eq!(cfg.api_base, "http://env.local/api");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::at_path(dir.path().join("absent.json"));
        let cfg = resolve_config_with(Some(&store), |_| None).unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = resolve_config_with(Some(&ConfigStore::at_path(path)), |_| None).unwrap_err();
        assert!(format!("{err:#}").contains("decode config JSON"));
    }
}
