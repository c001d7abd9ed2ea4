use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

static ENV_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex"));

/// What the user asked this run to do.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// `name[@spec]` tokens
    pub packages: Vec<String>,
    pub all: bool,
    pub next: bool,
    pub force: bool,
    pub best_effort: bool,
    pub migrate_only: bool,
    pub from: Option<String>,
    pub to: Option<String>,
    pub dry_run: bool,
    pub skip_install: bool,
}

impl UpdateOptions {
    /// Split comma separated tokens, `a,b` is the same as `a b`.
    pub fn with_packages<I, S>(mut self, raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.packages = raw
            .into_iter()
            .flat_map(|token| {
                token
                    .as_ref()
                    .split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();
        self
    }
}

/// Where package documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub registry: Url,
    pub auth_token: Option<String>,
}

impl RegistryConfig {
    /// Read npmrc files for `project_root`; `registry_override` (`--registry`)
    /// beats every file.
    pub fn load(project_root: &Path, registry_override: Option<&str>) -> anyhow::Result<Self> {
        let mut settings = BTreeMap::new();
        for location in npmrc_locations(project_root) {
            match fs::read_to_string(&location) {
                Ok(text) => {
                    debug!("reading {}", location.display());
                    parse_npmrc(&text, &mut settings);
                }
                Err(_) => debug!("no npmrc at {}", location.display()),
            }
        }
        for value in settings.values_mut() {
            *value = substitute_env(value, |name| std::env::var(name).ok());
        }
        Self::from_settings(&settings, registry_override)
    }

    fn from_settings(
        settings: &BTreeMap<String, String>,
        registry_override: Option<&str>,
    ) -> anyhow::Result<Self> {
        let raw = registry_override
            .or_else(|| settings.get("registry").map(String::as_str))
            .unwrap_or(DEFAULT_REGISTRY);
        let registry = Url::parse(raw).with_context(|| format!("invalid registry url {raw:?}"))?;

        // `//host/path/:_authToken` scoped to the registry wins over a bare `_authToken`
        let scoped_key = format!(
            "//{}{}:_authToken",
            registry.host_str().unwrap_or_default(),
            with_trailing_slash(registry.path())
        );
        let auth_token = settings
            .get(&scoped_key)
            .or_else(|| settings.get("_authToken"))
            .filter(|token| !token.is_empty())
            .cloned();

        Ok(Self {
            registry,
            auth_token,
        })
    }
}

/// Later entries override earlier ones: global, user, then every ancestor of
/// the project from the filesystem root down to the project itself.
pub fn npmrc_locations(project_root: &Path) -> Vec<PathBuf> {
    let mut locations = Vec::new();
    if let Ok(prefix) = std::env::var("PREFIX") {
        locations.push(Path::new(&prefix).join("etc").join("npmrc"));
    }
    if let Ok(home) = std::env::var("HOME") {
        locations.push(Path::new(&home).join(".npmrc"));
    }
    let mut project: Vec<PathBuf> = project_root
        .ancestors()
        .map(|dir| dir.join(".npmrc"))
        .collect();
    project.reverse();
    locations.extend(project);
    locations
}

/// `key = value` lines; `#`/`;` comments and `[section]` headers are skipped.
pub fn parse_npmrc(text: &str, settings: &mut BTreeMap<String, String>) {
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(['#', ';']) || line.starts_with('[') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        settings.insert(key.trim().to_string(), value.to_string());
    }
}

/// Replace `${NAME}` with the variable's value, unset variables become empty.
pub fn substitute_env<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_REFERENCE
        .replace_all(value, |captures: &regex::Captures| {
            lookup(&captures[1]).unwrap_or_default()
        })
        .into_owned()
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}
