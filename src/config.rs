use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::domain::entities::mapping::{Role, RoleSynonyms};
use crate::infra::export::layout::PageLayout;
use crate::usecase::services::report_service::ReportOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub toilet_label: String,
    pub list_not_accessed_in_notes: bool,
    pub layout: PageLayout,
    /// Extra header synonyms keyed by role name, e.g. `kitchenInstalled`.
    pub synonyms: BTreeMap<String, Vec<String>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let options = ReportOptions::default();
        Self {
            db_path: None,
            toilet_label: options.toilet_label,
            list_not_accessed_in_notes: options.list_not_accessed,
            layout: PageLayout::default(),
            synonyms: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("failed to parse config: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        for role in config.synonyms.keys() {
            if Role::parse(role).is_none() {
                return Err(anyhow!("unknown role in synonyms: {role}"));
            }
        }
        Ok(config)
    }

    pub fn role_synonyms(&self) -> RoleSynonyms {
        let mut synonyms = RoleSynonyms::default();
        for (role, extra) in &self.synonyms {
            if let Some(role) = Role::parse(role) {
                synonyms.extend(role, extra.iter().cloned());
            }
        }
        synonyms
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            toilet_label: self.toilet_label.clone(),
            list_not_accessed: self.list_not_accessed_in_notes,
        }
    }

    /// Explicit path first, then the config file, then the platform data dir.
    pub fn resolve_db_path(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit.or_else(|| self.db_path.clone()) {
            Some(path) => Ok(path),
            None => default_db_path(),
        }
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("com", "greenlight", "water-report")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))?;
    Ok(project_dirs.data_local_dir().join("report.sqlite"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::services::column_resolver::resolve_columns;
    use crate::domain::entities::table::RawTable;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = AppConfig::parse(
            r#"
            toilet_label = "1.28 GPF"

            [layout]
            chars_per_line = 50
            "#,
        )
        .expect("should parse config");
        assert_eq!(config.toilet_label, "1.28 GPF");
        assert!(!config.list_not_accessed_in_notes);
        assert_eq!(config.layout.chars_per_line, 50);
        assert_eq!(config.layout.page_height, PageLayout::default().page_height);
    }

    #[test]
    fn extra_synonyms_reach_the_resolver() {
        let config = AppConfig::parse(
            r#"
            [synonyms]
            kitchenInstalled = ["galley"]
            "#,
        )
        .expect("should parse config");
        let table = RawTable::new(vec!["Unit".to_string(), "Galley".to_string()], Vec::new());
        let mapping = resolve_columns(&table, &config.role_synonyms());
        assert_eq!(mapping.column(Role::KitchenInstalled), Some("Galley"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = AppConfig::parse("[synonyms]\nfaucet = [\"x\"]\n").expect_err("should reject role");
        assert!(err.to_string().contains("faucet"));
    }

    #[test]
    fn explicit_db_path_wins() {
        let config = AppConfig {
            db_path: Some(PathBuf::from("from-config.sqlite")),
            ..AppConfig::default()
        };
        assert_eq!(
            config
                .resolve_db_path(Some(PathBuf::from("cli.sqlite")))
                .expect("should resolve"),
            PathBuf::from("cli.sqlite")
        );
        assert_eq!(
            config.resolve_db_path(None).expect("should resolve"),
            PathBuf::from("from-config.sqlite")
        );
    }
}
