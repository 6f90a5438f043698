use crate::core::loader::LoadMode;
use crate::core::ConfigProvider;
use crate::db::{DatabaseUrl, Table};
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "foodshare.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub loader: LoaderConfig,
    pub catalog: CatalogConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:///food_waste.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub data_dir: String,
    pub mode: LoadMode,
    pub sources: SourcesConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            mode: LoadMode::Append,
            sources: SourcesConfig::default(),
        }
    }
}

/// Per-table file name overrides; unset tables use the standard export names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    pub providers: Option<String>,
    pub receivers: Option<String>,
    pub food_listings: Option<String>,
    pub claims: Option<String>,
}

impl SourcesConfig {
    pub fn file_for(&self, table: Table) -> String {
        let configured = match table {
            Table::Providers => &self.providers,
            Table::Receivers => &self.receivers,
            Table::FoodListings => &self.food_listings,
            Table::Claims => &self.claims,
        };
        configured
            .clone()
            .unwrap_or_else(|| table.default_source().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// City bound into the provider-contacts entry.
    pub contact_city: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            contact_city: "New York".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub chart_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            chart_width: 40,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Load `path` when it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            tracing::debug!("Loading configuration from {}", path.as_ref().display());
            Self::from_file(path)
        } else {
            tracing::debug!(
                "No configuration at {}, using defaults",
                path.as_ref().display()
            );
            Ok(Self::default())
        }
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${DATABASE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| TrackerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn contact_city(&self) -> &str {
        &self.catalog.contact_city
    }
}

impl ConfigProvider for AppConfig {
    fn database_url(&self) -> &str {
        &self.database.url
    }

    fn data_dir(&self) -> &str {
        &self.loader.data_dir
    }

    fn load_mode(&self) -> LoadMode {
        self.loader.mode
    }

    fn source_file(&self, table: Table) -> String {
        self.loader.sources.file_for(table)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        DatabaseUrl::parse(&self.database.url)?;
        validation::validate_path("loader.data_dir", &self.loader.data_dir)?;
        for table in Table::ALL {
            validation::validate_file_extension(
                "loader.sources",
                &self.loader.sources.file_for(table),
                &["csv"],
            )?;
        }
        validation::validate_non_empty_string("catalog.contact_city", &self.catalog.contact_city)?;
        validation::validate_range("output.chart_width", self.output.chart_width, 1, 200)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.database_url(), "sqlite:///food_waste.db");
        assert_eq!(config.data_dir(), "data");
        assert_eq!(config.load_mode(), LoadMode::Append);
        assert_eq!(config.source_file(Table::Claims), "claims_data.csv");
        assert_eq!(config.contact_city(), "New York");
        assert_eq!(config.output.chart_width, 40);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[database]
url = "sqlite:///snapshots/food.db"

[loader]
data_dir = "./exports"
mode = "replace"

[loader.sources]
claims = "claims_2025.csv"

[catalog]
contact_city = "Boston"

[output]
format = "json"
chart_width = 60
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.load_mode(), LoadMode::Replace);
        assert_eq!(config.source_file(Table::Claims), "claims_2025.csv");
        assert_eq!(config.source_file(Table::Providers), "providers_data.csv");
        assert_eq!(config.contact_city(), "Boston");
        assert_eq!(config.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FOODSHARE_TEST_DB", "sqlite:///from_env.db");

        let config = AppConfig::from_toml_str(
            r#"
[database]
url = "${FOODSHARE_TEST_DB}"
"#,
        )
        .unwrap();
        assert_eq!(config.database_url(), "sqlite:///from_env.db");

        std::env::remove_var("FOODSHARE_TEST_DB");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.database.url = "postgresql://postgres@localhost/food_waste_db".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.catalog.contact_city = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.output.chart_width = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.loader.sources.providers = Some("providers.xlsx".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let err = AppConfig::from_toml_str("[loader]\nmode = \"merge\"\n").unwrap_err();
        assert!(matches!(err, TrackerError::TomlError(_)));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[loader]\ndata_dir = \"fixtures\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.data_dir(), "fixtures");
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config = AppConfig::load_or_default("/definitely/not/here/foodshare.toml").unwrap();
        assert_eq!(config.data_dir(), "data");
    }
}
