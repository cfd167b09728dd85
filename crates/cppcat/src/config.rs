//! Configuration management for cppcat.
//!
//! Configuration is layered with figment. Later layers override earlier ones:
//!
//! 1. Built-in defaults
//! 2. Global file at `~/.config/cppcat/config.toml`
//! 3. Project file `cppcat.toml` in the working directory, or the file
//!    given with `--config`
//! 4. Environment variables prefixed with `CPPCAT_`, nested keys separated
//!    by `__` (`CPPCAT_RENDER__SITE_TITLE`)
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::loader::{LoaderOptions, DEFAULT_INDEX_FILE};

/// Global configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory under the user config dir.
const CONFIG_DIR_NAME: &str = "cppcat";

/// Project configuration file, looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "cppcat.toml";

/// Environment variable prefix.
const ENV_PREFIX: &str = "CPPCAT_";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where things live on disk.
    pub paths: PathsConfig,
    /// Loader and checker settings.
    pub check: CheckConfig,
    /// Renderer settings.
    pub render: RenderConfig,
}

/// Directory locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root of the Markdown corpus.
    pub input_root: PathBuf,
    /// Root that example links are resolved against.
    pub example_root: PathBuf,
    /// Where the site is written.
    pub output_root: PathBuf,
}

/// Loader and checker settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Exit non-zero when error-severity findings exist.
    pub fail_on_findings: bool,
    /// Master index path relative to `input_root`.
    pub index_file: String,
}

/// Renderer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Title of the landing page.
    pub site_title: String,
    /// URL prefix for example files.
    pub example_url_base: String,
    /// Show checker findings on the rendered pages.
    pub annotate_findings: bool,
    /// Emit `search-index.json`.
    pub search_index: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("."),
            example_root: PathBuf::from("examples"),
            output_root: PathBuf::from("site"),
        }
    }
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            fail_on_findings: false,
            index_file: DEFAULT_INDEX_FILE.to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            site_title: "C++ Feature Catalog".to_string(),
            example_url_base: "examples".to_string(),
            annotate_findings: true,
            search_index: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or validation fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, using `config_path` instead of the project file
    /// when given.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let project = config_path.unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
        let config: Config = Self::figment(Some(&Self::default_config_path()), &project)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a single file on top of the defaults, ignoring the
    /// global file and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, cannot be parsed, or fails
    /// validation.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::config_validation(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config: Config = Self::figment(None, path).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus the file layers. Missing files are skipped.
    fn figment(global: Option<&Path>, project: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(global) = global {
            figment = figment.merge(Toml::file(global));
        }
        figment.merge(Toml::file(project))
    }

    /// Get the global configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let index_file = self.check.index_file.trim();
        if index_file.is_empty() {
            return Err(Error::config_validation("check.index_file must not be empty"));
        }
        let is_markdown = Path::new(index_file)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if !is_markdown {
            return Err(Error::ConfigValidation {
                message: format!("check.index_file must be a .md file, got '{index_file}'"),
            });
        }

        if self.render.site_title.trim().is_empty() {
            return Err(Error::config_validation("render.site_title must not be empty"));
        }

        Ok(())
    }

    /// Loader options derived from this configuration.
    #[must_use]
    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            index_file: self.check.index_file.trim().to_string(),
        }
    }

    /// Render the configuration as TOML-like text for `config show`.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        format!(
            "[paths]\n\
             input_root = {:?}\n\
             example_root = {:?}\n\
             output_root = {:?}\n\
             \n\
             [check]\n\
             fail_on_findings = {}\n\
             index_file = {:?}\n\
             \n\
             [render]\n\
             site_title = {:?}\n\
             example_url_base = {:?}\n\
             annotate_findings = {}\n\
             search_index = {}\n",
            self.paths.input_root.display().to_string(),
            self.paths.example_root.display().to_string(),
            self.paths.output_root.display().to_string(),
            self.check.fail_on_findings,
            self.check.index_file,
            self.render.site_title,
            self.render.example_url_base,
            self.render.annotate_findings,
            self.render.search_index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.paths.input_root, PathBuf::from("."));
        assert_eq!(config.paths.example_root, PathBuf::from("examples"));
        assert_eq!(config.paths.output_root, PathBuf::from("site"));
        assert!(!config.check.fail_on_findings);
        assert_eq!(config.check.index_file, "README.md");
        assert_eq!(config.render.site_title, "C++ Feature Catalog");
        assert!(config.render.annotate_findings);
        assert!(config.render.search_index);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_index_file() {
        let mut config = Config::default();
        config.check.index_file = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("index_file"));
    }

    #[test]
    fn test_validate_index_file_extension() {
        let mut config = Config::default();
        config.check.index_file = "index.txt".to_string();
        assert!(config.validate().is_err());

        config.check.index_file = "docs/INDEX.MD".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_site_title() {
        let mut config = Config::default();
        config.render.site_title = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("site_title"));
    }

    #[test]
    fn test_project_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "cppcat.toml",
            "[check]\nfail_on_findings = true\n\n[render]\nsite_title = \"Modern C++\"\n",
        );

        let config: Config = Config::figment(None, &path).extract().unwrap();
        assert!(config.check.fail_on_findings);
        assert_eq!(config.render.site_title, "Modern C++");
        assert_eq!(config.check.index_file, "README.md");
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn test_project_file_overrides_global_file() {
        let dir = TempDir::new().unwrap();
        let global = write_config(
            &dir,
            "global.toml",
            "[paths]\noutput_root = \"public\"\nexample_root = \"samples\"\n",
        );
        let project = write_config(&dir, "cppcat.toml", "[paths]\noutput_root = \"out\"\n");

        let config: Config = Config::figment(Some(&global), &project).extract().unwrap();
        assert_eq!(config.paths.output_root, PathBuf::from("out"));
        assert_eq!(config.paths.example_root, PathBuf::from("samples"));
    }

    #[test]
    fn test_missing_files_use_defaults() {
        let config: Config = Config::figment(
            Some(Path::new("/nonexistent/global.toml")),
            Path::new("/nonexistent/cppcat.toml"),
        )
        .extract()
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_file_requires_existing_file() {
        let err = Config::load_file(Path::new("/nonexistent/cppcat.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_file_validates() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "bad.toml", "[check]\nindex_file = \"index.html\"\n");
        let err = Config::load_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_file_reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "broken.toml", "[render]\nsearch_index = \"sometimes\"\n");
        let err = Config::load_file(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_loader_options() {
        let mut config = Config::default();
        config.check.index_file = " docs/index.md ".to_string();
        assert_eq!(config.loader_options().index_file, "docs/index.md");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("cppcat"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_display_string_lists_every_section() {
        let text = Config::default().to_display_string();
        assert!(text.contains("[paths]"));
        assert!(text.contains("[check]"));
        assert!(text.contains("[render]"));
        assert!(text.contains("index_file = \"README.md\""));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("example_url_base"));
        assert!(json.contains("fail_on_findings"));
    }

    #[test]
    fn test_render_config_deserialize_partial() {
        let json = r#"{"site_title": "Catalog"}"#;
        let render: RenderConfig = serde_json::from_str(json).unwrap();
        assert_eq!(render.site_title, "Catalog");
        assert!(render.search_index);
    }
}
