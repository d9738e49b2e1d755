use crate::adapters::submit::SubmitStrategy;
use crate::core::cascade::ZoneUsesRule;
use crate::core::loader::DataLayout;
use crate::core::session::SessionOptions;
use crate::utils::error::{IntakeError, Result};
use crate::utils::validation::{
    validate_country_code, validate_non_empty_string, validate_path, validate_range, validate_url,
    Validate,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeConfig {
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    pub name: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            name: "udcpr-intake".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Http,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub source: SourceKind,
    pub location: String,
    #[serde(default)]
    pub layout: DataLayout,
    #[serde(default)]
    pub zone_uses_rule: ZoneUsesRule,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Http,
            location: "http://127.0.0.1:5000/static/data/".to_string(),
            layout: DataLayout::Split,
            zone_uses_rule: ZoneUsesRule::ZoneId,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    pub endpoint: String,
    #[serde(default)]
    pub strategy: SubmitStrategy,
    pub timeout_seconds: Option<u64>,
    pub contact_country_code: Option<String>,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/submit".to_string(),
            strategy: SubmitStrategy::Multipart,
            timeout_seconds: None,
            contact_country_code: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl IntakeConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(IntakeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| IntakeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUBMIT_URL})；未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("form.name", &self.form.name)?;

        match self.data.source {
            SourceKind::Http => validate_url("data.location", &self.data.location)?,
            SourceKind::Local => validate_path("data.location", &self.data.location)?,
        }

        if self.submission.endpoint.trim().is_empty() {
            return Err(IntakeError::MissingConfigError {
                field: "submission.endpoint".to_string(),
            });
        }
        validate_url("submission.endpoint", &self.submission.endpoint)?;

        if let Some(timeout) = self.submission.timeout_seconds {
            validate_range("submission.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(code) = &self.submission.contact_country_code {
            validate_country_code("submission.contact_country_code", code)?;
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            let valid_levels = ["trace", "debug", "info", "warn", "error"];
            if !valid_levels.contains(&level) {
                return Err(IntakeError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", valid_levels.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.submission.timeout_seconds.map(Duration::from_secs)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            zone_uses_rule: self.data.zone_uses_rule,
            contact_country_code: self.submission.contact_country_code.clone(),
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for IntakeConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
