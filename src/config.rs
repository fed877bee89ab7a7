//! Application configuration loaded from a JSON file.
//!
//! The configuration is validated once at startup, before any tweet is
//! processed; every component treats it as read-only afterwards. Command-line
//! overrides are applied to the in-memory copy before validation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::TweetshotError;

/// Seconds to wait between page load and capture. Embedded widgets render
/// asynchronously and expose no completion signal, so the capture simply
/// waits this long.
pub const DEFAULT_SCREENSHOT_DELAY_SECS: u64 = 20;

pub const SUPPORTED_EMBED_ALIGNS: &[&str] = &["left", "right", "center", "none"];
pub const SUPPORTED_EMBED_THEMES: &[&str] = &["light", "dark"];
pub const SUPPORTED_EMBED_WIDGET_TYPES: &[&str] = &["video", ""];
pub const SUPPORTED_EMBED_LANGUAGES: &[&str] = &[
    "en", "ar", "bn", "cs", "da", "de", "el", "es", "fa", "fi", "fil", "fr", "he", "hi", "hu",
    "id", "it", "ja", "ko", "msa", "nl", "no", "pl", "pt", "ro", "ru", "sv", "th", "tr", "uk",
    "ur", "vi", "zh-cn", "zh-tw",
];
pub const EMBED_MAXWIDTH_MIN: u32 = 220;
pub const EMBED_MAXWIDTH_MAX: u32 = 550;

const EMBED_BOOL_VALUES: &[&str] = &["true", "false", "1", "0"];
const EMBED_BOOL_KEYS: &[&str] = &["hide_media", "hide_thread", "omit_script", "dnt"];

/// Embed-rendering parameters, passed through to the embed endpoint as query
/// parameters after validation.
pub type EmbedOptions = BTreeMap<String, String>;

/// Supported headless browser variants. Both speak the DevTools protocol and
/// expose the same capability set; only the launch configuration differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chromium,
    Chrome,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeadlessBrowserConfig {
    pub name: BrowserKind,
    pub executable_path: PathBuf,

    /// Extra command-line arguments appended to the variant defaults.
    #[serde(default)]
    pub args: Vec<String>,

    /// Settle delay before every screenshot, in seconds.
    #[serde(default = "default_screenshot_delay")]
    pub screenshot_delay: u64,
}

fn default_screenshot_delay() -> u64 {
    DEFAULT_SCREENSHOT_DELAY_SECS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Destination directory for captured images. Must already exist.
    pub path: PathBuf,

    /// Filename template. Recognized placeholders: `{id}`, `{author}`,
    /// `{random}`, `{no}`.
    #[serde(default = "default_name_template")]
    pub name: String,

    /// Re-download tweets whose image file already exists.
    #[serde(default)]
    pub update: bool,
}

fn default_name_template() -> String {
    "{id}.png".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResizeOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PostProcessConfig {
    #[serde(default)]
    pub trim: bool,

    #[serde(default)]
    pub resize: bool,

    #[serde(default)]
    pub resize_options: ResizeOptions,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub headless_browser: HeadlessBrowserConfig,
    pub download: DownloadConfig,
    #[serde(default)]
    pub twit_embed: Option<EmbedOptions>,
    #[serde(default)]
    pub postprocess: Option<PostProcessConfig>,
}

impl AppConfig {
    /// Read and deserialize a configuration file. The result is not yet
    /// validated; callers apply overrides first, then call [`validate`].
    ///
    /// [`validate`]: AppConfig::validate
    pub fn load(path: &Path) -> Result<Self, TweetshotError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TweetshotError::Validation(format!(
                "configuration file {} can't be read: {e}",
                path.display()
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            TweetshotError::Validation(format!(
                "configuration file {} is not valid: {e}",
                path.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<(), TweetshotError> {
        if !self.download.path.is_dir() {
            return Err(TweetshotError::Validation(format!(
                "download directory {} does not exist",
                self.download.path.display()
            )));
        }
        if !self.headless_browser.executable_path.is_file() {
            return Err(TweetshotError::Validation(format!(
                "browser executable {} does not exist",
                self.headless_browser.executable_path.display()
            )));
        }
        if let Some(options) = &self.twit_embed {
            validate_embed_options(options)?;
        }
        Ok(())
    }
}

/// Check every embed option against its enumerated allowed set. Unknown keys
/// are rejected so typos never reach the remote endpoint.
pub fn validate_embed_options(options: &EmbedOptions) -> Result<(), TweetshotError> {
    for (key, value) in options {
        match key.as_str() {
            "maxwidth" => {
                let width: u32 = value.parse().map_err(|_| invalid_option(key, value))?;
                if !(EMBED_MAXWIDTH_MIN..=EMBED_MAXWIDTH_MAX).contains(&width) {
                    return Err(invalid_option(key, value));
                }
            }
            "align" => check_allowed(key, value, SUPPORTED_EMBED_ALIGNS)?,
            "theme" => check_allowed(key, value, SUPPORTED_EMBED_THEMES)?,
            "lang" => check_allowed(key, value, SUPPORTED_EMBED_LANGUAGES)?,
            "widget_type" => check_allowed(key, value, SUPPORTED_EMBED_WIDGET_TYPES)?,
            k if EMBED_BOOL_KEYS.contains(&k) => check_allowed(key, value, EMBED_BOOL_VALUES)?,
            _ => {
                return Err(TweetshotError::Validation(format!(
                    "embed option {key} is not supported"
                )));
            }
        }
    }
    Ok(())
}

fn check_allowed(key: &str, value: &str, allowed: &[&str]) -> Result<(), TweetshotError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(invalid_option(key, value))
    }
}

fn invalid_option(key: &str, value: &str) -> TweetshotError {
    TweetshotError::Validation(format!("embed option {key} has disallowed value {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> EmbedOptions {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_embed_options_allowed_values() {
        let opts = options(&[
            ("theme", "dark"),
            ("align", "center"),
            ("lang", "de"),
            ("maxwidth", "550"),
            ("hide_media", "true"),
        ]);
        assert!(validate_embed_options(&opts).is_ok());
    }

    #[test]
    fn test_embed_options_rejects_out_of_range_maxwidth() {
        assert!(validate_embed_options(&options(&[("maxwidth", "600")])).is_err());
        assert!(validate_embed_options(&options(&[("maxwidth", "100")])).is_err());
        assert!(validate_embed_options(&options(&[("maxwidth", "wide")])).is_err());
    }

    #[test]
    fn test_embed_options_rejects_unknown_key() {
        let err = validate_embed_options(&options(&[("colour", "red")])).unwrap_err();
        assert!(matches!(err, TweetshotError::Validation(_)));
    }

    #[test]
    fn test_embed_options_rejects_disallowed_value() {
        assert!(validate_embed_options(&options(&[("theme", "sepia")])).is_err());
        assert!(validate_embed_options(&options(&[("lang", "tlh")])).is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{
                "headless_browser": {"name": "chromium", "executable_path": "/usr/bin/chromium"},
                "download": {"path": "images"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.headless_browser.name, BrowserKind::Chromium);
        assert_eq!(
            config.headless_browser.screenshot_delay,
            DEFAULT_SCREENSHOT_DELAY_SECS
        );
        assert_eq!(config.download.name, "{id}.png");
        assert!(!config.download.update);
        assert!(config.twit_embed.is_none());
        assert!(config.postprocess.is_none());
    }

    #[test]
    fn test_validate_requires_existing_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let executable = dir.path().join("browser");
        std::fs::write(&executable, "").unwrap();

        let config = AppConfig {
            headless_browser: HeadlessBrowserConfig {
                name: BrowserKind::Chrome,
                executable_path: executable,
                args: Vec::new(),
                screenshot_delay: 0,
            },
            download: DownloadConfig {
                path: dir.path().join("missing"),
                name: default_name_template(),
                update: false,
            },
            twit_embed: None,
            postprocess: None,
        };
        assert!(matches!(
            config.validate(),
            Err(TweetshotError::Validation(_))
        ));
    }
}
