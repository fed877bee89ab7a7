//! Headless browser abstraction.
//!
//! Every variant exposes the same capability set: render an HTML snippet,
//! capture a screenshot after a settle delay, and read text out of an element.
//! The concrete variants only differ in how the browser process is launched.
//! One engine instance holds one live browser session for a whole run; callers
//! must not share it across concurrent renders.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::{BrowserKind, HeadlessBrowserConfig};
use crate::error::TweetshotError;
use crate::utils::random_token;

const TEMP_TOKEN_LEN: usize = 12;

/// Minimal host page the embed markup is injected into before rendering.
const PAGE_TEMPLATE: &str = "<!DOCTYPE html>\n\
<html>\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<style>body { margin: 0; background: #ffffff; }</style>\n\
</head>\n\
<body>\n\
{% embed %}\n\
</body>\n\
</html>\n";

/// The capability set every browser variant provides.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RenderEngine: Send {
    /// Write the embed markup into a host page on disk and load it.
    async fn render(&mut self, embed_html: &str) -> Result<(), TweetshotError>;

    /// Wait out the settle delay, then capture the loaded page to `path`.
    /// A failed capture is logged, not raised; a failed file write is raised.
    async fn screenshot(&mut self, path: &Path, settle: Duration) -> Result<(), TweetshotError>;

    /// Text content of the first element matching `selector`, or `None`.
    async fn extract_text(&mut self, selector: &str) -> Option<String>;

    /// Release the browser process. Safe to call more than once.
    async fn close(&mut self);
}

/// Select and launch the engine variant named in the configuration.
pub async fn create_engine(
    config: &HeadlessBrowserConfig,
) -> Result<Box<dyn RenderEngine>, TweetshotError> {
    match config.name {
        BrowserKind::Chromium => Ok(Box::new(ChromiumEngine::launch(config).await?)),
        BrowserKind::Chrome => Ok(Box::new(ChromeEngine::launch(config).await?)),
    }
}

/// Shared session state behind both variants: the browser process, the
/// DevTools event drain, the currently loaded page and its backing temp file.
struct BrowserSession {
    browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
    page: Option<Page>,
    temp_file: Option<PathBuf>,
}

impl BrowserSession {
    async fn launch(browser_config: BrowserConfig) -> Result<Self, TweetshotError> {
        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| TweetshotError::Render(format!("browser launch failed: {e}")))?;

        // The handler stream carries DevTools protocol traffic and must be
        // drained for the session to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {e}");
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            page: None,
            temp_file: None,
        })
    }

    async fn render(&mut self, embed_html: &str) -> Result<(), TweetshotError> {
        let page_html = PAGE_TEMPLATE.replace("{% embed %}", embed_html);
        let path = std::env::temp_dir().join(format!("{}.html", random_token(TEMP_TOKEN_LEN)));
        tokio::fs::write(&path, &page_html).await.map_err(|e| {
            TweetshotError::Render(format!("can't create file {}: {e}", path.display()))
        })?;

        let page_url = Url::from_file_path(&path).map_err(|_| {
            TweetshotError::Render(format!("can't build file URL for {}", path.display()))
        })?;

        if let Some(previous) = self.page.take() {
            let _ = previous.close().await;
        }
        let page = self
            .browser
            .new_page(page_url.as_str())
            .await
            .map_err(|e| {
                TweetshotError::Render(format!("can't open page {}: {e}", path.display()))
            })?;
        let _ = page.wait_for_navigation().await;

        self.page = Some(page);
        if let Some(old) = self.temp_file.replace(path) {
            let _ = tokio::fs::remove_file(old).await;
        }
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path, settle: Duration) -> Result<(), TweetshotError> {
        sleep(settle).await;
        let page = self.page.as_ref().ok_or_else(|| {
            TweetshotError::Render("no page is currently rendered".to_string())
        })?;

        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        match page.screenshot(params).await {
            Ok(bytes) => {
                tokio::fs::write(path, &bytes).await?;
            }
            Err(e) => warn!("screenshot capture failed: {e}"),
        }
        Ok(())
    }

    async fn extract_text(&mut self, selector: &str) -> Option<String> {
        let page = self.page.as_ref()?;
        let element = page.find_element(selector).await.ok()?;
        element
            .inner_text()
            .await
            .ok()
            .flatten()
            .filter(|text| !text.is_empty())
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        if let Err(e) = self.browser.close().await {
            error!("failed to close browser: {e}");
        }
        self.handler_task.abort();
        if let Some(path) = self.temp_file.take() {
            let _ = tokio::fs::remove_file(path).await;
        }
    }
}

const CHROMIUM_ARGS: &[&str] = &[
    "--headless",
    "--no-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--hide-scrollbars",
];

const CHROME_ARGS: &[&str] = &[
    "--headless=new",
    "--disable-gpu",
    "--mute-audio",
    "--no-first-run",
    "--hide-scrollbars",
];

fn build_browser_config(
    config: &HeadlessBrowserConfig,
    variant_args: &[&str],
) -> Result<BrowserConfig, TweetshotError> {
    let mut args: Vec<String> = variant_args.iter().map(|arg| arg.to_string()).collect();
    args.extend(config.args.iter().cloned());

    BrowserConfig::builder()
        .chrome_executable(&config.executable_path)
        .args(args)
        .build()
        .map_err(|e| TweetshotError::Render(format!("invalid browser configuration: {e}")))
}

pub struct ChromiumEngine {
    session: BrowserSession,
}

impl ChromiumEngine {
    pub async fn launch(config: &HeadlessBrowserConfig) -> Result<Self, TweetshotError> {
        let browser_config = build_browser_config(config, CHROMIUM_ARGS)?;
        Ok(Self {
            session: BrowserSession::launch(browser_config).await?,
        })
    }
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn render(&mut self, embed_html: &str) -> Result<(), TweetshotError> {
        self.session.render(embed_html).await
    }

    async fn screenshot(&mut self, path: &Path, settle: Duration) -> Result<(), TweetshotError> {
        self.session.screenshot(path, settle).await
    }

    async fn extract_text(&mut self, selector: &str) -> Option<String> {
        self.session.extract_text(selector).await
    }

    async fn close(&mut self) {
        self.session.close().await;
    }
}

pub struct ChromeEngine {
    session: BrowserSession,
}

impl ChromeEngine {
    pub async fn launch(config: &HeadlessBrowserConfig) -> Result<Self, TweetshotError> {
        let browser_config = build_browser_config(config, CHROME_ARGS)?;
        Ok(Self {
            session: BrowserSession::launch(browser_config).await?,
        })
    }
}

#[async_trait]
impl RenderEngine for ChromeEngine {
    async fn render(&mut self, embed_html: &str) -> Result<(), TweetshotError> {
        self.session.render(embed_html).await
    }

    async fn screenshot(&mut self, path: &Path, settle: Duration) -> Result<(), TweetshotError> {
        self.session.screenshot(path, settle).await
    }

    async fn extract_text(&mut self, selector: &str) -> Option<String> {
        self.session.extract_text(selector).await
    }

    async fn close(&mut self) {
        self.session.close().await;
    }
}
