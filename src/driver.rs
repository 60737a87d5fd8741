//! Browser driver abstraction.
//!
//! The reporter only ever asks the automation driver two things: what
//! environment a spec ran under, and a screenshot of the current page. Both
//! live behind the [`Driver`] trait so the reporter can be exercised
//! without a real browser. [`MockDriver`] is a fully usable stand-in that
//! renders genuine PNG payloads and can inject failures on demand.

use std::io::Cursor;

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Environment metadata describing where a spec executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Browser name, e.g. "chrome"
    pub browser_name: String,

    /// Browser version string
    pub version: String,

    /// Operating system / platform identifier
    pub platform: String,
}

impl Capabilities {
    /// Create a capabilities snapshot
    pub fn new(
        browser_name: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            browser_name: browser_name.into(),
            version: version.into(),
            platform: platform.into(),
        }
    }
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors raised by the automation driver
#[derive(Debug)]
pub enum DriverError {
    /// The capabilities query failed
    Capabilities(String),

    /// The screenshot request failed
    Screenshot(String),
}

impl std::fmt::Display for DriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriverError::Capabilities(msg) => write!(f, "Capabilities query failed: {}", msg),
            DriverError::Screenshot(msg) => write!(f, "Screenshot failed: {}", msg),
        }
    }
}

impl std::error::Error for DriverError {}

/// Source of environment metadata and visual evidence.
///
/// Implementations wrap a browser automation session. Screenshots are
/// returned base64-encoded, matching what automation protocols put on the
/// wire.
// Handlers are driven one at a time on a single task, so implementations
// need no Send bound.
#[allow(async_fn_in_trait)]
pub trait Driver {
    /// Query the environment the session is running under
    async fn capabilities(&mut self) -> DriverResult<Capabilities>;

    /// Capture a screenshot of the current page as base64-encoded PNG bytes
    async fn take_screenshot(&mut self) -> DriverResult<String>;
}

/// A driver stand-in for tests and local development.
///
/// Serves a fixed [`Capabilities`] snapshot and renders a solid-color PNG
/// for every screenshot request. Either call can be made to fail, and
/// screenshot requests are counted, so capture policy and error paths can
/// be asserted without a browser.
#[derive(Debug, Clone)]
pub struct MockDriver {
    caps: Capabilities,
    fill: [u8; 3],
    width: u32,
    height: u32,
    fail_capabilities: bool,
    fail_screenshots: bool,
    screenshots_taken: usize,
}

impl MockDriver {
    /// Create a mock driver serving the given capabilities
    pub fn new(caps: Capabilities) -> Self {
        Self {
            caps,
            fill: [24, 24, 24],
            width: 320,
            height: 200,
            fail_capabilities: false,
            fail_screenshots: false,
            screenshots_taken: 0,
        }
    }

    /// Set the fill color of rendered screenshots
    pub fn with_fill(mut self, color: [u8; 3]) -> Self {
        self.fill = color;
        self
    }

    /// Set the pixel dimensions of rendered screenshots
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Make capability queries fail
    pub fn fail_capabilities(mut self, fail: bool) -> Self {
        self.fail_capabilities = fail;
        self
    }

    /// Make screenshot requests fail
    pub fn fail_screenshots(mut self, fail: bool) -> Self {
        self.fail_screenshots = fail;
        self
    }

    /// Number of screenshots served so far
    pub fn screenshots_taken(&self) -> usize {
        self.screenshots_taken
    }

    fn render_png(&self) -> DriverResult<Vec<u8>> {
        let img = image::RgbImage::from_pixel(self.width, self.height, image::Rgb(self.fill));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| DriverError::Screenshot(format!("Failed to encode PNG: {}", e)))?;
        Ok(bytes)
    }
}

impl Driver for MockDriver {
    async fn capabilities(&mut self) -> DriverResult<Capabilities> {
        if self.fail_capabilities {
            return Err(DriverError::Capabilities("session lost".to_string()));
        }
        Ok(self.caps.clone())
    }

    async fn take_screenshot(&mut self) -> DriverResult<String> {
        if self.fail_screenshots {
            return Err(DriverError::Screenshot("session lost".to_string()));
        }
        let png = self.render_png()?;
        self.screenshots_taken += 1;
        Ok(base64::engine::general_purpose::STANDARD.encode(&png))
    }
}
