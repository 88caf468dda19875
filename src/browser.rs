use anyhow::Context;
use thirtyfour::{ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

use crate::config::ScrapeConfig;

/// One independently acquired WebDriver session.
///
/// Every scrape runs the pattern: launch, run the page interactions, then
/// `close()` before returning the inner result, so the session is released
/// on the error path as well as the success path.
pub struct BrowserSession {
    driver: WebDriver,
}

impl BrowserSession {
    pub async fn launch(config: &ScrapeConfig) -> anyhow::Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.set_headless()?;
        }
        let driver = WebDriver::new(&config.webdriver_url, caps)
            .await
            .with_context(|| {
                format!(
                    "failed to connect to the WebDriver endpoint at {}",
                    config.webdriver_url
                )
            })?;
        Ok(Self { driver })
    }

    pub fn driver(&self) -> &WebDriver {
        &self.driver
    }

    pub async fn close(self) -> anyhow::Result<()> {
        self.driver
            .quit()
            .await
            .context("failed to close browser session")?;
        Ok(())
    }
}
