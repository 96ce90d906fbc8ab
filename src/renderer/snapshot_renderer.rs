use async_trait::async_trait;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use super::page_renderer::{PageRenderer, Probe, RenderSession};
use crate::common::{CapturedFrame, Viewport};
use crate::error::RenderError;

/// Renderer for feeds that publish a still snapshot at their URL.
///
/// Every session gets its own HTTP client, so nothing is shared between
/// checks. The reported viewport is the size of the fetched image, falling
/// back to the configured viewport before anything was fetched.
#[derive(Debug, Clone)]
pub struct SnapshotRenderer {
    viewport: Viewport,
    user_agent: String,
}

impl SnapshotRenderer {
    pub fn new(viewport: Viewport, user_agent: impl Into<String>) -> Self {
        Self {
            viewport,
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl PageRenderer for SnapshotRenderer {
    async fn open(&self) -> Result<Box<dyn RenderSession>, RenderError> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| RenderError::Open(e.to_string()))?;

        let session = SnapshotSession {
            id: Uuid::new_v4(),
            client: Some(client),
            default_viewport: self.viewport,
            page: None,
        };
        info!("Opened snapshot session {}", session.id);
        Ok(Box::new(session))
    }

    fn name(&self) -> &'static str {
        "snapshot"
    }
}

struct FetchedPage {
    content_type: Option<String>,
    body: Vec<u8>,
}

pub struct SnapshotSession {
    id: Uuid,
    client: Option<reqwest::Client>,
    default_viewport: Viewport,
    page: Option<FetchedPage>,
}

impl SnapshotSession {
    fn client(&self) -> Result<&reqwest::Client, RenderError> {
        self.client.as_ref().ok_or(RenderError::Closed(self.id))
    }

    fn navigation_error(url: &str, err: reqwest::Error) -> RenderError {
        if err.is_timeout() {
            RenderError::Timeout(url.to_string())
        } else {
            RenderError::Navigation {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl RenderSession for SnapshotSession {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        debug!("Session {} navigating to {}", self.id, url);
        let response = self
            .client()?
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Self::navigation_error(url, e))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| Self::navigation_error(url, e))?;

        debug!(
            "Session {} loaded {} bytes ({})",
            self.id,
            body.len(),
            content_type.as_deref().unwrap_or("unknown type")
        );
        self.page = Some(FetchedPage {
            content_type,
            body: body.to_vec(),
        });
        Ok(())
    }

    async fn probe_video(&mut self, _timeout: Duration) -> Probe {
        match &self.page {
            Some(page)
                if page
                    .content_type
                    .as_deref()
                    .is_some_and(|t| t.starts_with("image/")) =>
            {
                Probe::Found
            }
            _ => Probe::NotFound,
        }
    }

    async fn capture_frame(&mut self) -> Result<CapturedFrame, RenderError> {
        self.client()?;
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| RenderError::Capture("nothing has been loaded yet".to_string()))?;

        let format = image::guess_format(&page.body)
            .ok()
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("bin");
        Ok(CapturedFrame::new(self.id, page.body.clone(), format))
    }

    fn viewport_size(&self) -> Viewport {
        self.page
            .as_ref()
            .and_then(|page| {
                image::ImageReader::new(Cursor::new(&page.body))
                    .with_guessed_format()
                    .ok()?
                    .into_dimensions()
                    .ok()
            })
            .map(|(width, height)| Viewport::new(width, height))
            .unwrap_or(self.default_viewport)
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        if self.client.take().is_some() {
            self.page = None;
            info!("Closed snapshot session {}", self.id);
        }
        Ok(())
    }
}
