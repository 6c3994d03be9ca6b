use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::MessagingError, page::PageContext};

/// Request sent by the extension host, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum HostRequest {
    #[serde(rename = "getArxivUrl")]
    GetArxivUrl,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostResponse {
    Url { url: String },
}

/// Answers host requests on behalf of the current page.
#[derive(Debug, Clone)]
pub struct HostMessenger {
    page: PageContext,
}

impl HostMessenger {
    pub fn new(page: PageContext) -> Self {
        Self { page }
    }

    pub fn handle(&self, request: &HostRequest) -> Option<HostResponse> {
        match request {
            HostRequest::GetArxivUrl => Some(HostResponse::Url {
                url: self.page.url().to_string(),
            }),
            HostRequest::Unknown => None,
        }
    }

    /// Decodes `raw` and hands the JSON response to `respond`, if any.
    ///
    /// Requests with an unknown action are acknowledged without a response.
    ///
    /// # Errors
    ///
    /// Fails if `raw` is not a JSON object with an `action` field.
    pub fn handle_json<F>(&self, raw: &str, respond: F) -> Result<(), MessagingError>
    where
        F: FnOnce(String),
    {
        let request: HostRequest = serde_json::from_str(raw)?;
        debug!(?request, "host message");

        if let Some(response) = self.handle(&request) {
            respond(serde_json::to_string(&response)?);
        }
        Ok(())
    }
}
