//! Lead delivery through the `EmailJS` REST API.

use std::time::Duration;

use async_trait::async_trait;
use chauffeur_core::EmailJsConfig;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::LeadError;
use crate::lead::{LeadPayload, TemplateParams};

const SEND_PATH: &str = "api/v1.0/email/send";

/// Delivers a lead to the business.
#[async_trait]
pub trait LeadSender: Send + Sync {
    async fn send(&self, lead: &LeadPayload) -> Result<(), LeadError>;
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams,
}

pub struct EmailJsClient {
    client: Client,
    endpoint: Url,
    service_id: Option<String>,
    template_id: Option<String>,
    public_key: Option<String>,
}

impl EmailJsClient {
    /// Creates a client for the configured `EmailJS` endpoint.
    ///
    /// Missing credentials are not an error here; they fail each send with
    /// [`LeadError::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`LeadError::InvalidBaseUrl`] if the configured base
    /// URL does not parse.
    pub fn new(config: &EmailJsConfig, timeout_secs: u64) -> Result<Self, LeadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chauffeur/0.1 (booking-leads)")
            .build()?;
        Self::with_client(client, config)
    }

    /// Creates a client around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::InvalidBaseUrl`] if the configured base URL does
    /// not parse.
    pub fn with_client(client: Client, config: &EmailJsConfig) -> Result<Self, LeadError> {
        let normalised = format!("{}/", config.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|u| u.join(SEND_PATH))
            .map_err(|e| LeadError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            endpoint,
            service_id: non_blank(config.service_id.as_deref()),
            template_id: non_blank(config.template_id.as_deref()),
            public_key: non_blank(config.public_key.as_deref()),
        })
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.service_id.is_some() && self.template_id.is_some() && self.public_key.is_some()
    }
}

#[async_trait]
impl LeadSender for EmailJsClient {
    async fn send(&self, lead: &LeadPayload) -> Result<(), LeadError> {
        let (Some(service_id), Some(template_id), Some(user_id)) = (
            self.service_id.as_deref(),
            self.template_id.as_deref(),
            self.public_key.as_deref(),
        ) else {
            return Err(LeadError::NotConfigured);
        };

        let body = SendRequest {
            service_id,
            template_id,
            user_id,
            template_params: lead.template_params(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), lead_id = %lead.id(), "lead delivery rejected");
            return Err(LeadError::delivery(status.as_u16(), &text));
        }

        tracing::info!(lead_id = %lead.id(), service = %lead.service(), "lead delivered");
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
