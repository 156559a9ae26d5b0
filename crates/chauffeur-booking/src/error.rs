use thiserror::Error;

/// Errors raised while delivering a booking lead.
#[derive(Debug, Error)]
pub enum LeadError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// One or more delivery credentials are absent.
    #[error("Email sending is not configured. Set EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID and EMAILJS_PUBLIC_KEY.")]
    NotConfigured,

    /// The email API answered with a non-2xx status.
    #[error("{message}")]
    Delivery { status: u16, message: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl LeadError {
    pub(crate) fn delivery(status: u16, body: &str) -> Self {
        LeadError::Delivery {
            status,
            message: format!("EmailJS failed ({status}). {body}").trim().to_string(),
        }
    }
}
