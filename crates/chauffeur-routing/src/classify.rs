//! Classification of routing provider failures.
//!
//! Both provider protocols report outcomes as loosely-specified status tokens
//! or free-text errors. Everything is funnelled through an explicit token
//! table into a closed set of [`ErrorCategory`] values, each carrying
//! remediation text the visitor (or site operator) can act on.

use serde::Serialize;

use crate::error::RoutingError;

/// Status token used for every "legacy endpoint not enabled" variant.
pub const LEGACY_NOT_ENABLED: &str = "LEGACY_NOT_ENABLED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCategory {
    Ok,
    /// The endpoint is not enabled for the calling project.
    ConfigurationMissing,
    /// Key, referrer, or billing restrictions rejected the call.
    AccessDenied,
    NoRouteFound,
    PlaceNotFound,
    RateLimited,
    MalformedRequest,
    Unknown,
}

impl ErrorCategory {
    /// Any category other than `Ok` ends the current attempt and disables
    /// automatic routing until the user retries.
    #[must_use]
    pub fn disables_routing(self) -> bool {
        self != ErrorCategory::Ok
    }
}

/// A category plus its human-readable remediation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: ErrorCategory,
    pub message: String,
}

impl Classification {
    #[must_use]
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.category == ErrorCategory::Ok
    }
}

const STATUS_TABLE: &[(&str, ErrorCategory)] = &[
    ("OK", ErrorCategory::Ok),
    (LEGACY_NOT_ENABLED, ErrorCategory::ConfigurationMissing),
    ("REQUEST_DENIED", ErrorCategory::AccessDenied),
    ("ZERO_RESULTS", ErrorCategory::NoRouteFound),
    ("NOT_FOUND", ErrorCategory::PlaceNotFound),
    ("OVER_QUERY_LIMIT", ErrorCategory::RateLimited),
    ("INVALID_REQUEST", ErrorCategory::MalformedRequest),
];

/// Looks up the category for a provider status token, case-insensitively.
#[must_use]
pub fn category_for_status(status: &str) -> ErrorCategory {
    let normalized = status.trim().to_ascii_uppercase();
    STATUS_TABLE
        .iter()
        .find(|(token, _)| *token == normalized)
        .map_or(ErrorCategory::Unknown, |(_, category)| *category)
}

/// Classifies a provider status token. `origin` is the page's scheme+host,
/// used to build referrer remediation text.
#[must_use]
pub fn classify_status(status: &str, origin: &str) -> Classification {
    let normalized = status.trim().to_ascii_uppercase();
    let category = category_for_status(&normalized);
    let message = match category {
        ErrorCategory::Ok => String::new(),
        ErrorCategory::ConfigurationMissing => concat!(
            "Directions Service error: Google says you're calling a legacy Directions endpoint ",
            "that isn't enabled for your project.\n\n",
            "Fix: In Google Cloud, enable ONE of these (same project as your API key):\n",
            "• Routes API (recommended)\n",
            "• Directions API (legacy)\n\n",
            "This site will try Routes API first. If Routes API isn't enabled, enable it and retry."
        )
        .to_string(),
        ErrorCategory::AccessDenied => format!(
            "Directions request was denied by Google (REQUEST_DENIED).\n\n\
             This is NOT a website bug: it means your key/project is not allowed to call routing right now.\n\n\
             Fix checklist (Google Cloud):\n\
             1) APIs & Services → Library: enable Routes API (recommended) or Directions API (legacy)\n\
             2) APIs & Services → Credentials → your API key:\n   \
             - If API restrictions are ON: allow Routes API (and Maps JavaScript + Places).\n   \
             - If HTTP referrers are ON: add this referrer:\n     \
             {origin}/*\n\
             3) Billing must be enabled for the SAME project as this key\n\n\
             After changing settings: retry routing or toggle maps off/on."
        ),
        ErrorCategory::NoRouteFound => "No driving route found (ZERO_RESULTS). Try selecting the exact address from autocomplete suggestions.".to_string(),
        ErrorCategory::PlaceNotFound => "A location could not be found (NOT_FOUND). Please pick a place from the suggestions.".to_string(),
        ErrorCategory::RateLimited => "Google rate-limited this key (OVER_QUERY_LIMIT). Wait a bit or increase quota/billing.".to_string(),
        ErrorCategory::MalformedRequest => "Invalid route request. Make sure pickup & dropoff are selected from suggestions.".to_string(),
        ErrorCategory::Unknown => format!(
            "Could not calculate route ({normalized}). Try selecting an address from suggestions."
        ),
    };
    Classification::new(category, message)
}

/// Maps a thrown legacy-directions error message onto a status token.
///
/// Every "legacy ... not enabled" phrasing collapses into
/// [`LEGACY_NOT_ENABLED`]; finer-grained legacy errors are not distinguished.
#[must_use]
pub fn status_from_thrown_message(message: &str) -> &'static str {
    let upper = message.to_ascii_uppercase();
    if upper.contains("LEGACY") && upper.contains("NOT ENABLED") {
        LEGACY_NOT_ENABLED
    } else if upper.contains("REQUEST_DENIED") {
        "REQUEST_DENIED"
    } else {
        "ERROR"
    }
}

/// Turns a provider load/authentication failure into remediation text.
#[must_use]
pub fn humanize_load_error(message: &str, origin: &str) -> Classification {
    let lower = message.to_lowercase();

    if lower.contains("billingnotenabledmaperror")
        || (lower.contains("billing") && lower.contains("not enabled"))
    {
        return Classification::new(
            ErrorCategory::AccessDenied,
            "BillingNotEnabledMapError: Billing is not enabled for this Google Cloud project.\n\n\
             Fix: Google Cloud Console → Billing → link a billing account to THIS project (the one that owns your API key).",
        );
    }

    if lower.contains("referernotallowed")
        || lower.contains("referer not allowed")
        || lower.contains("apitargetblockedmaperror")
    {
        return Classification::new(
            ErrorCategory::AccessDenied,
            format!(
                "RefererNotAllowedMapError: This site ({origin}) is not allowed by your API key restrictions.\n\n\
                 Fix: Google Cloud Console → APIs & Services → Credentials → your API key → \
                 Application restrictions → HTTP referrers → add:\n{origin}/*\n\n\
                 Then save and retry."
            ),
        );
    }

    if lower.contains("invalidkeymaperror") || lower.contains("invalid key") {
        let referrer_step = if origin.is_empty() {
            String::new()
        } else {
            format!("4) If you restricted referrers, add: {origin}/*\n")
        };
        return Classification::new(
            ErrorCategory::AccessDenied,
            format!(
                "InvalidKeyMapError: Google is rejecting this API key.\n\n\
                 Fix checklist:\n\
                 1) Make sure you pasted the correct key.\n\
                 2) Enable Maps JavaScript API in the SAME project as this key.\n\
                 3) Billing must be enabled for that project.\n\
                 {referrer_step}\
                 5) If you restricted APIs, temporarily set API restrictions to 'Don't restrict key' to test."
            ),
        );
    }

    if lower.contains("legacyapinotactivated")
        || (lower.contains("legacy api") && lower.contains("not enabled"))
    {
        return Classification::new(
            ErrorCategory::ConfigurationMissing,
            "LegacyApiNotActivatedMapError: Google says you are calling a legacy directions endpoint \
             that isn't enabled for your project.\n\n\
             Fix options:\n\
             • Enable Directions API (legacy) in Google Cloud\n\
             • OR enable Routes API (recommended) and use it for routing.",
        );
    }

    if lower.contains("missing") && lower.contains("key") {
        return Classification::new(
            ErrorCategory::ConfigurationMissing,
            "Missing Google Maps API key.",
        );
    }

    if lower.contains("not activated") || (lower.contains("api") && lower.contains("not enabled"))
    {
        return Classification::new(
            ErrorCategory::ConfigurationMissing,
            "Required Google Maps APIs are not enabled (Maps JavaScript + Places + Routes/Directions).",
        );
    }

    let fallback = if message.trim().is_empty() {
        "Google Maps failed to load.".to_string()
    } else {
        message.to_string()
    };
    Classification::new(ErrorCategory::Unknown, fallback)
}

/// Classifies the final error of a resolution attempt.
///
/// Provider answers go through the status table; initialisation failures go
/// through [`humanize_load_error`]; everything else is `Unknown`.
#[must_use]
pub fn classify_error(err: &RoutingError, origin: &str) -> Classification {
    match err {
        RoutingError::Provider { status, message } => {
            let classified = classify_status(status, origin);
            match classified.category {
                // A provider never fails with OK; treat it as unexplained.
                ErrorCategory::Ok => Classification::new(ErrorCategory::Unknown, message.clone()),
                ErrorCategory::Unknown if !message.is_empty() => Classification::new(
                    ErrorCategory::Unknown,
                    format!("{}\n\n{message}", classified.message),
                ),
                _ => classified,
            }
        }
        RoutingError::InvalidApiKey | RoutingError::InitTimeout { .. } => {
            humanize_load_error(&err.to_string(), origin)
        }
        RoutingError::IncompleteRoute(message) => Classification::new(
            ErrorCategory::Unknown,
            format!("Could not calculate route (incomplete route). {message}"),
        ),
        _ => Classification::new(ErrorCategory::Unknown, err.to_string()),
    }
}
