//! Booking form handling: validation, lead assembly, and delivery of the
//! lead through the transactional email API.

pub mod controller;
pub mod email;
pub mod error;
pub mod form;
pub mod lead;

pub use controller::{BookingController, SubmissionState};
pub use email::{EmailJsClient, LeadSender};
pub use error::LeadError;
pub use form::BookingForm;
pub use lead::{LeadContext, LeadPayload, TemplateParams};
