use crate::{
    constants::CONTACT_SERVICE,
    entities::{
        contact::ContactRequest,
        submission::{Submission, SubmissionEncoding},
    },
    errors::AppError,
    upstream::forwarder::{join_url, Forwarder, OutboundBody, UpstreamResponse},
};

const CONTACT_SCRIPT: &str = "contact.php";

pub struct ContactHandler {
    forwarder: Forwarder,
    service_url: Option<String>,
}

impl ContactHandler {
    pub fn new(forwarder: Forwarder, service_url: Option<String>) -> Self {
        ContactHandler { forwarder, service_url }
    }

    /// Validates a contact message and relays it, keeping multipart
    /// submissions multipart. The verification token rides along
    /// untouched; the contact script checks it.
    pub async fn submit(&self, submission: Submission) -> Result<UpstreamResponse, AppError> {
        let request = ContactRequest::from_fields(&submission.fields)?;
        request.check()?;

        let base = self
            .service_url
            .as_deref()
            .ok_or(AppError::ServerMisconfigured("contact_service_url"))?;

        let mut fields = submission.fields.clone();
        if let Ok(serde_json::Value::Object(canonical)) = serde_json::to_value(&request) {
            fields.extend(canonical);
        }

        let outbound = match submission.encoding {
            SubmissionEncoding::Multipart => OutboundBody::multipart_from(&fields),
            SubmissionEncoding::Json | SubmissionEncoding::Form => OutboundBody::json_from(&fields),
        };

        tracing::info!(
            has_token = request.recaptcha_token.is_some(),
            "Forwarding contact message"
        );

        self.forwarder
            .post(CONTACT_SERVICE, &join_url(base, CONTACT_SCRIPT), outbound)
            .await
    }
}
