use validator::Validate;

use crate::{
    constants::BOOKING_SERVICE,
    entities::{booking::BookingRequest, submission::Submission},
    errors::AppError,
    upstream::forwarder::{join_url, Forwarder, OutboundBody, UpstreamResponse},
};

const BOOKING_SCRIPT: &str = "booking.php";

pub struct BookingHandler {
    forwarder: Forwarder,
    service_url: Option<String>,
}

impl BookingHandler {
    pub fn new(forwarder: Forwarder, service_url: Option<String>) -> Self {
        BookingHandler { forwarder, service_url }
    }

    /// Validates a booking and relays it to the booking script.
    /// Missing fields are reported together; format problems per field.
    pub async fn submit(&self, submission: Submission) -> Result<UpstreamResponse, AppError> {
        let fields = submission.compact_fields();

        BookingRequest::check_required(&fields)?;
        let request = BookingRequest::from_fields(&fields)?;
        request.validate()?;

        let base = self
            .service_url
            .as_deref()
            .ok_or(AppError::ServerMisconfigured("booking_service_url"))?;

        tracing::info!(
            room_type = %request.room_type,
            nights = request.nights(),
            guests = request.total_guests(),
            "Forwarding booking request"
        );

        let outbound = OutboundBody::json_from(&request.to_outbound(&submission.fields));
        self.forwarder
            .post(BOOKING_SERVICE, &join_url(base, BOOKING_SCRIPT), outbound)
            .await
    }
}
