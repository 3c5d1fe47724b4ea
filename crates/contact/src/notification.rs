use crate::Inquiry;

/// Outbound message for the site operator. Sender and recipient addresses
/// belong to the transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub reply_to: String,
}

impl Notification {
    pub fn for_inquiry(inquiry: &Inquiry) -> Self {
        Self {
            subject: format!("Portfolio Inquiry from {}", inquiry.name),
            body: format!(
                "Name: {}\nEmail: {}\n\n{}",
                inquiry.name, inquiry.email, inquiry.message
            ),
            reply_to: inquiry.email.to_owned(),
        }
    }
}
