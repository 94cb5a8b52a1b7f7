use crate::value_objects::email::{DeliveryReceipt, EmailMessage};

pub trait MailTransport {
    fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, String>;
}
