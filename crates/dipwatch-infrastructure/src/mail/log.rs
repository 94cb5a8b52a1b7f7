use dipwatch_domain::repositories::mail::MailTransport;
use dipwatch_domain::value_objects::email::{DeliveryReceipt, EmailMessage};

/// Dry-run transport: logs the message instead of delivering it.
#[derive(Debug, Default)]
pub struct LogMailTransport;

impl MailTransport for LogMailTransport {
    fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, String> {
        tracing::info!(
            subject = %message.subject,
            body = %message.body,
            "dry run: email not delivered"
        );
        Ok(DeliveryReceipt {
            id: None,
            message: Some("dry run".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::LogMailTransport;
    use dipwatch_domain::repositories::mail::MailTransport;
    use dipwatch_domain::value_objects::email::EmailMessage;

    #[test]
    fn dry_run_always_succeeds() {
        let receipt = LogMailTransport
            .send(&EmailMessage {
                subject: "s".to_string(),
                body: "b".to_string(),
            })
            .expect("dry run");
        assert_eq!(receipt.id, None);
        assert_eq!(receipt.message.as_deref(), Some("dry run"));
    }
}
