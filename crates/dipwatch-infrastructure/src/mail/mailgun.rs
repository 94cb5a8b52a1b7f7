use dipwatch_domain::repositories::mail::MailTransport;
use dipwatch_domain::value_objects::email::{DeliveryReceipt, EmailMessage};
use reqwest::blocking::Client;
use std::time::{Duration, Instant};

const ERROR_BODY_LIMIT: usize = 200;

/// Sends plain-text mail through the Mailgun messages API.
pub struct MailgunTransport {
    pub api_base_url: String,
    pub domain: String,
    pub from: String,
    pub to: String,
    pub timeout_secs: u64,
    api_key: String,
    client: Client,
}

impl MailgunTransport {
    pub fn new(
        api_base_url: String,
        domain: String,
        from: String,
        to: String,
        api_key: String,
        timeout_secs: u64,
    ) -> Result<Self, String> {
        if api_key.trim().is_empty() {
            return Err("mail api key must not be empty".to_string());
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|err| format!("failed to build http client: {err}"))?;
        Ok(Self {
            api_base_url,
            domain,
            from,
            to,
            timeout_secs,
            api_key,
            client,
        })
    }

    fn messages_endpoint(&self) -> String {
        format!(
            "{}/v3/{}/messages",
            self.api_base_url.trim_end_matches('/'),
            self.domain
        )
    }
}

impl MailTransport for MailgunTransport {
    fn send(&self, message: &EmailMessage) -> Result<DeliveryReceipt, String> {
        let endpoint = self.messages_endpoint();
        let span = tracing::info_span!(
            "infra.mailgun.send",
            endpoint = %endpoint,
            to = %self.to,
            timeout_secs = self.timeout_secs
        );
        let _enter = span.enter();

        let start = Instant::now();
        metrics::counter!("dipwatch.infra.mail.requests_total").increment(1);
        let form = [
            ("from", self.from.as_str()),
            ("to", self.to.as_str()),
            ("subject", message.subject.as_str()),
            ("text", message.body.as_str()),
        ];
        let response = self
            .client
            .post(&endpoint)
            .basic_auth("api", Some(&self.api_key))
            .form(&form)
            .send()
            .map_err(|err| {
                metrics::counter!("dipwatch.infra.mail.errors_total", "kind" => "transport")
                    .increment(1);
                tracing::warn!(error = %err, "mail request failed");
                format!("mail request failed: {err}")
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| format!("failed to read mail response: {err}"))?;
        metrics::histogram!(
            "dipwatch.infra.mail.call_ms",
            "status" => status.as_u16().to_string()
        )
        .record(start.elapsed().as_millis() as f64);

        if !status.is_success() {
            metrics::counter!("dipwatch.infra.mail.errors_total", "kind" => "http_status")
                .increment(1);
            let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            tracing::warn!(status = status.as_u16(), body = %excerpt, "mail rejected");
            return Err(format!(
                "mail http error: status {}: {}",
                status.as_u16(),
                excerpt.trim()
            ));
        }

        // Mailgun answers `{"id": "<...>", "message": "Queued. Thank you."}`.
        let receipt = match serde_json::from_str::<DeliveryReceipt>(&body) {
            Ok(receipt) => receipt,
            Err(err) => {
                let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
                tracing::debug!(
                    error = %err,
                    body = %excerpt,
                    "unrecognized mail receipt, delivery accepted without id"
                );
                DeliveryReceipt::default()
            }
        };
        Ok(receipt)
    }
}
