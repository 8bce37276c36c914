use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::AppConfig,
    events::{OrderCreated, OrderCreatedListener},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers composed messages.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()>;
}

/// Writes messages to the log instead of an SMTP relay.
#[derive(Debug, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, message: &EmailMessage) -> anyhow::Result<()> {
        tracing::info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "email sent"
        );
        Ok(())
    }
}

/// Sends an order confirmation for every placed order. The customer gets it
/// when their token carried an email address; `ORDER_NOTIFY_EMAIL`, when set,
/// receives a copy. With neither, the event is only logged.
pub struct OrderConfirmationMailer {
    from: String,
    copy_to: Option<String>,
    transport: Arc<dyn MailTransport>,
}

impl OrderConfirmationMailer {
    pub fn new(config: &AppConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            from: config.default_from_email.clone(),
            copy_to: config.order_notify_email.clone(),
            transport,
        }
    }

    fn recipients(&self, event: &OrderCreated) -> Vec<String> {
        let mut recipients: Vec<String> = event.customer_email.iter().cloned().collect();
        if let Some(copy_to) = self.copy_to.as_ref().filter(|c| !recipients.contains(*c)) {
            recipients.push(copy_to.clone());
        }
        recipients
    }

    pub fn compose(&self, event: &OrderCreated) -> Vec<EmailMessage> {
        let subject = format!("Order #{} placed", event.order_id);
        let body = format!(
            "Order #{} was placed by customer #{} at {}.",
            event.order_id,
            event.customer_id,
            event.placed_at.to_rfc3339()
        );
        self.recipients(event)
            .into_iter()
            .map(|to| EmailMessage {
                from: self.from.clone(),
                to,
                subject: subject.clone(),
                body: body.clone(),
            })
            .collect()
    }
}

#[async_trait]
impl OrderCreatedListener for OrderConfirmationMailer {
    fn name(&self) -> &'static str {
        "order_confirmation_mailer"
    }

    async fn on_order_created(&self, event: &OrderCreated) -> anyhow::Result<()> {
        let messages = self.compose(event);
        if messages.is_empty() {
            tracing::debug!(order_id = event.order_id, "no confirmation recipient known");
        }
        for message in &messages {
            self.transport.send(message).await?;
        }
        Ok(())
    }
}
