//! Transactional email: order confirmations and encomenda notifications.
//!
//! Uses SMTP via lettre with Askama templates (HTML plus a plain-text
//! alternative). Sending is best-effort from the caller's point of view: a
//! failed email never fails the request that triggered it.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use artesania_core::format_brl;
use artesania_core::models::{Encomenda, Order};

use crate::config::EmailConfig;

/// One order line, preformatted for the templates.
struct LineView {
    name: String,
    quantity: u32,
    total: String,
}

/// Order confirmation, shared by both renderings.
struct OrderView<'a> {
    customer_name: &'a str,
    reference: &'a str,
    status: &'a str,
    lines: Vec<LineView>,
    subtotal: String,
    discount: Option<String>,
    shipping: String,
    gift_wrap: Option<String>,
    total: String,
    address: String,
}

impl<'a> OrderView<'a> {
    fn new(order: &'a Order) -> Self {
        let a = &order.address;
        let complement = a
            .complement
            .as_deref()
            .map(|c| format!(", {c}"))
            .unwrap_or_default();
        Self {
            customer_name: &order.customer_name,
            reference: &order.external_reference,
            status: order.status.label(),
            lines: order
                .items
                .iter()
                .map(|item| LineView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    total: format_brl(item.line_total()),
                })
                .collect(),
            subtotal: format_brl(order.subtotal),
            discount: (!order.discount.is_zero()).then(|| format_brl(order.discount)),
            shipping: format_brl(order.shipping),
            gift_wrap: order.gift_wrapping.then(|| format_brl(order.gift_wrap)),
            total: format_brl(order.total),
            address: format!(
                "{}, {}{complement} - {}, {}/{} - CEP {}",
                a.street, a.number, a.neighborhood, a.city, a.state, a.postal_code
            ),
        }
    }
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    order: &'a OrderView<'a>,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    order: &'a OrderView<'a>,
}

/// Encomenda notification for the store.
#[derive(Template)]
#[template(path = "email/encomenda_received.html")]
struct EncomendaReceivedHtml<'a> {
    encomenda: &'a Encomenda,
    desired_date: String,
}

#[derive(Template)]
#[template(path = "email/encomenda_received.txt")]
struct EncomendaReceivedText<'a> {
    encomenda: &'a Encomenda,
    desired_date: String,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    notification_address: Option<String>,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            notification_address: config.notification_address.clone(),
        })
    }

    /// Send the order confirmation to the customer.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(&self, order: &Order) -> Result<(), EmailError> {
        let view = OrderView::new(order);
        let html = OrderConfirmationHtml { order: &view }.render()?;
        let text = OrderConfirmationText { order: &view }.render()?;
        let subject = format!("Pedido recebido - {}", order.external_reference);

        self.send_multipart_email(order.customer_email.as_str(), &subject, &text, &html)
            .await
    }

    /// Notify the store about a new encomenda. Does nothing when no
    /// notification address is configured.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_encomenda_notification(
        &self,
        encomenda: &Encomenda,
    ) -> Result<(), EmailError> {
        let Some(to) = self.notification_address.as_deref() else {
            tracing::debug!(encomenda_id = %encomenda.id, "No notification address configured");
            return Ok(());
        };
        let desired_date = encomenda
            .desired_date
            .map_or_else(|| "sem data definida".to_owned(), |d| d.format("%d/%m/%Y").to_string());
        let html = EncomendaReceivedHtml {
            encomenda,
            desired_date: desired_date.clone(),
        }
        .render()?;
        let text = EncomendaReceivedText {
            encomenda,
            desired_date,
        }
        .render()?;
        let subject = format!("Nova encomenda #{} - {}", encomenda.id, encomenda.name);

        self.send_multipart_email(to, &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}
