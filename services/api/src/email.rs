//! Outbound email for signup codes and approval decisions
//!
//! Delivery uses SMTP via lettre. Every message carries a plain text and
//! an HTML part. Senders treat failures as non-fatal: callers log and
//! continue, because losing a notification must never roll back the state
//! change that triggered it.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use thiserror::Error;

use crate::config::MailConfig;

/// Errors that can occur when sending email
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Transactional email sender
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration
    pub fn new(config: &MailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the signup verification code to a prospective vendor
    pub async fn send_otp(&self, to: &str, otp: &str) -> Result<(), EmailError> {
        let text = format!(
            "Your verification code is {}. It expires in 2 minutes.",
            otp
        );
        let html = format!(
            "<div style=\"font-family:sans-serif\">\
             <h2>Email verification</h2>\
             <p>Your verification code is:</p>\
             <p style=\"font-size:28px;letter-spacing:4px\"><strong>{}</strong></p>\
             <p>The code expires in 2 minutes.</p>\
             </div>",
            otp
        );
        self.send_multipart_email(to, "Your verification code", &text, &html)
            .await
    }

    /// Ask the platform admin to approve or deny a pending vendor
    pub async fn send_approval_request(
        &self,
        to: &str,
        company_name: &str,
        vendor_email: &str,
        approve_url: &str,
        deny_url: &str,
    ) -> Result<(), EmailError> {
        let company = escape_html(company_name);
        let text = format!(
            "New vendor registration from {} ({}).\n\nApprove: {}\nDeny: {}\n\nLinks expire in 10 days.",
            company_name, vendor_email, approve_url, deny_url
        );
        let html = format!(
            "<div style=\"font-family:sans-serif\">\
             <h2>New vendor registration</h2>\
             <p><strong>{}</strong> ({}) has requested a seller account.</p>\
             <p>\
             <a href=\"{}\" style=\"background:#16a34a;color:#fff;padding:10px 18px;text-decoration:none;border-radius:4px\">Approve</a>\
             &nbsp;\
             <a href=\"{}\" style=\"background:#dc2626;color:#fff;padding:10px 18px;text-decoration:none;border-radius:4px\">Deny</a>\
             </p>\
             <p>These links expire in 10 days and can be used once.</p>\
             </div>",
            company,
            escape_html(vendor_email),
            approve_url,
            deny_url
        );
        self.send_multipart_email(to, "New vendor registration request", &text, &html)
            .await
    }

    /// Tell a vendor their account was approved
    pub async fn send_approved(
        &self,
        to: &str,
        company_name: &str,
        login_url: &str,
    ) -> Result<(), EmailError> {
        let text = format!(
            "Good news, {}! Your seller account has been approved. Log in at {}",
            company_name, login_url
        );
        let html = format!(
            "<div style=\"font-family:sans-serif\">\
             <h2>Account approved</h2>\
             <p>Good news, <strong>{}</strong>! Your seller account has been approved.</p>\
             <p><a href=\"{}\">Log in to your dashboard</a></p>\
             </div>",
            escape_html(company_name),
            login_url
        );
        self.send_multipart_email(to, "Your seller account is approved", &text, &html)
            .await
    }

    /// Tell an applicant their registration was denied
    pub async fn send_denied(&self, to: &str, company_name: &str) -> Result<(), EmailError> {
        let text = format!(
            "We're sorry, {}. Your seller registration was not approved at this time.",
            company_name
        );
        let html = format!(
            "<div style=\"font-family:sans-serif\">\
             <h2>Registration update</h2>\
             <p>We're sorry, <strong>{}</strong>. Your seller registration was not \
             approved at this time.</p>\
             <p>You may reply to this email if you believe this was a mistake.</p>\
             </div>",
            escape_html(company_name)
        );
        self.send_multipart_email(to, "Your seller registration", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions
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

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<Oak & Pine> \"Ltd\""),
            "&lt;Oak &amp; Pine&gt; &quot;Ltd&quot;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
