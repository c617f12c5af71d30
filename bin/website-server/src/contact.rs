//! Contact form submission.
//!
//! A valid submission is stored, forwarded to the administrator and
//! acknowledged to the sender before redirecting to the success page.

use crate::error::PageError;
use crate::state::AppState;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::Redirect;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, info};
use website_common::{ContactFormSubmission, Error};
use website_report::{Email, send_to_admin};

/// Where the browser lands after a successful submission
pub const SUCCESS_PATH: &str = "/contact_success";

/// Fields posted by the contact form
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub message: String,
}

/// Extract the address from `jane@example.com` or `Jane <jane@example.com>`.
///
/// # Errors
/// Returns `Error::InvalidEmailAddress` when the input is not a single
/// plausible mailbox.
pub fn parse_email_address(input: &str) -> Result<String, Error> {
    let invalid = || Error::InvalidEmailAddress(input.to_string());
    let trimmed = input.trim();

    let addr = match (trimmed.find('<'), trimmed.strip_suffix('>')) {
        (Some(open), Some(inner)) => &inner[open + 1..],
        (None, None) => trimmed,
        _ => return Err(invalid()),
    };

    let (local, domain) = addr.split_once('@').ok_or_else(invalid)?;
    let forbidden = |c: char| c.is_whitespace() || "<>()[],;:\\\"@".contains(c);
    if local.is_empty()
        || domain.is_empty()
        || local.chars().any(forbidden)
        || domain.chars().any(forbidden)
        || local.starts_with('.')
        || local.ends_with('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || domain.contains("..")
    {
        return Err(invalid());
    }
    Ok(addr.to_string())
}

/// Validate the posted form into a submission stamped with the current time.
///
/// # Errors
/// Returns a client error for a bad address or an oversized message.
pub fn validate(form: &ContactForm, max_message_length: usize) -> Result<ContactFormSubmission, Error> {
    let email_address = parse_email_address(&form.email_address)?;
    if form.message.len() > max_message_length {
        return Err(Error::MessageTooLong {
            length: form.message.len(),
            max: max_message_length,
        });
    }
    Ok(ContactFormSubmission::new(email_address, form.message.clone()))
}

/// POST /contact
///
/// # Errors
/// Returns a 400 page for invalid input and a 500 page when storing or
/// mailing fails.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Result<Redirect, PageError> {
    let site_name = state.config.site.name.as_str();
    let submission = form
        .map_err(|e| Error::invalid_request(e.body_text()))
        .and_then(|Form(form)| validate(&form, state.config.server.max_message_length))
        .map_err(|e| {
            if e.is_client_error() {
                debug!("Rejected contact form: {}", e);
            }
            PageError::from_error(site_name, &e)
        })?;

    if let Err(e) = state.store.store_contact_form_submission(&submission) {
        error!("Failed to store contact form submission {}: {}", submission.id, e);
        return Err(PageError::from_error(site_name, &Error::storage("failed to save to database")));
    }

    let mail = &state.config.mail;
    if let Err(e) = send_to_admin(
        state.mailer.as_ref(),
        mail,
        "New contact form submission",
        submission.to_string(),
    )
    .await
    {
        error!("Failed to notify admin of submission {}: {}", submission.id, e);
        return Err(PageError::from_error(
            site_name,
            &Error::mail("failed to send notification email"),
        ));
    }

    let confirmation = Email {
        from: mail.sender.clone(),
        to: vec![submission.email_address.clone()],
        subject: "Thank you for your message!".to_string(),
        plain_text_body: submission.to_string(),
    };
    if let Err(e) = state.mailer.send(&confirmation).await {
        error!("Failed to confirm submission {}: {}", submission.id, e);
        return Err(PageError::from_error(
            site_name,
            &Error::mail("failed to send confirmation email"),
        ));
    }

    info!("Received contact form submission {}", submission.id);
    Ok(Redirect::to(SUCCESS_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_named_addresses() {
        assert_eq!(parse_email_address("jane@example.com").unwrap(), "jane@example.com");
        assert_eq!(
            parse_email_address("  Jane Doe <jane.doe@mail.example.com> ").unwrap(),
            "jane.doe@mail.example.com"
        );
    }

    #[test]
    fn test_reject_invalid_addresses() {
        for input in [
            "",
            "jane",
            "@example.com",
            "jane@",
            "jane@@example.com",
            "ja ne@example.com",
            "jane@example..com",
            ".jane@example.com",
            "Jane <jane@example.com",
            "a@b.com, c@d.com",
        ] {
            assert!(
                matches!(parse_email_address(input), Err(Error::InvalidEmailAddress(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_message_length() {
        let form = ContactForm {
            email_address: "jane@example.com".into(),
            message: "x".repeat(8000),
        };
        let submission = validate(&form, 8000).unwrap();
        assert_eq!(submission.email_address, "jane@example.com");
        assert_eq!(submission.message.len(), 8000);

        let form = ContactForm {
            email_address: "jane@example.com".into(),
            message: "x".repeat(8001),
        };
        assert!(matches!(
            validate(&form, 8000),
            Err(Error::MessageTooLong { length: 8001, max: 8000 })
        ));
    }

    #[test]
    fn test_address_is_checked_before_length() {
        let form = ContactForm {
            email_address: "nope".into(),
            message: "x".repeat(9000),
        };
        assert!(matches!(validate(&form, 8000), Err(Error::InvalidEmailAddress(_))));
    }
}
