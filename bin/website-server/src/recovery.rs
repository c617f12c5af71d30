//! Panic recovery.
//!
//! A panicking handler is answered with the 500 error page and the panic
//! message is mailed to the administrator.

use crate::error::error_page_response;
use axum::body::Body;
use axum::http::{Response, StatusCode};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::ResponseForPanic;
use tracing::error;
use website_common::config::MailConfig;
use website_report::{Mailer, send_to_admin};

/// Turns a caught panic into an error page and an admin email.
#[derive(Clone)]
pub struct PanicReporter {
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
    site_name: String,
}

impl PanicReporter {
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, mail: MailConfig, site_name: impl Into<String>) -> Self {
        Self {
            mailer,
            mail,
            site_name: site_name.into(),
        }
    }
}

/// Text carried by a panic payload.
#[must_use]
pub fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl ResponseForPanic for PanicReporter {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let message = panic_message(err.as_ref());
        error!("Handler panicked: {}", message);

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let mailer = self.mailer.clone();
            let mail = self.mail.clone();
            handle.spawn(async move {
                let body = format!("A request handler panicked:\n\n{message}\n");
                if let Err(e) = send_to_admin(mailer.as_ref(), &mail, "Server panic", body).await {
                    error!("Failed to report panic to admin: {}", e);
                }
            });
        }

        error_page_response(
            &self.site_name,
            StatusCode::INTERNAL_SERVER_ERROR,
            "the server hit an unexpected error",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use website_report::MemoryMailer;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("kaboom"));
        assert_eq!(panic_message(payload.as_ref()), "kaboom");
        let payload: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn test_panic_is_mailed_to_admin() {
        let mailer = Arc::new(MemoryMailer::new());
        let mut reporter = PanicReporter::new(mailer.clone(), MailConfig::default(), "Jane");

        let response = reporter.response_for_panic(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        for _ in 0..100 {
            if !mailer.sent().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Server panic");
        assert!(sent[0].plain_text_body.contains("boom"));
    }
}
