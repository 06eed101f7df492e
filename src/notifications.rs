//! Best-effort email notifications for newly ingested leads.
//!
//! Failures are logged and swallowed: a lead that was persisted counts as
//! ingested whether or not any email went out.

use crate::config::DEFAULT_ADMIN_EMAIL;
use crate::mailer::{EmailMessage, Mailer};
use crate::models::{Lead, Workspace};
use crate::validation::escape_html;

/// Which emails were actually delivered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationReport {
    pub admin_notified: bool,
    pub lead_notified: bool,
}

/// Admin notification: a summary of the lead.
pub fn admin_summary_email(to: &str, subject: &str, lead: &Lead) -> EmailMessage {
    let mut html = String::new();
    html.push_str(if lead.qualified {
        "<h2>New Qualified Lead 🎉</h2>\n"
    } else {
        "<h2>New Lead</h2>\n"
    });
    html.push_str(&format!(
        "<p><strong>Name:</strong> {}</p>\n",
        escape_html(&lead.name)
    ));
    html.push_str(&format!(
        "<p><strong>Email:</strong> {}</p>\n",
        escape_html(&lead.email)
    ));
    html.push_str(&format!(
        "<p><strong>Company:</strong> {}</p>\n",
        escape_html(lead.company.as_deref().unwrap_or("N/A"))
    ));
    html.push_str(&format!(
        "<p><strong>Role:</strong> {}</p>\n",
        escape_html(lead.role.as_deref().unwrap_or("N/A"))
    ));
    html.push_str(&format!(
        "<p><strong>Region:</strong> {}</p>\n",
        escape_html(lead.region.as_deref().unwrap_or("N/A"))
    ));
    if let Some(message) = lead.message.as_deref() {
        html.push_str(&format!(
            "<p><strong>Message:</strong> {}</p>\n",
            escape_html(message)
        ));
    }
    html.push_str(&format!(
        "<p><strong>AI Score:</strong> {}/100</p>\n",
        (lead.ai_score * 100.0).round() as u32
    ));
    if !lead.ai_reason.is_empty() {
        html.push_str(&format!(
            "<p><strong>Why:</strong> {}</p>\n",
            escape_html(&lead.ai_reason)
        ));
    }

    EmailMessage {
        to: to.to_string(),
        subject: subject.to_string(),
        html,
    }
}

/// Email to the lead with the booking link.
pub fn booking_email(lead: &Lead, booking_url: &str) -> EmailMessage {
    let html = format!(
        r#"<h2>Hi {name},</h2>
<p>Thanks for reaching out.</p>
<p>Please book a meeting using the link below:</p>
<p><a href="{url}" target="_blank">Book a Meeting</a></p>
<p>Looking forward to speaking with you.</p>
"#,
        name = escape_html(&lead.name),
        url = escape_html(booking_url),
    );

    EmailMessage {
        to: lead.email.clone(),
        subject: "Book a meeting".to_string(),
        html,
    }
}

/// Who receives the admin summary: the workspace owner, then `ADMIN_EMAIL`,
/// then the built-in default.
pub fn admin_recipient(workspace: Option<&Workspace>, admin_email: Option<&str>) -> String {
    workspace
        .map(|w| w.owner_email.trim())
        .filter(|e| !e.is_empty())
        .or(admin_email)
        .unwrap_or(DEFAULT_ADMIN_EMAIL)
        .to_string()
}

pub struct NotificationDispatch<'a> {
    mailer: &'a dyn Mailer,
}

impl<'a> NotificationDispatch<'a> {
    pub fn new(mailer: &'a dyn Mailer) -> Self {
        Self { mailer }
    }

    /// Sends the admin summary (when `admin` is given) and, for qualified
    /// leads with a booking link, the booking email. Never fails.
    pub async fn dispatch(
        &self,
        lead: &Lead,
        admin: Option<(&str, &str)>,
    ) -> NotificationReport {
        let mut report = NotificationReport::default();

        if let Some((to, subject)) = admin {
            let message = admin_summary_email(to, subject, lead);
            match self.mailer.send(&message).await {
                Ok(()) => report.admin_notified = true,
                Err(e) => tracing::warn!("Admin notification for lead {} failed: {}", lead.id, e),
            }
        }

        if let (true, Some(url)) = (lead.qualified, lead.booking_url.as_deref()) {
            let message = booking_email(lead, url);
            match self.mailer.send(&message).await {
                Ok(()) => report.lead_notified = true,
                Err(e) => tracing::warn!("Booking email for lead {} failed: {}", lead.id, e),
            }
        }

        report
    }
}
