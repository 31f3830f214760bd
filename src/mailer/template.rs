//! Reminder email template

use crate::constants::{DEFAULT_MAIL_FROM_NAME, REMINDER_SUBJECT};
use crate::models::Student;

use super::OutgoingMail;

/// Render the inactivity reminder for a student
pub fn inactivity_reminder(student: &Student) -> OutgoingMail {
    let name = escape_html(&student.name);

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; color: #333;">
  <h2>Hello {name},</h2>
  <p>We noticed that you haven't solved any problems on Codeforces recently.</p>
  <p>Consistent practice is key to improving your programming skills. We encourage you to solve at least a few problems this week.</p>
  <br>
  <p>Happy coding!</p>
  <p>{signature}</p>
  <hr>
  <p style="font-size: 12px; color: #777;">
    If you'd like to opt out of these reminder emails, please contact your instructor or update your preferences in the system.
  </p>
</div>"#,
        signature = DEFAULT_MAIL_FROM_NAME,
    );

    OutgoingMail {
        to_address: student.email.clone(),
        to_name: student.name.clone(),
        subject: REMINDER_SUBJECT.to_string(),
        html,
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
