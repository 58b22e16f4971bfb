use std::fmt::Write;

use chrono::NaiveDate;

use super::domain::ValidatedContact;

pub const PHONE_PLACEHOLDER: &str = "Nicht angegeben";

pub fn contact_subject(contact: &ValidatedContact) -> String {
    format!("Neue Kontaktanfrage von {}", contact.display_name())
}

/// Renders the notification sent to the office for one contact request.
///
/// Every interpolated value is escaped. Line breaks in the message are kept.
pub fn render_contact_email(contact: &ValidatedContact, today: NaiveDate) -> String {
    let phone = contact.phone.as_deref().unwrap_or(PHONE_PLACEHOLDER);
    let date = contact
        .date
        .clone()
        .unwrap_or_else(|| today.format("%d.%m.%Y").to_string());
    let message = contact
        .message
        .lines()
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>");

    let mut html = String::from(
        "<!DOCTYPE html><html lang=\"de\"><head><meta charset=\"utf-8\"></head>\
         <body style=\"font-family: Arial, sans-serif; color: #1f2933;\">",
    );
    html.push_str("<h2>Neue Kontaktanfrage</h2><table cellpadding=\"6\">");
    let _ = write!(
        html,
        "<tr><td><strong>Name</strong></td><td>{}</td></tr>",
        escape_html(&contact.display_name())
    );
    let _ = write!(
        html,
        "<tr><td><strong>E-Mail</strong></td><td><a href=\"mailto:{0}\">{0}</a></td></tr>",
        escape_html(&contact.email)
    );
    let _ = write!(
        html,
        "<tr><td><strong>Telefon</strong></td><td>{}</td></tr>",
        escape_html(phone)
    );
    let _ = write!(
        html,
        "<tr><td><strong>Datum</strong></td><td>{}</td></tr>",
        escape_html(&date)
    );
    html.push_str("</table>");
    let _ = write!(html, "<h3>Nachricht</h3><p>{message}</p>");

    if let Some(source) = &contact.source_url {
        let _ = write!(
            html,
            "<p>Gesendet von: <a href=\"{0}\">{0}</a></p>",
            escape_html(source)
        );
    }

    html.push_str("</body></html>");
    html
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> ValidatedContact {
        ValidatedContact {
            first_name: "Anna".to_string(),
            last_name: "Huber".to_string(),
            email: "anna.huber@example.at".to_string(),
            phone: None,
            message: "Erste Zeile\nZweite <Zeile>".to_string(),
            date: None,
            source_url: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 7).expect("valid date")
    }

    #[test]
    fn subject_names_the_sender() {
        assert_eq!(
            contact_subject(&contact()),
            "Neue Kontaktanfrage von Anna Huber"
        );
    }

    #[test]
    fn falls_back_for_phone_and_date() {
        let html = render_contact_email(&contact(), today());
        assert!(html.contains("Nicht angegeben"));
        assert!(html.contains("07.03.2025"));
        assert!(!html.contains("Gesendet von"));
    }

    #[test]
    fn keeps_line_breaks_and_escapes_markup() {
        let html = render_contact_email(&contact(), today());
        assert!(html.contains("Erste Zeile<br>Zweite &lt;Zeile&gt;"));
        assert!(!html.contains("<Zeile>"));
    }

    #[test]
    fn links_back_to_the_listing_page() {
        let contact = ValidatedContact {
            phone: Some("+43 660 1234567".to_string()),
            date: Some("01.02.2025".to_string()),
            source_url: Some("https://sira-group.at/immobilien/42?lang=de&ref=\"x\"".to_string()),
            ..contact()
        };

        let html = render_contact_email(&contact, today());
        assert!(html.contains("+43 660 1234567"));
        assert!(html.contains("01.02.2025"));
        assert!(html.contains(
            "<a href=\"https://sira-group.at/immobilien/42?lang=de&amp;ref=&quot;x&quot;\">"
        ));
    }
}
