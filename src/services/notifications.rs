//! Outbox rows written alongside a booking, and the customer-facing
//! confirmation email. Nothing here sends mail.

use crate::entities::{notification, reservation};
use crate::services::bookings::BookingDetail;
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::Set;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Subject line stored on the CONFIRMATION outbox row.
pub fn confirmation_subject(code: &str) -> String {
    format!("Booking Confirmation - {}", code)
}

/// `6/7/2025` style date used in outbox content.
fn short_date(at: DateTime<Utc>) -> String {
    format!("{}/{}/{}", at.month(), at.day(), at.year())
}

/// The CONFIRMATION notification inserted in the booking transaction.
pub fn confirmation_notice(
    reservation: &reservation::Model,
    table_name: &str,
) -> notification::ActiveModel {
    notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        reservation_id: Set(reservation.id),
        notification_type: Set(notification::NotificationType::Confirmation),
        recipient: Set(reservation.customer_email.clone()),
        subject: Set(confirmation_subject(&reservation.confirmation_code)),
        content: Set(format!(
            "Your booking for {} on {} has been confirmed.",
            table_name,
            short_date(reservation.date)
        )),
        created_at: Set(Utc::now()),
    }
}

/// Rendered confirmation email.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

struct EmailLine {
    name: String,
    quantity: i32,
    total: Decimal,
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn dollars(amount: Decimal) -> String {
    format!("${}", crate::money::format(&amount))
}

/// Builds the confirmation email for a hydrated booking.
pub fn render_booking_confirmation(detail: &BookingDetail, public_base_url: &str) -> BookingEmail {
    let r = &detail.reservation;
    let code = r.confirmation_code.to_uppercase();
    let table_name = detail
        .table_type
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or("Table");
    let when = r.date.format("%A, %B %-d, %Y").to_string();
    let guests = if r.party_size == 1 { "guest" } else { "guests" };
    let remaining = r.bottle_subtotal - r.deposit_amount;
    let link = format!(
        "{}/booking/confirmation?code={}",
        public_base_url.trim_end_matches('/'),
        code
    );

    let lines: Vec<EmailLine> = detail
        .bottles
        .iter()
        .map(|line| EmailLine {
            name: line
                .bottle
                .as_ref()
                .map(|b| b.name.clone())
                .unwrap_or_else(|| "Bottle".to_string()),
            quantity: line.line.quantity,
            total: line.line.total_price,
        })
        .collect();

    let occasion = r.occasion.as_deref().filter(|o| !o.trim().is_empty());
    let requests = r.special_requests.as_deref().filter(|s| !s.trim().is_empty());

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n");
    html.push_str("<div class=\"header\"><h1>Booking Confirmed!</h1><p>Your table has been reserved</p></div>\n");
    html.push_str(&format!(
        "<p class=\"greeting\">Hi {},</p>\n<p>Thank you for your reservation! Here are your booking details:</p>\n",
        escape_html(&r.customer_name)
    ));
    html.push_str(&format!(
        "<div class=\"confirmation-code\">{}</div>\n<p class=\"code-label\">Save this confirmation code for your records</p>\n",
        escape_html(&code)
    ));
    html.push_str("<div class=\"details\">\n");
    html.push_str(&format!(
        "<div class=\"detail-row\"><span>Table</span><span>{}</span></div>\n",
        escape_html(table_name)
    ));
    html.push_str(&format!(
        "<div class=\"detail-row\"><span>Date &amp; Time</span><span>{}</span></div>\n",
        when
    ));
    html.push_str(&format!(
        "<div class=\"detail-row\"><span>Party Size</span><span>{} {}</span></div>\n",
        r.party_size, guests
    ));
    if let Some(occasion) = occasion {
        html.push_str(&format!(
            "<div class=\"detail-row\"><span>Occasion</span><span>{}</span></div>\n",
            escape_html(occasion)
        ));
    }
    html.push_str("</div>\n");
    if let Some(requests) = requests {
        html.push_str(&format!(
            "<h3>Special Requests</h3>\n<div class=\"details\"><p>{}</p></div>\n",
            escape_html(requests)
        ));
    }
    html.push_str("<h3>Bottle Selection</h3>\n<div class=\"bottles\">\n");
    for line in &lines {
        html.push_str(&format!(
            "<div class=\"bottle-item\"><span><strong>{}</strong> &times; {}</span><span>{}</span></div>\n",
            escape_html(&line.name),
            line.quantity,
            dollars(line.total)
        ));
    }
    html.push_str("</div>\n<div class=\"totals\">\n");
    html.push_str(&format!(
        "<div class=\"total-row\"><span>Total Bottle Spend</span><strong>{}</strong></div>\n",
        dollars(r.bottle_subtotal)
    ));
    html.push_str(&format!(
        "<div class=\"total-row\"><span>Deposit Paid (15%)</span><strong>{}</strong></div>\n",
        dollars(r.deposit_amount)
    ));
    html.push_str(&format!(
        "<div class=\"total-row highlight\"><span>Balance Due at Venue</span><span>{}</span></div>\n",
        dollars(remaining)
    ));
    html.push_str("</div>\n<div class=\"info-box\"><ul>\n");
    html.push_str("<li>Please arrive <strong>15 minutes before</strong> your reservation time</li>\n");
    html.push_str(&format!(
        "<li>Remaining balance of <strong>{}</strong> is due at the venue</li>\n",
        dollars(remaining)
    ));
    html.push_str("<li>No-shows will forfeit the deposit</li>\n");
    html.push_str("<li>For cancellations, contact us at least <strong>24 hours in advance</strong></li>\n");
    html.push_str("<li>Valid ID required (21+ only)</li>\n</ul></div>\n");
    html.push_str(&format!(
        "<div class=\"button-container\"><a href=\"{}\" class=\"button\">View Full Booking Details</a></div>\n",
        escape_html(&link)
    ));
    html.push_str("</body>\n</html>\n");

    let mut text = format!(
        "Hi {},\n\nYour booking is confirmed.\n\nConfirmation code: {}\nTable: {}\nDate: {}\nParty size: {} {}\n",
        r.customer_name, code, table_name, when, r.party_size, guests
    );
    if let Some(occasion) = occasion {
        text.push_str(&format!("Occasion: {}\n", occasion));
    }
    if let Some(requests) = requests {
        text.push_str(&format!("\nSpecial requests:\n{}\n", requests));
    }
    text.push_str("\nBottles:\n");
    for line in &lines {
        text.push_str(&format!(
            "- {} x {}: {}\n",
            line.name,
            line.quantity,
            dollars(line.total)
        ));
    }
    text.push_str(&format!(
        "\nTotal bottle spend: {}\nDeposit paid (15%): {}\nBalance due at venue: {}\n\nView your booking: {}\n",
        dollars(r.bottle_subtotal),
        dollars(r.deposit_amount),
        dollars(remaining),
        link
    ));

    BookingEmail {
        subject: format!("Booking Confirmed - {}", code),
        html,
        text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{bottle, ReservationStatus};
    use crate::services::bookings::BookingLineView;
    use crate::entities::reservation_bottle;
    use rust_decimal_macros::dec;

    fn detail(occasion: Option<&str>, requests: Option<&str>) -> BookingDetail {
        let now = Utc::now();
        let reservation = reservation::Model {
            id: Uuid::new_v4(),
            confirmation_code: "K7M2QX9P".into(),
            table_type_id: Uuid::new_v4(),
            date: "2025-06-07T23:00:00Z".parse().unwrap(),
            customer_name: "Dana <Ortiz>".into(),
            customer_email: "dana@example.com".into(),
            customer_phone: "555-0100".into(),
            party_size: 1,
            occasion: occasion.map(String::from),
            special_requests: requests.map(String::from),
            status: ReservationStatus::Pending,
            minimum_spend: dec!(1500),
            bottle_subtotal: dec!(900),
            deposit_amount: dec!(135),
            created_at: now,
            updated_at: now,
        };
        let bottle = bottle::Model {
            id: Uuid::new_v4(),
            sku: None,
            name: "Grey Goose".into(),
            brand: "Grey Goose".into(),
            category: "Vodka".into(),
            size: "750ml".into(),
            price: dec!(450),
            description: None,
            image: None,
            in_stock: true,
            active: true,
            sort_order: 0,
            on_hand: 0,
            par: 0,
            created_at: now,
            updated_at: now,
        };
        BookingDetail {
            bottles: vec![BookingLineView {
                line: reservation_bottle::Model {
                    id: Uuid::new_v4(),
                    reservation_id: reservation.id,
                    bottle_id: bottle.id,
                    quantity: 2,
                    price_per_unit: dec!(450),
                    total_price: dec!(900),
                },
                bottle: Some(bottle),
            }],
            table_type: None,
            reservation,
        }
    }

    #[test]
    fn outbox_row_uses_short_date_and_code() {
        let d = detail(None, None);
        let notice = confirmation_notice(&d.reservation, "VIP Booth");
        assert_eq!(
            notice.subject.clone().unwrap(),
            "Booking Confirmation - K7M2QX9P"
        );
        assert_eq!(
            notice.content.clone().unwrap(),
            "Your booking for VIP Booth on 6/7/2025 has been confirmed."
        );
        assert_eq!(notice.recipient.clone().unwrap(), "dana@example.com");
    }

    #[test]
    fn email_shows_balance_and_link() {
        let email = render_booking_confirmation(&detail(None, None), "https://club.example/");
        assert_eq!(email.subject, "Booking Confirmed - K7M2QX9P");
        assert!(email.html.contains("$765.00"));
        assert!(email
            .text
            .contains("https://club.example/booking/confirmation?code=K7M2QX9P"));
        assert!(email.text.contains("1 guest\n"));
        assert!(!email.html.contains("Occasion"));
        assert!(!email.html.contains("Special Requests"));
    }

    #[test]
    fn optional_sections_are_escaped() {
        let email = render_booking_confirmation(
            &detail(Some("Birthday"), Some("Cake <b>please</b>")),
            "http://localhost:3000",
        );
        assert!(email.html.contains("Occasion"));
        assert!(email.html.contains("Cake &lt;b&gt;please&lt;/b&gt;"));
        assert!(email.html.contains("Dana &lt;Ortiz&gt;"));
        assert!(email.text.contains("Special requests:\nCake <b>please</b>"));
    }
}
