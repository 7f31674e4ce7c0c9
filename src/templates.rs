//! Bodies of the emails the site sends.
//!
//! User-supplied text is HTML-escaped before it lands in an `html` part; the
//! `text` parts carry it verbatim.

use chrono::Datelike;
use htmlescape::encode_minimal;

use crate::configuration::SiteSettings;
use crate::domain::{ContactSubmission, NewsletterSignup};

#[derive(Debug, Clone)]
pub struct EmailContent {
    pub subject: String,
    pub html: String,
    pub text: String,
}

const NEWSLETTER_BENEFITS: [(&str, &str); 4] = [
    ("AI Insights", "Latest automation strategies"),
    ("Case Studies", "Real Tulsa business results"),
    ("Quick Tips", "Actionable automation advice"),
    ("Early Access", "New tools and features first"),
];

/// Inquiry forwarded to the business inbox.
pub fn contact_notification(submission: &ContactSubmission, subject: &str) -> EmailContent {
    let mut html = String::from("<h2>New Contact Form Submission</h2>\n");
    html.push_str(&field_html("Name", submission.name.as_ref()));
    html.push_str(&field_html("Email", submission.email.as_ref()));
    let mut text = format!(
        "New Contact Form Submission\n\nName: {}\nEmail: {}\n",
        submission.name, submission.email
    );
    if let Some(phone) = &submission.phone {
        html.push_str(&field_html("Phone", phone));
        text.push_str(&format!("Phone: {}\n", phone));
    }
    if let Some(business) = &submission.business {
        html.push_str(&field_html("Business", business));
        text.push_str(&format!("Business: {}\n", business));
    }
    if submission.subscribe_newsletter {
        html.push_str(&field_html("Newsletter", "Opted in"));
        text.push_str("Newsletter: Opted in\n");
    }
    html.push_str("<p><strong>Message:</strong></p>\n");
    html.push_str(&format!("<p>{}</p>\n", multiline_html(submission.message.as_ref())));
    text.push_str(&format!("\nMessage:\n{}\n", submission.message.as_ref()));

    EmailContent {
        subject: subject.to_string(),
        html,
        text,
    }
}

/// Acknowledgement sent back to whoever filled in the contact form.
pub fn contact_confirmation(submission: &ContactSubmission, site: &SiteSettings) -> EmailContent {
    let subject = format!("Thank you for contacting {}", site.brand_name);
    let name = encode_minimal(submission.name.as_ref());
    let message = multiline_html(submission.message.as_ref());
    let business_html = submission
        .business
        .as_deref()
        .map(|b| format!(r#"<p style="color:#718096;font-size:14px;"><strong>Business:</strong> {}</p>"#, encode_minimal(b)))
        .unwrap_or_default();

    let body = format!(
        r#"<h2 style="color:#1a202c;">Thank you for reaching out!</h2>
<p>Hi {name},</p>
<p>Thank you for contacting {brand}. We've received your message and will get back to you within 1 business day.</p>
<div style="background-color:#f7fafc;border-left:4px solid #667eea;padding:20px;margin:30px 0;">
  <h3 style="color:#2d3748;">Your Message:</h3>
  <p style="font-style:italic;">"{message}"</p>
  {business_html}
</div>
{button}
<p style="color:#718096;">Best regards,<br>The {brand} Team</p>"#,
        name = name,
        brand = encode_minimal(&site.brand_name),
        message = message,
        business_html = business_html,
        button = consultation_button(site),
    );

    let business_text = submission
        .business
        .as_deref()
        .map(|b| format!("Business: {}\n", b))
        .unwrap_or_default();
    let text = format!(
        "Thank you for contacting {brand}!\n\n\
         Hi {name},\n\n\
         Thank you for contacting {brand}. We've received your message and will get back to you within 1 business day.\n\n\
         Your Message:\n\"{message}\"\n{business}\n\
         Schedule a free consultation: {calendly}\n\n\
         Best regards,\nThe {brand} Team\n\n{footer}\n",
        brand = site.brand_name,
        name = submission.name,
        message = submission.message.as_ref(),
        business = business_text,
        calendly = site.calendly_url,
        footer = copyright(site),
    );

    EmailContent {
        html: layout(&subject, &body, site, ""),
        subject,
        text,
    }
}

/// Welcome message for a new newsletter subscriber.
pub fn newsletter_welcome(signup: &NewsletterSignup, site: &SiteSettings) -> EmailContent {
    let subject = format!("Welcome to {} Newsletter!", site.brand_name);
    let display_name = signup.display_name();

    let benefits_html: String = NEWSLETTER_BENEFITS
        .iter()
        .map(|(title, blurb)| {
            format!(
                r#"  <li><strong style="color:#2d3748;">{}</strong> - {}</li>
"#,
                title, blurb
            )
        })
        .collect();
    let body = format!(
        r#"<h2 style="color:#1a202c;">Welcome to our newsletter, {name}!</h2>
<p>You're now part of our community of Tulsa business owners who are unlocking growth with practical AI automation.</p>
<h3 style="color:#2d3748;">What to expect:</h3>
<ul>
{benefits}</ul>
{button}
<p style="color:#718096;">Ready to get started?<br>The {brand} Team</p>"#,
        name = encode_minimal(display_name),
        benefits = benefits_html,
        button = consultation_button(site),
        brand = encode_minimal(&site.brand_name),
    );

    let benefits_text: String = NEWSLETTER_BENEFITS
        .iter()
        .map(|(title, blurb)| format!("- {} - {}\n", title, blurb))
        .collect();
    let text = format!(
        "Welcome to {brand} Newsletter!\n\n\
         Hi {name},\n\n\
         You're now part of our community of Tulsa business owners who are unlocking growth with practical AI automation.\n\n\
         What to expect:\n{benefits}\n\
         Schedule a free consultation: {calendly}\n\n\
         Ready to get started?\nThe {brand} Team\n\n{footer}\n",
        brand = site.brand_name,
        name = display_name,
        benefits = benefits_text,
        calendly = site.calendly_url,
        footer = copyright(site),
    );

    let unsubscribe = r##"<p style="color:#a0aec0;font-size:12px;"><a href="#" style="color:#a0aec0;">Unsubscribe</a> | <a href="#" style="color:#a0aec0;">Privacy Policy</a></p>"##;
    EmailContent {
        html: layout(&subject, &body, site, unsubscribe),
        subject,
        text,
    }
}

fn field_html(label: &str, value: &str) -> String {
    format!(
        "<p><strong>{}:</strong> {}</p>\n",
        label,
        encode_minimal(value)
    )
}

fn multiline_html(value: &str) -> String {
    encode_minimal(value).replace('\n', "<br>")
}

fn consultation_button(site: &SiteSettings) -> String {
    format!(
        r#"<div style="text-align:center;margin:40px 0;">
  <a href="{}" style="display:inline-block;background:linear-gradient(135deg,#667eea 0%,#764ba2 100%);color:#ffffff;text-decoration:none;padding:16px 32px;border-radius:8px;font-weight:600;">Schedule Free Consultation</a>
</div>"#,
        encode_minimal(&site.calendly_url)
    )
}

fn copyright(site: &SiteSettings) -> String {
    format!(
        "© {} {}. All rights reserved.",
        chrono::Utc::now().year(),
        site.brand_name
    )
}

fn layout(title: &str, body: &str, site: &SiteSettings, footer_extra: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
</head>
<body style="margin:0;padding:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background-color:#f8fafc;">
<div style="max-width:600px;margin:0 auto;background-color:#ffffff;">
  <div style="background:linear-gradient(135deg,#667eea 0%,#764ba2 100%);padding:40px 30px;text-align:center;">
    <h1 style="color:#ffffff;margin:0;">{brand}</h1>
    <p style="color:#e2e8f0;margin:8px 0 0 0;">AI &amp; Automation for Tulsa Businesses</p>
  </div>
  <div style="padding:40px 30px;color:#4a5568;line-height:1.6;">
{body}
  </div>
  <div style="background-color:#f8fafc;padding:30px;text-align:center;border-top:1px solid #e2e8f0;">
    <p style="color:#718096;font-size:14px;">{footer}</p>
    {footer_extra}
  </div>
</div>
</body>
</html>
"#,
        title = encode_minimal(title),
        brand = encode_minimal(&site.brand_name),
        body = body,
        footer = encode_minimal(&copyright(site)),
        footer_extra = footer_extra,
    )
}
