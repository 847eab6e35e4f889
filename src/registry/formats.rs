//! Built-in format predicates.
//!
//! Each one is context-free: a single value in, a bool out. String predicates
//! reject non-strings; coordinate predicates take numbers.
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const BUILTIN: &[(&str, fn(&Value) -> bool)] = &[
    // user & authentication
    ("email", email),
    ("password", password),
    ("username", username),
    ("phone", phone),
    ("country-code", country_code),
    ("gender", gender),
    ("otp", otp),
    ("auth-token", auth_token),
    // financial & payment
    ("credit-card", credit_card),
    ("cvv", cvv),
    ("expiry-date", expiry_date),
    ("payment-status", payment_status),
    ("transaction-id", transaction_id),
    ("invoice-number", invoice_number),
    ("gstin", gstin),
    ("pan", pan),
    ("ifsc", ifsc),
    ("upi", upi),
    // address & location
    ("zip", zip),
    ("city", alphabetic),
    ("state", alphabetic),
    ("country", alphabetic),
    ("latitude", latitude),
    ("longitude", longitude),
    ("ip-address", ip_address),
    // documents & files
    ("aadhaar", aadhaar),
    ("voter-id", voter_id),
    ("passport", passport),
    ("driving-license", driving_license),
    ("document-type", document_type),
    ("image-format", image_format),
    // security & tokens
    ("sql-safe", sql_safe),
    ("xss-safe", xss_safe),
    ("csrf-token", csrf_token),
    ("jwt", jwt),
    ("api-key", api_key),
    ("oauth-token", oauth_token),
    // misc
    ("schedule", schedule),
    ("employee-code", employee_code),
    ("foreign-key", foreign_key),
    ("uuid", uuid),
];

// ------------------------------- Patterns --------------------------------- //

macro_rules! pattern {
    ($name:ident, $rx:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($rx).expect("built-in pattern"));
    };
}

pattern!(EMAIL, r"^[\w.-]+@[\w.-]+\.\w{2,}$");
pattern!(USERNAME, r"^[A-Za-z0-9_]{3,30}$");
pattern!(PHONE, r"^\d{10}$");
pattern!(COUNTRY_CODE, r"^[A-Z]{2}$");
pattern!(OTP, r"^\d{4,6}$");
pattern!(CREDIT_CARD, r"^\d{16}$");
pattern!(CVV, r"^\d{3,4}$");
pattern!(TRANSACTION_ID, r"^[A-Z0-9]{10,}$");
pattern!(INVOICE_NUMBER, r"^[A-Z0-9\-]{5,}$");
pattern!(GSTIN, r"^\d{2}[A-Z]{5}\d{4}[A-Z][A-Z\d]Z[A-Z\d]$");
pattern!(PAN, r"^[A-Z]{5}[0-9]{4}[A-Z]$");
pattern!(IFSC, r"^[A-Z]{4}0[A-Z0-9]{6}$");
pattern!(UPI, r"^[\w.-]+@\w+$");
pattern!(ZIP, r"^\d{5,6}$");
pattern!(IP_ADDRESS, r"^(\d{1,3}\.){3}\d{1,3}$");
pattern!(AADHAAR, r"^\d{12}$");
pattern!(VOTER_ID, r"^[A-Z]{3}[0-9]{7}$");
pattern!(PASSPORT, r"^[A-Z]-?\d{7}$");
pattern!(DRIVING_LICENSE, r"^[A-Z]{2}\d{13}$");
pattern!(XSS_SCRIPT, r"(?is)<script.*?>.*?</script>");
pattern!(CSRF_TOKEN, r"^[a-zA-Z0-9_-]{32,}$");
pattern!(API_KEY, r"^[A-Z0-9]{20,40}$");
pattern!(SCHEDULE, r"^[A-Za-z]{3}-[A-Za-z]{3}\s\d{1,2}[APMapm]{2}-\d{1,2}[APMapm]{2}$");
pattern!(EMPLOYEE_CODE, r"^EMP\d{4,10}$");
pattern!(UUID, r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-5][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}$");

const PASSWORD_SPECIALS: &str = "@$!%*#?&";
const SQL_KEYWORDS: &[&str] = &[
    "--", ";", "/*", "*/", "@@", "@", "char", "nchar", "varchar", "nvarchar",
];

// ------------------------------ Predicates -------------------------------- //

fn matches(rx: &Regex, value: &Value) -> bool {
    value.as_str().is_some_and(|s| rx.is_match(s))
}

fn one_of(value: &Value, allowed: &[&str]) -> bool {
    value.as_str().is_some_and(|s| allowed.contains(&s))
}

pub fn email(v: &Value) -> bool {
    matches(&EMAIL, v)
}

pub fn username(v: &Value) -> bool {
    matches(&USERNAME, v)
}

pub fn phone(v: &Value) -> bool {
    matches(&PHONE, v)
}

pub fn country_code(v: &Value) -> bool {
    matches(&COUNTRY_CODE, v)
}

pub fn otp(v: &Value) -> bool {
    matches(&OTP, v)
}

pub fn credit_card(v: &Value) -> bool {
    matches(&CREDIT_CARD, v)
}

pub fn cvv(v: &Value) -> bool {
    matches(&CVV, v)
}

pub fn transaction_id(v: &Value) -> bool {
    matches(&TRANSACTION_ID, v)
}

pub fn invoice_number(v: &Value) -> bool {
    matches(&INVOICE_NUMBER, v)
}

pub fn gstin(v: &Value) -> bool {
    matches(&GSTIN, v)
}

pub fn pan(v: &Value) -> bool {
    matches(&PAN, v)
}

pub fn ifsc(v: &Value) -> bool {
    matches(&IFSC, v)
}

pub fn upi(v: &Value) -> bool {
    matches(&UPI, v)
}

pub fn zip(v: &Value) -> bool {
    matches(&ZIP, v)
}

pub fn ip_address(v: &Value) -> bool {
    matches(&IP_ADDRESS, v)
}

pub fn aadhaar(v: &Value) -> bool {
    matches(&AADHAAR, v)
}

pub fn voter_id(v: &Value) -> bool {
    matches(&VOTER_ID, v)
}

pub fn passport(v: &Value) -> bool {
    matches(&PASSPORT, v)
}

pub fn driving_license(v: &Value) -> bool {
    matches(&DRIVING_LICENSE, v)
}

pub fn csrf_token(v: &Value) -> bool {
    matches(&CSRF_TOKEN, v)
}

pub fn api_key(v: &Value) -> bool {
    matches(&API_KEY, v)
}

pub fn schedule(v: &Value) -> bool {
    matches(&SCHEDULE, v)
}

pub fn employee_code(v: &Value) -> bool {
    matches(&EMPLOYEE_CODE, v)
}

pub fn uuid(v: &Value) -> bool {
    matches(&UUID, v)
}

pub fn gender(v: &Value) -> bool {
    one_of(v, &["M", "F", "Other"])
}

pub fn payment_status(v: &Value) -> bool {
    one_of(v, &["Pending", "Completed"])
}

/// 8+ chars from `[A-Za-z0-9@$!%*#?&]`, with at least one lowercase,
/// uppercase, digit and special each.
pub fn password(v: &Value) -> bool {
    let Some(s) = v.as_str() else { return false };
    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c);
    s.chars().count() >= 8
        && s.chars().all(allowed)
        && s.chars().any(|c| c.is_ascii_lowercase())
        && s.chars().any(|c| c.is_ascii_uppercase())
        && s.chars().any(|c| c.is_ascii_digit())
        && s.chars().any(|c| PASSWORD_SPECIALS.contains(c))
}

pub fn auth_token(v: &Value) -> bool {
    v.as_str().is_some_and(|s| s.chars().count() >= 10)
}

pub fn oauth_token(v: &Value) -> bool {
    v.as_str().is_some_and(|s| s.chars().count() >= 20)
}

/// `MM/YY`, valid while the first day of that month is still ahead.
pub fn expiry_date(v: &Value) -> bool {
    let Some(s) = v.as_str() else { return false };
    match NaiveDate::parse_from_str(&format!("01/{s}"), "%d/%m/%y") {
        Ok(first_of_month) => first_of_month
            .and_hms_opt(0, 0, 0)
            .is_some_and(|exp| exp > Local::now().naive_local()),
        Err(_) => false,
    }
}

pub fn alphabetic(v: &Value) -> bool {
    v.as_str().is_some_and(|s| !s.is_empty() && s.chars().all(char::is_alphabetic))
}

pub fn latitude(v: &Value) -> bool {
    v.as_f64().is_some_and(|x| (-90.0..=90.0).contains(&x))
}

pub fn longitude(v: &Value) -> bool {
    v.as_f64().is_some_and(|x| (-180.0..=180.0).contains(&x))
}

pub fn document_type(v: &Value) -> bool {
    v.as_str().is_some_and(|s| matches!(s.to_uppercase().as_str(), "PDF" | "JPG"))
}

/// File name with a png/jpg/jpeg extension.
pub fn image_format(v: &Value) -> bool {
    v.as_str().is_some_and(|s| {
        let lower = s.to_lowercase();
        [".png", ".jpg", ".jpeg"].iter().any(|ext| lower.ends_with(ext))
    })
}

/// Heuristic: none of the usual SQL injection tokens appear.
pub fn sql_safe(v: &Value) -> bool {
    v.as_str().is_some_and(|s| {
        let lower = s.to_lowercase();
        !SQL_KEYWORDS.iter().any(|kw| lower.contains(kw))
    })
}

pub fn xss_safe(v: &Value) -> bool {
    v.as_str().is_some_and(|s| !XSS_SCRIPT.is_match(s))
}

/// Shape only: three dot-separated segments.
pub fn jwt(v: &Value) -> bool {
    v.as_str().is_some_and(|s| s.split('.').count() == 3)
}

pub fn foreign_key(v: &Value) -> bool {
    v.as_str().is_some_and(|s| s.starts_with("id_"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_shapes() {
        assert!(email(&json!("a@b.co")));
        assert!(email(&json!("john.doe@example.com")));
        assert!(!email(&json!("not-an-email")));
        assert!(!email(&json!("a@b.c")));
        assert!(!email(&json!(42)));
    }

    #[test]
    fn password_strength() {
        assert!(password(&json!("Secure@123")));
        assert!(!password(&json!("secure@123")), "no uppercase");
        assert!(!password(&json!("Secure1234")), "no special");
        assert!(!password(&json!("Se@1")), "too short");
        assert!(!password(&json!("Secure@123 ")), "space not allowed");
    }

    #[test]
    fn indian_document_ids() {
        assert!(pan(&json!("ABCDE1234F")));
        assert!(!pan(&json!("ABCD1234F")));
        assert!(gstin(&json!("22ABCDE1234F1Z5")));
        assert!(!gstin(&json!("22ABCDE1234F1X5")));
        assert!(ifsc(&json!("SBIN0001234")));
        assert!(aadhaar(&json!("123456789012")));
        assert!(passport(&json!("A-1234567")));
        assert!(passport(&json!("A1234567")));
        assert!(voter_id(&json!("ABC1234567")));
        assert!(driving_license(&json!("MH1234567890123")));
    }

    #[test]
    fn coordinates_want_numbers() {
        assert!(latitude(&json!(37.42)));
        assert!(latitude(&json!(-90)));
        assert!(!latitude(&json!(90.5)));
        assert!(longitude(&json!(-122.08)));
        assert!(!longitude(&json!("10")));
    }

    #[test]
    fn token_shapes() {
        assert!(jwt(&json!("aaa.bbb.ccc")));
        assert!(!jwt(&json!("aaa.bbb")));
        assert!(csrf_token(&json!("a".repeat(32))));
        assert!(!csrf_token(&json!("a".repeat(31))));
        assert!(api_key(&json!("ABCDEFGHIJ0123456789")));
        assert!(uuid(&json!("123e4567-e89b-12d3-a456-426614174000")));
        assert!(!uuid(&json!("123e4567-e89b-62d3-a456-426614174000")));
    }

    #[test]
    fn security_heuristics() {
        assert!(sql_safe(&json!("plain text")));
        assert!(!sql_safe(&json!("1; DROP TABLE users")));
        assert!(!sql_safe(&json!("CAST(x AS VARCHAR)")));
        assert!(xss_safe(&json!("<b>hi</b>")));
        assert!(!xss_safe(&json!("<SCRIPT src=x>alert(1)</script>")));
    }

    #[test]
    fn expiry_date_is_month_based() {
        assert!(expiry_date(&json!("12/50")));
        assert!(!expiry_date(&json!("01/20")));
        assert!(!expiry_date(&json!("13/50")));
        assert!(!expiry_date(&json!("garbage")));
    }

    #[test]
    fn misc_formats() {
        assert!(alphabetic(&json!("München")));
        assert!(!alphabetic(&json!("New York")));
        assert!(!alphabetic(&json!("")));
        assert!(image_format(&json!("Photo.JPEG")));
        assert!(document_type(&json!("pdf")));
        assert!(schedule(&json!("Mon-Fri 9AM-5PM")));
        assert!(employee_code(&json!("EMP0042")));
        assert!(foreign_key(&json!("id_42")));
        assert!(gender(&json!("Other")));
        assert!(!gender(&json!("other")));
    }
}
