//! Declarative per-field validation and formatting rules.

use crate::core::toggle::Side;
use crate::domain::model::FileUpload;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

pub const MAX_AREA_SQM: f64 = 999_999.99;
pub const MAX_WIDTH: f64 = 999.99;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("valid email regex")
});
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w\S*").expect("valid word regex"));
static FLOAT_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)").expect("valid float regex"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// A select whose value is not the placeholder.
    Selected,
    /// Trimmed length in `1..=max`.
    TextLength { max: usize },
    Phone,
    Email { max_len: usize },
    Decimal {
        optional: bool,
        min: f64,
        min_inclusive: bool,
        max: f64,
    },
}

impl Check {
    pub fn evaluate(&self, value: &str) -> bool {
        match *self {
            Check::Selected => !value.is_empty(),
            Check::TextLength { max } => {
                let len = value.trim().chars().count();
                len > 0 && len <= max
            }
            Check::Phone => validate_phone_number(value),
            Check::Email { max_len } => validate_email(value) && value.chars().count() <= max_len,
            Check::Decimal {
                optional,
                min,
                min_inclusive,
                max,
            } => {
                if optional && value.trim().is_empty() {
                    return true;
                }
                match parse_float_prefix(value) {
                    Some(number) => {
                        let above_min = if min_inclusive { number >= min } else { number > min };
                        above_min && number <= max
                    }
                    None => false,
                }
            }
        }
    }
}

/// Full formatting applied on blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    TitleCase,
    Lowercase,
    TwoDecimals,
}

impl Format {
    pub fn apply(&self, value: &str) -> String {
        match self {
            Format::TitleCase => to_title_case(value),
            Format::Lowercase => value.to_lowercase(),
            Format::TwoDecimals => match parse_float_prefix(value) {
                Some(number) => to_fixed_two(number),
                None => value.to_string(),
            },
        }
    }
}

/// Lightweight character stripping applied on every input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restrict {
    Digits { max_len: usize },
    Decimal,
}

impl Restrict {
    pub fn apply(&self, value: &str) -> String {
        match *self {
            Restrict::Digits { max_len } => value
                .chars()
                .filter(|c| c.is_ascii_digit())
                .take(max_len)
                .collect(),
            Restrict::Decimal => {
                let kept: String = value
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect();
                match kept.split_once('.') {
                    Some((whole, rest)) => format!("{}.{}", whole, rest.replace('.', "")),
                    None => kept,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub field: String,
    pub check: Check,
    pub format: Option<Format>,
    pub restrict: Option<Restrict>,
    pub message: &'static str,
}

impl FieldRule {
    fn new(field: impl Into<String>, check: Check, message: &'static str) -> Self {
        Self {
            field: field.into(),
            check,
            format: None,
            restrict: None,
            message,
        }
    }

    fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    fn restrict(mut self, restrict: Restrict) -> Self {
        self.restrict = Some(restrict);
        self
    }
}

fn area(optional: bool) -> Check {
    Check::Decimal {
        optional,
        min: 0.0,
        min_inclusive: false,
        max: MAX_AREA_SQM,
    }
}

fn width() -> Check {
    Check::Decimal {
        optional: false,
        min: 0.0,
        min_inclusive: false,
        max: MAX_WIDTH,
    }
}

static RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    let mut rules = vec![
        FieldRule::new("applicant_type", Check::Selected, "Please select an option"),
        FieldRule::new(
            "applicant_name",
            Check::TextLength { max: 100 },
            "Please enter a valid name (max 100 characters)",
        )
        .format(Format::TitleCase),
        FieldRule::new(
            "contact_no",
            Check::Phone,
            "Please enter a valid 10-digit Indian mobile number",
        )
        .restrict(Restrict::Digits { max_len: 10 }),
        FieldRule::new(
            "email",
            Check::Email { max_len: 100 },
            "Please enter a valid email address (max 100 characters)",
        )
        .format(Format::Lowercase),
        FieldRule::new(
            "project_name",
            Check::TextLength { max: 100 },
            "Please enter a valid project name (max 100 characters)",
        )
        .format(Format::TitleCase),
        FieldRule::new(
            "site_address",
            Check::TextLength { max: 200 },
            "Please enter a valid site address (max 200 characters)",
        )
        .format(Format::TitleCase),
        FieldRule::new(
            "village_name",
            Check::TextLength { max: 50 },
            "Please enter a valid village/mouje name (max 50 characters)",
        )
        .format(Format::TitleCase),
        FieldRule::new(
            "reservation_area_sqm",
            area(true),
            "Please enter a valid positive number for Reservation Area Affected",
        )
        .format(Format::TwoDecimals)
        .restrict(Restrict::Decimal),
        FieldRule::new(
            "dp_rp_road_area_sqm",
            area(true),
            "Please enter a valid positive number for DP/RP Road Area Affected",
        )
        .format(Format::TwoDecimals)
        .restrict(Restrict::Decimal),
    ];

    for field in [
        "area_plot_site_sqm",
        "area_plot_ownership_sqm",
        "area_plot_measurement_sqm",
    ] {
        rules.push(
            FieldRule::new(field, area(false), "Please enter a valid number between 0.01 and 999,999.99")
                .format(Format::TwoDecimals)
                .restrict(Restrict::Decimal),
        );
    }

    rules.push(
        FieldRule::new(
            "pro_rata_fsi",
            Check::Decimal {
                optional: true,
                min: 0.0,
                min_inclusive: true,
                max: MAX_WIDTH,
            },
            "Please enter a valid number between 0 and 999.99",
        )
        .format(Format::TwoDecimals)
        .restrict(Restrict::Decimal),
    );
    rules.push(
        FieldRule::new("plot_width", width(), "Please enter a valid number between 0.01 and 999.99")
            .format(Format::TwoDecimals)
            .restrict(Restrict::Decimal),
    );

    for side in Side::ALL {
        rules.push(
            FieldRule::new(
                side.road_width_field(),
                width(),
                "Please enter a valid positive number (max 999.99)",
            )
            .format(Format::TwoDecimals)
            .restrict(Restrict::Decimal),
        );
    }

    rules
});

pub fn rules() -> &'static [FieldRule] {
    &RULES
}

pub fn rule_for(field: &str) -> Option<&'static FieldRule> {
    RULES.iter().find(|rule| rule.field == field)
}

/// Size and MIME check for image uploads.
pub fn validate_file(upload: &FileUpload) -> Result<(), &'static str> {
    if upload.size_bytes > MAX_FILE_BYTES {
        return Err("File size should not exceed 5MB");
    }
    if !ALLOWED_IMAGE_TYPES.contains(&upload.mime.as_str()) {
        return Err("Please upload an image file (JPEG, PNG, or GIF)");
    }
    Ok(())
}

pub fn validate_phone_number(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(&email.to_lowercase())
}

/// Upper-cases the first character of each word and lower-cases the rest.
pub fn to_title_case(value: &str) -> String {
    WORD_RE
        .replace_all(value, |caps: &regex::Captures| {
            let word = &caps[0];
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .into_owned()
}

/// Two decimals, rounding the exact binary value half away from zero
/// (`Number.prototype.toFixed(2)` semantics): `10.625` gives `10.63`,
/// `1.005` gives `1.00` because its stored value is just below the tie.
pub fn to_fixed_two(number: f64) -> String {
    if !number.is_finite() {
        return number.to_string();
    }
    // 1100 digits cover the full expansion of any f64 fraction
    let exact = format!("{:.1100}", number.abs());
    let (whole, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = frac.as_bytes();

    let mut digits: Vec<u8> = whole.bytes().collect();
    digits.extend((0..2).map(|i| frac.get(i).copied().unwrap_or(b'0')));

    if frac.get(2).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - 2;
    let sign = if number < 0.0 { "-" } else { "" };
    format!(
        "{}{}.{}",
        sign,
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    )
}

/// Leading numeric prefix, the way a browser's `parseFloat` reads it.
pub fn parse_float_prefix(value: &str) -> Option<f64> {
    FLOAT_PREFIX_RE
        .find(value)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
}
