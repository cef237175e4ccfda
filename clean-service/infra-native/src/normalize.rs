const PHONE_DIGITS: usize = 10;

/// Trims the name and title-cases it when it is plain ASCII. Names in other
/// scripts or with accents are only trimmed.
pub fn clean_name(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.is_ascii() {
        return trimmed.to_string();
    }

    let mut cleaned = String::with_capacity(trimmed.len());
    let mut previous_is_letter = false;
    for c in trimmed.chars() {
        if c.is_ascii_alphabetic() {
            if previous_is_letter {
                cleaned.push(c.to_ascii_lowercase());
            } else {
                cleaned.push(c.to_ascii_uppercase());
            }
            previous_is_letter = true;
        } else {
            cleaned.push(c);
            previous_is_letter = false;
        }
    }
    cleaned
}

/// Keeps the digits of a phone number. Anything longer than ten digits (a
/// `91` country code, a leading trunk `0`, other prefixes) is cut down to the
/// last ten.
pub fn clean_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() > PHONE_DIGITS {
        return digits[digits.len() - PHONE_DIGITS..].to_string();
    }
    digits
}

pub fn clean_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
