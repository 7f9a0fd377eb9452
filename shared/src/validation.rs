//! Validation utilities for the BioMarket platform

use rust_decimal::Decimal;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate an international phone number
/// Accepts: +52 33 1234 5678, 33-1234-5678, (56) 2 2345 6789
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')' | '+');
    if !phone.chars().all(allowed) {
        return Err("Phone number contains invalid characters");
    }
    if phone.chars().skip(1).any(|c| c == '+') {
        return Err("Phone number may only start with +");
    }

    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err("Phone number must have between 7 and 15 digits");
    }
    Ok(())
}

// ============================================================================
// Document Validations
// ============================================================================

/// Validate a reference returned by the file storage service
pub fn validate_document_url(url: &str) -> Result<(), &'static str> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or("Document reference must be an http(s) URL")?;

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() || rest.chars().any(char::is_whitespace) {
        return Err("Document reference is not a valid URL");
    }
    Ok(())
}

// ============================================================================
// Marketplace Validations
// ============================================================================

/// Validate a listing quantity; stock is traded in whole kilograms
pub fn validate_quantity_kg(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    if !quantity.fract().is_zero() {
        return Err("Quantity must be a whole number of kilograms");
    }
    Ok(())
}

/// Validate a unit price in USD per kilogram
pub fn validate_price_per_kg(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price per kg must be greater than zero");
    }
    if price.scale() > 2 && price.round_dp(2) != price {
        return Err("Price per kg supports at most two decimals");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("compras@bioenergia.cl").is_ok());
        assert!(validate_email("user.name@domain.com.mx").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@domain.com").is_err());
        assert!(validate_email("a@.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+52 33 1234 5678").is_ok());
        assert!(validate_phone("33-1234-5678").is_ok());
        assert!(validate_phone("(56) 2 2345 6789").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("33+1234567").is_err());
        assert!(validate_phone("call me").is_err());
    }

    #[test]
    fn test_validate_document_url() {
        assert!(validate_document_url("https://files.example.com/permit.pdf").is_ok());
        assert!(validate_document_url("http://localhost:9000/bucket/a.pdf").is_ok());
        assert!(validate_document_url("ftp://files.example.com/permit.pdf").is_err());
        assert!(validate_document_url("https:///permit.pdf").is_err());
        assert!(validate_document_url("https://files.example.com/my permit.pdf").is_err());
    }

    #[test]
    fn test_validate_marketplace_amounts() {
        assert!(validate_quantity_kg(Decimal::from(500)).is_ok());
        assert!(validate_quantity_kg(Decimal::ZERO).is_err());
        assert!(validate_quantity_kg(Decimal::from_str("500.00").unwrap()).is_ok());
        assert!(validate_quantity_kg(Decimal::from_str("100.5").unwrap()).is_err());
        assert!(validate_price_per_kg(Decimal::from_str("2.50").unwrap()).is_ok());
        assert!(validate_price_per_kg(Decimal::from_str("2.505").unwrap()).is_err());
        assert!(validate_price_per_kg(Decimal::from_str("-1").unwrap()).is_err());
    }
}
