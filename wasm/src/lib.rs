//! WebAssembly module for the BioMarket Platform
//!
//! Provides client-side computation for:
//! - Routing and buy-button gating from the user's profile
//! - Purchase dialog quotes
//! - Onboarding step validation
//! - The pending role kept across the login redirect

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::{
    clamp_quantity_input, default_quantity, AccessState, EnvironmentalImpact, OnboardingForm,
    Page, ProfileSnapshot, PurchaseQuote, UserRole, WasteType,
};

/// localStorage key holding the role picked before login
const PENDING_ROLE_KEY: &str = "pending_role";

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("biomarket-wasm ready"));
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
}

/// Field-level error handed back to the form
#[derive(Serialize)]
struct FieldError {
    field: &'static str,
    message: String,
}

fn parse_page(page: &str) -> Result<Page, JsValue> {
    serde_json::from_value(serde_json::Value::String(page.to_string()))
        .map_err(|_| JsValue::from_str(&format!("Unknown page: {}", page)))
}

fn parse_role(role: &str) -> Result<UserRole, JsValue> {
    role.parse::<UserRole>()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Routing decision for the current user.
///
/// `profile_json` is the profile record (or `null`/empty when none exists);
/// only `role`, `onboarding_completed` and `approval_status` are read.
#[wasm_bindgen]
pub fn access_decision(
    authenticated: bool,
    profile_json: Option<String>,
    requested_page: Option<String>,
) -> Result<String, JsValue> {
    let state = if authenticated {
        let profile: Option<ProfileSnapshot> = match profile_json.as_deref().map(str::trim) {
            None | Some("") | Some("null") => None,
            Some(json) => Some(
                serde_json::from_str(json)
                    .map_err(|e| JsValue::from_str(&format!("Invalid profile JSON: {}", e)))?,
            ),
        };
        AccessState::from_profile(profile.as_ref())
    } else {
        AccessState::Unauthenticated
    };

    let requested = requested_page.as_deref().map(parse_page).transpose()?;
    to_json(&state.decide(requested))
}

/// Clamp the purchase dialog input to whole kilograms in `[1, available]`
#[wasm_bindgen]
pub fn clamp_purchase_quantity(input: &str, available_kg: f64) -> f64 {
    to_f64(clamp_quantity_input(input, to_decimal(available_kg)))
}

/// Quantity the purchase dialog opens with
#[wasm_bindgen]
pub fn default_purchase_quantity(available_kg: f64) -> f64 {
    to_f64(default_quantity(to_decimal(available_kg)))
}

/// Price breakdown for the purchase dialog, as JSON
#[wasm_bindgen]
pub fn quote_purchase(input: &str, available_kg: f64, price_per_kg: f64) -> Result<String, JsValue> {
    let quantity = clamp_quantity_input(input, to_decimal(available_kg));
    to_json(&PurchaseQuote::compute(quantity, to_decimal(price_per_kg)))
}

/// Environmental impact of the kilograms a seller has sold, as JSON
#[wasm_bindgen]
pub fn environmental_impact(total_kg: f64) -> Result<String, JsValue> {
    to_json(&EnvironmentalImpact::from_kg(to_decimal(total_kg)))
}

/// Validate one onboarding step.
/// Returns `null` when valid, otherwise a `{field, message}` JSON object.
#[wasm_bindgen]
pub fn validate_onboarding_step(form_json: &str, step: u8) -> Result<Option<String>, JsValue> {
    let form: OnboardingForm = serde_json::from_str(form_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid form JSON: {}", e)))?;

    match form.validate_step(step) {
        Ok(()) => Ok(None),
        Err(err) => to_json(&FieldError {
            field: err.field(),
            message: err.to_string(),
        })
        .map(Some),
    }
}

/// Number of onboarding steps for a role
#[wasm_bindgen]
pub fn onboarding_total_steps(role: &str) -> Result<u8, JsValue> {
    let role = parse_role(role)?;
    Ok(OnboardingForm::with_pending_role(Some(role)).total_steps())
}

/// Industry choices for a role as `[{value, label}]` JSON
#[wasm_bindgen]
pub fn industry_options(role: &str) -> Result<String, JsValue> {
    #[derive(Serialize)]
    struct IndustryChoice {
        value: &'static str,
        label: &'static str,
    }

    let options: Vec<IndustryChoice> = parse_role(role)?
        .industry_options()
        .iter()
        .map(|i| IndustryChoice {
            value: i.as_str(),
            label: i.label(),
        })
        .collect();

    to_json(&options)
}

/// Display label for a stored waste type; unknown values read as "Otro"
#[wasm_bindgen]
pub fn waste_type_label(value: &str) -> String {
    WasteType::from_str_or_other(value).label().to_string()
}

fn local_storage() -> Result<web_sys::Storage, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window available"))?
        .local_storage()?
        .ok_or_else(|| JsValue::from_str("localStorage unavailable"))
}

/// Keep the role chosen on the welcome screen until onboarding starts
#[wasm_bindgen]
pub fn remember_pending_role(role: &str) -> Result<(), JsValue> {
    let role = parse_role(role)?;
    local_storage()?.set_item(PENDING_ROLE_KEY, role.as_str())
}

/// Read and remove the pending role. Invalid stored values are discarded.
#[wasm_bindgen]
pub fn take_pending_role() -> Result<Option<String>, JsValue> {
    let storage = local_storage()?;
    let stored = storage.get_item(PENDING_ROLE_KEY)?;
    storage.remove_item(PENDING_ROLE_KEY)?;

    Ok(stored
        .and_then(|value| value.parse::<UserRole>().ok())
        .map(|role| role.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_lands_on_welcome() {
        let json = access_decision(false, None, Some("seller_dashboard".into())).unwrap();
        let decision: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decision["state"], "unauthenticated");
        assert_eq!(decision["page"], "welcome");
        assert_eq!(decision["can_buy"], false);
    }

    #[test]
    fn test_pending_buyer_decision() {
        let profile = r#"{"role":"buyer_business","onboarding_completed":true,"approval_status":"pending","company_name":"BioGas Andino"}"#;
        let json = access_decision(true, Some(profile.into()), None).unwrap();
        let decision: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decision["page"], "buyer_dashboard");
        assert_eq!(decision["can_buy"], false);
        assert_eq!(decision["notice"]["status"], "pending");
    }

    #[test]
    fn test_missing_profile_goes_to_onboarding() {
        let json = access_decision(true, Some("null".into()), None).unwrap();
        let decision: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(decision["state"], "profile_missing");
        assert_eq!(decision["page"], "onboarding");
    }

    #[test]
    fn test_clamp_and_default_quantity() {
        assert_eq!(clamp_purchase_quantity("abc", 500.0), 1.0);
        assert_eq!(clamp_purchase_quantity("900", 500.0), 500.0);
        assert_eq!(default_purchase_quantity(1000.0), 100.0);
        assert_eq!(default_purchase_quantity(40.0), 40.0);
    }

    #[test]
    fn test_quote_purchase() {
        let json = quote_purchase("100", 1000.0, 2.0).unwrap();
        let quote: PurchaseQuote = serde_json::from_str(&json).unwrap();
        assert_eq!(quote.total_amount, Decimal::from(202));
        assert_eq!(quote.seller_earnings, Decimal::from(198));
    }

    #[test]
    fn test_onboarding_step_validation() {
        assert_eq!(validate_onboarding_step(r#"{"role":"seller_personal"}"#, 1).unwrap(), None);

        let error = validate_onboarding_step(r#"{"role":"seller_personal"}"#, 2)
            .unwrap()
            .unwrap();
        assert!(error.contains("company_name"));
    }

    #[test]
    fn test_onboarding_total_steps() {
        assert_eq!(onboarding_total_steps("buyer_business").unwrap(), 3);
        assert_eq!(onboarding_total_steps("seller_business").unwrap(), 2);
    }

    #[test]
    fn test_waste_type_label_falls_back() {
        assert_eq!(waste_type_label("no_existe"), WasteType::Otro.label());
    }
}
