//! Error handling for the BioMarket platform
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{AccessError, ListingError, OnboardingError, PurchaseError, UnknownVariant};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, message_es: String },

    // Access gating
    #[error("Forbidden: {message}")]
    Forbidden { message: String, message_es: String },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_es: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Listing is no longer available")]
    ListingUnavailable,

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    // External service errors
    #[error("Storage error: {0}")]
    StorageError(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: impl Into<String>, message_es: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_es: message_es.into(),
            field: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl AppError {
    /// HTTP status and response body for this error
    fn detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "INVALID_CREDENTIALS",
                    "Invalid email or password",
                    "Correo o contraseña incorrectos",
                ),
            ),
            AppError::Unauthorized { message, message_es } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone(), message_es.clone()),
            ),
            AppError::Forbidden { message, message_es } => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new("FORBIDDEN", message.clone(), message_es.clone()),
            ),
            AppError::Validation {
                field,
                message,
                message_es,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_es.clone())
                    .with_field(field.clone()),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail::new(
                    "VALIDATION_ERROR",
                    msg.clone(),
                    format!("Datos inválidos: {}", msg),
                ),
            ),
            AppError::DuplicateEntry(field) => (
                StatusCode::CONFLICT,
                ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                    format!("Ya existe un registro con este {}", field),
                )
                .with_field(field.clone()),
            ),
            AppError::Conflict {
                resource,
                message,
                message_es,
            } => (
                StatusCode::CONFLICT,
                ErrorDetail::new("CONFLICT", message.clone(), message_es.clone())
                    .with_field(resource.clone()),
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("No se encontró {}", resource),
                ),
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INVALID_STATE_TRANSITION",
                    msg.clone(),
                    format!("No se puede cambiar de estado: {}", msg),
                ),
            ),
            AppError::ListingUnavailable => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "LISTING_UNAVAILABLE",
                    "This listing is no longer available",
                    "Este residuo ya no está disponible",
                ),
            ),
            AppError::InsufficientStock(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INSUFFICIENT_STOCK",
                    msg.clone(),
                    format!("Stock insuficiente: {}", msg),
                ),
            ),
            AppError::StorageError(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorDetail::new(
                    "STORAGE_ERROR",
                    format!("Storage error: {}", msg),
                    format!("Error al guardar el archivo: {}", msg),
                ),
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred",
                    "Ocurrió un error en la base de datos",
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new("INTERNAL_ERROR", msg.clone(), "Error interno del servidor"),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::InvalidTransition { .. } => AppError::InvalidStateTransition(err.to_string()),
            AccessError::PurchaseNotPermitted { state } if state.is_buyer() => AppError::Forbidden {
                message: "Your account must be approved before you can buy".to_string(),
                message_es: "Necesitas aprobación para comprar residuos".to_string(),
            },
            AccessError::PurchaseNotPermitted { .. } => AppError::Forbidden {
                message: "Complete onboarding before buying".to_string(),
                message_es: "Completa tu registro antes de comprar".to_string(),
            },
            AccessError::PublishNotPermitted { .. } => AppError::Forbidden {
                message: "Only sellers can publish listings".to_string(),
                message_es: "Solo los vendedores pueden publicar residuos".to_string(),
            },
        }
    }
}

impl From<OnboardingError> for AppError {
    fn from(err: OnboardingError) -> Self {
        let message_es = match &err {
            OnboardingError::RoleRequired => "Selecciona un tipo de cuenta".to_string(),
            OnboardingError::MissingField { field } => format!("El campo {} es obligatorio", field),
            OnboardingError::IndustryNotOffered { .. } => {
                "La industria no corresponde al tipo de cuenta".to_string()
            }
            OnboardingError::InvalidField { field, .. } => format!("El campo {} no es válido", field),
            OnboardingError::WasteTypesRequired => {
                "Selecciona al menos un tipo de residuo".to_string()
            }
            OnboardingError::PermitRequired => {
                "Los compradores deben adjuntar su permiso de operación".to_string()
            }
            OnboardingError::NoSuchStep(step) => format!("El paso {} no existe", step),
        };

        AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
            message_es,
        }
    }
}

impl From<ListingError> for AppError {
    fn from(err: ListingError) -> Self {
        let message_es = match &err {
            ListingError::WasteTypeRequired => "Selecciona el tipo de residuo".to_string(),
            ListingError::InvalidField { field, .. } => format!("El campo {} no es válido", field),
        };

        AppError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
            message_es,
        }
    }
}

impl From<PurchaseError> for AppError {
    fn from(err: PurchaseError) -> Self {
        match err {
            PurchaseError::ListingUnavailable => AppError::ListingUnavailable,
            PurchaseError::InsufficientStock { .. } => AppError::InsufficientStock(err.to_string()),
            PurchaseError::QuantityTooSmall => AppError::Validation {
                field: "quantity_kg".to_string(),
                message: err.to_string(),
                message_es: "La cantidad mínima es 1 kg".to_string(),
            },
            PurchaseError::FractionalQuantity(_) => AppError::Validation {
                field: "quantity_kg".to_string(),
                message: err.to_string(),
                message_es: "La cantidad debe ser un número entero de kilogramos".to_string(),
            },
            PurchaseError::InvalidPrice => AppError::Validation {
                field: "price_per_kg".to_string(),
                message: err.to_string(),
                message_es: "El precio por kg debe ser positivo".to_string(),
            },
        }
    }
}

/// Stored records carry enum spellings the domain no longer knows
impl From<UnknownVariant> for AppError {
    fn from(err: UnknownVariant) -> Self {
        AppError::Internal(format!("Corrupt record: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::AccessState;

    #[test]
    fn test_pending_buyer_purchase_is_forbidden() {
        let err: AppError = AccessState::BuyerPending.ensure_can_buy().unwrap_err().into();
        let (status, detail) = err.detail();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(detail.code, "FORBIDDEN");
    }

    #[test]
    fn test_onboarding_error_keeps_field() {
        let err: AppError = OnboardingError::PermitRequired.into();
        let (status, detail) = err.detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("permit_document_url"));
    }

    #[test]
    fn test_fractional_quantity_is_a_validation_error() {
        let err: AppError = PurchaseError::FractionalQuantity(Decimal::new(10555, 3)).into();
        let (status, detail) = err.detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.field.as_deref(), Some("quantity_kg"));
    }

    #[test]
    fn test_sold_out_listing_is_unprocessable() {
        let err: AppError = PurchaseError::ListingUnavailable.into();
        assert_eq!(err.detail().0, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
