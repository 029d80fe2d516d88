//! Utilidades de validación
//!
//! Reglas de dominio que no cubre el derive de `validator`:
//! placas, horarios, porcentajes y montos.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use super::errors::{validation_error, AppError};

lazy_static! {
    // Formato antiguo (ABC1234) y Mercosur (ABC1D23)
    static ref PLATE_REGEX: Regex = Regex::new(r"^[A-Z]{3}[0-9][A-Z0-9][0-9]{2}$").unwrap();
    static ref HOUR_REGEX: Regex = Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap();
}

/// Mayor valor que admite una columna NUMERIC(12, 2)
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Normalizar placa: mayúsculas, sin guiones ni espacios
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Validar placa ya normalizada
pub fn validate_plate(plate: &str) -> Result<(), ValidationError> {
    if !PLATE_REGEX.is_match(plate) {
        let mut error = ValidationError::new("plate");
        error.message = Some("Placa inválida".into());
        error.add_param("value".into(), &plate.to_string());
        return Err(error);
    }
    Ok(())
}

/// Placa normalizada y validada, lista para guardar
pub fn checked_plate(raw: &str) -> Result<String, AppError> {
    let plate = normalize_plate(raw);
    validate_plate(&plate).map_err(|_| validation_error("plate", "Placa inválida"))?;
    Ok(plate)
}

/// Validar horario en formato HH:MM
pub fn validate_hour(value: &str) -> Result<(), ValidationError> {
    if !HOUR_REGEX.is_match(value) {
        let mut error = ValidationError::new("hour");
        error.message = Some("Horario inválido, use HH:MM".into());
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar porcentaje entre 0 y 100
pub fn validate_percentage(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::ONE_HUNDRED {
        let mut error = ValidationError::new("percentage");
        error.message = Some("La comisión debe estar entre 0 y 100".into());
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar monto positivo una vez redondeado a centavos
pub fn validate_positive_amount(value: &Decimal) -> Result<(), ValidationError> {
    let rounded = value.round_dp(2);
    if rounded <= Decimal::ZERO || rounded > MAX_AMOUNT {
        let mut error = ValidationError::new("amount");
        error.message = Some("El valor debe ser mayor que cero y menor que 10.000.000.000".into());
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar precio no negativo y representable
pub fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || value.round_dp(2) > MAX_AMOUNT {
        let mut error = ValidationError::new("price");
        error.message = Some("El precio debe estar entre 0 y 9.999.999.999,99".into());
        return Err(error);
    }
    Ok(())
}

/// Vacíos y espacios se tratan como ausentes
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn plate_is_normalized_before_validation() {
        let plate = normalize_plate("abc-1d23");
        assert_eq!(plate, "ABC1D23");
        assert!(validate_plate(&plate).is_ok());
        assert!(validate_plate("ABC 1234").is_err());
        assert!(validate_plate(&normalize_plate("ab-12")).is_err());
    }

    #[test]
    fn checked_plate_reports_validation_error() {
        assert_eq!(checked_plate(" bra 2e19 ").unwrap(), "BRA2E19");
        assert!(matches!(checked_plate("12-ABC"), Err(AppError::Validation(_))));
    }

    #[test]
    fn hours_must_be_hh_mm() {
        assert!(validate_hour("08:00").is_ok());
        assert!(validate_hour("23:59").is_ok());
        assert!(validate_hour("24:00").is_err());
        assert!(validate_hour("8:00").is_err());
    }

    #[test]
    fn percentage_bounds_are_inclusive() {
        assert!(validate_percentage(&dec("0")).is_ok());
        assert!(validate_percentage(&dec("100")).is_ok());
        assert!(validate_percentage(&dec("100.01")).is_err());
        assert!(validate_percentage(&dec("-1")).is_err());
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(validate_positive_amount(&dec("0.01")).is_ok());
        assert!(validate_positive_amount(&dec("0")).is_err());
        assert!(validate_price(&dec("0")).is_ok());
    }

    #[test]
    fn amounts_are_checked_after_rounding_to_cents() {
        assert_eq!(MAX_AMOUNT, dec("9999999999.99"));
        assert!(validate_positive_amount(&dec("0.001")).is_err());
        assert!(validate_positive_amount(&dec("0.006")).is_ok());
        assert!(validate_positive_amount(&dec("9999999999.99")).is_ok());
        assert!(validate_positive_amount(&dec("10000000000")).is_err());
        assert!(validate_price(&dec("10000000000")).is_err());
    }

    #[test]
    fn blank_optionals_become_none() {
        assert_eq!(clean_optional(Some("  ".into())), None);
        assert_eq!(clean_optional(Some(" x ".into())), Some("x".into()));
    }
}
