//! Domain errors for the order engine.

use rust_decimal::Decimal;
use std::fmt;

/// Domain-level errors that can occur in validation and normalization.
///
/// These errors are independent of transport concerns and never reach
/// the network: an intent that fails here is rejected before any HTTP
/// request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid value for a field.
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Value outside the symbol's allowed range.
    OutOfRange {
        /// Field name.
        field: String,
        /// The rejected value.
        value: Decimal,
        /// Lower bound.
        min: Decimal,
        /// Upper bound; zero means unbounded.
        max: Decimal,
    },

    /// Value not aligned to the symbol's tick/step grid (strict mode).
    OffGrid {
        /// Field name.
        field: String,
        /// The value the caller asked for.
        wanted: Decimal,
        /// Nearest valid grid value at or below the wanted value.
        nearest: Decimal,
        /// The grid quantum (tick or step size).
        quantum: Decimal,
    },
}

impl DomainError {
    /// Rebind the error to a different field name.
    ///
    /// Used when the same grid arithmetic serves multiple legs (the stop
    /// leg shares the price grid) and the message must name the leg the
    /// caller supplied.
    #[must_use]
    pub fn for_field(self, field: impl Into<String>) -> Self {
        match self {
            Self::InvalidValue { message, .. } => Self::InvalidValue {
                field: field.into(),
                message,
            },
            Self::OutOfRange {
                value, min, max, ..
            } => Self::OutOfRange {
                field: field.into(),
                value,
                min,
                max,
            },
            Self::OffGrid {
                wanted,
                nearest,
                quantum,
                ..
            } => Self::OffGrid {
                field: field.into(),
                wanted,
                nearest,
                quantum,
            },
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "Invalid value for '{field}': {message}")
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                if max.is_zero() {
                    write!(f, "{field} {value} below minimum {min}")
                } else {
                    write!(f, "{field} {value} outside allowed range [{min}, {max}]")
                }
            }
            Self::OffGrid {
                field,
                wanted,
                nearest,
                quantum,
            } => {
                write!(
                    f,
                    "{field} {wanted} is not a multiple of {quantum}; nearest valid value is {nearest}"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn invalid_value_display() {
        let err = DomainError::InvalidValue {
            field: "quantity".to_string(),
            message: "must be positive".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("quantity"));
        assert!(msg.contains("positive"));
    }

    #[test]
    fn out_of_range_display_bounded() {
        let err = DomainError::OutOfRange {
            field: "price".to_string(),
            value: dec!(150),
            min: dec!(1),
            max: dec!(100),
        };
        let msg = format!("{err}");
        assert!(msg.contains("price"));
        assert!(msg.contains("150"));
        assert!(msg.contains("[1, 100]"));
    }

    #[test]
    fn out_of_range_display_unbounded() {
        let err = DomainError::OutOfRange {
            field: "price".to_string(),
            value: dec!(0.5),
            min: dec!(1),
            max: dec!(0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("below minimum 1"));
    }

    #[test]
    fn off_grid_display_names_wanted_and_nearest() {
        let err = DomainError::OffGrid {
            field: "price".to_string(),
            wanted: dec!(50000.07),
            nearest: dec!(50000.00),
            quantum: dec!(0.10),
        };
        let msg = format!("{err}");
        assert!(msg.contains("50000.07"));
        assert!(msg.contains("50000.00"));
    }

    #[test]
    fn for_field_rebinds() {
        let err = DomainError::OffGrid {
            field: "price".to_string(),
            wanted: dec!(1.5),
            nearest: dec!(1),
            quantum: dec!(1),
        }
        .for_field("stop_price");
        assert!(format!("{err}").contains("stop_price"));
    }

    #[test]
    fn domain_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(DomainError::InvalidValue {
            field: "test".to_string(),
            message: "test".to_string(),
        });
        assert!(!err.to_string().is_empty());
    }
}
