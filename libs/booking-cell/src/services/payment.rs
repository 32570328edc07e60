use std::time::Duration;

use tracing::debug;

use crate::models::{BookingError, PaymentMethodInfo};

/// Flat hourly base rate. Pricing is a placeholder until a rate card exists.
pub const HOURLY_BASE_RATE: f64 = 75.0;

/// Simulated capture time. There is no gateway behind this; the delay is
/// the placeholder's only observable behavior.
const PROCESSING_DELAY: Duration = Duration::from_secs(2);

pub const PAYMENT_METHODS: [PaymentMethodInfo; 3] = [
    PaymentMethodInfo {
        id: "credit_card",
        name: "Credit/Debit Card",
        description: "Pay securely with your card",
    },
    PaymentMethodInfo {
        id: "digital_wallet",
        name: "Digital Wallet",
        description: "Pay with your digital wallet",
    },
    PaymentMethodInfo {
        id: "bank_transfer",
        name: "Bank Transfer",
        description: "Direct bank transfer",
    },
];

pub fn is_supported_method(method: &str) -> bool {
    PAYMENT_METHODS.iter().any(|m| m.id == method)
}

pub fn method_display_name(method: &str) -> String {
    PAYMENT_METHODS
        .iter()
        .find(|m| m.id == method)
        .map(|m| m.name.to_string())
        .unwrap_or_else(|| method.to_string())
}

pub fn calculate_amount(duration_minutes: i32) -> f64 {
    f64::from(duration_minutes) / 60.0 * HOURLY_BASE_RATE
}

/// Placeholder capture: fixed delay, always succeeds.
pub async fn process_payment(method: &str, amount: f64) -> Result<(), BookingError> {
    if !is_supported_method(method) {
        return Err(BookingError::PaymentFailed(format!(
            "Unsupported payment method: {}",
            method
        )));
    }

    debug!("Processing {} payment of {:.2}", method, amount);
    tokio::time::sleep(PROCESSING_DELAY).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_is_duration_share_of_hourly_rate() {
        assert_eq!(calculate_amount(60), 75.0);
        assert_eq!(calculate_amount(30), 37.5);
        assert_eq!(calculate_amount(90), 112.5);
    }

    #[test]
    fn only_the_three_method_tags_are_supported() {
        assert!(is_supported_method("credit_card"));
        assert!(is_supported_method("digital_wallet"));
        assert!(is_supported_method("bank_transfer"));
        assert!(!is_supported_method("cash"));
    }

    #[test]
    fn display_names_match_the_payment_screen() {
        assert_eq!(method_display_name("credit_card"), "Credit/Debit Card");
        assert_eq!(method_display_name("digital_wallet"), "Digital Wallet");
        assert_eq!(method_display_name("bank_transfer"), "Bank Transfer");
    }

    #[tokio::test]
    async fn capture_rejects_unknown_methods_without_delay() {
        let result = process_payment("cash", 75.0).await;
        assert!(matches!(result, Err(BookingError::PaymentFailed(_))));
    }
}
