//! Runtime marketplace configuration.
//!
//! Settings are process-wide and mutable at any time (an operator can change
//! the default commission rates while the platform is running). Readers get a
//! consistent snapshot at the instant of the call and must not cache it
//! across creations.

use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;

use vendhub_suppliers::CommissionDefaults;

/// Read side of the marketplace configuration.
///
/// Injected wherever a configuration value is needed, so tests can substitute
/// arbitrary providers per call without mutating shared state.
pub trait SettingsProvider: Send + Sync {
    /// Default commission rates, current at the instant of the call.
    fn commission_defaults(&self) -> CommissionDefaults;

    /// Whether a welcome notification goes out after supplier registration.
    fn send_supplier_email(&self) -> bool;
}

impl<P> SettingsProvider for Arc<P>
where
    P: SettingsProvider + ?Sized,
{
    fn commission_defaults(&self) -> CommissionDefaults {
        (**self).commission_defaults()
    }

    fn send_supplier_email(&self) -> bool {
        (**self).send_supplier_email()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SettingsState {
    default_commission_flat_rate: Decimal,
    default_commission_percentage: Decimal,
    send_supplier_email: bool,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            default_commission_flat_rate: Decimal::ZERO,
            default_commission_percentage: Decimal::ZERO,
            send_supplier_email: true,
        }
    }
}

/// Process-wide, runtime-mutable marketplace settings.
///
/// Unconfigured commission defaults are `0`; the welcome notification is on
/// by default.
#[derive(Debug, Default)]
pub struct MarketplaceSettings {
    inner: RwLock<SettingsState>,
}

impl MarketplaceSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_default_commission_flat_rate(&self, value: Decimal) {
        if let Ok(mut state) = self.inner.write() {
            state.default_commission_flat_rate = value;
        }
    }

    pub fn set_default_commission_percentage(&self, value: Decimal) {
        if let Ok(mut state) = self.inner.write() {
            state.default_commission_percentage = value;
        }
    }

    pub fn set_send_supplier_email(&self, value: bool) {
        if let Ok(mut state) = self.inner.write() {
            state.send_supplier_email = value;
        }
    }
}

impl SettingsProvider for MarketplaceSettings {
    fn commission_defaults(&self) -> CommissionDefaults {
        let state = match self.inner.read() {
            Ok(state) => state.clone(),
            Err(_) => SettingsState::default(),
        };

        CommissionDefaults {
            flat_rate: state.default_commission_flat_rate,
            percentage: state.default_commission_percentage,
        }
    }

    fn send_supplier_email(&self) -> bool {
        self.inner
            .read()
            .map(|state| state.send_supplier_email)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn unconfigured_settings_yield_zero_defaults_and_email_on() {
        let settings = MarketplaceSettings::new();

        let defaults = settings.commission_defaults();
        assert_eq!(defaults.flat_rate, Decimal::ZERO);
        assert_eq!(defaults.percentage, Decimal::ZERO);
        assert!(settings.send_supplier_email());
    }

    #[test]
    fn runtime_mutation_is_visible_to_the_next_read() {
        let settings = MarketplaceSettings::new();

        settings.set_default_commission_flat_rate(dec!(1));
        settings.set_default_commission_percentage(dec!(2.5));
        settings.set_send_supplier_email(false);

        let defaults = settings.commission_defaults();
        assert_eq!(defaults.flat_rate, dec!(1));
        assert_eq!(defaults.percentage, dec!(2.5));
        assert!(!settings.send_supplier_email());

        settings.set_send_supplier_email(true);
        assert!(settings.send_supplier_email());
    }
}
