//! Commission rate resolution.
//!
//! The platform takes a cut of each supplier's sales, expressed as a flat
//! rate plus a percentage. Effective rates are fixed at registration time
//! from per-supplier overrides falling back to a snapshot of the platform
//! defaults.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vendhub_core::ValueObject;

/// Platform-wide default commission rates, captured as a snapshot at the
/// moment a supplier is registered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CommissionDefaults {
    pub flat_rate: Decimal,
    pub percentage: Decimal,
}

/// Optional per-supplier overrides supplied at registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CommissionOverrides {
    pub flat_rate: Option<Decimal>,
    pub percentage: Option<Decimal>,
}

impl CommissionOverrides {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Effective commission rates for a supplier.
///
/// Always concrete after registration; never left unresolved, even when no
/// override was supplied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CommissionTerms {
    pub flat_rate: Decimal,
    pub percentage: Decimal,
}

impl ValueObject for CommissionTerms {}

impl CommissionTerms {
    /// Resolve effective rates from overrides and the defaults snapshot.
    ///
    /// An override value is used verbatim. The percentage *default* is stored
    /// on a 0-10 scale and multiplied by 10 into the effective 0-100 range;
    /// overrides are already effective percentages and bypass the scaling.
    pub fn resolve(overrides: &CommissionOverrides, defaults: &CommissionDefaults) -> Self {
        let flat_rate = overrides.flat_rate.unwrap_or(defaults.flat_rate);
        let percentage = overrides
            .percentage
            .unwrap_or_else(|| defaults.percentage * Decimal::TEN);

        Self {
            flat_rate,
            percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_apply_when_no_override_given() {
        let defaults = CommissionDefaults {
            flat_rate: dec!(1),
            percentage: dec!(1),
        };

        let terms = CommissionTerms::resolve(&CommissionOverrides::none(), &defaults);

        assert_eq!(terms.flat_rate, dec!(1.0));
        assert_eq!(terms.percentage, dec!(10.0));
    }

    #[test]
    fn overrides_are_used_verbatim() {
        let defaults = CommissionDefaults {
            flat_rate: dec!(1),
            percentage: dec!(1),
        };
        let overrides = CommissionOverrides {
            flat_rate: Some(dec!(123)),
            percentage: Some(dec!(25)),
        };

        let terms = CommissionTerms::resolve(&overrides, &defaults);

        assert_eq!(terms.flat_rate, dec!(123.0));
        assert_eq!(terms.percentage, dec!(25.0));
    }

    #[test]
    fn unconfigured_defaults_resolve_to_zero() {
        let terms =
            CommissionTerms::resolve(&CommissionOverrides::none(), &CommissionDefaults::default());

        assert_eq!(terms.flat_rate, Decimal::ZERO);
        assert_eq!(terms.percentage, Decimal::ZERO);
    }

    #[test]
    fn partial_override_falls_back_per_field() {
        let defaults = CommissionDefaults {
            flat_rate: dec!(2),
            percentage: dec!(1.5),
        };
        let overrides = CommissionOverrides {
            flat_rate: Some(dec!(7)),
            percentage: None,
        };

        let terms = CommissionTerms::resolve(&overrides, &defaults);

        assert_eq!(terms.flat_rate, dec!(7));
        assert_eq!(terms.percentage, dec!(15.0));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_decimal() -> impl Strategy<Value = Decimal> {
            // Mantissas small enough that the x10 scaling cannot overflow.
            (-1_000_000i64..1_000_000i64, 0u32..4).prop_map(|(m, s)| Decimal::new(m, s))
        }

        proptest! {
            /// Property: an override always wins over the default, verbatim.
            #[test]
            fn override_always_wins(flat in any_decimal(), pct in any_decimal(),
                                    def_flat in any_decimal(), def_pct in any_decimal()) {
                let overrides = CommissionOverrides {
                    flat_rate: Some(flat),
                    percentage: Some(pct),
                };
                let defaults = CommissionDefaults {
                    flat_rate: def_flat,
                    percentage: def_pct,
                };

                let terms = CommissionTerms::resolve(&overrides, &defaults);
                prop_assert_eq!(terms.flat_rate, flat);
                prop_assert_eq!(terms.percentage, pct);
            }

            /// Property: with no overrides, the flat rate passes through and
            /// the percentage is exactly ten times the stored default.
            #[test]
            fn defaults_scale_percentage_only(def_flat in any_decimal(), def_pct in any_decimal()) {
                let defaults = CommissionDefaults {
                    flat_rate: def_flat,
                    percentage: def_pct,
                };

                let terms = CommissionTerms::resolve(&CommissionOverrides::none(), &defaults);
                prop_assert_eq!(terms.flat_rate, def_flat);
                prop_assert_eq!(terms.percentage, def_pct * Decimal::TEN);
            }
        }
    }
}
