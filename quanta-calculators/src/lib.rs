//! Quanta Calculators
//!
//! The domain calculators shipped with Quanta. Each one is a declarative
//! config plus a pure function over base-unit inputs:
//! - `diet_macros`: calorie target and macronutrient split
//! - `running_pace`: pace, speed and split table
//! - `transfer_time`: download time with protocol overhead
//! - `weight_loss`: time to target and weekly projection

mod helpers;
mod diet_macros;
mod running_pace;
mod transfer_time;
mod weight_loss;

pub use diet_macros::{katch_mcardle, mifflin_st_jeor, DietMacros};
pub use running_pace::RunningPace;
pub use transfer_time::{effective_rate, TransferTime};
pub use weight_loss::WeightLoss;

use quanta_plugin::CalculatorRegistry;

/// Load the standard calculators into a registry
pub fn load_calculators(registry: CalculatorRegistry) -> CalculatorRegistry {
    registry
        .with_calculator(DietMacros)
        .with_calculator(RunningPace)
        .with_calculator(TransferTime)
        .with_calculator(WeightLoss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_units::UNITS;

    #[test]
    fn test_load_calculators() {
        let registry = load_calculators(CalculatorRegistry::new());

        assert!(registry.get("diet_macros").is_some());
        assert!(registry.get("running_pace").is_some());
        assert!(registry.get("transfer_time").is_some());
        assert!(registry.get("weight_loss").is_some());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_every_config_validates() {
        let registry = load_calculators(CalculatorRegistry::new());
        assert!(registry.validate(&UNITS).is_ok());
    }

    #[test]
    fn test_categories() {
        let registry = load_calculators(CalculatorRegistry::new());
        assert_eq!(registry.list(Some("nutrition")).as_list().map(|l| l.len()), Some(2));
    }
}
