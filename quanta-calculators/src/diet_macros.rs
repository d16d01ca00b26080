//! Daily energy needs and macronutrient split
//!
//! BMR uses Mifflin-St Jeor, or Katch-McArdle when body fat is given.
//! TDEE = BMR x activity multiplier, then the goal deficit or surplus is
//! applied and the target split into protein, fat and carbohydrates.

use std::sync::LazyLock;
use quanta_plugin::prelude::*;

use crate::helpers::{ratio, round_to, row};

/// kcal per gram
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

const ACTIVITY: [(&str, f64); 5] = [
    ("sedentary", 1.2),
    ("light", 1.375),
    ("moderate", 1.55),
    ("active", 1.725),
    ("very_active", 1.9),
];

static RELATED: [&str; 1] = ["weight_loss"];

static CONFIG: LazyLock<CalculatorConfig> = LazyLock::new(config);

fn config() -> CalculatorConfig {
    CalculatorConfig::new("diet_macros")
        .with_field(FieldDescriptor::radio("sex", &["male", "female"]).labelled("sex").with_default("male"))
        .with_field(FieldDescriptor::number("age").bounds(15.0, 100.0).with_step(1.0).with_default(30.0))
        .with_field(
            FieldDescriptor::number("weight")
                .with_unit("weight", "kg")
                .allow_units(&["kg", "lbs", "st"])
                .bounds(30.0, 300.0),
        )
        .with_field(
            FieldDescriptor::number("height")
                .with_unit("length", "cm")
                .allow_units(&["cm", "m", "in", "ft_in"])
                .bounds(120.0, 230.0),
        )
        .with_field(FieldDescriptor::number("bodyFat").bounds(3.0, 60.0).optional())
        .with_field(
            FieldDescriptor::select("activity", &["sedentary", "light", "moderate", "active", "very_active"])
                .labelled("activity")
                .with_default("moderate"),
        )
        .with_field(
            FieldDescriptor::radio("goal", &["lose", "maintain", "gain"])
                .labelled("goal")
                .with_default("maintain"),
        )
        .with_field(
            FieldDescriptor::slider("deficitPercent", 5.0, 30.0, 1.0)
                .with_default(20.0)
                .show_when("goal", "lose"),
        )
        .with_field(
            FieldDescriptor::slider("surplusPercent", 5.0, 20.0, 1.0)
                .with_default(10.0)
                .show_when("goal", "gain"),
        )
        .with_field(FieldDescriptor::slider("proteinPerKg", 1.0, 3.0, 0.1).with_default(1.8))
        .with_field(FieldDescriptor::slider("fatPercent", 15.0, 40.0, 1.0).with_default(25.0))
        .with_result(ResultDescriptor::quantity("bmr", "energy", UnitSource::fixed("kcal")).digits(0))
        .with_result(ResultDescriptor::quantity("tdee", "energy", UnitSource::fixed("kcal")).digits(0))
        .with_result(ResultDescriptor::quantity("target", "energy", UnitSource::fixed("kcal")).digits(0))
        .with_result(
            ResultDescriptor::quantity("deficit", "energy", UnitSource::fixed("kcal"))
                .digits(0)
                .show_when("goal", "lose"),
        )
        .with_result(
            ResultDescriptor::quantity("surplus", "energy", UnitSource::fixed("kcal"))
                .digits(0)
                .show_when("goal", "gain"),
        )
        .with_result(ResultDescriptor::quantity("protein", "weight", UnitSource::fixed("g")).digits(0))
        .with_result(ResultDescriptor::quantity("fat", "weight", UnitSource::fixed("g")).digits(0))
        .with_result(ResultDescriptor::quantity("carbs", "weight", UnitSource::fixed("g")).digits(0))
        .with_result(ResultDescriptor::percent("proteinShare").digits(0))
        .with_chart(ChartDescriptor::new("macros", ChartKind::Pie, "macros").with_title("chart.macros"))
        .with_preset(
            Preset::new("cut")
                .with_label("preset.cut")
                .with_quantity("weight", 85.0, "kg")
                .with_quantity("height", 180.0, "cm")
                .with_value("goal", "lose")
                .with_value("deficitPercent", 20.0)
                .with_value("proteinPerKg", 2.2),
        )
        .with_preset(
            Preset::new("bulk")
                .with_label("preset.bulk")
                .with_quantity("weight", 70.0, "kg")
                .with_quantity("height", 175.0, "cm")
                .with_value("goal", "gain")
                .with_value("surplusPercent", 10.0)
                .with_value("proteinPerKg", 1.8),
        )
        .with_summary("summary")
        .with_templates(
            "en",
            &[
                ("summary", "{target} per day: {protein} protein, {fat} fat, {carbs} carbs"),
                ("sex.male", "Male"),
                ("sex.female", "Female"),
                ("activity.sedentary", "Sedentary"),
                ("activity.light", "Lightly active"),
                ("activity.moderate", "Moderately active"),
                ("activity.active", "Active"),
                ("activity.very_active", "Very active"),
                ("goal.lose", "Lose weight"),
                ("goal.maintain", "Maintain weight"),
                ("goal.gain", "Gain weight"),
                ("preset.cut", "Cut"),
                ("preset.bulk", "Lean bulk"),
                ("chart.macros", "Macronutrient split"),
            ],
        )
        .with_templates(
            "es",
            &[
                ("summary", "{target} al día: {protein} de proteína, {fat} de grasa, {carbs} de carbohidratos"),
                ("sex.male", "Hombre"),
                ("sex.female", "Mujer"),
                ("activity.sedentary", "Sedentario"),
                ("activity.light", "Poco activo"),
                ("activity.moderate", "Moderadamente activo"),
                ("activity.active", "Activo"),
                ("activity.very_active", "Muy activo"),
                ("goal.lose", "Perder peso"),
                ("goal.maintain", "Mantener el peso"),
                ("goal.gain", "Ganar peso"),
                ("preset.cut", "Definición"),
                ("preset.bulk", "Volumen limpio"),
                ("chart.macros", "Reparto de macronutrientes"),
            ],
        )
        .with_templates(
            "de",
            &[
                ("summary", "{target} pro Tag: {protein} Eiweiß, {fat} Fett, {carbs} Kohlenhydrate"),
                ("sex.male", "Männlich"),
                ("sex.female", "Weiblich"),
                ("activity.sedentary", "Sitzend"),
                ("activity.light", "Leicht aktiv"),
                ("activity.moderate", "Mäßig aktiv"),
                ("activity.active", "Aktiv"),
                ("activity.very_active", "Sehr aktiv"),
                ("goal.lose", "Abnehmen"),
                ("goal.maintain", "Gewicht halten"),
                ("goal.gain", "Zunehmen"),
                ("preset.cut", "Diät"),
                ("preset.bulk", "Aufbau"),
                ("chart.macros", "Makronährstoffe"),
            ],
        )
}

pub struct DietMacros;

impl Calculator for DietMacros {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            id: "diet_macros",
            name: "Diet macros",
            description: "Daily calorie target and protein, fat and carbohydrate split",
            category: "nutrition",
            related: &RELATED,
        }
    }

    fn config(&self) -> &CalculatorConfig {
        &CONFIG
    }

    fn calculate(&self, inputs: &CalcInputs) -> CalcOutput {
        // weight in kg, height in cm (base units)
        let (Some(kg), Some(cm)) = (inputs.number("weight"), inputs.number("height")) else {
            return CalcOutput::new();
        };
        let age = inputs.number("age").unwrap_or(30.0);
        let male = inputs.text("sex") != Some("female");

        let (bmr, formula) = match inputs.number("bodyFat") {
            Some(body_fat) => (katch_mcardle(kg, body_fat), "katch_mcardle"),
            None => (mifflin_st_jeor(kg, cm, age, male), "mifflin_st_jeor"),
        };

        let multiplier = inputs
            .text("activity")
            .and_then(|level| ACTIVITY.iter().find(|(name, _)| *name == level))
            .map(|(_, m)| *m)
            .unwrap_or(1.55);
        let tdee = bmr * multiplier;

        let mut output = CalcOutput::new();
        let target = match inputs.text("goal") {
            Some("lose") => {
                let deficit = tdee * inputs.number("deficitPercent").unwrap_or(20.0) / 100.0;
                output.set("deficit", deficit);
                tdee - deficit
            }
            Some("gain") => {
                let surplus = tdee * inputs.number("surplusPercent").unwrap_or(10.0) / 100.0;
                output.set("surplus", surplus);
                tdee + surplus
            }
            _ => tdee,
        };

        let split = MacroSplit::new(
            target,
            kg,
            inputs.number("proteinPerKg").unwrap_or(1.8),
            inputs.number("fatPercent").unwrap_or(25.0),
        );

        output
            .with("bmr", bmr)
            .with("tdee", tdee)
            .with("target", target)
            // grams to kg, the weight base unit
            .with("protein", split.protein_g / 1000.0)
            .with("fat", split.fat_g / 1000.0)
            .with("carbs", split.carbs_g / 1000.0)
            .with("proteinShare", ratio(split.protein_g * KCAL_PER_G_PROTEIN, target) * 100.0)
            .with_metadata("macros", split.chart(target))
            .with_metadata("formula", formula)
    }
}

/// Mifflin-St Jeor resting energy, kcal/day
pub fn mifflin_st_jeor(kg: f64, cm: f64, age: f64, male: bool) -> f64 {
    let offset = if male { 5.0 } else { -161.0 };
    10.0 * kg + 6.25 * cm - 5.0 * age + offset
}

/// Katch-McArdle resting energy from lean mass, kcal/day
pub fn katch_mcardle(kg: f64, body_fat_percent: f64) -> f64 {
    let lean_kg = kg * (1.0 - body_fat_percent / 100.0);
    370.0 + 21.6 * lean_kg
}

/// Grams of each macronutrient for a calorie target
#[derive(Debug, Clone, Copy, PartialEq)]
struct MacroSplit {
    protein_g: f64,
    fat_g: f64,
    carbs_g: f64,
}

impl MacroSplit {
    /// Protein by body weight, fat by share of energy, carbs take the rest
    fn new(target_kcal: f64, kg: f64, protein_per_kg: f64, fat_percent: f64) -> Self {
        let protein_g = protein_per_kg * kg;
        let fat_kcal = target_kcal * fat_percent / 100.0;
        let carbs_kcal = (target_kcal - protein_g * KCAL_PER_G_PROTEIN - fat_kcal).max(0.0);
        MacroSplit {
            protein_g,
            fat_g: fat_kcal / KCAL_PER_G_FAT,
            carbs_g: carbs_kcal / KCAL_PER_G_CARBS,
        }
    }

    fn chart(&self, target_kcal: f64) -> Value {
        let slice = |name: &str, grams: f64, per_gram: f64| {
            let kcal = grams * per_gram;
            row(&[
                ("name", Value::from(name)),
                ("grams", Value::Number(round_to(grams, 0))),
                ("kcal", Value::Number(round_to(kcal, 0))),
                ("percent", Value::Number(round_to(ratio(kcal, target_kcal) * 100.0, 1))),
            ])
        };
        Value::List(vec![
            slice("protein", self.protein_g, KCAL_PER_G_PROTEIN),
            slice("fat", self.fat_g, KCAL_PER_G_FAT),
            slice("carbs", self.carbs_g, KCAL_PER_G_CARBS),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_units::UNITS;

    fn base_inputs() -> CalcInputs<'static> {
        CalcInputs::new()
            .with_value("sex", "male")
            .with_value("age", 30.0)
            .with_quantity("weight", 70.0, "kg")
            .with_quantity("height", 175.0, "cm")
            .with_value("bodyFat", Value::Null)
            .with_value("activity", "moderate")
            .with_value("goal", "maintain")
            .with_value("proteinPerKg", 1.8)
            .with_value("fatPercent", 25.0)
    }

    #[test]
    fn test_config_is_valid() {
        assert!(DietMacros.config().validate(&UNITS).is_ok());
    }

    #[test]
    fn test_mifflin_st_jeor() {
        assert_eq!(mifflin_st_jeor(70.0, 175.0, 30.0, true), 1648.75);
        assert_eq!(mifflin_st_jeor(70.0, 175.0, 30.0, false), 1482.75);
    }

    #[test]
    fn test_katch_mcardle() {
        // 70 kg at 20% fat: 56 kg lean
        assert!((katch_mcardle(70.0, 20.0) - 1579.6).abs() < 1e-9);
    }

    #[test]
    fn test_maintain() {
        let out = DietMacros.calculate(&base_inputs());
        let tdee = 1648.75 * 1.55;
        assert!((out.number("target").unwrap() - tdee).abs() < 1e-9);
        assert!(out.get("deficit").is_none());
        // 1.8 g/kg x 70 kg = 126 g, in kg
        assert!((out.number("protein").unwrap() - 0.126).abs() < 1e-12);
        assert_eq!(out.metadata["formula"], Value::from("mifflin_st_jeor"));
    }

    #[test]
    fn test_body_fat_switches_formula() {
        let inputs = base_inputs().with_value("bodyFat", 20.0);
        let out = DietMacros.calculate(&inputs);
        assert!((out.number("bmr").unwrap() - 1579.6).abs() < 1e-9);
        assert_eq!(out.metadata["formula"], Value::from("katch_mcardle"));
    }

    #[test]
    fn test_zero_body_fat_is_not_absent() {
        let out = DietMacros.calculate(&base_inputs().with_value("bodyFat", 0.0));
        assert_eq!(out.number("bmr"), Some(370.0 + 21.6 * 70.0));
    }

    #[test]
    fn test_lose_applies_deficit() {
        let inputs = base_inputs().with_value("goal", "lose").with_value("deficitPercent", 20.0);
        let out = DietMacros.calculate(&inputs);
        let tdee = out.number("tdee").unwrap();
        assert!((out.number("target").unwrap() - tdee * 0.8).abs() < 1e-9);
        assert!((out.number("deficit").unwrap() - tdee * 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_macro_energy_adds_up() {
        let out = DietMacros.calculate(&base_inputs());
        let kcal = out.number("protein").unwrap() * 1000.0 * 4.0
            + out.number("fat").unwrap() * 1000.0 * 9.0
            + out.number("carbs").unwrap() * 1000.0 * 4.0;
        assert!((kcal - out.number("target").unwrap()).abs() < 1e-6);

        let slices = out.metadata["macros"].as_list().unwrap();
        assert_eq!(slices.len(), 3);
    }

    #[test]
    fn test_missing_weight_yields_nothing() {
        let inputs = CalcInputs::new().with_quantity("height", 175.0, "cm");
        assert!(DietMacros.calculate(&inputs).is_empty());
    }
}
