//! Weight-loss projection at a steady weekly rate

use std::sync::LazyLock;
use quanta_plugin::prelude::*;

use crate::helpers::{in_chosen_unit, ratio, round_to, row};

/// Energy stored in one kilogram of body fat
const KCAL_PER_KG: f64 = 7700.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Projection series stop here
const MAX_WEEKS: usize = 260;

static RELATED: [&str; 1] = ["diet_macros"];

static CONFIG: LazyLock<CalculatorConfig> = LazyLock::new(config);

fn config() -> CalculatorConfig {
    let weight = |id: &str| {
        FieldDescriptor::number(id)
            .with_unit("weight", "kg")
            .allow_units(&["kg", "lbs", "st"])
            .bounds(30.0, 400.0)
    };

    CalculatorConfig::new("weight_loss")
        .with_field(weight("current"))
        .with_field(weight("target"))
        .with_field(
            FieldDescriptor::number("rate")
                .with_unit("weight", "kg")
                .allow_units(&["kg", "lbs"])
                .bounds(0.1, 1.5)
                .with_default(0.5),
        )
        .with_result(ResultDescriptor::quantity("amount", "weight", UnitSource::mirror("current")).digits(1))
        .with_result(ResultDescriptor::number("weeks").digits(1))
        .with_result(ResultDescriptor::number("days").digits(0))
        .with_result(ResultDescriptor::duration("duration"))
        .with_result(ResultDescriptor::quantity("dailyDeficit", "energy", UnitSource::fixed("kcal")).digits(0))
        .with_result(ResultDescriptor::new("reached", ResultKind::Bool))
        .with_chart(ChartDescriptor::new("projection", ChartKind::Line, "projection").with_title("chart.projection"))
        .with_preset(
            Preset::new("steady")
                .with_label("preset.steady")
                .with_quantity("current", 90.0, "kg")
                .with_quantity("target", 80.0, "kg")
                .with_quantity("rate", 0.5, "kg"),
        )
        .with_preset(
            Preset::new("gentle")
                .with_label("preset.gentle")
                .with_quantity("current", 80.0, "kg")
                .with_quantity("target", 75.0, "kg")
                .with_quantity("rate", 0.25, "kg"),
        )
        .with_summary("summary")
        .with_templates(
            "en",
            &[
                ("summary", "Losing {amount} at {rate} a week takes about {weeks} weeks"),
                ("chart.projection", "Weekly projection"),
                ("preset.steady", "Steady"),
                ("preset.gentle", "Gentle"),
            ],
        )
        .with_templates(
            "es",
            &[
                ("summary", "Perder {amount} a {rate} por semana lleva unas {weeks} semanas"),
                ("chart.projection", "Proyección semanal"),
                ("preset.steady", "Constante"),
                ("preset.gentle", "Suave"),
            ],
        )
        .with_templates(
            "de",
            &[
                ("summary", "{amount} abnehmen mit {rate} pro Woche dauert etwa {weeks} Wochen"),
                ("chart.projection", "Wöchentliche Prognose"),
                ("preset.steady", "Stetig"),
                ("preset.gentle", "Sanft"),
            ],
        )
}

pub struct WeightLoss;

impl Calculator for WeightLoss {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            id: "weight_loss",
            name: "Weight loss",
            description: "Time to reach a target weight and the weekly projection",
            category: "nutrition",
            related: &RELATED,
        }
    }

    fn config(&self) -> &CalculatorConfig {
        &CONFIG
    }

    fn calculate(&self, inputs: &CalcInputs) -> CalcOutput {
        // all weights in kg (base unit)
        let (Some(current), Some(target), Some(rate)) =
            (inputs.number("current"), inputs.number("target"), inputs.number("rate"))
        else {
            return CalcOutput::new();
        };

        let amount = (current - target).max(0.0);
        let weeks = ratio(amount, rate);
        let days = weeks * 7.0;

        CalcOutput::new()
            .with("amount", amount)
            .with("weeks", weeks)
            .with("days", days)
            .with("duration", days * SECONDS_PER_DAY)
            .with("dailyDeficit", rate * KCAL_PER_KG / 7.0)
            .with("reached", amount == 0.0)
            .with_metadata("projection", projection(inputs, current, target, rate))
    }
}

/// Weight at the start of each week until the target, in the unit the
/// current weight was entered in
fn projection(inputs: &CalcInputs, current: f64, target: f64, rate: f64) -> Value {
    if current <= target || rate <= 0.0 {
        return Value::List(Vec::new());
    }

    let weeks = ((current - target) / rate).ceil() as usize;
    let points = (0..=weeks.min(MAX_WEEKS))
        .map(|week| {
            let kg = (current - rate * week as f64).max(target);
            let (weight, unit) = in_chosen_unit(inputs, "current", "weight", "kg", kg);
            row(&[
                ("week", Value::Number(week as f64)),
                ("weight", Value::Number(round_to(weight, 1))),
                ("unit", Value::Text(unit)),
            ])
        })
        .collect();
    Value::List(points)
}
