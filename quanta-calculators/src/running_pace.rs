//! Running pace, speed and splits from distance and time

use std::sync::LazyLock;
use quanta_plugin::prelude::*;

use crate::helpers::{base_of, ratio, round_to, row};

/// Split tables stop here even for ultra distances
const MAX_SPLITS: usize = 200;

static RELATED: [&str; 1] = ["diet_macros"];

static CONFIG: LazyLock<CalculatorConfig> = LazyLock::new(config);

fn config() -> CalculatorConfig {
    CalculatorConfig::new("running_pace")
        .with_field(
            FieldDescriptor::number("distance")
                .with_unit("length", "km")
                .allow_units(&["km", "mi", "m"])
                .bounds(0.1, 500.0),
        )
        .with_field(
            FieldDescriptor::number("time")
                .with_unit("duration", "min")
                .allow_units(&["s", "min", "h"])
                .bounds(0.5, 6000.0),
        )
        .with_result(ResultDescriptor::duration("pacePerKm").with_template("pace.perKm"))
        .with_result(ResultDescriptor::duration("pacePerMile").with_template("pace.perMile"))
        .with_result(
            ResultDescriptor::quantity(
                "speed",
                "speed",
                UnitSource::mapped("distance", &[("km", "km/h"), ("m", "km/h"), ("mi", "mph")], "km/h"),
            )
            .digits(1),
        )
        .with_result(ResultDescriptor::duration("time"))
        .with_chart(ChartDescriptor::new("splits", ChartKind::Table, "splits").with_title("chart.splits"))
        .with_preset(
            Preset::new("5k")
                .with_label("preset.5k")
                .with_quantity("distance", 5.0, "km")
                .with_quantity("time", 25.0, "min"),
        )
        .with_preset(
            Preset::new("10k")
                .with_label("preset.10k")
                .with_quantity("distance", 10.0, "km")
                .with_quantity("time", 55.0, "min"),
        )
        .with_preset(
            Preset::new("half")
                .with_label("preset.half")
                .with_quantity("distance", 21.0975, "km")
                .with_quantity("time", 2.0, "h"),
        )
        .with_preset(
            Preset::new("marathon")
                .with_label("preset.marathon")
                .with_quantity("distance", 42.195, "km")
                .with_quantity("time", 4.0, "h"),
        )
        .with_summary("summary")
        .with_templates(
            "en",
            &[
                ("summary", "{distance} in {time}: {pacePerKm}, {speed}"),
                ("pace.perKm", "{value} per km"),
                ("pace.perMile", "{value} per mile"),
                ("chart.splits", "Splits"),
                ("preset.5k", "5K"),
                ("preset.10k", "10K"),
                ("preset.half", "Half marathon"),
                ("preset.marathon", "Marathon"),
            ],
        )
        .with_templates(
            "es",
            &[
                ("summary", "{distance} en {time}: {pacePerKm}, {speed}"),
                ("pace.perKm", "{value} por km"),
                ("pace.perMile", "{value} por milla"),
                ("chart.splits", "Parciales"),
                ("preset.half", "Media maratón"),
                ("preset.marathon", "Maratón"),
            ],
        )
        .with_templates(
            "de",
            &[
                ("summary", "{distance} in {time}: {pacePerKm}, {speed}"),
                ("pace.perKm", "{value} pro km"),
                ("pace.perMile", "{value} pro Meile"),
                ("chart.splits", "Zwischenzeiten"),
                ("preset.half", "Halbmarathon"),
                ("preset.marathon", "Marathon"),
            ],
        )
}

pub struct RunningPace;

impl Calculator for RunningPace {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            id: "running_pace",
            name: "Running pace",
            description: "Pace per kilometre and per mile, speed and split times",
            category: "fitness",
            related: &RELATED,
        }
    }

    fn config(&self) -> &CalculatorConfig {
        &CONFIG
    }

    fn calculate(&self, inputs: &CalcInputs) -> CalcOutput {
        // distance in cm, time in s (base units)
        let (Some(cm), Some(seconds)) = (inputs.number("distance"), inputs.number("time")) else {
            return CalcOutput::new();
        };
        let km = base_of(inputs, 1.0, "km", "length");
        let mile = base_of(inputs, 1.0, "mi", "length");
        let metres = cm / 100.0;

        // Splits follow the unit the runner thinks in
        let split_unit = if inputs.unit("distance") == Some("mi") { "mi" } else { "km" };
        let split_length = if split_unit == "mi" { mile } else { km };

        CalcOutput::new()
            .with("pacePerKm", ratio(seconds, cm / km))
            .with("pacePerMile", ratio(seconds, cm / mile))
            .with("speed", ratio(metres, seconds))
            .with("time", seconds)
            .with_metadata("splitUnit", split_unit)
            .with_metadata("splits", splits(cm, seconds, split_length))
    }
}

/// Elapsed time at each whole split plus a final partial one, at even pace
fn splits(distance: f64, seconds: f64, split_length: f64) -> Value {
    let pace = ratio(seconds, distance);
    if !pace.is_finite() || split_length <= 0.0 {
        return Value::List(Vec::new());
    }

    let whole = (distance / split_length).floor() as usize;
    let mut rows: Vec<Value> = (1..=whole.min(MAX_SPLITS))
        .map(|n| {
            let covered = n as f64 * split_length;
            row(&[
                ("split", Value::Number(n as f64)),
                ("distance", Value::Number(n as f64)),
                ("elapsed", Value::Number(round_to(covered * pace, 1))),
            ])
        })
        .collect();

    let remainder = distance - whole as f64 * split_length;
    if whole < MAX_SPLITS && remainder > split_length * 1e-6 {
        rows.push(row(&[
            ("split", Value::Number((whole + 1) as f64)),
            ("distance", Value::Number(round_to(distance / split_length, 3))),
            ("elapsed", Value::Number(round_to(seconds, 1))),
        ]));
    }
    Value::List(rows)
}
