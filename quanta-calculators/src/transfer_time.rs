//! File transfer time over a link, with protocol overhead

use std::sync::LazyLock;
use quanta_plugin::prelude::*;

use crate::helpers::{base_of, ratio, round_to, row};

/// Reference links for the comparison table
const COMMON_RATES: [(f64, &str); 6] = [
    (10.0, "Mbps"),
    (50.0, "Mbps"),
    (100.0, "Mbps"),
    (500.0, "Mbps"),
    (1.0, "Gbps"),
    (10.0, "Gbps"),
];

static RELATED: [&str; 0] = [];

static CONFIG: LazyLock<CalculatorConfig> = LazyLock::new(config);

fn config() -> CalculatorConfig {
    CalculatorConfig::new("transfer_time")
        .with_field(FieldDescriptor::number("size").with_unit("data_volume", "GB").with_min(0.0))
        .with_field(FieldDescriptor::number("rate").with_unit("data_rate", "Mbps").with_min(0.001))
        .with_field(FieldDescriptor::slider("overhead", 0.0, 50.0, 1.0).with_default(10.0))
        .with_result(ResultDescriptor::duration("time"))
        .with_result(ResultDescriptor::quantity("effectiveRate", "data_rate", UnitSource::mirror("rate")))
        .with_result(ResultDescriptor::number("seconds").digits(0))
        .with_chart(ChartDescriptor::new("comparison", ChartKind::Bar, "comparison").with_title("chart.comparison"))
        .with_preset(
            Preset::new("dvd")
                .with_label("preset.dvd")
                .with_quantity("size", 4.7, "GB")
                .with_quantity("rate", 100.0, "Mbps"),
        )
        .with_preset(
            Preset::new("game")
                .with_label("preset.game")
                .with_quantity("size", 80.0, "GiB")
                .with_quantity("rate", 500.0, "Mbps"),
        )
        .with_summary("summary")
        .with_templates(
            "en",
            &[
                ("summary", "{size} at {rate} takes about {time}"),
                ("chart.comparison", "Time on common connections"),
                ("preset.dvd", "DVD image"),
                ("preset.game", "Game download"),
            ],
        )
        .with_templates(
            "es",
            &[
                ("summary", "{size} a {rate} tarda unos {time}"),
                ("chart.comparison", "Tiempo en conexiones habituales"),
                ("preset.dvd", "Imagen de DVD"),
                ("preset.game", "Descarga de un juego"),
            ],
        )
        .with_templates(
            "de",
            &[
                ("summary", "{size} bei {rate} dauert etwa {time}"),
                ("chart.comparison", "Dauer bei üblichen Anschlüssen"),
                ("preset.dvd", "DVD-Abbild"),
                ("preset.game", "Spiel-Download"),
            ],
        )
}

pub struct TransferTime;

impl Calculator for TransferTime {
    fn meta(&self) -> CalculatorMeta {
        CalculatorMeta {
            id: "transfer_time",
            name: "Transfer time",
            description: "How long a download or upload takes at a given link speed",
            category: "computing",
            related: &RELATED,
        }
    }

    fn config(&self) -> &CalculatorConfig {
        &CONFIG
    }

    fn calculate(&self, inputs: &CalcInputs) -> CalcOutput {
        // size in bits, rate in bps (base units)
        let (Some(bits), Some(bps)) = (inputs.number("size"), inputs.number("rate")) else {
            return CalcOutput::new();
        };
        let overhead = inputs.number("overhead").unwrap_or(0.0);
        let effective = effective_rate(bps, overhead);
        let seconds = ratio(bits, effective);

        let comparison: Vec<Value> = COMMON_RATES
            .iter()
            .map(|&(value, unit)| {
                let rate = effective_rate(base_of(inputs, value, unit, "data_rate"), overhead);
                row(&[
                    ("label", Value::Text(format!("{} {}", value, unit))),
                    ("bps", Value::Number(rate)),
                    ("seconds", Value::Number(round_to(ratio(bits, rate), 1))),
                ])
            })
            .collect();

        CalcOutput::new()
            .with("time", seconds)
            .with("seconds", seconds)
            .with("effectiveRate", effective)
            .with_metadata("comparison", Value::List(comparison))
    }
}

/// Payload throughput once `overhead_percent` of the link goes to framing
pub fn effective_rate(bps: f64, overhead_percent: f64) -> f64 {
    bps * (1.0 - overhead_percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quanta_units::{to_base, UNITS};

    fn inputs(size: f64, size_unit: &str, rate: f64, rate_unit: &str, overhead: f64) -> CalcInputs<'static> {
        CalcInputs::new()
            .with_quantity("size", to_base(size, size_unit, "data_volume").unwrap(), size_unit)
            .with_quantity("rate", to_base(rate, rate_unit, "data_rate").unwrap(), rate_unit)
            .with_value("overhead", overhead)
    }

    #[test]
    fn test_config_is_valid() {
        assert!(TransferTime.config().validate(&UNITS).is_ok());
    }

    #[test]
    fn test_without_overhead() {
        // 1 GB = 8e9 bits at 100 Mbps = 80 s
        let out = TransferTime.calculate(&inputs(1.0, "GB", 100.0, "Mbps", 0.0));
        assert!((out.number("seconds").unwrap() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_overhead_slows_down() {
        let out = TransferTime.calculate(&inputs(1.0, "GB", 100.0, "Mbps", 20.0));
        assert!((out.number("seconds").unwrap() - 100.0).abs() < 1e-9);
        assert!((out.number("effectiveRate").unwrap() - 8e7).abs() < 1e-6);
    }

    #[test]
    fn test_gb_and_gib_same_order() {
        let gb = TransferTime.calculate(&inputs(15.0, "GB", 100.0, "Mbps", 10.0));
        let gib = TransferTime.calculate(&inputs(15.0, "GiB", 100.0, "Mbps", 10.0));
        let (a, b) = (gb.number("seconds").unwrap(), gib.number("seconds").unwrap());
        assert!(b > a);
        assert_eq!(a.log10().floor(), b.log10().floor());
    }

    #[test]
    fn test_comparison_table() {
        let out = TransferTime.calculate(&inputs(1.0, "GB", 100.0, "Mbps", 0.0));
        let rows = out.metadata["comparison"].as_list().unwrap();
        assert_eq!(rows.len(), COMMON_RATES.len());
        let hundred = rows[2].as_object().unwrap();
        assert_eq!(hundred["label"], Value::from("100 Mbps"));
        assert_eq!(hundred["seconds"], Value::Number(80.0));
    }

    #[test]
    fn test_full_overhead_is_not_a_number() {
        let out = TransferTime.calculate(&inputs(1.0, "GB", 100.0, "Mbps", 100.0));
        assert!(out.number("seconds").unwrap().is_nan());
    }
}
