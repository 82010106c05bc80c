// Prometheus exposition encoding for pushes to the time-series store
use crate::domain::metric::ScaledReading;

/// One line per value: `metric{sensor="<class>"} <value> <timestamp_ms>`.
/// An empty reading encodes to no lines.
pub fn encode_exposition(reading: &ScaledReading, sensor_class: &str, timestamp_ms: i64) -> Vec<String> {
    reading
        .values
        .iter()
        .map(|v| {
            format!(
                "{}{{sensor=\"{}\"}} {} {}",
                v.metric,
                escape_label_value(sensor_class),
                v.value,
                timestamp_ms
            )
        })
        .collect()
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::ScaledValue;

    fn reading(values: &[(&str, &str, f64)]) -> ScaledReading {
        ScaledReading {
            values: values
                .iter()
                .map(|(name, metric, value)| ScaledValue {
                    name: name.to_string(),
                    metric: metric.to_string(),
                    value: *value,
                })
                .collect(),
        }
    }

    #[test]
    fn test_encode_single_ph_line() {
        let lines = encode_exposition(
            &reading(&[("ph", "aquarium_ph", 7.23)]),
            "seafront_8in1",
            1_700_000_000_000,
        );
        assert_eq!(
            lines,
            vec!["aquarium_ph{sensor=\"seafront_8in1\"} 7.23 1700000000000".to_string()]
        );
    }

    #[test]
    fn test_encode_whole_values_without_fraction() {
        let lines = encode_exposition(
            &reading(&[
                ("tds", "aquarium_tds_ppm", 182.0),
                ("orp", "aquarium_orp_mv", 305.0),
            ]),
            "seafront_8in1",
            42,
        );
        assert_eq!(lines[0], "aquarium_tds_ppm{sensor=\"seafront_8in1\"} 182 42");
        assert_eq!(lines[1], "aquarium_orp_mv{sensor=\"seafront_8in1\"} 305 42");
    }

    #[test]
    fn test_encode_empty_reading() {
        assert!(encode_exposition(&ScaledReading::default(), "seafront_8in1", 42).is_empty());
    }

    #[test]
    fn test_label_value_is_escaped() {
        let lines = encode_exposition(&reading(&[("ph", "aquarium_ph", 7.0)]), "tank \"a\"", 1);
        assert_eq!(lines[0], "aquarium_ph{sensor=\"tank \\\"a\\\"\"} 7 1");
    }
}
