// Dashboard domain models - history and export tables
use super::telemetry::TimeSeriesPoint;

/// One catalog metric's series for the history view.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct History {
    /// Taken from the first metric that returned data
    pub timestamps_ms: Vec<i64>,
    pub series: Vec<HistorySeries>,
}

impl History {
    pub fn assemble(results: Vec<(String, Vec<TimeSeriesPoint>)>) -> Self {
        let mut timestamps_ms = Vec::new();
        let mut series = Vec::with_capacity(results.len());

        for (name, points) in results {
            if timestamps_ms.is_empty() && !points.is_empty() {
                timestamps_ms = points.iter().map(|p| p.time_ms).collect();
            }
            series.push(HistorySeries {
                name,
                values: points.into_iter().map(|p| p.value).collect(),
            });
        }

        Self {
            timestamps_ms,
            series,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportColumn {
    pub name: String,
    pub header: String,
    pub values: Vec<Option<f64>>,
}

/// Multi-column table of every catalog metric over the export window.
///
/// Columns are aligned by position against the first series that returned
/// data, not by timestamp equality, and every column is cut to the shortest
/// series. Series with gaps at different points will therefore be skewed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    pub timestamps_ms: Vec<i64>,
    pub columns: Vec<ExportColumn>,
}

impl ExportTable {
    /// `results` holds `(name, header, points)` in catalog order; metrics
    /// without data are left out.
    pub fn assemble(results: Vec<(String, String, Vec<TimeSeriesPoint>)>) -> Self {
        let with_data: Vec<_> = results
            .into_iter()
            .filter(|(_, _, points)| !points.is_empty())
            .collect();

        let Some((_, _, reference)) = with_data.first() else {
            return Self::default();
        };

        let rows = with_data
            .iter()
            .map(|(_, _, points)| points.len())
            .min()
            .unwrap_or(0);

        let timestamps_ms = reference.iter().take(rows).map(|p| p.time_ms).collect();
        let columns = with_data
            .into_iter()
            .map(|(name, header, points)| ExportColumn {
                name,
                header,
                values: points.into_iter().take(rows).map(|p| p.value).collect(),
            })
            .collect();

        Self {
            timestamps_ms,
            columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps_ms.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.timestamps_ms.len()
    }
}
