//! Forecast pane: predicted line, uncertainty band edges and actual closes.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Chart, Dataset, GraphType};
use ratatui::Frame;

use chrono::NaiveDate;
use stockcast_core::domain::{Forecast, PriceHistory};

use crate::app::{AppState, Panel};
use crate::theme;
use crate::ui::price_chart::padded_bounds;
use crate::ui::{pane_block, render_no_data};

/// Plot series for one forecast, x in days since the first forecast date.
#[derive(Debug, Default)]
pub struct ForecastSeries {
    pub predicted: Vec<(f64, f64)>,
    pub lower: Vec<(f64, f64)>,
    pub upper: Vec<(f64, f64)>,
    pub actual: Vec<(f64, f64)>,
    /// Where the history ends and the projection begins.
    pub split_x: Option<f64>,
}

impl ForecastSeries {
    pub fn build(forecast: &Forecast, history: Option<&PriceHistory>) -> Self {
        let Some(origin) = forecast.points.first().map(|p| p.date) else {
            return Self::default();
        };
        let x = |date: NaiveDate| (date - origin).num_days() as f64;

        let mut series = Self::default();
        for point in &forecast.points {
            series.predicted.push((x(point.date), point.predicted));
            series.lower.push((x(point.date), point.lower));
            series.upper.push((x(point.date), point.upper));
        }
        if let Some(history) = history {
            series.actual = history.bars().iter().map(|b| (x(b.date), b.close)).collect();
        }
        series.split_x = forecast.in_sample().last().map(|p| x(p.date));
        series
    }

    fn x_max(&self) -> f64 {
        self.predicted.last().map_or(1.0, |p| p.0.max(1.0))
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let forecast = app.current_forecast();
    let extra = match forecast.and_then(|fc| fc.last()) {
        Some(last) => format!(
            "{} +{}d · {} {:.2} [{:.2}, {:.2}]",
            app.inputs.symbol,
            app.inputs.horizon_days,
            last.date,
            last.predicted,
            last.lower,
            last.upper
        ),
        None => format!("{} +{}d", app.inputs.symbol, app.inputs.horizon_days),
    };
    let block = pane_block(Panel::Forecast, &extra);
    let inner = block.inner(area);
    f.render_widget(block, area);

    match forecast {
        Some(forecast) if !forecast.is_empty() => {
            let series = ForecastSeries::build(forecast, app.history.as_ref());
            render_chart(f, inner, &series, forecast);
        }
        _ => render_no_data(f, inner, app.forecast_message().as_deref()),
    }
}

fn render_chart(f: &mut Frame, area: Rect, series: &ForecastSeries, forecast: &Forecast) {
    let [y_min, y_max] = padded_bounds(
        series
            .lower
            .iter()
            .chain(&series.upper)
            .chain(&series.actual)
            .map(|p| p.1),
    );
    let x_max = series.x_max();
    let split: Vec<(f64, f64)> = series
        .split_x
        .filter(|_| !forecast.future().is_empty())
        .map(|x| vec![(x, y_min), (x, y_max)])
        .unwrap_or_default();

    let datasets = vec![
        Dataset::default()
            .name("upper")
            .marker(symbols::Marker::Braille)
            .style(theme::warning())
            .graph_type(GraphType::Line)
            .data(&series.upper),
        Dataset::default()
            .name("lower")
            .marker(symbols::Marker::Braille)
            .style(theme::warning())
            .graph_type(GraphType::Line)
            .data(&series.lower),
        Dataset::default()
            .name("actual")
            .marker(symbols::Marker::Dot)
            .style(theme::neutral())
            .graph_type(GraphType::Scatter)
            .data(&series.actual),
        Dataset::default()
            .name("forecast")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::ACCENT))
            .graph_type(GraphType::Line)
            .data(&series.predicted),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .style(theme::muted())
            .graph_type(GraphType::Line)
            .data(&split),
    ];

    let dates: Vec<NaiveDate> = forecast.dates().collect();
    let x_labels: Vec<Span> = match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => {
            let mid = *first + (*last - *first) / 2;
            [*first, mid, *last]
                .into_iter()
                .map(|d| Span::styled(d.format("%Y-%m-%d").to_string(), theme::muted()))
                .collect()
        }
        _ => Vec::new(),
    };

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.2}"), theme::muted()),
                    Span::styled(format!("{y_max:.2}"), theme::muted()),
                ]),
        );
    f.render_widget(chart, area);
}
