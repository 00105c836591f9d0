use eframe::egui::{Align2, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};

use crate::color::{generate_palette, ColorMap};
use crate::data::aggregate::BarSeries;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Bar chart with value labels
// ---------------------------------------------------------------------------

/// Render one aggregate as a bar chart, one bar per category, with the value
/// printed above each bar. An empty series still draws the frame and axes.
pub fn bar_chart(ui: &mut Ui, id: &str, series: &BarSeries, color_map: Option<&ColorMap>) {
    ui.heading(series.title);

    let palette = generate_palette(series.bars.len());
    let bars: Vec<Bar> = series
        .bars
        .iter()
        .enumerate()
        .map(|(i, datum)| {
            let color = match (&datum.store, color_map) {
                (Some(store), Some(cm)) => cm.color_for(store),
                _ => palette[i],
            };
            Bar::new(i as f64, datum.value)
                .name(&datum.label)
                .fill(color)
                .width(0.7)
        })
        .collect();

    // Category labels under each bar; positions are bar indices.
    let labels: Vec<String> = series.bars.iter().map(|b| b.label.clone()).collect();
    let text_color = ui.visuals().strong_text_color();
    let max = series.bars.iter().map(|b| b.value).fold(0.0, f64::max);

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(series.x_label)
        .y_axis_label(series.y_label)
        .include_x(-0.5)
        .include_x(series.bars.len().max(1) as f64 - 0.5)
        .include_y(0.0)
        .include_y(if max > 0.0 { max * 1.15 } else { 1.0 })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show_grid([false, true])
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(series.title));
            for (i, datum) in series.bars.iter().enumerate() {
                let label = Text::new(
                    PlotPoint::new(i as f64, datum.value),
                    RichText::new(value_label(datum.value)).color(text_color),
                )
                .anchor(Align2::CENTER_BOTTOM);
                plot_ui.text(label);
            }
        });
}

/// Bar annotations show whole numbers.
fn value_label(value: f64) -> String {
    format!("{}", value.trunc() as i64)
}
