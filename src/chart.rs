use plotters::prelude::*;
use std::path::Path;

use crate::presenter::NutrientBalance;

const GREEN_BAR: RGBColor = RGBColor(0, 128, 0);
const ORANGE_BAR: RGBColor = RGBColor(255, 165, 0);

/// Writes the soil nutrient balance bar chart as a PNG.
pub fn render_nutrient_chart(
    nutrients: &NutrientBalance,
    path: impl AsRef<Path>,
) -> anyhow::Result<()> {
    let bars = [
        ("Nitrogen (N)", nutrients.nitrogen, GREEN_BAR),
        ("Phosphorous (P)", nutrients.phosphorous, ORANGE_BAR),
        ("Potassium (K)", nutrients.potassium, BLUE),
    ];

    let root = BitMapBackend::new(path.as_ref(), (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let max_level = bars.iter().map(|b| b.1).fold(0.0f64, f64::max);
    let y_max = if max_level > 0.0 { max_level * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption("Soil Nutrient Balance", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..bars.len()).into_segmented(), 0f64..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Level")
        .x_label_formatter(&|seg: &SegmentValue<usize>| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                bars.get(*i).map(|b| b.0.to_string()).unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .draw()?;

    for (i, (_, level, color)) in bars.iter().enumerate() {
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(color.filled())
                .margin(20)
                .data(std::iter::once((i, *level))),
        )?;
    }

    root.present()?;
    tracing::info!(path = %path.as_ref().display(), "nutrient chart written");
    Ok(())
}
