use std::path::PathBuf;

use console::Style;
use vdiff_core::pipeline::{PipelineState, Visualizations};
use vdiff_core::scale::LegendColor;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }

    fn legend(&self, color: LegendColor) -> Style {
        match color {
            LegendColor::Blue => Style::new().blue().bold(),
            LegendColor::Red => Style::new().red().bold(),
            LegendColor::Gray => self.disabled.clone(),
        }
    }
}

pub fn print_compare_summary(state: &PipelineState, written: &[PathBuf]) {
    let s = Styles::new();
    let config = state.config();
    let resolution = state.resolution();

    println!();
    println!("  {}", s.title.apply_to("vdiff Comparison"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(16)));
    println!();

    // Sizes
    let (w1, h1) = state.first().mapping.natural_size();
    let (w2, h2) = state.second().mapping.natural_size();
    let (ww, wh) = state.first().mapping.working_size();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Image 1"),
        s.value.apply_to(format!("{w1}x{h1}"))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Image 2"),
        s.value.apply_to(format!("{w2}x{h2}"))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Working"),
        s.value.apply_to(format!("{ww}x{wh}"))
    );
    println!();

    // Alignment
    println!("  {}", s.header.apply_to("Alignment"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(resolution.method)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Points"),
        s.value.apply_to(resolution.correspondences.len())
    );
    let roi = &resolution.roi;
    println!(
        "    {:<12}{}",
        s.label.apply_to("ROI"),
        s.value.apply_to(format!(
            "{:.0},{:.0} {:.0}x{:.0}",
            roi.x, roi.y, roi.width, roi.height
        ))
    );
    println!();

    // Visualization
    println!("  {}", s.header.apply_to("Visualization"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Mode"),
        s.method.apply_to(config.mode)
    );
    match &state.outputs().visualizations {
        Visualizations::Global { .. } => {
            println!(
                "    {:<12}{}",
                s.label.apply_to("Opacity"),
                s.value.apply_to(config.opacity)
            );
        }
        Visualizations::Local { highlight, .. } => {
            if config.noise_reduction {
                println!(
                    "    {:<12}{}",
                    s.label.apply_to("Noise red."),
                    s.value.apply_to("on")
                );
            } else {
                println!(
                    "    {:<12}{}",
                    s.label.apply_to("Noise red."),
                    s.disabled.apply_to("off")
                );
            }
            println!(
                "    {:<12}{}",
                s.label.apply_to("Differences"),
                s.value.apply_to(format!("{} px", highlight.difference_pixels))
            );
            let legend = highlight.legend;
            println!(
                "    {:<12}{} {}  {} {}",
                s.label.apply_to("Legend"),
                s.label.apply_to("image 1"),
                s.legend(legend.first).apply_to(legend.first),
                s.label.apply_to("image 2"),
                s.legend(legend.second).apply_to(legend.second)
            );
        }
    }
    println!();

    println!("  {}", s.header.apply_to("Written"));
    for path in written {
        println!("    {}", s.path.apply_to(path.display()));
    }
    println!();
}
