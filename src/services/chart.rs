// src/services/chart.rs
use crate::models::{CurvePoint, HistogramBin, ReturnsPanel};

const WIDTH: i32 = 480;
const HEIGHT: i32 = 300;
const PADDING: f64 = 44.0;
const TICKS: usize = 5;
const GRID_COLOR: &str = "#b0b0b0";
const AXIS_COLOR: &str = "#000";

/// Linear mapping from data space to the plotting area.
struct Frame {
    x_min: f64,
    x_max: f64,
    y_max: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn x(&self, value: f64) -> f64 {
        let inner = self.width - 2.0 * PADDING;
        if (self.x_max - self.x_min).abs() < f64::EPSILON {
            return PADDING + inner / 2.0;
        }
        PADDING + (value - self.x_min) / (self.x_max - self.x_min) * inner
    }

    fn y(&self, density: f64) -> f64 {
        let inner = self.height - 2.0 * PADDING;
        if self.y_max <= 0.0 {
            return self.height - PADDING;
        }
        self.height - PADDING - (density / self.y_max) * inner
    }
}

/// Histogram of one return series with the smoothed density and the fitted
/// normal curve drawn on top. Degenerate panels get a placeholder instead.
pub fn distribution_chart(panel: &ReturnsPanel) -> String {
    let title = format!("{} Returns Distribution", panel.granularity.label());
    let curve = &panel.normal_curve;

    let frame = match frame_for(&panel.histogram, &curve.points, &panel.density_estimate) {
        Some(frame) => frame,
        None => return placeholder(&title, panel.returns.len()),
    };

    let mut svg = String::new();
    svg.push_str(&svg_header(WIDTH, HEIGHT));
    draw_grid(&mut svg, &frame);

    for bin in &panel.histogram {
        let x = frame.x(bin.start);
        let y = frame.y(bin.density);
        svg.push_str(&format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" fill-opacity="0.75" stroke="black" stroke-width="0.5" />"#,
            x = x,
            y = y,
            w = (frame.x(bin.end) - x).max(0.0),
            h = (frame.height - PADDING - y).max(0.0),
            fill = panel.granularity.histogram_color()
        ));
    }

    svg.push_str(&polyline(
        &panel.density_estimate,
        &frame,
        panel.granularity.histogram_color(),
        1.5,
    ));
    svg.push_str(&polyline(&curve.points, &frame, panel.granularity.curve_color(), 2.0));

    draw_axes(&mut svg, &frame);

    let mut legend = Vec::new();
    if curve.is_plottable() {
        legend.push((
            panel.granularity.curve_color(),
            "Normal PDF".to_string(),
            Some(format!(
                "μ={:.4}, σ={:.4}",
                curve.mean.unwrap_or(f64::NAN),
                curve.std.unwrap_or(f64::NAN)
            )),
        ));
    }
    if !panel.density_estimate.is_empty() {
        legend.push((panel.granularity.histogram_color(), "Density estimate".to_string(), None));
    }
    draw_legend(&mut svg, &legend, frame.width);

    svg.push_str(svg_footer());
    wrap_plot(&title, svg)
}

fn frame_for(bins: &[HistogramBin], curve: &[CurvePoint], kde: &[CurvePoint]) -> Option<Frame> {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_max: f64 = 0.0;

    for bin in bins {
        x_min = x_min.min(bin.start);
        x_max = x_max.max(bin.end);
        y_max = y_max.max(bin.density);
    }
    for point in curve.iter().chain(kde.iter()) {
        x_min = x_min.min(point.x);
        x_max = x_max.max(point.x);
        y_max = y_max.max(point.density);
    }

    if !x_min.is_finite() || !x_max.is_finite() || !y_max.is_finite() {
        return None;
    }

    Some(Frame {
        x_min,
        x_max,
        y_max: y_max * 1.05,
        width: WIDTH as f64,
        height: HEIGHT as f64,
    })
}

fn svg_header(width: i32, height: i32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#444}}</style>"#,
        w = width,
        h = height
    )
}

fn svg_footer() -> &'static str {
    "</svg>"
}

fn wrap_plot(title: &str, svg_body: String) -> String {
    format!(
        r#"<div class="nra-plot"><div class="nra-plot-title">{title}</div>{svg}</div>"#,
        title = title,
        svg = svg_body
    )
}

fn placeholder(title: &str, samples: usize) -> String {
    format!(
        r#"<div class="nra-plot"><div class="nra-plot-title">{title}</div><div class="nra-plot-empty">no data ({samples} returns, need at least 2 distinct values)</div></div>"#,
        title = title,
        samples = samples
    )
}

/// Light dashed grid at evenly spaced ticks on both axes.
fn draw_grid(svg: &mut String, frame: &Frame) {
    for i in 0..=TICKS {
        let t = i as f64 / TICKS as f64;
        let x = frame.x(frame.x_min + (frame.x_max - frame.x_min) * t);
        let y = frame.y(frame.y_max * t);

        svg.push_str(&format!(
            r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{c}" stroke-width="0.5" stroke-dasharray="4 3" stroke-opacity="0.6" />"#,
            x = x,
            y1 = PADDING,
            y2 = frame.height - PADDING,
            c = GRID_COLOR
        ));
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{c}" stroke-width="0.5" stroke-dasharray="4 3" stroke-opacity="0.6" />"#,
            x1 = PADDING,
            x2 = frame.width - PADDING,
            y = y,
            c = GRID_COLOR
        ));
    }
}

fn draw_axes(svg: &mut String, frame: &Frame) {
    let bottom = frame.height - PADDING;

    svg.push_str(&format!(
        r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{c}" stroke-width="1" />"#,
        x1 = PADDING,
        x2 = frame.width - PADDING,
        y = bottom,
        c = AXIS_COLOR
    ));
    svg.push_str(&format!(
        r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{c}" stroke-width="1" />"#,
        x = PADDING,
        y1 = PADDING,
        y2 = bottom,
        c = AXIS_COLOR
    ));

    for i in 0..=TICKS {
        let t = i as f64 / TICKS as f64;
        let x_value = frame.x_min + (frame.x_max - frame.x_min) * t;
        let y_value = frame.y_max * t;

        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = frame.x(x_value),
            y = bottom + 14.0,
            label = format_return_tick(x_value)
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label:.1}</text>"#,
            x = PADDING - 4.0,
            y = frame.y(y_value) + 3.0,
            label = y_value
        ));
    }

    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">Returns</text>"#,
        x = frame.width / 2.0,
        y = frame.height - 8.0
    ));
    svg.push_str(&format!(
        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" transform="rotate(-90 {x:.2} {y:.2})">Density</text>"#,
        x = 10.0,
        y = frame.height / 2.0
    ));
}

fn format_return_tick(value: f64) -> String {
    if value.abs() < 0.1 {
        format!("{:.3}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn polyline(points: &[CurvePoint], frame: &Frame, stroke: &str, width: f64) -> String {
    if points.is_empty() {
        return String::new();
    }

    let coords: String = points
        .iter()
        .map(|p| format!("{:.2},{:.2}", frame.x(p.x), frame.y(p.density)))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        r#"<polyline fill="none" stroke="{stroke}" stroke-width="{width}" points="{coords}" />"#,
        stroke = stroke,
        width = width,
        coords = coords
    )
}

/// Entries are (color, label, optional second line).
fn draw_legend(svg: &mut String, entries: &[(&str, String, Option<String>)], width: f64) {
    let x = width - PADDING - 130.0;
    let mut y = PADDING + 10.0;

    for (color, label, detail) in entries {
        svg.push_str(&format!(
            r#"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="{color}" stroke-width="2" />"#,
            x1 = x,
            x2 = x + 18.0,
            y = y,
            color = color
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}">{label}</text>"#,
            x = x + 24.0,
            y = y + 3.0,
            label = label
        ));
        y += 13.0;

        if let Some(detail) = detail {
            svg.push_str(&format!(
                r#"<text x="{x:.2}" y="{y:.2}">{detail}</text>"#,
                x = x + 24.0,
                y = y + 3.0,
                detail = detail
            ));
            y += 13.0;
        }
    }
}
