//! Chart geometry for the SVG templates
//!
//! Charts are described in data units, laid out here into pixel shapes, and
//! drawn by `chart.svg.tera`. No values are derived beyond pixel positions.

use serde::Serialize;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 500.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 100.0;
const Y_TICKS: usize = 5;

const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
];

/// Color for the n-th series
pub fn series_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// One stacked piece of a bar
#[derive(Debug, Clone)]
pub struct Segment {
    /// Index into [`BarChart::series`]
    pub series: usize,
    pub value: f64,
}

#[derive(Debug, Clone)]
pub struct Bar {
    pub label: String,
    pub segments: Vec<Segment>,
}

/// Bars over categorical labels; multi-segment bars are stacked
#[derive(Debug, Clone)]
pub struct BarChart {
    pub title: String,
    pub y_label: String,
    pub series: Vec<String>,
    /// Fixed series colors; falls back to the palette when shorter than `series`
    pub colors: Vec<String>,
    pub bars: Vec<Bar>,
    /// Decimals on y tick labels
    pub precision: usize,
}

/// Points joined by a line, in data order
#[derive(Debug, Clone)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub precision: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RectShape {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextMark {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegendMark {
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub text: String,
}

/// Everything `chart.svg.tera` needs, in pixels
#[derive(Debug, Clone, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub plot_left: f64,
    pub plot_right: f64,
    pub plot_top: f64,
    pub plot_bottom: f64,
    pub center_x: f64,
    pub plot_mid_x: f64,
    pub plot_mid_y: f64,
    pub x_label_y: f64,
    /// Pixel row of the value 0
    pub zero_y: f64,
    pub rects: Vec<RectShape>,
    pub x_labels: Vec<TextMark>,
    pub y_ticks: Vec<TextMark>,
    pub legend: Vec<LegendMark>,
    /// SVG polyline `points` attribute, empty for bar charts
    pub polyline: String,
    pub markers: Vec<TextMark>,
}

/// Value range always containing zero, padded so bars never touch the frame
fn value_range(lo: f64, hi: f64) -> (f64, f64) {
    let lo = lo.min(0.0);
    let hi = hi.max(0.0);
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { lo }, if hi > 0.0 { hi + pad } else { hi })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

struct Frame {
    lo: f64,
    hi: f64,
}

impl Frame {
    fn plot_height() -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn plot_width() -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn y(&self, v: f64) -> f64 {
        round2(MARGIN_TOP + (self.hi - v) / (self.hi - self.lo) * Self::plot_height())
    }

    fn ticks(&self, precision: usize) -> Vec<TextMark> {
        (0..=Y_TICKS)
            .map(|i| {
                let v = self.lo + (self.hi - self.lo) * i as f64 / Y_TICKS as f64;
                TextMark {
                    x: MARGIN_LEFT - 8.0,
                    y: self.y(v),
                    text: format!("{:.*}", precision, v),
                }
            })
            .collect()
    }

    fn base(&self, title: &str, x_label: &str, y_label: &str, precision: usize) -> ChartLayout {
        ChartLayout {
            width: WIDTH,
            height: HEIGHT,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            plot_left: MARGIN_LEFT,
            plot_right: WIDTH - MARGIN_RIGHT,
            plot_top: MARGIN_TOP,
            plot_bottom: HEIGHT - MARGIN_BOTTOM,
            center_x: WIDTH / 2.0,
            plot_mid_x: MARGIN_LEFT + Self::plot_width() / 2.0,
            plot_mid_y: MARGIN_TOP + Self::plot_height() / 2.0,
            x_label_y: HEIGHT - 10.0,
            zero_y: self.y(0.0),
            rects: Vec::new(),
            x_labels: Vec::new(),
            y_ticks: self.ticks(precision),
            legend: Vec::new(),
            polyline: String::new(),
            markers: Vec::new(),
        }
    }
}

impl BarChart {
    fn color(&self, series: usize) -> String {
        self.colors
            .get(series)
            .cloned()
            .unwrap_or_else(|| series_color(series).to_string())
    }

    pub fn layout(&self) -> ChartLayout {
        // stacked extents per bar: positives grow up, negatives grow down
        let mut lo = 0.0f64;
        let mut hi = 0.0f64;
        for bar in &self.bars {
            let up: f64 = bar.segments.iter().map(|s| s.value.max(0.0)).sum();
            let down: f64 = bar.segments.iter().map(|s| s.value.min(0.0)).sum();
            hi = hi.max(up);
            lo = lo.min(down);
        }
        let (lo, hi) = value_range(lo, hi);
        let frame = Frame { lo, hi };
        let mut layout = frame.base(&self.title, "", &self.y_label, self.precision);

        let slot = if self.bars.is_empty() {
            Frame::plot_width()
        } else {
            Frame::plot_width() / self.bars.len() as f64
        };
        let bar_width = round2(slot * 0.6);

        for (i, bar) in self.bars.iter().enumerate() {
            let x = round2(MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0);
            let mut up = 0.0f64;
            let mut down = 0.0f64;
            for segment in &bar.segments {
                let (from, to) = if segment.value >= 0.0 {
                    let from = up;
                    up += segment.value;
                    (from, up)
                } else {
                    let from = down;
                    down += segment.value;
                    (from, down)
                };
                let (y_top, y_bottom) = (frame.y(from.max(to)), frame.y(from.min(to)));
                let series = self
                    .series
                    .get(segment.series)
                    .map(String::as_str)
                    .unwrap_or("");
                layout.rects.push(RectShape {
                    x,
                    y: y_top,
                    width: bar_width,
                    height: round2(y_bottom - y_top),
                    color: self.color(segment.series),
                    tooltip: format!("{} {}: {:.*}", bar.label, series, self.precision, segment.value),
                });
            }
            layout.x_labels.push(TextMark {
                x: round2(MARGIN_LEFT + slot * (i as f64 + 0.5)),
                y: HEIGHT - MARGIN_BOTTOM + 16.0,
                text: bar.label.clone(),
            });
        }

        layout.legend = self
            .series
            .iter()
            .enumerate()
            .map(|(i, name)| LegendMark {
                x: WIDTH - MARGIN_RIGHT + 16.0,
                y: MARGIN_TOP + 20.0 * i as f64,
                color: self.color(i),
                text: name.clone(),
            })
            .collect();

        layout
    }
}

impl LineChart {
    pub fn layout(&self) -> ChartLayout {
        let (lo, hi) = self
            .points
            .iter()
            .fold((0.0f64, 0.0f64), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
        let (lo, hi) = value_range(lo, hi);
        let frame = Frame { lo, hi };
        let mut layout = frame.base(&self.title, &self.x_label, &self.y_label, self.precision);

        let (x_min, x_max) = self
            .points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &(x, _)| (a.min(x), b.max(x)));
        let x_span = if x_max > x_min { x_max - x_min } else { 1.0 };
        let px = |x: f64| {
            if self.points.len() < 2 {
                round2(MARGIN_LEFT + Frame::plot_width() / 2.0)
            } else {
                round2(MARGIN_LEFT + (x - x_min) / x_span * Frame::plot_width())
            }
        };

        let coords: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|&(x, y)| (px(x), frame.y(y)))
            .collect();
        layout.polyline = coords
            .iter()
            .map(|(x, y)| format!("{},{}", x, y))
            .collect::<Vec<_>>()
            .join(" ");
        layout.markers = coords
            .iter()
            .zip(&self.points)
            .map(|(&(x, y), &(dx, dy))| TextMark {
                x,
                y,
                text: format!("{}: {:.*}", dx, self.precision, dy),
            })
            .collect();
        layout.x_labels = coords
            .iter()
            .zip(&self.points)
            .map(|(&(x, _), &(dx, _))| TextMark {
                x,
                y: HEIGHT - MARGIN_BOTTOM + 16.0,
                text: format!("{}", dx),
            })
            .collect();

        layout
    }
}
