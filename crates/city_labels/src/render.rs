use crate::{
    boundaries::Boundaries,
    collision::{TextBox, marker_is_behind_text},
    config::{MarkerStyle, RenderConfig},
    constants::{
        ANTI_BOUNCE_DISTANCE, ANTI_BOUNCE_FONT_SIZE, CITY_FONT_SIZE, CITY_TEXT_POS,
        COUNTRY_FONT_SIZE, COUNTRY_TEXT_POS, MARKER_SIZE_PT,
    },
    error::Result,
    frame::Frame,
    types::LabelRecord,
};

use std::fmt::Write;

const FONT_FAMILY: &str = "Arial, sans-serif";

/// Drawing switches for one map
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub marker: MarkerStyle,
    pub marker_image: String,
    pub ink_colour: String,
    pub boundary_width: f64,
    /// Labels are always laid out and measured; this only controls opacity
    pub show_text: bool,
    /// Outline each label box, red if it hides the marker, green otherwise
    pub draw_text_boxes: bool,
}

impl From<&RenderConfig> for RenderOptions {
    fn from(cfg: &RenderConfig) -> Self {
        Self {
            marker: cfg.marker,
            marker_image: cfg.marker_image.clone(),
            ink_colour: cfg.ink_colour.clone(),
            boundary_width: cfg.boundary_width,
            show_text: cfg.add_text,
            draw_text_boxes: cfg.draw_text_boxes,
        }
    }
}

impl RenderOptions {
    /// Variant used to inspect maps that were skipped
    pub fn for_review(&self) -> Self {
        Self {
            show_text: true,
            draw_text_boxes: true,
            ..self.clone()
        }
    }
}

/// A rendered map and the label boxes measured while laying it out
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub svg: String,
    /// Label boxes in data coordinates
    pub city_box: TextBox,
    pub country_box: TextBox,
    pub city_hides_marker: bool,
    pub country_hides_marker: bool,
}

impl RenderedMap {
    pub fn marker_hidden(&self) -> bool {
        self.city_hides_marker || self.country_hides_marker
    }
}

/// The country line is left blank for city-states such as "Singapore, Singapore".
pub fn country_label(record: &LabelRecord) -> &str {
    if record.city == record.country {
        ""
    } else {
        &record.country
    }
}

pub fn render_map(
    record: &LabelRecord,
    frame: &Frame,
    boundaries: &Boundaries,
    opt: &RenderOptions,
) -> Result<RenderedMap> {
    let mut svg = String::new();

    writeln!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w:.3}pt" height="{h:.3}pt" viewBox="0 0 {w:.3} {h:.3}">"##,
        w = frame.width_pt,
        h = frame.height_pt
    )?;

    render_boundaries(&mut svg, frame, boundaries, opt)?;

    let marker_px = frame.data_to_px(record.lon, record.lat);
    render_marker(&mut svg, marker_px, opt)?;
    render_anti_bounce_ticks(&mut svg, frame, &opt.ink_colour)?;

    // Labels
    let alpha = if opt.show_text { 1.0 } else { 0.0 };
    let city_anchor = frame.axes_to_px(CITY_TEXT_POS.0, CITY_TEXT_POS.1);
    let country_anchor = frame.axes_to_px(COUNTRY_TEXT_POS.0, COUNTRY_TEXT_POS.1);
    let country = country_label(record);

    render_text(&mut svg, city_anchor, &record.city, CITY_FONT_SIZE, alpha, opt)?;
    render_text(&mut svg, country_anchor, country, COUNTRY_FONT_SIZE, alpha, opt)?;

    let city_px = frame.text_box_px(city_anchor, &record.city, CITY_FONT_SIZE);
    let country_px = frame.text_box_px(country_anchor, country, COUNTRY_FONT_SIZE);
    let city_box = frame.box_to_data(&city_px);
    let country_box = frame.box_to_data(&country_px);
    let city_hides_marker = marker_is_behind_text(&city_box, record.lon, record.lat);
    let country_hides_marker = marker_is_behind_text(&country_box, record.lon, record.lat);

    if opt.draw_text_boxes {
        render_box(&mut svg, &city_px, city_hides_marker)?;
        render_box(&mut svg, &country_px, country_hides_marker)?;
    }

    writeln!(svg, "</svg>")?;

    Ok(RenderedMap {
        svg,
        city_box,
        country_box,
        city_hides_marker,
        country_hides_marker,
    })
}

fn render_boundaries<W: Write>(
    w: &mut W,
    frame: &Frame,
    boundaries: &Boundaries,
    opt: &RenderOptions,
) -> std::fmt::Result {
    if boundaries.is_empty() {
        return Ok(());
    }
    writeln!(
        w,
        r##"<g fill="none" stroke="{ink}" stroke-width="{sw}" stroke-linejoin="round">"##,
        ink = opt.ink_colour,
        sw = opt.boundary_width
    )?;
    for line in &boundaries.lines {
        write!(w, r##"<polyline points=""##)?;
        for (i, &(lon, lat)) in line.iter().enumerate() {
            let (x, y) = frame.data_to_px(lon, lat);
            if i > 0 {
                write!(w, " ")?;
            }
            write!(w, "{x:.2},{y:.2}")?;
        }
        writeln!(w, r##""/>"##)?;
    }
    writeln!(w, "</g>")
}

fn render_marker<W: Write>(w: &mut W, (x, y): (f64, f64), opt: &RenderOptions) -> std::fmt::Result {
    let half = MARKER_SIZE_PT / 2.0;
    match opt.marker {
        MarkerStyle::Image => writeln!(
            w,
            r##"<image xlink:href="{href}" x="{x:.2}" y="{y:.2}" width="{s:.2}" height="{s:.2}"/>"##,
            href = html_encode(&opt.marker_image),
            x = x - half,
            y = y - half,
            s = MARKER_SIZE_PT
        ),
        MarkerStyle::Symbol => writeln!(
            w,
            r##"<path d="M {x0:.2} {y:.2} H {x1:.2} M {x:.2} {y0:.2} V {y1:.2}" stroke="{ink}" stroke-width="1" fill="none"/>"##,
            x0 = x - half,
            x1 = x + half,
            y0 = y - half,
            y1 = y + half,
            ink = opt.ink_colour
        ),
        MarkerStyle::None => Ok(()),
    }
}

/// Tiny ticks outside each corner of the axes keep the placed image's
/// bounding box identical from map to map in the layout tool.
fn render_anti_bounce_ticks<W: Write>(w: &mut W, frame: &Frame, ink: &str) -> std::fmt::Result {
    let d = ANTI_BOUNCE_DISTANCE;
    let corners = [
        (-d, -d * 1.5),
        (-d, 1.0 + d),
        (1.0 + d, 1.0 + d),
        (1.0 + d, -d * 1.5),
    ];
    for (fx, fy) in corners {
        let (x, y) = frame.axes_to_px(fx, fy);
        writeln!(
            w,
            r##"<text x="{x:.2}" y="{y:.2}" font-family="{FONT_FAMILY}" font-size="{ANTI_BOUNCE_FONT_SIZE}" fill="{ink}">|</text>"##
        )?;
    }
    Ok(())
}

fn render_text<W: Write>(
    w: &mut W,
    (x, y): (f64, f64),
    text: &str,
    font_size: f64,
    alpha: f64,
    opt: &RenderOptions,
) -> std::fmt::Result {
    writeln!(
        w,
        r##"<text x="{x:.2}" y="{y:.2}" font-family="{FONT_FAMILY}" font-size="{font_size}" fill="{ink}" fill-opacity="{alpha}">{txt}</text>"##,
        ink = opt.ink_colour,
        txt = html_encode(text)
    )
}

fn render_box<W: Write>(w: &mut W, b: &TextBox, crossing: bool) -> std::fmt::Result {
    let colour = if crossing { "red" } else { "green" };
    writeln!(
        w,
        r##"<rect x="{x:.2}" y="{y:.2}" width="{bw:.2}" height="{bh:.2}" fill="none" stroke="{colour}" stroke-width="1"/>"##,
        x = b.x0,
        y = b.y0,
        bw = b.width(),
        bh = b.height()
    )
}

/// Escape text for SVG content and attribute values
fn html_encode(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '&' => "&amp;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&apos;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}
