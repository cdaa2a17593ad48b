//! One-shot chart rendering: PDF export and a plain-text view.
//!
//! Export is a pure function of the current chart and roster. A missing or
//! undecodable photo degrades that one slot to a placeholder box and is
//! reported as a warning; it never aborts the export. Only document-level
//! failures (unwritable output, PDF encoding) are errors.

use crate::chart::Chart;
use crate::layout::Position;
use crate::roster::Roster;
use printpdf::image_crate::{self, GenericImageView};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb,
};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Points per millimetre, for text width estimates.
const PT_PER_MM: f32 = 72.0 / 25.4;

/// DPI the photos are embedded at.
const IMAGE_DPI: f32 = 300.0;

/// Errors that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),
}

/// A slot that could not be rendered with its photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportWarning {
    /// The roster points at a photo file that does not exist.
    MissingImage {
        position: Position,
        name: String,
        path: PathBuf,
    },
    /// The photo file exists but could not be decoded.
    UndecodableImage {
        position: Position,
        name: String,
        path: PathBuf,
        detail: String,
    },
    /// The person is in the roster but has no photo.
    NoPhoto { position: Position, name: String },
    /// The assigned name is not in the roster at all.
    UnknownPerson { position: Position, name: String },
}

impl ExportWarning {
    pub fn position(&self) -> Position {
        match self {
            ExportWarning::MissingImage { position, .. }
            | ExportWarning::UndecodableImage { position, .. }
            | ExportWarning::NoPhoto { position, .. }
            | ExportWarning::UnknownPerson { position, .. } => *position,
        }
    }
}

impl fmt::Display for ExportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportWarning::MissingImage {
                position,
                name,
                path,
            } => write!(
                f,
                "position {position} ({name}): photo not found: {}",
                path.display()
            ),
            ExportWarning::UndecodableImage {
                position,
                name,
                path,
                detail,
            } => write!(
                f,
                "position {position} ({name}): could not decode {}: {detail}",
                path.display()
            ),
            ExportWarning::NoPhoto { position, name } => {
                write!(f, "position {position} ({name}): no photo on file")
            }
            ExportWarning::UnknownPerson { position, name } => {
                write!(f, "position {position}: {name} is not in the roster")
            }
        }
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// Boxes drawn, filled or empty. Always the layout's total.
    pub positions_drawn: usize,

    /// Slots that fell back to a placeholder.
    pub warnings: Vec<ExportWarning>,
}

/// PDF page geometry: landscape A4, tight margins, capped box sizes, rows
/// centered on the page.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    /// Page width in mm.
    pub page_width: f32,
    /// Page height in mm.
    pub page_height: f32,
    /// Outer margin in mm.
    pub margin: f32,
    /// Gap between boxes in a row, mm.
    pub h_spacing: f32,
    /// Gap between rows, mm.
    pub v_spacing: f32,
    /// Box width cap, mm.
    pub max_box_width: f32,
    /// Box height cap, mm.
    pub max_box_height: f32,
    /// Height of the name bar at the bottom of each box, mm.
    pub name_bar: f32,
    /// Name font size in points.
    pub font_size: f32,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self {
            page_width: 297.0,
            page_height: 210.0,
            margin: 8.0,
            h_spacing: 3.0,
            v_spacing: 5.0,
            max_box_width: 80.0,
            max_box_height: 65.0,
            name_bar: 7.0,
            font_size: 10.0,
        }
    }
}

impl PdfExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `chart` to a PDF at `path`.
    ///
    /// Every position is drawn. Photos are fitted above the name bar
    /// preserving aspect ratio; slots whose photo cannot be used get an
    /// outlined placeholder and an entry in the report's warnings.
    pub fn export(
        &self,
        chart: &Chart,
        roster: &Roster,
        path: impl AsRef<Path>,
    ) -> Result<ExportReport, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            "Pyramid Chart",
            Mm(self.page_width),
            Mm(self.page_height),
            "chart",
        );
        let layer = doc.get_page(page).get_layer(layer);
        let font = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

        let widths = chart.layout().row_widths();
        let total_rows = widths.len() as f32;
        let widest = *widths.iter().max().unwrap_or(&1) as f32;

        let usable_width = self.page_width - 2.0 * self.margin;
        let usable_height = self.page_height - 2.0 * self.margin;
        let box_width = self
            .max_box_width
            .min((usable_width - (widest - 1.0) * self.h_spacing) / widest);
        let box_height = self
            .max_box_height
            .min((usable_height - (total_rows - 1.0) * self.v_spacing) / total_rows);

        let mut report = ExportReport::default();
        let mut index = 0usize;

        for (row, &row_width) in widths.iter().enumerate() {
            let n = row_width as f32;
            let row_span = n * box_width + (n - 1.0) * self.h_spacing;
            let start_x = (self.page_width - row_span) / 2.0;
            let top = self.page_height - self.margin - row as f32 * (box_height + self.v_spacing);
            let bottom = top - box_height;

            for column in 0..row_width {
                let x = start_x + column as f32 * (box_width + self.h_spacing);
                let position = Position(index);
                index += 1;

                self.draw_slot(
                    &layer,
                    &font,
                    chart.get(position),
                    position,
                    roster,
                    x,
                    bottom,
                    box_width,
                    box_height,
                    &mut report,
                );
                report.positions_drawn += 1;
            }
        }

        doc.save(&mut BufWriter::new(File::create(path)?))?;
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_slot(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        occupant: Option<&str>,
        position: Position,
        roster: &Roster,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        report: &mut ExportReport,
    ) {
        let name = match occupant {
            Some(name) => name,
            None => {
                // Unfilled slot: outlined box with a centered "Empty" label
                stroke_rect(layer, x, y, width, height);
                self.centered_text(layer, font, "Empty", x + width / 2.0, y + height / 2.0);
                return;
            }
        };

        let warning = match roster.get(name) {
            None => Some(ExportWarning::UnknownPerson {
                position,
                name: name.to_string(),
            }),
            Some(person) => match person.photo {
                None => Some(ExportWarning::NoPhoto {
                    position,
                    name: name.to_string(),
                }),
                Some(photo) => {
                    self.try_draw_photo(layer, &photo, x, y, width, height)
                        .err()
                        .map(|detail| match detail {
                            PhotoFailure::Missing => ExportWarning::MissingImage {
                                position,
                                name: name.to_string(),
                                path: photo.clone(),
                            },
                            PhotoFailure::Undecodable(detail) => ExportWarning::UndecodableImage {
                                position,
                                name: name.to_string(),
                                path: photo.clone(),
                                detail,
                            },
                        })
                }
            },
        };

        let has_photo = warning.is_none();
        if let Some(warning) = warning {
            report.warnings.push(warning);
        }

        if has_photo {
            // White bar under the name so it stays readable over the photo
            layer.set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
            fill_rect(layer, x, y, width, self.name_bar);
            layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
            self.centered_text(layer, font, name, x + width / 2.0, y + 2.0);
        } else {
            // Placeholder: the name centered in an otherwise empty box
            self.centered_text(layer, font, name, x + width / 2.0, y + height / 2.0);
        }
        stroke_rect(layer, x, y, width, height);
    }

    /// Decode and place a photo above the name bar, preserving aspect ratio.
    fn try_draw_photo(
        &self,
        layer: &PdfLayerReference,
        photo: &Path,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) -> Result<(), PhotoFailure> {
        if !photo.exists() {
            return Err(PhotoFailure::Missing);
        }
        let decoded = image_crate::open(photo)
            .map_err(|e| PhotoFailure::Undecodable(e.to_string()))?;
        let (px_width, px_height) = decoded.dimensions();
        if px_width == 0 || px_height == 0 {
            return Err(PhotoFailure::Undecodable("zero-sized image".to_string()));
        }

        // Alpha channels are not embeddable; flatten to RGB first
        let rgb = image_crate::DynamicImage::ImageRgb8(decoded.to_rgb8());
        let pdf_image = printpdf::Image::from_dynamic_image(&rgb);

        let pad = 1.5;
        let area_width = width - 2.0 * pad;
        let area_height = height - self.name_bar - 2.0 * pad;

        // Natural printed size at the embedding DPI, then fit to the box
        let natural_width = px_width as f32 * 25.4 / IMAGE_DPI;
        let natural_height = px_height as f32 * 25.4 / IMAGE_DPI;
        let scale = (area_width / natural_width).min(area_height / natural_height);

        let drawn_width = natural_width * scale;
        let drawn_height = natural_height * scale;
        let tx = x + pad + (area_width - drawn_width) / 2.0;
        let ty = y + self.name_bar + pad + (area_height - drawn_height) / 2.0;

        pdf_image.add_to_layer(
            layer.clone(),
            printpdf::ImageTransform {
                translate_x: Some(Mm(tx)),
                translate_y: Some(Mm(ty)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        Ok(())
    }

    /// Draw text centered on `cx`. Builtin fonts expose no metrics, so the
    /// width estimate uses the Helvetica-Bold average advance.
    fn centered_text(
        &self,
        layer: &PdfLayerReference,
        font: &IndirectFontRef,
        text: &str,
        cx: f32,
        baseline: f32,
    ) {
        let text_width = text.chars().count() as f32 * self.font_size * 0.55 / PT_PER_MM;
        layer.use_text(
            text,
            self.font_size,
            Mm(cx - text_width / 2.0),
            Mm(baseline),
            font,
        );
    }
}

enum PhotoFailure {
    Missing,
    Undecodable(String),
}

fn rect_points(x: f32, y: f32, width: f32, height: f32) -> Vec<(Point, bool)> {
    vec![
        (Point::new(Mm(x), Mm(y)), false),
        (Point::new(Mm(x + width), Mm(y)), false),
        (Point::new(Mm(x + width), Mm(y + height)), false),
        (Point::new(Mm(x), Mm(y + height)), false),
    ]
}

fn stroke_rect(layer: &PdfLayerReference, x: f32, y: f32, width: f32, height: f32) {
    layer.add_polygon(Polygon {
        rings: vec![rect_points(x, y, width, height)],
        mode: PaintMode::Stroke,
        winding_order: WindingOrder::NonZero,
    });
}

fn fill_rect(layer: &PdfLayerReference, x: f32, y: f32, width: f32, height: f32) {
    layer.add_polygon(Polygon {
        rings: vec![rect_points(x, y, width, height)],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });
}

/// Render the chart as a centered text pyramid, one bracketed cell per slot.
///
/// Used by the interactive shell's `show` command. Empty slots display their
/// position number so the user can see what to type.
pub fn render_text(chart: &Chart, roster: &Roster) -> String {
    const CELL: usize = 14;

    let widths = chart.layout().row_widths();
    let widest = widths.iter().max().copied().unwrap_or(1);
    let line_width = widest * (CELL + 1);

    let mut out = String::new();
    let mut index = 0usize;
    for &row_width in widths {
        let mut cells = Vec::with_capacity(row_width);
        for _ in 0..row_width {
            let position = Position(index);
            let label = match chart.get(position) {
                Some(name) => {
                    let marker = if roster.contains(name) { "" } else { "?" };
                    truncate(&format!("{name}{marker}"), CELL - 2)
                }
                None => format!("#{index}"),
            };
            cells.push(format!("[{label:^width$}]", width = CELL - 2));
            index += 1;
        }
        let row = cells.join(" ");
        let pad = line_width.saturating_sub(row.chars().count()) / 2;
        out.push_str(&" ".repeat(pad));
        out.push_str(&row);
        out.push('\n');
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PyramidLayout;

    fn sample() -> (Chart, Roster) {
        let mut chart = Chart::new(PyramidLayout::new(3).unwrap());
        chart.assign(Position(0), "Alice").unwrap();
        chart.assign(Position(4), "Bob").unwrap();

        let mut roster = Roster::new();
        roster.add("Alice", None);
        (chart, roster)
    }

    #[test]
    fn text_render_shows_names_and_empty_indices() {
        let (chart, roster) = sample();
        let rendered = render_text(&chart, &roster);

        assert!(rendered.contains("Alice"));
        // Bob is assigned but not in the roster
        assert!(rendered.contains("Bob?"));
        assert!(rendered.contains("#1"));
        assert!(rendered.contains("#5"));
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn text_render_rows_are_centered() {
        let (chart, roster) = sample();
        let rendered = render_text(&chart, &roster);
        let lines: Vec<&str> = rendered.lines().collect();

        // Top row is indented further than the bottom row
        let indent = |line: &str| line.chars().take_while(|c| *c == ' ').count();
        assert!(indent(lines[0]) > indent(lines[2]));
        assert_eq!(indent(lines[2]), 0);
    }

    #[test]
    fn truncate_marks_long_names() {
        assert_eq!(truncate("Bartholomew Cubbins", 8), "Barthol…");
        assert_eq!(truncate("Alice", 8), "Alice");
    }

    #[test]
    fn warning_display_names_the_slot() {
        let warning = ExportWarning::MissingImage {
            position: Position(3),
            name: "Alice".to_string(),
            path: "photos/alice.png".into(),
        };
        let text = warning.to_string();
        assert!(text.contains("position 3"));
        assert!(text.contains("Alice"));
        assert_eq!(warning.position(), Position(3));
    }
}
