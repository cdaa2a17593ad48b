//! QA tests for PDF export, including per-slot missing-image degradation.
//!
//! Run with: `cargo test -p pyramid-core --test qa_export`

use printpdf::image_crate::{ImageBuffer, Rgb};
use pyramid_core::{Chart, ExportWarning, PdfExporter, Position, PyramidLayout, Roster};
use std::path::Path;
use tempfile::TempDir;

/// Write a small solid-color PNG to use as a stand-in photo.
fn write_photo(path: &Path) {
    let pixels: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(16, 12, Rgb([90, 120, 200]));
    pixels.save(path).expect("write test photo");
}

fn assert_is_pdf(path: &Path) {
    let bytes = std::fs::read(path).expect("read exported file");
    assert!(bytes.starts_with(b"%PDF"), "output is not a PDF");
    assert!(bytes.len() > 500, "suspiciously small PDF");
}

// =============================================================================
// TEST 1: Clean export
// =============================================================================

#[test]
fn export_with_photos_draws_every_position() {
    let dir = TempDir::new().expect("temp dir");
    let photo = dir.path().join("alice.png");
    write_photo(&photo);

    let mut roster = Roster::new();
    roster.add("Alice", Some(photo));

    let mut chart = Chart::new(PyramidLayout::new(3).expect("layout"));
    chart.assign(Position(0), "Alice").expect("assign");

    let out = dir.path().join("chart.pdf");
    let report = PdfExporter::new()
        .export(&chart, &roster, &out)
        .expect("export");

    assert_eq!(report.positions_drawn, 6);
    assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    assert_is_pdf(&out);
}

// =============================================================================
// TEST 2: Missing image degrades one slot, not the export
// =============================================================================

#[test]
fn missing_photo_yields_a_warning_and_a_complete_pdf() {
    let dir = TempDir::new().expect("temp dir");
    let good = dir.path().join("bob.png");
    write_photo(&good);

    let mut roster = Roster::new();
    roster.add("Alice", Some(dir.path().join("gone.png")));
    roster.add("Bob", Some(good));

    let mut chart = Chart::new(PyramidLayout::new(3).expect("layout"));
    chart.assign(Position(0), "Alice").expect("assign");
    chart.assign(Position(3), "Bob").expect("assign");

    let out = dir.path().join("chart.pdf");
    let report = PdfExporter::new()
        .export(&chart, &roster, &out)
        .expect("export must not abort");

    // All six boxes drawn, exactly one degraded
    assert_eq!(report.positions_drawn, 6);
    assert_eq!(report.warnings.len(), 1);
    match &report.warnings[0] {
        ExportWarning::MissingImage { position, name, .. } => {
            assert_eq!(*position, Position(0));
            assert_eq!(name, "Alice");
        }
        other => panic!("expected MissingImage, got {other:?}"),
    }
    assert_is_pdf(&out);
}

#[test]
fn undecodable_photo_is_its_own_warning() {
    let dir = TempDir::new().expect("temp dir");
    let bogus = dir.path().join("broken.png");
    std::fs::write(&bogus, b"this is not a png").expect("write");

    let mut roster = Roster::new();
    roster.add("Alice", Some(bogus));

    let mut chart = Chart::new(PyramidLayout::new(2).expect("layout"));
    chart.assign(Position(2), "Alice").expect("assign");

    let out = dir.path().join("chart.pdf");
    let report = PdfExporter::new()
        .export(&chart, &roster, &out)
        .expect("export");

    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        ExportWarning::UndecodableImage { position: Position(2), .. }
    ));
    assert_is_pdf(&out);
}

// =============================================================================
// TEST 3: Roster gaps
// =============================================================================

#[test]
fn names_without_roster_entries_or_photos_are_reported() {
    let dir = TempDir::new().expect("temp dir");

    let mut roster = Roster::new();
    roster.add("Alice", None); // known, no photo

    let mut chart = Chart::new(PyramidLayout::new(2).expect("layout"));
    chart.assign(Position(0), "Alice").expect("assign");
    chart.assign(Position(1), "Stranger").expect("assign"); // not in roster

    let out = dir.path().join("chart.pdf");
    let report = PdfExporter::new()
        .export(&chart, &roster, &out)
        .expect("export");

    assert_eq!(report.warnings.len(), 2);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ExportWarning::NoPhoto { name, .. } if name == "Alice")));
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, ExportWarning::UnknownPerson { name, .. } if name == "Stranger")));
    assert_is_pdf(&out);
}

// =============================================================================
// TEST 4: Output location failures abort
// =============================================================================

#[test]
fn unwritable_output_path_is_an_error() {
    let chart = Chart::new(PyramidLayout::new(2).expect("layout"));
    let roster = Roster::new();

    let result = PdfExporter::new().export(&chart, &roster, "/no/such/dir/chart.pdf");
    assert!(result.is_err());
}
