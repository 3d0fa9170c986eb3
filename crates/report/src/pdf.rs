//! PDF document assembly
//!
//! Cursor-based layout on US letter pages with the three builtin Helvetica
//! faces plus Courier for error excerpts. The builder tracks a y-cursor in
//! millimeters from the page bottom and starts a fresh page whenever the
//! next block would cross the bottom margin.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Utc;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};
use tracing::warn;

use keystone_common::results::{Feature, Scenario, Step, StepStatus, SuiteSummary};

use crate::error::Result;
use crate::screenshot::find_screenshot;

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 19.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

/// Widest a screenshot may render, in mm
const IMAGE_MAX_WIDTH: f32 = 140.0;

/// Error excerpts are truncated to this many characters
const ERROR_EXCERPT_LIMIT: usize = 500;

const PT_TO_MM: f32 = 0.352_778;

// Palette lifted from the report house style
fn dark_slate() -> Color {
    Color::Rgb(Rgb::new(0.17, 0.24, 0.31, None))
}
fn slate() -> Color {
    Color::Rgb(Rgb::new(0.20, 0.29, 0.37, None))
}
fn blue() -> Color {
    Color::Rgb(Rgb::new(0.16, 0.50, 0.73, None))
}
fn body_black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}
fn pass_green() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.5, 0.0, None))
}
fn fail_red() -> Color {
    Color::Rgb(Rgb::new(0.8, 0.0, 0.0, None))
}
fn rule_grey() -> Color {
    Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None))
}

/// Generate the full report PDF.
pub fn generate(features: &[Feature], screenshots_dir: &Path, output: &Path) -> Result<()> {
    let mut builder = ReportBuilder::new(screenshots_dir.to_path_buf())?;

    builder.title_page(features);
    for feature in features {
        builder.add_feature(feature);
    }
    builder.sign_off_page();

    builder.save(output)
}

struct ReportBuilder {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    /// y position in mm from the page bottom
    cursor: f32,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    mono: IndirectFontRef,
    screenshots_dir: PathBuf,
}

impl ReportBuilder {
    fn new(screenshots_dir: PathBuf) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            "End-to-End Test Report",
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let mono = doc.add_builtin_font(BuiltinFont::Courier)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            cursor: PAGE_HEIGHT - MARGIN,
            regular,
            bold,
            mono,
            screenshots_dir,
        })
    }

    fn save(self, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(output)?);
        self.doc.save(&mut writer)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Layout primitives
    // ------------------------------------------------------------------

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN;
    }

    /// Break the page if `needed` mm would cross the bottom margin. Blocks
    /// taller than a page are allowed to start at the top and clip.
    fn ensure_space(&mut self, needed: f32) {
        let needed = needed.min(PAGE_HEIGHT - 2.0 * MARGIN);
        if self.cursor - needed < MARGIN {
            self.new_page();
        }
    }

    fn spacer(&mut self, mm: f32) {
        self.cursor -= mm;
    }

    /// One line of text at the given indent. Returns the baseline used.
    fn text_line(
        &mut self,
        text: &str,
        size: f32,
        font: FontFace,
        color: Color,
        indent: f32,
    ) -> f32 {
        let line_height = size * PT_TO_MM * 1.45;
        self.ensure_space(line_height);
        self.cursor -= line_height;
        let font = self.font(font);
        self.layer.set_fill_color(color);
        self.layer
            .use_text(text, size, Mm(MARGIN + indent), Mm(self.cursor), &font);
        self.cursor
    }

    /// Word-wrapped paragraph.
    fn paragraph(&mut self, text: &str, size: f32, font: FontFace, color: Color, indent: f32) {
        let usable = CONTENT_WIDTH - indent;
        for line in wrap_text(text, max_chars(usable, size, font)) {
            self.text_line(&line, size, font, color.clone(), indent);
        }
    }

    fn font(&self, face: FontFace) -> IndirectFontRef {
        match face {
            FontFace::Regular => self.regular.clone(),
            FontFace::Bold => self.bold.clone(),
            FontFace::Mono => self.mono.clone(),
        }
    }

    fn hline(&self, x1: f32, x2: f32, y: f32) {
        self.layer.set_outline_color(rule_grey());
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x1), Mm(y)), false),
                (Point::new(Mm(x2), Mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn vline(&self, x: f32, y1: f32, y2: f32) {
        self.layer.set_outline_color(rule_grey());
        self.layer.set_outline_thickness(0.5);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x), Mm(y1)), false),
                (Point::new(Mm(x), Mm(y2)), false),
            ],
            is_closed: false,
        });
    }

    /// Fixed-width table. The first row is bold when `header` is set;
    /// `grid` draws the surrounding rules.
    fn table(&mut self, rows: &[Vec<String>], widths: &[f32], header: bool, grid: bool) {
        const ROW_HEIGHT: f32 = 9.0;
        self.ensure_space(ROW_HEIGHT * rows.len() as f32 + 2.0);

        let top = self.cursor;
        let total_width: f32 = widths.iter().sum();

        for (i, row) in rows.iter().enumerate() {
            let baseline = self.cursor - ROW_HEIGHT + 3.0;
            let face = if header && i == 0 {
                FontFace::Bold
            } else {
                FontFace::Regular
            };
            let font = self.font(face);
            self.layer.set_fill_color(dark_slate());
            let mut x = MARGIN;
            for (cell, width) in row.iter().zip(widths) {
                self.layer.use_text(cell, 11.0, Mm(x + 2.0), Mm(baseline), &font);
                x += width;
            }
            self.cursor -= ROW_HEIGHT;
        }

        if grid {
            let bottom = self.cursor;
            let mut y = top;
            for _ in 0..=rows.len() {
                self.hline(MARGIN, MARGIN + total_width, y);
                y -= ROW_HEIGHT;
            }
            let mut x = MARGIN;
            for width in widths {
                self.vline(x, top, bottom);
                x += width;
            }
            self.vline(MARGIN + total_width, top, bottom);
        }

        self.spacer(2.0);
    }

    // ------------------------------------------------------------------
    // Document sections
    // ------------------------------------------------------------------

    fn title_page(&mut self, features: &[Feature]) {
        self.spacer(50.0);

        let title = "End-to-End Test Report";
        let title_size = 24.0;
        let title_width = title.chars().count() as f32 * title_size * 0.5 * PT_TO_MM;
        self.cursor -= title_size * PT_TO_MM * 1.45;
        self.layer.set_fill_color(dark_slate());
        self.layer.use_text(
            title,
            title_size,
            Mm((PAGE_WIDTH - title_width) / 2.0),
            Mm(self.cursor),
            &self.bold.clone(),
        );

        self.spacer(15.0);

        let metadata = vec![
            vec!["Project:".to_string(), "Keystone".to_string()],
            vec!["Test Type:".to_string(), "E2E BDD Tests".to_string()],
            vec![
                "Test Date:".to_string(),
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            ],
            vec!["Environment:".to_string(), "Development".to_string()],
        ];
        self.table(&metadata, &[50.0, 100.0], false, false);

        self.spacer(10.0);

        let summary = SuiteSummary::of(features);
        let rate = summary
            .success_rate()
            .map(|r| format!("{:.1}%", r))
            .unwrap_or_else(|| "N/A".to_string());
        let rows = vec![
            vec!["Total Scenarios:".to_string(), summary.total.to_string()],
            vec!["Passed:".to_string(), summary.passed.to_string()],
            vec!["Failed:".to_string(), summary.failed.to_string()],
            vec!["Success Rate:".to_string(), rate],
        ];
        self.table(&rows, &[50.0, 50.0], false, true);

        self.new_page();
    }

    fn add_feature(&mut self, feature: &Feature) {
        self.text_line(
            &format!("Feature: {}", feature.name),
            16.0,
            FontFace::Bold,
            slate(),
            0.0,
        );
        if !feature.description.is_empty() {
            self.spacer(1.0);
            self.paragraph(
                &feature.description,
                11.0,
                FontFace::Regular,
                body_black(),
                0.0,
            );
        }
        self.spacer(5.0);

        for scenario in &feature.elements {
            self.add_scenario(scenario);
        }
    }

    fn add_scenario(&mut self, scenario: &Scenario) {
        self.ensure_space(30.0);
        self.text_line(
            &format!("Scenario: {}", scenario.name),
            14.0,
            FontFace::Bold,
            blue(),
            0.0,
        );
        if !scenario.description.is_empty() {
            self.paragraph(
                &scenario.description,
                11.0,
                FontFace::Regular,
                body_black(),
                0.0,
            );
        }
        self.spacer(2.0);

        for step in &scenario.steps {
            self.add_step(&scenario.name, step);
        }

        self.spacer(8.0);
    }

    fn add_step(&mut self, scenario_name: &str, step: &Step) {
        let status = step.status();
        let keyword = step.keyword.trim();

        let marker_color = match status {
            StepStatus::Passed => pass_green(),
            StepStatus::Failed => fail_red(),
            _ => rule_grey(),
        };

        let baseline = self.text_line(
            &format!("{} {}", keyword, step.name),
            11.0,
            FontFace::Regular,
            body_black(),
            10.0,
        );
        self.layer.set_fill_color(marker_color);
        self.layer
            .use_text("\u{2022}", 11.0, Mm(MARGIN + 5.0), Mm(baseline), &self.regular.clone());

        // Screenshots accompany every Then step plus any failure
        if keyword.eq_ignore_ascii_case("then") || status == StepStatus::Failed {
            if let Some(path) =
                find_screenshot(&self.screenshots_dir, scenario_name, keyword, &step.name)
            {
                self.embed_screenshot(&path);
            }
        }

        if status == StepStatus::Failed {
            if let Some(message) = step.error_message() {
                let excerpt: String = message.chars().take(ERROR_EXCERPT_LIMIT).collect();
                self.paragraph(
                    &format!("Error: {}", excerpt),
                    9.0,
                    FontFace::Mono,
                    fail_red(),
                    15.0,
                );
            }
        }
    }

    /// Embed one screenshot scaled to the content width. Unreadable images
    /// are logged and skipped; report generation continues.
    fn embed_screenshot(&mut self, path: &Path) {
        let img = match printpdf::image_crate::open(path) {
            Ok(img) => img,
            Err(err) => {
                warn!("Could not embed screenshot {}: {}", path.display(), err);
                return;
            }
        };

        let px_width = img.width() as f32;
        let px_height = img.height() as f32;
        if px_width == 0.0 || px_height == 0.0 {
            warn!("Skipping empty screenshot {}", path.display());
            return;
        }

        // Pick a DPI that maps the pixel width onto IMAGE_MAX_WIDTH mm
        let dpi = px_width * 25.4 / IMAGE_MAX_WIDTH;
        let height_mm = px_height * 25.4 / dpi;

        self.ensure_space(height_mm + 6.0);
        self.cursor -= height_mm + 3.0;

        let image = Image::from_dynamic_image(&img);
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN + 10.0)),
                translate_y: Some(Mm(self.cursor)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        self.spacer(3.0);
    }

    fn sign_off_page(&mut self) {
        self.new_page();
        self.text_line(
            "Test Approval & Sign-off",
            16.0,
            FontFace::Bold,
            slate(),
            0.0,
        );
        self.spacer(5.0);

        let blank = String::new;
        let rows = vec![
            vec![
                "Role".to_string(),
                "Name".to_string(),
                "Signature".to_string(),
                "Date".to_string(),
            ],
            vec!["Test Engineer".to_string(), blank(), blank(), blank()],
            vec!["QA Lead".to_string(), blank(), blank(), blank()],
            vec!["Product Owner".to_string(), blank(), blank(), blank()],
            vec!["Change Manager".to_string(), blank(), blank(), blank()],
        ];
        self.table(&rows, &[40.0, 50.0, 50.0, 38.0], true, true);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontFace {
    Regular,
    Bold,
    Mono,
}

/// Rough character budget for a line of the given width. Helvetica averages
/// about half an em per glyph, Courier is fixed at 0.6 em.
fn max_chars(width_mm: f32, size: f32, font: FontFace) -> usize {
    let em_fraction = match font {
        FontFace::Mono => 0.6,
        _ => 0.5,
    };
    let char_mm = size * em_fraction * PT_TO_MM;
    ((width_mm / char_mm) as usize).max(8)
}

/// Greedy word wrap; words longer than the budget are split hard.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if word.chars().count() > max_chars {
            let mut chunk = String::new();
            for ch in word.chars() {
                if chunk.chars().count() == max_chars {
                    lines.push(std::mem::take(&mut chunk));
                }
                chunk.push(ch);
            }
            current = chunk;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use keystone_common::results::{StepOutcome, StepStatus};

    fn sample_features() -> Vec<Feature> {
        let step = |keyword: &str, name: &str, status: StepStatus| Step {
            keyword: keyword.to_string(),
            name: name.to_string(),
            result: Some(StepOutcome {
                status,
                error_message: if status == StepStatus::Failed {
                    Some("assertion failed: expected Hello".to_string())
                } else {
                    None
                },
            }),
        };

        vec![Feature {
            name: "Greeting service".to_string(),
            description: "Personalized greetings over HTTP".to_string(),
            elements: vec![
                Scenario {
                    name: "Default greeting".to_string(),
                    description: String::new(),
                    steps: vec![
                        step("Given", "the service is running", StepStatus::Passed),
                        step("Then", "I see Hello World", StepStatus::Passed),
                    ],
                },
                Scenario {
                    name: "Broken greeting".to_string(),
                    description: String::new(),
                    steps: vec![
                        step("Given", "the service is running", StepStatus::Passed),
                        step("Then", "I see Hello Bob", StepStatus::Failed),
                    ],
                },
            ],
        }]
    }

    #[test]
    fn test_generates_pdf_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("reports/test-report.pdf");

        generate(&sample_features(), dir.path(), &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_corrupt_screenshot_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        // Matches the "Then I see Hello World" lookup but is not an image
        std::fs::write(
            dir.path().join("Default_greeting_Then_I_see_Hello_World.png"),
            b"not a png",
        )
        .unwrap();

        let output = dir.path().join("test-report.pdf");
        generate(&sample_features(), dir.path(), &output).unwrap();
        assert!(output.exists());
    }

    #[test]
    fn test_wrap_text_respects_budget() {
        let lines = wrap_text("one two three four five six", 9);
        assert!(lines.iter().all(|l| l.chars().count() <= 9));
        assert_eq!(lines.join(" "), "one two three four five six");
    }

    #[test]
    fn test_wrap_text_splits_long_words() {
        let lines = wrap_text("abcdefghijklmnop", 4);
        assert_eq!(lines[0], "abcd");
        assert!(lines.iter().all(|l| l.chars().count() <= 4));
    }
}
