// src/render/pdf.rs

//! PDF serialization of laid-out pages.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt, Rect,
};

use crate::error::{AppError, Result};
use crate::render::layout::{Font, Item, PAGE_HEIGHT, PAGE_WIDTH, Page, Rgb};

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

/// Serialize `pages` into a PDF byte stream.
pub fn write_pdf(title: &str, pages: &[Page]) -> Result<Vec<u8>> {
    let (width, height) = (mm(PAGE_WIDTH), mm(PAGE_HEIGHT));
    let (doc, first_page, first_layer) = PdfDocument::new(title, width, height, "Layer 1");

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::render(format!("{e:?}")))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::render(format!("{e:?}")))?,
    };

    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(width, height, "Layer 1");
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, &fonts, page);
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::render(format!("{e:?}")))
}

fn draw_page(layer: &PdfLayerReference, fonts: &Fonts, page: &Page) {
    for item in &page.items {
        match item {
            Item::Rect {
                x,
                top,
                width,
                height,
                fill,
            } => fill_rect(layer, *x, *top, *width, *height, *fill),
            Item::Text {
                x,
                baseline,
                style,
                text,
            } => {
                layer.set_fill_color(color(Rgb::BLACK));
                layer.use_text(
                    sanitize(text),
                    style.size,
                    mm(*x),
                    mm(PAGE_HEIGHT - baseline),
                    fonts.get(style.font),
                );
            }
            Item::Qr {
                x,
                top,
                size,
                matrix,
            } => {
                let module = size / matrix.width().max(1) as f32;
                for row in 0..matrix.width() {
                    for (start, len) in matrix.dark_runs(row) {
                        fill_rect(
                            layer,
                            x + start as f32 * module,
                            top + row as f32 * module,
                            len as f32 * module,
                            module,
                            Rgb::BLACK,
                        );
                    }
                }
            }
        }
    }
}

fn fill_rect(layer: &PdfLayerReference, x: f32, top: f32, width: f32, height: f32, fill: Rgb) {
    let bottom = PAGE_HEIGHT - top - height;
    layer.set_fill_color(color(fill));
    layer.add_rect(
        Rect::new(mm(x), mm(bottom), mm(x + width), mm(bottom + height))
            .with_mode(PaintMode::Fill),
    );
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(printpdf::Rgb::new(rgb.0, rgb.1, rgb.2, None))
}

/// Map text onto what the standard Helvetica encoding can show.
fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{00A0}' | '\u{2009}' | '\u{202F}' => ' ',
            c if (c as u32) < 0x100 => c,
            _ => '?',
        })
        .collect()
}
