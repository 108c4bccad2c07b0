// src/render/qr.rs

//! QR code matrices for room deep links.

use qrcode::{Color, QrCode};

use crate::error::{AppError, Result};

/// Square module matrix of an encoded QR code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    dark: Vec<bool>,
}

impl QrMatrix {
    /// Encode `data` with the smallest fitting version.
    pub fn encode(data: &str) -> Result<Self> {
        let code = QrCode::new(data.as_bytes())
            .map_err(|e| AppError::render(format!("QR encoding failed for '{data}': {e}")))?;
        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();
        Ok(Self { width, dark })
    }

    /// Modules per side.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Horizontal runs of dark modules in row `y` as `(start, length)`.
    pub fn dark_runs(&self, y: usize) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut x = 0;
        while x < self.width {
            if !self.is_dark(x, y) {
                x += 1;
                continue;
            }
            let start = x;
            while x < self.width && self.is_dark(x, y) {
                x += 1;
            }
            runs.push((start, x - start));
        }
        runs
    }
}
