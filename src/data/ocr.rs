// ============================================================
// Layer 4 - OCR Engine
// ============================================================
// Turns a document file into one OcrPageResult per page.
//
//   .pdf                    → rasterizer → page images → recognizer
//   .png .jpg .jpeg .tif(f) → image::open  → recognizer
//
// Page reduction (identical for both paths):
//   - tokens with non-whitespace text become lines joined by '\n'
//   - confidences strictly above the -1 "no detection" sentinel
//     are averaged; a genuine 0 stays in the mean
//   - no surviving confidence → None
//
// Both capabilities are passed in explicitly. A missing recognizer
// fails construction, a missing rasterizer fails only PDF input.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::domain::document::OcrPageResult;
use crate::domain::traits::{
    Capability, PageRasterizer, RecognizedToken, TextRecognizer, NO_DETECTION_CONFIDENCE,
};
use crate::error::{Error, Result};

/// Raster formats accepted as single-page documents.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tif", "tiff"];

pub const PDF_EXTENSION: &str = "pdf";

/// Separator placed between pages by `aggregate_text`.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// OCR settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Recognizer language code (Tesseract style, e.g. "fra", "eng+fra")
    pub language: String,

    /// Rasterization resolution for PDF pages
    pub dpi: u32,

    /// Custom tessdata directory; None uses the system default
    #[serde(default)]
    pub tessdata_dir: Option<PathBuf>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "fra".to_string(),
            dpi: 300,
            tessdata_dir: None,
        }
    }
}

/// What `run` will do with a path, decided from its extension alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if extension == PDF_EXTENSION {
            Ok(DocumentKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(DocumentKind::Image)
        } else {
            Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
        }
    }
}

pub struct OcrEngine {
    config: OcrConfig,
    recognizer: Box<dyn TextRecognizer>,
    rasterizer: Capability<Box<dyn PageRasterizer>>,
}

impl OcrEngine {
    /// Build an engine. The recognizer is mandatory; the rasterizer
    /// is only required once a PDF is processed.
    pub fn new(
        config: OcrConfig,
        recognizer: Capability<Box<dyn TextRecognizer>>,
        rasterizer: Capability<Box<dyn PageRasterizer>>,
    ) -> Result<Self> {
        let recognizer = recognizer.into_inner()?;
        if let Capability::Unavailable { reason, .. } = &rasterizer {
            tracing::warn!("PDF rasterization unavailable, only images can be processed: {reason}");
        }
        tracing::info!(
            "OCR engine ready (language={}, dpi={})",
            config.language,
            config.dpi
        );
        Ok(Self {
            config,
            recognizer,
            rasterizer,
        })
    }

    pub fn supports_pdf(&self) -> bool {
        self.rasterizer.is_available()
    }

    /// OCR every page of `document_path`, in natural page order.
    pub fn run(&self, document_path: &Path) -> Result<Vec<OcrPageResult>> {
        if !document_path.exists() {
            return Err(Error::NotFound(document_path.to_path_buf()));
        }

        match DocumentKind::from_path(document_path)? {
            DocumentKind::Pdf => self.run_on_pdf(document_path),
            DocumentKind::Image => {
                let image = image::open(document_path)?;
                Ok(vec![self.run_on_image(&image, 1)?])
            }
        }
    }

    fn run_on_pdf(&self, document_path: &Path) -> Result<Vec<OcrPageResult>> {
        let rasterizer = self.rasterizer.require()?;
        let images = rasterizer.rasterize(document_path, self.config.dpi)?;

        tracing::debug!(
            "OCR: {} pages rasterized from {}",
            images.len(),
            document_path.display()
        );

        images
            .iter()
            .enumerate()
            .map(|(index, image)| self.run_on_image(image, index + 1))
            .collect()
    }

    fn run_on_image(&self, image: &DynamicImage, page_number: usize) -> Result<OcrPageResult> {
        let tokens = self.recognizer.recognize(image, &self.config.language)?;
        let page = page_from_tokens(page_number, &tokens);
        tracing::trace!(
            "OCR page {}: {} chars, confidence {:?}",
            page_number,
            page.text.len(),
            page.confidence
        );
        Ok(page)
    }

    /// Page texts joined with a blank line, in page order.
    pub fn aggregate_text(pages: &[OcrPageResult]) -> String {
        pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR)
    }

    /// Mean of the present page confidences; None when all are absent.
    pub fn aggregate_confidence(pages: &[OcrPageResult]) -> Option<f32> {
        mean(pages.iter().filter_map(|p| p.confidence))
    }
}

/// Reduce raw recognizer tokens to a page result.
pub fn page_from_tokens(page_number: usize, tokens: &[RecognizedToken]) -> OcrPageResult {
    let text = tokens
        .iter()
        .filter(|t| !t.text.trim().is_empty())
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let confidence = mean(
        tokens
            .iter()
            .map(|t| t.confidence)
            .filter(|&c| c > NO_DETECTION_CONFIDENCE),
    );

    OcrPageResult::new(page_number, text, confidence)
}

fn mean(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0f32, 0usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f32)
}
