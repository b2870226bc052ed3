// ============================================================
// Layer 6 - PDFium Rasterizer
// ============================================================
// PageRasterizer backed by PDFium through `pdfium-render`.
// The library is bound once at probe time: first a copy next to
// the working directory, then the system one.
//
// PDF sizes are in points (72 per inch), so pages are rendered at
// dpi / 72 scale.

use crate::domain::traits::{Capability, PageRasterizer};

pub const CAPABILITY_NAME: &str = "pdfium";

/// Pixel size of a `points`-long page edge at `dpi`.
pub fn pixels_at_dpi(points: f32, dpi: u32) -> i32 {
    (points * dpi as f32 / 72.0).round() as i32
}

pub fn probe() -> Capability<Box<dyn PageRasterizer>> {
    imp::probe()
}

#[cfg(feature = "pdfium")]
mod imp {
    use std::path::Path;

    use image::DynamicImage;
    use pdfium_render::prelude::*;

    use super::{pixels_at_dpi, CAPABILITY_NAME};
    use crate::domain::traits::{Capability, PageRasterizer};
    use crate::error::{Error, Result};

    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>> {
            let document = self.pdfium.load_pdf_from_file(path, None).map_err(|e| {
                Error::Recognition(format!("failed to load PDF {}: {e}", path.display()))
            })?;

            let page_count = document.pages().len();
            tracing::debug!("Rasterizing {} pages of {}", page_count, path.display());

            let mut images = Vec::with_capacity(page_count as usize);
            for (index, page) in document.pages().iter().enumerate() {
                let config = PdfRenderConfig::new()
                    .set_target_width(pixels_at_dpi(page.width().value, dpi))
                    .set_target_height(pixels_at_dpi(page.height().value, dpi))
                    .render_form_data(true)
                    .render_annotations(true);
                let bitmap = page.render_with_config(&config).map_err(|e| {
                    Error::Recognition(format!("failed to render page {}: {e}", index + 1))
                })?;
                images.push(bitmap.as_image());
            }
            Ok(images)
        }
    }

    pub fn probe() -> Capability<Box<dyn PageRasterizer>> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library());
        match bindings {
            Ok(bindings) => {
                tracing::info!("PDFium ready");
                Capability::Available(Box::new(PdfiumRasterizer {
                    pdfium: Pdfium::new(bindings),
                }))
            }
            Err(e) => Capability::unavailable(CAPABILITY_NAME, format!("cannot bind PDFium: {e}")),
        }
    }
}

#[cfg(not(feature = "pdfium"))]
mod imp {
    use super::CAPABILITY_NAME;
    use crate::domain::traits::{Capability, PageRasterizer};

    pub fn probe() -> Capability<Box<dyn PageRasterizer>> {
        Capability::unavailable(CAPABILITY_NAME, "built without the `pdfium` feature")
    }
}
