//! The rasterization collaborator: PDF decoding behind a narrow trait.
//!
//! ## Why a trait?
//!
//! The pipeline needs exactly two things from a PDF engine: "how many pages
//! does this file have" and "give me page N at this resolution". Putting
//! that behind [`Rasterizer`] keeps every other module free of pdfium types,
//! and lets the test suite drive whole batches through an in-memory fake —
//! pdfium itself is exercised only where a real shared library is present.
//!
//! The pdfium implementation opens the document afresh for each call. A
//! batch touches each file a handful of times (one probe, then one render
//! per selected page), and re-opening keeps the implementation free of
//! cross-thread document handles.

use crate::error::ConvertError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;

/// Decodes PDF pages into raster images.
///
/// Implementations must be `Send + Sync`; document conversions run on
/// blocking worker threads.
pub trait Rasterizer: Send + Sync {
    /// Total number of pages in the document.
    fn page_count(&self, document: &Path) -> Result<u32, ConvertError>;

    /// Render a single 1-based page at the given DPI.
    fn rasterize_page(
        &self,
        document: &Path,
        page_num: u32,
        dpi: u32,
    ) -> Result<DynamicImage, ConvertError>;
}

/// The production engine, backed by pdfium.
#[derive(Debug, Default)]
pub struct PdfiumRasterizer;

impl PdfiumRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn page_count(&self, document: &Path) -> Result<u32, ConvertError> {
        let pdfium = Pdfium::default();
        let doc = pdfium
            .load_pdf_from_file(document, None)
            .map_err(|e| ConvertError::MetadataFailed {
                path: document.to_path_buf(),
                detail: format!("{e:?}"),
            })?;
        Ok(doc.pages().len() as u32)
    }

    fn rasterize_page(
        &self,
        document: &Path,
        page_num: u32,
        dpi: u32,
    ) -> Result<DynamicImage, ConvertError> {
        let pdfium = Pdfium::default();
        let doc = pdfium
            .load_pdf_from_file(document, None)
            .map_err(|e| ConvertError::MetadataFailed {
                path: document.to_path_buf(),
                detail: format!("{e:?}"),
            })?;

        let pages = doc.pages();
        let page = pages
            .get((page_num - 1) as u16)
            .map_err(|e| ConvertError::RasterizeFailed {
                path: document.to_path_buf(),
                page: page_num,
                detail: format!("{e:?}"),
            })?;

        // PDF points are 1/72 inch, so the scale factor is dpi/72.
        let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

        let bitmap =
            page.render_with_config(&render_config)
                .map_err(|e| ConvertError::RasterizeFailed {
                    path: document.to_path_buf(),
                    page: page_num,
                    detail: format!("{e:?}"),
                })?;

        Ok(bitmap.as_image())
    }
}
