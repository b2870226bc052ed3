// ============================================================
// Layer 6 - Tesseract Recognizer
// ============================================================
// TextRecognizer backed by Tesseract through `leptess`.
//
// Tesseract reports its word table as TSV, one row per layout
// element (page, block, paragraph, line, word):
//
//   level page_num block_num par_num line_num word_num
//   left top width height conf text
//
// Non-word rows carry conf -1 and empty text. All rows are kept;
// the OCR engine drops blank text and the -1 sentinel itself.
//
// Initialising Tesseract loads the language data, so the adapter
// keeps one engine per language and reuses it for every page.
//
// The adapter is compiled with the `tesseract` feature only. The
// TSV parser and the engine cache are always available.

use std::cell::{RefCell, RefMut};
use std::collections::HashMap;

use crate::data::ocr::OcrConfig;
use crate::domain::traits::{Capability, RecognizedToken, TextRecognizer};
use crate::error::{Error, Result};

pub const CAPABILITY_NAME: &str = "tesseract";

const TSV_COLUMNS: usize = 12;
const CONF_COLUMN: usize = 10;
const TEXT_COLUMN: usize = 11;

/// Parse Tesseract TSV output into tokens.
///
/// The header row and rows that do not have 12 columns or a
/// numeric confidence are skipped.
pub fn parse_tsv(tsv: &str) -> Vec<RecognizedToken> {
    tsv.lines()
        .filter_map(|line| {
            let columns: Vec<&str> = line.splitn(TSV_COLUMNS, '\t').collect();
            if columns.len() != TSV_COLUMNS {
                return None;
            }
            let confidence = columns[CONF_COLUMN].trim().parse::<f32>().ok()?;
            Some(RecognizedToken::new(columns[TEXT_COLUMN], confidence))
        })
        .collect()
}

/// Engines keyed by language, created on first use.
pub struct EngineCache<E> {
    engines: RefCell<HashMap<String, E>>,
}

impl<E> EngineCache<E> {
    /// Store an engine that is already initialised for `language`.
    pub fn insert(&self, language: &str, engine: E) {
        self.engines.borrow_mut().insert(language.to_string(), engine);
    }

    /// The engine for `language`, built with `init` when missing.
    /// A failed `init` leaves the cache unchanged.
    pub fn get_or_init(
        &self,
        language: &str,
        init: impl FnOnce() -> Result<E>,
    ) -> Result<RefMut<'_, E>> {
        let mut engines = self.engines.borrow_mut();
        if !engines.contains_key(language) {
            engines.insert(language.to_string(), init()?);
        }
        RefMut::filter_map(engines, |engines| engines.get_mut(language))
            .map_err(|_| Error::Recognition(format!("no engine for language '{language}'")))
    }
}

impl<E> Default for EngineCache<E> {
    fn default() -> Self {
        Self {
            engines: RefCell::new(HashMap::new()),
        }
    }
}

/// Probe the Tesseract capability once, with `config.language`.
pub fn probe(config: &OcrConfig) -> Capability<Box<dyn TextRecognizer>> {
    imp::probe(config)
}

#[cfg(feature = "tesseract")]
mod imp {
    use std::{io::Cursor, path::PathBuf};

    use image::{DynamicImage, ImageFormat};
    use leptess::LepTess;

    use super::{parse_tsv, EngineCache, CAPABILITY_NAME};
    use crate::data::ocr::OcrConfig;
    use crate::domain::traits::{Capability, RecognizedToken, TextRecognizer};
    use crate::error::{Error, Result};

    pub struct TesseractRecognizer {
        tessdata_dir: Option<PathBuf>,
        engines: EngineCache<LepTess>,
    }

    impl TesseractRecognizer {
        fn engine(&self, language: &str) -> Result<LepTess> {
            let datapath = self.tessdata_dir.as_ref().and_then(|p| p.to_str());
            LepTess::new(datapath, language).map_err(|e| {
                Error::Recognition(format!(
                    "failed to initialise Tesseract with language '{language}': {e}"
                ))
            })
        }
    }

    impl TextRecognizer for TesseractRecognizer {
        fn recognize(&self, image: &DynamicImage, language: &str) -> Result<Vec<RecognizedToken>> {
            let mut lt = self
                .engines
                .get_or_init(language, || self.engine(language))?;

            // leptess decodes from an encoded buffer
            let mut png = Cursor::new(Vec::new());
            image.write_to(&mut png, ImageFormat::Png)?;
            lt.set_image_from_mem(png.get_ref())
                .map_err(|e| Error::Recognition(format!("failed to load page image: {e}")))?;

            let tsv = lt
                .get_tsv_text(0)
                .map_err(|e| Error::Recognition(format!("invalid Tesseract output: {e}")))?;
            Ok(parse_tsv(&tsv))
        }
    }

    pub fn probe(config: &OcrConfig) -> Capability<Box<dyn TextRecognizer>> {
        let recognizer = TesseractRecognizer {
            tessdata_dir: config.tessdata_dir.clone(),
            engines: EngineCache::default(),
        };
        match recognizer.engine(&config.language) {
            Ok(engine) => {
                recognizer.engines.insert(&config.language, engine);
                tracing::info!("Tesseract ready (language '{}')", config.language);
                Capability::Available(Box::new(recognizer))
            }
            Err(e) => Capability::unavailable(CAPABILITY_NAME, e.to_string()),
        }
    }
}

#[cfg(not(feature = "tesseract"))]
mod imp {
    use super::CAPABILITY_NAME;
    use crate::data::ocr::OcrConfig;
    use crate::domain::traits::{Capability, TextRecognizer};

    pub fn probe(_config: &OcrConfig) -> Capability<Box<dyn TextRecognizer>> {
        Capability::unavailable(
            CAPABILITY_NAME,
            "built without the `tesseract` feature",
        )
    }
}
