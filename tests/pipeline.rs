use std::cell::Cell;
use std::path::{Path, PathBuf};

use burn::backend::{Autodiff, NdArray};
use docclass::domain::traits::RecognizedToken;
use docclass::ml::backbone::create_backbone;
use docclass::ml::model::EncoderConfig;
use docclass::{
    Capability, ClassifierConfig, DocumentPipeline, Error, OcrConfig, OcrEngine, PageRasterizer,
    TextClassifier, TextRecognizer,
};
use image::{DynamicImage, Rgb, RgbImage};

type Backend = Autodiff<NdArray>;

/// Returns one scripted token list per call, in order.
struct PageScript {
    pages: Vec<Vec<RecognizedToken>>,
    next: Cell<usize>,
}

impl PageScript {
    fn new(pages: Vec<Vec<RecognizedToken>>) -> Self {
        Self {
            pages,
            next: Cell::new(0),
        }
    }
}

impl TextRecognizer for PageScript {
    fn recognize(&self, _image: &DynamicImage, _language: &str) -> docclass::Result<Vec<RecognizedToken>> {
        let index = self.next.get();
        self.next.set(index + 1);
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Pretends every PDF has `count` blank pages.
struct BlankPdf {
    count: usize,
}

impl PageRasterizer for BlankPdf {
    fn rasterize(&self, _path: &Path, _dpi: u32) -> docclass::Result<Vec<DynamicImage>> {
        Ok((0..self.count)
            .map(|_| DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))))
            .collect())
    }
}

fn classifier(dir: &Path) -> TextClassifier<Backend> {
    let backbone = dir.join("backbone");
    let corpus = vec!["Facture montant total".to_string(), "Lettre client".to_string()];
    let config = EncoderConfig::new(0)
        .with_max_position(32)
        .with_d_model(8)
        .with_num_heads(2)
        .with_num_layers(1)
        .with_d_ff(16);
    create_backbone(&backbone, &corpus, 50, config).unwrap();

    TextClassifier::new(
        ["facture", "autre"],
        ClassifierConfig {
            backbone,
            max_length: 32,
            seed: Some(11),
        },
        Default::default(),
    )
    .unwrap()
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.4").unwrap();
    path
}

#[test]
fn two_page_pdf_is_aggregated_and_classified() {
    let dir = tempfile::tempdir().unwrap();
    let recognizer = PageScript::new(vec![
        vec![
            RecognizedToken::new("", -1.0),
            RecognizedToken::new("Facture", 92.0),
        ],
        vec![RecognizedToken::new("   ", -1.0)],
    ]);
    let ocr = OcrEngine::new(
        OcrConfig::default(),
        Capability::Available(Box::new(recognizer)),
        Capability::Available(Box::new(BlankPdf { count: 2 })),
    )
    .unwrap();
    let clf = classifier(dir.path());
    let expected = clf.predict("Facture\n\n").unwrap();
    let pipeline = DocumentPipeline::new(ocr, clf);

    let record = pipeline.process(&touch(dir.path(), "scan.PDF")).unwrap();

    assert_eq!(record.page_count(), 2);
    assert_eq!(record.ocr_pages[0].page_number, 1);
    assert_eq!(record.ocr_pages[1].page_number, 2);
    assert_eq!(record.ocr_pages[1].confidence, None);
    assert_eq!(record.aggregated_text, "Facture\n\n");
    assert_eq!(record.mean_confidence, Some(92.0));
    assert_eq!(record.prediction, expected);
}

#[test]
fn record_serialises_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let recognizer = PageScript::new(vec![vec![RecognizedToken::new("Lettre", 0.0)]]);
    let ocr = OcrEngine::new(
        OcrConfig::default(),
        Capability::Available(Box::new(recognizer)),
        Capability::unavailable("pdfium", "not installed"),
    )
    .unwrap();
    let pipeline = DocumentPipeline::new(ocr, classifier(dir.path()));

    let scan = dir.path().join("letter.png");
    RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])).save(&scan).unwrap();
    let record = pipeline.process(&scan).unwrap();

    // a genuine zero confidence is kept
    assert_eq!(record.mean_confidence, Some(0.0));

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["aggregated_text"], "Lettre");
    assert_eq!(json["ocr_pages"][0]["page_number"], 1);
    assert!(json["prediction"]["label"].is_string());
}

#[test]
fn missing_document_fails_without_partial_result() {
    let dir = tempfile::tempdir().unwrap();
    let ocr = OcrEngine::new(
        OcrConfig::default(),
        Capability::Available(Box::new(PageScript::new(Vec::new()))),
        Capability::unavailable("pdfium", "not installed"),
    )
    .unwrap();
    let pipeline = DocumentPipeline::new(ocr, classifier(dir.path()));

    assert!(matches!(
        pipeline.bulk_process(&[dir.path().join("absent.png")]),
        Err(Error::NotFound(_))
    ));
}
