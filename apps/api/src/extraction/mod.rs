//! Resume text extraction — turns an uploaded PDF into plain text.
//!
//! Text is pulled page by page in document order and concatenated. No layout
//! analysis or field extraction happens here; downstream prompts get the raw text.

use pdf_extract::Document;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("upload is not a readable PDF: {0}")]
    DocumentFormat(String),
}

/// Extracts the text layer of a PDF held in memory.
///
/// A document whose pages carry no text layer (scanned images) yields an empty
/// string rather than an error. Each text-bearing page ends with a newline, so
/// a one-page resume comes back as its text plus a trailing `\n`.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::DocumentFormat(e.to_string()))?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    debug!("Extracting text from {} page(s)", page_numbers.len());

    let pages = page_numbers.into_iter().map(|page| match doc.extract_text(&[page]) {
        Ok(text) => text,
        Err(e) => {
            warn!("Page {page} has no extractable text: {e}");
            String::new()
        }
    });

    Ok(concat_pages(pages))
}

/// Appends page texts in the order given.
fn concat_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = String>,
{
    pages.into_iter().fold(String::new(), |mut acc, page| {
        acc.push_str(&page);
        acc
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::pdf_with_pages;
    use super::*;

    const RESUME: &str = "Experienced backend engineer, 5 years Go, Kubernetes.";

    #[test]
    fn test_single_page_resume_text_is_extracted() {
        let text = extract_pdf_text(&pdf_with_pages(&[RESUME])).unwrap();
        assert_eq!(text.trim_end(), RESUME);
    }

    #[test]
    fn test_pages_are_concatenated_in_document_order() {
        let text = extract_pdf_text(&pdf_with_pages(&["first", "second"])).unwrap();
        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        assert!(first < second);
        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), ["first", "second"]);
    }

    #[test]
    fn test_extracted_length_grows_with_added_pages() {
        let one = extract_pdf_text(&pdf_with_pages(&["Go"])).unwrap();
        let two = extract_pdf_text(&pdf_with_pages(&["Go", "Kubernetes"])).unwrap();
        assert!(two.len() >= one.len());
        assert!(two.starts_with(&one));
    }

    #[test]
    fn test_pdf_without_text_layer_yields_empty_string() {
        let text = extract_pdf_text(&pdf_with_pages(&[""])).unwrap();
        assert_eq!(text.trim(), "");
    }

    #[test]
    fn test_non_pdf_bytes_are_a_format_error() {
        let err = extract_pdf_text(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::DocumentFormat(_)));
    }

    #[test]
    fn test_empty_upload_is_a_format_error() {
        assert!(extract_pdf_text(&[]).is_err());
    }

    #[test]
    fn test_concat_preserves_page_order() {
        let text = concat_pages(vec!["first ".to_string(), "second ".to_string(), "third".to_string()]);
        assert_eq!(text, "first second third");
    }

    #[test]
    fn test_concat_of_no_pages_is_empty() {
        assert_eq!(concat_pages(Vec::new()), "");
    }

    #[test]
    fn test_concat_length_never_shrinks_as_pages_are_added() {
        let pages = ["Experienced backend engineer", "", "5 years Go", "Kubernetes."];
        let mut previous = 0;
        for n in 0..=pages.len() {
            let text = concat_pages(pages[..n].iter().map(|p| p.to_string()));
            assert!(text.len() >= previous, "length dropped after {n} pages");
            previous = text.len();
        }
    }

    #[test]
    fn test_image_only_pages_contribute_nothing() {
        let text = concat_pages(vec![String::new(), String::new()]);
        assert!(text.is_empty());
    }
}
