//! Resume text extraction. The pipeline treats this as an opaque text
//! producer; only PDF uploads are accepted for now.

use crate::errors::AppError;

pub fn extract_resume_text(filename: &str, bytes: &[u8]) -> Result<String, AppError> {
    if !has_pdf_extension(filename) {
        return Err(AppError::Validation(
            "Only PDF resumes are supported right now".to_string(),
        ));
    }

    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Validation(format!("Failed to read PDF: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume PDF contains no extractable text".to_string(),
        ));
    }

    Ok(text)
}

fn has_pdf_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_detection() {
        assert!(has_pdf_extension("resume.pdf"));
        assert!(has_pdf_extension("resume.PDF"));
        assert!(!has_pdf_extension("resume.docx"));
        assert!(!has_pdf_extension("resume"));
    }

    #[test]
    fn test_non_pdf_upload_is_rejected() {
        let result = extract_resume_text("resume.docx", b"not a pdf");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
