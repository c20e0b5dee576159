//! Pre-filter for uploaded fingerprint files.
//!
//! Only the file name is inspected. This keeps obviously wrong uploads away
//! from identification; it is not a security control.

use crate::errors::{MissingInput, ServiceError};

#[derive(Clone, Debug)]
pub struct UploadPolicy {
    allowed_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(["wsq", "jpg", "jpeg", "png"])
    }
}

impl UploadPolicy {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { allowed_extensions }
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Validate an uploaded file name and return it as the fingerprint
    /// reference. `None` means the form carried no file at all.
    pub fn check<'a>(&self, filename: Option<&'a str>) -> Result<&'a str, ServiceError> {
        let name = filename.ok_or(ServiceError::MissingInput(MissingInput::FingerprintFile))?;
        if name.is_empty() {
            return Err(ServiceError::MissingInput(MissingInput::FingerprintName));
        }
        let ext = match name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => String::new(),
        };
        if ext.is_empty() || !self.allowed_extensions.iter().any(|a| *a == ext) {
            return Err(ServiceError::UnsupportedFileType {
                filename: name.to_string(),
                allowed: self.allowed_extensions.clone(),
            });
        }
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_extensions_case_insensitively() {
        let p = UploadPolicy::default();
        assert_eq!(p.check(Some("f1.jpg")).unwrap(), "f1.jpg");
        assert_eq!(p.check(Some("LEFT.THUMB.WSQ")).unwrap(), "LEFT.THUMB.WSQ");
        assert!(p.check(Some("scan.Png")).is_ok());
    }

    #[test]
    fn rejects_missing_and_unknown() {
        let p = UploadPolicy::default();
        assert_eq!(p.check(None), Err(ServiceError::MissingInput(MissingInput::FingerprintFile)));
        assert_eq!(p.check(Some("")), Err(ServiceError::MissingInput(MissingInput::FingerprintName)));
        assert!(matches!(p.check(Some("notes.txt")), Err(ServiceError::UnsupportedFileType { .. })));
        assert!(matches!(p.check(Some("jpg")), Err(ServiceError::UnsupportedFileType { .. })));
        assert!(matches!(p.check(Some("trailing.")), Err(ServiceError::UnsupportedFileType { .. })));
    }

    #[test]
    fn configured_extensions_are_normalized() {
        let p = UploadPolicy::new([".BMP", " tif "]);
        assert_eq!(p.allowed_extensions(), ["bmp", "tif"]);
        assert!(p.check(Some("x.bmp")).is_ok());
        assert!(p.check(Some("x.jpg")).is_err());
    }
}
