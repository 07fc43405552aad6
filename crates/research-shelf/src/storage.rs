//! PDF attachments on disk.
//!
//! Files live flat in one directory, named after the paper id with `:` and
//! `/` replaced so OpenAlex URLs become valid file names. The public path
//! returned to clients is `/pdfs/{name}.pdf`.

use std::path::PathBuf;

use crate::error::{StorageError, StorageResult};

/// Directory of uploaded PDFs.
#[derive(Debug, Clone)]
pub struct PdfStorage {
    dir: PathBuf,
}

impl PdfStorage {
    /// Use `dir` for PDF files, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        Ok(Self { dir })
    }

    /// File stem for a paper id.
    #[must_use]
    pub fn safe_filename(paper_id: &str) -> String {
        paper_id.replace([':', '/'], "_")
    }

    /// Where the PDF for a paper is (or would be) stored.
    #[must_use]
    pub fn path_for(&self, paper_id: &str) -> PathBuf {
        self.dir.join(format!("{}.pdf", Self::safe_filename(paper_id)))
    }

    /// Write the PDF for a paper, replacing any previous file.
    ///
    /// Returns the public path to record on the paper.
    pub async fn save(&self, paper_id: &str, bytes: &[u8]) -> StorageResult<String> {
        let path = self.path_for(paper_id);
        tokio::fs::write(&path, bytes).await.map_err(|e| StorageError::io(&path, e))?;

        tracing::info!(paper_id, path = %path.display(), size = bytes.len(), "Stored PDF");
        Ok(format!("/pdfs/{}.pdf", Self::safe_filename(paper_id)))
    }

    /// Read the PDF for a paper, if one is stored.
    pub async fn read(&self, paper_id: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(paper_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    /// Remove the PDF for a paper. Returns whether a file was deleted.
    pub async fn delete(&self, paper_id: &str) -> StorageResult<bool> {
        let path = self.path_for(paper_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(paper_id, "Deleted PDF");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename() {
        assert_eq!(
            PdfStorage::safe_filename("https://openalex.org/W2741809807"),
            "https___openalex.org_W2741809807"
        );
        assert_eq!(PdfStorage::safe_filename("W1"), "W1");
    }

    #[test]
    fn test_new_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("pdfs");
        let storage = PdfStorage::new(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(storage.path_for("a:b"), dir.join("a_b.pdf"));
    }

    #[test]
    fn test_save_read_delete() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = PdfStorage::new(tmp.path()).unwrap();

        tokio_test::block_on(async {
            let public = storage.save("https://openalex.org/W1", b"%PDF-1.4").await.unwrap();
            assert_eq!(public, "/pdfs/https___openalex.org_W1.pdf");
            assert!(storage.path_for("https://openalex.org/W1").is_file());
            assert_eq!(
                storage.read("https://openalex.org/W1").await.unwrap().as_deref(),
                Some(&b"%PDF-1.4"[..])
            );

            assert!(storage.delete("https://openalex.org/W1").await.unwrap());
            assert!(!storage.delete("https://openalex.org/W1").await.unwrap());
            assert!(storage.read("https://openalex.org/W1").await.unwrap().is_none());
        });
    }
}
