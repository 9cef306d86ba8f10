use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use crate::error::{DatasetError, DatasetResult};
use crate::format::DataFormat;

/// Where a dataset's raw bytes come from: a URL, a local file or inline
/// data. At most one may be set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSource {
    pub url: String,
    pub file: Option<PathBuf>,
    pub data: Vec<u8>,
    /// Required whenever a source is set.
    pub format: DataFormat,
}

impl DataSource {
    pub fn inline(data: impl Into<Vec<u8>>, format: DataFormat) -> Self {
        Self {
            data: data.into(),
            format,
            ..Default::default()
        }
    }

    pub fn file(path: impl Into<PathBuf>, format: DataFormat) -> Self {
        Self {
            file: Some(path.into()),
            format,
            ..Default::default()
        }
    }

    fn set_count(&self) -> usize {
        [!self.url.is_empty(), self.file.is_some(), !self.data.is_empty()]
            .iter()
            .filter(|set| **set)
            .count()
    }

    /// Reject more than one source, or a source without a format. An
    /// entirely empty source is valid.
    pub fn validate(&self) -> DatasetResult<()> {
        match self.set_count() {
            0 => Ok(()),
            1 if self.format.is_unknown() => Err(DatasetError::MissingFormat),
            1 => Ok(()),
            _ => Err(DatasetError::AmbiguousDataSource),
        }
    }

    /// Open the source for reading. Inline data is borrowed, files are
    /// opened as given. URLs are left to the caller.
    pub fn open(&self) -> DatasetResult<Box<dyn Read + '_>> {
        self.validate()?;
        if !self.data.is_empty() {
            return Ok(Box::new(Cursor::new(self.data.as_slice())));
        }
        if let Some(file) = &self.file {
            return Ok(Box::new(File::open(file)?));
        }
        if !self.url.is_empty() {
            return Err(DatasetError::UrlNotFetchable(self.url.clone()));
        }
        Err(DatasetError::NoDataSource)
    }

    /// Read the whole source. A relative file path is resolved against
    /// `base`.
    pub fn fetch_bytes(&self, base: &Path) -> DatasetResult<Vec<u8>> {
        self.validate()?;
        if !self.data.is_empty() {
            return Ok(self.data.clone());
        }
        if let Some(file) = &self.file {
            return Ok(std::fs::read(base.join(file))?);
        }
        let mut buf = Vec::new();
        self.open()?.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn only_one_source_allowed() {
        let src = DataSource {
            url: "https://example.com/a.csv".into(),
            data: b"a,b".to_vec(),
            format: DataFormat::Csv,
            ..Default::default()
        };
        assert!(matches!(src.validate(), Err(DatasetError::AmbiguousDataSource)));
        assert_eq!(
            src.validate().unwrap_err().to_string(),
            "only one of url, file, or data can be set"
        );
    }

    #[test]
    fn format_required_when_set() {
        let src = DataSource {
            data: b"a,b".to_vec(),
            ..Default::default()
        };
        assert!(matches!(src.validate(), Err(DatasetError::MissingFormat)));
        assert!(DataSource::default().validate().is_ok());
    }

    #[test]
    fn open_inline() {
        let src = DataSource::inline("1,2\n", DataFormat::Csv);
        let mut out = String::new();
        src.open().unwrap().read_to_string(&mut out).unwrap();
        assert_eq!(out, "1,2\n");
    }

    #[test]
    fn open_and_fetch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"[1,2,3]")
            .unwrap();

        let src = DataSource::file(&path, DataFormat::Json);
        let mut out = Vec::new();
        src.open().unwrap().read_to_end(&mut out).unwrap();
        assert_eq!(out, b"[1,2,3]");

        let relative = DataSource::file("data.json", DataFormat::Json);
        assert_eq!(relative.fetch_bytes(dir.path()).unwrap(), b"[1,2,3]");
    }

    #[test]
    fn url_and_empty_sources_cannot_open() {
        let url = DataSource {
            url: "https://example.com/a.csv".into(),
            format: DataFormat::Csv,
            ..Default::default()
        };
        assert!(matches!(url.open(), Err(DatasetError::UrlNotFetchable(_))));
        assert!(matches!(
            DataSource::default().open(),
            Err(DatasetError::NoDataSource)
        ));
    }
}
