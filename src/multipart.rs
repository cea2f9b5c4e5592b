use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Where the bytes of a file part come from
pub enum FileSource {
    /// Content held in memory
    Bytes(Vec<u8>),
    /// A path, opened when the part is staged on a request
    Path(PathBuf),
    /// Any readable source; dropped once its content has been written
    Reader(Box<dyn Read + Send>),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            FileSource::Path(path) => write!(f, "Path({})", path.display()),
            FileSource::Reader(_) => write!(f, "Reader"),
        }
    }
}

/// A file uploaded as one part of a `multipart/form-data` body
#[derive(Debug)]
pub struct FilePart {
    field: String,
    file_name: String,
    source: FileSource,
    mime: Option<String>,
}

impl FilePart {
    /// A part whose content is given up front
    pub fn with_content(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            source: FileSource::Bytes(content.into()),
            mime: None,
        }
    }

    /// A part read from a file on disk; the file name is taken from the path
    pub fn with_path(field: impl Into<String>, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            field: field.into(),
            file_name,
            source: FileSource::Path(path.to_path_buf()),
            mime: None,
        }
    }

    /// A part streamed from an arbitrary reader
    pub fn with_reader<R>(field: impl Into<String>, file_name: impl Into<String>, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            source: FileSource::Reader(Box::new(reader)),
            mime: None,
        }
    }

    /// Set an explicit MIME type instead of inferring one from the file name
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    /// Rename the uploaded file
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    /// Get the form field name
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the uploaded file name
    pub fn get_file_name(&self) -> &str {
        &self.file_name
    }

    /// Get the explicit MIME type, if any
    pub fn get_mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// Get the content source
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Check the part is complete and open its path source.
    ///
    /// Runs when the part is staged, so a missing file fails before any
    /// body is built.
    pub(crate) fn prepare(mut self) -> Result<Self> {
        if self.field.is_empty() {
            return Err(self.error(invalid_input("field name is empty")));
        }
        if self.file_name.is_empty() {
            return Err(self.error(invalid_input("file name is empty")));
        }
        self.check_line_breaks()?;
        if let FileSource::Path(path) = &self.source {
            let file = File::open(path).map_err(|e| self.error(e))?;
            self.source = FileSource::Reader(Box::new(file));
        }
        Ok(self)
    }

    /// The content type written into the part headers
    fn content_type(&self) -> String {
        match &self.mime {
            Some(mime) => mime.clone(),
            None => mime_guess::from_path(&self.file_name)
                .first_or_octet_stream()
                .to_string(),
        }
    }

    // Names and the MIME type land in part headers
    fn check_line_breaks(&self) -> Result<()> {
        let headers = [
            ("field name", Some(self.field.as_str())),
            ("file name", Some(self.file_name.as_str())),
            ("mime type", self.mime.as_deref()),
        ];
        for (what, value) in headers {
            if value.map_or(false, has_line_break) {
                let message = format!("{} contains a line break", what);
                return Err(self.error(invalid_input(&message)));
            }
        }
        Ok(())
    }

    fn error(&self, source: io::Error) -> Error {
        Error::invalid_file(self.field.clone(), self.file_name.clone(), source)
    }
}

fn has_line_break(value: &str) -> bool {
    value.contains(['\r', '\n'])
}

fn invalid_input(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}

/// Writes a `multipart/form-data` body into an in-memory buffer
#[derive(Debug)]
pub struct MultipartWriter {
    buffer: Vec<u8>,
    boundary: String,
    parts: usize,
}

impl MultipartWriter {
    /// Create a writer with a random boundary
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Create a writer with a fixed boundary
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            buffer: Vec::new(),
            boundary: boundary.into(),
            parts: 0,
        }
    }

    /// Get the boundary
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The `Content-Type` header value for this body
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Get the number of parts written so far
    pub fn part_count(&self) -> usize {
        self.parts
    }

    /// Write a file part, consuming (and so closing) its source
    pub fn write_file(&mut self, part: FilePart) -> Result<()> {
        part.check_line_breaks()?;
        let disposition = format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape_quotes(&part.field),
            escape_quotes(&part.file_name)
        );
        let content_type = part.content_type();
        self.begin_part(&[
            ("Content-Disposition", disposition.as_str()),
            ("Content-Type", content_type.as_str()),
        ]);

        let FilePart {
            field,
            file_name,
            source,
            ..
        } = part;
        match source {
            FileSource::Bytes(bytes) => self.buffer.extend_from_slice(&bytes),
            FileSource::Path(path) => {
                let mut file =
                    File::open(&path).map_err(|e| Error::invalid_file(&field, &file_name, e))?;
                io::copy(&mut file, &mut self.buffer)
                    .map_err(|e| Error::invalid_file(&field, &file_name, e))?;
            }
            FileSource::Reader(mut reader) => {
                io::copy(&mut reader, &mut self.buffer)
                    .map_err(|e| Error::invalid_file(&field, &file_name, e))?;
            }
        }
        Ok(())
    }

    /// Write a plain form field
    pub fn write_field(&mut self, name: &str, value: &str) -> Result<()> {
        if has_line_break(name) {
            return Err(Error::invalid_form(format!(
                "field name {:?} contains a line break",
                name
            )));
        }
        let disposition = format!("form-data; name=\"{}\"", escape_quotes(name));
        self.begin_part(&[("Content-Disposition", disposition.as_str())]);
        self.buffer.extend_from_slice(value.as_bytes());
        Ok(())
    }

    /// Write the closing boundary and return the body with its content type
    pub fn finish(mut self) -> (Vec<u8>, String) {
        let content_type = self.content_type();
        if self.parts > 0 {
            self.buffer.extend_from_slice(b"\r\n");
        }
        self.buffer.extend_from_slice(b"--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
        self.buffer.extend_from_slice(b"--\r\n");
        (self.buffer, content_type)
    }

    fn begin_part(&mut self, headers: &[(&str, &str)]) {
        if self.parts > 0 {
            self.buffer.extend_from_slice(b"\r\n");
        }
        self.buffer.extend_from_slice(b"--");
        self.buffer.extend_from_slice(self.boundary.as_bytes());
        self.buffer.extend_from_slice(b"\r\n");
        for (name, value) in headers {
            self.buffer.extend_from_slice(name.as_bytes());
            self.buffer.extend_from_slice(b": ");
            self.buffer.extend_from_slice(value.as_bytes());
            self.buffer.extend_from_slice(b"\r\n");
        }
        self.buffer.extend_from_slice(b"\r\n");
        self.parts += 1;
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Generate a random boundary for multipart forms
fn generate_boundary() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    format!("----RequestyFormBoundary{}", hex::encode(bytes))
}
