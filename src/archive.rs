//! ZIP container access for XLSX workbooks.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// An XLSX package opened from a file or byte buffer.
///
/// Wraps the underlying ZIP archive and provides decoded access to the XML
/// parts a workbook is made of. Opening validates that the input is a ZIP
/// archive containing `xl/workbook.xml`; anything else is a format error.
pub struct XlsxArchive {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl XlsxArchive {
    /// Open an XLSX package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Open an XLSX package from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if data.len() < 4 || data[..4] != ZIP_MAGIC {
            return Err(Error::Format("not a ZIP archive".to_string()));
        }

        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        let this = Self {
            archive: RefCell::new(archive),
        };

        if !this.exists("xl/workbook.xml") {
            return Err(Error::Format(
                "missing xl/workbook.xml, not an Excel workbook".to_string(),
            ));
        }

        Ok(this)
    }

    /// Read an XML part from the archive as a decoded string.
    ///
    /// Handles UTF-8 (with or without BOM) and UTF-16 LE/BE. Returns a
    /// format error naming the part when it is absent.
    pub fn read_xml(&self, part: &str) -> Result<String> {
        let bytes = self.read_part(part)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a raw part from the archive.
    pub fn read_part(&self, part: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive
            .by_name(part)
            .map_err(|_| Error::Format(format!("missing part: {}", part)))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, part: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == part)
    }
}

impl std::fmt::Debug for XlsxArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxArchive")
            .field("parts", &self.archive.borrow().len())
            .finish()
    }
}

/// Decode XML bytes handling different encodings (UTF-8, UTF-16 LE/BE).
///
/// Workbook parts are almost always UTF-8, but some producers emit UTF-16.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        // UTF-8 BOM
        return String::from_utf8(bytes[3..].to_vec())
            .map_err(|e| Error::Format(format!("invalid UTF-8: {}", e)));
    }

    if bytes.starts_with(&[0xFF, 0xFE]) {
        // UTF-16 LE BOM
        return Ok(fix_encoding_declaration(&decode_utf16(&bytes[2..], u16::from_le_bytes)?));
    }

    if bytes.starts_with(&[0xFE, 0xFF]) {
        // UTF-16 BE BOM
        return Ok(fix_encoding_declaration(&decode_utf16(&bytes[2..], u16::from_be_bytes)?));
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(_) => {
            // No BOM and not UTF-8: guess UTF-16 endianness from the null
            // byte positions of an ASCII-heavy prolog.
            if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
                Ok(fix_encoding_declaration(&decode_utf16(bytes, u16::from_le_bytes)?))
            } else if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
                Ok(fix_encoding_declaration(&decode_utf16(bytes, u16::from_be_bytes)?))
            } else {
                Ok(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> Result<String> {
    let len = bytes.len() & !1;
    let units = (0..len).step_by(2).map(|i| combine([bytes[i], bytes[i + 1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::Format(format!("invalid UTF-16: {}", e)))
}

/// Rewrite a UTF-16 encoding declaration after decoding to a Rust string.
///
/// quick-xml would otherwise try to re-interpret the already-decoded text
/// as UTF-16.
fn fix_encoding_declaration(content: &str) -> String {
    if let Some(end) = content.find("?>").filter(|_| content.starts_with("<?xml")) {
        let (decl, rest) = content.split_at(end + 2);
        let fixed = decl
            .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
            .replace("encoding='UTF-16'", "encoding='UTF-8'")
            .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
            .replace("encoding='utf-16'", "encoding='UTF-8'");
        return format!("{}{}", fixed, rest);
    }
    content.to_string()
}
