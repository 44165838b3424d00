use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::ZipArchive;

/// Why a manuscript file could not be turned into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type {0:?} (expected .txt or .docx)")]
    UnsupportedExtension(PathBuf),
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0:?} is not valid UTF-8")]
    Encoding(PathBuf),
    #[error("open .docx zip failed: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("missing word/document.xml")]
    MissingDocument,
    #[error("parse .docx XML failed: {0}")]
    Xml(String),
}

/// Reads a `.txt` or `.docx` manuscript into plain text.
pub fn extract_text(p: &Path) -> Result<String, ExtractionError> {
    let ext = p
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("txt") => extract_text_from_txt(p),
        Some("docx") => extract_text_from_docx(p),
        _ => Err(ExtractionError::UnsupportedExtension(p.to_path_buf())),
    }
}

pub fn extract_text_from_txt(p: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(p).map_err(|source| ExtractionError::Io {
        path: p.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| ExtractionError::Encoding(p.to_path_buf()))
}

pub fn extract_text_from_docx(p: &Path) -> Result<String, ExtractionError> {
    let file = File::open(p).map_err(|source| ExtractionError::Io {
        path: p.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(file)?;
    let mut doc = zip
        .by_name("word/document.xml")
        .map_err(|_| ExtractionError::MissingDocument)?;
    let mut xml = String::new();
    doc.read_to_string(&mut xml)
        .map_err(|source| ExtractionError::Io {
            path: p.join("word/document.xml"),
            source,
        })?;
    parse_docx_xml(&xml)
}

// ---- Internal helpers ----

fn parse_docx_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut out = String::new();
    // only <w:t> carries run text; whitespace between tags is layout
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = true,
                b"br" | b"cr" => out.push('\n'),
                b"tab" => out.push('\t'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"br" | b"cr" => out.push('\n'),
                b"tab" => out.push('\t'),
                _ => {}
            },
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                out.push_str(&String::from_utf8_lossy(&t));
            }
            Ok(Event::GeneralRef(r)) if in_text => {
                let entity = String::from_utf8_lossy(&r).into_owned();
                let resolved = resolve_entity(&entity)
                    .ok_or_else(|| ExtractionError::Xml(format!("unknown entity &{entity};")))?;
                out.push(resolved);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractionError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(normalize_whitespace(&out))
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

fn normalize_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut blank_pending = false;
    for raw_line in s.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            // leading blanks are dropped, any run in between keeps one blank line
            blank_pending = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_pending {
                out.push('\n');
            }
        }
        out.push_str(line);
        blank_pending = false;
    }
    out
}
