//! schema.org Person documents.
//!
//! # Responsibility
//! - Render one canonical identity as a microdata `Person` fragment.
//! - Write one document per live identity into the output directory.
//!
//! # Invariants
//! - Document filename is `Identity::filename()`, fixed by the primary email.
//! - A failure for one identity is reported and never stops the others.

use crate::model::identity::IdentityId;
use crate::store::identity_store::IdentityStore;
use log::{error, info};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

pub const PERSON_ITEMTYPE: &str = "http://schema.org/Person";

/// Rendering or writing error for one identity document.
#[derive(Debug)]
pub enum RenderError {
    UnknownIdentity(IdentityId),
    /// Filename would escape the output directory.
    UnsafeFilename(String),
    Xml(String),
    Io(std::io::Error),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownIdentity(id) => write!(f, "identity not found: {id}"),
            Self::UnsafeFilename(name) => write!(f, "unsafe document filename: `{name}`"),
            Self::Xml(message) => write!(f, "markup writer failed: {message}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// One identity document that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub filename: String,
    pub error: String,
}

/// Outcome of writing every identity document.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    pub written: usize,
    pub failures: Vec<WriteFailure>,
}

/// Renders the canonical record behind `id` as a Person fragment.
pub fn render_person(store: &IdentityStore, id: IdentityId) -> Result<String, RenderError> {
    let identity = store.get(id).ok_or(RenderError::UnknownIdentity(id))?;
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(
        &mut writer,
        Event::Start(
            BytesStart::new("div")
                .with_attributes([("itemscope", ""), ("itemtype", PERSON_ITEMTYPE)]),
        ),
    )?;
    emit_text_element(
        &mut writer,
        BytesStart::new("span").with_attributes([("itemprop", "name")]),
        identity.name(),
    )?;
    for email in identity.emails() {
        emit_text_element(
            &mut writer,
            BytesStart::new("span").with_attributes([("itemprop", "email")]),
            email,
        )?;
    }
    for related in identity.relations() {
        let Some(relation) = store.get(*related) else {
            continue;
        };
        let href = relation.filename();
        emit_text_element(
            &mut writer,
            BytesStart::new("a").with_attributes([("href", href.as_str()), ("itemprop", "knows")]),
            relation.name(),
        )?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("div")))?;

    let mut document =
        String::from_utf8(writer.into_inner()).map_err(|err| RenderError::Xml(err.to_string()))?;
    document.push('\n');
    Ok(document)
}

/// Writes one document per live identity into `output_dir`.
pub fn write_documents(store: &IdentityStore, output_dir: &Path) -> WriteReport {
    let mut report = WriteReport::default();
    for (id, identity) in store.identities() {
        let filename = identity.filename();
        match write_document(store, id, output_dir, &filename) {
            Ok(()) => report.written += 1,
            Err(err) => {
                error!(
                    "event=document_write module=render status=error file={} error={}",
                    filename, err
                );
                report.failures.push(WriteFailure {
                    filename,
                    error: err.to_string(),
                });
            }
        }
    }
    info!(
        "event=document_write module=render status=ok written={} failed={}",
        report.written,
        report.failures.len()
    );
    report
}

fn write_document(
    store: &IdentityStore,
    id: IdentityId,
    output_dir: &Path,
    filename: &str,
) -> Result<(), RenderError> {
    if filename.contains(['/', '\\']) || filename.starts_with('.') {
        return Err(RenderError::UnsafeFilename(filename.to_string()));
    }
    let document = render_person(store, id)?;
    fs::write(output_dir.join(filename), document)?;
    Ok(())
}

fn emit_text_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), RenderError> {
    let end = start.to_end().into_owned();
    emit(writer, Event::Start(start))?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    emit(writer, Event::End(end))
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), RenderError> {
    writer
        .write_event(event)
        .map_err(|err| RenderError::Xml(err.to_string()))
}
