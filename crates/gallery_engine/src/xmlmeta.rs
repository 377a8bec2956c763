use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::record::{DateStyle, PhotoRecord, SourceDate, SourceSet};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum XmlMetaError {
    #[error("malformed xml metadata: {0}")]
    Malformed(String),
}

/// Normalizes one XML metadata document into a `PhotoRecord`.
///
/// The schema is fixed: the first `<text>` element under `<asset>` carries
/// the metadata; within it, `<name>` nodes under the first `<org>` feed the
/// author, and `<date>` / `<description>` nodes feed their fields directly.
/// Repeated nodes for one field are joined with `", "`. Keywords never come
/// from this format.
pub fn parse_xml_metadata(
    identifier: &str,
    sources: SourceSet,
    input: &str,
) -> Result<PhotoRecord, XmlMetaError> {
    let mut record = PhotoRecord::new(identifier, sources);

    let mut reader = Reader::from_str(input);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = true;

    let mut path: Vec<String> = Vec::new();
    let mut text_blocks = 0usize;
    let mut orgs = 0usize;
    let mut names: Vec<String> = Vec::new();
    let mut dates: Vec<String> = Vec::new();
    let mut descriptions: Vec<String> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|err| XmlMetaError::Malformed(err.to_string()))?;
        match event {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if path_is(&path, &["asset"]) && name == "text" {
                    text_blocks += 1;
                }
                if path_is(&path, &["asset", "text"]) && name == "org" && text_blocks == 1 {
                    orgs += 1;
                }
                path.push(name);
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Text(text) => {
                let value = text
                    .unescape()
                    .map_err(|err| XmlMetaError::Malformed(err.to_string()))?
                    .into_owned();
                if text_blocks == 1 {
                    if path_is(&path, &["asset", "text", "org", "name"]) && orgs == 1 {
                        names.push(value);
                    } else if path_is(&path, &["asset", "text", "date"]) {
                        dates.push(value);
                    } else if path_is(&path, &["asset", "text", "description"]) {
                        descriptions.push(value);
                    }
                }
            }
            Event::Eof => {
                if !path.is_empty() {
                    return Err(XmlMetaError::Malformed(format!(
                        "unexpected end of document inside <{}>",
                        path.join("><")
                    )));
                }
                break;
            }
            _ => {}
        }
    }

    record.author = join_nodes(&names);
    if let Some(text) = join_nodes(&dates) {
        record.capture_date = Some(SourceDate {
            style: DateStyle::YearMonthDay,
            text,
        });
    }
    record.description = join_nodes(&descriptions);
    Ok(record)
}

fn path_is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}

fn join_nodes(values: &[String]) -> Option<String> {
    let joined = values.join(", ").trim().to_string();
    (!joined.is_empty()).then_some(joined)
}
