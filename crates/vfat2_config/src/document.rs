//! Whole-document parse and encode for one document kind.
//!
//! Ties the header codec and the dataset codec together under the common
//! `ROOT > HEADER, METADATA, DATA_SET` layout.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dataset::{encode_dataset, parse_dataset};
use crate::error::{ConfigError, ConfigResult};
use crate::header::{
    encode_header, encode_metadata, fixed_children, parse_header, parse_metadata, Header,
    Metadata, HEADER_TAG, METADATA_TAG,
};
use crate::model::SettingsModel;
use crate::registers::NameTranslator;
use crate::schema::DocumentKind;
use crate::xml::accessor::tag_name;
use crate::xml::Element;

/// Header and metadata of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub header: Header,
    pub metadata: Metadata,
}

/// Everything decoded from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub record: DocumentRecord,
    /// Settings of this document's scope only.
    pub settings: SettingsModel,
}

/// Parse the text of a document.
///
/// `path` is only used to label errors.
pub fn parse_document(
    kind: DocumentKind,
    xml: &str,
    path: &Path,
    translator: &dyn NameTranslator,
) -> ConfigResult<ParsedDocument> {
    let schema = kind.schema();
    let doc = roxmltree::Document::parse(xml).map_err(|e| ConfigError::MalformedDocument {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let root = doc.root_element();
    if tag_name(root) != schema.root {
        return Err(ConfigError::schema(
            kind,
            format!("root element must be <{}>, found <{}>", schema.root, tag_name(root)),
        ));
    }
    let [_, _, dataset] =
        fixed_children(kind, root, &[HEADER_TAG, METADATA_TAG, schema.dataset_tag()])?;

    let header = parse_header(kind, root)?;
    let metadata = parse_metadata(kind, root)?;

    let mut settings = SettingsModel::new();
    parse_dataset(schema, dataset, translator, &mut settings)?;

    tracing::debug!(
        "Parsed {} document '{}' with {} setting(s)",
        kind,
        header.type_.name,
        settings.len()
    );

    Ok(ParsedDocument {
        record: DocumentRecord { header, metadata },
        settings,
    })
}

/// Build the element tree of a document from its record and the settings
/// model. Only settings in the document's scope are written.
pub fn encode_document(
    kind: DocumentKind,
    record: &DocumentRecord,
    settings: &SettingsModel,
    translator: &dyn NameTranslator,
) -> ConfigResult<Element> {
    let schema = kind.schema();
    let dataset = encode_dataset(schema, &record.header.type_.name, settings, translator)?;

    Ok(Element::new(schema.root)
        .child(encode_header(&record.header))
        .child(encode_metadata(&record.metadata))
        .child(dataset))
}
