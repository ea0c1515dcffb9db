//! Header and metadata blocks shared by both documents.
//!
//! ```xml
//! <HEADER>
//!   <TYPE>
//!     <EXTENSION_TABLE_NAME>GEB</EXTENSION_TABLE_NAME>
//!     <NAME>GEB1</NAME>
//!   </TYPE>
//!   <RUN>
//!     <RUN_NAME>...</RUN_NAME>
//!     <RUN_BEGIN_TIMESTAMP>...</RUN_BEGIN_TIMESTAMP>
//!     <COMMENT_DESCRIPTION>...</COMMENT_DESCRIPTION>
//!     <LOCATION>...</LOCATION>
//!     <INITIATED_BY_USER>...</INITIATED_BY_USER>
//!   </RUN>
//! </HEADER>
//! <METADATA>
//!   <COMMENT_DESCRIPTION/>
//!   <VERSION/>
//!   <KIND_OF_PART/>
//!   <SERIAL_NUMBER/>
//! </METADATA>
//! ```
//!
//! Every block has a fixed number of element children in a fixed order.

use roxmltree::Node;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::DocumentKind;
use crate::xml::accessor::{element_child_count, element_children, tag_name, text};
use crate::xml::Element;

pub const HEADER_TAG: &str = "HEADER";
pub const METADATA_TAG: &str = "METADATA";

const TYPE_TAG: &str = "TYPE";
const RUN_TAG: &str = "RUN";
const TYPE_FIELDS: [&str; 2] = ["EXTENSION_TABLE_NAME", "NAME"];
const RUN_FIELDS: [&str; 5] = [
    "RUN_NAME",
    "RUN_BEGIN_TIMESTAMP",
    "COMMENT_DESCRIPTION",
    "LOCATION",
    "INITIATED_BY_USER",
];
const METADATA_FIELDS: [&str; 4] = ["COMMENT_DESCRIPTION", "VERSION", "KIND_OF_PART", "SERIAL_NUMBER"];

/// Document type: extension table name and display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderType {
    /// Extension table name ("ETN"), e.g. `GEB`.
    pub type_tag: String,
    pub name: String,
}

/// Run record describing when and by whom the document was built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub config_name: String,
    pub build_time: String,
    pub comment: String,
    pub location: String,
    pub user: String,
}

/// Document header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "type")]
    pub type_: HeaderType,
    pub run: RunInfo,
}

/// Metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub comment: String,
    pub version: String,
    pub part_type: String,
    pub serial_number: String,
}

/// Parse the `HEADER` block under the document root.
pub fn parse_header(kind: DocumentKind, root: Node<'_, '_>) -> ConfigResult<Header> {
    let header = find_block(kind, root, HEADER_TAG)?;
    let [type_node, run_node] = fixed_children(kind, header, &[TYPE_TAG, RUN_TAG])?;

    let [type_tag, name] = field_values(kind, type_node, TYPE_FIELDS)?;
    let [config_name, build_time, comment, location, user] =
        field_values(kind, run_node, RUN_FIELDS)?;

    Ok(Header {
        type_: HeaderType { type_tag, name },
        run: RunInfo {
            config_name,
            build_time,
            comment,
            location,
            user,
        },
    })
}

/// Build the `HEADER` element.
pub fn encode_header(header: &Header) -> Element {
    let type_values = [header.type_.type_tag.as_str(), header.type_.name.as_str()];
    let run = &header.run;
    let run_values = [
        run.config_name.as_str(),
        run.build_time.as_str(),
        run.comment.as_str(),
        run.location.as_str(),
        run.user.as_str(),
    ];

    Element::new(HEADER_TAG)
        .child(field_block(TYPE_TAG, &TYPE_FIELDS, &type_values))
        .child(field_block(RUN_TAG, &RUN_FIELDS, &run_values))
}

/// Parse the `METADATA` block under the document root.
pub fn parse_metadata(kind: DocumentKind, root: Node<'_, '_>) -> ConfigResult<Metadata> {
    let block = find_block(kind, root, METADATA_TAG)?;
    let [comment, version, part_type, serial_number] = field_values(kind, block, METADATA_FIELDS)?;

    Ok(Metadata {
        comment,
        version,
        part_type,
        serial_number,
    })
}

/// Build the `METADATA` element.
pub fn encode_metadata(metadata: &Metadata) -> Element {
    let values = [
        metadata.comment.as_str(),
        metadata.version.as_str(),
        metadata.part_type.as_str(),
        metadata.serial_number.as_str(),
    ];
    field_block(METADATA_TAG, &METADATA_FIELDS, &values)
}

fn find_block<'a, 'input>(
    kind: DocumentKind,
    root: Node<'a, 'input>,
    tag: &str,
) -> ConfigResult<Node<'a, 'input>> {
    element_children(root)
        .find(|n| tag_name(*n) == tag)
        .ok_or_else(|| ConfigError::schema(kind, format!("missing <{}> block", tag)))
}

/// Check that `node` has exactly the expected element children, in order.
pub(crate) fn fixed_children<'a, 'input, const N: usize>(
    kind: DocumentKind,
    node: Node<'a, 'input>,
    tags: &[&str; N],
) -> ConfigResult<[Node<'a, 'input>; N]> {
    let count = element_child_count(node);
    if count != N {
        return Err(ConfigError::schema(
            kind,
            format!(
                "<{}> has {} child elements, expected {}",
                tag_name(node),
                count,
                N
            ),
        ));
    }

    let mut found = [node; N];
    for (i, child) in element_children(node).enumerate() {
        if tag_name(child) != tags[i] {
            return Err(ConfigError::schema(
                kind,
                format!(
                    "<{}> child {} is <{}>, expected <{}>",
                    tag_name(node),
                    i + 1,
                    tag_name(child),
                    tags[i]
                ),
            ));
        }
        found[i] = child;
    }
    Ok(found)
}

/// Read the text of each fixed field; absent text reads as empty.
fn field_values<const N: usize>(
    kind: DocumentKind,
    node: Node<'_, '_>,
    tags: [&str; N],
) -> ConfigResult<[String; N]> {
    let fields = fixed_children(kind, node, &tags)?;
    Ok(fields.map(|field| text(field).unwrap_or_default().to_string()))
}

fn field_block(tag: &str, fields: &[&str], values: &[&str]) -> Element {
    fields
        .iter()
        .zip(values)
        .fold(Element::new(tag), |block, (field, value)| {
            block.child(Element::with_text(*field, *value))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOBAL_HEADER: &str = r#"<ROOT>
  <HEADER>
    <TYPE>
      <EXTENSION_TABLE_NAME>GEB</EXTENSION_TABLE_NAME>
      <NAME>GEB1</NAME>
    </TYPE>
    <RUN>
      <RUN_NAME>cosmic-stand</RUN_NAME>
      <RUN_BEGIN_TIMESTAMP>2015-03-02 10:00:00</RUN_BEGIN_TIMESTAMP>
      <COMMENT_DESCRIPTION>first light</COMMENT_DESCRIPTION>
      <LOCATION/>
      <INITIATED_BY_USER>bob</INITIATED_BY_USER>
    </RUN>
  </HEADER>
  <METADATA>
    <COMMENT_DESCRIPTION>default biases</COMMENT_DESCRIPTION>
    <VERSION>2</VERSION>
    <KIND_OF_PART>GEM VFAT2</KIND_OF_PART>
    <SERIAL_NUMBER>0xf3a1</SERIAL_NUMBER>
  </METADATA>
</ROOT>"#;

    #[test]
    fn parses_type_and_run() {
        let doc = roxmltree::Document::parse(GLOBAL_HEADER).unwrap();
        let header = parse_header(DocumentKind::Global, doc.root_element()).unwrap();

        assert_eq!(header.type_.type_tag, "GEB");
        assert_eq!(header.type_.name, "GEB1");
        assert_eq!(header.run.config_name, "cosmic-stand");
        assert_eq!(header.run.build_time, "2015-03-02 10:00:00");
        assert_eq!(header.run.location, "");
        assert_eq!(header.run.user, "bob");
    }

    #[test]
    fn parses_metadata() {
        let doc = roxmltree::Document::parse(GLOBAL_HEADER).unwrap();
        let metadata = parse_metadata(DocumentKind::Global, doc.root_element()).unwrap();

        assert_eq!(metadata.comment, "default biases");
        assert_eq!(metadata.version, "2");
        assert_eq!(metadata.part_type, "GEM VFAT2");
        assert_eq!(metadata.serial_number, "0xf3a1");
    }

    #[test]
    fn run_with_missing_field_is_schema_error() {
        let xml = GLOBAL_HEADER.replace("<LOCATION/>", "");
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let err = parse_header(DocumentKind::Channel, doc.root_element()).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Schema {
                document: DocumentKind::Channel,
                ..
            }
        ));
        assert!(err.to_string().contains("<RUN> has 4 child elements"));
    }

    #[test]
    fn swapped_fields_are_schema_error() {
        let xml = GLOBAL_HEADER.replace(
            "<EXTENSION_TABLE_NAME>GEB</EXTENSION_TABLE_NAME>\n      <NAME>GEB1</NAME>",
            "<NAME>GEB1</NAME>\n      <EXTENSION_TABLE_NAME>GEB</EXTENSION_TABLE_NAME>",
        );
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let err = parse_header(DocumentKind::Global, doc.root_element()).unwrap_err();

        assert!(err.to_string().contains("expected <EXTENSION_TABLE_NAME>"));
    }

    #[test]
    fn missing_header_is_schema_error() {
        let doc = roxmltree::Document::parse("<ROOT><METADATA/></ROOT>").unwrap();
        let err = parse_header(DocumentKind::Global, doc.root_element()).unwrap_err();
        assert!(err.to_string().contains("missing <HEADER> block"));
    }

    #[test]
    fn encoded_header_parses_back() {
        let header = Header {
            type_: HeaderType {
                type_tag: "VFAT2_CHANNEL".into(),
                name: "GEB1 channels".into(),
            },
            run: RunInfo {
                config_name: "scan & trim".into(),
                build_time: "2015-03-02 10:00:00".into(),
                comment: String::new(),
                location: "904".into(),
                user: "alice".into(),
            },
        };
        let metadata = Metadata {
            version: "3".into(),
            ..Metadata::default()
        };

        let root = Element::new("ROOT")
            .child(encode_header(&header))
            .child(encode_metadata(&metadata));
        let xml = root.to_document_string();
        let doc = roxmltree::Document::parse(&xml).unwrap();

        assert_eq!(
            parse_header(DocumentKind::Channel, doc.root_element()).unwrap(),
            header
        );
        assert_eq!(
            parse_metadata(DocumentKind::Channel, doc.root_element()).unwrap(),
            metadata
        );
    }
}
