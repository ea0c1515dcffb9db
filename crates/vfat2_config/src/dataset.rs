//! Dataset codec: a schema-driven walk over `DATA_SET > PART.. > DATA`.
//!
//! Parsing decodes every leaf into a settings-model entry; encoding rebuilds
//! the same tree from the model. The nesting and the register set come from
//! the [`Schema`], so both document kinds share this code.

use roxmltree::Node;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{SettingKey, SettingValue, SettingsModel};
use crate::registers::{NameTranslator, RegisterScope};
use crate::schema::Schema;
use crate::xml::accessor::{
    attribute, child_count, element_child_count, element_children, tag_name, text,
};
use crate::xml::Element;

/// Decode a dataset element into `model`.
///
/// Fails on the first structural problem or untranslatable leaf; callers
/// that need atomicity should pass a scratch model.
pub fn parse_dataset(
    schema: &Schema,
    dataset: Node<'_, '_>,
    translator: &dyn NameTranslator,
    model: &mut SettingsModel,
) -> ConfigResult<()> {
    if tag_name(dataset) != schema.dataset_tag() {
        return Err(ConfigError::schema(
            schema.kind,
            format!(
                "expected <{}>, found <{}>",
                schema.dataset_tag(),
                tag_name(dataset)
            ),
        ));
    }
    if schema.levels.len() < 2 {
        return Err(ConfigError::schema(
            schema.kind,
            "schema needs a dataset level above its parts",
        ));
    }
    walk_container(schema, dataset, 0, None, translator, model)
}

fn walk_container(
    schema: &Schema,
    node: Node<'_, '_>,
    depth: usize,
    channel: Option<u8>,
    translator: &dyn NameTranslator,
    model: &mut SettingsModel,
) -> ConfigResult<()> {
    let innermost = depth + 1 == schema.levels.len();
    let child_tag = if innermost {
        schema.leaf
    } else {
        schema.levels[depth + 1]
    };
    let child_is_part = depth + 2 == schema.levels.len();

    tracing::trace!(
        "{} <{}>: {} {} element(s) among {} node(s)",
        schema.kind,
        tag_name(node),
        element_child_count(node),
        child_tag,
        child_count(node)
    );

    for (position, child) in element_children(node).enumerate() {
        if tag_name(child) != child_tag {
            return Err(ConfigError::schema(
                schema.kind,
                format!(
                    "<{}> contains <{}>, expected only <{}>",
                    tag_name(node),
                    tag_name(child),
                    child_tag
                ),
            ));
        }

        if innermost {
            decode_leaf(schema, child, channel, translator, model)?;
        } else {
            let channel = if child_is_part {
                part_channel(schema, child, position + 1)?
            } else {
                channel
            };
            walk_container(schema, child, depth + 1, channel, translator, model)?;
        }
    }
    Ok(())
}

/// Channel named by a part: its channel attribute, else its 1-based position.
fn part_channel(schema: &Schema, part: Node<'_, '_>, position: usize) -> ConfigResult<Option<u8>> {
    let Some(key) = schema.channel_attribute else {
        return Ok(None);
    };

    let channel = match attribute(part, key) {
        Some(raw) => raw.trim().parse::<u8>().map_err(|_| {
            ConfigError::schema(schema.kind, format!("invalid {} attribute '{}'", key, raw))
        })?,
        None => u8::try_from(position).map_err(|_| {
            ConfigError::schema(schema.kind, format!("part {} has no {} attribute", position, key))
        })?,
    };

    if !schema.channels.contains(&channel) {
        return Err(ConfigError::schema(
            schema.kind,
            format!(
                "channel {} outside {}..={}",
                channel,
                schema.channels.start(),
                schema.channels.end()
            ),
        ));
    }
    Ok(Some(channel))
}

/// Decode one `DATA` leaf and store it in the model.
fn decode_leaf(
    schema: &Schema,
    leaf: Node<'_, '_>,
    channel: Option<u8>,
    translator: &dyn NameTranslator,
    model: &mut SettingsModel,
) -> ConfigResult<()> {
    if element_child_count(leaf) != 0 {
        return Err(ConfigError::schema(
            schema.kind,
            format!("<{}> leaf must not contain elements", schema.leaf),
        ));
    }

    let name = attribute(leaf, schema.name_attribute).ok_or_else(|| {
        ConfigError::schema(
            schema.kind,
            format!("<{}> without a {} attribute", schema.leaf, schema.name_attribute),
        )
    })?;
    let register = translator
        .register(name)
        .ok_or_else(|| ConfigError::unknown_setting(schema.kind, name))?;
    if !schema.expects(register) {
        return Err(ConfigError::schema(
            schema.kind,
            format!("register {} does not belong in this document", register),
        ));
    }

    let key = match (schema.scope, channel) {
        (RegisterScope::Global, _) => SettingKey::Global(register),
        (RegisterScope::Channel, Some(channel)) => SettingKey::Channel { channel, register },
        (RegisterScope::Channel, None) => {
            return Err(ConfigError::schema(
                schema.kind,
                format!("{} leaf outside a channel part", register),
            ));
        }
    };

    let value = SettingValue::parse(text(leaf).unwrap_or_default());
    if let Some(previous) = model.set(key, value) {
        tracing::debug!("{} {} overrides earlier value {}", schema.kind, key, previous);
    }
    Ok(())
}

/// Build the dataset element for the settings in `model` that belong to
/// this schema.
///
/// `chip_name` labels the single part of a global document.
pub fn encode_dataset(
    schema: &Schema,
    chip_name: &str,
    model: &SettingsModel,
    translator: &dyn NameTranslator,
) -> ConfigResult<Element> {
    let Some((part_tag, outer)) = schema.levels.split_last() else {
        return Err(ConfigError::schema(schema.kind, "schema has no levels"));
    };
    let Some((dataset_tag, intermediate)) = outer.split_first() else {
        return Err(ConfigError::schema(
            schema.kind,
            "schema needs a dataset level above its parts",
        ));
    };

    let mut parts: Vec<(Option<u8>, Element)> = Vec::new();
    for (key, value) in model.iter_scope(schema.scope) {
        let register = key.register();
        if !schema.expects(register) {
            return Err(ConfigError::schema(
                schema.kind,
                format!("setting {} is not part of this document", key),
            ));
        }
        if let Some(channel) = key.channel().filter(|c| !schema.channels.contains(c)) {
            return Err(ConfigError::schema(
                schema.kind,
                format!(
                    "setting {} has channel {} outside {}..={}",
                    key,
                    channel,
                    schema.channels.start(),
                    schema.channels.end()
                ),
            ));
        }
        let name = translator
            .name(register)
            .ok_or_else(|| ConfigError::unknown_setting(schema.kind, format!("{:?}", register)))?;

        let leaf = Element::with_text(schema.leaf, value.to_string())
            .attr(schema.name_attribute, name);

        // Keys come out grouped by channel, so a part is complete as soon
        // as the channel changes.
        let channel = key.channel();
        if let Some((current, part)) = parts.last_mut() {
            if *current == channel {
                part.push(leaf);
                continue;
            }
        }
        parts.push((channel, new_part(schema, part_tag, chip_name, channel).child(leaf)));
    }

    let mut inner: Vec<Element> = parts.into_iter().map(|(_, part)| part).collect();
    for tag in intermediate.iter().rev() {
        let mut wrapper = Element::new(*tag);
        wrapper.children = inner;
        inner = vec![wrapper];
    }

    let mut dataset = Element::new(*dataset_tag);
    dataset.children = inner;
    Ok(dataset)
}

fn new_part(schema: &Schema, tag: &str, chip_name: &str, channel: Option<u8>) -> Element {
    let mut part = Element::new(tag);
    if let (Some(key), Some(channel)) = (schema.channel_attribute, channel) {
        part = part.attr(key, channel.to_string());
    }
    if let Some(key) = schema.part_name_attribute.filter(|_| !chip_name.is_empty()) {
        part = part.attr(key, chip_name);
    }
    part
}
