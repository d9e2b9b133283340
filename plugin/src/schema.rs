//! Shorthands for `tf-provider` schema declarations.

// crates.io
use tf_provider::schema::Description;
// self
use crate::_prelude::*;

/// Attribute that must be configured.
pub fn required(attr_type: AttributeType, description: &'static str) -> Attribute {
	attribute(attr_type, AttributeConstraint::Required, description)
}

/// Attribute that may be configured and is never computed.
pub fn optional(attr_type: AttributeType, description: &'static str) -> Attribute {
	attribute(attr_type, AttributeConstraint::Optional, description)
}

/// Attribute the provider fills in when the configuration leaves it unset.
pub fn optional_computed(attr_type: AttributeType, description: &'static str) -> Attribute {
	attribute(attr_type, AttributeConstraint::OptionalComputed, description)
}

/// Read-only attribute.
pub fn computed(attr_type: AttributeType, description: &'static str) -> Attribute {
	attribute(attr_type, AttributeConstraint::Computed, description)
}

/// Redacts the attribute in plan output.
pub fn sensitive(attribute: Attribute) -> Attribute {
	Attribute { sensitive: true, ..attribute }
}

/// Map of strings.
pub fn string_map() -> AttributeType {
	AttributeType::Map(Box::new(AttributeType::String))
}

/// Top-level resource or data source schema.
pub fn schema(
	description: &'static str,
	attributes: HashMap<String, Attribute>,
	blocks: HashMap<String, NestedBlock>,
) -> Schema {
	Schema { version: 1, block: block(description, attributes, blocks) }
}

/// Block with a description.
pub fn block(
	description: &'static str,
	attributes: HashMap<String, Attribute>,
	blocks: HashMap<String, NestedBlock>,
) -> Block {
	Block {
		version: 1,
		attributes,
		blocks,
		description: Description::plain(description),
		deprecated: false,
	}
}

fn attribute(
	attr_type: AttributeType,
	constraint: AttributeConstraint,
	description: &'static str,
) -> Attribute {
	Attribute {
		attr_type,
		description: Description::plain(description),
		constraint,
		..Default::default()
	}
}
