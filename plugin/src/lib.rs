//! Terraform plugin server for Keycloak.
//!
//! [`KeycloakProvider`] implements the `tf-provider` traits on top of the admin client from
//! `terraform-provider-keycloak`; [`run`] serves it over the plugin protocol.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod data_sources;
pub mod diag;
pub mod import;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod value;

pub use provider::{ClientSlot, KeycloakProvider, ProviderConfig};

mod _prelude {
	pub use std::{
		borrow::Cow,
		collections::{BTreeMap, BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Formatter, Result as FmtResult},
		sync::Arc,
	};

	pub use async_trait::async_trait;
	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use terraform_provider_keycloak::{
		client::KeycloakClient,
		error::{Error, Result},
	};
	pub use tf_provider::{
		AttributePath, DataSource, Diagnostics, Resource, map,
		schema::{Attribute, AttributeConstraint, AttributeType, Block, NestedBlock, Schema},
		value::{
			Value, ValueBool, ValueEmpty, ValueList, ValueMap, ValueNumber, ValueSet, ValueString,
		},
	};

	pub use crate::{
		diag::{DiagnosticsExt, ResultExt},
		value::{optional_text, text},
	};
}

/// Name Terraform addresses the provider by; resource types are prefixed with it.
pub const PROVIDER_NAME: &str = "keycloak";

/// Serves [`KeycloakProvider`] until Terraform shuts the plugin down.
pub async fn serve() -> anyhow::Result<()> {
	#[cfg(feature = "tracing")]
	tracing::info!(provider = PROVIDER_NAME, "Serving Terraform plugin.");

	tf_provider::serve(PROVIDER_NAME, KeycloakProvider::default()).await
}

/// Blocks the current thread on [`serve`].
pub fn run() -> anyhow::Result<()> {
	tokio::runtime::Builder::new_current_thread().enable_all().build()?.block_on(serve())
}
