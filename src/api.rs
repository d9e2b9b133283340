//! Keycloak admin API adapters.
//!
//! Each module pairs a wire struct with the CRUD calls that move it over the
//! admin REST API. Keystores travel as generic [`component::Component`]s and
//! protocol mappers as generic [`protocol_mapper::ProtocolMapper`]s; the
//! remaining adapters serialize their own representation directly.

pub mod component;
pub mod group;
pub mod identity_provider;
pub mod openid_client_authorization_role_policy;
pub mod openid_script_protocol_mapper;
pub mod organization;
pub mod protocol_mapper;
pub mod realm_keystore_rsa_enc_generated;
pub mod saml_hardcoded_attribute_protocol_mapper;
pub mod saml_user_session_note_protocol_mapper;

pub use component::*;
pub use group::*;
pub use identity_provider::*;
pub use openid_client_authorization_role_policy::*;
pub use openid_script_protocol_mapper::*;
pub use organization::*;
pub use protocol_mapper::*;
pub use realm_keystore_rsa_enc_generated::*;
pub use saml_hardcoded_attribute_protocol_mapper::*;
pub use saml_user_session_note_protocol_mapper::*;
