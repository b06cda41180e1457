//! Marigold Provisioner
//!
//! Turns declared [`ResourceDef`]s into external resources. Providers are
//! kept in a capability table keyed by resource type tag; a project's
//! resources are provisioned in declaration order.
//!
//! Provisioning is not transactional. When resource *k* fails, resources
//! before it stay provisioned and the first error is returned.
//!
//! [`ResourceDef`]: marigold_config::ResourceDef

mod bucket;
mod error;
mod provisioner;

pub use bucket::BucketProvider;
pub use error::ProvisionError;
pub use provisioner::{BUCKET_RESOURCE_TYPES, Provisioner, ResourceMetadata, ResourceProvider};
