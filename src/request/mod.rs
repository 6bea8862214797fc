//! Request construction
//!
//! `RequestDescriptor` describes a single call: method, content type, base
//! URL, path segments, query filter, parameters, headers, payload and the
//! credential holder that authorizes it. Rendering a descriptor is pure;
//! sending it is the executor's job.

mod descriptor;

pub use descriptor::{RequestDescriptor, RequestDescriptorBuilder};
