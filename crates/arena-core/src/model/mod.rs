//! Modelo de tipos: descriptores, miembros, especificaciones de interfaz,
//! artifacts y valores de runtime.

pub mod artifact;
pub mod hierarchy;
pub mod interface;
pub mod member;
pub mod native;
pub mod types;
pub mod value;

pub use artifact::{Artifact, Fault, Instance};
pub use hierarchy::TypeHierarchy;
pub use interface::{InterfaceSpecification, Operation};
pub use member::{MemberDescriptor, MemberKind, Signature};
pub use native::{NativeArtifact, NativeArtifactBuilder};
pub use types::{PrimitiveKind, TypeDescriptor};
pub use value::{ObjectRef, Payload, Value};
