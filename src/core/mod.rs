pub mod descriptor;
pub mod errors;
pub mod universe;

pub use descriptor::{
    package_of, ClassDescriptor, FieldDescriptor, MethodDescriptor, Signature, Visibility,
};
pub use errors::{Error, Result};
pub use universe::Universe;
