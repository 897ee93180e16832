pub mod assembler;
pub mod error;
pub mod kernels;
pub mod operation;
pub mod registry;
pub mod resolver;

pub use assembler::Assembler;
pub use error::EngineError;
pub use kernels::Order;
pub use operation::{implementation, Implementation, Operation};
pub use registry::{Dependencies, OperationDecl, Registry, RegistryBuilder};
pub use resolver::Resolver;
