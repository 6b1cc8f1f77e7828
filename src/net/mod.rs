//! Socket layer.
//!
//! - **`addr`**: address family capability and the IPv4/IPv6 implementations
//! - **`sys`**: syscall wrappers, the only place with platform conditionals
//! - **`option`**: socket-level options
//! - **`read`**: blocking and nonblocking read strategies
//! - **`socket`**: the descriptor-owning `Socket`

pub mod addr;
pub mod error;
pub mod option;
pub mod read;
pub mod socket;
mod sys;

pub use addr::{AddressFamily, Inet4, Inet6, InetAddr};
pub use error::SocketError;
pub use option::SocketOption;
pub use read::{Blocking, NonBlocking, ReadOutcome, ReadStrategy};
pub use socket::{Socket, SocketType};
