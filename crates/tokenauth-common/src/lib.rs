pub mod errors;
pub mod events;
pub mod token;

pub use errors::{StoreError, TokenAuthError};
pub use events::{EventBus, StoreEvent};
pub use token::{Token, TokenSet, TokenValidator};

pub type Result<T> = std::result::Result<T, TokenAuthError>;
