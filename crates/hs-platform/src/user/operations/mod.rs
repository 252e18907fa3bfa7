//! User Operations
//!
//! Use cases for registration and login. Logout and view history are
//! simple enough to live in the API handlers.

pub mod login;
pub mod refresh;
pub mod register;

pub use login::{LoginCommand, LoginOutcome, LoginUserUseCase};
pub use refresh::RefreshSessionUseCase;
pub use register::{RegisterUserCommand, RegisterUserUseCase};
