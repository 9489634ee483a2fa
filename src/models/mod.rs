pub mod todo;
pub mod user;

pub use todo::{Category, NewTodo, Todo, TodoDraft, TodoFields};
pub use user::{Identity, LoginUser, NewUser, PublicUser, RegisterUser, Role, UpdateRole, User};
