//! Typed representation of the actions an action file declares.

mod result;
mod schema;

pub use result::{ActionResult, ActionStatus};
pub(crate) use schema::RawHeader;
pub use schema::{
    Action, ActionEntry, Attributes, Define, Exec, Generate, Header, Inject, MavenSnippet,
    MavenTarget, Question, QuestionOptions, Vars,
};
