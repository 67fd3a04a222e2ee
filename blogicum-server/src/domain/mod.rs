pub(crate) mod category;
pub(crate) mod comment;
pub(crate) mod error;
pub(crate) mod location;
pub(crate) mod ownership;
pub(crate) mod post;
pub(crate) mod publishable;
pub(crate) mod user;
pub(crate) mod validation;
pub(crate) mod visibility;
