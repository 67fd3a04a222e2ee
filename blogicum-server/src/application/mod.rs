pub(crate) mod admin_service;
pub(crate) mod auth_service;
pub(crate) mod blog_service;
pub(crate) mod clock;
pub(crate) mod comment_service;
pub(crate) mod profile_service;

#[cfg(test)]
pub(crate) mod testing;
