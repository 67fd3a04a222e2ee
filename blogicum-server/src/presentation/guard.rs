//! What an ownership failure turns into for each kind of page.
//!
//! Post edit/delete pages send non-authors back to the post; comment
//! edit/delete pages answer 403.

use crate::domain::error::DomainError;
use crate::presentation::app_error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnForbidden {
    RedirectToPost(i64),
    Deny,
}

impl OnForbidden {
    pub(crate) fn map(self, err: DomainError) -> AppError {
        match (self, err) {
            (OnForbidden::RedirectToPost(post_id), DomainError::Forbidden) => {
                AppError::RedirectTo(post_detail_path(post_id))
            }
            (_, err) => AppError::Domain(err),
        }
    }
}

pub(crate) fn post_detail_path(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

#[cfg(test)]
mod tests {
    use super::OnForbidden;
    use crate::domain::error::DomainError;
    use crate::presentation::app_error::AppError;

    #[test]
    fn post_pages_redirect_on_forbidden() {
        let err = OnForbidden::RedirectToPost(9).map(DomainError::Forbidden);
        assert!(matches!(err, AppError::RedirectTo(ref path) if path == "/posts/9/"));
    }

    #[test]
    fn post_pages_keep_not_found() {
        let err = OnForbidden::RedirectToPost(9).map(DomainError::NotFound("post".into()));
        assert!(matches!(err, AppError::Domain(DomainError::NotFound(_))));
    }

    #[test]
    fn comment_pages_deny() {
        let err = OnForbidden::Deny.map(DomainError::Forbidden);
        assert!(matches!(err, AppError::Domain(DomainError::Forbidden)));
    }
}
