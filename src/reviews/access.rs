use crate::error::AppError;
use crate::notice::Notice;
use crate::reviews::repo_types::Review;

pub fn can_modify(current_user_id: i64, review: &Review) -> bool {
    review.user_id == current_user_id
}

/// Refuses the mutation with `refusal` unless `current_user_id` owns the review.
pub fn ensure_owner(
    current_user_id: i64,
    review: &Review,
    refusal: Notice,
) -> Result<(), AppError> {
    if can_modify(current_user_id, review) {
        Ok(())
    } else {
        tracing::warn!(
            user_id = current_user_id,
            review_id = review.id,
            owner_id = review.user_id,
            "ownership check failed"
        );
        Err(AppError::Forbidden(refusal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn review_owned_by(user_id: i64) -> Review {
        Review {
            id: 1,
            title: "t".into(),
            genre: "g".into(),
            rating: 3,
            content: "c".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            user_id,
            author: "owner".into(),
        }
    }

    #[test]
    fn only_owner_may_modify() {
        let review = review_owned_by(7);
        assert!(can_modify(7, &review));
        assert!(!can_modify(8, &review));
        assert!(ensure_owner(7, &review, Notice::NotAllowedToEdit).is_ok());
        assert!(matches!(
            ensure_owner(8, &review, Notice::NotAllowedToDelete),
            Err(AppError::Forbidden(Notice::NotAllowedToDelete))
        ));
    }
}
