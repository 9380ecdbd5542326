//! The three-state status ring as a total function.

use crate::model::status::Status;

/// Computes the status an entry moves to when activated.
///
/// - No stored entry: treated as `NotStarted`, so the result is `InReview`.
/// - A stored label outside the ring: restarts at `NotStarted`.
/// - Otherwise: the next value around the ring.
pub fn next_status(stored_label: Option<&str>) -> Status {
    match stored_label {
        None => Status::NotStarted.next(),
        Some(label) => Status::from_label(label).map_or(Status::NotStarted, Status::next),
    }
}

#[cfg(test)]
mod tests {
    use super::next_status;
    use crate::model::status::Status;

    #[test]
    fn absent_entry_moves_to_in_review() {
        assert_eq!(next_status(None), Status::InReview);
    }

    #[test]
    fn three_steps_return_to_start() {
        for start in [Status::NotStarted, Status::InReview, Status::Done] {
            let mut current = start;
            for _ in 0..3 {
                current = next_status(Some(current.as_str()));
            }
            assert_eq!(current, start);
        }
    }

    #[test]
    fn unknown_label_restarts_ring() {
        assert_eq!(next_status(Some("rejected")), Status::NotStarted);
        assert_eq!(next_status(Some("")), Status::NotStarted);
    }

    #[test]
    fn legacy_labels_follow_ring() {
        assert_eq!(next_status(Some("Não Iniciado")), Status::InReview);
        assert_eq!(next_status(Some("Em Correção")), Status::Done);
        assert_eq!(next_status(Some("Concluído")), Status::NotStarted);
    }
}
