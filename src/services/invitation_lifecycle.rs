use crate::db::types::InvitationStatus;

/// `Pending -> Accepted`; anything else is left as is.
pub(crate) fn accept(current: InvitationStatus) -> InvitationStatus {
    match current {
        InvitationStatus::Pending => InvitationStatus::Accepted,
        other => other,
    }
}

/// A recorded submission completes the invitation from any state.
pub(crate) fn complete(_current: InvitationStatus) -> InvitationStatus {
    InvitationStatus::Completed
}

pub(crate) fn can_remove(current: InvitationStatus) -> bool {
    current == InvitationStatus::Pending
}
