use serde::{Deserialize, Serialize};
use validator::Validate;

pub(crate) use crate::core::time::format_primitive;
use crate::db::models::Invitation;
use crate::db::types::{InvitationStatus, SubmissionStatus};
use crate::services::progress::{HistoryItem, HistoryStats, StudentHistory};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub(crate) struct InviteeRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct InviteRequest {
    #[validate(length(min = 1, message = "at least one invitee is required"))]
    #[validate(nested)]
    pub(crate) invitees: Vec<InviteeRequest>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InvitationResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) email: String,
    pub(crate) name: Option<String>,
    pub(crate) status: InvitationStatus,
    pub(crate) invited_at: String,
    pub(crate) updated_at: String,
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            id: invitation.id,
            quiz_id: invitation.quiz_id,
            email: invitation.email,
            name: invitation.name,
            status: invitation.status,
            invited_at: format_primitive(invitation.invited_at),
            updated_at: format_primitive(invitation.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InviteResultResponse {
    pub(crate) created: bool,
    pub(crate) invitation: InvitationResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryResultResponse {
    pub(crate) submission_id: String,
    pub(crate) score: i64,
    pub(crate) max_score: i64,
    pub(crate) percentage: i64,
    pub(crate) status: SubmissionStatus,
    pub(crate) submitted_at: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryItemResponse {
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) invitation_status: InvitationStatus,
    pub(crate) invited_at: String,
    pub(crate) result: Option<HistoryResultResponse>,
}

impl From<HistoryItem> for HistoryItemResponse {
    fn from(item: HistoryItem) -> Self {
        Self {
            quiz_id: item.quiz_id,
            quiz_title: item.quiz_title,
            invitation_status: item.invitation_status,
            invited_at: format_primitive(item.invited_at),
            result: item.result.map(|result| HistoryResultResponse {
                submission_id: result.submission_id,
                score: result.score,
                max_score: result.max_score,
                percentage: result.percentage,
                status: result.status,
                submitted_at: format_primitive(result.submitted_at),
            }),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct HistoryStatsResponse {
    pub(crate) total_invited: usize,
    pub(crate) total_completed: usize,
    pub(crate) average_percentage: i64,
    pub(crate) completion_rate: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentHistoryResponse {
    pub(crate) email: String,
    pub(crate) items: Vec<HistoryItemResponse>,
    pub(crate) stats: HistoryStatsResponse,
}

impl From<StudentHistory> for StudentHistoryResponse {
    fn from(history: StudentHistory) -> Self {
        let HistoryStats { total_invited, total_completed, average_percentage, completion_rate } =
            history.stats;
        Self {
            email: history.email,
            items: history.items.into_iter().map(HistoryItemResponse::from).collect(),
            stats: HistoryStatsResponse {
                total_invited,
                total_completed,
                average_percentage,
                completion_rate,
            },
        }
    }
}
