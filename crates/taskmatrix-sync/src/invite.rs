//! Invite reference parsing and generation.
//!
//! An invite is a URL carrying `invite=executor&teamId=<id>`. The
//! older team-less `invite=executor` scheme (which leaned on a shared
//! global store) is superseded and rejected with `MissingTeamId`.

use taskmatrix_core::error::JoinError;
use taskmatrix_core::model::TeamId;

/// Extract the target team id from an invite reference.
pub fn parse_invite(reference: &str) -> Result<TeamId, JoinError> {
    let url = reqwest::Url::parse(reference).map_err(|_| JoinError::InvalidInviteFormat)?;

    url.query_pairs()
        .find(|(key, _)| key == "teamId")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .ok_or(JoinError::MissingTeamId)
}

/// Build the invite link an admin shares with a new executor.
pub fn invite_url(app_url: &str, team_id: &str) -> String {
    format!(
        "{}?invite=executor&teamId={}",
        app_url.trim_end_matches('?'),
        team_id
    )
}
