//! The moderation engine: report lifecycle (pending → closed) and the
//! moderator action matrix, with an append-only audit trail.
//!
//! Every invocation of [`apply_action`] — success or failure — appends
//! exactly one [`ActionLogEntry`] before returning. The log is the system
//! of record for moderation history; no operation edits or prunes it.

use crate::commands::helpers::next_id;
use crate::error::{Result, StoreError};
use crate::model::{ActionLogEntry, Document, ModTarget, Report, ReportStatus};
use crate::store::DocumentStore;
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Remove,
    Approve,
    Lock,
    Sticky,
    BanUser,
    Shadowban,
}

impl ActionKind {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "remove" => Some(ActionKind::Remove),
            "approve" => Some(ActionKind::Approve),
            "lock" => Some(ActionKind::Lock),
            "sticky" => Some(ActionKind::Sticky),
            "ban_user" => Some(ActionKind::BanUser),
            "shadowban" => Some(ActionKind::Shadowban),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ActionKind::Remove => "remove",
            ActionKind::Approve => "approve",
            ActionKind::Lock => "lock",
            ActionKind::Sticky => "sticky",
            ActionKind::BanUser => "ban_user",
            ActionKind::Shadowban => "shadowban",
        }
    }
}

/// Result of a successfully applied moderator action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReceipt {
    pub applied: bool,
    /// The report this action closed, when a `report_id` was supplied and
    /// matched a known report.
    pub report: Option<Report>,
}

fn entity_exists(doc: &Document, target: ModTarget, id: u64) -> bool {
    match target {
        ModTarget::User => doc.user(id).is_some(),
        ModTarget::Post => doc.post(id).is_some(),
        ModTarget::Comment => doc.comment(id).is_some(),
    }
}

fn target_kind(target: Option<ModTarget>) -> &'static str {
    match target {
        Some(ModTarget::User) => "user",
        Some(ModTarget::Post) => "post",
        Some(ModTarget::Comment) => "comment",
        None => "target",
    }
}

#[allow(clippy::too_many_arguments)]
fn log_action(
    doc: &mut Document,
    moderator_id: u64,
    target_type: &str,
    target_id: u64,
    action: &str,
    reason: &str,
    applied: bool,
    error: Option<&str>,
    report_id: Option<u64>,
) {
    let entry = ActionLogEntry {
        id: next_id(doc.moderation.actions.iter().map(|a| a.id)),
        ts: Utc::now(),
        moderator_id,
        target_type: target_type.to_string(),
        target_id,
        action: action.to_string(),
        reason: reason.to_string(),
        applied,
        error: error.map(str::to_string),
        report_id,
    };
    doc.moderation.actions.push(entry);
}

/// File a report against a target. Reports against targets that do not
/// exist are accepted but flagged `invalid_target` so the queue can triage
/// them; rejecting them would lose the signal.
pub fn create_report<S: DocumentStore>(
    store: &mut S,
    reporter_id: u64,
    target_type: &str,
    target_id: u64,
    reason: &str,
) -> Result<Report> {
    let target: ModTarget = target_type.parse()?;

    let mut doc = store.load()?;
    let report = Report {
        id: next_id(doc.moderation.reports.iter().map(|r| r.id)),
        reporter_id,
        target_type: target,
        target_id,
        reason: reason.to_string(),
        status: ReportStatus::Pending,
        resolution: None,
        closed_by: None,
        closed_at: None,
        invalid_target: !entity_exists(&doc, target, target_id),
        created_at: Utc::now(),
    };
    doc.moderation.reports.push(report.clone());
    store.save(&doc)?;
    Ok(report)
}

/// The report queue, optionally filtered by status.
pub fn list_reports<S: DocumentStore>(
    store: &S,
    status: Option<ReportStatus>,
) -> Result<Vec<Report>> {
    let doc = store.load()?;
    Ok(match status {
        Some(status) => doc
            .moderation
            .reports
            .into_iter()
            .filter(|r| r.status == status)
            .collect(),
        None => doc.moderation.reports,
    })
}

/// Read-only view of the audit log.
pub fn actions<S: DocumentStore>(store: &S) -> Result<Vec<ActionLogEntry>> {
    let doc = store.load()?;
    Ok(doc.moderation.actions)
}

/// Apply a moderator action against a target.
///
/// Validity matrix: `remove` works on any existing target (posts are also
/// locked); `approve` never mutates an entity and only closes a report;
/// `lock`/`sticky` are post-only; `ban_user`/`shadowban` are user-only.
/// Failures are logged with `applied = false` and then surfaced as typed
/// errors; the audit entry is persisted either way.
pub fn apply_action<S: DocumentStore>(
    store: &mut S,
    moderator_id: u64,
    target_type: &str,
    target_id: u64,
    action: &str,
    reason: &str,
    report_id: Option<u64>,
) -> Result<ActionReceipt> {
    let mut doc = store.load()?;
    let target = target_type.parse::<ModTarget>().ok();
    let exists = target
        .map(|t| entity_exists(&doc, t, target_id))
        .unwrap_or(false);

    // Precedence mirrors the matrix: unknown action first, then target
    // existence (approve excepted), then action/target compatibility.
    let outcome: std::result::Result<ActionKind, &'static str> = match ActionKind::parse(action) {
        None => Err("unknown_action"),
        Some(ActionKind::Approve) => Ok(ActionKind::Approve),
        Some(_) if !exists => Err("target_not_found"),
        Some(ActionKind::Lock) if target != Some(ModTarget::Post) => Err("lock_only_for_posts"),
        Some(ActionKind::Sticky) if target != Some(ModTarget::Post) => Err("sticky_only_for_posts"),
        Some(ActionKind::BanUser) if target != Some(ModTarget::User) => Err("ban_only_for_users"),
        Some(ActionKind::Shadowban) if target != Some(ModTarget::User) => {
            Err("shadowban_only_for_users")
        }
        Some(kind) => Ok(kind),
    };

    let kind = match outcome {
        Ok(kind) => kind,
        Err(code) => {
            log_action(
                &mut doc,
                moderator_id,
                target_type,
                target_id,
                action,
                reason,
                false,
                Some(code),
                report_id,
            );
            store.save(&doc)?;
            return Err(match code {
                "target_not_found" => StoreError::not_found(target_kind(target), target_id),
                other => StoreError::Unsupported(other.to_string()),
            });
        }
    };

    match (kind, target) {
        (ActionKind::Remove, Some(ModTarget::User)) => {
            if let Some(user) = doc.user_mut(target_id) {
                user.removed = true;
            }
        }
        (ActionKind::Remove, Some(ModTarget::Post)) => {
            if let Some(post) = doc.post_mut(target_id) {
                post.removed = true;
                post.locked = true;
            }
        }
        (ActionKind::Remove, Some(ModTarget::Comment)) => {
            if let Some(comment) = doc.comment_mut(target_id) {
                comment.removed = true;
            }
        }
        (ActionKind::Approve, _) => {}
        (ActionKind::Lock, _) => {
            if let Some(post) = doc.post_mut(target_id) {
                post.locked = true;
            }
        }
        (ActionKind::Sticky, _) => {
            if let Some(post) = doc.post_mut(target_id) {
                post.sticky = true;
            }
        }
        (ActionKind::BanUser, _) => {
            if let Some(user) = doc.user_mut(target_id) {
                user.banned = true;
            }
        }
        (ActionKind::Shadowban, _) => {
            if let Some(user) = doc.user_mut(target_id) {
                user.shadowbanned = true;
            }
        }
        (ActionKind::Remove, None) => {}
    }

    let mut closed = None;
    if let Some(report_id) = report_id {
        if let Some(report) = doc
            .moderation
            .reports
            .iter_mut()
            .find(|r| r.id == report_id)
        {
            report.status = ReportStatus::Closed;
            report.resolution = Some(kind.as_str().to_string());
            report.closed_by = Some(moderator_id);
            report.closed_at = Some(Utc::now());
            closed = Some(report.clone());
        }
    }

    log_action(
        &mut doc,
        moderator_id,
        target_type,
        target_id,
        action,
        reason,
        true,
        None,
        report_id,
    );
    store.save(&doc)?;

    Ok(ActionReceipt {
        applied: true,
        report: closed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::users;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;
    use crate::store::DocumentStore as _;

    fn seeded() -> InMemoryStore {
        StoreFixture::new()
            .with_board("General")
            .with_user("alice", "alice@x.com")
            .with_user("mallory", "mallory@x.com")
            .with_post("Hi", 1, 1)
            .with_comment("first", 1, 2)
            .store
    }

    #[test]
    fn remove_post_also_locks_it() {
        let mut store = seeded();
        let receipt = apply_action(&mut store, 1, "post", 1, "remove", "spam", None).unwrap();
        assert!(receipt.applied);

        let doc = store.load().unwrap();
        let post = doc.post(1).unwrap();
        assert!(post.removed);
        assert!(post.locked);
    }

    #[test]
    fn lock_on_a_comment_fails_but_is_logged() {
        let mut store = seeded();
        let err = apply_action(&mut store, 1, "comment", 1, "lock", "", None).unwrap_err();
        assert!(matches!(err, StoreError::Unsupported(code) if code == "lock_only_for_posts"));

        let log = actions(&store).unwrap();
        assert_eq!(log.len(), 1);
        assert!(!log[0].applied);
        assert_eq!(log[0].error.as_deref(), Some("lock_only_for_posts"));
        assert!(!store.load().unwrap().comment(1).unwrap().removed);
    }

    #[test]
    fn sticky_and_ban_matrix_errors() {
        let mut store = seeded();
        let err = apply_action(&mut store, 1, "user", 2, "sticky", "", None).unwrap_err();
        assert!(matches!(err, StoreError::Unsupported(code) if code == "sticky_only_for_posts"));

        let err = apply_action(&mut store, 1, "post", 1, "ban_user", "", None).unwrap_err();
        assert!(matches!(err, StoreError::Unsupported(code) if code == "ban_only_for_users"));

        let err = apply_action(&mut store, 1, "comment", 1, "shadowban", "", None).unwrap_err();
        assert!(
            matches!(err, StoreError::Unsupported(code) if code == "shadowban_only_for_users")
        );

        // Three failed attempts, three log entries.
        assert_eq!(actions(&store).unwrap().len(), 3);
    }

    #[test]
    fn ban_and_shadowban_set_user_flags() {
        let mut store = seeded();
        apply_action(&mut store, 1, "user", 2, "ban_user", "abuse", None).unwrap();
        apply_action(&mut store, 1, "user", 2, "shadowban", "", None).unwrap();

        let doc = store.load().unwrap();
        let user = doc.user(2).unwrap();
        assert!(user.banned);
        assert!(user.shadowbanned);
    }

    #[test]
    fn unknown_action_fails_and_keeps_the_raw_name_in_the_log() {
        let mut store = seeded();
        let err = apply_action(&mut store, 1, "post", 1, "obliterate", "", None).unwrap_err();
        assert!(matches!(err, StoreError::Unsupported(code) if code == "unknown_action"));

        let log = actions(&store).unwrap();
        assert_eq!(log[0].action, "obliterate");
        assert_eq!(log[0].error.as_deref(), Some("unknown_action"));
    }

    #[test]
    fn missing_target_fails_and_is_logged() {
        let mut store = seeded();
        let err = apply_action(&mut store, 1, "post", 99, "remove", "", None).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "post", .. }));

        let log = actions(&store).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].error.as_deref(), Some("target_not_found"));
    }

    #[test]
    fn approve_with_report_closes_it_without_touching_the_target() {
        let mut store = seeded();
        let report = create_report(&mut store, 2, "post", 1, "looks fine actually").unwrap();
        assert_eq!(report.status, ReportStatus::Pending);
        assert!(!report.invalid_target);

        let receipt =
            apply_action(&mut store, 1, "post", 1, "approve", "", Some(report.id)).unwrap();
        let closed = receipt.report.unwrap();
        assert_eq!(closed.status, ReportStatus::Closed);
        assert_eq!(closed.resolution.as_deref(), Some("approve"));
        assert_eq!(closed.closed_by, Some(1));
        assert!(closed.closed_at.is_some());

        let doc = store.load().unwrap();
        assert!(!doc.post(1).unwrap().removed);
        assert!(!doc.post(1).unwrap().locked);
    }

    #[test]
    fn report_against_missing_target_is_flagged_not_rejected() {
        let mut store = seeded();
        let report = create_report(&mut store, 2, "comment", 42, "ghost").unwrap();
        assert!(report.invalid_target);
        assert_eq!(report.status, ReportStatus::Pending);
    }

    #[test]
    fn list_reports_filters_by_status() {
        let mut store = seeded();
        let first = create_report(&mut store, 2, "post", 1, "spam").unwrap();
        create_report(&mut store, 2, "user", 2, "rude").unwrap();
        apply_action(&mut store, 1, "post", 1, "remove", "", Some(first.id)).unwrap();

        let pending = list_reports(&store, Some(ReportStatus::Pending)).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].target_id, 2);

        let all = list_reports(&store, None).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn audit_log_survives_entity_cascades() {
        let mut store = seeded();
        apply_action(&mut store, 1, "user", 2, "ban_user", "", None).unwrap();
        users::delete(&mut store, 2).unwrap();

        let log = actions(&store).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, "ban_user");
    }
}
