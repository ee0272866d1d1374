//! Advisory notices derived from dates in the registry and the pipeline.
//!
//! Generators only produce drafts; `publish` assigns ids, drops drafts that repeat a
//! stored notice and persists the rest.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::storage::{load_collection, save_collection, BlobStore, StorageError};
use crate::workflows::admission::dates::{days_until, format_display};
use crate::workflows::admission::{Profile, ProfileId, ProfileStatus};
use crate::workflows::registry::{probation_deadline_approaching, Member};

pub const NOTIFICATIONS_KEY: &str = "notifications";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Urgent,
    Info,
    Deadline,
}

/// What a notice is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum NotificationSubject {
    Member(u64),
    Profile(ProfileId),
}

impl NotificationSubject {
    pub fn link(&self) -> String {
        match self {
            Self::Member(id) => format!("/api/v1/members?id={id}"),
            Self::Profile(id) => format!("/api/v1/profiles/{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub subject: NotificationSubject,
    pub due_date: Option<NaiveDate>,
}

impl NotificationDraft {
    fn duplicates(&self, stored: &Notification) -> bool {
        self.kind == stored.kind && self.subject == stored.subject && self.due_date == stored.due_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
    pub subject: NotificationSubject,
    pub due_date: Option<NaiveDate>,
    pub link: String,
    pub created_on: NaiveDate,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("notification {0} not found")]
    NotFound(u64),
}

pub struct NotificationService<S: ?Sized> {
    store: Arc<S>,
    lookahead_days: u32,
}

impl<S> NotificationService<S>
where
    S: BlobStore + ?Sized,
{
    pub fn new(store: Arc<S>, lookahead_days: u32) -> Self {
        Self {
            store,
            lookahead_days,
        }
    }

    pub fn lookahead_days(&self) -> u32 {
        self.lookahead_days
    }

    /// One deadline draft per probationary member whose probation ends within the lookahead.
    pub fn check_probation_deadlines(&self, members: &[Member], today: NaiveDate) -> Vec<NotificationDraft> {
        members
            .iter()
            .filter(|member| probation_deadline_approaching(member, today, self.lookahead_days))
            .map(|member| NotificationDraft {
                kind: NotificationKind::Deadline,
                title: format!("Probation of {} is ending", member.name),
                description: format!(
                    "Review {} for official membership before {}",
                    member.name,
                    format_display(member.probation_end_date)
                ),
                subject: NotificationSubject::Member(member.id),
                due_date: Some(member.probation_end_date),
            })
            .collect()
    }

    /// Urgent drafts for overdue open stages, deadline drafts for those due within the lookahead.
    pub fn check_stage_deadlines(&self, profiles: &[Profile], today: NaiveDate) -> Vec<NotificationDraft> {
        profiles
            .iter()
            .filter(|profile| profile.status == ProfileStatus::Active)
            .filter_map(|profile| {
                let stage = profile.open_stage()?;
                let deadline = profile.common(stage).deadline?;
                let remaining = days_until(today, deadline);
                let name = &profile.personal_info.full_name;

                let (kind, title) = if remaining < 0 {
                    (
                        NotificationKind::Urgent,
                        format!("{} is overdue at stage {}", name, stage.number()),
                    )
                } else if remaining <= i64::from(self.lookahead_days) {
                    (
                        NotificationKind::Deadline,
                        format!("{} is due soon for stage {}", name, stage.number()),
                    )
                } else {
                    return None;
                };

                Some(NotificationDraft {
                    kind,
                    title,
                    description: format!(
                        "{} ({}) must close {} by {}",
                        name,
                        profile.code,
                        stage.label(),
                        format_display(deadline)
                    ),
                    subject: NotificationSubject::Profile(profile.id.clone()),
                    due_date: Some(deadline),
                })
            })
            .collect()
    }

    /// Persist drafts that do not repeat a stored notice; returns the ones added.
    pub fn publish(
        &self,
        drafts: Vec<NotificationDraft>,
        today: NaiveDate,
    ) -> Result<Vec<Notification>, NotificationError> {
        let mut stored: Vec<Notification> = load_collection(self.store.as_ref(), NOTIFICATIONS_KEY)?;
        let mut next_id = stored.iter().map(|notice| notice.id).max().unwrap_or(0) + 1;
        let mut added = Vec::new();

        for draft in drafts {
            if stored.iter().any(|notice| draft.duplicates(notice)) {
                continue;
            }
            let notice = Notification {
                id: next_id,
                link: draft.subject.link(),
                kind: draft.kind,
                title: draft.title,
                description: draft.description,
                subject: draft.subject,
                due_date: draft.due_date,
                created_on: today,
                read: false,
            };
            next_id += 1;
            stored.push(notice.clone());
            added.push(notice);
        }

        if !added.is_empty() {
            save_collection(self.store.as_ref(), NOTIFICATIONS_KEY, &stored)?;
            info!(published = added.len(), "notifications published");
        }
        Ok(added)
    }

    /// Stored notices, newest first.
    pub fn list(&self) -> Result<Vec<Notification>, NotificationError> {
        let mut stored: Vec<Notification> = load_collection(self.store.as_ref(), NOTIFICATIONS_KEY)?;
        stored.reverse();
        Ok(stored)
    }

    pub fn unread_count(&self) -> Result<usize, NotificationError> {
        let stored: Vec<Notification> = load_collection(self.store.as_ref(), NOTIFICATIONS_KEY)?;
        Ok(stored.iter().filter(|notice| !notice.read).count())
    }

    pub fn mark_read(&self, id: u64) -> Result<Notification, NotificationError> {
        let mut stored: Vec<Notification> = load_collection(self.store.as_ref(), NOTIFICATIONS_KEY)?;
        let notice = stored
            .iter_mut()
            .find(|notice| notice.id == id)
            .ok_or(NotificationError::NotFound(id))?;
        notice.read = true;
        let updated = notice.clone();
        save_collection(self.store.as_ref(), NOTIFICATIONS_KEY, &stored)?;
        Ok(updated)
    }

    /// Returns how many notices changed.
    pub fn mark_all_read(&self) -> Result<usize, NotificationError> {
        let mut stored: Vec<Notification> = load_collection(self.store.as_ref(), NOTIFICATIONS_KEY)?;
        let mut changed = 0;
        for notice in stored.iter_mut().filter(|notice| !notice.read) {
            notice.read = true;
            changed += 1;
        }
        if changed > 0 {
            save_collection(self.store.as_ref(), NOTIFICATIONS_KEY, &stored)?;
        }
        Ok(changed)
    }
}
