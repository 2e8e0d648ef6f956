//! Finds the latest revision by widening the change-log window.
//!
//! Starts with `query_range_in_days` and adds the same amount after every
//! empty answer, for at most `1 + retry_count` queries.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::scm::access::ScmAccessInfo;
use crate::scm::query::{ChangeLog, ChangeLogRequest, RevisionQuery, ScmError};
use crate::scm::revision::Revision;

/// Result of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub revision: Option<Revision>,
    /// Range in days of every query issued, in order.
    pub attempted_ranges: Vec<u32>,
}

pub struct RevisionResolver<'a> {
    query: &'a dyn RevisionQuery,
    access: &'a ScmAccessInfo,
}

impl<'a> RevisionResolver<'a> {
    pub fn new(query: &'a dyn RevisionQuery, access: &'a ScmAccessInfo) -> Self {
        Self { query, access }
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> Result<Resolution, ScmError> {
        let step = self.access.query_range_in_days;
        let mut range = step;
        let mut attempted_ranges = Vec::new();

        for attempt in 0..=self.access.retry_count {
            let Some(start) = window_start(now, range) else {
                debug!(attempt, range, "query window out of range, not widening further");
                break;
            };
            let request = ChangeLogRequest {
                root: self.access.root_dir.clone(),
                start,
                end: now,
                range_in_days: range,
                date_format: self.access.date_format.clone(),
            };
            debug!(attempt, range, "querying change log");
            attempted_ranges.push(range);

            let log = self.query.change_log(&request)?;
            if !log.is_empty() {
                let revision = find_end_version(&log, now);
                debug!(?revision, "change log answered");
                return Ok(Resolution {
                    revision,
                    attempted_ranges,
                });
            }
            range = range.saturating_add(step);
        }

        debug!(attempts = attempted_ranges.len(), "no change sets found");
        Ok(Resolution {
            revision: None,
            attempted_ranges,
        })
    }
}

/// `now` minus `range_in_days`, or `None` when that instant cannot be
/// represented.
fn window_start(now: DateTime<Utc>, range_in_days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(range_in_days)).and_then(|d| now.checked_sub_signed(d))
}

/// The latest revision named by `log`.
///
/// An explicit end version wins. Otherwise change-sets are scanned newest
/// first and the first file carrying a revision decides.
pub fn find_end_version(log: &ChangeLog, now: DateTime<Utc>) -> Option<Revision> {
    if let Some(end) = log.end_version.as_deref().filter(|v| !v.trim().is_empty()) {
        return Some(Revision::new(end, log.end_date.unwrap_or(now)));
    }

    let mut sets: Vec<_> = log.change_sets.iter().collect();
    sets.sort_by(|a, b| b.date.cmp(&a.date));

    sets.into_iter().find_map(|set| {
        set.files
            .iter()
            .find_map(|f| f.revision.as_deref().filter(|r| !r.trim().is_empty()))
            .map(|id| Revision::new(id, set.date))
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;

    use chrono::TimeZone;

    use super::*;
    use crate::scm::query::{ChangeFile, ChangeSet, ChangedFile};

    struct Scripted {
        answers: RefCell<Vec<ChangeLog>>,
        seen: RefCell<Vec<u32>>,
    }

    impl Scripted {
        fn new(answers: Vec<ChangeLog>) -> Self {
            Self {
                answers: RefCell::new(answers),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl RevisionQuery for Scripted {
        fn change_log(&self, request: &ChangeLogRequest) -> Result<ChangeLog, ScmError> {
            self.seen.borrow_mut().push(request.range_in_days);
            let mut answers = self.answers.borrow_mut();
            Ok(if answers.is_empty() {
                ChangeLog::default()
            } else {
                answers.remove(0)
            })
        }

        fn status(&self, _root: &Path) -> Result<Vec<ChangedFile>, ScmError> {
            Ok(Vec::new())
        }
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    fn set(day: u32, rev: Option<&str>) -> ChangeSet {
        ChangeSet {
            date: at(day),
            files: vec![ChangeFile {
                path: "src/lib.rs".into(),
                revision: rev.map(str::to_string),
            }],
        }
    }

    fn access(range: u32) -> ScmAccessInfo {
        let mut a = ScmAccessInfo::new("/repo");
        a.query_range_in_days = range;
        a
    }

    #[test]
    fn exhausts_after_six_attempts_with_growing_range() {
        let query = Scripted::new(Vec::new());
        let access = access(30);
        let res = RevisionResolver::new(&query, &access).resolve(at(20)).unwrap();

        assert_eq!(res.revision, None);
        assert_eq!(res.attempted_ranges, vec![30, 60, 90, 120, 150, 180]);
        assert_eq!(*query.seen.borrow(), res.attempted_ranges);
    }

    #[test]
    fn unrepresentable_window_stops_widening() {
        let query = Scripted::new(Vec::new());
        let access = access(50_000_000);
        let res = RevisionResolver::new(&query, &access).resolve(at(20)).unwrap();

        assert_eq!(res.revision, None);
        assert_eq!(res.attempted_ranges, vec![50_000_000]);
        assert_eq!(*query.seen.borrow(), vec![50_000_000]);
    }

    #[test]
    fn huge_first_range_issues_no_query() {
        let query = Scripted::new(Vec::new());
        let access = access(u32::MAX);
        let res = RevisionResolver::new(&query, &access).resolve(at(20)).unwrap();

        assert_eq!(res.revision, None);
        assert!(res.attempted_ranges.is_empty());
    }

    #[test]
    fn stops_at_first_non_empty_answer() {
        let query = Scripted::new(vec![
            ChangeLog::default(),
            ChangeLog {
                change_sets: vec![set(3, Some("abc"))],
                ..ChangeLog::default()
            },
        ]);
        let access = access(7);
        let res = RevisionResolver::new(&query, &access).resolve(at(20)).unwrap();

        assert_eq!(res.attempted_ranges, vec![7, 14]);
        assert_eq!(res.revision, Some(Revision::new("abc", at(3))));
    }

    #[test]
    fn explicit_end_version_wins() {
        let log = ChangeLog {
            end_version: Some("1234".into()),
            end_date: Some(at(9)),
            change_sets: vec![set(3, Some("abc"))],
        };
        assert_eq!(find_end_version(&log, at(20)), Some(Revision::new("1234", at(9))));
    }

    #[test]
    fn newest_change_set_with_revision_wins() {
        let log = ChangeLog {
            change_sets: vec![set(2, Some("old")), set(9, None), set(5, Some("mid"))],
            ..ChangeLog::default()
        };
        assert_eq!(find_end_version(&log, at(20)), Some(Revision::new("mid", at(5))));
    }

    #[test]
    fn change_sets_without_revisions_yield_none() {
        let log = ChangeLog {
            change_sets: vec![ChangeSet {
                date: at(1),
                files: Vec::new(),
            }],
            ..ChangeLog::default()
        };
        assert_eq!(find_end_version(&log, at(20)), None);
    }

    #[test]
    fn query_errors_propagate() {
        struct Broken;
        impl RevisionQuery for Broken {
            fn change_log(&self, _: &ChangeLogRequest) -> Result<ChangeLog, ScmError> {
                Err(ScmError::Backend("offline".into()))
            }
            fn status(&self, _: &Path) -> Result<Vec<ChangedFile>, ScmError> {
                Ok(Vec::new())
            }
        }
        let access = access(30);
        assert!(RevisionResolver::new(&Broken, &access).resolve(at(20)).is_err());
    }
}
