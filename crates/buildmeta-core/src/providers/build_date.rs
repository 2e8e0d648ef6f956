//! Build date, years, coordinates and the composed full version.

use chrono::{DateTime, Datelike, Utc};

use crate::error::BuildMetaError;
use crate::facts::keys::*;
use crate::facts::store::FactStore;
use crate::providers::{BuildContext, MetaDataProvider};
use crate::util::dates::{VERSION_DATE_PATTERN, format_date};
use crate::util::text::is_blank;
use crate::version;

pub struct BuildDateProvider;

/// `inception` when it equals the build year, `inception-build`
/// otherwise, the build year alone without an inception year.
pub fn copyright_year(inception_year: Option<&str>, build_year: &str) -> String {
    match inception_year.map(str::trim).filter(|y| !y.is_empty()) {
        Some(inception) if inception == build_year => inception.to_string(),
        Some(inception) => format!("{inception}-{build_year}"),
        None => build_year.to_string(),
    }
}

impl BuildDateProvider {
    fn format(&self, date: &DateTime<Utc>, pattern: &str) -> Result<String, BuildMetaError> {
        format_date(date, pattern)
            .ok_or_else(|| BuildMetaError::Config(format!("invalid date pattern '{pattern}'")))
    }
}

impl MetaDataProvider for BuildDateProvider {
    fn name(&self) -> &'static str {
        "build-date"
    }

    fn provide(&self, ctx: &BuildContext, store: &mut FactStore) -> Result<(), BuildMetaError> {
        let date = ctx.start_time;
        let pattern = ctx.config.build_date_pattern.as_str();

        store.set(BUILD_DATE, self.format(&date, pattern)?);
        store.set(BUILD_DATE_PATTERN, pattern);
        store.set(BUILD_TIMESTAMP, date.timestamp_millis().to_string());

        let build_year = date.year().to_string();
        let project = ctx.project();
        store.set(
            COPYRIGHT_YEAR,
            copyright_year(project.inception_year.as_deref(), &build_year),
        );
        store.set(BUILD_YEAR, build_year);

        store.set_if_not_blank(VERSION, Some(project.version.as_str()));
        store.set_if_not_blank(GROUP_ID, Some(project.group_id.as_str()));
        store.set_if_not_blank(ARTIFACT_ID, Some(project.artifact_id.as_str()));

        if !is_blank(&project.version) {
            let full = version::compose(
                &project.version,
                &self.format(&date, VERSION_DATE_PATTERN)?,
                store.get(SCM_REVISION_ID),
                store.get(SCM_LOCALLY_MODIFIED),
                ctx.config.version,
            );
            store.set(FULL_VERSION, full);
        }
        Ok(())
    }
}
