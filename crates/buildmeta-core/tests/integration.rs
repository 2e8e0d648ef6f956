use std::path::Path;

use buildmeta_core::config::{BuildMetaConfig, ProjectScm};
use buildmeta_core::facts::keys::*;
use buildmeta_core::output::properties::read_properties_file;
use buildmeta_core::providers::BuildContext;
use buildmeta_core::scm::query::{
    ChangeFile, ChangeLog, ChangeLogRequest, ChangeSet, ChangedFile, FileStatus, RevisionQuery,
    ScmError,
};
use buildmeta_core::sections::SelectedProperty;
use buildmeta_core::{BuildMetaError, BuildPoint, collect, record_build_point, run};
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

/// In-memory backend answering every change-log query with the same log.
struct FakeScm {
    log: ChangeLog,
    status: Vec<ChangedFile>,
}

impl FakeScm {
    fn at_revision(id: &str) -> Self {
        Self {
            log: ChangeLog {
                end_version: None,
                end_date: None,
                change_sets: vec![ChangeSet {
                    date: Utc.with_ymd_and_hms(2024, 1, 14, 18, 30, 0).unwrap(),
                    files: vec![ChangeFile {
                        path: "src/lib.rs".into(),
                        revision: Some(id.into()),
                    }],
                }],
            },
            status: Vec::new(),
        }
    }

    fn with_status(mut self, status: Vec<ChangedFile>) -> Self {
        self.status = status;
        self
    }
}

impl RevisionQuery for FakeScm {
    fn change_log(&self, _: &ChangeLogRequest) -> Result<ChangeLog, ScmError> {
        Ok(self.log.clone())
    }

    fn status(&self, _: &Path) -> Result<Vec<ChangedFile>, ScmError> {
        Ok(self.status.clone())
    }
}

/// Backend whose repository cannot be reached.
struct Unreachable;

impl RevisionQuery for Unreachable {
    fn change_log(&self, _: &ChangeLogRequest) -> Result<ChangeLog, ScmError> {
        Err(ScmError::Backend("connection refused".into()))
    }

    fn status(&self, _: &Path) -> Result<Vec<ChangedFile>, ScmError> {
        Ok(Vec::new())
    }
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

fn config() -> BuildMetaConfig {
    let mut config = BuildMetaConfig::default();
    config.providers.add_host_info = false;
    config.project.group_id = "com.example".into();
    config.project.artifact_id = "app".into();
    config.project.version = "2.0.0-SNAPSHOT".into();
    config.project.scm = Some(ProjectScm {
        connection: Some("scm:git:https://git.example.com/app.git".into()),
        developer_connection: None,
    });
    config
}

fn context(dir: &TempDir, config: BuildMetaConfig) -> BuildContext {
    BuildContext::new(config, dir.path(), start_time()).with_environment([("USER", "ci")])
}

#[test]
fn full_version_combines_date_and_revision() {
    let dir = TempDir::new().unwrap();
    let store = collect(&context(&dir, config()), &FakeScm::at_revision("42")).unwrap();

    assert_eq!(store.get(FULL_VERSION), Some("2.0.0-20240115r42-SNAPSHOT"));
    assert_eq!(store.get(SCM_REVISION_ID), Some("42"));
    assert_eq!(store.get(SCM_LOCALLY_MODIFIED), Some("false"));
    assert_eq!(store.get(BUILD_DATE), Some("15.01.2024"));
    assert_eq!(store.get(BUILD_USER), Some("ci"));
    assert_eq!(store.get(TOOL_EXECUTION_PROJECT), Some("com.example:app:2.0.0-SNAPSHOT"));
}

#[test]
fn local_modifications_tag_the_version() {
    let dir = TempDir::new().unwrap();
    let scm = FakeScm::at_revision("7").with_status(vec![
        ChangedFile::new("src/main.rs", FileStatus::Modified),
        ChangedFile::new(".idea/workspace.xml", FileStatus::Modified),
    ]);
    let store = collect(&context(&dir, config()), &scm).unwrap();

    assert_eq!(store.get(SCM_LOCALLY_MODIFIED), Some("true"));
    assert_eq!(store.get(SCM_LOCALLY_MODIFIED_FILES), Some("src/main.rs:modified"));
    assert_eq!(
        store.get(FULL_VERSION),
        Some("2.0.0-20240115r7-locally-modified-SNAPSHOT")
    );
}

#[test]
fn strict_mode_fails_on_local_modifications() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.scm.fail_on_local_modifications = true;
    config.scm.ignore_dot_files_in_base_dir = false;
    let scm = FakeScm::at_revision("7")
        .with_status(vec![ChangedFile::new("README.md", FileStatus::Added)]);

    let err = collect(&context(&dir, config), &scm).unwrap_err();
    assert!(matches!(err, BuildMetaError::LocalModifications(_)));
    assert_eq!(err.stage(), "modification-check");
}

#[test]
fn run_writes_both_outputs() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.properties = vec![SelectedProperty::new("ticket").with_value("OPS-1")];
    let ctx = context(&dir, config);

    let outcome = run(&ctx, &FakeScm::at_revision("42")).unwrap();
    assert!(outcome.is_success());
    assert!(!outcome.reused);
    assert_eq!(outcome.written.len(), 2);

    let properties = std::fs::read_to_string(ctx.properties_file()).unwrap();
    assert!(properties.starts_with("#Created by buildmeta.\n"));
    assert!(properties.contains("build.version.full=2.0.0-20240115r42-SNAPSHOT\n"));

    let xml = std::fs::read_to_string(ctx.xml_file()).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains("<name>2.0.0-20240115r42-SNAPSHOT</name>"));
    assert!(xml.contains("<date>2024-01-15T00:00:00</date>"));
    assert!(xml.contains("<revision>42</revision>"));
    assert!(xml.contains("<metadata name=\"ticket\">OPS-1</metadata>"));
}

#[test]
fn failing_properties_writer_does_not_stop_the_report() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.force_new_properties = true;
    let ctx = context(&dir, config);
    std::fs::create_dir_all(ctx.properties_file()).unwrap();

    let outcome = run(&ctx, &FakeScm::at_revision("42")).unwrap();
    assert!(!outcome.is_success());
    assert_eq!(outcome.written, vec![ctx.xml_file()]);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].stage(), "serialization");
    assert!(
        std::fs::read_to_string(ctx.xml_file())
            .unwrap()
            .contains("<revision>42</revision>")
    );
}

#[test]
fn existing_properties_are_reused_unless_forced() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, config());
    let path = ctx.properties_file();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "#old\nbuild.version=0.9.0\n").unwrap();

    let outcome = run(&ctx, &FakeScm::at_revision("42")).unwrap();
    assert!(outcome.reused);
    assert_eq!(outcome.store.get(VERSION), Some("0.9.0"));
    assert_eq!(outcome.written, vec![ctx.xml_file()]);
    let xml = std::fs::read_to_string(ctx.xml_file()).unwrap();
    assert!(xml.contains("<version>0.9.0</version>"));
    assert!(!xml.contains("<scm>"));

    let mut forced = config();
    forced.force_new_properties = true;
    let ctx = context(&dir, forced);
    let outcome = run(&ctx, &FakeScm::at_revision("42")).unwrap();
    assert!(!outcome.reused);
    assert_eq!(
        read_properties_file(&path).unwrap().get(VERSION),
        Some("2.0.0-SNAPSHOT")
    );
}

#[test]
fn skip_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.skip = true;
    let ctx = context(&dir, config);

    let outcome = run(&ctx, &FakeScm::at_revision("42")).unwrap();
    assert!(outcome.skipped);
    assert!(!ctx.properties_file().exists());
    assert!(!ctx.xml_file().exists());
}

#[test]
fn unreachable_repository_only_drops_revision_facts() {
    let dir = TempDir::new().unwrap();
    let store = collect(&context(&dir, config()), &Unreachable).unwrap();
    assert!(!store.contains(SCM_REVISION_ID));
    assert_eq!(store.get(FULL_VERSION), Some("2.0.0-20240115-SNAPSHOT"));

    let mut required = config();
    required.scm.fail_on_missing_revision = true;
    let err = collect(&context(&dir, required), &Unreachable).unwrap_err();
    assert_eq!(err.stage(), "revision");
}

#[test]
fn offline_runs_skip_scm() {
    let dir = TempDir::new().unwrap();
    let mut config = config();
    config.offline = true;

    let store = collect(&context(&dir, config), &FakeScm::at_revision("42")).unwrap();
    assert!(!store.contains(SCM_REVISION_ID));
    assert_eq!(store.get(FULL_VERSION), Some("2.0.0-20240115-SNAPSHOT"));
}

#[test]
fn build_points_extend_an_existing_run() {
    let dir = TempDir::new().unwrap();
    let ctx = context(&dir, config());
    run(&ctx, &FakeScm::at_revision("42")).unwrap();

    let point = BuildPoint::new(
        Some("package".into()),
        start_time() + chrono::Duration::seconds(90),
    );
    let store = record_build_point(&ctx.properties_file(), dir.path(), &point)
        .unwrap()
        .unwrap();
    assert_eq!(store.get("build.duration.package"), Some("90000"));
    assert_eq!(store.get("build.duration.package.diff"), Some("90000"));
    assert_eq!(
        read_properties_file(&ctx.properties_file()).unwrap(),
        store
    );
}
