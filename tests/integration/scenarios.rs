use crate::workspace::Workspace;
use smali_patcher::{run, ApplyOptions, ExperimentalSet, RunError};
use std::fs;

const CHECK_LICENSE: &str = r#".method public checkLicense()Z
    .locals 1

    invoke-static {}, Lcom/example/Lic;->verify()Z

    move-result v0

    return v0
.end method
"#;

const CHECK_LICENSE_ORIGINAL: &str = "    invoke-static {}, Lcom/example/Lic;->verify()Z

    move-result v0
";

const CHECK_LICENSE_PATCHED: &str = "    const/4 v0, 0x1
";

fn no_experimental() -> ExperimentalSet {
    ExperimentalSet::from_names(Vec::<String>::new())
}

#[test]
fn test_pair_replaces_original_block() {
    let ws = Workspace::new();
    let target = ws.target("smali/com/example/Lic.smali", CHECK_LICENSE);
    ws.pair("always_licensed", CHECK_LICENSE_ORIGINAL, CHECK_LICENSE_PATCHED);

    let report = run(&ws.settings(true), &no_experimental(), &ApplyOptions::default()).unwrap();

    let patched = fs::read_to_string(target).unwrap();
    assert!(!patched.contains(CHECK_LICENSE_ORIGINAL));
    assert!(patched.contains(CHECK_LICENSE_PATCHED));
    assert!(patched.contains("return v0"));
    assert!(report.is_success());
    assert_eq!(report.outcome.files_modified, 1);
    assert_eq!(report.outcome.total_applications, 1);
    assert!(report.outcome.used.contains("always_licensed"));
}

#[test]
fn test_unmatched_file_left_byte_identical() {
    let ws = Workspace::new();
    ws.target("smali/com/example/Lic.smali", CHECK_LICENSE);
    let other_text = ".class public Lcom/example/Other;\n.super Ljava/lang/Object;\n";
    let other = ws.target("smali/com/example/Other.smali", other_text);
    ws.pair("always_licensed", CHECK_LICENSE_ORIGINAL, CHECK_LICENSE_PATCHED);

    let report = run(&ws.settings(true), &no_experimental(), &ApplyOptions::default()).unwrap();

    assert_eq!(fs::read(other).unwrap(), other_text.as_bytes());
    assert_eq!(report.outcome.files_scanned, 2);
    assert_eq!(report.outcome.files_modified, 1);
}

#[test]
fn test_second_run_applies_nothing() {
    let ws = Workspace::new();
    ws.target("smali/com/example/Lic.smali", CHECK_LICENSE);
    ws.pair("always_licensed", CHECK_LICENSE_ORIGINAL, CHECK_LICENSE_PATCHED);
    let settings = ws.settings(true);

    let first = run(&settings, &no_experimental(), &ApplyOptions::default()).unwrap();
    let second = run(&settings, &no_experimental(), &ApplyOptions::default()).unwrap();

    assert_eq!(first.outcome.total_applications, 1);
    assert_eq!(second.outcome.total_applications, 0);
    assert_eq!(second.outcome.files_modified, 0);
    assert!(!second.is_success());
}

#[test]
fn test_whitespace_original_never_loaded() {
    let ws = Workspace::new();
    ws.target("A.smali", "   \n");
    ws.pair("blank", "  \n\n\t", "const/4 v0, 0x1");

    let report = run(&ws.settings(true), &no_experimental(), &ApplyOptions::default()).unwrap();

    assert_eq!(report.pairs_loaded, 0);
    assert_eq!(report.validation.empty_original, vec!["blank".to_string()]);
    assert!(!report.is_success());
}

#[test]
fn test_experimental_pair_disabled_does_not_apply() {
    let ws = Workspace::new();
    let file = ws.target("smali/F.smali", "marker-x\nmarker-y\n");
    ws.pair("X", "marker-x", "patched-x");
    ws.pair("Y", "marker-y", "patched-y");
    let experimental = ExperimentalSet::from_names(["X"]);

    let report = run(&ws.settings(false), &experimental, &ApplyOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(file).unwrap(), "marker-x\npatched-y\n");
    assert!(!report.outcome.used.contains("X"));
    assert_eq!(report.experimental.excluded, vec!["X".to_string()]);
    assert_eq!(report.pairs_loaded, 2);
    assert_eq!(report.pairs_active, 1);
}

#[test]
fn test_experimental_pair_enabled_applies() {
    let ws = Workspace::new();
    let file = ws.target("smali/F.smali", "marker-x\n");
    ws.pair("X", "marker-x", "patched-x");
    let experimental = ExperimentalSet::from_names(["X", "not_loaded"]);

    let report = run(&ws.settings(true), &experimental, &ApplyOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(file).unwrap(), "patched-x\n");
    assert_eq!(report.experimental.included, vec!["X".to_string()]);
    assert_eq!(report.experimental.unmatched.len(), 1);
    assert_eq!(report.experimental.unmatched[0].name, "not_loaded");
}

#[test]
fn test_zero_pairs_reports_failure() {
    let ws = Workspace::new();
    ws.target("A.smali", "anything");

    let report = run(&ws.settings(true), &no_experimental(), &ApplyOptions::default()).unwrap();

    assert_eq!(report.outcome.files_scanned, 1);
    assert_eq!(report.outcome.total_applications, 0);
    assert!(!report.is_success());
}

#[test]
fn test_pairs_chain_in_name_order() {
    let ws = Workspace::new();
    let file = ws.target("A.smali", "A");
    // Written out of order on purpose: loading sorts by name.
    ws.pair("p2", "B", "C");
    ws.pair("p1", "A", "B");

    let report = run(&ws.settings(true), &no_experimental(), &ApplyOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(file).unwrap(), "C");
    assert_eq!(report.outcome.total_applications, 2);
}

#[test]
fn test_orphan_reported_not_applied() {
    let ws = Workspace::new();
    let file = ws.target("A.smali", "keep-me\nneedle\n");
    ws.pair("real", "needle", "thread");
    ws.patched("Y", "keep-me");

    let report = run(&ws.settings(true), &no_experimental(), &ApplyOptions::default()).unwrap();

    assert_eq!(report.pairs_loaded, 1);
    assert_eq!(report.validation.orphan_patched.len(), 1);
    assert_eq!(report.validation.orphan_patched[0].name, "Y");
    assert!(report.unused_pairs.is_empty());
    assert_eq!(fs::read_to_string(file).unwrap(), "keep-me\nthread\n");
}

#[test]
fn test_deletion_pair_removes_block() {
    let ws = Workspace::new();
    let file = ws.target(
        "A.smali",
        "    invoke-static {}, Lcom/ads/Ads;->show()V\n    return-void\n",
    );
    ws.pair("drop_ads", "    invoke-static {}, Lcom/ads/Ads;->show()V\n", "");

    let report = run(&ws.settings(true), &no_experimental(), &ApplyOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(file).unwrap(), "    return-void\n");
    assert_eq!(report.validation.empty_patched, vec!["drop_ads".to_string()]);
    assert!(report.is_success());
}

#[test]
fn test_dry_run_reports_without_writing() {
    let ws = Workspace::new();
    let file = ws.target("A.smali", "old");
    ws.pair("p", "old", "new");
    let options = ApplyOptions {
        dry_run: true,
        keep_changes: true,
    };

    let report = run(&ws.settings(true), &no_experimental(), &options).unwrap();

    assert!(report.is_success());
    assert!(report.dry_run);
    assert_eq!(report.outcome.changes.len(), 1);
    assert_eq!(fs::read_to_string(file).unwrap(), "old");
}

#[test]
fn test_missing_target_dir_is_error() {
    let ws = Workspace::new();
    ws.pair("p", "old", "new");
    let mut settings = ws.settings(true);
    settings.target_dir = ws.dir.path().join("not-decompiled-yet");

    let result = run(&settings, &no_experimental(), &ApplyOptions::default());

    assert!(matches!(result, Err(RunError::TargetDir { .. })));
}

#[test]
fn test_missing_snippet_dir_is_error() {
    let ws = Workspace::new();
    ws.target("A.smali", "old");
    let mut settings = ws.settings(true);
    settings.patches_dir = ws.dir.path().join("no-patches");

    let result = run(&settings, &no_experimental(), &ApplyOptions::default());

    assert!(matches!(result, Err(RunError::Load(_))));
}

#[test]
#[cfg(unix)]
fn test_symlinked_target_patched_once_through_link() {
    use std::os::unix::fs::symlink;

    let ws = Workspace::new();
    let real = ws.target("smali/com/example/B.smali", "old\n");
    let link = real.with_file_name("A.smali");
    symlink(&real, &link).unwrap();
    ws.pair("p", "old", "new");

    let report = run(&ws.settings(true), &no_experimental(), &ApplyOptions::default()).unwrap();

    assert_eq!(report.outcome.total_applications, 1);
    assert_eq!(report.outcome.files_modified, 1);
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(fs::read_to_string(&link).unwrap(), "new\n");
}
