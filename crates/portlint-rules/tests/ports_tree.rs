//! End-to-end runs of the built-in rules over a temporary ports tree.

use portlint_core::{
    select, CancellationToken, Config, Engine, LintReport, PortIndex, Selection, Severity,
};
use portlint_rules::all_rules;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const INDEX: &str = "\
curl-8.6.0|ftp/curl|/usr/local|Command line tool and library for transferring data with URLs|ftp/curl/pkg-descr|sunpoet@FreeBSD.org|ftp net www|||https://curl.se/|||
drift-1.0|net/drift|/usr/local|Network drift tool|net/drift/pkg-descr|alice@example.com|net mail|||https://drift.invalid/|||
gone-2.0|www/gone|/usr/local|Vanished port|www/gone/pkg-descr|alice@example.com|www|||https://gone.invalid/|||
hollow-0.1|mail/hollow|/usr/local|Port without a Makefile|mail/hollow/pkg-descr|bob@example.com|mail|||https://hollow.invalid/|||
";

fn write_port(root: &Path, origin: &str, makefile: Option<&str>, descr: &str) {
    let dir = root.join(origin);
    fs::create_dir_all(&dir).unwrap();
    if let Some(makefile) = makefile {
        fs::write(dir.join("Makefile"), makefile).unwrap();
    }
    fs::write(dir.join("pkg-descr"), descr).unwrap();
}

fn ports_tree() -> (TempDir, PortIndex) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(root.join("INDEX-14"), INDEX).unwrap();

    write_port(
        root,
        "ftp/curl",
        Some(
            "PORTNAME=\tcurl\n\
             DISTVERSION=\t8.6.0\n\
             CATEGORIES=\tftp net www\n\
             MAINTAINER=\tsunpoet@FreeBSD.org\n\
             COMMENT=\tCommand line tool and library for transferring data with URLs\n\
             WWW=\t\thttps://curl.se/\n",
        ),
        "curl is a command line tool and library for transferring data with URL\n\
         syntax, supporting DICT, FILE, FTP, FTPS, GOPHER, HTTP, HTTPS and more.\n",
    );
    fs::write(root.join("ftp/curl/pkg-plist"), "bin/curl\n").unwrap();

    write_port(
        root,
        "net/drift",
        Some(
            "PORTNAME=\tdrift\n\
             CATEGORIES=\tnet\n\
             MAINTAINER=\talice@example.com\n\
             COMMENT=\tNetwork drift utility\n\
             WWW=\t\thttps://drift.invalid/\n\
             PLIST_FILES=\tbin/drift\n",
        ),
        "drift measures how far the clocks of two network peers have drifted\n\
         apart over time.\n",
    );

    write_port(root, "mail/hollow", None, "An empty port directory.\n");

    let index = PortIndex::load(&root.join("INDEX-14"), root).unwrap();
    (tmp, index)
}

fn run(index: &PortIndex, config: Config) -> LintReport {
    let selection = config.selection.clone();
    let engine = Engine::builder()
        .config(config)
        .rules(all_rules())
        .build()
        .unwrap();
    engine.run(index, &selection, None, &CancellationToken::new())
}

fn codes(report: &LintReport, port: &str) -> Vec<String> {
    report
        .for_port(port)
        .into_iter()
        .map(|d| d.code.clone())
        .collect()
}

#[test]
fn consistent_port_is_clean() {
    let (_tmp, index) = ports_tree();
    let report = run(&index, Config::default());
    assert!(codes(&report, "curl-8.6.0").is_empty());
}

#[test]
fn diverging_port_reports_each_mismatch() {
    let (_tmp, index) = ports_tree();
    let report = run(&index, Config::default());
    assert_eq!(codes(&report, "drift-1.0"), vec!["PL007", "PL016"]);

    let notes = report.notifications();
    assert_eq!(
        notes["alice@example.com"]["comment-mismatch"],
        vec!["drift-1.0".to_string()]
    );
}

#[test]
fn missing_paths_stop_at_the_gate() {
    let (_tmp, index) = ports_tree();
    let report = run(&index, Config::default());
    assert_eq!(codes(&report, "gone-2.0"), vec!["PL001"]);
    assert_eq!(codes(&report, "hollow-0.1"), vec!["PL002"]);
    assert_eq!(report.ports_checked, 4);
    assert!(!report.interrupted);
}

#[test]
fn default_root_origins_follow_the_ports_root() {
    let (tmp, _) = ports_tree();
    let root = tmp.path();
    let absolute: String = INDEX
        .lines()
        .take(3)
        .map(|line| {
            let fields: Vec<String> = line
                .split('|')
                .enumerate()
                .map(|(i, f)| match i {
                    1 | 4 => format!("/usr/ports/{f}"),
                    _ => f.to_string(),
                })
                .collect();
            fields.join("|") + "\n"
        })
        .collect();
    fs::write(root.join("INDEX-15"), absolute).unwrap();

    let index = PortIndex::load(&root.join("INDEX-15"), root).unwrap();
    assert_eq!(index.get("curl-8.6.0").unwrap().origin, root.join("ftp/curl"));

    let report = run(&index, Config::default());
    assert!(codes(&report, "curl-8.6.0").is_empty());
    assert_eq!(codes(&report, "drift-1.0"), vec!["PL007", "PL016"]);
    assert_eq!(codes(&report, "gone-2.0"), vec!["PL001"]);
    let gone = root.join("www/gone");
    assert!(report.for_port("gone-2.0")[0]
        .message
        .contains(&gone.display().to_string()));
}

#[test]
fn network_checks_are_off_by_default() {
    let (_tmp, index) = ports_tree();
    let report = run(&index, Config::default());
    assert!(report
        .diagnostics
        .iter()
        .all(|d| d.code != "PL019" && d.code != "PL020"));
}

#[test]
fn selection_narrows_the_run() {
    let (_tmp, index) = ports_tree();
    let mut config = Config::default();
    config.selection = Selection {
        categories: Selection::parse_list("mail"),
        maintainers: Selection::parse_list("alice@example.com"),
        ports: Default::default(),
    };

    let names: Vec<&str> = select(&index, &config.selection)
        .into_iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["drift-1.0"]);
    assert_eq!(select(&index, &Selection::default()).len(), 4);

    let report = run(&index, config);
    assert_eq!(report.ports_total, 4);
    assert_eq!(report.ports_selected, 1);
    assert!(report.diagnostics.iter().all(|d| d.port == "drift-1.0"));
}

#[test]
fn configuration_disables_and_overrides() {
    let (_tmp, index) = ports_tree();
    let config = Config::parse(
        "fail_on = \"error\"\n\
         [rules.comment-mismatch]\nenabled = false\n\
         [rules.category-mismatch]\nseverity = \"warning\"\n\
         [rules.missing-port-path]\nseverity = \"info\"\n",
    )
    .unwrap();
    let fail_on = config.fail_on().unwrap();
    let report = run(&index, config);

    assert_eq!(codes(&report, "drift-1.0"), vec!["PL016"]);
    assert_eq!(report.for_port("drift-1.0")[0].severity, Severity::Warning);
    assert_eq!(report.for_port("gone-2.0")[0].severity, Severity::Info);
    assert!(report.has_violations_at(fail_on));
}
