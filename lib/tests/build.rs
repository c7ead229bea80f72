use std::fs;
use std::path::{Path, PathBuf};

use atticus::{build, BuildConfig, Builder, ErrorKind, Report};
use atticus::templating::minijinja::MiniJinjaEngine;
use tempfile::TempDir;

struct Site {
    dir: TempDir,
}

impl Site {
    fn new() -> Self {
        let site = Site { dir: tempfile::tempdir().unwrap() };
        fs::create_dir_all(site.input().join("templates")).unwrap();
        site
    }

    fn input(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    fn file(&self, relative: &str, contents: &str) -> &Self {
        let path = self.input().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    fn config(&self) -> BuildConfig {
        BuildConfig::new(self.input(), Some(self.output()), false)
    }

    fn verbose_build(&self) -> (atticus::Result<Report>, String) {
        let config = BuildConfig::new(self.input(), Some(self.output()), true);
        let mut stdout = vec![];
        let result = Builder::new(&config).with_stdout(&mut stdout).run::<MiniJinjaEngine>();
        (result, String::from_utf8(stdout).unwrap())
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.output().join(relative)).unwrap()
    }

    fn files(&self) -> Vec<PathBuf> {
        fn walk(root: &Path, dir: &Path, files: &mut Vec<PathBuf>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(root, &path, files);
                } else {
                    files.push(path.strip_prefix(root).unwrap().to_path_buf());
                }
            }
        }

        let mut files = vec![];
        walk(&self.output(), &self.output(), &mut files);
        files.sort();
        files
    }
}

#[test]
fn renders_home_page() {
    let site = Site::new();
    site.file("templates/home.html", "<h1>{{ title }}</h1>")
        .file("config.json", r#"[{"url": "/", "template": "home.html", "context": {"title": "Hi"}}]"#);

    let report = build(&site.config()).unwrap();
    assert_eq!(report, Report { pages: 1, assets: 0 });
    assert_eq!(site.read("index.html"), "<h1>Hi</h1>");
}

#[test]
fn renders_every_page_and_copies_static_tree() {
    let site = Site::new();
    site.file("templates/base.html", "<title>{{ G.name }}</title>{% block main %}{% endblock %}")
        .file("templates/page.html", "{% extends 'base.html' %}{% block main %}{{ body }}{% endblock %}")
        .file("site.toml", "name = \"Example\"")
        .file("static/foo.txt", "foo\n")
        .file("static/css/style.css", "body { margin: 0 }")
        .file("static/blog/assets/app.js", "console.log(1)")
        .file("config.json", r#"[
            {"url": "/", "template": "page.html", "context": {"body": "home"}},
            {"url": "/blog/", "template": "page.html", "context": {"body": "blog"}},
            {"url": "/blog/first", "template": "page.html", "context": {"body": "first"}}
        ]"#);

    let report = build(&site.config()).unwrap();
    assert_eq!(report, Report { pages: 3, assets: 3 });

    let expected: Vec<PathBuf> = [
        "blog/assets/app.js",
        "blog/first/index.html",
        "blog/index.html",
        "css/style.css",
        "foo.txt",
        "index.html",
    ].iter().map(PathBuf::from).collect();

    assert_eq!(site.files(), expected);
    assert_eq!(site.read("blog/first/index.html"), "<title>Example</title>first");
    assert_eq!(site.read("foo.txt"), "foo\n");
}

#[test]
fn static_files_win_collisions() {
    let site = Site::new();
    site.file("templates/a.html", "rendered")
        .file("static/index.html", "static")
        .file("config.json", r#"[{"url": "/", "template": "a.html"}]"#);

    build(&site.config()).unwrap();
    assert_eq!(site.read("index.html"), "static");
}

#[test]
fn later_entries_win_page_collisions() {
    let site = Site::new();
    site.file("templates/one.html", "one")
        .file("templates/two.html", "two")
        .file("config.json", r#"[
            {"url": "/a", "template": "one.html"},
            {"url": "/a/", "template": "two.html"}
        ]"#);

    let report = build(&site.config()).unwrap();
    assert_eq!(report.pages, 2);
    assert_eq!(site.read("a/index.html"), "two");
}

#[test]
fn existing_output_is_untouched() {
    let site = Site::new();
    site.file("templates/a.html", "new")
        .file("config.json", r#"[{"url": "/", "template": "a.html"}]"#);

    fs::create_dir_all(site.output()).unwrap();
    fs::write(site.output().join("index.html"), "old").unwrap();

    let e = build(&site.config()).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::OutputExists);
    assert_eq!(site.read("index.html"), "old");
    assert_eq!(site.files().len(), 1);
}

#[test]
fn missing_manifest() {
    let site = Site::new();
    let e = build(&site.config()).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ManifestNotFound);
}

#[test]
fn malformed_manifest_reports_parser_diagnostic() {
    let site = Site::new();
    site.file("config.json", "[{\"url\": \"/\", ");

    let e = build(&site.config()).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ManifestMalformed);
    assert!(e.to_string().contains("EOF while parsing"), "{e}");
}

#[test]
fn missing_template_root() {
    let site = Site::new();
    fs::remove_dir(site.input().join("templates")).unwrap();
    site.file("config.json", "[]");

    let e = build(&site.config()).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TemplateRootMissing);
}

#[test]
fn missing_template_stops_the_build() {
    let site = Site::new();
    site.file("templates/ok.html", "ok")
        .file("static/foo.txt", "foo")
        .file("config.json", r#"[
            {"url": "/first/", "template": "ok.html"},
            {"url": "/second/", "template": "absent.html"},
            {"url": "/third/", "template": "ok.html"}
        ]"#);

    let e = build(&site.config()).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TemplateNotFound);
    assert_eq!(e.parameter("template"), Some("absent.html"));
    assert!(e.to_string().contains("absent.html"));

    assert_eq!(site.files(), vec![PathBuf::from("first/index.html")]);
}

#[test]
fn render_errors_carry_the_template_name() {
    let site = Site::new();
    site.file("templates/a.html", "{{ undefined_name }}")
        .file("config.json", r#"[{"url": "/", "template": "a.html"}]"#);

    let e = build(&site.config()).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TemplateRenderError);
    assert_eq!(e.parameter("template"), Some("a.html"));
    assert!(e.to_string().lines().count() >= 2);
}

#[test]
fn traversal_urls_are_rejected_before_rendering() {
    let site = Site::new();
    site.file("templates/a.html", "a")
        .file("config.json", r#"[
            {"url": "/ok/", "template": "a.html"},
            {"url": "/../../escape/", "template": "a.html"}
        ]"#);

    let e = build(&site.config()).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ManifestMalformed);
    assert_eq!(e.parameter("entry"), Some("1"));
    assert!(!site.output().exists());
}

#[test]
fn empty_manifest_without_static_creates_empty_output() {
    let site = Site::new();
    site.file("config.json", "[]");

    assert_eq!(build(&site.config()).unwrap(), Report::default());
    assert!(site.output().is_dir());
    assert!(site.files().is_empty());
}

#[test]
fn verbose_lines_follow_manifest_order() {
    let site = Site::new();
    site.file("templates/home.html", "home")
        .file("templates/page.html", "page")
        .file("static/foo.txt", "foo")
        .file("config.json", r#"[
            {"url": "/", "template": "home.html"},
            {"url": "/a/b", "template": "page.html"},
            {"url": "/c/", "template": "page.html"}
        ]"#);

    let (result, stdout) = site.verbose_build();
    assert_eq!(result.unwrap(), Report { pages: 3, assets: 1 });

    let out = site.output();
    let expected = [
        format!("Rendered home.html -> {}", out.join("index.html").display()),
        format!("Rendered page.html -> {}", out.join("a/b/index.html").display()),
        format!("Rendered page.html -> {}", out.join("c/index.html").display()),
        format!("Copied {} -> {}", site.input().join("static").display(), out.display()),
    ];

    assert_eq!(stdout.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn verbose_output_does_not_change_the_site() {
    let quiet = Site::new();
    let loud = Site::new();
    for site in [&quiet, &loud] {
        site.file("templates/a.html", "<p>{{ n }}</p>")
            .file("static/css/site.css", "body {}")
            .file("config.json", r#"[
                {"url": "/", "template": "a.html", "context": {"n": 1}},
                {"url": "/x/", "template": "a.html", "context": {"n": 2}}
            ]"#);
    }

    let report = build(&quiet.config()).unwrap();
    let (result, _) = loud.verbose_build();
    assert_eq!(result.unwrap(), report);

    assert_eq!(quiet.files(), loud.files());
    for file in quiet.files() {
        let file = file.to_str().unwrap();
        assert_eq!(quiet.read(file), loud.read(file));
    }
}

#[test]
fn verbose_lines_stop_at_the_failing_page() {
    let site = Site::new();
    site.file("templates/ok.html", "ok")
        .file("static/foo.txt", "foo")
        .file("config.json", r#"[
            {"url": "/one/", "template": "ok.html"},
            {"url": "/two/", "template": "absent.html"}
        ]"#);

    let (result, stdout) = site.verbose_build();
    assert_eq!(result.unwrap_err().kind(), ErrorKind::TemplateNotFound);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.starts_with("Rendered ok.html -> "));
}

#[test]
fn directory_named_as_template_is_not_found() {
    let site = Site::new();
    site.file("templates/sub/a.html", "a")
        .file("config.json", r#"[{"url": "/", "template": "sub"}]"#);

    let e = build(&site.config()).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TemplateNotFound);
    assert_eq!(e.parameter("template"), Some("sub"));
}
