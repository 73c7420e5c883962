//! Edits applied to multi-file configuration trees

use httpdconf_config::HttpdConfig;
use httpdconf_core::ModuleInventory;
use regex::Regex;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, text: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

const ROOT: &str = "ServerRoot /etc/httpd\nListen 80\nIncludeOptional sites/*.conf\n";
const SITE_A: &str = "<VirtualHost *:80>\n    ServerName a.example\n    <Location /admin>\n        Require local\n    </Location>\n</VirtualHost>\n";
const SITE_B: &str = "# admin area\r\n<Location /admin>\r\n    Require ip 10.0.0.0/8\r\n</Location>\r\n<Location /public>\r\n</Location>\r\n";

fn tree() -> (TempDir, HttpdConfig) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "httpd.conf", ROOT);
    write(dir.path(), "sites/a.conf", SITE_A);
    write(dir.path(), "sites/b.conf", SITE_B);
    let config = HttpdConfig::new(dir.path().join("httpd.conf"), dir.path(), ModuleInventory::default()).unwrap();
    (dir, config)
}

#[test]
fn test_insert_after_listen() {
    let (dir, config) = tree();
    let inserted = config
        .insert_relative_to_first_match("Listen", &Regex::new(".*").unwrap(), "Listen 8080", false, true)
        .unwrap();

    assert!(inserted);
    assert_eq!(
        read(dir.path(), "httpd.conf"),
        "ServerRoot /etc/httpd\nListen 80\nListen 8080\nIncludeOptional sites/*.conf\n"
    );
    assert_eq!(config.get_directive_values("Listen", true).unwrap(), vec!["80", "8080"]);
}

#[test]
fn test_insert_lands_in_included_file() {
    let (dir, config) = tree();
    let inserted = config
        .insert_relative_to_first_match("ServerName", &Regex::new("^a\\.").unwrap(), "    ServerAlias www.a.example", false, true)
        .unwrap();

    assert!(inserted);
    assert_eq!(read(dir.path(), "httpd.conf"), ROOT);
    assert!(read(dir.path(), "sites/a.conf").contains("ServerName a.example\n    ServerAlias www.a.example\n"));
}

#[test]
fn test_comment_out_admin_locations() {
    let (dir, config) = tree();
    let rewritten = config
        .comment_or_delete_enclosure("Location", &Regex::new("/admin").unwrap(), true, true)
        .unwrap();

    assert_eq!(rewritten, vec![dir.path().join("sites/a.conf"), dir.path().join("sites/b.conf")]);
    assert_eq!(read(dir.path(), "httpd.conf"), ROOT);
    assert_eq!(
        read(dir.path(), "sites/b.conf"),
        "# admin area\r\n#<Location /admin>\r\n#    Require ip 10.0.0.0/8\r\n#</Location>\r\n<Location /public>\r\n</Location>\r\n"
    );
    assert_eq!(
        read(dir.path(), "sites/a.conf"),
        "<VirtualHost *:80>\n    ServerName a.example\n#    <Location /admin>\n#        Require local\n#    </Location>\n</VirtualHost>\n"
    );
    assert_eq!(config.get_enclosure("Location", true).unwrap().len(), 1);
}

#[test]
fn test_delete_outside_virtual_hosts_only() {
    let (dir, config) = tree();
    let rewritten = config
        .comment_or_delete_enclosure("Location", &Regex::new("/admin").unwrap(), false, false)
        .unwrap();

    assert_eq!(rewritten, vec![dir.path().join("sites/b.conf")]);
    assert_eq!(read(dir.path(), "sites/a.conf"), SITE_A);
    assert_eq!(read(dir.path(), "sites/b.conf"), "# admin area\r\n<Location /public>\r\n</Location>\r\n");
}

#[test]
fn test_set_and_remove_directive() {
    let (dir, config) = tree();
    let root = dir.path().join("httpd.conf");
    let any = Regex::new(".*").unwrap();

    assert!(config.set_directive_value("Listen", &root, "8000", &any, false).unwrap());
    assert!(config.set_directive_value("ServerTokens", &root, "Prod", &any, true).unwrap());
    assert_eq!(
        read(dir.path(), "httpd.conf"),
        "ServerRoot /etc/httpd\nListen 8000\nIncludeOptional sites/*.conf\n\nServerTokens Prod\n"
    );

    assert!(config.comment_or_delete_directive("ServerTokens", &root, &any, false).unwrap());
    assert!(config.comment_or_delete_directive("Listen", &root, &any, true).unwrap());
    assert_eq!(
        read(dir.path(), "httpd.conf"),
        "ServerRoot /etc/httpd\n#Listen 8000\nIncludeOptional sites/*.conf\n\n"
    );
    assert!(config.get_directive_values("Listen", true).unwrap().is_empty());
}
