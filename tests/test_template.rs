use std::path::Path;

use app_relauncher::{CommandTemplate, TemplateError, APP_PLACEHOLDER};

#[test]
fn test_placeholder_with_extra_argument() {
    let template = CommandTemplate::new("{app} foo").unwrap();
    let argv = template.to_argv(Path::new("/x/bundle.js"));
    assert_eq!(argv, vec!["/x/bundle.js", "foo"]);
}

#[test]
fn test_bare_placeholder() {
    let template = CommandTemplate::new("{app}").unwrap();
    let argv = template.to_argv(Path::new("/x/bundle.js"));
    assert_eq!(argv, vec!["/x/bundle.js"]);
}

#[test]
fn test_interpreter_prefix_and_flags() {
    let template = CommandTemplate::new("node --inspect {app}").unwrap();
    let argv = template.to_argv(Path::new("/dist/main.js"));
    assert_eq!(argv, vec!["node", "--inspect", "/dist/main.js"]);
}

#[test]
fn test_placeholder_embedded_in_token() {
    let template = CommandTemplate::new("node --entry={app}").unwrap();
    let argv = template.to_argv(Path::new("/dist/main.js"));
    assert_eq!(argv, vec!["node", "--entry=/dist/main.js"]);
}

#[test]
fn test_template_without_placeholder_passes_through() {
    let template = CommandTemplate::new("node server.js").unwrap();
    let argv = template.to_argv(Path::new("/x/bundle.js"));
    assert_eq!(argv, vec!["node", "server.js"]);
}

#[test]
fn test_path_with_whitespace_stays_one_argument() {
    let template = CommandTemplate::new("node {app}").unwrap();
    let argv = template.to_argv(Path::new("/build output/bundle.js"));
    assert_eq!(argv, vec!["node", "/build output/bundle.js"]);
}

#[test]
fn test_empty_template_is_rejected() {
    assert_eq!(CommandTemplate::new(""), Err(TemplateError::Empty));
    assert_eq!(CommandTemplate::new("   "), Err(TemplateError::Empty));
}

#[test]
fn test_default_is_bare_placeholder() {
    let argv = CommandTemplate::default().to_argv(Path::new("/x/bundle.js"));
    assert_eq!(argv, vec!["/x/bundle.js"]);
}

#[test]
fn test_parse_and_display_normalize_whitespace() {
    let template: CommandTemplate = "node   {app}".parse().unwrap();
    assert_eq!(template.to_string(), format!("node {APP_PLACEHOLDER}"));
}
