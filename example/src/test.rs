use std::path::{Path, PathBuf};

use dotview::{BLOCK_RENDERER, Dialect, DirectorySource, Error, TemplateSource};

use crate::build_engine;

fn templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn render_view(name: &str) -> String {
    let mut engine = build_engine(&templates()).unwrap();
    engine.set_view(name);
    let code = engine.compile_view().unwrap();
    engine.minify(engine.options().minify.unwrap(), &code)
}

#[test]
fn config_is_loaded() {
    let engine = build_engine(&templates()).unwrap();
    assert_eq!(engine.options().translator, "__");
    assert_eq!(engine.options().minify, Some(Dialect::Html));
    assert!(engine.options().escape);
}

#[test]
fn template_names() {
    let names = DirectorySource::new(templates()).names().unwrap();
    assert_eq!(names, vec!["button", "layout", "pages/todos"]);
}

#[test]
fn button() {
    assert_eq!(
        render_view("button"),
        r#"<button id="todo-<?= $id ?>" class="btn  btn-primary"><?= $label ?></button>"#
    );
}

#[test]
fn todos_page() {
    assert_eq!(
        render_view("pages/todos"),
        concat!(
            r#"<h1><?= __("My Todos") ?></h1>"#,
            r#"<? if ($todos): ?><section class="card dark"><h2>Open</h2><ul><li><?= $todos[0] ?></li></ul></section>"#,
            r#"<? else: ?><p><?= __("Nothing to do") ?></p><? endif; ?>"#,
        )
    );
}

#[test]
fn layout_keeps_style_content() {
    assert_eq!(
        render_view("layout"),
        concat!(
            r#"<!DOCTYPE html><html><head><title><?= $title ?></title>"#,
            "<style>\n      body { margin: 0; }\n    </style></head>",
            r#"<body><nav class="top"><a href="/"><?= __("Home") ?></a><a href="/todos"><?= __("Todos") ?></a></nav>"#,
            r#"<?= $content ?></body></html>"#,
        )
    );
}

#[test]
fn banner_renderer() {
    let engine = build_engine(&templates()).unwrap();
    assert_eq!(
        engine.render_with("banner", "<p>x</p>").unwrap(),
        "<!-- compiled by dotview -->\n<p>x</p>"
    );
    assert!(matches!(
        engine.render_with("pdf", "<p>x</p>"),
        Err(Error::UnknownRenderer(_))
    ));
}

#[test]
fn block_renderer_only_touches_blocks() {
    let engine = build_engine(&templates()).unwrap();
    assert_eq!(
        engine
            .render_with(BLOCK_RENDERER, "{{ block:card title=T }}{{ var: $x }}{{ /block:card }}")
            .unwrap(),
        r#"<section class="card dark"><h2>T</h2>{{ var: $x }}</section>"#
    );
}

#[test]
fn embedded_server_code_is_stripped() {
    let engine = build_engine(&templates()).unwrap();
    assert_eq!(
        engine.render("<p><?php echo $secret; ?>{{ var: $x }}</p>", &[]).unwrap(),
        "<p><?= $x ?></p>"
    );
}
