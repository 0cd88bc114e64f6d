use std::fs;
use std::path::{Path, PathBuf};

use dotview::{Attributes, Context, DirectorySource, Engine, Options, TemplateSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
mod test;

/// Reads `dotview.json` beside the template directory, if there is one
fn load_options(templates: &Path) -> dotview::Result<Options> {
    let config = templates.with_file_name("dotview.json");
    if !config.is_file() {
        return Ok(Options::default());
    }
    Options::from_json(&fs::read_to_string(config)?)
}

fn build_engine(templates: &Path) -> dotview::Result<Engine> {
    let mut engine =
        Engine::with_options(load_options(templates)?).with_source(DirectorySource::new(templates));

    engine.add_block("nav", |inner: &str, attributes: &Attributes, _: &Context| {
        let class = attributes.get("class").map_or("", String::as_str);
        format!("<nav class=\"{class}\">{inner}</nav>")
    });
    engine.add_block("card", |inner: &str, attributes: &Attributes, context: &Context| {
        let title = attributes.get("title").map_or("", String::as_str);
        let theme = context.view_var("theme").and_then(|v| v.as_str()).unwrap_or("light");
        format!("<section class=\"card {theme}\"><h2>{title}</h2>{inner}</section>")
    });
    engine.add_renderer("banner", |code: &str| {
        format!("<!-- compiled by dotview -->\n{code}")
    });

    engine.context_mut().set_view_var("theme", serde_json::json!("dark"));
    Ok(engine)
}

fn templates_dir() -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("templates"))
}

fn main() -> dotview::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let templates = templates_dir();
    let mut engine = build_engine(&templates)?;
    let source = DirectorySource::new(&templates);

    for name in source.names()? {
        engine.set_view(name.as_str());
        let mut code = engine.compile_view()?;
        if let Some(dialect) = engine.options().minify {
            code = engine.minify(dialect, &code);
        }
        let code = engine.render_with("banner", &code)?;
        info!(template = %name, len = code.len(), "compiled");
        println!("{code}");
    }
    Ok(())
}
